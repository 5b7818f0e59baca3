//! Stateful facade that owns the latest fetch of every sport.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::bookmarks::{AreaGroup, BookmarkRef, VenuesBySport, hydrate_bookmarks, index_venues};
use crate::config::CoreConfig;
use crate::district::DistrictMatcher;
use crate::filter::{FilterCriteria, FilterEngine, FilterOutcome};
use crate::freshness::{FreshnessTracker, RefreshEta};
use crate::model::{RawTimeslotRecord, SportType, Venue, VenueId};
use crate::plugin::ProviderRegistry;
use crate::ports::{DataProvider, PortError};
use crate::sections::{DateSections, build_date_sections};

/// Tag identifying one fetch by its start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Sport being fetched.
    pub sport: SportType,
    /// When the fetch started.
    pub started_at: DateTime<Utc>,
}

impl FetchTicket {
    /// Ticket for a fetch starting at `started_at`.
    #[must_use]
    pub fn new(sport: SportType, started_at: DateTime<Utc>) -> Self {
        Self { sport, started_at }
    }

    /// Ticket for a fetch starting now.
    #[must_use]
    pub fn now(sport: SportType) -> Self {
        Self::new(sport, Utc::now())
    }
}

/// What happened to a fetch result handed to [`CourtsideService::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The result replaced the previous snapshot.
    Applied {
        /// Records stored.
        records: usize,
        /// Venues built from them.
        venues: usize,
    },
    /// A newer fetch was already committed; the result was dropped.
    Discarded,
}

struct Snapshot {
    fetched_at: DateTime<Utc>,
    records: Vec<RawTimeslotRecord>,
    venues: Vec<Venue>,
}

/// Public entry point holding per-sport snapshots and their freshness.
///
/// Each snapshot is replaced wholesale on commit; nothing is merged into
/// previously built venues.
pub struct CourtsideService {
    registry: Arc<ProviderRegistry>,
    matcher: DistrictMatcher,
    config: CoreConfig,
    freshness: FreshnessTracker,
    snapshots: HashMap<SportType, Snapshot>,
}

impl CourtsideService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, config: CoreConfig) -> Self {
        Self {
            registry,
            matcher: config.district_matcher(),
            freshness: config.freshness_tracker(),
            config,
            snapshots: HashMap::new(),
        }
    }

    /// Drop every snapshot and freshness record.
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.freshness.reset();
    }

    /// District matcher in use.
    #[must_use]
    pub fn matcher(&self) -> &DistrictMatcher {
        &self.matcher
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Freshness state of every sport.
    #[must_use]
    pub fn freshness(&self) -> &FreshnessTracker {
        &self.freshness
    }

    /// Sports that can be refreshed.
    #[must_use]
    pub fn sports(&self) -> Vec<SportType> {
        self.registry.sports()
    }

    /// Provider of `sport`, for callers that run fetches concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSport`] when no provider is registered.
    pub fn provider(&self, sport: SportType) -> Result<Arc<dyn DataProvider>, PortError> {
        self.registry.provider(sport).map(Arc::clone)
    }

    /// Store a fetch result unless a fetch that started later is already stored.
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        records: Vec<RawTimeslotRecord>,
    ) -> CommitOutcome {
        let FetchTicket { sport, started_at } = ticket;
        if self.freshness.is_outdated(sport, started_at) {
            debug!("Discarding {sport} fetch started at {started_at}: newer data already stored");
            return CommitOutcome::Discarded;
        }

        let venues = aggregate(&records, &self.matcher);
        let outcome = CommitOutcome::Applied {
            records: records.len(),
            venues: venues.len(),
        };
        self.snapshots.insert(
            sport,
            Snapshot {
                fetched_at: started_at,
                records,
                venues,
            },
        );
        self.freshness.record_fetch(sport, started_at);
        info!("Committed {sport} fetch: {outcome:?}");
        outcome
    }

    /// Fetch `sport` from its provider and commit the result.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the sport is unsupported or the provider fails;
    /// the stored snapshot and freshness are left untouched in that case.
    pub async fn refresh(&mut self, sport: SportType) -> Result<CommitOutcome, PortError> {
        let provider = self.provider(sport)?;
        let ticket = FetchTicket::now(sport);

        let records = provider.fetch_sport_venue_data().await.inspect_err(|err| {
            warn!("Fetching {sport} failed: {err}");
        })?;

        Ok(self.commit(ticket, records))
    }

    /// Start time of the stored fetch of `sport`.
    #[must_use]
    pub fn fetched_at(&self, sport: SportType) -> Option<DateTime<Utc>> {
        self.snapshots.get(&sport).map(|snapshot| snapshot.fetched_at)
    }

    /// Raw records of the latest fetch of `sport`, including fully booked ones.
    #[must_use]
    pub fn records(&self, sport: SportType) -> &[RawTimeslotRecord] {
        self.snapshots
            .get(&sport)
            .map(|snapshot| snapshot.records.as_slice())
            .unwrap_or_default()
    }

    /// Venues built from the latest fetch of `sport`.
    #[must_use]
    pub fn venues(&self, sport: SportType) -> &[Venue] {
        self.snapshots
            .get(&sport)
            .map(|snapshot| snapshot.venues.as_slice())
            .unwrap_or_default()
    }

    /// Look up a venue of `sport`.
    #[must_use]
    pub fn venue(&self, sport: SportType, venue_id: &VenueId) -> Option<&Venue> {
        self.venues(sport).iter().find(|venue| &venue.id == venue_id)
    }

    /// Latest venues of every fetched sport, indexed by id.
    #[must_use]
    pub fn venues_by_sport(&self) -> VenuesBySport<'_> {
        self.snapshots
            .iter()
            .map(|(sport, snapshot)| (*sport, index_venues(&snapshot.venues)))
            .collect()
    }

    /// Date sections of one venue.
    #[must_use]
    pub fn date_sections(&self, sport: SportType, venue_id: &VenueId) -> Option<DateSections> {
        self.venue(sport, venue_id).map(build_date_sections)
    }

    /// Filter the venues of `sport`.
    #[must_use]
    pub fn filter_venues(
        &self,
        sport: SportType,
        criteria: &FilterCriteria,
    ) -> FilterOutcome<'_, Venue> {
        self.filter_engine().apply(self.venues(sport), criteria)
    }

    /// Filter the raw records of `sport`.
    #[must_use]
    pub fn filter_records(
        &self,
        sport: SportType,
        criteria: &FilterCriteria,
    ) -> FilterOutcome<'_, RawTimeslotRecord> {
        self.filter_engine().apply(self.records(sport), criteria)
    }

    /// Join bookmarks with the latest venues, grouped by area.
    #[must_use]
    pub fn hydrate_bookmarks<'a>(&'a self, refs: &'a [BookmarkRef]) -> Vec<AreaGroup<'a>> {
        hydrate_bookmarks(refs, &self.venues_by_sport(), &self.matcher)
    }

    /// Whether `sport` needs refreshing now.
    #[must_use]
    pub fn is_stale(&self, sport: SportType) -> bool {
        self.freshness.is_stale(sport, Utc::now())
    }

    /// Time until `sport` needs refreshing, from now.
    #[must_use]
    pub fn next_refresh_eta(&self, sport: SportType) -> RefreshEta {
        self.freshness.next_refresh_eta(sport, Utc::now())
    }

    fn filter_engine(&self) -> FilterEngine<'_> {
        FilterEngine::new(&self.matcher, self.config.min_search_length)
    }
}
