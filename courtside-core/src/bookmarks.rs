//! Persisted bookmarks and their reconciliation with the latest venue data.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::district::DistrictMatcher;
use crate::model::{SportType, Venue, VenueId};
use crate::ports::{KeyValueStore, StoreError};

/// Storage key holding the serialized bookmark list.
pub const BOOKMARKS_KEY: &str = "bookmarks";

const AREA_ORDER: [&str; 3] = ["HKI", "KLN", "NT"];

/// A user's bookmark of a venue for one sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRef {
    /// Venue the bookmark points at.
    pub venue_id: VenueId,
    /// Sport the venue was bookmarked under.
    pub sport_type: SportType,
    /// When the user added the bookmark.
    pub added_at: DateTime<Utc>,
}

impl BookmarkRef {
    fn is_for(&self, venue_id: &VenueId, sport: SportType) -> bool {
        self.sport_type == sport && &self.venue_id == venue_id
    }
}

/// The bookmark set, mirrored into a [`KeyValueStore`] on every change.
///
/// Only explicit user actions add or remove entries; a venue missing from a
/// fetch never removes its bookmark.
pub struct BookmarkBook {
    store: Arc<dyn KeyValueStore>,
    refs: Vec<BookmarkRef>,
}

impl BookmarkBook {
    /// Load the bookmark set from `store`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be read or holds malformed data.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let refs = match store.get(BOOKMARKS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(Self { store, refs })
    }

    /// Bookmarks in insertion order.
    #[must_use]
    pub fn refs(&self) -> &[BookmarkRef] {
        &self.refs
    }

    /// Whether `venue_id` is bookmarked for `sport`.
    #[must_use]
    pub fn contains(&self, venue_id: &VenueId, sport: SportType) -> bool {
        self.refs.iter().any(|entry| entry.is_for(venue_id, sport))
    }

    /// Add a bookmark. Returns `false` without writing if it already exists.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be written.
    pub fn add(
        &mut self,
        venue_id: &VenueId,
        sport: SportType,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        if self.contains(venue_id, sport) {
            return Ok(false);
        }
        self.refs.push(BookmarkRef {
            venue_id: venue_id.clone(),
            sport_type: sport,
            added_at: now,
        });
        self.persist()?;
        Ok(true)
    }

    /// Remove a bookmark. Returns `false` without writing if it was absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be written.
    pub fn remove(&mut self, venue_id: &VenueId, sport: SportType) -> Result<bool, StoreError> {
        let before = self.refs.len();
        self.refs.retain(|entry| !entry.is_for(venue_id, sport));
        if self.refs.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flip the bookmark state and return whether the venue is now bookmarked.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be written.
    pub fn toggle(
        &mut self,
        venue_id: &VenueId,
        sport: SportType,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        if self.contains(venue_id, sport) {
            self.remove(venue_id, sport)?;
            Ok(false)
        } else {
            self.add(venue_id, sport, now)
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        if self.refs.is_empty() {
            self.store.delete(BOOKMARKS_KEY)?;
        } else {
            let encoded = serde_json::to_string(&self.refs)?;
            self.store.set(BOOKMARKS_KEY, &encoded)?;
        }
        debug!("Persisted {} bookmarks", self.refs.len());
        Ok(())
    }
}

/// Latest venues of every sport, indexed by id.
pub type VenuesBySport<'a> = HashMap<SportType, HashMap<&'a VenueId, &'a Venue>>;

/// Index a venue list by id.
#[must_use]
pub fn index_venues(venues: &[Venue]) -> HashMap<&VenueId, &Venue> {
    venues.iter().map(|venue| (&venue.id, venue)).collect()
}

/// A bookmark joined with its venue from the latest fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydratedBookmark<'a> {
    /// The stored reference.
    pub bookmark: &'a BookmarkRef,
    /// Current venue data; `None` when the venue is absent from the latest fetch.
    pub venue_data: Option<&'a Venue>,
}

impl HydratedBookmark<'_> {
    /// Venue name from live data, falling back to the name embedded in the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.venue_data.map_or_else(
            || self.bookmark.venue_id.venue_fragment(),
            |venue| venue.name.as_str(),
        )
    }

    /// Whether the venue is missing from the latest fetch.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.venue_data.is_none()
    }
}

/// Display bucket for grouping bookmarks by area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaBucket {
    /// A canonical area code.
    Area(&'static str),
    /// The district embedded in the venue id matched nothing.
    Unassigned,
}

impl AreaBucket {
    /// Code shown for the bucket.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match *self {
            AreaBucket::Area(code) => code,
            AreaBucket::Unassigned => "OTHER",
        }
    }

    fn rank(self) -> (usize, &'static str) {
        match self {
            AreaBucket::Area(code) => AREA_ORDER
                .iter()
                .position(|known| *known == code)
                .map_or((AREA_ORDER.len(), code), |position| (position, "")),
            AreaBucket::Unassigned => (AREA_ORDER.len() + 1, ""),
        }
    }
}

impl Ord for AreaBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for AreaBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bookmarks of one area, sorted by display name.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaGroup<'a> {
    /// Area of the group.
    pub area: AreaBucket,
    /// Bookmarks in the area, including orphaned ones.
    pub bookmarks: Vec<HydratedBookmark<'a>>,
}

impl<'a> AreaGroup<'a> {
    /// Bookmarks whose venue is present in the latest fetch.
    pub fn visible(&self) -> impl Iterator<Item = &HydratedBookmark<'a>> {
        self.bookmarks.iter().filter(|entry| !entry.is_orphaned())
    }
}

/// Join bookmarks with the latest venues and group them by area.
///
/// The area comes from the district embedded in the venue id, so a bookmark
/// keeps its group while its venue is missing from a fetch. Areas are ordered
/// `HKI`, `KLN`, `NT`, then other codes alphabetically, then unmatched ones.
#[must_use]
pub fn hydrate_bookmarks<'a>(
    refs: &'a [BookmarkRef],
    venues: &VenuesBySport<'a>,
    matcher: &DistrictMatcher,
) -> Vec<AreaGroup<'a>> {
    let mut groups: BTreeMap<AreaBucket, Vec<HydratedBookmark<'a>>> = BTreeMap::new();

    for bookmark in refs {
        let venue_data = venues
            .get(&bookmark.sport_type)
            .and_then(|index| index.get(&bookmark.venue_id))
            .copied();
        let area = matcher
            .area_code(bookmark.venue_id.district_fragment())
            .map_or(AreaBucket::Unassigned, AreaBucket::Area);

        groups.entry(area).or_default().push(HydratedBookmark {
            bookmark,
            venue_data,
        });
    }

    groups
        .into_iter()
        .map(|(area, mut bookmarks)| {
            bookmarks.sort_by(|left, right| {
                left.display_name()
                    .to_lowercase()
                    .cmp(&right.display_name().to_lowercase())
                    .then_with(|| left.bookmark.venue_id.cmp(&right.bookmark.venue_id))
                    .then_with(|| left.bookmark.sport_type.cmp(&right.bookmark.sport_type))
            });
            AreaGroup { area, bookmarks }
        })
        .collect()
}
