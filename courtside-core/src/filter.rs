//! Search, district, sport, and time-range filtering over records or venues.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::district::DistrictMatcher;
use crate::model::{RawTimeslotRecord, SportType, Venue};

/// Default number of trimmed characters before a search query takes effect.
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 2;

/// Optional start/end bounds on session times; `None` means "any time".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest accepted session start.
    pub start: Option<NaiveTime>,
    /// Latest accepted session end.
    pub end: Option<NaiveTime>,
}

impl TimeRange {
    /// Set the start bound, clearing the end bound if it would no longer lie after it.
    pub fn select_start(&mut self, start: Option<NaiveTime>) {
        self.start = start;
        if let (Some(from), Some(to)) = (self.start, self.end)
            && from >= to
        {
            self.end = None;
        }
    }

    /// Set the end bound, clearing the start bound if it would no longer lie before it.
    pub fn select_end(&mut self, end: Option<NaiveTime>) {
        self.end = end;
        if let (Some(from), Some(to)) = (self.start, self.end)
            && to <= from
        {
            self.start = None;
        }
    }

    /// Whether either bound is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether a session running from `start` to `end` fits inside the bounds.
    #[must_use]
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start.is_none_or(|from| start >= from) && self.end.is_none_or(|to| end <= to)
    }
}

/// User-selected filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free-text search.
    pub search_query: String,
    /// Canonical district code to keep.
    pub selected_district_code: Option<String>,
    /// Sport to keep.
    pub selected_sport_type: Option<SportType>,
    /// Session time bounds.
    pub time_range: TimeRange,
}

/// Anything the filter engine can test.
pub trait Filterable {
    /// Text fields searched by the free-text query.
    fn search_fields(&self) -> Vec<&str>;

    /// Canonical district code of the item.
    fn district_code(&self, matcher: &DistrictMatcher) -> Option<&str>;

    /// Whether the item offers `sport`.
    fn offers_sport(&self, sport: SportType) -> bool;

    /// Whether the item has a session inside `range`.
    fn fits_time_range(&self, range: &TimeRange) -> bool;
}

impl Filterable for RawTimeslotRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.venue_name.as_str(),
            self.facility_type.as_str(),
            self.facility_location.as_str(),
            self.district.as_str(),
            self.address.as_str(),
        ]
    }

    fn district_code(&self, matcher: &DistrictMatcher) -> Option<&str> {
        matcher.district_code(&self.district)
    }

    fn offers_sport(&self, sport: SportType) -> bool {
        self.sport_type == sport
    }

    fn fits_time_range(&self, range: &TimeRange) -> bool {
        range.contains(self.session_start, self.session_end)
    }
}

impl Filterable for Venue {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.district.as_str(), self.address.as_str()];
        for location in &self.facility_locations {
            fields.push(&location.name);
            fields.push(&location.facility_type);
        }
        fields
    }

    fn district_code(&self, _matcher: &DistrictMatcher) -> Option<&str> {
        self.district_code.as_deref()
    }

    fn offers_sport(&self, sport: SportType) -> bool {
        self.sport_types.contains(&sport)
    }

    fn fits_time_range(&self, range: &TimeRange) -> bool {
        self.time_slots
            .iter()
            .any(|slot| range.contains(slot.start_time, slot.end_time))
    }
}

/// Items that survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome<'a, T> {
    /// Matching items in input order.
    pub filtered: Vec<&'a T>,
    /// Whether search, district, or time filters are in effect.
    pub has_active_filters: bool,
}

/// Applies [`FilterCriteria`] using canonical district codes.
pub struct FilterEngine<'m> {
    matcher: &'m DistrictMatcher,
    min_query_length: usize,
}

impl<'m> FilterEngine<'m> {
    /// Create an engine that activates search after `min_query_length` characters.
    #[must_use]
    pub fn new(matcher: &'m DistrictMatcher, min_query_length: usize) -> Self {
        Self {
            matcher,
            min_query_length,
        }
    }

    /// Lowercased search needle, or `None` while the query is too short.
    #[must_use]
    pub fn active_query(&self, criteria: &FilterCriteria) -> Option<String> {
        let trimmed = criteria.search_query.trim();
        (trimmed.chars().count() >= self.min_query_length.max(1)).then(|| trimmed.to_lowercase())
    }

    /// Whether the criteria narrow the result beyond the sport selection.
    #[must_use]
    pub fn has_active_filters(&self, criteria: &FilterCriteria) -> bool {
        self.active_query(criteria).is_some()
            || criteria.selected_district_code.is_some()
            || criteria.time_range.is_active()
    }

    /// Filter `items` by `criteria`.
    #[must_use]
    pub fn apply<'a, T: Filterable>(
        &self,
        items: &'a [T],
        criteria: &FilterCriteria,
    ) -> FilterOutcome<'a, T> {
        let needle = self.active_query(criteria);
        let district = criteria.selected_district_code.as_deref();

        let filtered = items
            .iter()
            .filter(|item| {
                criteria
                    .selected_sport_type
                    .is_none_or(|sport| item.offers_sport(sport))
            })
            .filter(|item| {
                needle.as_deref().is_none_or(|query| {
                    item.search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(query))
                })
            })
            .filter(|item| {
                district.is_none_or(|wanted| item.district_code(self.matcher) == Some(wanted))
            })
            .filter(|item| {
                !criteria.time_range.is_active() || item.fits_time_range(&criteria.time_range)
            })
            .collect();

        FilterOutcome {
            filtered,
            has_active_filters: self.has_active_filters(criteria),
        }
    }
}

/// Filter `items` with the default minimum query length.
#[must_use]
pub fn apply_filters<'a, T: Filterable>(
    items: &'a [T],
    criteria: &FilterCriteria,
    matcher: &DistrictMatcher,
) -> FilterOutcome<'a, T> {
    FilterEngine::new(matcher, DEFAULT_MIN_QUERY_LENGTH).apply(items, criteria)
}
