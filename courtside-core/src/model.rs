//! Domain data structures for sport types, raw availability records, and aggregated venues.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Sports offered by the upstream availability feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Badminton courts.
    Badminton,
    /// Basketball courts.
    Basketball,
    /// Volleyball courts.
    Volleyball,
    /// Artificial turf soccer pitches.
    TurfSoccerPitch,
    /// Tennis courts.
    Tennis,
}

impl SportType {
    /// Every supported sport, in display order.
    pub const ALL: [SportType; 5] = [
        SportType::Badminton,
        SportType::Basketball,
        SportType::Volleyball,
        SportType::TurfSoccerPitch,
        SportType::Tennis,
    ];

    /// Stable slug used in config files, storage keys, and CLI arguments.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            SportType::Badminton => "badminton",
            SportType::Basketball => "basketball",
            SportType::Volleyball => "volleyball",
            SportType::TurfSoccerPitch => "turf_soccer_pitch",
            SportType::Tennis => "tennis",
        }
    }

    /// Resolve a slug produced by [`SportType::slug`].
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let wanted = slug.trim().to_lowercase();
        Self::ALL.into_iter().find(|sport| sport.slug() == wanted)
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad(self.slug())
    }
}

/// WGS84 position of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// One availability row exactly as received from the upstream feed, after type coercion.
///
/// `available_courts` is kept as text because the feed does not guarantee it is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTimeslotRecord {
    /// Sport type the record was fetched for.
    pub sport_type: SportType,
    /// Free-text district name (English).
    pub district: String,
    /// Venue display name (English).
    pub venue_name: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Venue position, when the feed supplied a usable one.
    pub coordinates: Option<Coordinates>,
    /// Facility type, e.g. "Badminton Court".
    pub facility_type: String,
    /// Facility location inside the venue, e.g. "Arena".
    pub facility_location: String,
    /// Date the session takes place.
    pub available_date: NaiveDate,
    /// Session start time.
    pub session_start: NaiveTime,
    /// Session end time.
    pub session_end: NaiveTime,
    /// Number of free courts as text; may be malformed.
    pub available_courts: String,
}

impl RawTimeslotRecord {
    /// Identifier of the venue this record belongs to.
    #[must_use]
    pub fn venue_id(&self) -> VenueId {
        VenueId::new(&self.district, &self.venue_name)
    }
}

/// Stable venue identifier derived from the English district and venue names.
///
/// Both halves are upstream keys that do not change between fetches, so bookmarks
/// referencing a `VenueId` stay valid while every other venue field is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueId(pub String);

impl VenueId {
    const SEPARATOR: &'static str = "::";

    /// Build the identifier for a district/venue pair.
    #[must_use]
    pub fn new(district: &str, venue_name: &str) -> Self {
        VenueId(format!(
            "{}{}{}",
            district.trim(),
            Self::SEPARATOR,
            venue_name.trim()
        ))
    }

    /// District part embedded in the identifier.
    #[must_use]
    pub fn district_fragment(&self) -> &str {
        self.0
            .split_once(Self::SEPARATOR)
            .map_or("", |(district, _)| district)
    }

    /// Venue name part embedded in the identifier.
    #[must_use]
    pub fn venue_fragment(&self) -> &str {
        self.0
            .split_once(Self::SEPARATOR)
            .map_or(self.0.as_str(), |(_, venue)| venue)
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Bucketed label for how many courts a slot has free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityLevel {
    /// Nothing free.
    None,
    /// One or two courts.
    Low,
    /// Three to five courts.
    Medium,
    /// More than five courts.
    High,
}

impl AvailabilityLevel {
    /// Classify a court count.
    #[must_use]
    pub fn from_courts(courts: u32) -> Self {
        match courts {
            6.. => AvailabilityLevel::High,
            3..=5 => AvailabilityLevel::Medium,
            1..=2 => AvailabilityLevel::Low,
            0 => AvailabilityLevel::None,
        }
    }
}

/// A bookable session with at least one free court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique within a venue: venue, date, facility location, and start time.
    pub id: String,
    /// Date of the session.
    pub date: NaiveDate,
    /// Session start.
    pub start_time: NaiveTime,
    /// Session end.
    pub end_time: NaiveTime,
    /// Free courts, always greater than zero once built.
    pub available_courts: u32,
    /// Derived availability bucket.
    pub availability_level: AvailabilityLevel,
}

/// Slots of one facility location of a venue on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityLocation {
    /// Location name inside the venue.
    pub name: String,
    /// Facility type offered at the location.
    pub facility_type: String,
    /// Date the slots belong to.
    pub date: NaiveDate,
    /// Slots ordered by start time.
    pub time_slots: Vec<TimeSlot>,
    /// Sum of free courts over all slots.
    pub total_available_courts: u32,
    /// Largest free-court count of a single slot.
    pub max_courts_per_slot: u32,
}

/// A venue with its availability rebuilt from the latest fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Stable identifier.
    pub id: VenueId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// District as received.
    pub district: String,
    /// Canonical district code, when the district text could be matched.
    pub district_code: Option<String>,
    /// Canonical area code (`HKI`, `KLN`, `NT`), when the district text could be matched.
    pub area_code: Option<String>,
    /// Position, when known.
    pub coordinates: Option<Coordinates>,
    /// Sports seen for this venue in the aggregated records, sorted.
    pub sport_types: Vec<SportType>,
    /// Facility locations per date, ordered by date then name.
    pub facility_locations: Vec<FacilityLocation>,
    /// Free courts summed over every fetched date.
    pub total_available_courts: u32,
    /// Largest free-court count of a single slot over every fetched date.
    pub max_courts_per_slot: u32,
    /// Every slot of the venue, ordered by date, start time, then id.
    pub time_slots: Vec<TimeSlot>,
}

impl Venue {
    /// Free courts on a single date, for per-day badges.
    #[must_use]
    pub fn available_courts_on(&self, date: NaiveDate) -> u32 {
        self.facility_locations
            .iter()
            .filter(|location| location.date == date)
            .map(|location| location.total_available_courts)
            .fold(0, u32::saturating_add)
    }

    /// Dates with at least one free slot, ascending.
    #[must_use]
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .time_slots
            .iter()
            .map(|slot| slot.date)
            .collect();
        dates.dedup();
        dates
    }
}
