//! Grouping of flat availability records into the venue / facility / slot hierarchy.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::district::DistrictMatcher;
use crate::model::{
    AvailabilityLevel, FacilityLocation, RawTimeslotRecord, TimeSlot, Venue, VenueId,
};

/// Parse an upstream court count, treating anything unusable as zero.
///
/// Accepts integers and decimal text (truncated); negatives, blanks, and
/// non-numeric text all become `0`.
#[must_use]
pub fn parse_available_courts(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if let Ok(count) = trimmed.parse::<i64>() {
        return u32::try_from(count.max(0)).unwrap_or(u32::MAX);
    }
    match trimmed.parse::<f64>() {
        Ok(count) if count.is_finite() && count > 0.0 => {
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "value is positive, finite, and clamped to the u32 range"
            )]
            let truncated = count.trunc().min(f64::from(u32::MAX)) as u32;
            truncated
        }
        _ => 0,
    }
}

/// Slot identifier, unique within a venue.
#[must_use]
pub fn time_slot_id(record: &RawTimeslotRecord, venue_id: &VenueId) -> String {
    format!(
        "{venue_id}/{}/{}/{}",
        record.available_date,
        record.facility_location,
        record.session_start.format("%H:%M")
    )
}

/// Build the venue hierarchy from one fetch worth of records.
///
/// The output is a fresh structure on every call: venues ordered by id,
/// facility locations by date then name, and slots by start time. Records with
/// no free courts stay in the caller's cache but never become slots, so they do
/// not contribute to any total.
#[must_use]
pub fn aggregate(records: &[RawTimeslotRecord], matcher: &DistrictMatcher) -> Vec<Venue> {
    let mut by_venue: BTreeMap<VenueId, Vec<&RawTimeslotRecord>> = BTreeMap::new();
    for record in records {
        by_venue.entry(record.venue_id()).or_default().push(record);
    }

    by_venue
        .into_iter()
        .filter_map(|(venue_id, venue_records)| build_venue(venue_id, &venue_records, matcher))
        .collect()
}

fn build_venue(
    id: VenueId,
    records: &[&RawTimeslotRecord],
    matcher: &DistrictMatcher,
) -> Option<Venue> {
    let first = records.first()?;

    let mut by_location: BTreeMap<(NaiveDate, &str), Vec<&RawTimeslotRecord>> = BTreeMap::new();
    for record in records {
        by_location
            .entry((record.available_date, record.facility_location.as_str()))
            .or_default()
            .push(record);
    }

    let facility_locations: Vec<FacilityLocation> = by_location
        .into_iter()
        .filter_map(|((date, name), location_records)| {
            build_location(&id, date, name, &location_records)
        })
        .collect();

    let mut time_slots: Vec<TimeSlot> = facility_locations
        .iter()
        .flat_map(|location| location.time_slots.iter().cloned())
        .collect();
    time_slots.sort_by(|left, right| {
        (left.date, left.start_time, &left.id).cmp(&(right.date, right.start_time, &right.id))
    });

    let total_available_courts = saturating_total(
        facility_locations
            .iter()
            .map(|location| location.total_available_courts),
    );
    let max_courts_per_slot = facility_locations
        .iter()
        .map(|location| location.max_courts_per_slot)
        .max()
        .unwrap_or(0);

    let sport_types = records
        .iter()
        .map(|record| record.sport_type)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let district = matcher.match_district(&first.district);

    Some(Venue {
        name: first.venue_name.clone(),
        address: first.address.clone(),
        phone: first.phone.clone(),
        district: first.district.clone(),
        district_code: district.map(|entry| entry.code.to_owned()),
        area_code: district.map(|entry| entry.area_code.to_owned()),
        coordinates: first.coordinates,
        sport_types,
        facility_locations,
        total_available_courts,
        max_courts_per_slot,
        time_slots,
        id,
    })
}

// Court counts come from upstream text, so totals clamp instead of overflowing.
fn saturating_total(counts: impl Iterator<Item = u32>) -> u32 {
    counts.fold(0, u32::saturating_add)
}

fn build_location(
    venue_id: &VenueId,
    date: NaiveDate,
    name: &str,
    records: &[&RawTimeslotRecord],
) -> Option<FacilityLocation> {
    let mut time_slots: Vec<TimeSlot> = records
        .iter()
        .filter_map(|record| {
            let available_courts = parse_available_courts(&record.available_courts);
            (available_courts > 0).then(|| TimeSlot {
                id: time_slot_id(record, venue_id),
                date,
                start_time: record.session_start,
                end_time: record.session_end,
                available_courts,
                availability_level: AvailabilityLevel::from_courts(available_courts),
            })
        })
        .collect();

    if time_slots.is_empty() {
        return None;
    }

    time_slots.sort_by(|left, right| {
        (left.start_time, left.end_time).cmp(&(right.start_time, right.end_time))
    });
    // The feed occasionally repeats a session row; keep the first occurrence.
    time_slots.dedup_by(|later, earlier| later.id == earlier.id);

    let total_available_courts =
        saturating_total(time_slots.iter().map(|slot| slot.available_courts));
    let max_courts_per_slot = time_slots
        .iter()
        .map(|slot| slot.available_courts)
        .max()
        .unwrap_or(0);
    let facility_type = records
        .first()
        .map(|record| record.facility_type.clone())
        .unwrap_or_default();

    Some(FacilityLocation {
        name: name.to_owned(),
        facility_type,
        date,
        time_slots,
        total_available_courts,
        max_courts_per_slot,
    })
}
