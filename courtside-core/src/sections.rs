//! Date-ordered, sticky-header-ready sections for a single venue.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{TimeSlot, Venue};

/// Slots of one facility location under a date header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityGrid {
    /// Facility location name.
    pub facility_location: String,
    /// Facility type offered at the location.
    pub facility_type: String,
    /// Slots with at least one free court, ordered by start time.
    pub time_slots: Vec<TimeSlot>,
}

/// Everything shown beneath one date header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSection {
    /// Date of the header.
    pub date: NaiveDate,
    /// Slots with at least one free court across all facilities; never zero.
    pub available_slots_count: usize,
    /// One grid per facility location, ordered by location name.
    pub facility_grids: Vec<FacilityGrid>,
}

/// A row of the flattened list handed to a sticky-header list widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRow<'a> {
    /// Date header carrying the slot badge.
    Header(&'a DateSection),
    /// Facility grid following its header.
    Grid(&'a FacilityGrid),
}

/// Sections of a venue plus the flat positions of their headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateSections {
    /// Sections in strictly ascending date order.
    pub sections: Vec<DateSection>,
    /// Index of every header within [`DateSections::rows`].
    pub sticky_header_indices: Vec<usize>,
}

impl DateSections {
    /// Flatten sections into header and grid rows.
    #[must_use]
    pub fn rows(&self) -> Vec<SectionRow<'_>> {
        self.sections
            .iter()
            .flat_map(|section| {
                std::iter::once(SectionRow::Header(section))
                    .chain(section.facility_grids.iter().map(SectionRow::Grid))
            })
            .collect()
    }

    /// True when no date has free slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Build the date sections for one venue.
///
/// Dates whose slots are all fully booked produce no header at all.
#[must_use]
pub fn build_date_sections(venue: &Venue) -> DateSections {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<&str, FacilityGrid>> = BTreeMap::new();

    for location in &venue.facility_locations {
        let grid = by_date
            .entry(location.date)
            .or_default()
            .entry(location.name.as_str())
            .or_insert_with(|| FacilityGrid {
                facility_location: location.name.clone(),
                facility_type: location.facility_type.clone(),
                time_slots: Vec::new(),
            });
        grid.time_slots.extend(
            location
                .time_slots
                .iter()
                .filter(|slot| slot.available_courts > 0)
                .cloned(),
        );
    }

    let mut sections = Vec::with_capacity(by_date.len());
    let mut sticky_header_indices = Vec::with_capacity(by_date.len());
    let mut flat_index = 0;

    for (date, grids) in by_date {
        let facility_grids: Vec<FacilityGrid> = grids
            .into_values()
            .filter(|grid| !grid.time_slots.is_empty())
            .map(|mut grid| {
                grid.time_slots
                    .sort_by(|left, right| left.start_time.cmp(&right.start_time));
                grid
            })
            .collect();

        let available_slots_count = facility_grids
            .iter()
            .map(|grid| grid.time_slots.len())
            .sum();
        if available_slots_count == 0 {
            continue;
        }

        sticky_header_indices.push(flat_index);
        flat_index += 1 + facility_grids.len();
        sections.push(DateSection {
            date,
            available_slots_count,
            facility_grids,
        });
    }

    DateSections {
        sections,
        sticky_header_indices,
    }
}
