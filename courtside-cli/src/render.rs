//! Plain-text rendering of venues, date sections, and bookmarks.

use std::io::{self, Write};

use courtside_core::bookmarks::AreaGroup;
use courtside_core::filter::FilterOutcome;
use courtside_core::freshness::RefreshEta;
use courtside_core::preferences::Preferences;
use courtside_core::sections::{DateSections, SectionRow};
use courtside_core::{AvailabilityLevel, SportType, Venue};

fn level_marker(level: AvailabilityLevel) -> &'static str {
    match level {
        AvailabilityLevel::High => "+++",
        AvailabilityLevel::Medium => "++",
        AvailabilityLevel::Low => "+",
        AvailabilityLevel::None => "-",
    }
}

pub(crate) fn venue_list(
    out: &mut impl Write,
    sport: SportType,
    outcome: &FilterOutcome<'_, Venue>,
    eta: RefreshEta,
) -> io::Result<()> {
    writeln!(
        out,
        "{sport}: {} venues{} (next refresh {eta})",
        outcome.filtered.len(),
        if outcome.has_active_filters { " matching filters" } else { "" },
    )?;
    for venue in &outcome.filtered {
        let district = venue.district_code.as_deref().unwrap_or("?");
        writeln!(
            out,
            "  [{district:>3}] {:<40} {:>4} courts  {}",
            venue.name, venue.total_available_courts, venue.id
        )?;
    }
    Ok(())
}

pub(crate) fn venue_sections(
    out: &mut impl Write,
    venue: &Venue,
    sections: &DateSections,
) -> io::Result<()> {
    writeln!(out, "{} ({})", venue.name, venue.address)?;
    if !venue.phone.is_empty() {
        writeln!(out, "  tel {}", venue.phone)?;
    }
    if sections.is_empty() {
        writeln!(out, "  fully booked")?;
        return Ok(());
    }

    for row in sections.rows() {
        match row {
            SectionRow::Header(section) => writeln!(
                out,
                "{} ({} slots)",
                section.date.format("%a %Y-%m-%d"),
                section.available_slots_count
            )?,
            SectionRow::Grid(grid) => {
                writeln!(out, "  {} / {}", grid.facility_location, grid.facility_type)?;
                for slot in &grid.time_slots {
                    writeln!(
                        out,
                        "    {}-{}  {:>2} {}",
                        slot.start_time.format("%H:%M"),
                        slot.end_time.format("%H:%M"),
                        slot.available_courts,
                        level_marker(slot.availability_level)
                    )?;
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn bookmark_groups(out: &mut impl Write, groups: &[AreaGroup<'_>]) -> io::Result<()> {
    if groups.is_empty() {
        writeln!(out, "no bookmarks")?;
        return Ok(());
    }
    for group in groups {
        writeln!(out, "{}", group.area.label())?;
        for entry in &group.bookmarks {
            let sport = entry.bookmark.sport_type;
            match entry.venue_data {
                Some(venue) => writeln!(
                    out,
                    "  {:<40} {sport:<18} {:>4} courts",
                    entry.display_name(),
                    venue.total_available_courts
                )?,
                None => writeln!(
                    out,
                    "  {:<40} {sport:<18} not in latest data",
                    entry.display_name()
                )?,
            }
        }
    }
    Ok(())
}

pub(crate) fn preferences(out: &mut impl Write, prefs: &Preferences) -> io::Result<()> {
    writeln!(out, "language: {:?}", prefs.language)?;
    writeln!(out, "theme: {:?}", prefs.theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use courtside_core::VenueId;
    use courtside_core::bookmarks::{AreaBucket, BookmarkRef, HydratedBookmark};
    use courtside_core::sections::{DateSection, FacilityGrid};
    use courtside_core::{FacilityLocation, TimeSlot};
    use rstest::{fixture, rstest};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date")
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
    }

    #[fixture]
    fn venue() -> Venue {
        Venue {
            id: VenueId::new("Sha Tin", "Yuen Wo Road Sports Centre"),
            name: String::from("Yuen Wo Road Sports Centre"),
            address: String::from("2 Yuen Wo Road"),
            phone: String::new(),
            district: String::from("Sha Tin"),
            district_code: Some(String::from("ST")),
            area_code: Some(String::from("NT")),
            coordinates: None,
            sport_types: vec![SportType::Badminton],
            facility_locations: Vec::<FacilityLocation>::new(),
            total_available_courts: 4,
            max_courts_per_slot: 4,
            time_slots: Vec::new(),
        }
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("write to buffer");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[rstest]
    fn lists_venues_with_district_codes(venue: Venue) {
        let outcome = FilterOutcome {
            filtered: vec![&venue],
            has_active_filters: true,
        };
        let text = render(|out| {
            venue_list(out, SportType::Badminton, &outcome, RefreshEta::Refreshing)
        });

        assert!(text.starts_with("badminton: 1 venues matching filters (next refresh refreshing)"));
        assert!(text.contains("[ ST] Yuen Wo Road Sports Centre"));
    }

    #[rstest]
    fn sections_render_headers_before_grids(venue: Venue) {
        let slot = TimeSlot {
            id: String::from("slot"),
            date: date(),
            start_time: time(9),
            end_time: time(10),
            available_courts: 4,
            availability_level: AvailabilityLevel::Medium,
        };
        let sections = DateSections {
            sections: vec![DateSection {
                date: date(),
                available_slots_count: 1,
                facility_grids: vec![FacilityGrid {
                    facility_location: String::from("Arena"),
                    facility_type: String::from("Badminton Court"),
                    time_slots: vec![slot],
                }],
            }],
            sticky_header_indices: vec![0],
        };
        let text = render(|out| venue_sections(out, &venue, &sections));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "Fri 2025-01-10 (1 slots)");
        assert_eq!(lines[2], "  Arena / Badminton Court");
        assert_eq!(lines[3], "    09:00-10:00   4 ++");
    }

    #[rstest]
    fn fully_booked_venue_says_so(venue: Venue) {
        let text = render(|out| venue_sections(out, &venue, &DateSections::default()));
        assert!(text.ends_with("  fully booked\n"));
    }

    #[rstest]
    fn orphaned_bookmarks_are_flagged(venue: Venue) {
        let live = BookmarkRef {
            venue_id: venue.id.clone(),
            sport_type: SportType::Badminton,
            added_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        };
        let gone = BookmarkRef {
            venue_id: VenueId::new("Sha Tin", "Closed Hall"),
            ..live.clone()
        };
        let groups = vec![AreaGroup {
            area: AreaBucket::Area("NT"),
            bookmarks: vec![
                HydratedBookmark {
                    bookmark: &gone,
                    venue_data: None,
                },
                HydratedBookmark {
                    bookmark: &live,
                    venue_data: Some(&venue),
                },
            ],
        }];
        let text = render(|out| bookmark_groups(out, &groups));

        assert!(text.starts_with("NT\n"));
        assert!(text.contains("Closed Hall"));
        assert!(text.contains("not in latest data"));
        assert!(text.contains("4 courts"));
    }
}
