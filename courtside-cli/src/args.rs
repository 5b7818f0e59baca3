//! Command-line arguments and their translation into core filter criteria.

use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use courtside_core::filter::{FilterCriteria, TimeRange};
use courtside_core::preferences::{Language, Theme};
use courtside_core::{SportType, VenueId};

#[derive(Debug, Parser)]
#[command(
    name = "courtside",
    about = "Browse public sports court availability",
    version
)]
pub(crate) struct Cli {
    /// JSON configuration file for matching, search, and freshness settings.
    #[arg(long, env = "COURTSIDE_CONFIG", value_name = "path", global = true)]
    pub(crate) config: Option<PathBuf>,
    /// File holding bookmarks and preferences.
    #[arg(
        long,
        env = "COURTSIDE_STATE",
        value_name = "path",
        default_value = "courtside-state.json",
        global = true
    )]
    pub(crate) state: PathBuf,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List venues with free courts.
    Venues(VenuesArgs),
    /// Show one venue's availability grouped by date.
    Venue(VenueArgs),
    /// Add or remove a bookmark.
    Bookmark(VenueArgs),
    /// List bookmarks grouped by area.
    Bookmarks(BookmarksArgs),
    /// Show or change display preferences.
    Prefs(PrefsArgs),
}

#[derive(Debug, Args)]
pub(crate) struct VenuesArgs {
    /// Sport to fetch.
    #[arg(value_parser = parse_sport)]
    pub(crate) sport: SportType,
    /// Free text matched against venue, district, address, and facility names.
    #[arg(long, short)]
    pub(crate) query: Option<String>,
    /// Canonical district code, e.g. `WTS`.
    #[arg(long, short)]
    pub(crate) district: Option<String>,
    /// Earliest session start, `HH:MM`.
    #[arg(long, value_parser = parse_time)]
    pub(crate) from: Option<NaiveTime>,
    /// Latest session end, `HH:MM`.
    #[arg(long, value_parser = parse_time)]
    pub(crate) to: Option<NaiveTime>,
}

impl VenuesArgs {
    /// Criteria equivalent to the given flags.
    pub(crate) fn criteria(&self) -> FilterCriteria {
        let mut time_range = TimeRange::default();
        time_range.select_start(self.from);
        time_range.select_end(self.to);
        FilterCriteria {
            search_query: self.query.clone().unwrap_or_default(),
            selected_district_code: self.district.as_ref().map(|code| code.trim().to_uppercase()),
            selected_sport_type: Some(self.sport),
            time_range,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct VenueArgs {
    /// Sport the venue is listed under.
    #[arg(value_parser = parse_sport)]
    pub(crate) sport: SportType,
    /// Venue id as printed by `venues`, e.g. `Sha Tin::Yuen Wo Road Sports Centre`.
    pub(crate) venue_id: String,
}

impl VenueArgs {
    pub(crate) fn venue_id(&self) -> VenueId {
        VenueId(self.venue_id.trim().to_owned())
    }
}

#[derive(Debug, Args)]
pub(crate) struct BookmarksArgs {
    /// Skip fetching and show bookmarks without venue details.
    #[arg(long)]
    pub(crate) offline: bool,
}

#[derive(Debug, Args)]
pub(crate) struct PrefsArgs {
    #[arg(long, value_enum)]
    pub(crate) language: Option<LanguageArg>,
    #[arg(long, value_enum)]
    pub(crate) theme: Option<ThemeArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LanguageArg {
    En,
    ZhHk,
}

impl From<LanguageArg> for Language {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::En => Language::English,
            LanguageArg::ZhHk => Language::TraditionalChinese,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ThemeArg {
    System,
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::System => Theme::System,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

fn parse_sport(raw: &str) -> Result<SportType, String> {
    SportType::from_slug(&raw.replace('-', "_")).ok_or_else(|| {
        let known: Vec<&str> = SportType::ALL.iter().map(|sport| sport.slug()).collect();
        format!("unknown sport `{raw}`, expected one of: {}", known.join(", "))
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|err| format!("`{raw}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("courtside").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
    }

    #[rstest]
    #[case("badminton", SportType::Badminton)]
    #[case("turf-soccer-pitch", SportType::TurfSoccerPitch)]
    #[case("Tennis", SportType::Tennis)]
    fn sports_accept_slugs(#[case] raw: &str, #[case] expected: SportType) {
        assert_eq!(parse_sport(raw), Ok(expected));
    }

    #[rstest]
    fn unknown_sport_lists_choices() {
        let err = parse_sport("curling").expect_err("rejected");
        assert!(err.contains("badminton"));
    }

    #[rstest]
    fn venue_flags_become_criteria() {
        let cli = parse(&[
            "venues",
            "basketball",
            "--query",
            "park",
            "-d",
            "wts",
            "--from",
            "09:00",
            "--to",
            "12:00",
        ]);
        let Command::Venues(args) = cli.command else {
            unreachable!("expected venues command");
        };
        let criteria = args.criteria();

        assert_eq!(criteria.search_query, "park");
        assert_eq!(criteria.selected_district_code.as_deref(), Some("WTS"));
        assert_eq!(criteria.selected_sport_type, Some(SportType::Basketball));
        assert_eq!(criteria.time_range.start, Some(time(9)));
        assert_eq!(criteria.time_range.end, Some(time(12)));
    }

    #[rstest]
    fn inverted_time_range_keeps_latest_choice() {
        let cli = parse(&["venues", "tennis", "--from", "14:00", "--to", "10:00"]);
        let Command::Venues(args) = cli.command else {
            unreachable!("expected venues command");
        };
        let range = args.criteria().time_range;

        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(time(10)));
    }

    #[rstest]
    fn venue_id_is_trimmed() {
        let cli = parse(&["bookmark", "badminton", " Sha Tin::Yuen Wo Road Sports Centre "]);
        let Command::Bookmark(args) = cli.command else {
            unreachable!("expected bookmark command");
        };
        assert_eq!(
            args.venue_id(),
            VenueId::new("Sha Tin", "Yuen Wo Road Sports Centre")
        );
    }

    #[rstest]
    fn prefs_map_to_core_values() {
        let cli = parse(&["prefs", "--language", "zh-hk", "--theme", "dark"]);
        let Command::Prefs(args) = cli.command else {
            unreachable!("expected prefs command");
        };
        assert_eq!(args.language.map(Language::from), Some(Language::TraditionalChinese));
        assert_eq!(args.theme.map(Theme::from), Some(Theme::Dark));
    }
}
