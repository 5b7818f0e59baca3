//! Canonical Hong Kong districts and fuzzy matching of free-text district names.

use serde::Serialize;

/// Default minimum score for a district match to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

const EXACT_SCORE: f64 = 1.0;
const CONTAINS_SCORE: f64 = 0.9;
const FULL_OVERLAP_SCORE: f64 = 0.8;
const PARTIAL_OVERLAP_FLOOR: f64 = 0.6;
const MIN_TOKEN_CHARS: usize = 3;
// Single characters (南, 北) appear inside too many unrelated names.
const MIN_CONTAINED_CHARS: usize = 2;

const TRAILING_SUFFIXES: [&str; 3] = ["district", "area", "region"];
const TRAILING_SUFFIX_ZH: char = '區';

/// Reference entry for one of the eighteen administrative districts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanonicalDistrict {
    /// Short district code.
    pub code: &'static str,
    /// Area the district belongs to: `HKI`, `KLN`, or `NT`.
    pub area_code: &'static str,
    /// English name.
    pub name_en: &'static str,
    /// Traditional Chinese name.
    pub name_zh: &'static str,
}

const fn district(
    code: &'static str,
    area_code: &'static str,
    name_en: &'static str,
    name_zh: &'static str,
) -> CanonicalDistrict {
    CanonicalDistrict {
        code,
        area_code,
        name_en,
        name_zh,
    }
}

/// The fixed district table.
pub static DISTRICTS: [CanonicalDistrict; 18] = [
    district("CW", "HKI", "Central and Western", "中西區"),
    district("WC", "HKI", "Wan Chai", "灣仔區"),
    district("EST", "HKI", "Eastern", "東區"),
    district("STH", "HKI", "Southern", "南區"),
    district("YTM", "KLN", "Yau Tsim Mong", "油尖旺區"),
    district("SSP", "KLN", "Sham Shui Po", "深水埗區"),
    district("KC", "KLN", "Kowloon City", "九龍城區"),
    district("WTS", "KLN", "Wong Tai Sin", "黃大仙區"),
    district("KT", "KLN", "Kwun Tong", "觀塘區"),
    district("KTS", "NT", "Kwai Tsing", "葵青區"),
    district("TW", "NT", "Tsuen Wan", "荃灣區"),
    district("TM", "NT", "Tuen Mun", "屯門區"),
    district("YL", "NT", "Yuen Long", "元朗區"),
    district("NTH", "NT", "North", "北區"),
    district("TP", "NT", "Tai Po", "大埔區"),
    district("ST", "NT", "Sha Tin", "沙田區"),
    district("SK", "NT", "Sai Kung", "西貢區"),
    district("IS", "NT", "Islands", "離島區"),
];

/// Look up a district by its canonical code.
#[must_use]
pub fn district_by_code(code: &str) -> Option<&'static CanonicalDistrict> {
    DISTRICTS.iter().find(|entry| entry.code == code)
}

struct Candidate {
    district: &'static CanonicalDistrict,
    names: [String; 2],
}

/// Fuzzy matcher resolving district spellings to [`CanonicalDistrict`] entries.
///
/// Matching is pure and total: the same input always yields the same answer,
/// and anything unrecognisable yields `None`.
pub struct DistrictMatcher {
    candidates: Vec<Candidate>,
    threshold: f64,
}

impl Default for DistrictMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl DistrictMatcher {
    /// Build a matcher over [`DISTRICTS`] accepting scores at or above `threshold`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let candidates = DISTRICTS
            .iter()
            .map(|district| Candidate {
                district,
                names: [normalize(district.name_en), normalize(district.name_zh)],
            })
            .collect();
        Self {
            candidates,
            threshold,
        }
    }

    /// Minimum accepted score.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve `raw_name` to the best-scoring district, if any clears the threshold.
    #[must_use]
    pub fn match_district(&self, raw_name: &str) -> Option<&'static CanonicalDistrict> {
        self.match_with_score(raw_name).map(|(district, _)| district)
    }

    /// Like [`DistrictMatcher::match_district`] but also reports the winning score.
    #[must_use]
    pub fn match_with_score(&self, raw_name: &str) -> Option<(&'static CanonicalDistrict, f64)> {
        let needle = normalize(raw_name);
        if needle.is_empty() {
            return None;
        }

        let mut best: Option<(&'static CanonicalDistrict, f64)> = None;
        for candidate in &self.candidates {
            for name in &candidate.names {
                let score = similarity(&needle, name);
                // Strictly greater keeps the earliest table entry on ties.
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((candidate.district, score));
                }
            }
        }

        best.filter(|(_, score)| *score >= self.threshold)
    }

    /// Canonical district code for `raw_name`.
    #[must_use]
    pub fn district_code(&self, raw_name: &str) -> Option<&'static str> {
        self.match_district(raw_name).map(|district| district.code)
    }

    /// Area code for `raw_name`.
    #[must_use]
    pub fn area_code(&self, raw_name: &str) -> Option<&'static str> {
        self.match_district(raw_name)
            .map(|district| district.area_code)
    }
}

/// Lowercase, replace punctuation with spaces, collapse whitespace, and drop a
/// trailing "district"/"area"/"region" (or 區).
fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch.is_whitespace() {
                ch
            } else {
                ' '
            }
        })
        .collect();

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1
        && words
            .last()
            .is_some_and(|last| TRAILING_SUFFIXES.contains(last))
    {
        words.pop();
    }

    let mut joined = words.join(" ");
    if joined.chars().count() > 1 && joined.ends_with(TRAILING_SUFFIX_ZH) {
        joined.pop();
    }
    joined
}

fn similarity(left: &str, right: &str) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return EXACT_SCORE;
    }
    let shorter = left.chars().count().min(right.chars().count());
    if shorter >= MIN_CONTAINED_CHARS && (left.contains(right) || right.contains(left)) {
        return CONTAINS_SCORE;
    }
    token_overlap_score(left, right)
}

fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "token counts are tiny, far below f64 precision limits"
)]
fn token_overlap_score(left: &str, right: &str) -> f64 {
    let left_tokens = tokens(left);
    let right_tokens = tokens(right);
    let longest = left_tokens.len().max(right_tokens.len());
    if longest == 0 {
        return 0.0;
    }

    let shared = left_tokens
        .iter()
        .filter(|token| right_tokens.contains(token))
        .count();
    let ratio = shared as f64 / longest as f64;

    if shared == longest {
        FULL_OVERLAP_SCORE
    } else if ratio > 0.5 {
        PARTIAL_OVERLAP_FLOOR + (ratio - 0.5) / 0.5 * (FULL_OVERLAP_SCORE - PARTIAL_OVERLAP_FLOOR)
    } else {
        ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn matcher() -> DistrictMatcher {
        DistrictMatcher::default()
    }

    #[rstest]
    #[case("Wong Tai Sin", "WTS")]
    #[case("Wong Tai Sin District", "WTS")]
    #[case("  WONG-TAI-SIN  ", "WTS")]
    #[case("Central & Western", "CW")]
    #[case("central and western district", "CW")]
    #[case("黃大仙區", "WTS")]
    #[case("黃大仙", "WTS")]
    #[case("Sha Tin Region", "ST")]
    #[case("Islands Area", "IS")]
    fn resolves_spelling_variants(
        matcher: DistrictMatcher,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(matcher.district_code(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("!!!")]
    #[case("Atlantis")]
    #[case("Mong Kok Stadium Annex")]
    fn unknown_names_yield_no_match(matcher: DistrictMatcher, #[case] raw: &str) {
        assert_eq!(matcher.match_district(raw), None);
    }

    #[rstest]
    fn district_suffix_alone_is_not_stripped(matcher: DistrictMatcher) {
        assert_eq!(normalize("District"), "district");
        assert_eq!(matcher.match_district("District"), None);
    }

    #[rstest]
    fn exact_match_scores_one(matcher: DistrictMatcher) {
        let (district, score) = matcher.match_with_score("Kwun Tong").expect("match");
        assert_eq!(district.code, "KT");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn containment_scores_point_nine(matcher: DistrictMatcher) {
        let (district, score) = matcher.match_with_score("Kowloon City North").expect("match");
        assert_eq!(district.code, "KC");
        assert!((score - CONTAINS_SCORE).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case("北角")]
    #[case("南丫島")]
    fn single_character_districts_need_exact_match(matcher: DistrictMatcher, #[case] raw: &str) {
        assert_eq!(matcher.district_code(raw), None);
    }

    #[rstest]
    #[case("南區", "STH")]
    #[case("北區", "NTH")]
    #[case("北", "NTH")]
    fn single_character_districts_match_exactly(
        matcher: DistrictMatcher,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(matcher.district_code(raw), Some(expected));
    }

    #[rstest]
    fn token_overlap_scales_between_floor_and_full() {
        // 2 of 3 tokens shared => ratio 0.667 => 0.667 score band.
        let score = token_overlap_score("yau tsim mong", "yau tsim kok");
        assert!(score > PARTIAL_OVERLAP_FLOOR && score < FULL_OVERLAP_SCORE);
        let reordered = token_overlap_score("kwai tsing", "tsing kwai");
        assert!((reordered - FULL_OVERLAP_SCORE).abs() < f64::EPSILON);
        assert!(token_overlap_score("tai po", "tai wai") < PARTIAL_OVERLAP_FLOOR);
    }

    #[rstest]
    fn reordered_tokens_still_match(matcher: DistrictMatcher) {
        assert_eq!(matcher.district_code("Tsing Kwai"), Some("KTS"));
    }

    #[rstest]
    fn stricter_threshold_rejects_fuzzy_matches() {
        let strict = DistrictMatcher::new(0.95);
        assert_eq!(strict.district_code("Kowloon City North"), None);
        assert_eq!(strict.district_code("Kowloon City"), Some("KC"));
    }

    #[rstest]
    fn matching_is_deterministic(matcher: DistrictMatcher) {
        let first = matcher.match_with_score("Yau Tsim");
        let second = matcher.match_with_score("Yau Tsim");
        assert_eq!(first, second);
    }

    #[rstest]
    fn every_district_resolves_to_itself(matcher: DistrictMatcher) {
        for entry in &DISTRICTS {
            assert_eq!(matcher.district_code(entry.name_en), Some(entry.code));
            assert_eq!(matcher.district_code(entry.name_zh), Some(entry.code));
        }
    }

    #[rstest]
    fn codes_look_up_table_entries() {
        assert_eq!(district_by_code("YL").map(|entry| entry.name_en), Some("Yuen Long"));
        assert_eq!(district_by_code("XX"), None);
    }
}
