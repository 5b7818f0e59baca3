//! Coercion of loosely typed upstream rows into [`RawTimeslotRecord`]s.
//!
//! The availability feed is plain JSON with inconsistent typing: counts and
//! coordinates arrive as strings or numbers, optional fields are missing or
//! `null`. Everything is normalised here so aggregation only ever sees typed data.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::debug;

use crate::model::{Coordinates, RawTimeslotRecord, SportType};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Errors raised while coercing a single upstream row.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// A required field was absent or blank.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    /// The available date is not `YYYY-MM-DD`.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    /// A session time is not `HH:mm`.
    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

/// Scalar that the feed may send either as text or as a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    /// Text value.
    Text(String),
    /// Integral number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean, which the feed occasionally sends for empty cells.
    Flag(bool),
    /// Any other shape (object, array); treated as an empty cell.
    Other(serde_json::Value),
}

impl LooseValue {
    fn into_text(self) -> String {
        match self {
            LooseValue::Text(text) => text,
            LooseValue::Integer(number) => number.to_string(),
            LooseValue::Float(number) => number.to_string(),
            LooseValue::Flag(_) | LooseValue::Other(_) => String::new(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseValue::Text(text) => text.trim().parse::<f64>().ok()?,
            #[expect(
                clippy::cast_precision_loss,
                reason = "coordinates fit comfortably in f64"
            )]
            LooseValue::Integer(number) => *number as f64,
            LooseValue::Float(number) => *number,
            LooseValue::Flag(_) | LooseValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// One row of the upstream availability payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamRecord {
    /// District name (English).
    #[serde(rename = "District_Name_EN")]
    pub district: Option<LooseValue>,
    /// Venue name (English).
    #[serde(rename = "Venue_Name_EN")]
    pub venue_name: Option<LooseValue>,
    /// Venue address (English).
    #[serde(rename = "Venue_Address_EN")]
    pub address: Option<LooseValue>,
    /// Venue phone number.
    #[serde(rename = "Venue_Phone_No")]
    pub phone: Option<LooseValue>,
    /// Latitude.
    #[serde(rename = "Venue_Latitude")]
    pub latitude: Option<LooseValue>,
    /// Longitude.
    #[serde(rename = "Venue_Longitude")]
    pub longitude: Option<LooseValue>,
    /// Facility type (English).
    #[serde(rename = "Facility_Type_Name_EN")]
    pub facility_type: Option<LooseValue>,
    /// Facility location (English).
    #[serde(rename = "Facility_Location_Name_EN")]
    pub facility_location: Option<LooseValue>,
    /// Available date, `YYYY-MM-DD`.
    #[serde(rename = "Available_Date")]
    pub available_date: Option<LooseValue>,
    /// Session start, `HH:mm`.
    #[serde(rename = "Session_Start_Time")]
    pub session_start: Option<LooseValue>,
    /// Session end, `HH:mm`.
    #[serde(rename = "Session_End_Time")]
    pub session_end: Option<LooseValue>,
    /// Free courts.
    #[serde(rename = "Available_Courts")]
    pub available_courts: Option<LooseValue>,
}

impl UpstreamRecord {
    /// Coerce the row into a typed record fetched for `sport`.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] when the district, venue, date, or session times are
    /// missing or unparsable. Malformed court counts are kept and resolved to zero later.
    pub fn into_record(self, sport: SportType) -> Result<RawTimeslotRecord, IngestError> {
        let coordinates = match (&self.latitude, &self.longitude) {
            (Some(latitude), Some(longitude)) => latitude
                .as_f64()
                .zip(longitude.as_f64())
                .map(|(latitude, longitude)| Coordinates {
                    latitude,
                    longitude,
                }),
            _ => None,
        };

        let district = required(self.district, "district")?;
        let venue_name = required(self.venue_name, "venue_name")?;
        let available_date = parse_date(&required(self.available_date, "available_date")?)?;
        let session_start = parse_time(&required(self.session_start, "session_start")?)?;
        let session_end = parse_time(&required(self.session_end, "session_end")?)?;

        Ok(RawTimeslotRecord {
            sport_type: sport,
            district,
            venue_name,
            address: optional(self.address),
            phone: optional(self.phone),
            coordinates,
            facility_type: optional(self.facility_type),
            facility_location: optional(self.facility_location),
            available_date,
            session_start,
            session_end,
            available_courts: optional(self.available_courts),
        })
    }
}

/// Result of coercing a whole payload.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Records that passed validation, in payload order.
    pub records: Vec<RawTimeslotRecord>,
    /// Number of rows that could not be coerced.
    pub rejected: usize,
}

/// Coerce every row of a payload, counting the rows that had to be dropped.
#[must_use]
pub fn ingest_batch(rows: Vec<UpstreamRecord>, sport: SportType) -> IngestReport {
    let mut report = IngestReport {
        records: Vec::with_capacity(rows.len()),
        rejected: 0,
    };

    for (index, row) in rows.into_iter().enumerate() {
        match row.into_record(sport) {
            Ok(record) => report.records.push(record),
            Err(err) => {
                debug!("Skipping {sport} row {index}: {err}");
                report.rejected += 1;
            }
        }
    }

    report
}

/// Decode and coerce rows one by one, so a row of unexpected shape only
/// rejects itself.
#[must_use]
pub fn ingest_json_rows(rows: Vec<serde_json::Value>, sport: SportType) -> IngestReport {
    let mut undecodable = 0;
    let decoded: Vec<UpstreamRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            serde_json::from_value(row)
                .inspect_err(|err| {
                    debug!("Skipping undecodable {sport} row {index}: {err}");
                    undecodable += 1;
                })
                .ok()
        })
        .collect();

    let mut report = ingest_batch(decoded, sport);
    report.rejected += undecodable;
    report
}

fn optional(value: Option<LooseValue>) -> String {
    value
        .map(LooseValue::into_text)
        .map(|text| text.trim().to_owned())
        .unwrap_or_default()
}

fn required(value: Option<LooseValue>, field: &'static str) -> Result<String, IngestError> {
    let text = optional(value);
    if text.is_empty() {
        Err(IngestError::MissingField(field))
    } else {
        Ok(text)
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, IngestError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_parse| IngestError::InvalidDate(text.to_owned()))
}

fn parse_time(text: &str) -> Result<NaiveTime, IngestError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .ok_or_else(|| IngestError::InvalidTime(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> serde_json::Value {
        serde_json::json!({
            "District_Name_EN": "Yau Tsim Mong",
            "Venue_Name_EN": "Kowloon Park Sports Centre",
            "Venue_Address_EN": "22 Austin Road, Tsim Sha Tsui",
            "Venue_Phone_No": "2724 3344",
            "Venue_Latitude": "22.3006",
            "Venue_Longitude": 114.1694,
            "Facility_Type_Name_EN": "Badminton Court",
            "Facility_Location_Name_EN": "Arena",
            "Available_Date": "2025-01-10",
            "Session_Start_Time": "07:00",
            "Session_End_Time": "08:00",
            "Available_Courts": 4
        })
    }

    fn decode(value: serde_json::Value) -> UpstreamRecord {
        serde_json::from_value(value).expect("row decodes")
    }

    #[rstest]
    fn coerces_mixed_types(row: serde_json::Value) {
        let record = decode(row)
            .into_record(SportType::Badminton)
            .expect("valid row");

        assert_eq!(record.district, "Yau Tsim Mong");
        assert_eq!(record.available_courts, "4");
        assert_eq!(
            record.available_date,
            NaiveDate::from_ymd_opt(2025, 1, 10).expect("date")
        );
        assert_eq!(
            record.session_start,
            NaiveTime::from_hms_opt(7, 0, 0).expect("time")
        );
        let coordinates = record.coordinates.expect("coordinates");
        assert!((coordinates.latitude - 22.3006).abs() < 1e-9);
    }

    #[rstest]
    fn malformed_counts_survive_ingestion(mut row: serde_json::Value) {
        row["Available_Courts"] = serde_json::json!("n/a");
        let record = decode(row).into_record(SportType::Badminton).expect("valid row");
        assert_eq!(record.available_courts, "n/a");
    }

    #[rstest]
    fn bad_coordinates_are_dropped(mut row: serde_json::Value) {
        row["Venue_Latitude"] = serde_json::json!("");
        let record = decode(row).into_record(SportType::Tennis).expect("valid row");
        assert_eq!(record.coordinates, None);
    }

    #[rstest]
    #[case("Venue_Name_EN", serde_json::Value::Null, IngestError::MissingField("venue_name"))]
    #[case("District_Name_EN", serde_json::json!("  "), IngestError::MissingField("district"))]
    #[case(
        "Available_Date",
        serde_json::json!("10/01/2025"),
        IngestError::InvalidDate(String::from("10/01/2025"))
    )]
    #[case(
        "Session_End_Time",
        serde_json::json!("8pm"),
        IngestError::InvalidTime(String::from("8pm"))
    )]
    fn rejects_unusable_rows(
        mut row: serde_json::Value,
        #[case] field: &str,
        #[case] value: serde_json::Value,
        #[case] expected: IngestError,
    ) {
        row[field] = value;
        let result = decode(row).into_record(SportType::Badminton);
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn accepts_seconds_in_session_times(mut row: serde_json::Value) {
        row["Session_Start_Time"] = serde_json::json!("07:00:00");
        assert!(decode(row).into_record(SportType::Badminton).is_ok());
    }

    #[rstest]
    fn batch_counts_rejections(row: serde_json::Value) {
        let rows = vec![decode(row), UpstreamRecord::default()];
        let report = ingest_batch(rows, SportType::Basketball);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.records[0].sport_type, SportType::Basketball);
    }

    #[rstest]
    fn odd_shaped_count_reads_as_empty(mut row: serde_json::Value) {
        row["Available_Courts"] = serde_json::json!({ "n": 3 });
        let record = decode(row).into_record(SportType::Badminton).expect("valid row");
        assert_eq!(record.available_courts, "");
    }

    #[rstest]
    fn odd_shaped_district_rejects_only_its_row(mut row: serde_json::Value) {
        let valid = row.clone();
        row["District_Name_EN"] = serde_json::json!(["Yau Tsim Mong"]);
        let report = ingest_json_rows(vec![valid, row], SportType::Badminton);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.rejected, 1);
    }

    #[rstest]
    fn non_object_rows_are_counted_as_rejected(row: serde_json::Value) {
        let rows = vec![
            serde_json::json!("header"),
            row,
            serde_json::Value::Null,
            serde_json::json!([1, 2]),
        ];
        let report = ingest_json_rows(rows, SportType::Tennis);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].sport_type, SportType::Tennis);
        assert_eq!(report.rejected, 3);
    }
}
