//! Loading of the tabular traffic dataset.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::FieldNames;
use crate::error::{PipelineError, PipelineResult};

/// One row of the input dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficRecord {
    pub name: Option<String>,
    pub volume: Option<f64>,
    pub average_speed: Option<f64>,
    pub congestion_level: Option<f64>,
    pub date: Option<NaiveDate>,
}

/// A CSV table with case-normalized column names.
#[derive(Debug, Clone, Default)]
pub struct TrafficDataset {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

/// Lower-cases a column name and replaces spaces and slashes with underscores.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '/'], "_")
}

/// Reads a CSV file into a [`TrafficDataset`].
pub fn load_csv(path: impl AsRef<Path>) -> PipelineResult<TrafficDataset> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading traffic CSV");
    let file = std::fs::File::open(path)?;
    TrafficDataset::from_reader(file)
}

impl TrafficDataset {
    pub fn from_reader<R: Read>(reader: R) -> PipelineResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.iter().map(normalize_header).collect();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Like [`column`](Self::column), but a missing column is an error.
    pub fn require(&self, name: &str) -> PipelineResult<usize> {
        self.column(name)
            .ok_or_else(|| PipelineError::missing_field(name))
    }

    /// Parses every row into a [`TrafficRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingField`] if the name or volume column is
    /// absent. Speed, congestion and date columns are optional.
    pub fn records(&self, fields: &FieldNames) -> PipelineResult<Vec<TrafficRecord>> {
        let name = self.require(&fields.name)?;
        let volume = self.require(&fields.volume)?;
        let speed = self.column(&fields.speed);
        let congestion = self.column(&fields.congestion);
        let date = self.column(&fields.date);

        Ok(self
            .rows
            .iter()
            .map(|row| TrafficRecord {
                name: text_cell(row, Some(name)),
                volume: numeric_cell(row, Some(volume)),
                average_speed: numeric_cell(row, speed),
                congestion_level: numeric_cell(row, congestion),
                date: text_cell(row, date).and_then(|s| parse_date(&s)),
            })
            .collect())
    }

    /// Splits rows into `(weekday, weekend)` subsets by the date column.
    ///
    /// Rows whose date cannot be parsed land in the weekday subset.
    pub fn split_by_day_type(&self, date_field: &str) -> PipelineResult<(Self, Self)> {
        let date = self.require(date_field)?;
        let (weekend, weekday): (Vec<_>, Vec<_>) = self.rows.iter().cloned().partition(|row| {
            text_cell(row, Some(date))
                .and_then(|s| parse_date(&s))
                .map(|d| is_weekend(d.weekday()))
                .unwrap_or(false)
        });
        debug!(
            weekday = weekday.len(),
            weekend = weekend.len(),
            "Split dataset by day type"
        );
        Ok((self.with_rows(weekday), self.with_rows(weekend)))
    }

    fn with_rows(&self, rows: Vec<StringRecord>) -> Self {
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }
}

fn is_weekend(day: Weekday) -> bool {
    day.num_days_from_monday() >= 5
}

fn text_cell(row: &StringRecord, idx: Option<usize>) -> Option<String> {
    let value = row.get(idx?)?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn numeric_cell(row: &StringRecord, idx: Option<usize>) -> Option<f64> {
    text_cell(row, idx)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

// Ambiguous numeric dates read month first; day first only when that fails.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%d/%m/%Y", "%d-%m-%Y",
    "%d.%m.%Y",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses the date formats seen in traffic exports. Returns `None` rather than
/// failing on anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Area Name,Road/Intersection Name,Traffic Volume,Average Speed,Congestion Level
2022-01-01,Indiranagar,100 Feet Road,50590,50.23,100
2022-01-03,Whitefield,MG Rd,120,,75.5
bad-date,Koramangala,Hosur Rd,abc,30,40
";

    fn sample() -> TrafficDataset {
        TrafficDataset::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(
            normalize_header(" Road/Intersection Name "),
            "road_intersection_name"
        );
        assert_eq!(normalize_header("Traffic Volume"), "traffic_volume");
    }

    #[test]
    fn test_headers_are_normalized_on_load() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        assert!(ds.has_column("road_intersection_name"));
        assert!(ds.has_column("congestion_level"));
        assert!(!ds.has_column("Traffic Volume"));
    }

    #[test]
    fn test_records_parse_optional_cells() {
        let records = sample().records(&FieldNames::default()).unwrap();
        assert_eq!(records[1].name.as_deref(), Some("MG Rd"));
        assert_eq!(records[1].volume, Some(120.0));
        assert_eq!(records[1].average_speed, None);
        assert_eq!(records[1].congestion_level, Some(75.5));
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2022, 1, 3));
        assert_eq!(records[2].volume, None);
        assert_eq!(records[2].date, None);
    }

    #[test]
    fn test_records_missing_name_column() {
        let ds = TrafficDataset::from_reader("traffic_volume\n5\n".as_bytes()).unwrap();
        let err = ds.records(&FieldNames::default()).unwrap_err();
        assert!(
            matches!(err, PipelineError::MissingField { ref field } if field == "road_intersection_name")
        );
    }

    #[test]
    fn test_split_by_day_type() {
        // 2022-01-01 is a Saturday, 2022-01-03 a Monday.
        let (weekday, weekend) = sample().split_by_day_type("date").unwrap();
        assert_eq!(weekend.len(), 1);
        assert_eq!(weekday.len(), 2);
        assert_eq!(weekday.headers(), sample().headers());
    }

    #[test]
    fn test_split_requires_date_column() {
        let ds = TrafficDataset::from_reader("road_intersection_name,traffic_volume\nx,1\n".as_bytes())
            .unwrap();
        assert!(matches!(
            ds.split_by_day_type("date"),
            Err(PipelineError::MissingField { .. })
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 3, 14);
        assert_eq!(parse_date("2022-03-14"), expected);
        assert_eq!(parse_date("03/14/2022"), expected);
        assert_eq!(parse_date("2022-03-14 08:30:00"), expected);
        assert_eq!(parse_date("14-03-2022"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_ambiguous_dates_month_first() {
        // Friday 4 March, not Sunday 3 April.
        let friday = NaiveDate::from_ymd_opt(2022, 3, 4);
        assert_eq!(parse_date("03-04-2022"), friday);
        assert_eq!(parse_date("03.04.2022"), friday);
        assert_eq!(parse_date("03/04/2022"), friday);
    }

    #[test]
    fn test_parse_rfc3339_timestamps() {
        assert_eq!(
            parse_date("2022-01-01T08:00:00Z"),
            NaiveDate::from_ymd_opt(2022, 1, 1)
        );
        assert_eq!(
            parse_date("2022-01-01T23:30:00+05:30"),
            NaiveDate::from_ymd_opt(2022, 1, 1)
        );
    }

    #[test]
    fn test_timestamped_rows_split_into_correct_layer() {
        let ds = TrafficDataset::from_reader(
            "date,road_intersection_name,traffic_volume\n\
             03-04-2022,MG Rd,10\n\
             2022-01-01T08:00:00Z,MG Rd,20\n"
                .as_bytes(),
        )
        .unwrap();
        let (weekday, weekend) = ds.split_by_day_type("date").unwrap();
        assert_eq!(weekday.len(), 1);
        assert_eq!(weekend.len(), 1);
        let records = weekend.records(&FieldNames::default()).unwrap();
        assert_eq!(records[0].volume, Some(20.0));
    }
}
