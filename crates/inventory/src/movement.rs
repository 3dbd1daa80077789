use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use prodintel_core::parse::parse_quantity;
use prodintel_core::{SourceRecord, fields};

/// Parse a movement date.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD[ T]HH:MM:SS` (read as UTC) and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_movement_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Per-product count of movement values that were present but unparseable.
///
/// Missing or null fields are not failures.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailures {
    pub dates: u64,
    pub stock_levels: u64,
    pub units_shipped: u64,
}

impl ParseFailures {
    pub fn total(&self) -> u64 {
        self.dates + self.stock_levels + self.units_shipped
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Typed view of one inventory movement record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Movement {
    pub date: Option<DateTime<Utc>>,
    pub stock_level: Option<i64>,
    pub units_shipped: Option<i64>,
}

impl Movement {
    /// Parse the engine-relevant fields, tallying failures into `failures`.
    pub fn from_record(record: &SourceRecord, failures: &mut ParseFailures) -> Self {
        let date = parse_field(record, fields::MOVEMENT_DATE, parse_movement_date, &mut failures.dates);
        let stock_level = parse_field(record, fields::STOCK_LEVEL, parse_quantity, &mut failures.stock_levels);
        let units_shipped =
            parse_field(record, fields::UNITS_SHIPPED, parse_quantity, &mut failures.units_shipped);
        Self {
            date,
            stock_level,
            units_shipped,
        }
    }
}

fn parse_field<T>(
    record: &SourceRecord,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
    failures: &mut u64,
) -> Option<T> {
    let raw = record.get(key)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        *failures += 1;
    }
    parsed
}
