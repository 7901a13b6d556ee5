//! Input data model for column previews.
//!
//! This module defines the types the statistics/runtime collaborator hands
//! to the compiler: a column's declared type, its cell values as a tagged
//! scalar sum type, and an optional precomputed summary. A [`Column`] is
//! immutable once constructed; the compiler only reads from it.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// =============================================================================
// Column Types
// =============================================================================

/// Declared data type of a column, as reported by the statistics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Boolean,
    Integer,
    Number,
    Date,
    DateTime,
    Time,
    /// A type with no charting strategy; callers must skip previews for it.
    Unknown,
}

// =============================================================================
// Scalar Values
// =============================================================================

/// A single cell value.
///
/// Heterogeneous column entries are represented as an explicit tagged
/// variant with per-variant conversion rules; there is no cross-variant
/// coercion. Temporal variants store the same physical encodings the data
/// layer uses: days since the Unix epoch for dates, microseconds since the
/// epoch for datetimes, nanoseconds since midnight for times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    /// Date value (days since Unix epoch 1970-01-01)
    Date(i32),
    /// DateTime value (microseconds since Unix epoch)
    DateTime(i64),
    /// Time value (nanoseconds since midnight)
    Time(i64),
}

/// Days from CE to Unix epoch (1970-01-01)
const UNIX_EPOCH_CE_DAYS: i32 = 719163;

/// Convert days-since-epoch to ISO date string
fn date_to_iso_string(days: i32) -> String {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_CE_DAYS)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| days.to_string())
}

/// Convert microseconds-since-epoch to ISO datetime string
fn datetime_to_iso_string(micros: i64) -> String {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| micros.to_string())
}

/// Convert nanoseconds-since-midnight to ISO time string
fn time_to_iso_string(nanos: i64) -> String {
    let secs = (nanos / 1_000_000_000) as u32;
    let nano_part = (nanos % 1_000_000_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nano_part)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{}ns", nanos))
}

/// Format number for display (remove trailing zeros for integers)
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl ScalarValue {
    /// Convert to a continuous axis value.
    ///
    /// Numbers pass through; temporal variants convert to epoch
    /// milliseconds, the unit Vega time scales operate in. Strings,
    /// booleans, and nulls have no continuous interpretation.
    pub fn to_continuous(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Date(days) => Some(*days as f64 * 86_400_000.0),
            Self::DateTime(micros) => Some(*micros as f64 / 1_000.0),
            Self::Time(nanos) => Some(*nanos as f64 / 1_000_000.0),
            _ => None,
        }
    }

    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Parse ISO date string "YYYY-MM-DD" to Date variant
    pub fn from_date_string(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| Self::Date(d.num_days_from_ce() - UNIX_EPOCH_CE_DAYS))
    }

    /// Parse ISO datetime string to DateTime variant
    pub fn from_datetime_string(s: &str) -> Option<Self> {
        for fmt in &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::DateTime(dt.and_utc().timestamp_micros()));
            }
        }
        None
    }

    /// Parse ISO time string "HH:MM:SS[.sss]" to Time variant
    pub fn from_time_string(s: &str) -> Option<Self> {
        for fmt in &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"] {
            if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
                let nanos =
                    t.num_seconds_from_midnight() as i64 * 1_000_000_000 + t.nanosecond() as i64;
                return Some(Self::Time(nanos));
            }
        }
        None
    }

    /// Convert to a string key for exact-value grouping
    pub fn to_key_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Null => "null".to_string(),
            Self::Date(d) => date_to_iso_string(*d),
            Self::DateTime(dt) => datetime_to_iso_string(*dt),
            Self::Time(t) => time_to_iso_string(*t),
        }
    }

    /// Convert to a serde_json::Value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScalarValue::String(s) => serde_json::Value::String(s.clone()),
            ScalarValue::Number(n) => serde_json::json!(n),
            ScalarValue::Boolean(b) => serde_json::Value::Bool(*b),
            ScalarValue::Null => serde_json::Value::Null,
            // Temporal types serialize as ISO strings for JSON
            ScalarValue::Date(d) => serde_json::Value::String(date_to_iso_string(*d)),
            ScalarValue::DateTime(dt) => serde_json::Value::String(datetime_to_iso_string(*dt)),
            ScalarValue::Time(t) => serde_json::Value::String(time_to_iso_string(*t)),
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key_string())
    }
}

// =============================================================================
// Column Summary
// =============================================================================

/// Summary statistics for a column, as supplied by the statistics engine.
///
/// All scalar fields are optional; engines report what they can. The
/// distinct-value counts, when present, are stored in **first-seen order**
/// from the source data, which governs axis tick order downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Total number of rows, including nulls
    pub total: Option<u64>,
    /// Number of null rows
    pub nulls: Option<u64>,
    /// Number of distinct non-null values
    pub unique: Option<u64>,
    /// Minimum non-null value
    pub min: Option<ScalarValue>,
    /// Maximum non-null value
    pub max: Option<ScalarValue>,
    /// Distinct values with their counts, in first-seen order
    pub value_counts: Vec<(ScalarValue, u64)>,
}

impl ColumnSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// Column
// =============================================================================

/// A single table column handed to the compiler.
///
/// Carries raw values, a precomputed summary, or both. Range and
/// distinct-value queries prefer the summary when it can answer them and
/// fall back to scanning the raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    values: Vec<ScalarValue>,
    summary: Option<ColumnSummary>,
}

impl Column {
    /// Create a column backed by raw values
    pub fn from_values(
        name: impl Into<String>,
        dtype: ColumnType,
        values: Vec<ScalarValue>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
            summary: None,
        }
    }

    /// Create a column backed by a precomputed summary only
    pub fn from_summary(name: impl Into<String>, dtype: ColumnType, summary: ColumnSummary) -> Self {
        Self {
            name: name.into(),
            dtype,
            values: Vec::new(),
            summary: Some(summary),
        }
    }

    /// Attach a summary to a value-backed column
    pub fn with_summary(mut self, summary: ColumnSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared data type
    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    /// Raw cell values (empty for summary-only columns)
    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    /// Precomputed summary, if one was supplied
    pub fn summary(&self) -> Option<&ColumnSummary> {
        self.summary.as_ref()
    }

    /// Continuous [min, max] of the column in axis units (raw numbers for
    /// numeric columns, epoch milliseconds for temporal). Prefers the
    /// summary's endpoints; falls back to scanning raw values. `None` when
    /// the column holds no continuous values.
    pub fn range(&self) -> Option<(f64, f64)> {
        if let Some(summary) = &self.summary {
            if let (Some(min), Some(max)) = (&summary.min, &summary.max) {
                if let (Some(lo), Some(hi)) = (min.to_continuous(), max.to_continuous()) {
                    return Some((lo, hi));
                }
            }
        }

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for value in &self.values {
            if let Some(x) = value.to_continuous() {
                lo = lo.min(x);
                hi = hi.max(x);
            }
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// Distinct values with their counts, in first-seen order. Null cells
    /// are skipped. Prefers the summary's stored counts when present.
    pub fn value_counts(&self) -> Vec<(ScalarValue, u64)> {
        if let Some(summary) = &self.summary {
            if !summary.value_counts.is_empty() {
                return summary.value_counts.clone();
            }
        }

        let mut counts: indexmap::IndexMap<String, (ScalarValue, u64)> =
            indexmap::IndexMap::new();
        for value in &self.values {
            if value.is_null() {
                continue;
            }
            counts
                .entry(value.to_key_string())
                .and_modify(|(_, count)| *count += 1)
                .or_insert_with(|| (value.clone(), 1));
        }
        counts.into_values().collect()
    }
}
