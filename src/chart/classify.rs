//! Column type classification.

use crate::column::{Column, ColumnType};

/// The closed set of preview chart treatments.
///
/// Every [`ColumnType`] maps to exactly one kind. Adding a column type is a
/// compile-time-checked update to [`classify`]; there is no fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Count of records per distinct string value, band x scale
    BarCategorical,
    /// Count of records per truth value, band x scale
    BarBoolean,
    /// Binned counts over a linear x scale
    HistogramNumeric,
    /// Binned counts over a time x scale
    HistogramTemporal,
    /// No charting strategy; callers skip the preview
    Unsupported,
}

impl ChartKind {
    /// Whether this kind bins a continuous axis
    pub fn is_histogram(&self) -> bool {
        matches!(self, Self::HistogramNumeric | Self::HistogramTemporal)
    }

    /// Whether this kind counts distinct values on a band axis
    pub fn is_bar(&self) -> bool {
        matches!(self, Self::BarCategorical | Self::BarBoolean)
    }

    /// Stable name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::BarCategorical => "bar-categorical",
            Self::BarBoolean => "bar-boolean",
            Self::HistogramNumeric => "histogram-numeric",
            Self::HistogramTemporal => "histogram-temporal",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map a column's declared type to its chart treatment.
///
/// Pure and total: unknown types classify as [`ChartKind::Unsupported`]
/// rather than erroring, so a caller can skip the column and keep previewing
/// the rest of the table.
pub fn classify(column: &Column) -> ChartKind {
    match column.dtype() {
        ColumnType::Boolean => ChartKind::BarBoolean,
        ColumnType::String => ChartKind::BarCategorical,
        ColumnType::Integer | ColumnType::Number => ChartKind::HistogramNumeric,
        ColumnType::Date | ColumnType::DateTime | ColumnType::Time => {
            ChartKind::HistogramTemporal
        }
        ColumnType::Unknown => ChartKind::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_of(dtype: ColumnType) -> Column {
        Column::from_values("c", dtype, vec![])
    }

    #[test]
    fn test_classify_covers_every_type() {
        assert_eq!(classify(&column_of(ColumnType::Boolean)), ChartKind::BarBoolean);
        assert_eq!(
            classify(&column_of(ColumnType::String)),
            ChartKind::BarCategorical
        );
        assert_eq!(
            classify(&column_of(ColumnType::Integer)),
            ChartKind::HistogramNumeric
        );
        assert_eq!(
            classify(&column_of(ColumnType::Number)),
            ChartKind::HistogramNumeric
        );
        assert_eq!(
            classify(&column_of(ColumnType::Date)),
            ChartKind::HistogramTemporal
        );
        assert_eq!(
            classify(&column_of(ColumnType::DateTime)),
            ChartKind::HistogramTemporal
        );
        assert_eq!(
            classify(&column_of(ColumnType::Time)),
            ChartKind::HistogramTemporal
        );
        assert_eq!(
            classify(&column_of(ColumnType::Unknown)),
            ChartKind::Unsupported
        );
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ChartKind::BarBoolean.is_bar());
        assert!(ChartKind::HistogramTemporal.is_histogram());
        assert!(!ChartKind::Unsupported.is_bar());
        assert!(!ChartKind::Unsupported.is_histogram());
    }
}
