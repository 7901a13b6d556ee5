//! Aggregation planning.
//!
//! Derives the parameters the spec writers consume: what to group by, where
//! the count lands, and for continuous columns how the axis is binned. The
//! planner never touches raw values beyond range queries.

use crate::chart::ChartKind;
use crate::column::Column;
use crate::naming;
use crate::{Error, Result};

/// Default number of bins targeted for continuous columns.
///
/// Compatibility constant: reference output was produced with this value,
/// so changing it is a breaking change for consumers.
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Binning parameters for a continuous column.
///
/// Bins span exactly the data range: `count` bins of `width` starting at
/// `start`. All bins are closed-open except the final bin, which is
/// closed-closed so the maximum value lands inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct BinParams {
    /// Number of bins covering the data range
    pub count: usize,
    /// Width of each bin, in axis units (epoch milliseconds for temporal)
    pub width: f64,
    /// Inclusive lower edge of the first bin
    pub start: f64,
}

impl BinParams {
    /// Upper edge of the last bin
    pub fn end(&self) -> f64 {
        self.start + self.width * self.count as f64
    }

    /// All bin edges, `count + 1` values from `start` to `end`
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.count)
            .map(|i| self.start + self.width * i as f64)
            .collect()
    }

    /// Index of the bin holding `value`, or `None` when the value falls
    /// below the planned range. Values at or beyond the last edge clamp
    /// into the last bin; `end()` is an accumulated float product and can
    /// undershoot the true data maximum.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if self.count == 0 || self.width <= 0.0 {
            return None;
        }
        if value < self.start {
            return None;
        }
        let index = ((value - self.start) / self.width).floor() as usize;
        Some(index.min(self.count - 1))
    }
}

/// Aggregation parameters derived from a chart kind and column.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPlan {
    /// Field rows are grouped by (the column name)
    pub grouping_field: String,
    /// Output field receiving the per-group record count
    pub value_field: String,
    /// Binning parameters; present exactly for histogram kinds
    pub bins: Option<BinParams>,
}

/// Derive the aggregation plan for a column.
///
/// Boolean/categorical kinds count records per distinct value with no
/// binning; distinct values keep their first-seen order all the way to the
/// axis. Histogram kinds bin the data range. Fails with
/// [`Error::UnsupportedColumn`] for the unsupported kind.
pub fn plan(kind: ChartKind, column: &Column) -> Result<AggregationPlan> {
    let bins = match kind {
        ChartKind::Unsupported => {
            return Err(Error::UnsupportedColumn {
                name: column.name().to_string(),
                dtype: column.dtype(),
            });
        }
        ChartKind::BarCategorical | ChartKind::BarBoolean => None,
        ChartKind::HistogramNumeric | ChartKind::HistogramTemporal => Some(bin_params(column)),
    };

    log::debug!(
        "planned {} aggregation for column '{}' (bins: {:?})",
        kind,
        column.name(),
        bins
    );

    Ok(AggregationPlan {
        grouping_field: column.name().to_string(),
        value_field: naming::COUNT_FIELD.to_string(),
        bins,
    })
}

/// Derive bin parameters from the column's range.
fn bin_params(column: &Column) -> BinParams {
    match column.range() {
        Some((min, max)) if max > min => BinParams {
            count: DEFAULT_BIN_COUNT,
            width: (max - min) / DEFAULT_BIN_COUNT as f64,
            start: min,
        },
        // Constant column: a single bin of width 1 starting at the value
        Some((min, _)) => BinParams {
            count: 1,
            width: 1.0,
            start: min,
        },
        // No measurable range; keeps the lazy document well-formed
        None => BinParams {
            count: 1,
            width: 1.0,
            start: 0.0,
        },
    }
}
