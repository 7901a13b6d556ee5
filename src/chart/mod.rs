//! Chart kind classification and aggregation planning.
//!
//! The first two stages of the preview pipeline: [`classify`] decides which
//! of the closed set of chart treatments a column gets, and [`plan`] derives
//! the aggregation parameters the spec writers consume.

pub mod classify;
pub mod plan;

pub use classify::{classify, ChartKind};
pub use plan::{plan, AggregationPlan, BinParams, DEFAULT_BIN_COUNT};
