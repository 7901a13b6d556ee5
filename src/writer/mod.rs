//! Spec writer abstraction layer.
//!
//! Writers turn an aggregation plan and chart kind into a declarative chart
//! document for a specific rendering grammar. The single built-in writer
//! targets Vega; the trait is the seam a different grammar version would
//! plug into.

use crate::chart::{AggregationPlan, ChartKind};
use crate::Result;

pub mod vega;

pub use vega::VegaWriter;

/// Trait for chart-spec writers
///
/// # Associated Types
///
/// * `Output` - The document type produced by `write()`.
pub trait SpecWriter {
    /// The output type produced by this writer.
    type Output;

    /// Generate a chart document from an aggregation plan
    ///
    /// # Errors
    ///
    /// Returns an error if the plan and kind are structurally inconsistent
    /// (see [`SpecWriter::validate`]) or document construction fails.
    fn write(&self, plan: &AggregationPlan, kind: ChartKind) -> Result<Self::Output>;

    /// Validate that a plan/kind pair can be rendered by this writer
    /// without generating output
    fn validate(&self, plan: &AggregationPlan, kind: ChartKind) -> Result<()>;
}
