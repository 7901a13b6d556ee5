/*!
# chart-preview - Column Preview Spec Compiler

Compiles a tabular column's values (or summary statistics) into a
declarative Vega document describing a histogram/bar preview of that column.

## Two output modes

- **Lazy**: the document defers data binding, aggregation, and scale-domain
  computation to the rendering engine. It carries a data-origin reference
  plus a bin/aggregate transform pipeline.
- **Evaluated (fused)**: aggregation, binning, and domain computation have
  already been executed here and are embedded as literal datasets; only
  render-time signals (container resize) remain.

Both modes are semantically equivalent; the evaluated document is derived
from the lazy one by patching, so their mark/axis/scale structure is
isomorphic by construction.

## Example

```rust
use chart_preview::{compile_evaluated, Column, ColumnType, ScalarValue};

let column = Column::from_values(
    "flag",
    ColumnType::Boolean,
    vec![
        ScalarValue::Boolean(true),
        ScalarValue::Boolean(true),
        ScalarValue::Boolean(false),
    ],
);
let spec = compile_evaluated(&column).unwrap();
let json = spec.to_json_string().unwrap();
assert!(json.contains("\"$schema\""));
```

## Core Components

- [`column`] - Input data model (columns, tagged scalar values, summaries)
- [`chart`] - Chart kind classification and aggregation planning
- [`writer`] - Lazy-mode Vega document assembly
- [`fuse`] - Fusion evaluation into pre-computed documents
- [`equiv`] - Equivalence validation between the two modes (test-facing)
*/

pub mod chart;
pub mod column;
pub mod equiv;
pub mod fuse;
pub mod naming;
pub mod spec;
pub mod writer;

// Re-export key types for convenience
pub use chart::{classify, plan, AggregationPlan, BinParams, ChartKind};
pub use column::{Column, ColumnSummary, ColumnType, ScalarValue};
pub use equiv::{assert_equivalent, Mismatch};
pub use fuse::evaluate;
pub use spec::{EvaluatedSpec, LazySpec};
pub use writer::{SpecWriter, VegaWriter};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The column's declared type has no charting strategy; callers skip
    /// the preview rather than rendering garbage.
    #[error("no charting strategy for column '{name}' of type {dtype:?}")]
    UnsupportedColumn { name: String, dtype: ColumnType },

    /// Internal document-construction failure. Not expected on any
    /// reachable path; exists so fallible serde operations propagate
    /// instead of panicking.
    #[error("spec construction error: {0}")]
    Spec(String),

    /// Divergence between two documents the validator expected to match.
    /// Diagnostic only; never raised in production paths.
    #[error("spec mismatch: {0}")]
    SchemaMismatch(#[from] Mismatch),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile a column into a lazy preview document.
///
/// Runs classify → plan → assemble. Fails with
/// [`Error::UnsupportedColumn`] for unknown-typed columns.
pub fn compile_lazy(column: &Column) -> Result<LazySpec> {
    let kind = chart::classify(column);
    let plan = chart::plan(kind, column)?;
    VegaWriter::new().write(&plan, kind)
}

/// Compile a column into a pre-evaluated preview document.
///
/// Runs the lazy pipeline, then fuses the result against the column's
/// actual data.
pub fn compile_evaluated(column: &Column) -> Result<EvaluatedSpec> {
    let lazy = compile_lazy(column)?;
    fuse::evaluate(&lazy, column)
}
