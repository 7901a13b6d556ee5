//! Chart-spec document types.
//!
//! Both modes wrap a `serde_json::Value` document tree. A [`LazySpec`]
//! additionally carries the structured form of what its transform pipeline
//! describes (chart kind + aggregation plan), so the fusion evaluator can
//! execute the described aggregation without re-parsing JSON. An
//! [`EvaluatedSpec`] is pure document: everything it needs is embedded.

use serde_json::Value;

use crate::chart::{AggregationPlan, ChartKind};
use crate::{Error, Result};

/// A chart document whose aggregation is deferred to the rendering engine.
///
/// Contains no literal data rows, only a data-origin reference plus the
/// transform pipeline the engine will run.
#[derive(Debug, Clone, PartialEq)]
pub struct LazySpec {
    doc: Value,
    kind: ChartKind,
    plan: AggregationPlan,
}

impl LazySpec {
    pub(crate) fn new(doc: Value, kind: ChartKind, plan: AggregationPlan) -> Self {
        Self { doc, kind, plan }
    }

    /// The document tree
    pub fn doc(&self) -> &Value {
        &self.doc
    }

    /// The chart kind this document encodes
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// The aggregation the document's transform pipeline describes
    pub fn plan(&self) -> &AggregationPlan {
        &self.plan
    }

    /// Serialize to compact JSON
    pub fn to_json_string(&self) -> Result<String> {
        to_json(&self.doc, false)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        to_json(&self.doc, true)
    }
}

/// A chart document with aggregation and domains already executed.
///
/// Data sources hold literal rows; the only remaining signal is the
/// render-time container-width signal.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedSpec {
    doc: Value,
}

impl EvaluatedSpec {
    pub(crate) fn new(doc: Value) -> Self {
        Self { doc }
    }

    /// The document tree
    pub fn doc(&self) -> &Value {
        &self.doc
    }

    /// Serialize to compact JSON
    pub fn to_json_string(&self) -> Result<String> {
        to_json(&self.doc, false)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        to_json(&self.doc, true)
    }
}

fn to_json(doc: &Value, pretty: bool) -> Result<String> {
    let serialized = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    serialized.map_err(|e| Error::Spec(format!("failed to serialize chart document: {}", e)))
}
