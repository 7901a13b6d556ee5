//! Vega JSON writer, lazy mode.
//!
//! Emits a Vega v5 document that describes *how* to compute the preview:
//! a data-origin reference, the bin/aggregate transform pipeline, scales
//! whose domains read from the transformed dataset, and the responsive
//! container-width signal. No literal rows appear in the output; the
//! rendering engine resolves the origin URL and runs the transforms.
//!
//! # Mapping Strategy
//!
//! - bar kinds → `rect` marks over a band x scale, one bar per distinct value
//! - histogram kinds → `rect` marks spanning bin start/end on a linear or
//!   time x scale
//! - count axis → linear y scale, zero-based, titled "Count of Records"

use serde_json::{json, Value};

use crate::chart::{AggregationPlan, ChartKind};
use crate::naming;
use crate::spec::LazySpec;
use crate::writer::SpecWriter;
use crate::{Error, Result};

/// Vega schema version emitted by this writer
const VEGA_SCHEMA: &str = "https://vega.github.io/schema/vega/v5.json";

/// Responsive width expression. Contractual: consumers match this string
/// verbatim, including the fallback of 300 for unmeasured containers.
pub const WIDTH_EXPR: &str = "isFinite(containerSize()[0]) ? containerSize()[0] : 300";

/// Preview height in pixels
pub const DEFAULT_HEIGHT: u32 = 120;

/// y-axis title for record counts
pub const COUNT_AXIS_TITLE: &str = "Count of Records";

/// Default bar fill
const BAR_FILL: &str = "#4c78a8";

/// Vega writer for lazy preview documents
pub struct VegaWriter {
    /// Vega schema version
    schema: String,
}

impl VegaWriter {
    /// Create a new Vega writer with default settings
    pub fn new() -> Self {
        Self {
            schema: VEGA_SCHEMA.to_string(),
        }
    }

    /// The responsive-width signal, identical for every chart kind.
    fn width_signal(&self) -> Value {
        json!({
            "name": naming::WIDTH_SIGNAL,
            "init": WIDTH_EXPR,
            "on": [{"events": "window:resize", "update": WIDTH_EXPR}]
        })
    }

    /// Signals for the document: width always, plus the transform-time
    /// `maxbins` signal the bin transform reads (histograms only).
    fn signals(&self, plan: &AggregationPlan, kind: ChartKind) -> Value {
        let mut signals = vec![self.width_signal()];
        if kind.is_histogram() {
            if let Some(bins) = &plan.bins {
                signals.push(json!({
                    "name": naming::MAXBINS_SIGNAL,
                    "value": bins.count
                }));
            }
        }
        Value::Array(signals)
    }

    /// Data sources: the origin reference plus the transform pipeline.
    fn data_sources(&self, plan: &AggregationPlan, kind: ChartKind) -> Value {
        let source = json!({
            "name": naming::RAW_DATA,
            "url": naming::origin_url(&plan.grouping_field),
            "format": {"type": "json"}
        });

        let transform = match (&plan.bins, kind.is_histogram()) {
            (Some(bins), true) => json!([
                {
                    "type": "bin",
                    "field": plan.grouping_field,
                    "extent": [bins.start, bins.end()],
                    "step": bins.width,
                    "maxbins": {"signal": naming::MAXBINS_SIGNAL},
                    "as": [naming::BIN_START_FIELD, naming::BIN_END_FIELD]
                },
                {
                    "type": "aggregate",
                    "groupby": [naming::BIN_START_FIELD, naming::BIN_END_FIELD],
                    "ops": ["count"],
                    "fields": [null],
                    "as": [plan.value_field]
                }
            ]),
            _ => json!([
                {
                    "type": "aggregate",
                    "groupby": [plan.grouping_field],
                    "ops": ["count"],
                    "fields": [null],
                    "as": [plan.value_field]
                }
            ]),
        };

        json!([
            source,
            {
                "name": naming::AGG_DATA,
                "source": naming::RAW_DATA,
                "transform": transform
            }
        ])
    }

    /// Scales: band or continuous x over the grouping/bin fields, linear
    /// zero-based y over the count field. Domains read from the aggregated
    /// dataset; fusion later repoints them at literal domain datasets.
    fn scales(&self, plan: &AggregationPlan, kind: ChartKind) -> Value {
        let x = if kind.is_histogram() {
            let scale_type = match kind {
                ChartKind::HistogramTemporal => "time",
                _ => "linear",
            };
            json!({
                "name": naming::X_SCALE,
                "type": scale_type,
                "domain": {
                    "data": naming::AGG_DATA,
                    "fields": [naming::BIN_START_FIELD, naming::BIN_END_FIELD]
                },
                "range": [0, {"signal": naming::WIDTH_SIGNAL}],
                "zero": false
            })
        } else {
            json!({
                "name": naming::X_SCALE,
                "type": "band",
                "domain": {"data": naming::AGG_DATA, "field": plan.grouping_field},
                "range": [0, {"signal": naming::WIDTH_SIGNAL}],
                "paddingInner": 0.1,
                "paddingOuter": 0.05
            })
        };

        let y = json!({
            "name": naming::Y_SCALE,
            "type": "linear",
            "domain": {"data": naming::AGG_DATA, "field": plan.value_field},
            "range": [{"signal": "height"}, 0],
            "nice": true,
            "zero": true
        });

        json!([x, y])
    }

    /// Axes: x titled with the column name, y titled with the count label.
    fn axes(&self, plan: &AggregationPlan) -> Value {
        json!([
            {
                "scale": naming::X_SCALE,
                "orient": "bottom",
                "title": plan.grouping_field,
                "grid": false,
                "labelOverlap": true
            },
            {
                "scale": naming::Y_SCALE,
                "orient": "left",
                "title": COUNT_AXIS_TITLE,
                "grid": true
            }
        ])
    }

    /// The single rect mark. Bars take their width from the band scale;
    /// histogram rects span bin start to bin end.
    fn mark(&self, plan: &AggregationPlan, kind: ChartKind) -> Value {
        let x_encoding = if kind.is_histogram() {
            json!({
                "x": {"scale": naming::X_SCALE, "field": naming::BIN_START_FIELD},
                "x2": {"scale": naming::X_SCALE, "field": naming::BIN_END_FIELD}
            })
        } else {
            json!({
                "x": {"scale": naming::X_SCALE, "field": plan.grouping_field},
                "width": {"scale": naming::X_SCALE, "band": 1}
            })
        };

        let mut update = x_encoding;
        update["y"] = json!({"scale": naming::Y_SCALE, "field": plan.value_field});
        update["y2"] = json!({"scale": naming::Y_SCALE, "value": 0});
        update["fill"] = json!({"value": BAR_FILL});

        json!({
            "type": "rect",
            "style": ["bar"],
            "from": {"data": naming::AGG_DATA},
            "encode": {"update": update}
        })
    }
}

impl Default for VegaWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecWriter for VegaWriter {
    type Output = LazySpec;

    fn write(&self, plan: &AggregationPlan, kind: ChartKind) -> Result<LazySpec> {
        self.validate(plan, kind)?;

        let doc = json!({
            "$schema": self.schema,
            "autosize": {"type": "fit-x", "contains": "padding"},
            "background": "white",
            "padding": 5,
            "height": DEFAULT_HEIGHT,
            "style": "cell",
            "data": self.data_sources(plan, kind),
            "signals": self.signals(plan, kind),
            "scales": self.scales(plan, kind),
            "axes": self.axes(plan),
            "marks": [self.mark(plan, kind)]
        });

        log::debug!(
            "assembled lazy {} document for field '{}'",
            kind,
            plan.grouping_field
        );

        Ok(LazySpec::new(doc, kind, plan.clone()))
    }

    fn validate(&self, plan: &AggregationPlan, kind: ChartKind) -> Result<()> {
        if kind == ChartKind::Unsupported {
            return Err(Error::Spec(
                "no writer strategy for unsupported chart kind".to_string(),
            ));
        }
        if kind.is_histogram() != plan.bins.is_some() {
            return Err(Error::Spec(format!(
                "plan/kind mismatch: {} plan with bins {}",
                kind,
                if plan.bins.is_some() { "present" } else { "absent" }
            )));
        }
        Ok(())
    }
}
