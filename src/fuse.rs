//! Fusion evaluator: executes a lazy document's aggregation server-side.
//!
//! Where the lazy document describes *how* to compute the preview, the
//! evaluated document contains the *already-computed* results: literal
//! aggregated rows, literal axis domains, and only the signals a renderer
//! needs for responsive re-layout. The evaluated document is derived from
//! the lazy one by patching data sources and scale domains in place, so the
//! mark/axis/scale structure of the two modes stays isomorphic by
//! construction.

use serde_json::{json, Map, Value};

use crate::chart::{AggregationPlan, ChartKind};
use crate::column::Column;
use crate::naming;
use crate::spec::{EvaluatedSpec, LazySpec};
use crate::{Error, Result};

/// Literal datasets produced by executing an aggregation plan.
struct Aggregated {
    /// Aggregated rows for the plotted series
    rows: Vec<Value>,
    /// Distinct x values (categorical) or bin edges (continuous)
    x_domain: Vec<Value>,
    /// Single {min, max} row over the aggregate counts
    y_domain: Vec<Value>,
}

impl Aggregated {
    fn empty() -> Self {
        Self {
            rows: Vec::new(),
            x_domain: Vec::new(),
            y_domain: Vec::new(),
        }
    }
}

/// Execute the aggregation a lazy document describes and embed the results.
///
/// A column with zero non-null values produces a document with empty
/// aggregated-data and domain arrays, not an error; downstream renderers
/// tolerate an empty chart.
pub fn evaluate(lazy: &LazySpec, column: &Column) -> Result<EvaluatedSpec> {
    let aggregated = if lazy.kind().is_histogram() {
        bin_counts(lazy.plan(), column)?
    } else {
        group_counts(lazy.plan(), column)
    };

    log::debug!(
        "fused {} preview for column '{}': {} aggregated rows",
        lazy.kind(),
        column.name(),
        aggregated.rows.len()
    );

    let mut doc = lazy.doc().clone();
    patch_data(&mut doc, aggregated);
    patch_scale_domains(&mut doc, lazy.plan(), lazy.kind())?;
    strip_transform_signals(&mut doc)?;

    Ok(EvaluatedSpec::new(doc))
}

/// Count records per distinct value, preserving first-seen order.
///
/// Values that never appear are omitted, not zero-filled; null cells are
/// skipped. Summary-only columns evaluate from the stored distinct counts,
/// which already carry first-seen order.
fn group_counts(plan: &AggregationPlan, column: &Column) -> Aggregated {
    let counts = column.value_counts();
    if counts.is_empty() {
        return Aggregated::empty();
    }

    let mut rows = Vec::with_capacity(counts.len());
    let mut x_domain = Vec::with_capacity(counts.len());
    for (value, count) in &counts {
        let mut row = Map::new();
        row.insert(plan.grouping_field.clone(), value.to_json());
        row.insert(plan.value_field.clone(), json!(count));
        rows.push(Value::Object(row));

        let mut domain_row = Map::new();
        domain_row.insert(plan.grouping_field.clone(), value.to_json());
        x_domain.push(Value::Object(domain_row));
    }

    Aggregated {
        rows,
        x_domain,
        y_domain: count_extent(counts.iter().map(|(_, c)| *c)),
    }
}

/// Count records per bin via `floor((value - start) / width)`, the maximum
/// value clamped into the last bin. Empty bins are omitted from the rows
/// but their edges still appear in the x-domain dataset.
fn bin_counts(plan: &AggregationPlan, column: &Column) -> Result<Aggregated> {
    let bins = plan
        .bins
        .as_ref()
        .ok_or_else(|| Error::Spec("histogram document without bin parameters".to_string()))?;

    let mut counts = vec![0u64; bins.count];
    for value in column.values() {
        let Some(x) = value.to_continuous() else {
            continue;
        };
        if let Some(index) = bins.bin_index(x) {
            counts[index] += 1;
        }
    }

    if counts.iter().all(|&c| c == 0) {
        return Ok(Aggregated::empty());
    }

    let edges = bins.edges();
    let mut rows = Vec::new();
    for (index, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let mut row = Map::new();
        row.insert(naming::BIN_START_FIELD.to_string(), json!(edges[index]));
        row.insert(naming::BIN_END_FIELD.to_string(), json!(edges[index + 1]));
        row.insert(plan.value_field.clone(), json!(count));
        rows.push(Value::Object(row));
    }

    let x_domain = edges
        .iter()
        .map(|&edge| {
            let mut row = Map::new();
            row.insert(naming::DOMAIN_VALUE_FIELD.to_string(), json!(edge));
            Value::Object(row)
        })
        .collect();

    Ok(Aggregated {
        rows,
        x_domain,
        y_domain: count_extent(counts.into_iter().filter(|&c| c > 0)),
    })
}

/// The single {min, max} y-domain row over the aggregate counts.
fn count_extent(counts: impl Iterator<Item = u64>) -> Vec<Value> {
    let mut min: Option<u64> = None;
    let mut max: Option<u64> = None;
    for count in counts {
        min = Some(min.map_or(count, |m| m.min(count)));
        max = Some(max.map_or(count, |m| m.max(count)));
    }
    match (min, max) {
        (Some(min), Some(max)) => {
            let mut row = Map::new();
            row.insert(naming::DOMAIN_MIN_FIELD.to_string(), json!(min));
            row.insert(naming::DOMAIN_MAX_FIELD.to_string(), json!(max));
            vec![Value::Object(row)]
        }
        _ => Vec::new(),
    }
}

/// Replace the document's data array with the three literal datasets. The
/// origin reference and its transform pipeline disappear with it.
fn patch_data(doc: &mut Value, aggregated: Aggregated) {
    doc["data"] = json!([
        {"name": naming::AGG_DATA, "values": aggregated.rows},
        {"name": naming::X_DOMAIN_DATA, "values": aggregated.x_domain},
        {"name": naming::Y_DOMAIN_DATA, "values": aggregated.y_domain}
    ]);
}

/// Repoint scale domains at the literal domain datasets so the renderer
/// never re-derives them from the aggregated rows.
fn patch_scale_domains(doc: &mut Value, plan: &AggregationPlan, kind: ChartKind) -> Result<()> {
    let scales = doc
        .get_mut("scales")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::Spec("lazy document missing scales".to_string()))?;

    for scale in scales.iter_mut() {
        let name = scale.get("name").and_then(Value::as_str).map(str::to_owned);
        match name.as_deref() {
            Some(n) if n == naming::X_SCALE => {
                let field = if kind.is_histogram() {
                    naming::DOMAIN_VALUE_FIELD
                } else {
                    plan.grouping_field.as_str()
                };
                scale["domain"] = json!({"data": naming::X_DOMAIN_DATA, "field": field});
            }
            Some(n) if n == naming::Y_SCALE => {
                scale["domain"] = json!({
                    "data": naming::Y_DOMAIN_DATA,
                    "fields": [naming::DOMAIN_MIN_FIELD, naming::DOMAIN_MAX_FIELD]
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Drop signals that only drive transform-time computation, keeping the
/// render-time whitelist (container resize).
fn strip_transform_signals(doc: &mut Value) -> Result<()> {
    let signals = doc
        .get_mut("signals")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| Error::Spec("lazy document missing signals".to_string()))?;

    signals.retain(|signal| {
        signal
            .get("name")
            .and_then(Value::as_str)
            .map(|name| naming::RENDER_SIGNALS.contains(&name))
            .unwrap_or(false)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnSummary, ColumnType, ScalarValue};
    use crate::writer::{SpecWriter, VegaWriter};
    use crate::{chart, naming};

    fn lazy_for(column: &Column) -> LazySpec {
        let kind = chart::classify(column);
        let plan = chart::plan(kind, column).unwrap();
        VegaWriter::new().write(&plan, kind).unwrap()
    }

    fn booleans(values: &[bool]) -> Column {
        Column::from_values(
            "flag",
            ColumnType::Boolean,
            values.iter().map(|&b| ScalarValue::Boolean(b)).collect(),
        )
    }

    fn numbers(values: &[f64]) -> Column {
        Column::from_values(
            "x",
            ColumnType::Number,
            values.iter().map(|&n| ScalarValue::Number(n)).collect(),
        )
    }

    fn dataset<'a>(doc: &'a Value, name: &str) -> &'a Value {
        doc["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["name"] == name)
            .unwrap_or_else(|| panic!("no dataset named {}", name))
    }

    #[test]
    fn test_boolean_counts_preserve_first_seen_order() {
        let column = booleans(&[true, true, false]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();

        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["flag"], true);
        assert_eq!(rows[0][naming::COUNT_FIELD], 2);
        assert_eq!(rows[1]["flag"], false);
        assert_eq!(rows[1][naming::COUNT_FIELD], 1);

        // x domain is first-seen order, not lexicographic
        let x_domain = dataset(evaluated.doc(), naming::X_DOMAIN_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(x_domain[0]["flag"], true);
        assert_eq!(x_domain[1]["flag"], false);
    }

    #[test]
    fn test_absent_values_are_omitted_not_zero_filled() {
        let column = booleans(&[true, true]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();
        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["flag"], true);
    }

    #[test]
    fn test_y_domain_holds_count_extent() {
        let column = Column::from_values(
            "category",
            ColumnType::String,
            ["a", "a", "a", "b", "c", "c"]
                .iter()
                .map(|s| ScalarValue::String(s.to_string()))
                .collect(),
        );
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();
        let y_domain = dataset(evaluated.doc(), naming::Y_DOMAIN_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(y_domain.len(), 1);
        assert_eq!(y_domain[0]["min"], 1);
        assert_eq!(y_domain[0]["max"], 3);
    }

    #[test]
    fn test_empty_column_yields_empty_datasets() {
        let column = Column::from_values(
            "flag",
            ColumnType::Boolean,
            vec![ScalarValue::Null, ScalarValue::Null],
        );
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();
        for name in [naming::AGG_DATA, naming::X_DOMAIN_DATA, naming::Y_DOMAIN_DATA] {
            assert_eq!(
                dataset(evaluated.doc(), name)["values"],
                json!([]),
                "dataset {} not empty",
                name
            );
        }
    }

    #[test]
    fn test_constant_column_single_bin() {
        let column = numbers(&[5.0, 5.0, 5.0]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();

        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][naming::BIN_START_FIELD], 5.0);
        assert_eq!(rows[0][naming::BIN_END_FIELD], 6.0);
        assert_eq!(rows[0][naming::COUNT_FIELD], 3);
    }

    #[test]
    fn test_max_value_clamps_into_last_bin() {
        // 0..=100 over ten bins of width 10; the value 100 must land in
        // [90, 100], not open an eleventh bin
        let column = numbers(&[0.0, 95.0, 100.0]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();

        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][naming::BIN_START_FIELD], 90.0);
        assert_eq!(rows[1][naming::BIN_END_FIELD], 100.0);
        assert_eq!(rows[1][naming::COUNT_FIELD], 2);
    }

    #[test]
    fn test_fractional_max_is_counted_in_final_bin() {
        // width = 0.9 / 10 is not exactly representable, so the last edge
        // undershoots the maximum; 0.9 must be counted, not dropped
        let column = numbers(&[0.0, 0.3, 0.6, 0.9]);
        let lazy = lazy_for(&column);
        let evaluated = evaluate(&lazy, &column).unwrap();

        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        let total: u64 = rows
            .iter()
            .map(|row| row[naming::COUNT_FIELD].as_u64().unwrap())
            .sum();
        assert_eq!(total, 4, "maximum value dropped from the counts");

        let edges = lazy.plan().bins.as_ref().unwrap().edges();
        let last = rows.last().unwrap();
        assert_eq!(last[naming::BIN_START_FIELD], json!(edges[edges.len() - 2]));
        assert_eq!(last[naming::BIN_END_FIELD], json!(edges[edges.len() - 1]));
        assert_eq!(last[naming::COUNT_FIELD], 1);
    }

    #[test]
    fn test_bin_edges_in_x_domain_include_empty_bins() {
        let column = numbers(&[0.0, 100.0]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();

        // Only two bins are occupied...
        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), 2);

        // ...but the domain still spans all eleven edges
        let x_domain = dataset(evaluated.doc(), naming::X_DOMAIN_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(x_domain.len(), 11);
        assert_eq!(x_domain[0]["value"], 0.0);
        assert_eq!(x_domain[10]["value"], 100.0);
    }

    #[test]
    fn test_summary_only_categorical_uses_stored_counts() {
        let mut summary = ColumnSummary::new();
        summary.value_counts = vec![
            (ScalarValue::String("beta".to_string()), 4),
            (ScalarValue::String("alpha".to_string()), 2),
        ];
        let column = Column::from_summary("category", ColumnType::String, summary);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();

        let rows = dataset(evaluated.doc(), naming::AGG_DATA)["values"]
            .as_array()
            .unwrap();
        assert_eq!(rows[0]["category"], "beta");
        assert_eq!(rows[0][naming::COUNT_FIELD], 4);
        assert_eq!(rows[1]["category"], "alpha");
    }

    #[test]
    fn test_fusion_strips_maxbins_keeps_width() {
        let column = numbers(&[1.0, 2.0, 3.0]);
        let lazy = lazy_for(&column);
        assert!(lazy.doc()["signals"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s["name"] == "maxbins"));

        let evaluated = evaluate(&lazy, &column).unwrap();
        let signals = evaluated.doc()["signals"].as_array().unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0]["name"], "width");
        assert_eq!(
            signals[0]["init"],
            "isFinite(containerSize()[0]) ? containerSize()[0] : 300"
        );
    }

    #[test]
    fn test_evaluated_document_has_no_transforms_or_origin() {
        let column = numbers(&[1.0, 2.0, 3.0]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();
        for dataset in evaluated.doc()["data"].as_array().unwrap() {
            assert!(dataset.get("transform").is_none());
            assert!(dataset.get("url").is_none());
            assert!(dataset.get("source").is_none());
            assert!(dataset.get("values").is_some());
        }
    }

    #[test]
    fn test_scale_domains_point_at_domain_datasets() {
        let column = booleans(&[true, false]);
        let evaluated = evaluate(&lazy_for(&column), &column).unwrap();
        let scales = evaluated.doc()["scales"].as_array().unwrap();
        assert_eq!(
            scales[0]["domain"],
            json!({"data": "x_domain", "field": "flag"})
        );
        assert_eq!(
            scales[1]["domain"],
            json!({"data": "y_domain", "fields": ["min", "max"]})
        );
    }

    #[test]
    fn test_marks_and_axes_untouched_by_fusion() {
        let column = numbers(&[1.0, 2.0, 3.0]);
        let lazy = lazy_for(&column);
        let evaluated = evaluate(&lazy, &column).unwrap();
        assert_eq!(lazy.doc()["marks"], evaluated.doc()["marks"]);
        assert_eq!(lazy.doc()["axes"], evaluated.doc()["axes"]);
        assert_eq!(lazy.doc()["height"], evaluated.doc()["height"]);
    }
}
