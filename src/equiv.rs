//! Spec equivalence validation.
//!
//! Test-facing anchor for snapshot comparisons: re-runs fusion independently
//! and deep-compares the result against a provided evaluated document. On
//! divergence it reports a field path with both sides rather than a bare
//! boolean, so a regression is diagnosable from the failure message alone.
//! Never raised on production paths.

use serde_json::{json, Value};

use crate::column::Column;
use crate::fuse;
use crate::spec::{EvaluatedSpec, LazySpec};
use crate::{Error, Result};

/// A structural or numeric divergence between two chart documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// JSON-pointer-style path to the diverging field
    pub path: String,
    /// Value the independent re-evaluation produced
    pub expected: Value,
    /// Value found in the document under test
    pub actual: Value,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "at {}: expected {}, got {}",
            self.path, self.expected, self.actual
        )
    }
}

impl std::error::Error for Mismatch {}

/// Assert that an evaluated document matches what fusing the lazy document
/// against the column produces.
///
/// Recomputes the evaluation independently and deep-compares the two trees.
/// Object key order is not significant; array order and every field name,
/// nesting level, and literal value are.
pub fn assert_equivalent(
    lazy: &LazySpec,
    evaluated: &EvaluatedSpec,
    column: &Column,
) -> Result<()> {
    let reference = fuse::evaluate(lazy, column)?;
    match diff(reference.doc(), evaluated.doc()) {
        None => Ok(()),
        Some(mismatch) => Err(Error::SchemaMismatch(mismatch)),
    }
}

/// Deep-compare two documents, returning the first divergence.
pub fn diff(expected: &Value, actual: &Value) -> Option<Mismatch> {
    diff_at("", expected, actual)
}

fn diff_at(path: &str, expected: &Value, actual: &Value) -> Option<Mismatch> {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                let child = format!("{}/{}", path, key);
                match actual_map.get(key) {
                    Some(actual_value) => {
                        if let Some(mismatch) = diff_at(&child, expected_value, actual_value) {
                            return Some(mismatch);
                        }
                    }
                    None => {
                        return Some(Mismatch {
                            path: child,
                            expected: expected_value.clone(),
                            actual: Value::Null,
                        });
                    }
                }
            }
            for (key, actual_value) in actual_map {
                if !expected_map.contains_key(key) {
                    return Some(Mismatch {
                        path: format!("{}/{}", path, key),
                        expected: Value::Null,
                        actual: actual_value.clone(),
                    });
                }
            }
            None
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            if expected_items.len() != actual_items.len() {
                return Some(Mismatch {
                    path: format!("{}/length", path),
                    expected: json!(expected_items.len()),
                    actual: json!(actual_items.len()),
                });
            }
            for (index, (expected_item, actual_item)) in
                expected_items.iter().zip(actual_items).enumerate()
            {
                let child = format!("{}/{}", path, index);
                if let Some(mismatch) = diff_at(&child, expected_item, actual_item) {
                    return Some(mismatch);
                }
            }
            None
        }
        _ => {
            if expected == actual {
                None
            } else {
                Some(Mismatch {
                    path: if path.is_empty() {
                        "/".to_string()
                    } else {
                        path.to_string()
                    },
                    expected: expected.clone(),
                    actual: actual.clone(),
                })
            }
        }
    }
}
