//! Centralized naming conventions for preview-generated identifiers.
//!
//! Synthetic field names use a double-underscore prefix/suffix pattern so
//! they cannot collide with user column names. Dataset names follow the Vega
//! compiler's `source_0` / `data_0` convention; the two domain datasets that
//! only exist in evaluated documents carry descriptive names.
//!
//! # Categories
//!
//! - **Synthetic fields**: outputs of the aggregate/bin transforms
//!   (`__preview_count__`, `__preview_bin_start__`, `__preview_bin_end__`)
//! - **Datasets**: names in the document's `data` array
//! - **Signals**: the responsive-width signal and the transform-time
//!   `maxbins` signal, plus the whitelist of signals that survive fusion
//! - **Data origin**: the URL scheme for lazy data references

// ============================================================================
// Synthetic Fields
// ============================================================================

/// Output field holding the per-group record count.
pub const COUNT_FIELD: &str = "__preview_count__";

/// Output field holding the inclusive lower edge of a bin.
pub const BIN_START_FIELD: &str = "__preview_bin_start__";

/// Output field holding the upper edge of a bin.
pub const BIN_END_FIELD: &str = "__preview_bin_end__";

// ============================================================================
// Datasets
// ============================================================================

/// Name of the raw data source in the lazy document.
pub const RAW_DATA: &str = "source_0";

/// Name of the aggregated dataset in both document modes.
pub const AGG_DATA: &str = "data_0";

/// Name of the x-axis domain dataset in the evaluated document.
pub const X_DOMAIN_DATA: &str = "x_domain";

/// Name of the y-axis domain dataset in the evaluated document.
pub const Y_DOMAIN_DATA: &str = "y_domain";

/// Field carrying bin-edge values in the continuous x-domain dataset.
pub const DOMAIN_VALUE_FIELD: &str = "value";

/// Fields of the single y-domain row.
pub const DOMAIN_MIN_FIELD: &str = "min";
pub const DOMAIN_MAX_FIELD: &str = "max";

// ============================================================================
// Scales and Signals
// ============================================================================

/// Scale names shared by both document modes.
pub const X_SCALE: &str = "x";
pub const Y_SCALE: &str = "y";

/// Name of the responsive container-width signal.
pub const WIDTH_SIGNAL: &str = "width";

/// Name of the transform-time bin-count signal (lazy histograms only).
pub const MAXBINS_SIGNAL: &str = "maxbins";

/// Signals that are meaningful at render time and survive fusion.
pub const RENDER_SIGNALS: &[&str] = &[WIDTH_SIGNAL];

// ============================================================================
// Data Origin
// ============================================================================

/// URL scheme for lazy data-origin references, resolved by the hosting
/// environment's virtual-file layer.
const ORIGIN_SCHEME: &str = "preview://";

/// Build the data-origin URL for a column.
pub fn origin_url(column: &str) -> String {
    format!("{}{}", ORIGIN_SCHEME, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_fields_use_prefix_suffix_pattern() {
        for field in [COUNT_FIELD, BIN_START_FIELD, BIN_END_FIELD] {
            assert!(field.starts_with("__preview_"), "field {} lacks prefix", field);
            assert!(field.ends_with("__"), "field {} lacks suffix", field);
        }
    }

    #[test]
    fn test_origin_url() {
        assert_eq!(origin_url("price"), "preview://price");
    }

    #[test]
    fn test_width_signal_is_render_time() {
        assert!(RENDER_SIGNALS.contains(&WIDTH_SIGNAL));
        assert!(!RENDER_SIGNALS.contains(&MAXBINS_SIGNAL));
    }
}
