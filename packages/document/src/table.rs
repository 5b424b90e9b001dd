//! Table layout attributes.
//!
//! Per-column widths and per-row heights are stored on the table node as one
//! comma-delimited string each, one entry per column/row. Empty entries mean
//! "default/auto". Decoding tolerates junk entries and count mismatches: a
//! structural edit that adds or removes a column must not break attribute
//! restoration.

use crate::node::AttrMap;
use serde_json::Value;

pub const ATTR_WIDTH: &str = "width";
pub const ATTR_COLUMN_WIDTHS: &str = "columnWidths";
pub const ATTR_ROW_HEIGHTS: &str = "rowHeights";

/// Encode a dimension list. `None` entries encode as empty strings.
pub fn encode_dimensions(values: &[Option<f32>]) -> String {
    values
        .iter()
        .map(|value| match value {
            Some(value) => format_unit(*value),
            None => String::new(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a dimension list. Unparseable or non-positive entries decode to
/// `None` (default), never to an error.
pub fn decode_dimensions(encoded: &str) -> Vec<Option<f32>> {
    if encoded.trim().is_empty() {
        return Vec::new();
    }
    encoded
        .split(',')
        .map(|entry| {
            let entry = entry.trim().trim_end_matches("px");
            entry
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite() && *value > 0.0)
        })
        .collect()
}

/// Fit a decoded list to the current column/row count: extra entries are
/// ignored, missing entries stay at default.
pub fn fit_to_count(mut values: Vec<Option<f32>>, count: usize) -> Vec<Option<f32>> {
    values.truncate(count);
    values.resize(count, None);
    values
}

/// Layout units print without a trailing fraction when whole.
pub fn format_unit(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Decoded table geometry attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableGeometry {
    pub column_widths: Vec<Option<f32>>,
    pub row_heights: Vec<Option<f32>>,
    pub width: Option<f32>,
}

impl TableGeometry {
    pub fn from_attributes(attrs: &AttrMap) -> Self {
        let decode = |name: &str| {
            attrs
                .get(name)
                .and_then(Value::as_str)
                .map(decode_dimensions)
                .unwrap_or_default()
        };
        let width = attrs
            .get(ATTR_WIDTH)
            .and_then(Value::as_str)
            .and_then(|raw| raw.trim().trim_end_matches("px").parse::<f32>().ok())
            .filter(|value| value.is_finite() && *value > 0.0);
        Self {
            column_widths: decode(ATTR_COLUMN_WIDTHS),
            row_heights: decode(ATTR_ROW_HEIGHTS),
            width,
        }
    }

    /// Encode back into table-node attributes.
    pub fn to_attributes(&self) -> AttrMap {
        let mut attrs = AttrMap::new();
        if !self.column_widths.is_empty() {
            attrs.insert(
                ATTR_COLUMN_WIDTHS.into(),
                encode_dimensions(&self.column_widths).into(),
            );
        }
        if !self.row_heights.is_empty() {
            attrs.insert(
                ATTR_ROW_HEIGHTS.into(),
                encode_dimensions(&self.row_heights).into(),
            );
        }
        if let Some(width) = self.width {
            attrs.insert(ATTR_WIDTH.into(), format!("{}px", format_unit(width)).into());
        }
        attrs
    }
}
