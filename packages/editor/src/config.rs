//! Editor configuration.

use penmark_resize::ResizeLimits;
use serde::{Deserialize, Serialize};

/// Tunables of the editing core. Everything has a sensible default so a
/// config blob only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub resize: ResizeLimits,
    /// Width a freshly inserted table starts with, in layout units.
    pub default_table_width: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            resize: ResizeLimits::default(),
            default_table_width: 640.0,
        }
    }
}
