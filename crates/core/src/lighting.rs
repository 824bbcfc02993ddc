//! Light-direction presets for the light-pattern endpoint.
//!
//! Each direction maps to a fixed prompt fragment that is patched into
//! the workflow's lighting-text node.

use serde::{Deserialize, Serialize};

/// Enumerated light directions accepted by the light-pattern unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightDirection {
    Top,
    Bottom,
    Left,
    Right,
    Front,
}

impl Default for LightDirection {
    fn default() -> Self {
        Self::Front
    }
}

impl LightDirection {
    /// The text substitution consumed by the workflow template.
    pub fn prompt_fragment(self) -> &'static str {
        match self {
            Self::Top => "dramatic overhead lighting, shadows falling downward",
            Self::Bottom => "uplight from below, long upward shadows",
            Self::Left => "strong key light from the left side",
            Self::Right => "strong key light from the right side",
            Self::Front => "soft frontal lighting, evenly lit face",
        }
    }
}
