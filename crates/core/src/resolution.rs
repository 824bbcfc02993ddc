//! Resolution presets exposed on the generation endpoints.
//!
//! Each preset maps to a fixed (width, height) pair that is patched into
//! the workflow's latent-size node. The mapping is deterministic; the
//! preset name is the wire value accepted in request bodies.

use serde::{Deserialize, Serialize};

/// Output resolution presets.
///
/// Serialized names match the public API contract exactly (mixed-case
/// `squareHD` included), so out-of-enum values are rejected by serde at
/// the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionPreset {
    #[serde(rename = "hd")]
    Hd,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "squareHD")]
    SquareHd,
    #[serde(rename = "portrait_3_4")]
    Portrait34,
    #[serde(rename = "portrait_9_16")]
    Portrait916,
    #[serde(rename = "landscape_16_9")]
    Landscape169,
    #[serde(rename = "landscape_4_3")]
    Landscape43,
}

impl Default for ResolutionPreset {
    fn default() -> Self {
        Self::Square
    }
}

impl ResolutionPreset {
    /// The (width, height) pair for this preset, in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd => (720, 1280),
            Self::Square => (1024, 1024),
            Self::SquareHd => (2048, 2048),
            Self::Portrait34 => (1536, 2048),
            Self::Portrait916 => (1152, 2048),
            Self::Landscape169 => (2048, 1152),
            Self::Landscape43 => (2048, 1536),
        }
    }

    /// Billing units derived from the output pixel count, at one unit
    /// per 1024x1024 worth of pixels, truncated.
    pub fn billable_units(self) -> u32 {
        let (width, height) = self.dimensions();
        (width as u64 * height as u64 / (1024 * 1024)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_deterministic() {
        for _ in 0..3 {
            assert_eq!(ResolutionPreset::Square.dimensions(), (1024, 1024));
            assert_eq!(ResolutionPreset::Hd.dimensions(), (720, 1280));
            assert_eq!(ResolutionPreset::SquareHd.dimensions(), (2048, 2048));
            assert_eq!(ResolutionPreset::Portrait34.dimensions(), (1536, 2048));
            assert_eq!(ResolutionPreset::Portrait916.dimensions(), (1152, 2048));
            assert_eq!(ResolutionPreset::Landscape169.dimensions(), (2048, 1152));
            assert_eq!(ResolutionPreset::Landscape43.dimensions(), (2048, 1536));
        }
    }

    #[test]
    fn default_is_square() {
        assert_eq!(ResolutionPreset::default(), ResolutionPreset::Square);
    }

    #[test]
    fn wire_names_round_trip() {
        let json = r#""squareHD""#;
        let preset: ResolutionPreset = serde_json::from_str(json).unwrap();
        assert_eq!(preset, ResolutionPreset::SquareHd);
        assert_eq!(serde_json::to_string(&preset).unwrap(), json);

        let preset: ResolutionPreset = serde_json::from_str(r#""portrait_9_16""#).unwrap();
        assert_eq!(preset, ResolutionPreset::Portrait916);
    }

    #[test]
    fn unknown_preset_rejected() {
        assert!(serde_json::from_str::<ResolutionPreset>(r#""4k""#).is_err());
    }

    #[test]
    fn billable_units_truncate() {
        // 720x1280 is below one megapixel-unit.
        assert_eq!(ResolutionPreset::Hd.billable_units(), 0);
        assert_eq!(ResolutionPreset::Square.billable_units(), 1);
        assert_eq!(ResolutionPreset::SquareHd.billable_units(), 4);
        assert_eq!(ResolutionPreset::Landscape43.billable_units(), 3);
    }
}
