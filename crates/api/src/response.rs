use base64::Engine as _;
use serde::Serialize;

use kora_pipeline::GeneratedImage;

/// Custom header carrying the billable-unit count for this request,
/// derived from the output resolution.
pub const BILLABLE_UNITS_HEADER: &str = "x-billable-units";

/// One output image, inlined as base64.
#[derive(Debug, Serialize)]
pub struct ImagePayload {
    /// Base64-encoded image bytes (standard alphabet, padded).
    pub content: String,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

impl From<GeneratedImage> for ImagePayload {
    fn from(image: GeneratedImage) -> Self {
        Self {
            content: base64::engine::general_purpose::STANDARD.encode(&image.data),
            content_type: image.content_type,
            width: image.width,
            height: image.height,
        }
    }
}

/// Response body for the single-image endpoints.
#[derive(Debug, Serialize)]
pub struct SingleImageResponse {
    pub prompt_id: String,
    pub image: ImagePayload,
    pub seed: i64,
}

/// Response body for the multi-image endpoint.
#[derive(Debug, Serialize)]
pub struct MultiImageResponse {
    pub prompt_id: String,
    pub images: Vec<ImagePayload>,
    pub seed: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_encodes_bytes_as_standard_base64() {
        let payload = ImagePayload::from(GeneratedImage {
            data: vec![0xff, 0x00, 0xff],
            width: 1,
            height: 1,
            content_type: "image/png",
        });
        assert_eq!(payload.content, "/wD/");
        assert_eq!(payload.content_type, "image/png");
    }
}
