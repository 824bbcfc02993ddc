//! Upload -> submit -> await -> fetch, in that order, blocking per
//! request. Concurrent requests are isolated by correlation ID: each
//! run opens its own WebSocket subscription with a fresh `client_id`,
//! and the engine's own queue decides execution order.

use std::time::Duration;

use image::GenericImageView;

use kora_comfyui::api::ComfyUIApi;
use kora_comfyui::client::{ComfyUIClient, ComfyUIConnection};
use kora_comfyui::history::{collect_artifacts, find_first_artifact, ArtifactRef};
use kora_comfyui::wait::await_completion;
use kora_core::workflow::WorkflowTemplate;

use crate::error::PipelineError;

/// An input image to upload before submission, already encoded as PNG.
#[derive(Debug, Clone)]
pub struct InputImage {
    /// Upload filename, referenced by the workflow's image-load slot.
    pub filename: String,
    pub data: Vec<u8>,
}

impl InputImage {
    /// Wrap PNG bytes under a collision-free upload name.
    pub fn with_random_name(data: Vec<u8>) -> Self {
        Self {
            filename: format!("input_{}.png", uuid::Uuid::new_v4().simple()),
            data,
        }
    }
}

/// One decoded output image.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

/// Result of a completed generation run.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Server-assigned job ID.
    pub prompt_id: String,
    /// Never empty; [`PipelineError::NoOutput`] is raised instead.
    pub images: Vec<GeneratedImage>,
}

/// How many output artifacts to retrieve from the job history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// First image of the first node that produced any; the rest are
    /// dropped.
    FirstImage,
    /// Every image from every node, in history iteration order.
    AllImages,
}

/// Run one generation end to end.
///
/// The WebSocket subscription is opened before submission so no event
/// can be missed, and closed on every exit path.
pub async fn run_generation(
    api: &ComfyUIApi,
    client: &ComfyUIClient,
    workflow: &WorkflowTemplate,
    inputs: Vec<InputImage>,
    mode: OutputMode,
    wait_timeout: Duration,
) -> Result<GenerationOutcome, PipelineError> {
    for input in &inputs {
        api.upload_image(&input.filename, input.data.clone())
            .await
            .map_err(PipelineError::Upload)?;
    }

    let mut conn = client.connect().await?;
    let result = submit_and_collect(api, &mut conn, workflow, mode, wait_timeout).await;
    conn.close().await;
    result
}

async fn submit_and_collect(
    api: &ComfyUIApi,
    conn: &mut ComfyUIConnection,
    workflow: &WorkflowTemplate,
    mode: OutputMode,
    wait_timeout: Duration,
) -> Result<GenerationOutcome, PipelineError> {
    let submit = api
        .submit_workflow(workflow, &conn.client_id)
        .await
        .map_err(PipelineError::Submit)?;

    tracing::info!(
        prompt_id = %submit.prompt_id,
        queue_position = submit.number,
        "Workflow submitted",
    );

    await_completion(&mut conn.ws_stream, &submit.prompt_id, wait_timeout).await?;

    let history = api
        .get_history(&submit.prompt_id)
        .await
        .map_err(PipelineError::History)?;

    let artifacts: Vec<ArtifactRef> = match mode {
        OutputMode::FirstImage => find_first_artifact(&history, &submit.prompt_id)
            .into_iter()
            .collect(),
        OutputMode::AllImages => collect_artifacts(&history, &submit.prompt_id),
    };
    if artifacts.is_empty() {
        return Err(PipelineError::NoOutput);
    }

    let mut images = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let bytes = api.fetch_view(artifact).await.map_err(PipelineError::Fetch)?;
        images.push(decode_image(bytes)?);
    }

    tracing::info!(
        prompt_id = %submit.prompt_id,
        image_count = images.len(),
        "Generation complete",
    );

    Ok(GenerationOutcome {
        prompt_id: submit.prompt_id,
        images,
    })
}

/// Decode artifact bytes, keeping the original encoding but extracting
/// dimensions and a content type for the response payload.
fn decode_image(data: Vec<u8>) -> Result<GeneratedImage, PipelineError> {
    let format = image::guess_format(&data)?;
    let decoded = image::load_from_memory(&data)?;
    let (width, height) = decoded.dimensions();

    let content_type = match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::WebP => "image/webp",
        _ => "application/octet-stream",
    };

    Ok(GeneratedImage {
        data,
        width,
        height,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid 1x1 PNG (black pixel).
    fn tiny_png() -> Vec<u8> {
        let mut buf = Vec::new();
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buf),
                image::ImageFormat::Png,
            )
            .unwrap();
        buf
    }

    #[test]
    fn decode_extracts_dimensions_and_content_type() {
        let decoded = decode_image(tiny_png()).unwrap();
        assert_eq!((decoded.width, decoded.height), (1, 1));
        assert_eq!(decoded.content_type, "image/png");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_image(b"definitely not an image".to_vec()).is_err());
    }

    #[test]
    fn random_upload_names_are_unique_pngs() {
        let a = InputImage::with_random_name(vec![]);
        let b = InputImage::with_random_name(vec![]);
        assert_ne!(a.filename, b.filename);
        assert!(a.filename.starts_with("input_"));
        assert!(a.filename.ends_with(".png"));
    }
}
