use kora_comfyui::api::ComfyUIApiError;
use kora_comfyui::client::ComfyUIClientError;
use kora_comfyui::wait::WaitError;

/// Request-fatal pipeline errors.
///
/// Every stage of the flow has its own variant so the API layer can map
/// engine rejection, timeout, and internal failures to distinct error
/// codes. No stage is retried; each external call either succeeds or
/// the request fails.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Uploading an input image to the engine failed.
    #[error("input image upload failed: {0}")]
    Upload(#[source] ComfyUIApiError),

    /// The event channel could not be opened.
    #[error(transparent)]
    Connect(#[from] ComfyUIClientError),

    /// The engine rejected the workflow at submission. Carries the
    /// engine's error body (bad graph, missing model, ...).
    #[error("engine rejected workflow: {0}")]
    Submit(#[source] ComfyUIApiError),

    /// Waiting for the completion signal failed or timed out.
    #[error(transparent)]
    Wait(#[from] WaitError),

    /// Fetching the job history failed.
    #[error("history lookup failed: {0}")]
    History(#[source] ComfyUIApiError),

    /// The job finished but produced no output images.
    #[error("job produced no output images")]
    NoOutput,

    /// Downloading an output artifact failed.
    #[error("artifact fetch failed: {0}")]
    Fetch(#[source] ComfyUIApiError),

    /// The fetched artifact could not be decoded as an image.
    #[error("failed to decode output image: {0}")]
    Decode(#[from] image::ImageError),
}
