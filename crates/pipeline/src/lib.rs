//! The per-request generation pipeline.
//!
//! One strictly sequential flow per request: upload input images,
//! subscribe to the event channel, submit the patched workflow, block
//! on the completion signal (bounded), fetch the job history, resolve
//! the output artifact(s), and download the image bytes.

pub mod error;
pub mod generate;

pub use error::PipelineError;
pub use generate::{run_generation, GeneratedImage, GenerationOutcome, InputImage, OutputMode};
