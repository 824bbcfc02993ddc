//! Domain types for the Kora generation service.
//!
//! Pure data and validation: the model manifest, resolution presets,
//! light-direction mappings, and the workflow template / node slot
//! abstraction. No I/O lives here.

pub mod error;
pub mod lighting;
pub mod manifest;
pub mod resolution;
pub mod validation;
pub mod workflow;

pub use error::CoreError;
