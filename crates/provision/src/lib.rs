//! Instance setup: weight provisioning and engine supervision.
//!
//! Everything here runs once at startup, before the HTTP surface comes
//! up. Failures are setup-fatal by design: a missing weight or an
//! engine that never answers its health probe means the instance must
//! not serve requests.

pub mod engine;
pub mod error;
pub mod weights;

pub use error::SetupError;
