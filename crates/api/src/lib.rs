//! HTTP surface for the Kora generation service.
//!
//! Exposes one POST endpoint per deployable unit (character-edit,
//! consistent-character, light-pattern) plus a health check. Handlers
//! validate input at the boundary, patch the unit's vendored workflow
//! template, and drive the shared generation pipeline.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod templates;
