//! ComfyUI WebSocket and REST client library.
//!
//! Provides typed message parsing, WebSocket connection handling, HTTP
//! API wrappers (submit, history, artifact view, image upload, health),
//! a bounded completion wait, and history-walking helpers for locating
//! output artifacts.

pub mod api;
pub mod client;
pub mod history;
pub mod messages;
pub mod wait;
