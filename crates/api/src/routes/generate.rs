use axum::routing::post;
use axum::Router;

use crate::handlers::{character_edit, consistent_character, light_pattern};
use crate::state::AppState;

/// The three generation endpoints, one per deployable unit.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/character-edit", post(character_edit::handle))
        .route("/consistent-character", post(consistent_character::handle))
        .route("/light-pattern", post(light_pattern::handle))
}
