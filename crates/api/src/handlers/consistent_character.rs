//! Consistent character: one reference image plus a scene prompt,
//! a batch of output images that keep the reference's identity.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use kora_core::resolution::ResolutionPreset;
use kora_core::validation::{validate_image_url, validate_prompt};
use kora_core::workflow::{NodeSlot, WorkflowTemplate};
use kora_pipeline::{run_generation, OutputMode};

use crate::error::AppError;
use crate::handlers::{fetch_input_image, random_seed};
use crate::response::{ImagePayload, MultiImageResponse, BILLABLE_UNITS_HEADER};
use crate::state::AppState;

const IMAGE_SLOT: NodeSlot = NodeSlot::new("50", "image");
const PROMPT_SLOT: NodeSlot = NodeSlot::new("23", "text");
const SEED_SLOT: NodeSlot = NodeSlot::new("3", "noise_seed");
const WIDTH_SLOT: NodeSlot = NodeSlot::new("27", "width");
const HEIGHT_SLOT: NodeSlot = NodeSlot::new("27", "height");

#[derive(Debug, Deserialize, Validate)]
pub struct ConsistentCharacterInput {
    /// URL of the character reference image.
    pub image_url: String,
    /// Scene description to place the character in.
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    #[serde(default = "random_seed")]
    pub seed: i64,
    #[serde(default)]
    pub resolution: ResolutionPreset,
}

impl ConsistentCharacterInput {
    fn validate_input(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_prompt(&self.prompt)?;
        validate_image_url(&self.image_url)?;
        Ok(())
    }
}

pub async fn handle(
    State(state): State<AppState>,
    Json(input): Json<ConsistentCharacterInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate_input()?;

    tracing::info!(
        seed = input.seed,
        resolution = ?input.resolution,
        "Consistent character request",
    );

    let reference = fetch_input_image(&state.http, &input.image_url).await?;
    let workflow = patch_workflow(
        &state.templates.consistent_character,
        &input,
        &reference.filename,
    )?;

    let outcome = run_generation(
        &state.api,
        &state.client,
        &workflow,
        vec![reference],
        OutputMode::AllImages,
        state.config.generation_timeout(),
    )
    .await?;

    // The batch runs as one job; billing scales with image count.
    let units = input.resolution.billable_units() * outcome.images.len() as u32;
    Ok((
        [(BILLABLE_UNITS_HEADER, units.to_string())],
        Json(MultiImageResponse {
            prompt_id: outcome.prompt_id,
            images: outcome.images.into_iter().map(ImagePayload::from).collect(),
            seed: input.seed,
        }),
    ))
}

fn patch_workflow(
    template: &WorkflowTemplate,
    input: &ConsistentCharacterInput,
    image_filename: &str,
) -> Result<WorkflowTemplate, AppError> {
    let (width, height) = input.resolution.dimensions();

    let mut workflow = template.clone();
    workflow.set_slot(IMAGE_SLOT, json!(image_filename))?;
    workflow.set_slot(PROMPT_SLOT, json!(input.prompt))?;
    workflow.set_slot(SEED_SLOT, json!(input.seed))?;
    workflow.set_slot(WIDTH_SLOT, json!(width))?;
    workflow.set_slot(HEIGHT_SLOT, json!(height))?;
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::Templates;

    fn input() -> ConsistentCharacterInput {
        ConsistentCharacterInput {
            image_url: "https://example.com/character.png".to_string(),
            prompt: "sitting in a library".to_string(),
            seed: 7,
            resolution: ResolutionPreset::Portrait34,
        }
    }

    #[test]
    fn patch_lands_every_parameter_in_its_slot() {
        let templates = Templates::load();
        let patched =
            patch_workflow(&templates.consistent_character, &input(), "input_x.png").unwrap();

        assert_eq!(
            patched.slot_value(PROMPT_SLOT),
            Some(&json!("sitting in a library"))
        );
        assert_eq!(patched.slot_value(SEED_SLOT), Some(&json!(7)));
        assert_eq!(patched.slot_value(WIDTH_SLOT), Some(&json!(1536)));
        assert_eq!(patched.slot_value(HEIGHT_SLOT), Some(&json!(2048)));
        assert_eq!(patched.slot_value(IMAGE_SLOT), Some(&json!("input_x.png")));
    }

    #[test]
    fn batch_size_is_template_data_not_request_data() {
        let templates = Templates::load();
        let patched =
            patch_workflow(&templates.consistent_character, &input(), "f.png").unwrap();
        let latent = patched.node("27").unwrap();
        assert_eq!(latent.inputs["batch_size"], json!(4));
    }

    #[test]
    fn blank_prompt_rejected() {
        let mut bad = input();
        bad.prompt = "  ".to_string();
        assert!(bad.validate_input().is_err());
    }
}
