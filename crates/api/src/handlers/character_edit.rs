//! Character edit: one reference image plus an edit instruction, one
//! output image. The NSFW LoRA is wired into the graph permanently and
//! gated purely by its strength slot.

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
use crate::response::{ImagePayload, SingleImageResponse, BILLABLE_UNITS_HEADER};
use crate::state::AppState;

const IMAGE_SLOT: NodeSlot = NodeSlot::new("125", "image");
const PROMPT_SLOT: NodeSlot = NodeSlot::new("119", "text");
const SEED_SLOT: NodeSlot = NodeSlot::new("109", "noise_seed");
const WIDTH_SLOT: NodeSlot = NodeSlot::new("102", "width");
const HEIGHT_SLOT: NodeSlot = NodeSlot::new("102", "height");
const LORA_STRENGTH_SLOT: NodeSlot = NodeSlot::new("116", "strength_model");

#[derive(Debug, Deserialize, Validate)]
pub struct CharacterEditInput {
    /// URL of the reference image to edit.
    pub image_url: String,
    /// Edit instruction.
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    /// Noise seed; random when omitted.
    #[serde(default = "random_seed")]
    pub seed: i64,
    #[serde(default)]
    pub resolution: ResolutionPreset,
    /// Enables the NSFW LoRA at full strength.
    #[serde(default)]
    pub nsfw: bool,
}

impl CharacterEditInput {
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
    Json(input): Json<CharacterEditInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate_input()?;

    tracing::info!(
        seed = input.seed,
        resolution = ?input.resolution,
        nsfw = input.nsfw,
        "Character edit request",
    );

    let reference = fetch_input_image(&state.http, &input.image_url).await?;
    let workflow = patch_workflow(
        &state.templates.character_edit,
        &input,
        &reference.filename,
    )?;

    let outcome = run_generation(
        &state.api,
        &state.client,
        &workflow,
        vec![reference],
        OutputMode::FirstImage,
        state.config.generation_timeout(),
    )
    .await?;

    let image = outcome
        .images
        .into_iter()
        .next()
        .map(ImagePayload::from)
        .ok_or(AppError::Pipeline(kora_pipeline::PipelineError::NoOutput))?;

    let units = input.resolution.billable_units();
    Ok((
        [(BILLABLE_UNITS_HEADER, units.to_string())],
        Json(SingleImageResponse {
            prompt_id: outcome.prompt_id,
            image,
            seed: input.seed,
        }),
    ))
}

/// Clone the pristine template and patch every designated slot from the
/// request.
fn patch_workflow(
    template: &WorkflowTemplate,
    input: &CharacterEditInput,
    image_filename: &str,
) -> Result<WorkflowTemplate, AppError> {
    let (width, height) = input.resolution.dimensions();
    let lora_strength = if input.nsfw { 1.0 } else { 0.0 };

    let mut workflow = template.clone();
    workflow.set_slot(IMAGE_SLOT, json!(image_filename))?;
    workflow.set_slot(PROMPT_SLOT, json!(input.prompt))?;
    workflow.set_slot(SEED_SLOT, json!(input.seed))?;
    workflow.set_slot(WIDTH_SLOT, json!(width))?;
    workflow.set_slot(HEIGHT_SLOT, json!(height))?;
    workflow.set_slot(LORA_STRENGTH_SLOT, json!(lora_strength))?;
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::Templates;

    fn input(prompt: &str, seed: i64, resolution: ResolutionPreset, nsfw: bool) -> CharacterEditInput {
        CharacterEditInput {
            image_url: "https://example.com/ref.png".to_string(),
            prompt: prompt.to_string(),
            seed,
            resolution,
            nsfw,
        }
    }

    #[test]
    fn patch_lands_every_parameter_in_its_slot() {
        let templates = Templates::load();
        let patched = patch_workflow(
            &templates.character_edit,
            &input("P", 42, ResolutionPreset::Square, false),
            "input_abc.png",
        )
        .unwrap();

        assert_eq!(patched.slot_value(PROMPT_SLOT), Some(&json!("P")));
        assert_eq!(patched.slot_value(SEED_SLOT), Some(&json!(42)));
        assert_eq!(patched.slot_value(WIDTH_SLOT), Some(&json!(1024)));
        assert_eq!(patched.slot_value(HEIGHT_SLOT), Some(&json!(1024)));
        assert_eq!(patched.slot_value(LORA_STRENGTH_SLOT), Some(&json!(0.0)));
        assert_eq!(
            patched.slot_value(IMAGE_SLOT),
            Some(&json!("input_abc.png"))
        );
    }

    #[test]
    fn nsfw_flag_drives_lora_strength() {
        let templates = Templates::load();
        let patched = patch_workflow(
            &templates.character_edit,
            &input("P", 1, ResolutionPreset::Square, true),
            "f.png",
        )
        .unwrap();
        assert_eq!(patched.slot_value(LORA_STRENGTH_SLOT), Some(&json!(1.0)));
    }

    #[test]
    fn patch_does_not_touch_unrelated_nodes() {
        let templates = Templates::load();
        let pristine = serde_json::to_value(&templates.character_edit).unwrap();
        let patched = patch_workflow(
            &templates.character_edit,
            &input("P", 42, ResolutionPreset::Hd, false),
            "f.png",
        )
        .unwrap();
        let patched = serde_json::to_value(&patched).unwrap();

        // Sampler wiring is deploy-time data; requests never alter it.
        assert_eq!(patched["113"], pristine["113"]);
        assert_eq!(patched["111"], pristine["111"]);
    }

    #[test]
    fn blank_prompt_rejected() {
        let bad = input("   ", 1, ResolutionPreset::Square, false);
        assert!(bad.validate_input().is_err());
    }

    #[test]
    fn non_http_image_url_rejected() {
        let mut bad = input("fine", 1, ResolutionPreset::Square, false);
        bad.image_url = "file:///etc/passwd".to_string();
        assert!(bad.validate_input().is_err());
    }

    #[test]
    fn seed_defaults_to_random_when_omitted() {
        let parsed: CharacterEditInput = serde_json::from_str(
            r#"{"image_url": "https://example.com/a.png", "prompt": "hi"}"#,
        )
        .unwrap();
        assert!((0..=u32::MAX as i64).contains(&parsed.seed));
        assert_eq!(parsed.resolution, ResolutionPreset::Square);
        assert!(!parsed.nsfw);
    }
}
