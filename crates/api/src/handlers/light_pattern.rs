//! Light pattern: relight a subject image from an enumerated direction.
//! The direction is never free text; it selects a fixed prompt fragment
//! patched into the lighting-text node.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use kora_core::lighting::LightDirection;
use kora_core::resolution::ResolutionPreset;
use kora_core::validation::{validate_image_url, validate_prompt};
use kora_core::workflow::{NodeSlot, WorkflowTemplate};
use kora_pipeline::{run_generation, OutputMode};

use crate::error::AppError;
use crate::handlers::{fetch_input_image, random_seed};
use crate::response::{ImagePayload, SingleImageResponse, BILLABLE_UNITS_HEADER};
use crate::state::AppState;

const IMAGE_SLOT: NodeSlot = NodeSlot::new("10", "image");
const PROMPT_SLOT: NodeSlot = NodeSlot::new("6", "text");
const LIGHT_SLOT: NodeSlot = NodeSlot::new("30", "text");
const SEED_SLOT: NodeSlot = NodeSlot::new("25", "noise_seed");
const WIDTH_SLOT: NodeSlot = NodeSlot::new("5", "width");
const HEIGHT_SLOT: NodeSlot = NodeSlot::new("5", "height");

#[derive(Debug, Deserialize, Validate)]
pub struct LightPatternInput {
    /// URL of the subject image.
    pub image_url: String,
    /// Scene description.
    #[validate(length(min = 1, max = 4000))]
    pub prompt: String,
    #[serde(default)]
    pub light_direction: LightDirection,
    #[serde(default = "random_seed")]
    pub seed: i64,
    #[serde(default)]
    pub resolution: ResolutionPreset,
}

impl LightPatternInput {
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
    Json(input): Json<LightPatternInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate_input()?;

    tracing::info!(
        seed = input.seed,
        light_direction = ?input.light_direction,
        resolution = ?input.resolution,
        "Light pattern request",
    );

    let subject = fetch_input_image(&state.http, &input.image_url).await?;
    let workflow = patch_workflow(&state.templates.light_pattern, &input, &subject.filename)?;

    let outcome = run_generation(
        &state.api,
        &state.client,
        &workflow,
        vec![subject],
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

fn patch_workflow(
    template: &WorkflowTemplate,
    input: &LightPatternInput,
    image_filename: &str,
) -> Result<WorkflowTemplate, AppError> {
    let (width, height) = input.resolution.dimensions();

    let mut workflow = template.clone();
    workflow.set_slot(IMAGE_SLOT, json!(image_filename))?;
    workflow.set_slot(PROMPT_SLOT, json!(input.prompt))?;
    workflow.set_slot(
        LIGHT_SLOT,
        json!(input.light_direction.prompt_fragment()),
    )?;
    workflow.set_slot(SEED_SLOT, json!(input.seed))?;
    workflow.set_slot(WIDTH_SLOT, json!(width))?;
    workflow.set_slot(HEIGHT_SLOT, json!(height))?;
    Ok(workflow)
}
