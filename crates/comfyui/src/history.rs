//! History-walking helpers for locating output artifacts.
//!
//! `GET /history/{prompt_id}` returns a mapping keyed by prompt ID,
//! whose `outputs` member maps node IDs to per-node output objects.
//! Nodes that produced images carry an `images` list of
//! `{filename, subfolder, type}` entries; the artifact files themselves
//! stay owned by the engine and are fetched via `/view`.

use serde::Deserialize;
use serde_json::Value;

/// Address of one output image in the engine's file store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactRef {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    /// The engine's storage type tag (`output`, `temp`, ...).
    #[serde(rename = "type")]
    pub kind: String,
}

/// Find the first output image in a history response.
///
/// Walks the node-output mapping in iteration order and returns the
/// first image of the first node that carries a non-empty `images`
/// list. Nodes without images are skipped, not treated as empty
/// results.
pub fn find_first_artifact(history: &Value, prompt_id: &str) -> Option<ArtifactRef> {
    node_outputs(history, prompt_id)?
        .values()
        .find_map(|node| images_of(node).first().cloned())
}

/// Collect every output image across all nodes, in iteration order.
pub fn collect_artifacts(history: &Value, prompt_id: &str) -> Vec<ArtifactRef> {
    let Some(outputs) = node_outputs(history, prompt_id) else {
        return Vec::new();
    };
    outputs.values().flat_map(|node| images_of(node)).collect()
}

// ---- private helpers ----

fn node_outputs<'a>(
    history: &'a Value,
    prompt_id: &str,
) -> Option<&'a serde_json::Map<String, Value>> {
    history.get(prompt_id)?.get("outputs")?.as_object()
}

fn images_of(node: &Value) -> Vec<ArtifactRef> {
    node.get("images")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|img| serde_json::from_value(img.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn history_fixture() -> Value {
        json!({
            "p1": {
                "outputs": {
                    "110": {"text": ["some latent debug output"]},
                    "122": {
                        "images": [
                            {"filename": "kora_00001_.png", "subfolder": "", "type": "output"},
                            {"filename": "kora_00002_.png", "subfolder": "", "type": "output"}
                        ]
                    },
                    "130": {
                        "images": [
                            {"filename": "kora_00003_.png", "subfolder": "extra", "type": "output"}
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn first_artifact_skips_imageless_nodes() {
        // Node "110" precedes "122" in iteration order but has no
        // image list; the first image must come from "122".
        let artifact = find_first_artifact(&history_fixture(), "p1").unwrap();
        assert_eq!(artifact.filename, "kora_00001_.png");
        assert_eq!(artifact.kind, "output");
    }

    #[test]
    fn collect_walks_all_nodes() {
        let artifacts = collect_artifacts(&history_fixture(), "p1");
        let names: Vec<&str> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(
            names,
            ["kora_00001_.png", "kora_00002_.png", "kora_00003_.png"]
        );
        assert_eq!(artifacts[2].subfolder, "extra");
    }

    #[test]
    fn missing_prompt_yields_nothing() {
        assert!(find_first_artifact(&history_fixture(), "unknown").is_none());
        assert!(collect_artifacts(&history_fixture(), "unknown").is_empty());
    }

    #[test]
    fn no_images_anywhere_yields_nothing() {
        let history = json!({"p1": {"outputs": {"5": {"text": ["x"]}}}});
        assert!(find_first_artifact(&history, "p1").is_none());
    }

    #[test]
    fn missing_subfolder_defaults_to_empty() {
        let history = json!({
            "p1": {"outputs": {"9": {"images": [{"filename": "a.png", "type": "output"}]}}}
        });
        let artifact = find_first_artifact(&history, "p1").unwrap();
        assert_eq!(artifact.subfolder, "");
    }
}
