//! Workflow templates and the node-slot patch abstraction.
//!
//! A workflow is a graph of typed nodes keyed by string node ID, exactly
//! as the engine's `/prompt` endpoint consumes it. Templates are loaded
//! once per deploy and treated as read-only; every request clones the
//! template and overwrites a fixed set of [`NodeSlot`]s.
//!
//! Which node ID carries which semantic parameter is a deploy-time
//! contract between the template author and the handler. Slot maps live
//! as named constants next to each handler, so a template revision only
//! requires updating the constants, never the patch logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// One node of a workflow graph.
///
/// Unknown fields (e.g. `_meta` titles) are preserved verbatim through
/// the flattened `extra` map so a patched template round-trips without
/// losing anything the engine might care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// The engine-side node class tag (e.g. `CLIPTextEncode`).
    pub class_type: String,
    /// Input name to value mapping. Values are either literals or
    /// `[node_id, output_index]` references to other nodes.
    #[serde(default)]
    pub inputs: serde_json::Map<String, Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A static workflow graph: node ID to [`NodeSpec`], ordered by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowTemplate {
    nodes: BTreeMap<String, NodeSpec>,
}

/// A designated (node ID, input name) pair that receives a request
/// parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSlot {
    pub node_id: &'static str,
    pub input: &'static str,
}

impl NodeSlot {
    pub const fn new(node_id: &'static str, input: &'static str) -> Self {
        Self { node_id, input }
    }
}

impl WorkflowTemplate {
    /// Parse a vendored workflow JSON blob.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by ID.
    pub fn node(&self, node_id: &str) -> Option<&NodeSpec> {
        self.nodes.get(node_id)
    }

    /// Read the current value of a slot, if the node and input exist.
    pub fn slot_value(&self, slot: NodeSlot) -> Option<&Value> {
        self.nodes.get(slot.node_id)?.inputs.get(slot.input)
    }

    /// Overwrite a slot with a request parameter value.
    ///
    /// Node IDs are not validated at load time, so a slot referencing a
    /// missing node fails here, at patch time, with
    /// [`CoreError::MissingNode`].
    pub fn set_slot(&mut self, slot: NodeSlot, value: Value) -> Result<(), CoreError> {
        let node = self
            .nodes
            .get_mut(slot.node_id)
            .ok_or_else(|| CoreError::MissingNode {
                node_id: slot.node_id.to_string(),
            })?;
        node.inputs.insert(slot.input.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEMPLATE: &str = r#"{
        "102": {
            "class_type": "EmptySD3LatentImage",
            "inputs": {"width": 1024, "height": 1024, "batch_size": 1},
            "_meta": {"title": "Latent"}
        },
        "109": {
            "class_type": "RandomNoise",
            "inputs": {"noise_seed": 0}
        },
        "119": {
            "class_type": "CLIPTextEncode",
            "inputs": {"text": "", "clip": ["104", 0]}
        }
    }"#;

    const SEED_SLOT: NodeSlot = NodeSlot::new("109", "noise_seed");

    #[test]
    fn parse_preserves_nodes_and_meta() {
        let template = WorkflowTemplate::parse(TEMPLATE).unwrap();
        assert_eq!(template.len(), 3);

        let latent = template.node("102").unwrap();
        assert_eq!(latent.class_type, "EmptySD3LatentImage");
        assert_eq!(latent.extra["_meta"]["title"], json!("Latent"));
    }

    #[test]
    fn patched_seed_reads_back_exactly() {
        let template = WorkflowTemplate::parse(TEMPLATE).unwrap();
        let mut patched = template.clone();
        patched.set_slot(SEED_SLOT, json!(424242)).unwrap();

        assert_eq!(patched.slot_value(SEED_SLOT), Some(&json!(424242)));
    }

    #[test]
    fn patch_leaves_other_nodes_untouched() {
        let template = WorkflowTemplate::parse(TEMPLATE).unwrap();
        let mut patched = template.clone();
        patched.set_slot(SEED_SLOT, json!(7)).unwrap();

        // Every node except the patched one must serialize identically
        // to the pristine template.
        let pristine = serde_json::to_value(&template).unwrap();
        let modified = serde_json::to_value(&patched).unwrap();
        for (id, node) in pristine.as_object().unwrap() {
            if id != "109" {
                assert_eq!(&modified[id], node, "node {id} was modified");
            }
        }
        assert_ne!(modified["109"], pristine["109"]);
    }

    #[test]
    fn patching_clone_leaves_template_pristine() {
        let template = WorkflowTemplate::parse(TEMPLATE).unwrap();
        let before = serde_json::to_value(&template).unwrap();

        let mut patched = template.clone();
        patched.set_slot(SEED_SLOT, json!(99)).unwrap();

        assert_eq!(serde_json::to_value(&template).unwrap(), before);
    }

    #[test]
    fn missing_node_is_a_patch_time_error() {
        let mut template = WorkflowTemplate::parse(TEMPLATE).unwrap();
        let err = template
            .set_slot(NodeSlot::new("999", "text"), json!("x"))
            .unwrap_err();
        match err {
            CoreError::MissingNode { node_id } => assert_eq!(node_id, "999"),
            other => panic!("Expected MissingNode, got {other:?}"),
        }
    }

    #[test]
    fn node_reference_inputs_survive_round_trip() {
        let template = WorkflowTemplate::parse(TEMPLATE).unwrap();
        let encode = template.node("119").unwrap();
        assert_eq!(encode.inputs["clip"], json!(["104", 0]));

        let value = serde_json::to_value(&template).unwrap();
        let reparsed: WorkflowTemplate = serde_json::from_value(value).unwrap();
        assert_eq!(reparsed, template);
    }
}
