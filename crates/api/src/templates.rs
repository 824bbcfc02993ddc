use kora_core::workflow::WorkflowTemplate;

/// The vendored workflow graphs, parsed once at startup.
///
/// Each endpoint clones its pristine template per request and patches
/// the clone, so templates are never mutated in place.
pub struct Templates {
    pub character_edit: WorkflowTemplate,
    pub consistent_character: WorkflowTemplate,
    pub light_pattern: WorkflowTemplate,
}

impl Templates {
    /// Parse the embedded graphs. Panics on malformed JSON, which can
    /// only happen from a bad build.
    pub fn load() -> Self {
        Self {
            character_edit: parse(include_str!("../assets/character_edit.json")),
            consistent_character: parse(include_str!("../assets/consistent_character.json")),
            light_pattern: parse(include_str!("../assets/light_pattern.json")),
        }
    }
}

fn parse(raw: &str) -> WorkflowTemplate {
    WorkflowTemplate::parse(raw).unwrap_or_else(|e| panic!("embedded workflow is invalid: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_parse() {
        let templates = Templates::load();
        assert!(!templates.character_edit.is_empty());
        assert!(!templates.consistent_character.is_empty());
        assert!(!templates.light_pattern.is_empty());
    }

    #[test]
    fn character_edit_has_expected_slots() {
        let t = Templates::load().character_edit;
        for node_id in ["125", "119", "109", "102", "116"] {
            assert!(t.node(node_id).is_some(), "node {node_id} missing");
        }
    }

    #[test]
    fn consistent_character_has_expected_slots() {
        let t = Templates::load().consistent_character;
        for node_id in ["50", "23", "3", "27"] {
            assert!(t.node(node_id).is_some(), "node {node_id} missing");
        }
    }

    #[test]
    fn light_pattern_has_expected_slots() {
        let t = Templates::load().light_pattern;
        for node_id in ["10", "6", "30", "25", "5"] {
            assert!(t.node(node_id).is_some(), "node {node_id} missing");
        }
    }
}
