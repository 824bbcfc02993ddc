#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A workflow patch referenced a node ID that does not exist in the
    /// template. This is a template/handler contract violation and is
    /// surfaced as a request-level failure, not a startup failure.
    #[error("Workflow node not found: {node_id}")]
    MissingNode { node_id: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
