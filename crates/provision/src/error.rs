use std::path::PathBuf;

/// Setup-fatal errors. Any of these aborts instance startup; no
/// request is ever served after one occurs.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The download HTTP request failed (network, DNS, TLS).
    #[error("download request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote returned a non-success status for a weight file.
    /// No retry, no partial-success continuation.
    #[error("download of {url} failed with status {status}")]
    Download { url: String, status: u16 },

    /// A filesystem operation failed (create dir, write, symlink).
    #[error("filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine subprocess could not be spawned.
    #[error("failed to spawn engine process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The engine never answered its health probe within the retry
    /// budget.
    #[error("engine did not become healthy after {attempts} attempts")]
    NeverHealthy { attempts: u32 },
}

impl SetupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
