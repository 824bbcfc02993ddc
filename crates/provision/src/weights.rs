//! Weight provisioning: download-if-missing plus symlink-into-place.
//!
//! For each [`ModelEntry`], the remote file is stream-downloaded to its
//! cache path unless the cache path already exists (in which case no
//! network call is made at all). After all downloads succeed, each
//! serve path is symlinked to its cache path so the engine sees the
//! expected directory layout without duplicating multi-gigabyte files
//! on disk. Partially written files are not resumed; a failed download
//! aborts setup.

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use kora_core::manifest::ModelEntry;

use crate::error::SetupError;

/// Primary env var holding a Hugging Face access token.
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";
/// Fallback env var, as set by the `huggingface_hub` tooling.
pub const HF_TOKEN_FALLBACK_ENV: &str = "HUGGING_FACE_HUB_TOKEN";

/// Read a Hugging Face token from the environment, if any.
pub fn hf_token_from_env() -> Option<String> {
    std::env::var(HF_TOKEN_ENV)
        .or_else(|_| std::env::var(HF_TOKEN_FALLBACK_ENV))
        .ok()
        .filter(|t| !t.is_empty())
}

/// Build the `Authorization` header value for a download URL.
///
/// Only huggingface.co is a known gated registry; other hosts never
/// get the token attached.
pub fn bearer_header_for(url: &str, token: Option<&str>) -> Option<String> {
    match token {
        Some(token) if url.contains("huggingface.co") => Some(format!("Bearer {token}")),
        _ => None,
    }
}

/// Provision every entry of the manifest: download missing weights,
/// then link serve paths into place.
///
/// Downloads run sequentially; the first failure propagates and aborts
/// setup entirely.
pub async fn provision_models(
    client: &reqwest::Client,
    entries: &[ModelEntry],
    token: Option<&str>,
) -> Result<(), SetupError> {
    for entry in entries {
        download_if_missing(client, entry, token).await?;
    }
    for entry in entries {
        link_into_place(entry)?;
    }
    Ok(())
}

/// Stream-download one weight file unless its cache path exists.
pub async fn download_if_missing(
    client: &reqwest::Client,
    entry: &ModelEntry,
    token: Option<&str>,
) -> Result<(), SetupError> {
    if entry.cache_path.exists() {
        tracing::debug!(path = %entry.cache_path.display(), "Weight already cached, skipping download");
        return Ok(());
    }

    ensure_parent_dir(&entry.cache_path)?;

    tracing::info!(url = %entry.url, path = %entry.cache_path.display(), "Downloading weight file");

    let mut request = client.get(&entry.url);
    if let Some(header) = bearer_header_for(&entry.url, token) {
        request = request.header(reqwest::header::AUTHORIZATION, header);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SetupError::Download {
            url: entry.url.clone(),
            status: status.as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(&entry.cache_path)
        .await
        .map_err(|e| SetupError::io(&entry.cache_path, e))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| SetupError::io(&entry.cache_path, e))?;
    }
    file.flush()
        .await
        .map_err(|e| SetupError::io(&entry.cache_path, e))?;

    tracing::info!(path = %entry.cache_path.display(), "Download complete");
    Ok(())
}

/// Symlink the serve path to the cache path unless it already exists.
pub fn link_into_place(entry: &ModelEntry) -> Result<(), SetupError> {
    if entry.serve_path.exists() {
        return Ok(());
    }
    ensure_parent_dir(&entry.serve_path)?;
    std::os::unix::fs::symlink(&entry.cache_path, &entry.serve_path)
        .map_err(|e| SetupError::io(&entry.serve_path, e))?;
    tracing::debug!(
        serve = %entry.serve_path.display(),
        cache = %entry.cache_path.display(),
        "Linked weight into engine layout",
    );
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), SetupError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SetupError::io(parent, e))?;
    }
    Ok(())
}
