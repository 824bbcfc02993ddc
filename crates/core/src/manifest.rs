//! Model weight manifest.
//!
//! A [`ModelEntry`] ties a remote weight file to two host-local paths:
//! the cache path where the download lands, and the serve path inside
//! the engine's model directory layout (populated via symlink so the
//! file exists on disk only once). Entries are defined once at setup
//! and never mutated.

use std::path::{Path, PathBuf};

/// One model weight file: where to fetch it and where it lives on disk.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    /// Remote download URL.
    pub url: String,
    /// Host-local cache path (download target).
    pub cache_path: PathBuf,
    /// Path the engine expects; symlinked to `cache_path`.
    pub serve_path: PathBuf,
}

impl ModelEntry {
    /// Build an entry from a URL and a path relative to both roots.
    ///
    /// The same relative path (e.g. `unet/model.safetensors`) is joined
    /// onto the cache root and the serve root, keeping the two layouts
    /// mirror images of each other.
    pub fn new(
        url: impl Into<String>,
        cache_root: &Path,
        serve_root: &Path,
        relative: &str,
    ) -> Self {
        Self {
            url: url.into(),
            cache_path: cache_root.join(relative),
            serve_path: serve_root.join(relative),
        }
    }
}

/// The vendored FLUX.2-klein model list shared by all three units.
///
/// Pure data: main diffusion model, VAE, text encoder, and the
/// strength-gated LoRA.
pub fn flux_klein_manifest(cache_root: &Path, serve_root: &Path) -> Vec<ModelEntry> {
    vec![
        ModelEntry::new(
            "https://huggingface.co/black-forest-labs/FLUX.2-klein-9B/resolve/main/flux-2-klein-9b.safetensors",
            cache_root,
            serve_root,
            "unet/flux-2-klein-9b.safetensors",
        ),
        ModelEntry::new(
            "https://huggingface.co/Comfy-Org/flux2-dev/resolve/main/split_files/vae/flux2-vae.safetensors",
            cache_root,
            serve_root,
            "vae/flux2-vae.safetensors",
        ),
        ModelEntry::new(
            "https://huggingface.co/Comfy-Org/flux2-klein-9B/resolve/main/split_files/text_encoders/qwen_3_8b_fp8mixed.safetensors",
            cache_root,
            serve_root,
            "clip/qwen_3_8b_fp8mixed.safetensors",
        ),
        ModelEntry::new(
            "https://huggingface.co/kirusanth08/flux_klein_nsfw_v2/resolve/main/Flux%20Klein%20-%20NSFW%20v2.safetensors",
            cache_root,
            serve_root,
            "loras/Flux Klein - NSFW v2.safetensors",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_joins_relative_path_onto_both_roots() {
        let entry = ModelEntry::new(
            "https://example.com/m.safetensors",
            Path::new("/data/models"),
            Path::new("/comfyui/models"),
            "unet/m.safetensors",
        );
        assert_eq!(entry.cache_path, Path::new("/data/models/unet/m.safetensors"));
        assert_eq!(entry.serve_path, Path::new("/comfyui/models/unet/m.safetensors"));
    }

    #[test]
    fn manifest_has_all_weight_classes() {
        let entries = flux_klein_manifest(Path::new("/data/models"), Path::new("/comfyui/models"));
        assert_eq!(entries.len(), 4);

        let subdirs: Vec<&str> = entries
            .iter()
            .map(|e| {
                e.cache_path
                    .parent()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .unwrap()
            })
            .collect();
        assert_eq!(subdirs, ["unet", "vae", "clip", "loras"]);
    }
}
