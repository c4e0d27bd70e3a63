//! Loading of files from disk: shader sources, images and 3D scenes.
//!
//! File reads go through tokio so they can be awaited from the start-up path;
//! decoding and import run once per file before the first frame.

use std::path::Path;

use anyhow::Context as _;
use image::RgbaImage;

use crate::data_structures::texture::TextureKind;

pub mod error;
mod gltf_import;
mod obj_import;
pub mod scene;

pub async fn load_string(path: &Path) -> anyhow::Result<String> {
    let txt = tokio::fs::read_to_string(path).await?;
    Ok(txt)
}

pub async fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    let data = tokio::fs::read(path).await?;
    Ok(data)
}

pub fn decode_image(bytes: &[u8]) -> image::ImageResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Read and decode the image at `path`. Failures are errors; callers that want
/// a fallback use [`decode_or_placeholder`].
pub async fn load_image(path: &Path) -> anyhow::Result<RgbaImage> {
    let bytes = load_binary(path)
        .await
        .with_context(|| format!("Failed to read texture {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("Failed to decode texture {}", path.display()))
}

/// A single pixel of the colour an empty slot of `kind` would sample.
pub fn placeholder_image(kind: TextureKind) -> RgbaImage {
    RgbaImage::from_pixel(1, 1, image::Rgba(kind.placeholder_colour()))
}

/// Decode a material texture, falling back to a placeholder so the rest of the
/// model still imports.
pub(crate) fn decode_or_placeholder(
    bytes: anyhow::Result<Vec<u8>>,
    kind: TextureKind,
    key: &str,
) -> RgbaImage {
    match bytes.and_then(|bytes| Ok(decode_image(&bytes)?)) {
        Ok(image) => image,
        Err(e) => {
            log::error!("Texture {key} could not be loaded, using a placeholder: {e:#}");
            placeholder_image(kind)
        }
    }
}
