//! CPU side of a model import.
//!
//! [`SceneData::import`] walks the scene a file describes and returns plain
//! vertex, index and pixel data. Nothing here touches the GPU; uploading is
//! [`Model::from_scene`](crate::data_structures::model::Model::from_scene).
//!
//! Textures are de-duplicated by source path: the first mesh that references a
//! path decodes it, every later reference reuses the index of that texture.

use std::{collections::HashMap, future::Future, path::Path};

use image::RgbaImage;

use crate::{
    data_structures::{model::ModelVertex, texture::TextureKind},
    resources::{
        decode_or_placeholder,
        error::{ImportError, ImportResult},
        gltf_import, obj_import,
    },
};

#[derive(Clone, Debug)]
pub struct TextureData {
    pub kind: TextureKind,
    /// Resolved source path, or `<file>#image<N>` for images embedded in a glTF buffer.
    pub path: String,
    pub image: RgbaImage,
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Indices into [`SceneData::textures`], diffuse maps first.
    pub textures: Vec<usize>,
}

impl MeshData {
    /// Checks the mesh can be drawn as a triangle list without reading out of bounds.
    pub(crate) fn validate(&self, path: &Path) -> ImportResult<()> {
        let incomplete = |reason: String| ImportError::Incomplete {
            path: path.to_path_buf(),
            mesh: self.name.clone(),
            reason,
        };
        if self.vertices.is_empty() {
            return Err(incomplete("no vertex positions".to_string()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(incomplete(format!("{} indices do not form triangles", self.indices.len())));
        }
        if let Some(index) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(incomplete(format!(
                "index {index} out of range for {} vertices",
                self.vertices.len()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneData {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureData>,
}

impl SceneData {
    /// Import the scene at `path`, choosing the importer by file extension
    /// (`obj`, `gltf` or `glb`).
    pub async fn import(path: &Path) -> ImportResult<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "obj" => obj_import::import(path).await,
            "gltf" | "glb" => gltf_import::import(path).await,
            _ => Err(ImportError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Decoded textures of one import, keyed by source path.
#[derive(Debug, Default)]
pub(crate) struct TextureRegistry {
    loaded: HashMap<String, usize>,
    textures: Vec<TextureData>,
}

impl TextureRegistry {
    /// Index of the texture for `key`, decoding it with the bytes `load`
    /// produces only the first time the key is seen.
    pub async fn get_or_load<F, Fut>(&mut self, key: String, kind: TextureKind, load: F) -> usize
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<u8>>>,
    {
        if let Some(&index) = self.loaded.get(&key) {
            return index;
        }
        let image = decode_or_placeholder(load().await, kind, &key);
        let index = self.textures.len();
        self.textures.push(TextureData {
            kind,
            path: key.clone(),
            image,
        });
        self.loaded.insert(key, index);
        index
    }

    pub fn into_textures(self) -> Vec<TextureData> {
        self.textures
    }
}

/// Key for a texture file referenced from a model: the path resolved against
/// the model's directory.
pub(crate) fn texture_key(base: &Path, relative: &str) -> String {
    base.join(relative).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, io::Cursor, path::PathBuf};

    fn png_bytes(colour: [u8; 4]) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(2, 2, image::Rgba(colour))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[tokio::test]
    async fn repeated_paths_are_decoded_once() {
        let decodes = Cell::new(0);
        let counter = &decodes;
        let mut registry = TextureRegistry::default();
        let load = move || async move {
            counter.set(counter.get() + 1);
            Ok::<_, anyhow::Error>(png_bytes([10, 20, 30, 255]))
        };

        let first = registry.get_or_load("a.png".into(), TextureKind::Diffuse, load).await;
        let again = registry.get_or_load("a.png".into(), TextureKind::Diffuse, load).await;
        let other = registry.get_or_load("b.png".into(), TextureKind::Specular, load).await;

        assert_eq!((first, again, other), (0, 0, 1));
        assert_eq!(decodes.get(), 2);
        let textures = registry.into_textures();
        assert_eq!(textures.len(), 2);
        assert_eq!(textures[0].image.get_pixel(1, 1).0, [10, 20, 30, 255]);
        assert_eq!(textures[1].kind, TextureKind::Specular);
    }

    #[tokio::test]
    async fn unknown_extensions_are_rejected() {
        let err = SceneData::import(Path::new("model.fbx")).await.unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[test]
    fn out_of_range_indices_make_a_mesh_incomplete() {
        let mesh = MeshData {
            name: "broken".into(),
            vertices: vec![ModelVertex::default(); 3],
            indices: vec![0, 1, 3],
            textures: vec![],
        };
        let err = mesh.validate(&PathBuf::from("broken.obj")).unwrap_err();
        assert!(matches!(err, ImportError::Incomplete { .. }), "{err}");
    }

    #[test]
    fn texture_keys_resolve_against_the_model_directory() {
        assert_eq!(
            texture_key(Path::new("assets/models/crates"), "container.png"),
            Path::new("assets/models/crates/container.png").to_string_lossy()
        );
    }
}
