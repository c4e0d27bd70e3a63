use std::path::{Path, PathBuf};

use anyhow::anyhow;
use gltf::mesh::Mode;

use crate::{
    data_structures::{model::ModelVertex, texture::TextureKind},
    resources::{
        error::{ImportError, ImportResult},
        load_binary,
        scene::{MeshData, SceneData, TextureRegistry, texture_key},
    },
};

/**
 * Walks the default scene (or the first one) depth-first, children in source
 * order, and turns every triangle primitive of every visited mesh into one
 * [`MeshData`]. Strips and fans are unrolled into triangle lists; points and
 * lines are skipped. Node transforms are not applied: vertices keep the
 * coordinates the file stores them in.
 */
pub(crate) async fn import(path: &Path) -> ImportResult<SceneData> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ImportError::io(path, e))?;
    let gltf = gltf::Gltf::from_slice(&bytes).map_err(|e| ImportError::parse(path, e))?;
    let base = path.parent().unwrap_or(Path::new(""));

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| ImportError::parse(path, "binary chunk referenced but missing"))?;
                buffer_data.push(blob.into());
            }
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(ImportError::parse(path, "embedded data URIs are not supported"));
            }
            gltf::buffer::Source::Uri(uri) => {
                let buffer_path = base.join(uri);
                let bin = tokio::fs::read(&buffer_path)
                    .await
                    .map_err(|e| ImportError::io(buffer_path, e))?;
                buffer_data.push(bin);
            }
        }
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| ImportError::MissingRoot(path.to_path_buf()))?;
    if scene.nodes().next().is_none() {
        return Err(ImportError::MissingRoot(path.to_path_buf()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut importer = Importer {
        path,
        base,
        file_name,
        buffers: &buffer_data,
        registry: TextureRegistry::default(),
        meshes: Vec::new(),
    };

    let mut stack = scene.nodes().collect::<Vec<_>>();
    stack.reverse();
    while let Some(node) = stack.pop() {
        if let Some(mesh) = node.mesh() {
            importer.process_mesh(&mesh).await?;
        }
        let mut children = node.children().collect::<Vec<_>>();
        children.reverse();
        stack.extend(children);
    }

    Ok(SceneData {
        meshes: importer.meshes,
        textures: importer.registry.into_textures(),
    })
}

struct Importer<'a> {
    path: &'a Path,
    base: &'a Path,
    file_name: String,
    buffers: &'a [Vec<u8>],
    registry: TextureRegistry,
    meshes: Vec<MeshData>,
}

impl Importer<'_> {
    async fn process_mesh(&mut self, mesh: &gltf::Mesh<'_>) -> ImportResult<()> {
        let name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));

        for primitive in mesh.primitives() {
            let mode = primitive.mode();
            if !matches!(mode, Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan) {
                log::warn!(
                    "{}: skipping {:?} primitive {} of mesh {name}",
                    self.path.display(),
                    mode,
                    primitive.index()
                );
                continue;
            }
            let buffers = self.buffers;
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let positions = reader
                .read_positions()
                .ok_or_else(|| ImportError::Incomplete {
                    path: self.path.to_path_buf(),
                    mesh: name.clone(),
                    reason: format!("primitive {} has no positions", primitive.index()),
                })?
                .collect::<Vec<_>>();
            let normals = reader.read_normals().map(|n| n.collect::<Vec<_>>());
            if normals.is_none() {
                log::warn!("{}: mesh {name} has no normals, lighting will be flat", self.path.display());
            }
            let tex_coords = reader.read_tex_coords(0).map(|t| t.into_f32().collect::<Vec<_>>());

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, position)| ModelVertex {
                    position: *position,
                    normal: normals.as_ref().and_then(|n| n.get(i)).copied().unwrap_or_default(),
                    tex_coords: tex_coords.as_ref().and_then(|t| t.get(i)).copied().unwrap_or_default(),
                })
                .collect::<Vec<_>>();
            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            let indices = triangle_list(mode, indices);

            let material = primitive.material();
            let mut textures = Vec::new();
            if let Some(info) = material.pbr_metallic_roughness().base_color_texture() {
                textures.push(self.texture(&info.texture(), TextureKind::Diffuse).await);
            }
            if let Some(info) = material.specular().and_then(|s| s.specular_texture()) {
                textures.push(self.texture(&info.texture(), TextureKind::Specular).await);
            }

            let mesh = MeshData {
                name: name.clone(),
                vertices,
                indices,
                textures,
            };
            mesh.validate(self.path)?;
            self.meshes.push(mesh);
        }
        Ok(())
    }

    async fn texture(&mut self, texture: &gltf::Texture<'_>, kind: TextureKind) -> usize {
        let image = texture.source();
        match image.source() {
            gltf::image::Source::View { view, .. } => {
                let key = format!("{}#image{}", self.file_name, image.index());
                let start = view.offset();
                let bytes = self
                    .buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..start + view.length()))
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| anyhow!("buffer view {} is out of range", view.index()));
                self.registry.get_or_load(key, kind, || async move { bytes }).await
            }
            gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
                let key = format!("{}#image{}", self.file_name, image.index());
                self.registry
                    .get_or_load(key, kind, || async {
                        Err::<Vec<u8>, _>(anyhow!("embedded data URIs are not supported"))
                    })
                    .await
            }
            gltf::image::Source::Uri { uri, .. } => {
                let texture_path: PathBuf = self.base.join(uri);
                self.registry
                    .get_or_load(texture_key(self.base, uri), kind, || async move {
                        load_binary(&texture_path).await
                    })
                    .await
            }
        }
    }
}

/// Triangle list for the indices of a triangle primitive. Every other strip
/// triangle swaps two corners so all of them keep the strip's winding.
fn triangle_list(mode: Mode, indices: Vec<u32>) -> Vec<u32> {
    match mode {
        Mode::TriangleStrip => indices
            .windows(3)
            .enumerate()
            .flat_map(|(i, w)| if i % 2 == 0 { [w[0], w[1], w[2]] } else { [w[0], w[2], w[1]] })
            .collect(),
        Mode::TriangleFan => match indices.split_first() {
            Some((&centre, rest)) => rest.windows(2).flat_map(|w| [centre, w[0], w[1]]).collect(),
            None => indices,
        },
        _ => indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_alternate_winding() {
        assert_eq!(
            triangle_list(Mode::TriangleStrip, vec![0, 1, 2, 3, 4]),
            vec![0, 1, 2, 1, 3, 2, 2, 3, 4]
        );
    }

    #[test]
    fn fans_share_the_first_vertex() {
        assert_eq!(triangle_list(Mode::TriangleFan, vec![0, 1, 2, 3]), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn short_strips_and_fans_have_no_triangles() {
        assert!(triangle_list(Mode::TriangleStrip, vec![0, 1]).is_empty());
        assert!(triangle_list(Mode::TriangleFan, vec![0, 1]).is_empty());
        assert!(triangle_list(Mode::TriangleFan, vec![]).is_empty());
        assert_eq!(triangle_list(Mode::Triangles, vec![2, 1, 0]), vec![2, 1, 0]);
    }
}
