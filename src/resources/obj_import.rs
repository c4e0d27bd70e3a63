use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{
    data_structures::{model::ModelVertex, texture::TextureKind},
    resources::{
        error::{ImportError, ImportResult},
        load_binary,
        scene::{MeshData, SceneData, TextureRegistry, texture_key},
    },
};

/**
 * An OBJ file is a flat scene: every object becomes one mesh, in file order.
 * Materials come from the MTL libraries it references, looked up next to the
 * OBJ file.
 */
pub(crate) async fn import(path: &Path) -> ImportResult<SceneData> {
    let obj_text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ImportError::io(path, e))?;
    let base = path.parent().unwrap_or(Path::new(""));
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p: String| {
            let mtl_path = base.join(&p);
            async move {
                let mat_text = tokio::fs::read_to_string(&mtl_path).await.map_err(|e| {
                    log::warn!("Material library {} could not be read: {e}", mtl_path.display());
                    tobj::LoadError::OpenFileFailed
                })?;
                tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text)))
            }
        },
    )
    .await
    .map_err(|e| ImportError::parse(path, e))?;

    let materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("{}: materials unavailable ({e}), meshes stay untextured", path.display());
        Vec::new()
    });

    let mut registry = TextureRegistry::default();
    let mut meshes = Vec::with_capacity(models.len());
    for m in &models {
        let mut textures = Vec::new();
        if let Some(material) = m.mesh.material_id.and_then(|id| materials.get(id)) {
            let maps = [
                (material.diffuse_texture.as_deref(), TextureKind::Diffuse),
                (material.specular_texture.as_deref(), TextureKind::Specular),
            ];
            for (file, kind) in maps {
                let Some(file) = file.filter(|f| !f.is_empty()) else {
                    continue;
                };
                let texture_path = base.join(file);
                let index = registry
                    .get_or_load(texture_key(base, file), kind, || async move {
                        load_binary(&texture_path).await
                    })
                    .await;
                textures.push(index);
            }
        }

        let mesh = MeshData {
            name: m.name.clone(),
            vertices: vertices(&m.mesh),
            // Indices cover positions, tex coords and normals alike because of `single_index`.
            indices: m.mesh.indices.clone(),
            textures,
        };
        mesh.validate(path)?;
        meshes.push(mesh);
    }

    Ok(SceneData {
        meshes,
        textures: registry.into_textures(),
    })
}

/// Tex coords are flipped vertically; OBJ puts the origin bottom-left.
fn vertices(mesh: &tobj::Mesh) -> Vec<ModelVertex> {
    (0..mesh.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            tex_coords: match (mesh.texcoords.get(i * 2), mesh.texcoords.get(i * 2 + 1)) {
                (Some(u), Some(v)) => [*u, 1.0 - *v],
                _ => [0.0, 0.0],
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tex_coords_default_to_the_origin() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            texcoords: vec![0.25, 0.25, 1.0, 0.0],
            ..Default::default()
        };
        let vertices = vertices(&mesh);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].tex_coords, [0.25, 0.75]);
        assert_eq!(vertices[1].tex_coords, [1.0, 1.0]);
        assert_eq!(vertices[2].tex_coords, [0.0, 0.0]);
        assert_eq!(vertices[2].normal, [0.0, 0.0, 0.0]);
    }
}
