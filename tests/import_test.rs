//! Scene import against small OBJ and glTF files written to a temp dir.

use std::path::Path;

use image::{Rgba, RgbaImage};
use phong_demo::{
    data_structures::{model::Model, texture::TextureKind},
    resources::{error::ImportError, scene::SceneData},
};

fn write_png(path: &Path, colour: [u8; 4]) {
    RgbaImage::from_pixel(2, 2, Rgba(colour))
        .save(path)
        .expect("write png fixture");
}

const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\n";

#[tokio::test]
async fn obj_materials_sharing_a_texture_decode_it_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("shared.png"), [200, 100, 50, 255]);
    write_png(&dir.path().join("spec.png"), [90, 90, 90, 255]);
    std::fs::write(
        dir.path().join("scene.mtl"),
        "newmtl first\nmap_Kd shared.png\n\nnewmtl second\nmap_Kd shared.png\nmap_Ks spec.png\n",
    )
    .expect("write mtl");
    let obj = format!(
        "mtllib scene.mtl\n{TRIANGLE}\
         o first\nusemtl first\nf 1/1/1 2/2/1 3/3/1\n\
         o second\nusemtl second\nf 1/1/1 2/2/1 3/3/1\n"
    );
    let path = dir.path().join("scene.obj");
    std::fs::write(&path, obj).expect("write obj");

    let scene = SceneData::import(&path).await.expect("import");

    assert_eq!(scene.meshes.len(), 2);
    assert_eq!(scene.textures.len(), 2);
    assert_eq!(scene.meshes[0].textures, vec![0]);
    assert_eq!(scene.meshes[1].textures, vec![0, 1]);
    assert_eq!(scene.textures[0].kind, TextureKind::Diffuse);
    assert_eq!(scene.textures[1].kind, TextureKind::Specular);
    assert_eq!(scene.textures[0].image.get_pixel(0, 0).0, [200, 100, 50, 255]);
    assert_eq!(scene.meshes[0].indices.len(), 3);
    // v is flipped to a top-left origin.
    assert_eq!(scene.meshes[0].vertices[2].tex_coords, [0.0, 0.0]);
    assert_eq!(scene.meshes[0].vertices[0].tex_coords, [0.0, 1.0]);
}

#[tokio::test]
async fn obj_texture_that_cannot_be_read_becomes_a_placeholder() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("scene.mtl"), "newmtl only\nmap_Kd missing.png\nmap_Ks missing_spec.png\n")
        .expect("write mtl");
    let path = dir.path().join("scene.obj");
    std::fs::write(&path, format!("mtllib scene.mtl\n{TRIANGLE}usemtl only\nf 1/1/1 2/2/1 3/3/1\n"))
        .expect("write obj");

    let scene = SceneData::import(&path).await.expect("import keeps going");

    assert_eq!(scene.textures.len(), 2);
    assert_eq!(scene.textures[0].image.dimensions(), (1, 1));
    assert_eq!(scene.textures[0].image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(scene.textures[1].image.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[tokio::test]
async fn obj_without_material_library_stays_untextured() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bare.obj");
    std::fs::write(&path, format!("mtllib nowhere.mtl\n{TRIANGLE}usemtl gone\nf 1/1/1 2/2/1 3/3/1\n"))
        .expect("write obj");

    let scene = SceneData::import(&path).await.expect("import");

    assert_eq!(scene.meshes.len(), 1);
    assert!(scene.meshes[0].textures.is_empty());
    assert!(scene.textures.is_empty());
}

/// Positions, normals and u16 indices of one triangle, in that order.
fn triangle_buffer() -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        v.iter().for_each(|f| bytes.extend_from_slice(&f.to_le_bytes()));
    }
    for _ in 0..3 {
        [0.0f32, 0.0, 1.0]
            .iter()
            .for_each(|f| bytes.extend_from_slice(&f.to_le_bytes()));
    }
    for i in [0u16, 1, 2] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

const GLTF_HEAD: &str = r#"
  "asset": { "version": "2.0" },
  "buffers": [ { "uri": "triangle.bin", "byteLength": 80 } ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 72, "byteLength": 6 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
    { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ],"#;

fn write_gltf(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    std::fs::write(dir.join("triangle.bin"), triangle_buffer()).expect("write bin");
    let path = dir.join(name);
    std::fs::write(&path, format!("{{{GLTF_HEAD}{body}}}")).expect("write gltf");
    path
}

#[tokio::test]
async fn gltf_nodes_are_visited_depth_first_with_shared_textures() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("shared.png"), [10, 20, 30, 255]);
    let path = write_gltf(
        dir.path(),
        "scene.gltf",
        r#"
  "images": [ { "uri": "shared.png" } ],
  "textures": [ { "source": 0 } ],
  "materials": [
    { "name": "first", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } },
    { "name": "second", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } }
  ],
  "meshes": [
    { "name": "root_mesh", "primitives": [
      { "attributes": { "POSITION": 0, "NORMAL": 1 }, "indices": 2, "material": 0 },
      { "attributes": { "POSITION": 0 }, "mode": 0 }
    ] },
    { "name": "child_mesh", "primitives": [
      { "attributes": { "POSITION": 0, "NORMAL": 1 }, "indices": 2, "material": 1 }
    ] },
    { "name": "sibling_mesh", "primitives": [
      { "attributes": { "POSITION": 0 }, "material": 1 }
    ] }
  ],
  "nodes": [
    { "name": "root", "mesh": 0, "children": [1] },
    { "name": "child", "mesh": 1 },
    { "name": "sibling", "mesh": 2 }
  ],
  "scenes": [ { "nodes": [0, 2] } ],
  "scene": 0
"#,
    );

    let scene = SceneData::import(&path).await.expect("import");

    let names: Vec<_> = scene.meshes.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["root_mesh", "child_mesh", "sibling_mesh"]);
    assert_eq!(scene.textures.len(), 1);
    assert!(scene.meshes.iter().all(|m| m.textures == vec![0]));
    assert_eq!(scene.textures[0].image.get_pixel(1, 1).0, [10, 20, 30, 255]);

    let root = &scene.meshes[0];
    assert_eq!(root.indices, vec![0, 1, 2]);
    assert_eq!(root.vertices[1].position, [1.0, 0.0, 0.0]);
    assert_eq!(root.vertices[1].normal, [0.0, 0.0, 1.0]);
    assert_eq!(root.vertices[1].tex_coords, [0.0, 0.0]);

    // No indices and no normals: sequential indices, zero normals.
    let sibling = &scene.meshes[2];
    assert_eq!(sibling.indices, vec![0, 1, 2]);
    assert_eq!(sibling.vertices[0].normal, [0.0, 0.0, 0.0]);
}

fn position_bytes(positions: &[[f32; 3]]) -> Vec<u8> {
    positions
        .iter()
        .flatten()
        .flat_map(|f| f.to_le_bytes())
        .collect()
}

fn png_bytes(colour: [u8; 4]) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    RgbaImage::from_pixel(2, 2, Rgba(colour))
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png fixture");
    bytes.into_inner()
}

#[tokio::test]
async fn gltf_strips_and_fans_become_triangle_lists() {
    let dir = tempfile::tempdir().expect("temp dir");
    let quad = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
    std::fs::write(dir.path().join("quad.bin"), position_bytes(&quad)).expect("write bin");
    let path = dir.path().join("quad.gltf");
    std::fs::write(
        &path,
        r#"{
  "asset": { "version": "2.0" },
  "buffers": [ { "uri": "quad.bin", "byteLength": 48 } ],
  "bufferViews": [ { "buffer": 0, "byteLength": 48 } ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }
  ],
  "meshes": [ { "name": "quad", "primitives": [
    { "attributes": { "POSITION": 0 }, "mode": 5 },
    { "attributes": { "POSITION": 0 }, "mode": 6 },
    { "attributes": { "POSITION": 0 }, "mode": 1 }
  ] } ],
  "nodes": [ { "mesh": 0 } ],
  "scenes": [ { "nodes": [0] } ],
  "scene": 0
}"#,
    )
    .expect("write gltf");

    let scene = SceneData::import(&path).await.expect("import");

    // The line primitive is dropped.
    assert_eq!(scene.meshes.len(), 2);
    assert_eq!(scene.meshes[0].indices, vec![0, 1, 2, 1, 3, 2]);
    assert_eq!(scene.meshes[1].indices, vec![0, 1, 2, 0, 2, 3]);
    assert!(scene.meshes.iter().all(|m| m.name == "quad" && m.vertices.len() == 4));
}

#[tokio::test]
async fn gltf_embedded_images_are_keyed_by_file_and_index() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("spec.png"), [60, 60, 60, 255]);

    let mut bin = position_bytes(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let png = png_bytes([40, 80, 120, 255]);
    let png_len = png.len();
    bin.extend(png);
    let total = bin.len();
    std::fs::write(dir.path().join("embedded.bin"), &bin).expect("write bin");

    // bufferView 2 lies past the end of the buffer.
    let gltf = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "extensionsUsed": ["KHR_materials_specular"],
  "buffers": [ {{ "uri": "embedded.bin", "byteLength": {total} }} ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": {png_len} }},
    {{ "buffer": 0, "byteOffset": {total}, "byteLength": 16 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }}
  ],
  "images": [
    {{ "bufferView": 1, "mimeType": "image/png" }},
    {{ "bufferView": 2, "mimeType": "image/png" }},
    {{ "uri": "spec.png" }}
  ],
  "textures": [ {{ "source": 0 }}, {{ "source": 1 }}, {{ "source": 2 }} ],
  "materials": [
    {{ "name": "plain", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }},
    {{ "name": "shiny", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }},
      "extensions": {{ "KHR_materials_specular": {{ "specularTexture": {{ "index": 2 }} }} }} }},
    {{ "name": "broken", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 1 }} }} }}
  ],
  "meshes": [
    {{ "name": "plain_mesh", "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "material": 0 }} ] }},
    {{ "name": "shiny_mesh", "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "material": 1 }} ] }},
    {{ "name": "broken_mesh", "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "material": 2 }} ] }}
  ],
  "nodes": [ {{ "mesh": 0 }}, {{ "mesh": 1 }}, {{ "mesh": 2 }} ],
  "scenes": [ {{ "nodes": [0, 1, 2] }} ],
  "scene": 0
}}"#
    );
    let path = dir.path().join("embedded.gltf");
    std::fs::write(&path, gltf).expect("write gltf");

    let scene = SceneData::import(&path).await.expect("import");

    assert_eq!(scene.textures.len(), 3);
    assert_eq!(scene.meshes[0].textures, vec![0]);
    assert_eq!(scene.meshes[1].textures, vec![0, 1]);
    assert_eq!(scene.meshes[2].textures, vec![2]);

    let embedded = &scene.textures[0];
    assert_eq!(embedded.path, "embedded.gltf#image0");
    assert_eq!(embedded.kind, TextureKind::Diffuse);
    assert_eq!(embedded.image.get_pixel(0, 0).0, [40, 80, 120, 255]);

    let specular = &scene.textures[1];
    assert_eq!(specular.kind, TextureKind::Specular);
    assert_eq!(specular.path, dir.path().join("spec.png").to_string_lossy());
    assert_eq!(specular.image.get_pixel(1, 1).0, [60, 60, 60, 255]);

    let broken = &scene.textures[2];
    assert_eq!(broken.path, "embedded.gltf#image1");
    assert_eq!(broken.image.dimensions(), (1, 1));
    assert_eq!(broken.image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn gltf_without_a_scene_is_missing_its_root() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_gltf(
        dir.path(),
        "empty.gltf",
        r#"
  "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
  "nodes": [ { "mesh": 0 } ]
"#,
    );

    let err = SceneData::import(&path).await.unwrap_err();
    assert!(matches!(err, ImportError::MissingRoot(_)), "{err}");
}

#[tokio::test]
async fn unparsable_gltf_is_an_error_and_leaves_an_empty_model() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.gltf");
    std::fs::write(&path, "{ this is not json").expect("write gltf");

    let err = SceneData::import(&path).await.unwrap_err();
    assert!(matches!(err, ImportError::Parse { .. }), "{err}");

    let missing = SceneData::import(&dir.path().join("absent.obj")).await.unwrap_err();
    assert!(matches!(missing, ImportError::Io { .. }), "{missing}");

    // What a scene falls back to when the import fails.
    let fallback = Model::default();
    assert!(fallback.is_empty());
    assert_eq!(fallback.meshes.len(), 0);
}
