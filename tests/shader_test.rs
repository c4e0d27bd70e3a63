//! Shader compilation on a device that records commands without a GPU.

use std::path::PathBuf;

use cgmath::{Matrix4, Point3, SquareMatrix, Vector3};
use phong_demo::pipelines::{
    ShaderLayouts, Shaders,
    light::{DirectionalLight, PointLight, SpotLight},
    shader::Shader,
};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn device() -> (wgpu::Device, wgpu::Queue) {
    wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
}

fn asset_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

#[tokio::test]
async fn broken_source_leaves_the_shader_without_a_pipeline() {
    let (device, queue) = device();
    let layouts = ShaderLayouts::new(&device, &queue);

    let shader = Shader::new(&device, &layouts, "phong", "fn vs_main( -> broken", FORMAT).await;

    assert!(!shader.is_valid());
    assert_eq!(shader.label(), "phong");
}

#[tokio::test]
async fn entry_points_missing_from_the_module_are_rejected() {
    let (device, queue) = device();
    let layouts = ShaderLayouts::new(&device, &queue);

    // Parses fine but has neither vs_main nor fs_main.
    let shader = Shader::new(&device, &layouts, "empty", "fn helper() -> f32 { return 1.0; }", FORMAT).await;

    assert!(!shader.is_valid());
}

#[tokio::test]
async fn bundled_programs_compile_against_the_shared_layout() {
    let (device, queue) = device();
    let layouts = ShaderLayouts::new(&device, &queue);

    let mut shaders = Shaders::load(&device, &layouts, &asset_dir(), FORMAT)
        .await
        .expect("shader files are readable");

    assert!(shaders.phong.is_valid());
    assert!(shaders.lamp.is_valid());

    // Setters only stage; flushing writes to the uniform buffers.
    let phong = &mut shaders.phong;
    phong.set_view_projection(Matrix4::identity());
    phong.set_view_position(Point3::new(0.0, 0.0, 3.0));
    phong.set_directional_light(&DirectionalLight::default());
    phong.set_point_light(0, &PointLight::at([1.0, 2.0, 3.0]));
    phong.set_point_light(7, &PointLight::at([1.0, 2.0, 3.0]));
    phong.set_spot_light(&SpotLight::default());
    phong.set_spot_pose(Point3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
    phong.set_shininess(64.0);
    phong.flush(&queue);
    assert!(phong.is_valid());
}

#[tokio::test]
async fn missing_shader_file_is_an_error() {
    let (device, queue) = device();
    let layouts = ShaderLayouts::new(&device, &queue);
    let dir = tempfile::tempdir().expect("temp dir");

    let result = Shader::from_file(&device, &layouts, &dir.path().join("absent.wgsl"), FORMAT).await;

    assert!(result.is_err());
}
