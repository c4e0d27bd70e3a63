use std::sync::Arc;

use anyhow::Context as _;
use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};
use instant::Duration;
use rand::Rng;

use crate::{
    app::Scene,
    context::{Context, LoadContext},
    data_structures::{
        cube::{cube_indices, cube_vertices},
        instance::{Instance, mk_instance_buffer},
        model::{DrawModel, MaterialTexture, Mesh},
        texture::{Texture, TextureKind},
    },
    resources::load_image,
    scenes::Lamps,
};

pub const CONTAINER_DIFFUSE: &str = "textures/container.png";
pub const CONTAINER_SPECULAR: &str = "textures/container_specular.png";

pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

/// Degrees per second added on top of the random part of a spin.
const MIN_SPIN_SPEED: f32 = 10.0;
const SPIN_SPEED_RANGE: f32 = 50.0;

/// Constant rotation of one cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub axis: Vector3<f32>,
    /// Degrees per second.
    pub speed: f32,
}

impl Spin {
    pub fn random(rng: &mut impl Rng) -> Self {
        let axis = Vector3::new(
            rng.random_range(0.0..1.0),
            rng.random_range(0.0..1.0),
            rng.random_range(0.0..1.0),
        );
        let axis = if axis.magnitude2() > 1e-6 {
            axis.normalize()
        } else {
            Vector3::unit_y()
        };
        Self {
            axis,
            speed: MIN_SPIN_SPEED + rng.random_range(0.0..SPIN_SPEED_RANGE),
        }
    }

    pub fn rotation_at(&self, seconds: f32) -> Quaternion<f32> {
        Quaternion::from_axis_angle(self.axis, Deg(self.speed * seconds))
    }
}

/// Ten textured containers spinning in front of the camera.
pub struct CubeScene {
    cube: Mesh,
    spins: Vec<Spin>,
    instances: Vec<Instance>,
    instance_buffer: wgpu::Buffer,
    lamps: Lamps,
    elapsed: f32,
}

impl CubeScene {
    /// Both container textures are required; a missing one fails start-up.
    pub async fn new(load: LoadContext) -> anyhow::Result<Self> {
        let mut textures = Vec::new();
        for (file, kind) in [
            (CONTAINER_DIFFUSE, TextureKind::Diffuse),
            (CONTAINER_SPECULAR, TextureKind::Specular),
        ] {
            let path = load.asset(file);
            let image = load_image(&path)
                .await
                .with_context(|| format!("The cube scene needs {}", path.display()))?;
            textures.push(Arc::new(MaterialTexture {
                kind,
                path: path.to_string_lossy().into_owned(),
                texture: Texture::from_image(&load.device, &load.queue, &image, file, kind),
            }));
        }
        let cube = Mesh::new(
            &load.device,
            &load.materials,
            "container",
            &cube_vertices(),
            &cube_indices(),
            textures,
        );

        let mut rng = rand::rng();
        let spins = CUBE_POSITIONS
            .iter()
            .map(|_| Spin::random(&mut rng))
            .collect::<Vec<_>>();
        let instances = CUBE_POSITIONS
            .iter()
            .map(|&position| Instance::from(Vector3::from(position)))
            .collect::<Vec<_>>();
        let instance_buffer = mk_instance_buffer(&load.device, &instances, "Cube Instance Buffer");

        log::info!("Cube scene ready with {} containers", instances.len());
        Ok(Self {
            cube,
            spins,
            instances,
            instance_buffer,
            lamps: Lamps::new(&load),
            elapsed: 0.0,
        })
    }
}

impl Scene for CubeScene {
    fn update(&mut self, ctx: &Context, dt: Duration) {
        self.elapsed += dt.as_secs_f32();
        for (instance, spin) in self.instances.iter_mut().zip(&self.spins) {
            instance.rotation = spin.rotation_at(self.elapsed);
        }
        let raw = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        ctx.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
    }

    fn draw<'a>(&'a self, ctx: &'a Context, pass: &mut wgpu::RenderPass<'a>) {
        if ctx.shaders.phong.bind(pass) {
            pass.draw_mesh_instanced(&self.cube, &self.instance_buffer, 0..self.instances.len() as u32);
        }
        self.lamps.draw(ctx, pass);
    }
}
