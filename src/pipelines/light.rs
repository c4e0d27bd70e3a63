//! Light descriptions and the uniform block the Phong shader reads them from.
//!
//! Every field of the GPU structs is a `vec4` so the WGSL layout never needs
//! explicit padding; the unused `w` components are zero.

use cgmath::{Deg, Point3, Vector3};

pub const NR_POINT_LIGHTS: usize = 4;

/// Where the four point lights (and their lamp cubes) sit.
pub const POINT_LIGHT_POSITIONS: [[f32; 3]; NR_POINT_LIGHTS] = [
    [0.7, 0.2, 2.0],
    [2.3, -3.3, -4.0],
    [-4.0, 2.0, -12.0],
    [0.0, 0.0, -3.0],
];

pub const DEFAULT_SHININESS: f32 = 32.0;

/// Distance falloff `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.002,
        }
    }
}

impl Attenuation {
    fn to_raw(self) -> [f32; 4] {
        [self.constant, self.linear, self.quadratic, 0.0]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-0.2, -1.0, -0.3),
            ambient: grey(0.05),
            diffuse: grey(0.4),
            specular: grey(0.5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position: position.into(),
            ambient: grey(0.0),
            diffuse: grey(0.5),
            specular: grey(1.0),
            attenuation: Attenuation::default(),
        }
    }
}

/// A cone light. Its pose is usually replaced every frame to follow the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
    /// Full intensity inside this angle.
    pub cut_off: Deg<f32>,
    /// Zero intensity outside this angle; the rim in between fades linearly in cosine.
    pub outer_cut_off: Deg<f32>,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            direction: -Vector3::unit_z(),
            ambient: grey(0.0),
            diffuse: grey(0.5),
            specular: grey(1.0),
            attenuation: Attenuation::default(),
            cut_off: Deg(20.0),
            outer_cut_off: Deg(30.0),
        }
    }
}

fn grey(v: f32) -> Vector3<f32> {
    Vector3::new(v, v, v)
}

fn vec4(v: Vector3<f32>) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

fn point4(p: Point3<f32>) -> [f32; 4] {
    [p.x, p.y, p.z, 1.0]
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    attenuation: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    position: [f32; 4],
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    attenuation: [f32; 4],
    /// x: cosine of the inner cut-off, y: cosine of the outer cut-off.
    cut_off: [f32; 4],
}

/// Everything the lighting pass needs besides the camera.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    directional: DirectionalLightRaw,
    points: [PointLightRaw; NR_POINT_LIGHTS],
    spot: SpotLightRaw,
    /// x: shininess.
    material: [f32; 4],
}

impl LightsUniform {
    /// The scene's light set-up: the default directional light, a point light at
    /// each of [`POINT_LIGHT_POSITIONS`], the default spot light and shininess 32.
    pub fn new() -> Self {
        let mut uniform = Self::default();
        uniform.set_directional(&DirectionalLight::default());
        for (i, position) in POINT_LIGHT_POSITIONS.iter().enumerate() {
            uniform.set_point(i, &PointLight::at(*position));
        }
        uniform.set_spot(&SpotLight::default());
        uniform.set_shininess(DEFAULT_SHININESS);
        uniform
    }

    pub fn set_directional(&mut self, light: &DirectionalLight) {
        self.directional = DirectionalLightRaw {
            direction: vec4(light.direction),
            ambient: vec4(light.ambient),
            diffuse: vec4(light.diffuse),
            specular: vec4(light.specular),
        };
    }

    /// Returns false, leaving the block untouched, when `index` is out of range.
    pub fn set_point(&mut self, index: usize, light: &PointLight) -> bool {
        let Some(slot) = self.points.get_mut(index) else {
            return false;
        };
        *slot = PointLightRaw {
            position: point4(light.position),
            ambient: vec4(light.ambient),
            diffuse: vec4(light.diffuse),
            specular: vec4(light.specular),
            attenuation: light.attenuation.to_raw(),
        };
        true
    }

    pub fn set_spot(&mut self, light: &SpotLight) {
        self.spot = SpotLightRaw {
            position: point4(light.position),
            direction: vec4(light.direction),
            ambient: vec4(light.ambient),
            diffuse: vec4(light.diffuse),
            specular: vec4(light.specular),
            attenuation: light.attenuation.to_raw(),
            cut_off: [light.cut_off.0.to_radians().cos(), light.outer_cut_off.0.to_radians().cos(), 0.0, 0.0],
        };
    }

    pub fn set_spot_pose(&mut self, position: Point3<f32>, direction: Vector3<f32>) {
        self.spot.position = point4(position);
        self.spot.direction = vec4(direction);
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.material[0] = shininess;
    }

    #[cfg(test)]
    fn shininess(&self) -> f32 {
        self.material[0]
    }

    #[cfg(test)]
    fn point_position(&self, index: usize) -> Option<[f32; 3]> {
        self.points.get(index).map(|p| [p.position[0], p.position[1], p.position[2]])
    }

    /// Cosines of the spot light's inner and outer cut-off angles.
    #[cfg(test)]
    fn spot_cut_off(&self) -> (f32, f32) {
        (self.spot.cut_off[0], self.spot.cut_off[1])
    }
}
