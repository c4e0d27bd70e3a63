//! Free-fly camera, perspective projection and the camera uniform block.
//!
//! [`Camera`] keeps its orientation as yaw/pitch/roll angles in degrees and
//! derives the `front`, `right` and `up` basis vectors from them after every
//! mutation, so the basis is never stale. Roll tilts the world-up vector used
//! to build the basis, which also makes mouse rotation roll-dependent.
//!
//! Yaw and roll are never wrapped or clamped; only pitch and field of view are.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3, perspective};

/// Converts the OpenGL style clip space produced by cgmath into wgpu's
/// (z in 0..1 instead of -1..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub const PITCH_LIMIT: f32 = 85.0;
pub const MIN_FOV: f32 = 30.0;
pub const MAX_FOV: f32 = 110.0;
/// Velocity multiplier while the "fast" modifier is held.
pub const FAST_FACTOR: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Clockwise,
    Anticlockwise,
}

/// Free-fly camera with a roll-aware orientation model.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    roll: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 0.0))
    }
}

impl Camera {
    /// Camera at `position` looking down -Z with +Y as world up.
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        let mut camera = Self {
            position: position.into(),
            front: -Vector3::unit_z(),
            right: Vector3::unit_x(),
            up: Vector3::unit_y(),
            world_up: Vector3::unit_y(),
            yaw: -90.0,
            pitch: 0.0,
            roll: 0.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            fov: 90.0,
        };
        camera.update_vectors();
        camera
    }

    /// Camera with explicit angles (degrees). Pitch is clamped like any other mutation.
    pub fn with_orientation<P: Into<Point3<f32>>>(position: P, yaw: f32, pitch: f32, roll: f32) -> Self {
        let mut camera = Self::new(position);
        camera.yaw = yaw;
        camera.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        camera.roll = roll;
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn world_up(&self) -> Vector3<f32> {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Translate along the camera axes, or roll for the rotational directions.
    ///
    /// Translation covers `movement_speed * dt` units, five times that when `fast`
    /// is set. Rolling changes the roll angle by twice the mouse sensitivity per
    /// call and ignores `dt`.
    pub fn move_in(&mut self, direction: CameraDirection, dt: f32, fast: bool) {
        let mut velocity = self.movement_speed * dt;
        if fast {
            velocity *= FAST_FACTOR;
        }
        match direction {
            CameraDirection::Forward => self.position += self.front * velocity,
            CameraDirection::Backward => self.position -= self.front * velocity,
            CameraDirection::Left => self.position -= self.right * velocity,
            CameraDirection::Right => self.position += self.right * velocity,
            CameraDirection::Up => self.position += self.world_up * velocity,
            CameraDirection::Down => self.position -= self.world_up * velocity,
            CameraDirection::Clockwise => {
                self.roll += 2.0 * self.mouse_sensitivity;
                self.update_vectors();
            }
            CameraDirection::Anticlockwise => {
                self.roll -= 2.0 * self.mouse_sensitivity;
                self.update_vectors();
            }
        }
    }

    /// Apply a mouse delta. The offsets are scaled by the sensitivity and turned
    /// through the current roll before they reach yaw and pitch.
    pub fn rotate(&mut self, offset_yaw: f32, offset_pitch: f32) {
        let offset_yaw = offset_yaw * self.mouse_sensitivity;
        let offset_pitch = offset_pitch * self.mouse_sensitivity;
        let (sin_roll, cos_roll) = self.roll.to_radians().sin_cos();

        self.yaw += offset_yaw * cos_roll + offset_pitch * sin_roll;
        self.pitch += -offset_yaw * sin_roll + offset_pitch * cos_roll;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        self.update_vectors();
    }

    /// Narrow (positive delta) or widen the field of view.
    pub fn zoom(&mut self, delta: f32) {
        self.fov = (self.fov - delta).clamp(MIN_FOV, MAX_FOV);
    }

    pub fn reset_up(&mut self) {
        self.roll = 0.0;
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        let (sin_roll, cos_roll) = self.roll.to_radians().sin_cos();

        self.front = Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        let rolled_up = Vector3::new(sin_roll, cos_roll, 0.0);
        let right = self.front.cross(rolled_up);
        // The rolled up vector lies in the XY plane, so when it is parallel to
        // front the front vector does too and crossing with +Z cannot vanish.
        self.right = if right.magnitude2() > 1e-8 {
            right.normalize()
        } else {
            self.front.cross(Vector3::unit_z()).normalize()
        };
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Perspective projection. The field of view comes from the camera each frame.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self, fov_degrees: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(cgmath::Deg(fov_degrees), self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.set_view_position(camera.position);
        self.set_view_proj(projection.calc_matrix(camera.fov()) * camera.view_matrix());
    }

    pub fn set_view_proj(&mut self, view_proj: Matrix4<f32>) {
        self.view_proj = view_proj.into();
    }

    pub fn set_view_position(&mut self, position: Point3<f32>) {
        self.view_position = position.to_homogeneous().into();
    }

    pub fn view_position(&self) -> [f32; 4] {
        self.view_position
    }
}
