use std::f32::consts::PI;

use nalgebra as na;
use na::{vector, Matrix4, Vector3};

/// Keeping the camera at least this far from straight up or down, otherwise
/// the up hint becomes parallel to the view direction.
const PITCH_LIMIT: f32 = PI / 2.0 - 0.1;

/// Camera, described by its position, the point it looks at and an up hint.
///
/// Plain value object. The view matrix is derived on demand, nothing is
/// cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vector3<f32>,
    pub center: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new(eye: Vector3<f32>, center: Vector3<f32>, up: Vector3<f32>) -> Camera {
        return Camera { eye, center, up };
    }

    /// World to camera space transform: the camera ends up at the origin
    /// looking down negative z.
    ///
    /// Precondition: eye differs from center and up is not parallel to the
    /// view direction. Violating it makes the basis degenerate and the
    /// resulting matrix meaningless; callers own the guard.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let forward = (self.center - self.eye).normalize();
        let right_raw = forward.cross(&self.up);
        debug_assert!(
            right_raw.norm() > 1e-6,
            "up hint is parallel to the view direction"
        );
        let right = right_raw.normalize();
        let true_up = right.cross(&forward);

        let rotation = na::matrix![
            right.x,    right.y,    right.z,    0.0;
            true_up.x,  true_up.y,  true_up.z,  0.0;
            -forward.x, -forward.y, -forward.z, 0.0;
            0.0,        0.0,        0.0,        1.0
        ];
        let translation = na::matrix![
            1.0, 0.0, 0.0, -self.eye.x;
            0.0, 1.0, 0.0, -self.eye.y;
            0.0, 0.0, 1.0, -self.eye.z;
            0.0, 0.0, 0.0, 1.0
        ];
        return rotation * translation;
    }

    /// Moves the eye to spherical coordinates (yaw, pitch) around the center.
    /// Pitch is clamped away from the poles and the up hint is reset to world
    /// up, so the result always satisfies the view_matrix precondition.
    /// Radius of None keeps the current eye to center distance.
    pub fn orbit(&mut self, yaw_deg: f32, pitch_deg: f32, radius: Option<f32>) {
        let radius = match radius {
            Some(r) if r > 0.0 => r,
            _ => {
                let current = (self.eye - self.center).norm();
                if current < 1.0 {
                    3.0
                } else {
                    current
                }
            }
        };

        let yaw = yaw_deg.to_radians();
        let pitch = pitch_deg.to_radians().clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let x = radius * pitch.cos() * yaw.sin();
        let y = radius * pitch.sin();
        let z = radius * pitch.cos() * yaw.cos();

        self.eye = self.center + vector![x, y, z];
        self.up = vector![0.0, 1.0, 0.0];
    }

    /// Orbit around the world y axis only, preserving height and radius.
    pub fn orbit_y(&mut self, angle_deg: f32) {
        let dir = self.eye - self.center;
        let angle = angle_deg.to_radians();
        let (sin_a, cos_a) = (angle.sin(), angle.cos());

        let new_x = dir.x * cos_a - dir.z * sin_a;
        let new_z = dir.x * sin_a + dir.z * cos_a;

        self.eye = self.center + vector![new_x, dir.y, new_z];
        self.up = vector![0.0, 1.0, 0.0];
    }

    pub fn set_position(&mut self, eye: Vector3<f32>, center: Vector3<f32>, up: Vector3<f32>) {
        self.eye = eye;
        self.center = center;
        self.up = up;
    }
}

impl Default for Camera {
    fn default() -> Camera {
        return Camera {
            eye: vector![0.0, 0.0, 3.0],
            center: Vector3::zeros(),
            up: vector![0.0, 1.0, 0.0],
        };
    }
}
