//! Avatar kinematic state and the flat pose record handed to the renderer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Quat, Vec2, Vec3};

/// Amplitude of the idle float, in scene units.
pub const IDLE_AMPLITUDE: f32 = 0.005;

/// Everything the animator mutates per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarKinematics {
    /// Smoothed position, without the idle float.
    pub position: Vec2,
    /// Point the avatar faces this frame.
    pub look_target: Vec3,
    /// Roll around the view axis, damped towards the scroll target.
    pub roll: f32,
    /// Continuous yaw of the body mesh.
    pub spin: f32,
    /// Greeting wave tilt of the body mesh.
    pub tilt: f32,
    /// Seconds since the animator started. Kept in `f64` so the clock does
    /// not lose frames on long-lived pages.
    pub idle_phase: f64,
    pub is_greeting: bool,
}

impl Default for AvatarKinematics {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            look_target: Vec3::Z,
            roll: 0.0,
            spin: 0.0,
            tilt: 0.0,
            idle_phase: 0.0,
            is_greeting: false,
        }
    }
}

impl AvatarKinematics {
    /// Vertical idle float layered over the smoothed position.
    pub fn idle_offset(&self) -> f32 {
        self.idle_phase.sin() as f32 * IDLE_AMPLITUDE
    }

    /// Position actually drawn: smoothed position plus the idle float.
    pub fn display_position(&self) -> Vec3 {
        Vec3::new(self.position.x, self.position.y + self.idle_offset(), 0.0)
    }

    /// Look-at rotation towards `look_target`, then the scroll roll.
    pub fn orientation(&self) -> Quat {
        look_at(self.position.extend(0.0), self.look_target) * Quat::from_rotation_z(self.roll)
    }

    pub fn pose(&self) -> AvatarPose {
        let p = self.display_position();
        let q = self.orientation();
        AvatarPose {
            position: [p.x, p.y, p.z],
            orientation: [q.x, q.y, q.z, q.w],
            spin: self.spin,
            tilt: self.tilt,
            greeting: if self.is_greeting { 1.0 } else { 0.0 },
        }
    }
}

/// Rotation that turns local +Z towards `target` with +Y kept up.
/// Falls back to the shortest arc when the direction is vertical, and to
/// identity when `target == eye`.
pub fn look_at(eye: Vec3, target: Vec3) -> Quat {
    let Some(forward) = (target - eye).try_normalize() else {
        return Quat::IDENTITY;
    };
    match Vec3::Y.cross(forward).try_normalize() {
        Some(right) => {
            let up = forward.cross(right);
            Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
        }
        None => Quat::from_rotation_arc(Vec3::Z, forward),
    }
}

/// Pose for one frame, laid out for a zero-copy read from JS.
/// 10 floats: position xyz, orientation xyzw, spin, tilt, greeting (0/1).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct AvatarPose {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
    pub spin: f32,
    pub tilt: f32,
    pub greeting: f32,
}

impl AvatarPose {
    pub const FLOATS: usize = 10;

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }
}
