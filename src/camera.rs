use crate::math::{
    add, multiply_matrices, multiply_matrix_vector, rotation_x, rotation_y, sub, Mat3, Vec3,
};
use std::f64::consts::FRAC_PI_2;
use tracing::info;

/// Eye height of a standing user, in metres
pub const EYE_HEIGHT: f64 = 1.6;
/// Initial downward tilt; puts an anchor 5 m ahead of the eye onto the floor
pub const INITIAL_PITCH: f64 = -0.33;

/// Position and orientation of the camera in world space.
///
/// The camera looks along its local -Z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Rotation about the vertical axis
    pub yaw: f64,
    /// Rotation about the camera's X axis; positive looks up
    pub pitch: f64,
}

impl CameraPose {
    /// Camera-to-world rotation
    pub fn rotation(&self) -> Mat3 {
        multiply_matrices(&rotation_y(self.yaw), &rotation_x(self.pitch))
    }

    /// Transforms a world point into camera space
    pub fn world_to_camera(&self, point: &Vec3) -> Vec3 {
        let inverse = multiply_matrices(&rotation_x(-self.pitch), &rotation_y(-self.yaw));
        multiply_matrix_vector(&inverse, &sub(point, &self.position))
    }

    /// Transforms a camera-space offset into a world point
    pub fn camera_to_world(&self, offset: &Vec3) -> Vec3 {
        add(&self.position, &multiply_matrix_vector(&self.rotation(), offset))
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        CameraPose {
            position: [0.0, EYE_HEIGHT, 0.0],
            yaw: 0.0,
            pitch: INITIAL_PITCH,
        }
    }
}

/// Supplies the camera pose, the permission signal and world anchors
pub trait CameraProvider {
    /// Whether camera access has been granted, given the session clock
    fn poll_permission(&mut self, elapsed: f64) -> bool;
    fn pose(&self) -> CameraPose;
    /// World position of a point held at `offset` in front of the camera
    fn anchor_from_camera_offset(&self, offset: &Vec3) -> Vec3 {
        self.pose().camera_to_world(offset)
    }
}

/// Keyboard-driven camera that grants access after a fixed delay
#[derive(Clone, Debug)]
pub struct VirtualCamera {
    pose: CameraPose,
    permission_delay: f64,
    granted: bool,
}

impl VirtualCamera {
    pub fn new(permission_delay: f64) -> Self {
        VirtualCamera {
            pose: CameraPose::default(),
            permission_delay,
            granted: false,
        }
    }

    /// Turns left (positive) or right about the vertical axis
    pub fn turn(&mut self, radians: f64) {
        self.pose.yaw += radians;
    }

    /// Tilts up (positive) or down, never past straight up or down
    pub fn look(&mut self, radians: f64) {
        self.pose.pitch = (self.pose.pitch + radians).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Walks along the floor in the direction the camera is facing
    pub fn walk(&mut self, metres: f64) {
        let (sin, cos) = self.pose.yaw.sin_cos();
        self.pose.position[0] -= sin * metres;
        self.pose.position[2] -= cos * metres;
    }
}

impl CameraProvider for VirtualCamera {
    fn poll_permission(&mut self, elapsed: f64) -> bool {
        if !self.granted && elapsed >= self.permission_delay {
            self.granted = true;
            info!(elapsed, "camera permission granted");
        }
        self.granted
    }

    fn pose(&self) -> CameraPose {
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_anchor_lands_near_the_floor() {
        let camera = VirtualCamera::new(0.0);
        let anchor = camera.anchor_from_camera_offset(&[0.0, 0.0, -5.0]);
        assert!(anchor[1].abs() < 0.05, "anchor height {}", anchor[1]);
        assert!(anchor[2] < -4.5);
        assert_relative_eq!(anchor[0], 0.0);
    }

    #[test]
    fn world_to_camera_inverts_camera_to_world() {
        let mut camera = VirtualCamera::new(0.0);
        camera.turn(0.7);
        camera.look(0.2);
        camera.walk(2.0);
        let pose = camera.pose();
        let offset = [0.3, -0.4, -2.0];
        let back = pose.world_to_camera(&pose.camera_to_world(&offset));
        for i in 0..3 {
            assert_relative_eq!(back[i], offset[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn walking_follows_the_heading() {
        let mut camera = VirtualCamera::new(0.0);
        camera.walk(1.0);
        assert_relative_eq!(camera.pose().position[2], -1.0);
        camera.turn(FRAC_PI_2);
        camera.walk(1.0);
        assert_relative_eq!(camera.pose().position[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn permission_is_granted_after_the_delay() {
        let mut camera = VirtualCamera::new(1.0);
        assert!(!camera.poll_permission(0.5));
        assert!(camera.poll_permission(1.0));
        assert!(camera.poll_permission(0.0));
    }
}
