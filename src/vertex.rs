use crate::math::Vec3;

/// Vertex structure with camera-space position, screen position, depth and normal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub screen_position: [f64; 2],
    /// Distance in front of the camera
    pub depth: f64,
    pub normal: Vec3,
}
