use crate::math::{calculate_light_intensity, calculate_normal, edge_function, Vec3};
use crate::scene::{Color, Shape};
use crate::vertex::Vertex;

/// Distance of the near clipping plane
pub const NEAR: f64 = 0.1;
/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f64 = 2.0;
/// Light that every surface receives regardless of orientation
pub const AMBIENT: f64 = 0.7;
/// Tolerance for lines drawn on top of coplanar surfaces
const LINE_DEPTH_BIAS: f64 = 0.05;

/// One character cell of the frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub background: Color,
    pub glyph: Option<(char, Color)>,
}

/// Color and depth buffers for one frame
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    z_buffer: Vec<f64>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Canvas {
            width,
            height,
            cells: vec![
                Cell {
                    background,
                    glyph: None,
                };
                width * height
            ],
            z_buffer: vec![f64::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn depth(&self, x: usize, y: usize) -> f64 {
        if x < self.width && y < self.height {
            self.z_buffer[y * self.width + x]
        } else {
            f64::INFINITY
        }
    }

    /// Writes text starting at a cell, clipped to the canvas
    pub fn draw_text(
        &mut self,
        x: isize,
        y: isize,
        text: &str,
        color: Color,
        background: Option<Color>,
    ) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let cx = x + i as isize;
            if cx < 0 || cx as usize >= self.width {
                continue;
            }
            let cell = &mut self.cells[y as usize * self.width + cx as usize];
            cell.glyph = Some((ch, color));
            if let Some(background) = background {
                cell.background = background;
            }
        }
    }
}

/// Projects a camera-space point onto the canvas
pub fn project(position: Vec3, normal: Vec3, width: usize, height: usize, focal: f64) -> Vertex {
    let depth = -position[2];
    Vertex {
        position,
        screen_position: [
            width as f64 / 2.0 + position[0] * focal * CELL_ASPECT / depth,
            height as f64 / 2.0 - position[1] * focal / depth,
        ],
        depth,
        normal,
    }
}

/// Focal length in cells for a vertical field of view
pub fn focal_length(height: usize, fov_y: f64) -> f64 {
    height as f64 / 2.0 / (fov_y / 2.0).tan()
}

/// Clips a camera-space triangle against the near plane, returning 0 to 2 triangles
pub fn clip_triangle(triangle: &[Vec3; 3]) -> Vec<[Vec3; 3]> {
    let inside = |p: &Vec3| -p[2] >= NEAR;
    let mut polygon: Vec<Vec3> = Vec::with_capacity(4);
    for i in 0..3 {
        let current = triangle[i];
        let next = triangle[(i + 1) % 3];
        if inside(&current) {
            polygon.push(current);
        }
        if inside(&current) != inside(&next) {
            // Intersection with z = -NEAR
            let t = (-NEAR - current[2]) / (next[2] - current[2]);
            polygon.push([
                current[0] + (next[0] - current[0]) * t,
                current[1] + (next[1] - current[1]) * t,
                -NEAR,
            ]);
        }
    }
    (1..polygon.len().saturating_sub(1))
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .collect()
}

/// Clips a camera-space segment against the near plane
pub fn clip_line(a: Vec3, b: Vec3) -> Option<(Vec3, Vec3)> {
    let (da, db) = (-a[2], -b[2]);
    if da < NEAR && db < NEAR {
        return None;
    }
    let cut = |inside: Vec3, outside: Vec3| {
        let t = (-NEAR - inside[2]) / (outside[2] - inside[2]);
        [
            inside[0] + (outside[0] - inside[0]) * t,
            inside[1] + (outside[1] - inside[1]) * t,
            -NEAR,
        ]
    };
    match (da >= NEAR, db >= NEAR) {
        (true, true) => Some((a, b)),
        (true, false) => Some((a, cut(a, b))),
        _ => Some((cut(b, a), b)),
    }
}

/// Triangles of a shape in its local space
pub fn shape_triangles(shape: &Shape) -> Vec<[Vec3; 3]> {
    match *shape {
        Shape::Cuboid {
            width,
            height,
            depth,
        } => {
            let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
            let vertices = [
                [-x, -y, -z],
                [x, -y, -z],
                [x, y, -z],
                [-x, y, -z],
                [-x, -y, z],
                [x, -y, z],
                [x, y, z],
                [-x, y, z],
            ];
            // Each face is defined by 4 vertex indices
            let faces = [
                (0, 1, 2, 3),
                (5, 4, 7, 6),
                (4, 0, 3, 7),
                (1, 5, 6, 2),
                (4, 5, 1, 0),
                (3, 2, 6, 7),
            ];
            faces
                .iter()
                .flat_map(|&(a, b, c, d)| {
                    [
                        [vertices[a], vertices[b], vertices[c]],
                        [vertices[a], vertices[c], vertices[d]],
                    ]
                })
                .collect()
        }
        Shape::Plane { width, height } => {
            let (x, y) = (width / 2.0, height / 2.0);
            vec![
                [[-x, -y, 0.0], [x, -y, 0.0], [x, y, 0.0]],
                [[-x, -y, 0.0], [x, y, 0.0], [-x, y, 0.0]],
            ]
        }
        Shape::Arrow => {
            // Head and shaft of a 0.6 m arrow lying flat, tip towards +Z
            vec![
                [[0.0, 0.0, 0.3], [0.15, 0.0, 0.0], [-0.15, 0.0, 0.0]],
                [[0.05, 0.0, 0.0], [0.05, 0.0, -0.3], [-0.05, 0.0, -0.3]],
                [[0.05, 0.0, 0.0], [-0.05, 0.0, -0.3], [-0.05, 0.0, 0.0]],
            ]
        }
        Shape::Group | Shape::Grid { .. } => Vec::new(),
    }
}

/// Line segments of a shape in its local space
pub fn shape_lines(shape: &Shape) -> Vec<(Vec3, Vec3)> {
    match *shape {
        Shape::Grid { size, divisions } => {
            let half = size / 2.0;
            let step = size / divisions.max(1) as f64;
            (0..=divisions)
                .flat_map(|i| {
                    let offset = -half + i as f64 * step;
                    [
                        ([offset, 0.0, -half], [offset, 0.0, half]),
                        ([-half, 0.0, offset], [half, 0.0, offset]),
                    ]
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Camera-space face normal of a triangle
pub fn face_normal(triangle: &[Vec3; 3]) -> Vec3 {
    calculate_normal(&triangle[0], &triangle[1], &triangle[2])
}

/// Draws a triangle with per-cell lighting.
///
/// Opaque triangles write depth; translucent ones blend without writing it.
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    canvas: &mut Canvas,
    light_pos: &Vec3,
    base_color: Color,
    opacity: f64,
) {
    let (width, height) = (canvas.width, canvas.height);
    if width == 0 || height == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    for y in min_y as usize..=max_y as usize {
        for x in min_x as usize..=max_x as usize {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Normalized barycentric coordinates, positive inside either winding
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // Depth test
            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
            let offset = y * width + x;
            if depth >= canvas.z_buffer[offset] {
                continue;
            }

            // Interpolate position and normal
            let mut position = [0.0; 3];
            let mut normal = [0.0; 3];
            for i in 0..3 {
                position[i] = v0.position[i] * w0 + v1.position[i] * w1 + v2.position[i] * w2;
                normal[i] = v0.normal[i] * w0 + v1.normal[i] * w1 + v2.normal[i] * w2;
            }
            let light_intensity =
                calculate_light_intensity(&normal, &position, light_pos, AMBIENT);
            let shaded_color = apply_lighting(base_color, light_intensity);

            let cell = &mut canvas.cells[offset];
            if opacity >= 1.0 {
                canvas.z_buffer[offset] = depth;
                cell.background = shaded_color;
            } else {
                cell.background = cell.background.mix(shaded_color, opacity);
            }
        }
    }
}

/// Draws a depth-tested line between two projected points using Bresenham's algorithm
pub fn draw_line(v0: &Vertex, v1: &Vertex, canvas: &mut Canvas, color: Color) {
    let (width, height) = (canvas.width as isize, canvas.height as isize);
    let (mut x0, mut y0, x1, y1) = (
        v0.screen_position[0].round() as isize,
        v0.screen_position[1].round() as isize,
        v1.screen_position[0].round() as isize,
        v1.screen_position[1].round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy
    let steps = dx.max(-dy).max(1) as f64;
    let mut step = 0.0;

    loop {
        if x0 >= 0 && x0 < width && y0 >= 0 && y0 < height {
            let depth = v0.depth + (v1.depth - v0.depth) * (step / steps);
            let offset = y0 as usize * canvas.width + x0 as usize;
            if depth <= canvas.z_buffer[offset] + LINE_DEPTH_BIAS {
                canvas.cells[offset].background = color;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        step += 1.0;
    }
}

/// Applies lighting to a color
pub fn apply_lighting(color: Color, intensity: f64) -> Color {
    let channel = |c: u8| (c as f64 * intensity).min(255.0) as u8;
    Color {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f64, y: f64, depth: f64) -> Vertex {
        Vertex {
            position: [x, y, -depth],
            screen_position: [x, y],
            depth,
            normal: [0.0, 0.0, 1.0],
        }
    }

    #[test]
    fn triangle_fills_covered_cells_with_either_winding() {
        let red = Color::from_hex(0xff0000);
        let light = [5.0, 5.0, 10.0];
        for flip in [false, true] {
            let mut canvas = Canvas::new(10, 10, Color::BLACK);
            let (a, b, c) = (vertex(0.0, 0.0, 2.0), vertex(10.0, 0.0, 2.0), vertex(0.0, 10.0, 2.0));
            if flip {
                draw_triangle(&a, &c, &b, &mut canvas, &light, red, 1.0);
            } else {
                draw_triangle(&a, &b, &c, &mut canvas, &light, red, 1.0);
            }
            assert_ne!(canvas.cell(1, 1).unwrap().background, Color::BLACK);
            assert_eq!(canvas.cell(9, 9).unwrap().background, Color::BLACK);
        }
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let light = [5.0, 5.0, 10.0];
        let near = Color::from_hex(0x00ff00);
        let far = Color::from_hex(0x0000ff);
        let mut canvas = Canvas::new(8, 8, Color::BLACK);
        let tri = |depth| {
            (
                vertex(0.0, 0.0, depth),
                vertex(8.0, 0.0, depth),
                vertex(0.0, 8.0, depth),
            )
        };

        let (a, b, c) = tri(1.0);
        draw_triangle(&a, &b, &c, &mut canvas, &light, near, 1.0);
        let (a, b, c) = tri(3.0);
        draw_triangle(&a, &b, &c, &mut canvas, &light, far, 1.0);

        let cell = canvas.cell(1, 1).unwrap().background;
        assert!(cell.g > 0 && cell.b == 0);
        assert!((canvas.depth(1, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clipping_keeps_only_the_part_in_front_of_the_camera() {
        let in_front = [[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]];
        assert_eq!(clip_triangle(&in_front).len(), 1);

        let behind = [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];
        assert!(clip_triangle(&behind).is_empty());

        let straddling = [[0.0, 0.0, -1.0], [1.0, 0.0, 1.0], [0.0, 1.0, -1.0]];
        let pieces = clip_triangle(&straddling);
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().flatten().all(|p| -p[2] >= NEAR - 1e-12));

        assert!(clip_line([0.0, 0.0, 1.0], [0.0, 0.0, 2.0]).is_none());
        let (a, _) = clip_line([0.0, 0.0, 1.0], [0.0, 0.0, -2.0]).unwrap();
        assert_eq!(a[2], -NEAR);
    }

    #[test]
    fn shapes_produce_expected_geometry() {
        let cuboid = Shape::Cuboid {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        };
        assert_eq!(shape_triangles(&cuboid).len(), 12);
        assert_eq!(shape_triangles(&Shape::Arrow).len(), 3);
        assert!(shape_triangles(&Shape::Group).is_empty());
        let grid = Shape::Grid {
            size: 12.0,
            divisions: 12,
        };
        assert_eq!(shape_lines(&grid).len(), 26);
    }

    #[test]
    fn text_is_clipped_to_the_canvas() {
        let mut canvas = Canvas::new(4, 2, Color::BLACK);
        canvas.draw_text(-1, 0, "abcdef", Color::WHITE, None);
        assert_eq!(canvas.cell(0, 0).unwrap().glyph, Some(('b', Color::WHITE)));
        assert_eq!(canvas.cell(3, 0).unwrap().glyph, Some(('e', Color::WHITE)));
        canvas.draw_text(0, 5, "x", Color::WHITE, None);
    }
}
