/// A point or direction in 3D space
pub type Vec3 = [f64; 3];

/// A row-major 3x3 matrix
pub type Mat3 = [[f64; 3]; 3];

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            result[i] += value * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation about the X axis
pub fn rotation_x(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Rotation about the vertical (Y) axis
pub fn rotation_y(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

/// Rotation about the Z axis
pub fn rotation_z(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]]
}

/// Euler rotation applied X first, then Y, then Z
pub fn euler_rotation(rotation: &Vec3) -> Mat3 {
    let xy = multiply_matrices(&rotation_y(rotation[1]), &rotation_x(rotation[0]));
    multiply_matrices(&rotation_z(rotation[2]), &xy)
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: &Vec3, factor: &Vec3) -> Vec3 {
    [v[0] * factor[0], v[1] * factor[1], v[2] * factor[2]]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Normalizes a vector, leaving zero-length vectors untouched
pub fn normalize(v: &Vec3) -> Vec3 {
    let length = dot(v, v).sqrt();
    if length == 0.0 {
        return *v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Calculates the normal vector of a triangle
pub fn calculate_normal(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    let u = sub(b, a);
    let v = sub(c, a);
    let normal = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    normalize(&normal)
}

/// Planar heading of the vector `from -> to`, measured about the vertical axis.
///
/// Zero points along +Z and positive angles turn towards +X, so a node rotated
/// by the heading about Y faces along the vector.
pub fn planar_heading(from: &Vec3, to: &Vec3) -> f64 {
    let direction = sub(to, from);
    direction[0].atan2(direction[2])
}

/// Calculates the light intensity based on the normal vector and light position
///
/// Faces turned away from the light still receive `ambient`.
pub fn calculate_light_intensity(
    normal: &Vec3,
    position: &Vec3,
    light_pos: &Vec3,
    ambient: f64,
) -> f64 {
    let light_dir = normalize(&sub(light_pos, position));
    // Both sides of a plane are lit
    let diffuse = dot(normal, &light_dir).abs();
    (ambient + (1.0 - ambient) * diffuse).min(1.0)
}
