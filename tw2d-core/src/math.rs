/// Homogeneous 2D transform algebra
use nalgebra::{Matrix3, Point2, Vector3};

/// 3x3 homogeneous transform matrix
pub type Mat3 = Matrix3<f64>;

/// Homogeneous 2D vector (x, y, w)
pub type Vec3h = Vector3<f64>;

/// Create a homogeneous vertex
pub fn vec3h(x: f64, y: f64, w: f64) -> Vec3h {
    Vec3h::new(x, y, w)
}

/// The multiplicative identity
pub fn identity() -> Mat3 {
    Mat3::identity()
}

/// Maps (x, y, 1) to (x + tx, y + ty, 1)
#[rustfmt::skip]
pub fn translate(tx: f64, ty: f64) -> Mat3 {
    Mat3::new(
        1.0, 0.0, tx,
        0.0, 1.0, ty,
        0.0, 0.0, 1.0,
    )
}

/// Rotation about the origin, in degrees.
///
/// Positive angles turn counter-clockwise in standard math orientation. On a
/// raster surface with y pointing down the same angle turns clockwise.
#[rustfmt::skip]
pub fn rotate(angle_degrees: f64) -> Mat3 {
    let (s, c) = angle_degrees.to_radians().sin_cos();
    Mat3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Maps (x, y, 1) to (sx * x, sy * y, 1). Zero and negative factors are allowed.
#[rustfmt::skip]
pub fn scale(sx: f64, sy: f64) -> Mat3 {
    Mat3::new(
        sx, 0.0, 0.0,
        0.0, sy, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Apply a chain of matrices to a vector, right to left.
///
/// `[A, B, C]` applies `C` first and `A` last: `A(B(C v))`.
pub fn multiply(matrices: &[Mat3], vector: Vec3h) -> Vec3h {
    matrices.iter().rev().fold(vector, |v, m| m * v)
}

/// Product of a chain, such that `compose(chain) * v == multiply(chain, v)`
pub fn compose(matrices: &[Mat3]) -> Mat3 {
    matrices.iter().fold(identity(), |acc, m| acc * m)
}

/// Homogeneous divide. Returns `None` when w is zero.
pub fn to_point(v: &Vec3h) -> Option<Point2<f64>> {
    if v.z.abs() < f64::EPSILON {
        return None;
    }
    Some(Point2::new(v.x / v.z, v.y / v.z))
}
