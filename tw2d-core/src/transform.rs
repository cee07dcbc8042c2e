/// Composition chains for per-shape model transforms
use nalgebra::Point2;

use crate::math::{self, Mat3, Vec3h};

/// Rotation about `pivot` instead of the origin
pub fn rotate_about(pivot: Point2<f64>, angle_degrees: f64) -> [Mat3; 3] {
    [
        math::translate(pivot.x, pivot.y),
        math::rotate(angle_degrees),
        math::translate(-pivot.x, -pivot.y),
    ]
}

/// Scale about `pivot` instead of the origin
pub fn scale_about(pivot: Point2<f64>, sx: f64, sy: f64) -> [Mat3; 3] {
    [
        math::translate(pivot.x, pivot.y),
        math::scale(sx, sy),
        math::translate(-pivot.x, -pivot.y),
    ]
}

/// Plain translation
pub fn translation(tx: f64, ty: f64) -> [Mat3; 1] {
    [math::translate(tx, ty)]
}

/// Ordered matrix chain for one shape.
///
/// Effects are grouped into three stages regardless of the order they are
/// added in. Applied to a vertex, scale runs first, then rotation, then the
/// global translation, so repositioning the shape never goes through the
/// pivot offsets of the local effects. In chain (right-to-left) order that is
/// `[translation.., rotation.., scale..]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    global: Vec<Mat3>,
    rotation: Vec<Mat3>,
    scale: Vec<Mat3>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(mut self, tx: f64, ty: f64) -> Self {
        self.global.extend(translation(tx, ty));
        self
    }

    pub fn rotate_about(mut self, pivot: Point2<f64>, angle_degrees: f64) -> Self {
        self.rotation.extend(rotate_about(pivot, angle_degrees));
        self
    }

    pub fn scale_about(mut self, pivot: Point2<f64>, sx: f64, sy: f64) -> Self {
        self.scale.extend(scale_about(pivot, sx, sy));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.rotation.is_empty() && self.scale.is_empty()
    }

    /// Matrices in chain order, ready for [`math::multiply`]
    pub fn matrices(&self) -> Vec<Mat3> {
        self.global
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale)
            .copied()
            .collect()
    }

    pub fn apply(&self, v: Vec3h) -> Vec3h {
        math::multiply(&self.matrices(), v)
    }

    /// Collapse the chain into a single matrix
    pub fn commit(&self) -> Mat3 {
        math::compose(&self.matrices())
    }
}
