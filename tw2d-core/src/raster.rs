/// Convex polygon rasterization onto a path-based raster surface
use crate::error::RasterError;
use crate::math::{self, Vec3h};

/// 8-bit RGBA colour; alpha 255 is fully opaque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opacity in [0, 1]
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// CSS `rgba()` notation, alpha on a 0-1 scale
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.opacity())
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// Drawing surface driven with canvas-style path commands
pub trait RasterSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    /// Fill the current path with `color`, opacity scaled by `color.a / 255`
    fn fill(&mut self, color: Rgba);

    fn clear(&mut self) {
        let (w, h) = (f64::from(self.width()), f64::from(self.height()));
        self.clear_rect(0.0, 0.0, w, h);
    }
}

/// Divide each vertex by w and fill the closed path through them in order.
///
/// Winding and convexity are up to the caller. A vertex with w = 0 (or
/// within `f64::EPSILON` of it) is a contract violation: it asserts in debug
/// builds and returns an error otherwise, before anything is drawn.
pub fn draw_convex_polygon<S: RasterSurface + ?Sized>(
    surface: &mut S,
    vertices: &[Vec3h],
    color: Rgba,
) -> Result<(), RasterError> {
    if vertices.len() < 3 {
        return Err(RasterError::TooFewVertices(vertices.len()));
    }

    let mut points = Vec::with_capacity(vertices.len());
    for (index, v) in vertices.iter().enumerate() {
        debug_assert!(math::to_point(v).is_some(), "vertex {index} has w = 0");
        let p = math::to_point(v).ok_or(RasterError::DegenerateVertex { index })?;
        points.push(p);
    }

    surface.begin_path();
    surface.move_to(points[0].x, points[0].y);
    for p in &points[1..] {
        surface.line_to(p.x, p.y);
    }
    surface.close_path();
    surface.fill(color);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::math::vec3h;

    fn square(w: f64) -> Vec<Vec3h> {
        vec![
            vec3h(0.0, 0.0, w),
            vec3h(10.0 * w, 0.0, w),
            vec3h(10.0 * w, 10.0 * w, w),
            vec3h(0.0, 10.0 * w, w),
        ]
    }

    #[test]
    fn test_square_fill_covers_exactly_ten_by_ten() {
        let mut canvas = Canvas::new(20, 20);
        // leftover content from a previous frame
        draw_convex_polygon(
            &mut canvas,
            &[vec3h(12.0, 12.0, 1.0), vec3h(19.0, 12.0, 1.0), vec3h(19.0, 19.0, 1.0)],
            Rgba::new(255, 0, 0, 255),
        )
        .unwrap();

        canvas.clear();
        draw_convex_polygon(&mut canvas, &square(1.0), Rgba::from([0, 0, 0, 255])).unwrap();

        for y in 0..20 {
            for x in 0..20 {
                let expected = if x < 10 && y < 10 { Rgba::BLACK } else { Rgba::TRANSPARENT };
                assert_eq!(canvas.pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
        assert_eq!(canvas.count_painted(), 100);
    }

    #[test]
    fn test_homogeneous_divide() {
        let mut canvas = Canvas::new(20, 20);
        draw_convex_polygon(&mut canvas, &square(2.0), Rgba::BLACK).unwrap();
        assert_eq!(canvas.count_painted(), 100);
        assert_eq!(canvas.pixel(10, 10), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_rejects_short_vertex_lists() {
        let mut canvas = Canvas::new(4, 4);
        let err = draw_convex_polygon(&mut canvas, &square(1.0)[..2], Rgba::BLACK).unwrap_err();
        assert_eq!(err, RasterError::TooFewVertices(2));
        assert_eq!(canvas.count_painted(), 0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_degenerate_vertex_is_an_error_in_release() {
        let mut canvas = Canvas::new(4, 4);
        let mut verts = square(1.0);
        verts[2].z = 0.0;
        let err = draw_convex_polygon(&mut canvas, &verts, Rgba::BLACK).unwrap_err();
        assert_eq!(err, RasterError::DegenerateVertex { index: 2 });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "w = 0")]
    fn test_degenerate_vertex_asserts_in_debug() {
        let mut canvas = Canvas::new(4, 4);
        let mut verts = square(1.0);
        verts[2].z = 0.0;
        let _ = draw_convex_polygon(&mut canvas, &verts, Rgba::BLACK);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_near_zero_w_is_an_error_in_release() {
        let mut canvas = Canvas::new(4, 4);
        let mut verts = square(1.0);
        verts[1].z = 1e-17;
        let err = draw_convex_polygon(&mut canvas, &verts, Rgba::BLACK).unwrap_err();
        assert_eq!(err, RasterError::DegenerateVertex { index: 1 });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "vertex 1 has w = 0")]
    fn test_near_zero_w_asserts_in_debug() {
        let mut canvas = Canvas::new(4, 4);
        let mut verts = square(1.0);
        verts[1].z = 1e-17;
        let _ = draw_convex_polygon(&mut canvas, &verts, Rgba::BLACK);
    }

    #[test]
    fn test_css_color() {
        assert_eq!(Rgba::new(10, 20, 30, 255).css(), "rgba(10,20,30,1)");
        assert_eq!(Rgba::TRANSPARENT.css(), "rgba(0,0,0,0)");
    }
}
