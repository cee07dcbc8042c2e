/// Software RGBA canvas implementing [`RasterSurface`]
use nalgebra::Point2;

use crate::raster::{RasterSurface, Rgba};

/// Row-major pixel buffer with canvas-style path filling.
///
/// Fills use the even-odd rule sampled at pixel centres, so a polygon covers
/// exactly the pixels whose centre lies inside it. No anti-aliasing.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    subpaths: Vec<Vec<Point2<f64>>>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
            subpaths: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Sample at canvas coordinates, clamped to the edge
    pub fn sample(&self, x: f64, y: f64) -> Rgba {
        if self.pixels.is_empty() {
            return Rgba::TRANSPARENT;
        }
        let px = (x.max(0.0) as u32).min(self.width - 1);
        let py = (y.max(0.0) as u32).min(self.height - 1);
        self.pixels[py as usize * self.width as usize + px as usize]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Number of pixels with non-zero alpha
    pub fn count_painted(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        self.subpaths
            .iter()
            .filter(|path| path.len() >= 2)
            .flat_map(|path| {
                let closing = (path[path.len() - 1], path[0]);
                path.windows(2).map(|w| (w[0], w[1])).chain(std::iter::once(closing))
            })
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        let idx = y * self.width as usize + x;
        let dst = self.pixels[idx];
        let sa = color.opacity();
        let da = dst.opacity();
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            let c = (f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / out_a;
            c.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[idx] = Rgba::new(
            mix(color.r, dst.r),
            mix(color.g, dst.g),
            mix(color.b, dst.b),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        );
    }
}

impl RasterSurface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let x0 = x.floor().max(0.0) as usize;
        let y0 = y.floor().max(0.0) as usize;
        let x1 = ((x + width).ceil().max(0.0) as usize).min(self.width as usize);
        let y1 = ((y + height).ceil().max(0.0) as usize).min(self.height as usize);
        for row in y0..y1 {
            let start = row * self.width as usize;
            for px in &mut self.pixels[start + x0.min(x1)..start + x1] {
                *px = Rgba::TRANSPARENT;
            }
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![Point2::new(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(path) => path.push(Point2::new(x, y)),
            None => self.move_to(x, y),
        }
    }

    fn close_path(&mut self) {
        // Fills close every subpath; start a fresh one at the same point
        if let Some(first) = self.subpaths.last().and_then(|path| path.first().copied()) {
            self.subpaths.push(vec![first]);
        }
    }

    fn fill(&mut self, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let edges: Vec<_> = self
            .edges()
            .filter(|(a, b)| {
                a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()
            })
            .collect();
        if edges.is_empty() {
            return;
        }

        let (min_y, max_y) = edges
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
                (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
            });
        let row_start = min_y.floor().max(0.0) as usize;
        let row_end = (max_y.ceil().max(0.0) as usize).min(self.height as usize);

        let mut crossings = Vec::new();
        for row in row_start..row_end {
            let sy = row as f64 + 0.5;
            crossings.clear();
            for (a, b) in &edges {
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    crossings.push(a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as usize;
                let end = ((span[1] - 0.5).ceil().max(0.0) as usize).min(self.width as usize);
                for x in start..end {
                    self.blend(x, row, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_rect(canvas: &mut Canvas, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        canvas.begin_path();
        canvas.move_to(x, y);
        canvas.line_to(x + w, y);
        canvas.line_to(x + w, y + h);
        canvas.line_to(x, y + h);
        canvas.close_path();
        canvas.fill(color);
    }

    #[test]
    fn test_clear_rect_only_clears_region() {
        let mut canvas = Canvas::new(8, 8);
        fill_rect(&mut canvas, 0.0, 0.0, 8.0, 8.0, Rgba::BLACK);
        canvas.clear_rect(2.0, 2.0, 3.0, 3.0);
        assert_eq!(canvas.count_painted(), 64 - 9);
        assert_eq!(canvas.pixel(3, 3), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn test_alpha_blends_over_existing_content() {
        let mut canvas = Canvas::new(4, 4);
        fill_rect(&mut canvas, 0.0, 0.0, 4.0, 4.0, Rgba::WHITE);
        fill_rect(&mut canvas, 0.0, 0.0, 4.0, 4.0, Rgba::new(0, 0, 0, 51));
        // 20% black over white
        assert_eq!(canvas.pixel(1, 1), Some(Rgba::new(204, 204, 204, 255)));
    }

    #[test]
    fn test_translucent_fill_over_nothing_keeps_color() {
        let mut canvas = Canvas::new(4, 4);
        fill_rect(&mut canvas, 0.0, 0.0, 4.0, 4.0, Rgba::new(40, 80, 200, 200));
        assert_eq!(canvas.pixels().len(), 16);
        assert!(canvas.pixels().iter().all(|&p| p == Rgba::new(40, 80, 200, 200)));
    }

    #[test]
    fn test_triangle_fill_is_clipped_to_canvas() {
        let mut canvas = Canvas::new(10, 10);
        canvas.begin_path();
        canvas.move_to(-20.0, -20.0);
        canvas.line_to(30.0, -20.0);
        canvas.line_to(-20.0, 30.0);
        canvas.close_path();
        canvas.fill(Rgba::BLACK);
        // hypotenuse x + y = 10 passes through the canvas
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(canvas.pixel(9, 9), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.count_painted(), 45);
    }

    #[test]
    fn test_even_odd_leaves_hole() {
        let mut canvas = Canvas::new(10, 10);
        canvas.begin_path();
        for (x, y, s) in [(0.0, 0.0, 10.0), (3.0, 3.0, 4.0)] {
            canvas.move_to(x, y);
            canvas.line_to(x + s, y);
            canvas.line_to(x + s, y + s);
            canvas.line_to(x, y + s);
            canvas.close_path();
        }
        canvas.fill(Rgba::BLACK);
        assert_eq!(canvas.count_painted(), 100 - 16);
        assert_eq!(canvas.pixel(4, 4), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_sample_clamps_to_edges() {
        let mut canvas = Canvas::new(2, 2);
        fill_rect(&mut canvas, 1.0, 1.0, 1.0, 1.0, Rgba::BLACK);
        assert_eq!(canvas.sample(50.0, 50.0), Rgba::BLACK);
        assert_eq!(canvas.sample(-3.0, -3.0), Rgba::TRANSPARENT);
    }
}
