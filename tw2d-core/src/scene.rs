/// Animated shapes, their motion state and the slides that group them
use nalgebra::{Point2, Vector2};

use crate::error::SceneError;
use crate::math::{self, vec3h, Mat3, Vec3h};
use crate::raster::Rgba;
use crate::transform::Chain;

/// Reference canvas the demo scene is laid out on
pub const REFERENCE_WIDTH: f64 = 800.0;
pub const REFERENCE_HEIGHT: f64 = 600.0;

/// Axis-aligned limits a bouncing shape's edges are tested against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// The whole drawable area
    pub fn canvas(width: f64, height: f64) -> Self {
        Self::new(0.0, width, 0.0, height)
    }

    /// The drawable area shrunk by `margin` on every side
    pub fn inset(width: f64, height: f64, margin: f64) -> Self {
        Self::new(margin, width - margin, margin, height - margin)
    }
}

/// Linear motion that reflects off its bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Bounce {
    /// Centre of the base geometry
    pub origin: Point2<f64>,
    /// Live translation applied to the base geometry
    pub offset: Vector2<f64>,
    /// Units per second
    pub velocity: Vector2<f64>,
    pub half_extent: Vector2<f64>,
    pub bounds: Bounds,
}

impl Bounce {
    pub fn new(
        origin: Point2<f64>,
        velocity: Vector2<f64>,
        half_extent: Vector2<f64>,
        bounds: Bounds,
    ) -> Self {
        Self {
            origin,
            offset: Vector2::zeros(),
            velocity,
            half_extent,
            bounds,
        }
    }

    pub fn with_offset(mut self, offset: Vector2<f64>) -> Self {
        self.offset = offset;
        self
    }

    /// Current centre on the canvas
    pub fn position(&self) -> Point2<f64> {
        self.origin + self.offset
    }
}

/// Continuous rotation about a pivot
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    pub pivot: Point2<f64>,
    /// Degrees per second; the sign picks the direction
    pub speed: f64,
    /// Angle for the current frame, in degrees
    pub angle: f64,
}

impl Spin {
    pub fn new(pivot: Point2<f64>, speed: f64) -> Self {
        Self {
            pivot,
            speed,
            angle: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Growing,
    Shrinking,
}

/// Cyclic grow/shrink about a pivot, counted in frames
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub pivot: Point2<f64>,
    /// Frames per half cycle, at least 1
    pub threshold: u32,
    pub grown_frames: u32,
    pub cooldown: u32,
    pub phase: Phase,
    /// Extra scale reached at the top of the cycle, per axis
    pub growth: Vector2<f64>,
    /// Amplitude of the per-frame pulse driven by the frame delta
    pub wobble: Vector2<f64>,
    /// Radians of wobble per millisecond of delta
    pub wobble_rate: f64,
    /// Scale factor for the current frame
    pub factor: Vector2<f64>,
}

impl Pulse {
    pub fn new(pivot: Point2<f64>, threshold: u32, growth: Vector2<f64>) -> Self {
        Self {
            pivot,
            threshold: threshold.max(1),
            grown_frames: 0,
            cooldown: 0,
            phase: Phase::Growing,
            growth,
            wobble: Vector2::zeros(),
            wobble_rate: 0.0,
            factor: Vector2::new(1.0, 1.0),
        }
    }

    pub fn with_wobble(mut self, wobble: Vector2<f64>, rate: f64) -> Self {
        self.wobble = wobble;
        self.wobble_rate = rate;
        self
    }

    /// Counter driving the scale factor in the current phase
    pub fn level(&self) -> u32 {
        match self.phase {
            Phase::Growing => self.grown_frames,
            Phase::Shrinking => self.cooldown,
        }
    }
}

/// One motion rule attached to a shape
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Bounce(Bounce),
    Spin(Spin),
    Pulse(Pulse),
}

/// A convex polygon with its motion state and committed transform
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    pub color: Rgba,
    pub behaviors: Vec<Behavior>,
    vertices: Vec<Vec3h>,
    transform: Mat3,
}

impl Shape {
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3h>,
        color: Rgba,
    ) -> Result<Self, SceneError> {
        if vertices.len() < 3 {
            return Err(SceneError::TooFewVertices(vertices.len()));
        }
        Ok(Self {
            name: name.into(),
            color,
            behaviors: Vec::new(),
            vertices,
            transform: math::identity(),
        })
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Base geometry, untransformed
    pub fn vertices(&self) -> &[Vec3h] {
        &self.vertices
    }

    pub fn transform(&self) -> &Mat3 {
        &self.transform
    }

    /// Build the composition chain from the current motion state
    pub fn chain(&self) -> Chain {
        self.behaviors
            .iter()
            .fold(Chain::new(), |chain, behavior| match behavior {
                Behavior::Bounce(b) => chain.translate(b.offset.x, b.offset.y),
                Behavior::Spin(s) => chain.rotate_about(s.pivot, s.angle),
                Behavior::Pulse(p) => chain.scale_about(p.pivot, p.factor.x, p.factor.y),
            })
    }

    /// Recompose the chain and make it the shape's transform
    pub fn commit(&mut self) {
        self.transform = self.chain().commit();
    }

    pub fn transformed_vertices(&self) -> Vec<Vec3h> {
        self.vertices.iter().map(|v| self.transform * v).collect()
    }
}

/// Shapes drawn together
#[derive(Debug, Clone)]
pub struct Slide {
    pub title: String,
    shapes: Vec<usize>,
}

impl Slide {
    pub fn shapes(&self) -> &[usize] {
        &self.shapes
    }
}

/// Every shape of the run plus the slides selecting them
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    slides: Vec<Slide>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, mut shape: Shape) -> usize {
        shape.commit();
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Add a slide from already added shape indices. Unknown indices are dropped.
    pub fn add_slide(&mut self, title: impl Into<String>, shapes: Vec<usize>) -> usize {
        let title = title.into();
        let count = self.shapes.len();
        let shapes: Vec<usize> = shapes.into_iter().filter(|&i| i < count).collect();
        log::debug!("slide {:?} with {} shapes", title, shapes.len());
        self.slides.push(Slide { title, shapes });
        self.slides.len() - 1
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// Shapes of a slide in drawing order
    pub fn active_shapes(&self, slide: usize) -> impl Iterator<Item = &Shape> + '_ {
        self.slides
            .get(slide)
            .map(|s| s.shapes.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&i| self.shapes.get(i))
    }

    /// Mutable shapes of a slide, in index order
    pub fn active_shapes_mut(&mut self, slide: usize) -> impl Iterator<Item = &mut Shape> + '_ {
        let active: &[usize] = self.slides.get(slide).map(|s| s.shapes.as_slice()).unwrap_or(&[]);
        self.shapes
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| active.contains(i))
            .map(|(_, shape)| shape)
    }

    /// The four demo slides, laid out for a `width` x `height` canvas
    pub fn demo(width: f64, height: f64) -> Result<Self, SceneError> {
        let sx = width / REFERENCE_WIDTH;
        let sy = height / REFERENCE_HEIGHT;
        let at = |x: f64, y: f64| Point2::new(x * sx, y * sy);
        let unit = sx.min(sy);

        let mut scene = Self::new();

        // Bouncing ball
        let center = at(400.0, 300.0);
        let radius = 50.0 * unit;
        let ball = Shape::new("ball", circle(center, radius, 32), Rgba::BLACK)?.with_behavior(
            Behavior::Bounce(
                Bounce::new(
                    center,
                    Vector2::new(240.0 * sx, 160.0 * sy),
                    Vector2::new(radius, radius),
                    Bounds::canvas(width, height),
                )
                .with_offset(Vector2::new(120.0 * sx, 80.0 * sy)),
            ),
        );
        let ball = scene.add_shape(ball);
        scene.add_slide("bouncing ball", vec![ball]);

        // Spinners, each about its own centre
        let c = at(180.0, 300.0);
        let square = Shape::new(
            "spinning square",
            regular_polygon(c, 80.0 * unit, 4, 45.0),
            Rgba::new(200, 40, 40, 255),
        )?
        .with_behavior(Behavior::Spin(Spin::new(c, 90.0)));
        let c = at(400.0, 300.0);
        let triangle = Shape::new(
            "spinning triangle",
            regular_polygon(c, 75.0 * unit, 3, 90.0),
            Rgba::new(40, 160, 60, 255),
        )?
        .with_behavior(Behavior::Spin(Spin::new(c, -45.0)));
        let c = at(620.0, 300.0);
        let hexagon = Shape::new(
            "spinning hexagon",
            regular_polygon(c, 70.0 * unit, 6, 0.0),
            Rgba::new(40, 80, 200, 200),
        )?
        .with_behavior(Behavior::Spin(Spin::new(c, 200.0)));
        let spinners = vec![
            scene.add_shape(square),
            scene.add_shape(triangle),
            scene.add_shape(hexagon),
        ];
        scene.add_slide("spinning polygons", spinners);

        // Growing and shrinking
        let square = Shape::new(
            "pulsing square",
            rect_at(at(400.0, 300.0), 100.0 * sx, 100.0 * sy),
            Rgba::BLACK,
        )?
        .with_behavior(Behavior::Pulse(
            Pulse::new(at(450.0, 350.0), 60, Vector2::new(0.5, 0.5))
                .with_wobble(Vector2::new(0.02, 0.02), 0.4),
        ));
        let triangle = Shape::new(
            "stretching triangle",
            vec![
                vec3h_at(at(100.0, 100.0)),
                vec3h_at(at(200.0, 200.0)),
                vec3h_at(at(300.0, 100.0)),
            ],
            Rgba::new(150, 60, 170, 255),
        )?
        .with_behavior(Behavior::Pulse(
            Pulse::new(at(200.0, 133.0), 90, Vector2::new(1.0, 0.25))
                .with_wobble(Vector2::new(0.05, 0.03), 0.25),
        ));
        let pulsers = vec![scene.add_shape(square), scene.add_shape(triangle)];
        scene.add_slide("growing and shrinking", pulsers);

        // Translation, rotation and scale together
        let c = at(300.0, 250.0);
        let r = 60.0 * unit;
        let pentagon = Shape::new(
            "tumbling pentagon",
            regular_polygon(c, r, 5, 90.0),
            Rgba::new(230, 140, 20, 255),
        )?
        .with_behavior(Behavior::Bounce(Bounce::new(
            c,
            Vector2::new(-180.0 * sx, 130.0 * sy),
            Vector2::new(r * 1.3, r * 1.3),
            Bounds::inset(width, height, 40.0 * unit),
        )))
        .with_behavior(Behavior::Spin(Spin::new(c, 150.0)))
        .with_behavior(Behavior::Pulse(
            Pulse::new(c, 45, Vector2::new(0.3, 0.3)).with_wobble(Vector2::new(0.03, 0.03), 0.3),
        ));
        let c = at(550.0, 400.0);
        let diamond = Shape::new(
            "diamond",
            regular_polygon(c, 35.0 * unit, 4, 0.0),
            Rgba::new(20, 150, 170, 220),
        )?
        .with_behavior(Behavior::Bounce(Bounce::new(
            c,
            Vector2::new(220.0 * sx, -200.0 * sy),
            Vector2::new(35.0 * unit, 35.0 * unit),
            Bounds::inset(width, height, 40.0 * unit),
        )))
        .with_behavior(Behavior::Spin(Spin::new(c, -240.0)));
        let creative = vec![scene.add_shape(pentagon), scene.add_shape(diamond)];
        scene.add_slide("tumbling", creative);

        Ok(scene)
    }
}

fn vec3h_at(p: Point2<f64>) -> Vec3h {
    vec3h(p.x, p.y, 1.0)
}

/// Vertices of a circle approximation, vertex `i` at angle `2*pi*i/segments`
pub fn circle(center: Point2<f64>, radius: f64, segments: usize) -> Vec<Vec3h> {
    (0..segments)
        .map(|i| {
            let theta = std::f64::consts::TAU / segments as f64 * i as f64;
            vec3h(center.x + radius * theta.cos(), center.y + radius * theta.sin(), 1.0)
        })
        .collect()
}

/// Regular polygon with its first vertex at `phase_degrees`
pub fn regular_polygon(
    center: Point2<f64>,
    radius: f64,
    sides: usize,
    phase_degrees: f64,
) -> Vec<Vec3h> {
    let phase = phase_degrees.to_radians();
    (0..sides)
        .map(|i| {
            let theta = phase + std::f64::consts::TAU / sides as f64 * i as f64;
            vec3h(center.x + radius * theta.cos(), center.y + radius * theta.sin(), 1.0)
        })
        .collect()
}

/// Axis-aligned rectangle from its top-left corner
pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Vec<Vec3h> {
    vec![
        vec3h(x, y, 1.0),
        vec3h(x, y + height, 1.0),
        vec3h(x + width, y + height, 1.0),
        vec3h(x + width, y, 1.0),
    ]
}

fn rect_at(corner: Point2<f64>, width: f64, height: f64) -> Vec<Vec3h> {
    rect(corner.x, corner.y, width, height)
}

pub fn triangle(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Vec<Vec3h> {
    vec![vec3h_at(a), vec3h_at(b), vec3h_at(c)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_needs_three_vertices() {
        let err =
            Shape::new("line", rect(0.0, 0.0, 1.0, 1.0)[..2].to_vec(), Rgba::BLACK).unwrap_err();
        assert_eq!(err, SceneError::TooFewVertices(2));
    }

    #[test]
    fn test_circle_vertices() {
        let verts = circle(Point2::new(400.0, 300.0), 50.0, 32);
        assert_eq!(verts.len(), 32);
        assert!((verts[0] - vec3h(450.0, 300.0, 1.0)).norm() < 1e-9);
        for v in &verts {
            let d = ((v.x - 400.0).powi(2) + (v.y - 300.0).powi(2)).sqrt();
            assert!((d - 50.0).abs() < 1e-9);
            assert_eq!(v.z, 1.0);
        }
    }

    #[test]
    fn test_commit_uses_behaviors() {
        let verts = triangle(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0));
        let bounce = Bounce::new(
            Point2::origin(),
            Vector2::zeros(),
            Vector2::zeros(),
            Bounds::canvas(10.0, 10.0),
        )
        .with_offset(Vector2::new(3.0, 4.0));
        let mut shape = Shape::new("tri", verts, Rgba::BLACK)
            .unwrap()
            .with_behavior(Behavior::Bounce(bounce));
        assert_eq!(shape.transform(), &math::identity());

        shape.commit();
        let moved = shape.transformed_vertices();
        assert!((moved[1] - vec3h(4.0, 4.0, 1.0)).norm() < 1e-9);
        // base geometry is never touched
        assert_eq!(shape.vertices()[1], vec3h(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_demo_scene_layout() {
        let scene = Scene::demo(800.0, 600.0).unwrap();
        assert_eq!(scene.slide_count(), 4);
        assert_eq!(scene.active_shapes(0).count(), 1);
        assert!(scene.active_shapes(1).count() >= 3);
        assert!(scene.active_shapes(2).count() >= 2);
        assert_eq!(scene.active_shapes(9).count(), 0);

        let speeds: Vec<f64> = scene
            .active_shapes(1)
            .flat_map(|s| &s.behaviors)
            .filter_map(|b| match b {
                Behavior::Spin(spin) => Some(spin.speed),
                _ => None,
            })
            .collect();
        assert!(speeds.iter().any(|&s| s < 0.0) && speeds.iter().any(|&s| s > 0.0));

        let non_uniform = scene.active_shapes(2).flat_map(|s| &s.behaviors).any(|b| match b {
            Behavior::Pulse(p) => p.growth.x != p.growth.y,
            _ => false,
        });
        assert!(non_uniform);

        let combined = scene.active_shapes(3).any(|s| s.behaviors.len() == 3);
        assert!(combined);
    }

    #[test]
    fn test_active_shapes_mut_only_yields_slide_members() {
        let mut scene = Scene::demo(800.0, 600.0).unwrap();
        let names: Vec<String> = scene.active_shapes_mut(2).map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["pulsing square", "stretching triangle"]);
    }

    #[test]
    fn test_add_slide_drops_unknown_indices() {
        let mut scene = Scene::new();
        let shape =
            scene.add_shape(Shape::new("sq", rect(0.0, 0.0, 2.0, 2.0), Rgba::BLACK).unwrap());
        let slide = scene.add_slide("one", vec![shape, 42]);
        assert_eq!(scene.slide(slide).unwrap().shapes(), &[shape]);
        assert_eq!(scene.shape(shape).map(|s| s.name.as_str()), Some("sq"));
        assert!(scene.shape(42).is_none());
    }
}
