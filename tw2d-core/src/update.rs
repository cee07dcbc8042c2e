/// Per-frame motion rules
use crate::clock::FrameTime;
use crate::scene::{Behavior, Bounce, Phase, Pulse, Scene, Shape, Spin};

/// Advance every shape of `slide`, then commit their transforms
pub fn update_slide(scene: &mut Scene, slide: usize, frame: FrameTime) {
    for shape in scene.active_shapes_mut(slide) {
        update_shape(shape, frame);
    }
}

pub fn update_shape(shape: &mut Shape, frame: FrameTime) {
    for behavior in &mut shape.behaviors {
        match behavior {
            Behavior::Bounce(bounce) => step_bounce(bounce, frame.delta),
            Behavior::Spin(spin) => step_spin(spin, frame.time),
            Behavior::Pulse(pulse) => step_pulse(pulse, frame.delta),
        }
    }
    shape.commit();
}

/// Move by `velocity * delta / 1000`, then reflect each axis independently.
///
/// An axis flips only when its edge is past a bound and the shape is still
/// heading that way, so a shape that has already turned around is left alone.
pub fn step_bounce(bounce: &mut Bounce, delta: f64) {
    bounce.offset += bounce.velocity * (delta / 1000.0);

    let pos = bounce.position();
    let ext = bounce.half_extent;
    let bounds = bounce.bounds;

    if (pos.x - ext.x < bounds.min_x && bounce.velocity.x < 0.0)
        || (pos.x + ext.x > bounds.max_x && bounce.velocity.x > 0.0)
    {
        bounce.velocity.x = -bounce.velocity.x;
        log::trace!("bounce x at {:.1}", pos.x);
    }
    if (pos.y - ext.y < bounds.min_y && bounce.velocity.y < 0.0)
        || (pos.y + ext.y > bounds.max_y && bounce.velocity.y > 0.0)
    {
        bounce.velocity.y = -bounce.velocity.y;
        log::trace!("bounce y at {:.1}", pos.y);
    }
}

/// Absolute in elapsed time, never accumulated
pub fn step_spin(spin: &mut Spin, time: f64) {
    spin.angle = spin.speed * (time / 1000.0);
}

/// One frame of the GROWING -> SHRINKING -> GROWING cycle
pub fn step_pulse(pulse: &mut Pulse, delta: f64) {
    match pulse.phase {
        Phase::Growing => {
            if pulse.grown_frames < pulse.threshold {
                pulse.grown_frames += 1;
            }
            if pulse.grown_frames >= pulse.threshold {
                pulse.phase = Phase::Shrinking;
                pulse.cooldown = pulse.threshold;
            }
        }
        Phase::Shrinking => {
            pulse.cooldown = pulse.cooldown.saturating_sub(1);
            if pulse.cooldown == 0 {
                pulse.grown_frames = 0;
                pulse.phase = Phase::Growing;
            }
        }
    }

    let progress = f64::from(pulse.level()) / f64::from(pulse.threshold);
    let wave = delta * pulse.wobble_rate;
    pulse.factor.x = 1.0 + pulse.growth.x * progress + pulse.wobble.x * wave.sin();
    pulse.factor.y = 1.0 + pulse.growth.y * progress + pulse.wobble.y * wave.cos();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::math::vec3h;
    use crate::raster::Rgba;
    use crate::scene::{self, Bounds};
    use nalgebra::{Point2, Vector2};

    fn bouncer(origin: (f64, f64), velocity: (f64, f64)) -> Bounce {
        Bounce::new(
            Point2::new(origin.0, origin.1),
            Vector2::new(velocity.0, velocity.1),
            Vector2::new(10.0, 10.0),
            Bounds::canvas(800.0, 600.0),
        )
    }

    #[test]
    fn test_bounce_moves_by_velocity_per_second() {
        let mut b = bouncer((400.0, 300.0), (240.0, 160.0));
        step_bounce(&mut b, 500.0);
        assert!((b.offset - Vector2::new(120.0, 80.0)).norm() < 1e-9);
        assert_eq!(b.velocity, Vector2::new(240.0, 160.0));
    }

    #[test]
    fn test_bounce_flips_once_at_left_edge() {
        let mut b = bouncer((12.0, 300.0), (-100.0, 0.0));
        step_bounce(&mut b, 50.0);
        assert_eq!(b.velocity.x, 100.0);
        let after_flip = b.position().x;
        assert!(after_flip - 10.0 < 0.0);

        // still overlapping the edge, but now moving away: no re-flip
        step_bounce(&mut b, 50.0);
        assert_eq!(b.velocity.x, 100.0);
        assert!(b.position().x > after_flip);
    }

    #[test]
    fn test_bounce_axes_are_independent() {
        let mut b = bouncer((795.0, 300.0), (50.0, 30.0));
        step_bounce(&mut b, 16.0);
        assert_eq!(b.velocity, Vector2::new(-50.0, 30.0));

        let mut b = bouncer((400.0, 595.0), (50.0, 30.0));
        step_bounce(&mut b, 16.0);
        assert_eq!(b.velocity, Vector2::new(50.0, -30.0));
    }

    #[test]
    fn test_bounce_conserves_speed() {
        let mut b = bouncer((400.0, 300.0), (240.0, 160.0));
        for _ in 0..10_000 {
            step_bounce(&mut b, 16.0);
        }
        assert_eq!(b.velocity.x.abs(), 240.0);
        assert_eq!(b.velocity.y.abs(), 160.0);
        let p = b.position();
        assert!(p.x > -20.0 && p.x < 820.0 && p.y > -20.0 && p.y < 620.0);
    }

    #[test]
    fn test_spin_is_absolute_in_time() {
        let mut spin = Spin::new(Point2::origin(), -90.0);
        step_spin(&mut spin, 1000.0);
        assert_eq!(spin.angle, -90.0);
        step_spin(&mut spin, 2500.0);
        assert_eq!(spin.angle, -225.0);
        step_spin(&mut spin, 2500.0);
        assert_eq!(spin.angle, -225.0);
    }

    #[test]
    fn test_pulse_cycles_between_phases() {
        let mut pulse = Pulse::new(Point2::origin(), 4, Vector2::new(1.0, 1.0));
        let mut levels = Vec::new();
        let mut phases = Vec::new();
        for _ in 0..200 {
            step_pulse(&mut pulse, 16.0);
            levels.push(pulse.level());
            phases.push(pulse.phase);
        }

        for pair in levels.windows(2).zip(phases.windows(2)) {
            let (l, p) = pair;
            assert!(l[1] <= 4);
            if p[0] == Phase::Growing && p[1] == Phase::Growing {
                assert!(l[1] >= l[0]);
            }
            if p[0] == Phase::Shrinking && p[1] == Phase::Shrinking {
                assert!(l[1] <= l[0]);
            }
        }
        assert_eq!(&levels[..10], &[1, 2, 3, 4, 3, 2, 1, 0, 1, 2]);

        let flips = phases.windows(2).filter(|p| p[0] != p[1]).count();
        assert!(flips >= 40, "phase must keep alternating, saw {flips} flips");
    }

    #[test]
    fn test_pulse_factor_follows_level_and_wobble() {
        let mut pulse = Pulse::new(Point2::origin(), 2, Vector2::new(0.5, 2.0));
        step_pulse(&mut pulse, 16.0);
        assert!((pulse.factor - Vector2::new(1.25, 2.0)).norm() < 1e-12);

        let mut wobbly = Pulse::new(Point2::origin(), 2, Vector2::new(0.0, 0.0))
            .with_wobble(Vector2::new(0.1, 0.1), 0.5);
        step_pulse(&mut wobbly, 3.0);
        assert!((wobbly.factor.x - (1.0 + 0.1 * 1.5f64.sin())).abs() < 1e-12);
        assert!((wobbly.factor.y - (1.0 + 0.1 * 1.5f64.cos())).abs() < 1e-12);
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let mut pulse = Pulse::new(Point2::origin(), 0, Vector2::new(1.0, 1.0));
        assert_eq!(pulse.threshold, 1);
        for _ in 0..5 {
            step_pulse(&mut pulse, 16.0);
            assert!(pulse.factor.x.is_finite());
        }
    }

    #[test]
    fn test_combined_shape_scales_and_rotates_before_translating() -> Result<(), SceneError> {
        let pivot = Point2::new(10.0, 10.0);
        let mut shape = Shape::new("sq", scene::rect(0.0, 0.0, 20.0, 20.0), Rgba::BLACK)?
            .with_behavior(Behavior::Bounce(bouncer((10.0, 10.0), (1000.0, 0.0))))
            .with_behavior(Behavior::Spin(Spin::new(pivot, 90.0)))
            .with_behavior(Behavior::Pulse(Pulse::new(pivot, 1, Vector2::new(1.0, 1.0))));

        update_shape(&mut shape, FrameTime { time: 1000.0, delta: 100.0 });

        // corner (0, 0): doubled about the pivot -> (-10, -10), rotated 90 -> (30, -10),
        // then moved right by 100
        let corner = shape.transformed_vertices()[0];
        assert!((corner - vec3h(130.0, -10.0, 1.0)).norm() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_update_slide_leaves_inactive_shapes_alone() {
        let mut scene = Scene::demo(800.0, 600.0).unwrap();
        let before: Vec<_> = scene.shapes().iter().map(|s| *s.transform()).collect();

        update_slide(&mut scene, 1, FrameTime { time: 500.0, delta: 16.0 });

        let changed: Vec<_> = scene
            .shapes()
            .iter()
            .zip(&before)
            .map(|(s, b)| s.transform() != b)
            .collect();
        let active = scene.slide(1).unwrap().shapes().to_vec();
        for (i, c) in changed.into_iter().enumerate() {
            assert_eq!(c, active.contains(&i), "shape {i}");
        }
    }
}
