/// Engine context: scene, clock and active slide behind one control surface
use crate::clock::{AnimationClock, FrameTime, NextFrame};
use crate::error::ConfigError;
use crate::raster::{self, RasterSurface};
use crate::scene::Scene;
use crate::update;

/// Construction-time settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub limit_fps: bool,
    pub fps: u32,
    pub slide: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            limit_fps: false,
            fps: 30,
            slide: 0,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    scene: Scene,
    clock: AnimationClock,
    slide: usize,
}

impl Engine {
    /// Engine on the demo scene
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        if config.width == 0 || config.height == 0 {
            return Err(ConfigError::InvalidCanvas {
                width: config.width,
                height: config.height,
            });
        }
        let scene = Scene::demo(f64::from(config.width), f64::from(config.height))?;
        Self::with_scene(config, scene)
    }

    pub fn with_scene(config: EngineConfig, scene: Scene) -> Result<Self, ConfigError> {
        let clock = AnimationClock::new(config.limit_fps, config.fps)?;
        let count = scene.slide_count();
        if config.slide >= count && count > 0 {
            return Err(ConfigError::InvalidSlide {
                index: config.slide,
                count,
            });
        }
        log::info!(
            "engine created: {}x{}, {} slides, {} shapes, limit_fps={} fps={}",
            config.width,
            config.height,
            count,
            scene.shapes().len(),
            config.limit_fps,
            config.fps
        );
        Ok(Self {
            slide: config.slide,
            config,
            scene,
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn slide_index(&self) -> usize {
        self.slide
    }

    /// Select the slide to update and draw; out-of-range indices are rejected
    pub fn set_slide_index(&mut self, index: usize) -> Result<(), ConfigError> {
        let count = self.scene.slide_count();
        if index >= count {
            log::warn!("ignoring slide index {index}, scene has {count} slides");
            return Err(ConfigError::InvalidSlide { index, count });
        }
        log::debug!("active slide {} -> {}", self.slide, index);
        self.slide = index;
        Ok(())
    }

    pub fn limit_fps(&mut self, flag: bool) {
        log::debug!("frame rate limiting {}", if flag { "on" } else { "off" });
        self.clock.set_limit_fps(flag);
    }

    pub fn set_fps(&mut self, fps: u32) -> Result<(), ConfigError> {
        self.clock.set_fps(fps).inspect_err(|_| {
            log::warn!("ignoring fps {fps}, keeping {}", self.clock.fps());
        })?;
        log::debug!("target fps {fps}");
        Ok(())
    }

    /// One update pass and one draw pass for `timestamp` (ms)
    pub fn frame<S: RasterSurface + ?Sized>(
        &mut self,
        timestamp: f64,
        surface: &mut S,
    ) -> FrameTime {
        let ft = self.clock.tick(timestamp);
        update::update_slide(&mut self.scene, self.slide, ft);
        self.draw(surface);
        ft
    }

    /// Clear the surface and draw the active slide. Shapes that cannot be
    /// rasterized are skipped for this frame.
    pub fn draw<S: RasterSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        for shape in self.scene.active_shapes(self.slide) {
            let vertices = shape.transformed_vertices();
            if let Err(err) = raster::draw_convex_polygon(surface, &vertices, shape.color) {
                log::warn!("skipping {}: {err}", shape.name);
            }
        }
    }

    pub fn next_request(&self) -> NextFrame {
        self.clock.next_request()
    }

    /// Tear down the clock; the next frame starts a fresh epoch
    pub fn stop(&mut self) {
        log::info!("engine stopped at t = {:.1} ms", self.clock.current().time);
        self.clock.reset();
    }
}
