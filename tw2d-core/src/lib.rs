/// TW2D Core Library - 2D animation engine
///
/// Homogeneous transform algebra, time-driven shape updates and a convex
/// polygon rasterizer. Hosts provide the raster surface and frame scheduling.

pub mod canvas;
pub mod clock;
pub mod engine;
pub mod error;
pub mod math;
pub mod raster;
pub mod scene;
pub mod schedule;
pub mod transform;
pub mod update;

// Re-export commonly used types
pub use canvas::Canvas;
pub use clock::{AnimationClock, FrameTime, NextFrame};
pub use engine::{Engine, EngineConfig};
pub use error::{ConfigError, RasterError, SceneError};
pub use math::{Mat3, Vec3h};
pub use raster::{draw_convex_polygon, RasterSurface, Rgba};
pub use scene::{Behavior, Bounce, Bounds, Phase, Pulse, Scene, Shape, Slide, Spin};
pub use schedule::{FrameHost, FrameLoop, StopHandle};
pub use transform::Chain;
