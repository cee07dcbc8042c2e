/// Error types shared by the engine, scene and rasterizer
use thiserror::Error;

/// Rejected control-surface or construction input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("slide index {index} out of range (scene has {count} slides)")]
    InvalidSlide { index: usize, count: usize },

    #[error("frames per second must be positive, got {0}")]
    InvalidFps(u32),

    #[error("canvas size must be non-zero, got {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Invalid scene geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("a shape needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}

/// Geometry that cannot be rasterized
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("vertex {index} has homogeneous w = 0")]
    DegenerateVertex { index: usize },
}
