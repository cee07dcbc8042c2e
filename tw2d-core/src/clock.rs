/// Frame timing and next-frame scheduling decisions
use std::time::Duration;

use crate::error::ConfigError;

/// Elapsed time since the first frame and time since the previous one, in ms
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub time: f64,
    pub delta: f64,
}

/// How the next frame should be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextFrame {
    Immediate,
    After(Duration),
}

#[derive(Debug, Clone)]
pub struct AnimationClock {
    start: Option<f64>,
    previous: Option<f64>,
    current: FrameTime,
    limit_fps: bool,
    fps: u32,
}

impl AnimationClock {
    pub fn new(limit_fps: bool, fps: u32) -> Result<Self, ConfigError> {
        if fps == 0 {
            return Err(ConfigError::InvalidFps(fps));
        }
        Ok(Self {
            start: None,
            previous: None,
            current: FrameTime::default(),
            limit_fps,
            fps,
        })
    }

    /// Advance to `timestamp` (ms, host clock).
    ///
    /// The first timestamp seen becomes the epoch. Time never runs backwards:
    /// an earlier or non-finite timestamp yields a zero delta.
    pub fn tick(&mut self, timestamp: f64) -> FrameTime {
        if !timestamp.is_finite() {
            log::warn!("ignoring non-finite frame timestamp {timestamp}");
            self.current.delta = 0.0;
            return self.current;
        }

        let start = *self.start.get_or_insert(timestamp);
        let previous = self.previous.unwrap_or(timestamp);

        let time = (timestamp - start).max(self.current.time);
        let delta = (timestamp - previous).max(0.0);
        self.current = FrameTime { time, delta };
        self.previous = Some(timestamp.max(previous));

        log::trace!("frame t = {:.1} ms, dt = {:.1} ms", time, delta);
        self.current
    }

    pub fn current(&self) -> FrameTime {
        self.current
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn limit_fps(&self) -> bool {
        self.limit_fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_limit_fps(&mut self, flag: bool) {
        self.limit_fps = flag;
    }

    /// Rejects 0 and keeps the previous rate
    pub fn set_fps(&mut self, fps: u32) -> Result<(), ConfigError> {
        if fps == 0 {
            return Err(ConfigError::InvalidFps(fps));
        }
        self.fps = fps;
        Ok(())
    }

    /// Immediately, or after `floor(1000 / fps)` ms when limiting
    pub fn next_request(&self) -> NextFrame {
        if self.limit_fps {
            NextFrame::After(Duration::from_millis(u64::from(1000 / self.fps)))
        } else {
            NextFrame::Immediate
        }
    }

    /// Forget the epoch; the next tick starts a new run
    pub fn reset(&mut self) {
        self.start = None;
        self.previous = None;
        self.current = FrameTime::default();
    }
}
