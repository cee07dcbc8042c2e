/// Frame scheduling on top of the monotonic clock and thread sleeps
use std::thread;
use std::time::{Duration, Instant};
use tw2d_core::FrameHost;

/// Emulated display refresh rate
pub const REFRESH_HZ: u32 = 60;

/// Hands out at most one frame per refresh interval
pub struct TerminalHost {
    epoch: Instant,
    refresh: Duration,
    next_refresh: Instant,
}

impl TerminalHost {
    pub fn new(refresh_hz: u32) -> Self {
        let now = Instant::now();
        Self {
            epoch: now,
            refresh: Duration::from_secs(1) / refresh_hz.max(1),
            next_refresh: now,
        }
    }
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new(REFRESH_HZ)
    }
}

impl FrameHost for TerminalHost {
    fn request_frame(&mut self) -> f64 {
        let now = Instant::now();
        if now < self.next_refresh {
            thread::sleep(self.next_refresh - now);
        }
        let frame = Instant::now();
        self.next_refresh = frame + self.refresh;
        (frame - self.epoch).as_secs_f64() * 1000.0
    }

    fn set_timeout(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}
