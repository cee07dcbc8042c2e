/// Frame loop driving an [`Engine`] from a host's scheduling primitives
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::NextFrame;
use crate::engine::Engine;
use crate::raster::RasterSurface;

/// The host's frame scheduling service
pub trait FrameHost {
    /// Wait for the next display refresh and return its timestamp in ms
    fn request_frame(&mut self) -> f64;

    /// One-shot delay before the next frame is requested
    fn set_timeout(&mut self, delay: Duration);
}

/// Cloneable handle that stops a running [`FrameLoop`]
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct FrameLoop {
    running: Arc<AtomicBool>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.running))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear a previous stop so the loop can be driven again
    pub fn resume(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Run frames until stopped.
    ///
    /// Each iteration requests a frame, updates and draws, hands the surface to
    /// `after_frame` (present, input), then waits out the frame-rate limit if
    /// one is set. The running flag is checked before every re-request.
    ///
    /// An error from `after_frame` ends the loop. Either way the loop is left
    /// stopped and the engine's clock reset.
    pub fn run<H, S, E, F>(
        &self,
        engine: &mut Engine,
        host: &mut H,
        surface: &mut S,
        mut after_frame: F,
    ) -> Result<u64, E>
    where
        H: FrameHost + ?Sized,
        S: RasterSurface + ?Sized,
        F: FnMut(&mut Engine, &mut S) -> Result<(), E>,
    {
        log::info!("frame loop started");
        let mut frames = 0u64;

        let result = loop {
            if !self.is_running() {
                break Ok(());
            }
            let timestamp = host.request_frame();
            engine.frame(timestamp, surface);
            frames += 1;
            if let Err(err) = after_frame(engine, surface) {
                break Err(err);
            }

            if !self.is_running() {
                break Ok(());
            }
            if let NextFrame::After(delay) = engine.next_request() {
                host.set_timeout(delay);
            }
        };

        self.running.store(false, Ordering::Release);
        engine.stop();
        match &result {
            Ok(()) => log::info!("frame loop stopped after {frames} frames"),
            Err(_) => log::info!("frame loop aborted after {frames} frames"),
        }
        result.map(|()| frames)
    }
}
