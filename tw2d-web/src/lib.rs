/// TW2D Web - browser canvas host for the 2D animation engine
///
/// Draws through `CanvasRenderingContext2d` and schedules frames with
/// `requestAnimationFrame`, preceded by `setTimeout` when the frame rate is
/// limited. Log records go to the browser console.

use std::cell::RefCell;
use std::rc::Rc;

use tw2d_core::{Engine, EngineConfig, FrameLoop, NextFrame, RasterSurface, Rgba, StopHandle};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// [`RasterSurface`] backed by a 2D canvas context
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: u32, height: u32) -> Self {
        Self { ctx, width, height }
    }
}

impl RasterSurface for CanvasSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }
}

struct State {
    engine: Engine,
    surface: CanvasSurface,
    /// A frame or timeout callback is queued with the browser
    pending: bool,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Route `log` records to the browser console. A logger the embedding page
/// already installed is left in place.
fn init_logging() {
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("logger already installed");
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    init_logging();
}

/// Queue the frame callback, now or after `delay`
fn schedule(
    state: &Rc<RefCell<State>>,
    callback: &FrameCallback,
    next: NextFrame,
) -> Result<(), JsValue> {
    let window = window()?;
    match next {
        NextFrame::Immediate => {
            let slot = callback.borrow();
            if let Some(closure) = slot.as_ref() {
                window.request_animation_frame(closure.as_ref().unchecked_ref())?;
                state.borrow_mut().pending = true;
            }
        }
        NextFrame::After(delay) => {
            let (state_cb, callback_cb) = (Rc::clone(state), Rc::clone(callback));
            let timeout = Closure::once_into_js(move || {
                if let Err(err) = schedule(&state_cb, &callback_cb, NextFrame::Immediate) {
                    log::warn!("could not request animation frame: {err:?}");
                    state_cb.borrow_mut().pending = false;
                }
            });
            let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
            window.set_timeout_with_callback_and_timeout_and_arguments_0(
                timeout.unchecked_ref(),
                millis,
            )?;
            state.borrow_mut().pending = true;
        }
    }
    Ok(())
}

#[wasm_bindgen]
pub struct WebRenderer {
    state: Rc<RefCell<State>>,
    callback: FrameCallback,
    frame_loop: FrameLoop,
}

#[wasm_bindgen]
impl WebRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        width: u32,
        height: u32,
        limit_fps: bool,
        fps: u32,
    ) -> Result<WebRenderer, JsValue> {
        let document = window()?
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {canvas_id:?}")))?
            .dyn_into()?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let config = EngineConfig {
            width,
            height,
            limit_fps,
            fps,
            ..EngineConfig::default()
        };
        let engine = Engine::new(config).map_err(to_js)?;

        let frame_loop = FrameLoop::new();
        frame_loop.stop_handle().stop();

        Ok(WebRenderer {
            state: Rc::new(RefCell::new(State {
                engine,
                surface: CanvasSurface::new(ctx, width, height),
                pending: false,
            })),
            callback: Rc::new(RefCell::new(None)),
            frame_loop,
        })
    }

    #[wasm_bindgen(js_name = limitFps)]
    pub fn limit_fps(&self, flag: bool) {
        self.state.borrow_mut().engine.limit_fps(flag);
    }

    /// Returns false when `n` is rejected
    #[wasm_bindgen(js_name = setFps)]
    pub fn set_fps(&self, n: u32) -> bool {
        self.state.borrow_mut().engine.set_fps(n).is_ok()
    }

    /// Returns false when `idx` is out of range
    #[wasm_bindgen(js_name = setSlideIndex)]
    pub fn set_slide_index(&self, idx: usize) -> bool {
        self.state.borrow_mut().engine.set_slide_index(idx).is_ok()
    }

    /// Update and draw a single frame without scheduling another
    pub fn frame(&self, timestamp: f64) {
        let mut guard = self.state.borrow_mut();
        let State { engine, surface, .. } = &mut *guard;
        engine.frame(timestamp, surface);
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.frame_loop.is_running() {
            return Ok(());
        }
        self.frame_loop.resume();

        if self.callback.borrow().is_none() {
            let running: StopHandle = self.frame_loop.stop_handle();
            let state = Rc::clone(&self.state);
            let callback = Rc::clone(&self.callback);
            let closure: Closure<dyn FnMut(f64)> = Closure::new(move |timestamp: f64| {
                let next = {
                    let mut guard = state.borrow_mut();
                    guard.pending = false;
                    if !running.is_running() {
                        return;
                    }
                    let State { engine, surface, .. } = &mut *guard;
                    engine.frame(timestamp, surface);
                    engine.next_request()
                };
                if !running.is_running() {
                    return;
                }
                if let Err(err) = schedule(&state, &callback, next) {
                    log::warn!("frame loop halted: {err:?}");
                    running.stop();
                }
            });
            *self.callback.borrow_mut() = Some(closure);
        }

        // A callback still queued from before the last stop picks the loop back up
        if self.state.borrow().pending {
            return Ok(());
        }
        log::info!("frame loop started");
        schedule(&self.state, &self.callback, NextFrame::Immediate)
    }

    pub fn stop(&mut self) {
        if !self.frame_loop.is_running() {
            return;
        }
        self.frame_loop.stop_handle().stop();
        self.state.borrow_mut().engine.stop();
        log::info!("frame loop stopped");
    }
}
