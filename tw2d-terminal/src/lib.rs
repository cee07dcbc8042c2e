/// Terminal host for the 2D animation engine
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};
use tw2d_core::{Canvas, Engine, EngineConfig, FrameLoop, StopHandle};

pub mod host;
pub mod renderer;

pub use host::TerminalHost;
pub use renderer::TerminalRenderer;

/// What a key press asks the engine to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Slide(usize),
    ToggleLimit,
    FasterFps,
    SlowerFps,
    Quit,
}

impl Command {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('f') => Some(Command::ToggleLimit),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(Command::FasterFps),
            KeyCode::Char('-') | KeyCode::Down => Some(Command::SlowerFps),
            KeyCode::Char(c) => c.to_digit(10).map(|d| Command::Slide(d as usize)),
            _ => None,
        }
    }

    /// Apply to the engine. Rejected values leave the engine as it was.
    pub fn apply(self, engine: &mut Engine, stop: &StopHandle) {
        match self {
            Command::Slide(idx) => {
                let _ = engine.set_slide_index(idx);
            }
            Command::ToggleLimit => {
                let flag = !engine.clock().limit_fps();
                engine.limit_fps(flag);
            }
            Command::FasterFps => {
                let _ = engine.set_fps(engine.clock().fps().saturating_add(5));
            }
            Command::SlowerFps => {
                let _ = engine.set_fps(engine.clock().fps().saturating_sub(5).max(1));
            }
            Command::Quit => stop.stop(),
        }
    }
}

/// Main application struct for terminal 2D rendering
pub struct TerminalApp {
    engine: Engine,
    canvas: Canvas,
    renderer: TerminalRenderer,
    frame_loop: FrameLoop,
}

impl TerminalApp {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        let canvas = Canvas::new(config.width, config.height);
        let engine = Engine::new(config)?;

        Ok(Self {
            engine,
            canvas,
            renderer: TerminalRenderer::new(cols as usize, rows as usize),
            frame_loop: FrameLoop::new(),
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.frame_loop.stop_handle()
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let mut host = TerminalHost::default();
        let stop = self.frame_loop.stop_handle();
        let renderer = &mut self.renderer;
        let mut meter = FpsMeter::new();

        self.frame_loop
            .run(&mut self.engine, &mut host, &mut self.canvas, |engine, canvas| {
                meter.frame();
                present(renderer, engine, canvas, meter.fps)?;
                handle_input(engine, &stop)
            })?;
        Ok(())
    }
}

const KEY_HELP: &str = "Keys: 0-3=Slide F=Limit +/-=FPS Q=Quit";

fn present(
    renderer: &mut TerminalRenderer,
    engine: &Engine,
    canvas: &Canvas,
    fps: f32,
) -> Result<()> {
    renderer.render(canvas);

    let mut stdout = stdout();
    renderer.draw(&mut stdout)?;

    // Draw UI overlay
    let slide = engine.slide_index();
    let title = engine.scene().slide(slide).map(|s| s.title.as_str()).unwrap_or("");
    let limit = if engine.clock().limit_fps() {
        format!("on ({} fps)", engine.clock().fps())
    } else {
        "off".to_string()
    };
    queue!(
        stdout,
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Yellow),
        Print(format!(
            "TW2D Terminal | Slide {slide}: {title} | FPS: {fps:.1} | Limit: {limit} | {KEY_HELP}"
        )),
        ResetColor
    )?;

    stdout.flush()?;
    Ok(())
}

fn handle_input(engine: &mut Engine, stop: &StopHandle) -> Result<()> {
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind == KeyEventKind::Release {
                continue;
            }
            if let Some(command) = Command::from_key(code) {
                log::debug!("key {code:?} -> {command:?}");
                command.apply(engine, stop);
            }
        }
    }
    Ok(())
}

/// Frames per second measured over one-second windows
struct FpsMeter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsMeter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn frame(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        if (now - self.last).as_secs() >= 1 {
            self.fps = self.frames as f32 / (now - self.last).as_secs_f32();
            self.frames = 0;
            self.last = now;
        }
    }
}
