/// TW2D Terminal Demo - Animated Slides
///
/// Plays the four demo slides in the terminal.
/// Controls:
///   - 0-3: Select slide
///   - F: Toggle frame-rate limiting
///   - +/-: Change target FPS
///   - Q/ESC: Quit

use std::fs::File;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tw2d_core::EngineConfig;
use tw2d_terminal::TerminalApp;

#[derive(Parser, Debug)]
#[command(name = "tw2d-terminal", version, about = "2D animation engine in the terminal")]
struct Args {
    /// Canvas width in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Target frames per second when limiting
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Limit the frame rate to --fps
    #[arg(long)]
    limit_fps: bool,

    /// Slide to start on
    #[arg(long, default_value_t = 0)]
    slide: usize,

    /// Write log records to this file. Without it, logs go to stderr only
    /// when stderr is not the terminal being drawn on.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Where log records go while the app owns the terminal
#[derive(Debug, PartialEq, Eq)]
enum LogSink {
    File(PathBuf),
    Stderr,
    Off,
}

impl LogSink {
    fn choose(log_file: Option<&Path>, stderr_is_tty: bool) -> Self {
        match log_file {
            Some(path) => LogSink::File(path.to_path_buf()),
            None if stderr_is_tty => LogSink::Off,
            None => LogSink::Stderr,
        }
    }
}

fn init_logging(sink: LogSink) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match sink {
        LogSink::File(path) => {
            let file = File::create(&path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        LogSink::Stderr => {}
        // records on stderr would be drawn over the frame
        LogSink::Off => return Ok(()),
    }
    builder.init();
    Ok(())
}

impl From<Args> for EngineConfig {
    fn from(args: Args) -> Self {
        Self {
            width: args.width,
            height: args.height,
            limit_fps: args.limit_fps,
            fps: args.fps,
            slide: args.slide,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LogSink::choose(args.log_file.as_deref(), std::io::stderr().is_terminal()))?;
    log::info!("Starting TW2D terminal renderer: {:?}", args);

    let mut app = TerminalApp::new(args.into())?;
    app.run()?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
