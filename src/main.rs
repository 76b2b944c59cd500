//! conpaint - draw in the terminal with the mouse
//!
//! # Quick Start
//!
//! ```text
//! conpaint                 # Paint on an 80x40 canvas
//! conpaint --snake         # Play snake instead
//! conpaint -W 120 -H 50    # Larger canvas
//! ```
//!
//! # Controls (paint)
//!
//! | Input | Action |
//! |-------|--------|
//! | Left drag | Paint with the selected colour |
//! | Right drag | Erase |
//! | Shift + drag | Line tool |
//! | Ctrl + drag | Rectangle tool |
//! | Left/Right | Select colour |
//! | Ctrl+Z | Undo |
//! | Space | Clear |
//! | Esc | Quit |

use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use conpaint::app::{self, App, Paint, Snake};
use conpaint::config::{self, Config, Palette};
use conpaint::ui::Console;

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line options; anything set here overrides config.toml
#[derive(Debug, Default)]
struct Args {
    snake: bool,
    width: Option<u16>,
    height: Option<u16>,
    depth: Option<usize>,
    palette: Option<String>,
    config: Option<PathBuf>,
}

fn print_version() {
    eprintln!("conpaint {}", VERSION);
}

fn print_help() {
    eprintln!("conpaint {} - Terminal drawing canvas", VERSION);
    eprintln!();
    eprintln!("Usage: conpaint [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --snake               Play snake instead of painting");
    eprintln!("  -W, --width <N>       Canvas width in cells");
    eprintln!("  -H, --height <N>      Canvas height in cells");
    eprintln!("  -d, --depth <N>       Undo history depth");
    eprintln!("  -p, --palette <NAME>  Colour palette");
    eprintln!("  -c, --config <PATH>   Read configuration from PATH");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Paint controls:");
    eprintln!("  Left drag             Paint with the selected colour");
    eprintln!("  Right drag            Erase");
    eprintln!("  Shift + drag          Line tool");
    eprintln!("  Ctrl + drag           Rectangle tool");
    eprintln!("  Left / Right          Select colour");
    eprintln!("  Ctrl+Z                Undo");
    eprintln!("  Space                 Clear the canvas");
    eprintln!("  Esc                   Quit");
    eprintln!();
    eprintln!("Snake controls: W A S D to steer, Esc to quit");
    eprintln!();
    eprintln!("Palettes: {}", Palette::list().join(", "));
    eprintln!("Configuration: ~/.conpaint/config.toml");
    eprintln!("Log file: ~/.conpaint/conpaint.log");
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("Missing value for {}", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--snake" => {
                parsed.snake = true;
            }
            "-W" | "--width" => {
                i += 1;
                parsed.width = Some(parse_number(flag, args.get(i))?);
            }
            "-H" | "--height" => {
                i += 1;
                parsed.height = Some(parse_number(flag, args.get(i))?);
            }
            "-d" | "--depth" => {
                i += 1;
                parsed.depth = Some(parse_number(flag, args.get(i))?);
            }
            "-p" | "--palette" => {
                i += 1;
                let name = args.get(i).ok_or("Missing palette name")?;
                parsed.palette = Some(name.clone());
            }
            "-c" | "--config" => {
                i += 1;
                let path = args.get(i).ok_or("Missing config path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Route tracing output to ~/.conpaint/conpaint.log; the terminal itself is
/// in raw mode while the app runs
fn init_logging(level: &str) {
    let log_path = config::data_dir()
        .map(|dir| dir.join("conpaint.log"))
        .unwrap_or_else(|| PathBuf::from("conpaint.log"));

    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(depth) = args.depth {
        config.history_depth = depth;
    }
    if let Some(palette) = args.palette {
        config.color_scheme = palette;
    }
    if args.snake && config.title == Config::default().title {
        config.title = "Snake".to_string();
    }

    init_logging(&config.log_level);
    info!("conpaint {} starting", VERSION);
    info!(?config, "configuration");

    let mut app: Box<dyn App> = if args.snake {
        Box::new(Snake::seeded_from_clock(config.width, config.height))
    } else {
        Box::new(
            Paint::new(config.width, config.height, config.history_depth, config.title.clone())
                .context("Failed to create canvas")?,
        )
    };

    let mut console = Console::open(&config).context("Failed to open terminal session")?;
    let result = app::run(&mut console, app.as_mut());

    // Restore the terminal before reporting anything
    if let Err(e) = console.close() {
        error!("Failed to close session: {}", e);
    }

    match result {
        Ok(()) => {
            info!("conpaint exiting");
            Ok(())
        }
        Err(e) => {
            error!("Main loop failed: {}", e);
            Err(e.into())
        }
    }
}
