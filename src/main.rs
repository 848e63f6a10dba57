//! vt100emu - run captured terminal output through a VT100 emulator
//!
//! Reads a file (or stdin), interprets its escape sequences, and prints the
//! result as plain text, as a size, or as a rendered screen.
//!
//! # Quick Start
//!
//! ```text
//! script -q out.log ls --color   # capture some output
//! vt100emu out.log               # text with control sequences removed
//! vt100emu -w out.log            # 42x7
//! vt100emu -s -c 100 out.log     # final screen on a 100x24 grid
//! hexdump -C out.log | vt100emu -x
//! ```

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vt100emu::config::Config as FileConfig;
use vt100emu::ui::Renderer;
use vt100emu::{display_width, hexdump, trim, CharDisplay, Emulator, GridDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Trim,
    Width,
    Screen,
}

/// Command line options
#[derive(Debug, Default)]
struct Options {
    mode: Mode,
    /// Input is a `hexdump -C` listing
    hex: bool,
    /// Write device responses to stdout (screen mode)
    answer: bool,
    cols: Option<u16>,
    rows: Option<u16>,
    /// Input file; stdin when unset
    file: Option<PathBuf>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("vt100emu {}", VERSION);
}

fn print_help() {
    eprintln!("vt100emu {} - VT100 terminal output interpreter", VERSION);
    eprintln!();
    eprintln!("Usage: vt100emu [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Output options:");
    eprintln!("  -t, --trim            Print text with control sequences removed (default)");
    eprintln!("  -w, --width           Print the size of the text as WIDTHxHEIGHT");
    eprintln!("  -s, --screen          Render the final screen with colors");
    eprintln!();
    eprintln!("Input options:");
    eprintln!("  -x, --hex             Input is a hexdump -C listing");
    eprintln!();
    eprintln!("Screen options:");
    eprintln!("  -c, --cols <N>        Screen width (default: from config or 80)");
    eprintln!("  -r, --rows <N>        Screen height (default: from config or 24)");
    eprintln!("  --answer              Write device responses to stdout");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.vt100emu/config.toml");
    eprintln!("Logging: RUST_LOG overrides the configured level");
}

fn parse_size(args: &[String], i: usize, name: &str) -> Result<u16, String> {
    let value = args
        .get(i)
        .ok_or_else(|| format!("Missing {} argument", name))?;
    match value.parse::<u16>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Invalid {}: {}", name, value)),
    }
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            // Output selection
            "-t" | "--trim" => {
                options.mode = Mode::Trim;
            }
            "-w" | "--width" => {
                options.mode = Mode::Width;
            }
            "-s" | "--screen" => {
                options.mode = Mode::Screen;
            }
            // Input
            "-x" | "--hex" => {
                options.hex = true;
            }
            // Screen
            "-c" | "--cols" => {
                i += 1;
                options.cols = Some(parse_size(&args, i, "cols")?);
            }
            "-r" | "--rows" => {
                i += 1;
                options.rows = Some(parse_size(&args, i, "rows")?);
            }
            "--answer" => {
                options.answer = true;
            }
            arg if arg.starts_with('-') && arg != "-" => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
            arg => {
                if options.file.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                if arg != "-" {
                    options.file = Some(PathBuf::from(arg));
                }
            }
        }
        i += 1;
    }

    Ok(options)
}

fn init_logging(config: &FileConfig) -> anyhow::Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level))
    };

    // An empty path means stderr
    let log_file = config
        .log
        .file
        .as_ref()
        .filter(|path| !path.as_os_str().is_empty());

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter())
            .with_writer(io::stderr)
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
    Ok(())
}

fn read_input(options: &Options) -> anyhow::Result<String> {
    let mut raw = Vec::new();
    match options.file {
        Some(ref path) => {
            raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        }
        None => {
            io::stdin()
                .read_to_end(&mut raw)
                .context("Failed to read stdin")?;
        }
    }

    if options.hex {
        let parsed = hexdump::parse(&String::from_utf8_lossy(&raw));
        raw = parsed;
        debug!("Parsed {} bytes from hex dump", raw.len());
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn run_screen(options: &Options, config: &FileConfig, data: &str) -> anyhow::Result<()> {
    let cols = options.cols.unwrap_or(config.screen.cols).max(1);
    let rows = options.rows.unwrap_or(config.screen.rows).max(1);
    let mut emulator = Emulator::new(GridDisplay::new(i32::from(cols), i32::from(rows)));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if options.answer {
        emulator
            .feed(data, &mut out)
            .context("Failed to write device response")?;
    } else {
        emulator.feed_str(data);
    }

    let size = emulator.display().size();
    info!("Rendering {} screen, cursor at {}", size, emulator.cursor());
    Renderer::new()
        .render(&mut out, emulator.display())
        .context("Failed to render screen")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let (config, config_error) = match FileConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (FileConfig::default(), Some(e)),
    };
    init_logging(&config)?;
    info!("vt100emu starting...");
    if let Some(e) = config_error {
        warn!("{}; using defaults", e);
    }

    let data = read_input(&options)?;
    debug!("Read {} characters of input", data.chars().count());

    match options.mode {
        Mode::Trim => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for line in trim(&data) {
                writeln!(out, "{}", line)?;
            }
            out.flush()?;
        }
        Mode::Width => {
            let (width, height) = display_width(&data);
            println!("{}x{}", width, height);
        }
        Mode::Screen => run_screen(&options, &config, &data)?,
    }

    Ok(())
}
