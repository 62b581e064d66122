use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::Level;

mod app;
mod blessings;
mod config;
mod error;
mod fireworks;
mod motion;
mod prompt;
mod random;
mod scheduler;
mod surface;
mod views;

use config::{Config, StartView};
use error::Result;

/// Fireworks in your terminal, then a few kind words.
///
/// Keys: `m` toggles reduced motion, `y`/`o` answer the prompt,
/// `n` next blessing, `b` back to the fireworks, `q`/Esc/Ctrl+C quit.
#[derive(Parser, Debug)]
#[command(name = "blessfire", version)]
struct Cli {
    /// View to open first.
    #[arg(value_enum, default_value_t = StartView::Fireworks)]
    view: StartView,

    /// Background color as hex (e.g. --bg-color 1a1b26).
    #[arg(long, value_name = "RRGGBB", value_parser = config::parse_hex_color)]
    bg_color: Option<surface::Rgb>,

    /// Start with reduced motion (also set by the REDUCE_MOTION variable).
    #[arg(long)]
    reduced_motion: bool,

    /// File holding the motion preference ("reduce" or anything else),
    /// re-read while running.
    #[arg(long, value_name = "PATH")]
    motion_file: Option<PathBuf>,

    /// Disable the `m` key toggle.
    #[arg(long)]
    no_motion_toggle: bool,

    /// Never show the prompt.
    #[arg(long)]
    no_prompt: bool,

    /// TOML file with [[blessing]] tables (message, relation).
    #[arg(long, value_name = "FILE")]
    blessings: Option<PathBuf>,

    /// Seed for the random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file. The terminal itself is never logged to.
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// More log detail (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let blessings = match &self.blessings {
            Some(path) => blessings::load(path)?,
            None => blessings::builtin(),
        };
        Ok(Config {
            start: self.view,
            background: self.bg_color,
            reduced_motion: self.reduced_motion,
            motion_file: self.motion_file,
            motion_toggle: !self.no_motion_toggle,
            prompt: !self.no_prompt,
            blessings,
            seed: self.seed,
        })
    }
}

fn init_logging(path: Option<&Path>, verbose: u8) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let file = File::create(path).map_err(|source| error::Error::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_logging(cli.log.as_deref(), cli.verbose)
        .and_then(|()| cli.into_config())
        .and_then(|config| app::run(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "exiting");
            eprintln!("blessfire: {err}");
            ExitCode::FAILURE
        }
    }
}
