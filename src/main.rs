//! Bagtris: falling-block puzzle in the terminal.

mod app;
mod bag;
mod board;
mod game;
mod highscores;
mod input;
mod pieces;
mod repeat;
mod scoring;
mod snapshot;
mod theme;
mod timing;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use highscores::{FileStore, HighScore, HighScoreStore, MemoryStore};
use std::path::PathBuf;
use std::time::Duration;

/// Highest level accepted by `--initial-level`; gravity is at its floor well before this.
const MAX_INITIAL_LEVEL: i64 = 99;

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Seed for the first game; later games derive theirs from it.
    pub seed: u64,
    pub initial_level: u32,
    pub repeat_delay: Duration,
    pub repeat_interval: Duration,
    pub show_ghost: bool,
    pub frame_rate: f64,
    pub autostart: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("could not load theme: {e}, using defaults");
        let mut t = theme::Theme::default();
        t.apply_palette(args.palette);
        t
    });
    let high_score = HighScore::load(high_score_store(args.high_score_file.clone()));
    let config = GameConfig {
        seed: args.seed.unwrap_or_else(rand::random),
        initial_level: args.initial_level.max(1),
        repeat_delay: Duration::from_millis(args.repeat_delay_ms),
        repeat_interval: Duration::from_millis(args.repeat_interval_ms.max(1)),
        show_ghost: !args.no_ghost,
        frame_rate: args.frame_rate,
        autostart: args.autostart,
    };
    let mut app = App::new(config, theme, high_score);
    app.run()?;
    Ok(())
}

/// Logs go to a file; the terminal belongs to the game. Filter with `RUST_LOG` (default `info`).
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("initialising logger")?;
    Ok(())
}

/// File store at the override or the default config path; memory only when neither resolves.
fn high_score_store(path: Option<PathBuf>) -> Box<dyn HighScoreStore> {
    match path.map_or_else(highscores::default_path, Ok) {
        Ok(p) => {
            log::debug!("high score file: {}", p.display());
            Box::new(FileStore::new(p))
        }
        Err(e) => {
            log::warn!("{e}; high score will not persist");
            Box::new(MemoryStore::default())
        }
    }
}

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "bagtris",
    version,
    about = "Falling-block puzzle in the terminal: 7-bag randomizer, wall kicks, hold slot and ghost piece.",
    long_about = "Bagtris is a terminal falling-block puzzle on a 10x20 board.\n\n\
        Pieces come from a shuffled bag of all seven tetrominoes. Clear full rows for \
        100 points each; every 1000 points raises the level and speeds up gravity.\n\n\
        CONTROLS:\n  Left/Right  Move      Up / W / X  Rotate CW   Down       Soft drop\n  Space       Hard drop C           Hold        G          Ghost on/off\n  P           Pause     R / Enter   New game    Q / Esc    Quit\n\n\
        Hold a movement key to keep the piece moving. Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Seed for the piece randomizer (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Starting level (1-99); gravity starts at the matching speed.
    #[arg(
        long,
        default_value = "1",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..=MAX_INITIAL_LEVEL)
    )]
    pub initial_level: u32,

    /// Delay before a held movement key starts repeating (DAS), in ms.
    #[arg(long, default_value_t = repeat::DEFAULT_REPEAT_DELAY_MS, value_name = "MS")]
    pub repeat_delay_ms: u64,

    /// Time between repeated moves while a key is held (ARR), in ms.
    #[arg(long, default_value_t = repeat::DEFAULT_REPEAT_INTERVAL_MS, value_name = "MS")]
    pub repeat_interval_ms: u64,

    /// Start with the ghost piece hidden (toggle in game with G).
    #[arg(long)]
    pub no_ghost: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Where to keep the best score. Defaults to $XDG_CONFIG_HOME/bagtris/highscore.
    #[arg(long, value_name = "FILE")]
    pub high_score_file: Option<PathBuf>,

    /// Write logs to this file (level via RUST_LOG). No logging if not set.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Skip the ready screen and start playing immediately.
    #[arg(long)]
    pub autostart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
