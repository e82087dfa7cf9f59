use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use chess_tilt::reader::{Compression, PgnGames, SourcedGame};
use chess_tilt::tilt::{TiltConfig, TiltEvent, analyze_game_with};
use chess_tilt::types::Winner;
use clap::{Parser, ValueEnum};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;
use shakmaty::Color;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TILT_LOG";

/// Scan PGN games for tilt: a blunder followed by fast moves that make it worse.
#[derive(Debug, Clone, Parser)]
#[command(name = "tilt-scan", author, version, about, long_about = None)]
struct ScanArg {
    /// PGN file or glob pattern (quote it so the shell does not expand it)
    input: String,

    /// Which side's play to analyse
    #[arg(long, value_enum, default_value_t = SideArg::Both)]
    color: SideArg,

    /// Force decompression; by default `.zst` files are read as zstd
    #[arg(long, value_parser = Compression::parse)]
    compression: Option<Compression>,

    /// JSON file overriding detection thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also print games without tilt events
    #[arg(long)]
    all: bool,

    /// Games analysed per parallel batch
    #[arg(long, default_value_t = 256)]
    batch_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SideArg {
    White,
    Black,
    Both,
}

impl SideArg {
    fn colors(self) -> &'static [Color] {
        match self {
            SideArg::White => &[Color::White],
            SideArg::Black => &[Color::Black],
            SideArg::Both => &[Color::White, Color::Black],
        }
    }
}

#[derive(Debug, Serialize)]
struct GameReport<'a> {
    source: String,
    game_index: usize,
    game_id: Option<&'a str>,
    event: Option<&'a str>,
    site: Option<&'a str>,
    white: Option<&'a str>,
    black: Option<&'a str>,
    white_elo: Option<u32>,
    black_elo: Option<u32>,
    utc_date: Option<String>,
    time_control: Option<&'a str>,
    termination: Option<&'a str>,
    result: Option<&'a str>,
    winner: Option<Winner>,
    color: &'static str,
    player_elo: Option<u32>,
    has_lost: Option<bool>,
    parse_error: Option<&'a str>,
    events: Vec<EventReport>,
}

#[derive(Debug, Serialize)]
struct EventReport {
    #[serde(flatten)]
    event: TiltEvent,
    /// Full moves played after the blunder until the game ended.
    moves_survived: u32,
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn report_lines(
    game: &SourcedGame,
    colors: &[Color],
    config: &TiltConfig,
    all: bool,
) -> anyhow::Result<Vec<String>> {
    let headers = game.record.game.headers();
    let total_moves = u32::try_from(game.record.game.len() / 2).unwrap_or(u32::MAX);
    let mut lines = Vec::new();

    for &color in colors {
        let events = analyze_game_with(&game.record.game, color, config);
        if events.is_empty() && !all {
            continue;
        }
        let events = events
            .into_iter()
            .map(|event| EventReport {
                moves_survived: total_moves.saturating_sub(event.blunder_number()),
                event,
            })
            .collect();

        let report = GameReport {
            source: game.source.display().to_string(),
            game_index: game.game_index,
            game_id: headers.game_id(),
            event: headers.event.as_deref(),
            site: headers.site.as_deref(),
            white: headers.white.as_deref(),
            black: headers.black.as_deref(),
            white_elo: headers.white_elo,
            black_elo: headers.black_elo,
            utc_date: headers.utc_date.map(|date| date.to_string()),
            time_control: headers.time_control.as_deref(),
            termination: headers.termination.as_deref(),
            result: headers.result.as_deref(),
            winner: headers.winner(),
            color: color_name(color),
            player_elo: headers.elo(color),
            has_lost: headers.has_lost(color),
            parse_error: game.record.parse_error.as_deref(),
            events,
        };
        lines.push(serde_json::to_string(&report)?);
    }
    Ok(lines)
}

fn analyse_batch(
    batch: &[SourcedGame],
    colors: &[Color],
    config: &TiltConfig,
    all: bool,
) -> anyhow::Result<Vec<Vec<String>>> {
    #[cfg(feature = "rayon")]
    let games = batch.par_iter();
    #[cfg(not(feature = "rayon"))]
    let games = batch.iter();

    games
        .map(|game| report_lines(game, colors, config, all))
        .collect()
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TiltConfig> {
    let Some(path) = path else {
        return Ok(TiltConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    TiltConfig::from_json(&json)
        .with_context(|| format!("invalid config file {}", path.display()))
}

fn run(arg: &ScanArg) -> anyhow::Result<()> {
    let config = load_config(arg.config.as_ref())?;
    let colors = arg.color.colors();
    let batch_size = arg.batch_size.max(1);

    let mut games = PgnGames::open(&arg.input, arg.compression)?;
    info!(files = games.paths().len(), "scanning");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut batch = Vec::with_capacity(batch_size);
    let mut total_games = 0;
    let mut reported = 0;

    loop {
        batch.clear();
        batch.extend(games.by_ref().take(batch_size));
        if batch.is_empty() {
            break;
        }
        total_games += batch.len();

        for lines in analyse_batch(&batch, colors, &config, arg.all)? {
            reported += lines.len();
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
    }
    out.flush()?;

    info!(games = total_games, reports = reported, "scan complete");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    run(&ScanArg::parse())
}
