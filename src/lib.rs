//! Detects "tilt" in annotated chess games: a traumatic blunder followed by a
//! burst of fast moves that make the position worse.
//!
//! Games are read from PGN (optionally zstd-compressed) with `[%eval]` and
//! `[%clk]` comments, as exported by Lichess. See [`tilt::analyze_game`].

pub mod annotation;
pub mod error;
pub mod game;
pub mod reader;
pub mod tilt;
pub mod types;
mod visitor;

pub use error::ReadError;
pub use game::{Game, MoveId, MoveNode};
pub use reader::{Compression, PgnGames, SourcedGame};
pub use tilt::{TiltConfig, TiltEvent, TiltMoveRecord, analyze_game, analyze_game_with};
pub use types::{GameHeaders, GameRecord};
pub use visitor::GameVisitor;
