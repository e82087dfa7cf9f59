use chrono::NaiveDate;
use serde::Serialize;
use shakmaty::Color;

use crate::game::Game;

/// Header tags the tilt report cares about, as read from the PGN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeaders {
    pub event: Option<String>,
    pub site: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub utc_date: Option<NaiveDate>,
    pub time_control: Option<String>,
    pub termination: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl GameHeaders {
    /// Last path segment of `Site` (the Lichess game id).
    pub fn game_id(&self) -> Option<&str> {
        let site = self.site.as_deref()?.trim_end_matches('/');
        site.rsplit('/').next().filter(|id| !id.is_empty())
    }

    pub fn elo(&self, color: Color) -> Option<u32> {
        match color {
            Color::White => self.white_elo,
            Color::Black => self.black_elo,
        }
    }

    /// `None` for an unfinished or unknown result (`*`).
    pub fn winner(&self) -> Option<Winner> {
        match self.result.as_deref()?.trim() {
            "1-0" => Some(Winner::White),
            "0-1" => Some(Winner::Black),
            "1/2-1/2" => Some(Winner::Draw),
            _ => None,
        }
    }

    /// Whether `color` lost the game, when the result is known.
    pub fn has_lost(&self, color: Color) -> Option<bool> {
        let lost = match self.winner()? {
            Winner::White => color == Color::Black,
            Winner::Black => color == Color::White,
            Winner::Draw => false,
        };
        Some(lost)
    }
}

/// A parsed game plus whatever went wrong while reading it.
#[derive(Debug, Clone, Default)]
pub struct GameRecord {
    pub game: Game,
    /// `None` for cleanly parsed games, otherwise `"; "`-joined diagnostics.
    pub parse_error: Option<String>,
}
