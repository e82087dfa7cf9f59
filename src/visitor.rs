use crate::error::ErrorAccumulator;
use crate::game::Game;
use crate::types::{GameHeaders, GameRecord};

use chrono::NaiveDate;
use pgn_reader::{Outcome, RawComment, RawTag, SanPlus, Skip, Visitor};
use std::mem;
use std::ops::ControlFlow;

/// Streaming PGN visitor (pgn-reader).
///
/// Builds the mainline of each game as a [`Game`] arena, attaching every
/// `{ ... }` comment to the ply it follows so the `[%eval]`/`[%clk]` tags stay
/// with their move. Variations are skipped.
pub struct GameVisitor {
    headers: HeaderFields,
    result_marker: Option<String>,
    parse_error: ErrorAccumulator,
    pub current_game: Option<GameRecord>,
}

#[derive(Default)]
struct HeaderFields {
    event: String,
    site: String,
    white: String,
    black: String,
    result: String,
    white_elo: String,
    black_elo: String,
    utc_date: String,
    date: String,
    time_control: String,
    termination: String,
}

impl HeaderFields {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn opt_take(field: &mut String) -> Option<String> {
        if field.is_empty() {
            None
        } else {
            Some(mem::take(field))
        }
    }

    fn set_known_tag(&mut self, key: &[u8], value: RawTag<'_>) {
        let slot: &mut String = match key {
            b"Event" => &mut self.event,
            b"Site" => &mut self.site,
            b"White" => &mut self.white,
            b"Black" => &mut self.black,
            b"Result" => &mut self.result,
            b"WhiteElo" => &mut self.white_elo,
            b"BlackElo" => &mut self.black_elo,
            b"UTCDate" => &mut self.utc_date,
            b"Date" => &mut self.date,
            b"TimeControl" => &mut self.time_control,
            b"Termination" => &mut self.termination,
            _ => return,
        };

        // First occurrence wins.
        if !slot.is_empty() {
            return;
        }

        let bytes = value.as_bytes();
        if bytes.is_empty() {
            return;
        }

        *slot = String::from_utf8_lossy(bytes).into_owned();
    }
}

impl Default for GameVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl GameVisitor {
    pub fn new() -> Self {
        Self {
            headers: HeaderFields::default(),
            result_marker: None,
            parse_error: ErrorAccumulator::default(),
            current_game: None,
        }
    }

    fn parse_uinteger_field(
        raw: &str,
        label: &str,
        parse_error: &mut ErrorAccumulator,
    ) -> Option<u32> {
        let s = raw.trim();
        if s.is_empty() || s == "?" || s == "-" {
            return None;
        }
        match s.parse::<u32>() {
            Ok(v) => Some(v),
            Err(_) => {
                parse_error.push(&format!("Conversion error: {label}='{s}'"));
                None
            }
        }
    }

    /// `YYYY.MM.DD` (or with `-`). Unknown year means unknown date; unknown
    /// month or day falls back to `01`.
    fn parse_date_field(
        raw: &str,
        label: &str,
        parse_error: &mut ErrorAccumulator,
    ) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        let norm = s.replace('.', "-");
        let parts: Vec<&str> = norm.split('-').collect();
        if parts.len() != 3 {
            parse_error.push(&format!("Conversion error: {label}='{s}'"));
            return None;
        }

        if parts[0].contains('?') {
            return None;
        }

        let or_first = |part: &str| (if part.contains('?') { "01" } else { part }).to_string();
        let candidate = format!(
            "{}-{}-{}",
            parts[0],
            or_first(parts[1]),
            or_first(parts[2])
        );

        match NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                parse_error.push(&format!("Conversion error: {label}='{s}' (chrono: {e})"));
                None
            }
        }
    }

    fn build_headers(&mut self) -> GameHeaders {
        let white_elo =
            Self::parse_uinteger_field(&self.headers.white_elo, "WhiteElo", &mut self.parse_error);
        let black_elo =
            Self::parse_uinteger_field(&self.headers.black_elo, "BlackElo", &mut self.parse_error);

        let utc_date = if !self.headers.utc_date.is_empty() {
            Self::parse_date_field(&self.headers.utc_date, "UTCDate", &mut self.parse_error)
        } else {
            Self::parse_date_field(&self.headers.date, "UTCDate (from Date)", &mut self.parse_error)
        };

        GameHeaders {
            event: HeaderFields::opt_take(&mut self.headers.event),
            site: HeaderFields::opt_take(&mut self.headers.site),
            white: HeaderFields::opt_take(&mut self.headers.white),
            black: HeaderFields::opt_take(&mut self.headers.black),
            result: HeaderFields::opt_take(&mut self.headers.result)
                .or_else(|| self.result_marker.take()),
            white_elo,
            black_elo,
            utc_date,
            time_control: HeaderFields::opt_take(&mut self.headers.time_control),
            termination: HeaderFields::opt_take(&mut self.headers.termination),
        }
    }

    fn finalize_game(&mut self, mut game: Game) {
        *game.headers_mut() = self.build_headers();
        self.current_game = Some(GameRecord {
            game,
            parse_error: self.parse_error.take(),
        });
    }

    /// Record a game the parser gave up on, keeping whatever headers were read.
    pub fn finalize_game_with_error(&mut self, error_msg: String) {
        self.parse_error.push(&error_msg);
        self.finalize_game(Game::default());
    }
}

impl Visitor for GameVisitor {
    type Tags = ();
    type Movetext = Game;
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.headers.clear();
        self.result_marker = None;
        self.parse_error = ErrorAccumulator::default();
        self.current_game = None;
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        self.headers.set_known_tag(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(Game::default())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, game: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        game.push_move(san.to_string(), None);
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        game: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        // Comments ahead of the first move belong to no ply.
        if let Some(last) = game.last() {
            let text = String::from_utf8_lossy(comment.as_bytes());
            game.append_comment(last, &text);
        }
        ControlFlow::Continue(())
    }

    fn outcome(&mut self, _: &mut Self::Movetext, outcome: Outcome) -> ControlFlow<Self::Output> {
        self.result_marker = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, game: Self::Movetext) -> Self::Output {
        self.finalize_game(game);
    }
}
