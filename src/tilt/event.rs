use serde::Serialize;
use smallvec::SmallVec;

/// Moves of one tilt sequence; never more than the configured maximum (3 by
/// default), so they stay inline.
pub type TiltSequence = SmallVec<[TiltMoveRecord; 3]>;

/// One fast, non-improving move played after a blunder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltMoveRecord {
    pub(crate) move_san: String,
    pub(crate) move_number: u32,
    pub(crate) ply: u32,
    pub(crate) time_spent: i64,
    pub(crate) eval: i32,
    pub(crate) eval_delta: i32,
    pub(crate) threshold_used: f64,
}

impl TiltMoveRecord {
    pub fn move_san(&self) -> &str {
        &self.move_san
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Seconds taken on the player's own clock.
    pub fn time_spent(&self) -> i64 {
        self.time_spent
    }

    /// Evaluation after the move, White-relative centipawns.
    pub fn eval(&self) -> i32 {
        self.eval
    }

    /// Player-relative change against the position the move was played in.
    pub fn eval_delta(&self) -> i32 {
        self.eval_delta
    }

    /// Speed threshold (seconds) the move was judged against.
    pub fn threshold_used(&self) -> f64 {
        self.threshold_used
    }
}

/// A confirmed tilt episode. Only built once every confirmation check passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltEvent {
    pub(crate) blunder_move: String,
    pub(crate) blunder_number: u32,
    pub(crate) blunder_ply: u32,
    pub(crate) blunder_eval_drop: i32,
    pub(crate) tilt_sequence: TiltSequence,
    pub(crate) avg_time_before_blunder: f64,
}

impl TiltEvent {
    pub fn blunder_move(&self) -> &str {
        &self.blunder_move
    }

    pub fn blunder_number(&self) -> u32 {
        self.blunder_number
    }

    pub fn blunder_ply(&self) -> u32 {
        self.blunder_ply
    }

    /// Player-relative eval change caused by the blunder (negative).
    pub fn blunder_eval_drop(&self) -> i32 {
        self.blunder_eval_drop
    }

    pub fn tilt_sequence(&self) -> &[TiltMoveRecord] {
        &self.tilt_sequence
    }

    pub fn avg_time_before_blunder(&self) -> f64 {
        self.avg_time_before_blunder
    }

    /// Last ply consumed by this episode.
    pub fn end_ply(&self) -> u32 {
        self.tilt_sequence
            .last()
            .map_or(self.blunder_ply, TiltMoveRecord::ply)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
