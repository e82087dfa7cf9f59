use serde::{Deserialize, Serialize};

/// Which earlier clock reading a ply's time spent is measured against when
/// feeding the rolling speed average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockDelta {
    /// Clock of the ply just before (the opponent's move).
    #[default]
    PreviousPly,
    /// Clock of the mover's own previous move.
    SameSide,
}

/// Thresholds for tilt detection. Centipawn values are player-relative.
///
/// `Default` reproduces the reference heuristics; deserialising a partial
/// document keeps the default for every field left out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TiltConfig {
    /// Full-move number from which speed is sampled and blunders are judged.
    pub warmup_move: u32,
    /// Minimum eval loss for a traumatic blunder.
    pub blunder_min_loss: i32,
    /// Before-eval below this means the game was already lost.
    pub already_lost_below: i32,
    /// After-eval above this means the player is still winning.
    pub still_winning_above: i32,
    /// Own clock (seconds) below this at the blunder exempts it.
    pub time_trouble_below_secs: u32,
    /// Opponent swing back above this cancels the blunder.
    pub cancellation_swing: i32,
    /// Fraction of the rolling average that counts as fast.
    pub speed_ratio: f64,
    /// Moves faster than this are fast regardless of the average.
    pub fast_floor_secs: f64,
    /// A scanned move whose eval delta is below this is non-improving.
    pub non_improving_below: i32,
    pub max_sequence_moves: usize,
    pub min_sequence_moves: usize,
    /// At least one sequence move must have a delta below this.
    pub slip_below: i32,
    /// Sequence end versus pre-blunder eval must be below this.
    pub net_drop_below: i32,
    /// Average move time assumed before any sample exists.
    pub default_avg_move_secs: f64,
    pub clock_delta: ClockDelta,
}

impl TiltConfig {
    pub const DEFAULT: Self = Self {
        warmup_move: 12,
        blunder_min_loss: 200,
        already_lost_below: -300,
        still_winning_above: 400,
        time_trouble_below_secs: 10,
        cancellation_swing: 200,
        speed_ratio: 0.5,
        fast_floor_secs: 2.0,
        non_improving_below: 50,
        max_sequence_moves: 3,
        min_sequence_moves: 2,
        slip_below: -100,
        net_drop_below: -300,
        default_avg_move_secs: 10.0,
        clock_delta: ClockDelta::PreviousPly,
    };

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
