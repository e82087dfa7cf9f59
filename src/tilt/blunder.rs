//! Deciding whether a single move is a traumatic blunder, and the two
//! context rules that can still excuse it.

use shakmaty::Color;

use super::config::TiltConfig;
use super::timeline::{Timeline, player_relative};
use crate::game::MoveId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Loss below the blunder floor (or an improvement).
    NotABlunder,
    /// The position was already clearly lost before the move.
    AlreadyLost,
    /// The player is still clearly winning after the move.
    StillWinning,
    Traumatic,
}

/// Classify a before/after pair of player-relative evaluations.
pub fn classify(prev_eval: i32, curr_eval: i32, config: &TiltConfig) -> Verdict {
    let loss = i64::from(prev_eval) - i64::from(curr_eval);
    if loss < i64::from(config.blunder_min_loss) {
        return Verdict::NotABlunder;
    }
    if prev_eval < config.already_lost_below {
        return Verdict::AlreadyLost;
    }
    if curr_eval > config.still_winning_above {
        return Verdict::StillWinning;
    }
    Verdict::Traumatic
}

/// [`classify`] with the default thresholds, reduced to a yes/no.
pub fn is_traumatic(prev_eval: i32, curr_eval: i32) -> bool {
    classify(prev_eval, curr_eval, &TiltConfig::DEFAULT) == Verdict::Traumatic
}

/// Why an otherwise traumatic blunder was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    TimeTrouble { clock: u32 },
    /// The opponent's reply swung the eval back by `swing` centipawns.
    Cancelled { swing: i32 },
}

/// Apply the time-trouble rule, then the cancellation rule, to the blunder
/// at `id` (whose White-relative eval is `curr_eval`).
pub fn context_exemption(
    timeline: &Timeline<'_>,
    id: MoveId,
    curr_eval: i32,
    player: Color,
    config: &TiltConfig,
) -> Option<Exemption> {
    if let Some(clock) = timeline.clock(id)
        && clock < config.time_trouble_below_secs
    {
        return Some(Exemption::TimeTrouble { clock });
    }

    let reply = timeline.next(id)?;
    let reply_eval = timeline.eval(reply)?;
    let swing = player_relative(reply_eval, player)
        .saturating_sub(player_relative(curr_eval, player));
    (swing > config.cancellation_swing).then_some(Exemption::Cancelled { swing })
}
