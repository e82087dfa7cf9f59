use shakmaty::Color;

use super::config::{ClockDelta, TiltConfig};
use super::event::{TiltMoveRecord, TiltSequence, round2};
use super::timeline::{Timeline, player_relative};
use crate::game::MoveId;

/// Why the look-ahead stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// The configured number of moves all qualified.
    Exhausted,
    EndOfGame,
    /// No clock difference available for the player's move.
    NoTimeSpent { ply: u32 },
    /// Evaluation missing before or after the player's move.
    NoEval { ply: u32 },
    NotFast { ply: u32, time_spent: i64 },
    Improving { ply: u32, eval_delta: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedSequence {
    pub moves: TiltSequence,
    /// Arena id of the last qualifying move.
    pub last: Option<MoveId>,
    pub stop: ScanStop,
}

/// Walk the blunderer's next moves (skipping each opponent reply) and keep
/// the leading run that is both fast and non-improving.
pub fn scan(
    timeline: &Timeline<'_>,
    blunder: MoveId,
    player: Color,
    speed_threshold: f64,
    config: &TiltConfig,
) -> ScannedSequence {
    let mut moves = TiltSequence::new();
    let mut last = None;
    let mut cursor = blunder;

    for _ in 0..config.max_sequence_moves {
        let Some(reply) = timeline.next(cursor) else {
            return ScannedSequence { moves, last, stop: ScanStop::EndOfGame };
        };
        let Some(own) = timeline.next(reply) else {
            return ScannedSequence { moves, last, stop: ScanStop::EndOfGame };
        };
        cursor = own;

        match qualify(timeline, reply, own, player, speed_threshold, config) {
            Ok(record) => {
                moves.push(record);
                last = Some(own);
            }
            Err(stop) => return ScannedSequence { moves, last, stop },
        }
    }

    ScannedSequence {
        moves,
        last,
        stop: ScanStop::Exhausted,
    }
}

fn qualify(
    timeline: &Timeline<'_>,
    reply: MoveId,
    own: MoveId,
    player: Color,
    speed_threshold: f64,
    config: &TiltConfig,
) -> Result<TiltMoveRecord, ScanStop> {
    let Some(node) = timeline.node(own) else {
        return Err(ScanStop::EndOfGame);
    };
    let ply = node.ply();

    let time_spent = timeline
        .time_spent(own, ClockDelta::SameSide)
        .ok_or(ScanStop::NoTimeSpent { ply })?;

    let secs = time_spent as f64;
    if !(secs < speed_threshold || secs < config.fast_floor_secs) {
        return Err(ScanStop::NotFast { ply, time_spent });
    }

    let (Some(eval), Some(before)) = (timeline.eval(own), timeline.eval(reply)) else {
        return Err(ScanStop::NoEval { ply });
    };
    let eval_delta = player_relative(eval, player).saturating_sub(player_relative(before, player));
    if eval_delta >= config.non_improving_below {
        return Err(ScanStop::Improving { ply, eval_delta });
    }

    Ok(TiltMoveRecord {
        move_san: node.san().to_string(),
        move_number: node.move_number(),
        ply,
        time_spent,
        eval,
        eval_delta,
        threshold_used: round2(speed_threshold),
    })
}
