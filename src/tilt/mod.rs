//! Tilt detection: a traumatic blunder followed by a burst of fast moves
//! that make things worse.
//!
//! [`analyze_game`] walks the mainline once. Every ply feeds the mover's
//! rolling speed average (from the warm-up move on). Each of the analysed
//! player's evaluated moves is checked by the blunder classifier, then by the
//! time-trouble and cancellation filters. A surviving blunder triggers a
//! look-ahead over the player's next moves; if that run is long enough,
//! contains a clear slip and leaves the player well below the pre-blunder
//! evaluation, an event is emitted and the walk resumes after the run.
//! Otherwise the walk resumes right after the blunder.

mod blunder;
mod config;
mod confirm;
mod event;
mod scanner;
mod speed;
mod timeline;

pub use blunder::{Exemption, Verdict, classify, context_exemption, is_traumatic};
pub use config::{ClockDelta, TiltConfig};
pub use confirm::{BlunderCandidate, Rejection, confirm};
pub use event::{TiltEvent, TiltMoveRecord, TiltSequence};
pub use scanner::{ScanStop, ScannedSequence, scan};
pub use speed::{RollingSpeed, SpeedTracker};
pub use timeline::{Timeline, player_relative};

use shakmaty::Color;
use tracing::debug;

use crate::game::Game;

/// Tilt events for `player` under the default thresholds.
pub fn analyze_game(game: &Game, player: Color) -> Vec<TiltEvent> {
    analyze_game_with(game, player, &TiltConfig::DEFAULT)
}

/// Tilt events for `player`, in game order and non-overlapping.
pub fn analyze_game_with(game: &Game, player: Color, config: &TiltConfig) -> Vec<TiltEvent> {
    let timeline = Timeline::new(game);
    let mut speed = SpeedTracker::default();
    let mut last_eval = 0;
    let mut events = Vec::new();

    let mut id = 0;
    while let Some(node) = timeline.node(id) {
        let mover = node.turn();
        let move_number = node.move_number();
        let past_warmup = move_number >= config.warmup_move;

        if past_warmup && let Some(spent) = timeline.time_spent(id, config.clock_delta) {
            speed.record(mover, spent);
        }

        let Some(curr_eval) = timeline.eval(id) else {
            id += 1;
            continue;
        };

        if mover == player && past_warmup {
            let prev = player_relative(last_eval, player);
            let curr = player_relative(curr_eval, player);

            if classify(prev, curr, config) == Verdict::Traumatic {
                if let Some(exemption) = context_exemption(&timeline, id, curr_eval, player, config)
                {
                    debug!(ply = node.ply(), move_number, ?exemption, "blunder exempted");
                } else {
                    let avg_time = speed.get(player).average_or(config.default_avg_move_secs);
                    let candidate = BlunderCandidate {
                        san: node.san().to_string(),
                        move_number,
                        ply: node.ply(),
                        eval_before: last_eval,
                        eval_drop: curr.saturating_sub(prev),
                        avg_time,
                    };
                    let sequence = scan(&timeline, id, player, avg_time * config.speed_ratio, config);
                    let stop = sequence.stop;

                    match confirm(candidate, sequence, player, config) {
                        Ok((event, last_id)) => {
                            debug!(
                                ply = event.blunder_ply(),
                                move_number,
                                drop = event.blunder_eval_drop(),
                                moves = event.tilt_sequence().len(),
                                "tilt confirmed"
                            );
                            if let Some(end_eval) = timeline.eval(last_id) {
                                last_eval = end_eval;
                            }
                            events.push(event);
                            id = last_id + 1;
                            continue;
                        }
                        Err(rejection) => {
                            debug!(ply = node.ply(), move_number, ?rejection, ?stop, "tilt rejected");
                        }
                    }
                }
            }
        }

        last_eval = curr_eval;
        id += 1;
    }

    events
}
