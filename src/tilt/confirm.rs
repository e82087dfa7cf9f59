use shakmaty::Color;

use super::config::TiltConfig;
use super::event::{TiltEvent, round2};
use super::scanner::ScannedSequence;
use super::timeline::player_relative;
use crate::game::MoveId;

/// A blunder that passed classification and both context filters.
#[derive(Debug, Clone, PartialEq)]
pub struct BlunderCandidate {
    pub san: String,
    pub move_number: u32,
    pub ply: u32,
    /// Last-seen White-relative eval before the blunder.
    pub eval_before: i32,
    /// Player-relative change caused by the blunder.
    pub eval_drop: i32,
    /// Player's rolling average move time when the blunder was played.
    pub avg_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort { moves: usize },
    /// No sequence move slipped clearly.
    NoSlip,
    /// The player ended the sequence too close to the pre-blunder eval.
    Recovered { net_drop: i32 },
}

/// Turn a scanned aftermath into an event, or say why it is not one.
/// On success also returns the id of the last ply the episode consumed.
pub fn confirm(
    blunder: BlunderCandidate,
    sequence: ScannedSequence,
    player: Color,
    config: &TiltConfig,
) -> Result<(TiltEvent, MoveId), Rejection> {
    let moves = sequence.moves.len();
    let (Some(last_id), Some(last)) = (sequence.last, sequence.moves.last()) else {
        return Err(Rejection::TooShort { moves });
    };
    if moves < config.min_sequence_moves {
        return Err(Rejection::TooShort { moves });
    }

    if !sequence
        .moves
        .iter()
        .any(|m| m.eval_delta < config.slip_below)
    {
        return Err(Rejection::NoSlip);
    }

    let net_drop = player_relative(last.eval, player)
        .saturating_sub(player_relative(blunder.eval_before, player));
    if net_drop >= config.net_drop_below {
        return Err(Rejection::Recovered { net_drop });
    }

    let event = TiltEvent {
        blunder_move: blunder.san,
        blunder_number: blunder.move_number,
        blunder_ply: blunder.ply,
        blunder_eval_drop: blunder.eval_drop,
        tilt_sequence: sequence.moves,
        avg_time_before_blunder: round2(blunder.avg_time),
    };
    Ok((event, last_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilt::event::{TiltMoveRecord, TiltSequence};
    use crate::tilt::scanner::ScanStop;

    fn record(ply: u32, eval: i32, eval_delta: i32) -> TiltMoveRecord {
        TiltMoveRecord {
            move_san: format!("m{ply}"),
            move_number: ply.div_ceil(2),
            ply,
            time_spent: 1,
            eval,
            eval_delta,
            threshold_used: 5.0,
        }
    }

    fn sequence(records: &[TiltMoveRecord]) -> ScannedSequence {
        ScannedSequence {
            moves: records.iter().cloned().collect::<TiltSequence>(),
            last: records.last().map(|r| r.ply as usize - 1),
            stop: ScanStop::NotFast { ply: 99, time_spent: 30 },
        }
    }

    fn candidate(eval_before: i32) -> BlunderCandidate {
        BlunderCandidate {
            san: "Qxb7".to_string(),
            move_number: 12,
            ply: 23,
            eval_before,
            eval_drop: -300,
            avg_time: 7.456,
        }
    }

    #[test]
    fn test_confirms_sustained_meltdown() {
        let seq = sequence(&[record(25, -450, -190), record(27, -600, -150)]);
        let (event, last) = confirm(candidate(50), seq, Color::White, &TiltConfig::DEFAULT)
            .expect("tilt confirmed");

        assert_eq!(last, 26);
        assert_eq!(event.blunder_move(), "Qxb7");
        assert_eq!(event.blunder_number(), 12);
        assert_eq!(event.tilt_sequence().len(), 2);
        assert_eq!(event.avg_time_before_blunder(), 7.46);
        assert_eq!(event.end_ply(), 27);
    }

    #[test]
    fn test_single_move_is_too_short() {
        let seq = sequence(&[record(25, -700, -400)]);
        assert_eq!(
            confirm(candidate(50), seq, Color::White, &TiltConfig::DEFAULT),
            Err(Rejection::TooShort { moves: 1 })
        );
    }

    #[test]
    fn test_requires_a_clear_slip() {
        let seq = sequence(&[record(25, -300, -100), record(27, -380, -80)]);
        assert_eq!(
            confirm(candidate(50), seq, Color::White, &TiltConfig::DEFAULT),
            Err(Rejection::NoSlip)
        );
    }

    #[test]
    fn test_net_drop_boundary() {
        let exact = sequence(&[record(25, -150, -110), record(27, -250, -20)]);
        assert_eq!(
            confirm(candidate(50), exact, Color::White, &TiltConfig::DEFAULT),
            Err(Rejection::Recovered { net_drop: -300 })
        );

        let beyond = sequence(&[record(25, -150, -110), record(27, -251, -20)]);
        assert!(confirm(candidate(50), beyond, Color::White, &TiltConfig::DEFAULT).is_ok());
    }

    #[test]
    fn test_black_net_drop_is_player_relative() {
        let seq = sequence(&[record(26, 400, -150), record(28, 500, -100)]);
        let result = confirm(candidate(-50), seq, Color::Black, &TiltConfig::DEFAULT);
        assert!(result.is_ok());
    }
}
