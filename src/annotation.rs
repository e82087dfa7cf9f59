//! Lichess-style move annotations: `{ [%eval 0.17] [%clk 0:00:30] }`.
//!
//! Missing or malformed tags resolve to `None`, never to zero, so callers can
//! tell "no evaluation" apart from "level position".

use std::sync::LazyLock;

use regex::Regex;

/// Centipawn magnitude a forced mate is normalised around.
pub const MATE_SCORE: i32 = 10_000;

/// Centipawns removed from [`MATE_SCORE`] per move of mate distance.
const MATE_DISTANCE_STEP: i32 = 100;

static EVAL_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%eval\s+(#-?\d+|-?\d+(?:\.\d*)?)\]").expect("valid eval tag regex")
});

static CLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%clk\s+(\d+):(\d+):(\d+)(?:\.\d+)?\]").expect("valid clock tag regex")
});

/// Evaluation and clock reading carried by one ply's comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Centipawns from White's point of view.
    pub eval: Option<i32>,
    /// Whole seconds left on the clock of the side that just moved.
    pub clock: Option<u32>,
}

impl Annotation {
    pub fn parse(comment: Option<&str>) -> Self {
        comment.map(parse_annotation).unwrap_or_default()
    }
}

pub fn parse_annotation(comment: &str) -> Annotation {
    if comment.is_empty() {
        return Annotation::default();
    }

    Annotation {
        eval: EVAL_TAG_RE
            .captures(comment)
            .and_then(|caps| parse_eval_token(&caps[1])),
        clock: CLOCK_TAG_RE.captures(comment).and_then(|caps| {
            clock_seconds(&caps[1], &caps[2], &caps[3])
        }),
    }
}

/// Parse the value of an `[%eval ...]` tag into centipawns.
///
/// `#N` (side to move mates) becomes `10000 - 100*N`; `#-N` becomes
/// `-10000 - 100*N` with `N` negative, which keeps faster mates further from
/// zero on the winning side only. `#0` takes the second branch.
pub fn parse_eval_token(token: &str) -> Option<i32> {
    let token = token.trim();
    if let Some(mate) = token.strip_prefix('#') {
        let mate_in: i32 = mate.parse().ok()?;
        let distance = mate_in.checked_mul(MATE_DISTANCE_STEP)?;
        return if mate_in > 0 {
            MATE_SCORE.checked_sub(distance)
        } else {
            (-MATE_SCORE).checked_sub(distance)
        };
    }

    parse_pawns_as_centipawns(token)
}

/// `"-1.257"` -> `-125`: whole pawns times 100 plus the first two fractional
/// digits, truncated toward zero. Works on the digits so `0.29` stays 29.
fn parse_pawns_as_centipawns(token: &str) -> Option<i32> {
    let (negative, unsigned) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let pawns: i32 = whole.parse().ok()?;
    let mut hundredths = 0i32;
    for (weight, digit) in [10, 1].into_iter().zip(fraction.bytes()) {
        hundredths += weight * i32::from(digit - b'0');
    }

    let centipawns = pawns.checked_mul(100)?.checked_add(hundredths)?;
    Some(if negative { -centipawns } else { centipawns })
}

fn clock_seconds(hours: &str, minutes: &str, seconds: &str) -> Option<u32> {
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    let s: u32 = seconds.parse().ok()?;
    h.checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eval_and_clock() {
        let parsed = parse_annotation("[%eval 0.17] [%clk 0:00:30]");
        assert_eq!(parsed.eval, Some(17));
        assert_eq!(parsed.clock, Some(30));
    }

    #[test]
    fn test_parse_mate_scores() {
        assert_eq!(parse_annotation("[%eval #3]").eval, Some(9700));
        assert_eq!(parse_annotation("[%eval #-2]").eval, Some(-9800));
        assert_eq!(parse_annotation("[%eval #1]").eval, Some(9900));
        assert_eq!(parse_annotation("[%eval #-1]").eval, Some(-9900));
    }

    #[test]
    fn test_mate_zero_uses_losing_branch() {
        assert_eq!(parse_eval_token("#0"), Some(-MATE_SCORE));
    }

    #[test]
    fn test_absent_annotation() {
        assert_eq!(Annotation::parse(None), Annotation::default());
        assert_eq!(Annotation::parse(Some("")), Annotation::default());

        let parsed = Annotation::parse(Some("a quiet developing move"));
        assert_eq!(parsed.eval, None);
        assert_eq!(parsed.clock, None);
    }

    #[test]
    fn test_decimal_truncates_toward_zero() {
        assert_eq!(parse_eval_token("0.29"), Some(29));
        assert_eq!(parse_eval_token("-1.257"), Some(-125));
        assert_eq!(parse_eval_token("-0.5"), Some(-50));
        assert_eq!(parse_eval_token("-0.009"), Some(0));
        assert_eq!(parse_eval_token("3"), Some(300));
        assert_eq!(parse_eval_token("12."), Some(1200));
    }

    #[test]
    fn test_zero_eval_is_not_absent() {
        assert_eq!(parse_annotation("[%eval 0.0]").eval, Some(0));
    }

    #[test]
    fn test_eval_overflow_is_absent() {
        assert_eq!(parse_annotation("[%eval #99999999999]").eval, None);
        assert_eq!(parse_annotation("[%eval 99999999999.0]").eval, None);
        assert_eq!(parse_annotation("[%eval #-30000000]").eval, None);
    }

    #[test]
    fn test_malformed_eval_tag_is_absent() {
        assert_eq!(parse_annotation("[%eval abc] [%clk 0:01:00]").eval, None);
        assert_eq!(parse_annotation("[%eval abc] [%clk 0:01:00]").clock, Some(60));
        assert_eq!(parse_annotation("[%eval #] [%clk 0:01:00]").eval, None);
    }

    #[test]
    fn test_clock_ignores_fraction() {
        assert_eq!(parse_annotation("[%clk 1:30:43.7]").clock, Some(5443));
    }

    #[test]
    fn test_malformed_clock_is_absent() {
        assert_eq!(parse_annotation("[%clk 1:30]").clock, None);
        assert_eq!(parse_annotation("[%clk soon]").clock, None);
        assert_eq!(parse_annotation("[%clk 9999999999:00:00]").clock, None);
    }

    #[test]
    fn test_tags_in_either_order_with_extra_text() {
        let parsed = parse_annotation("[%clk 0:03:00] good try [%eval -2.40]");
        assert_eq!(parsed.eval, Some(-240));
        assert_eq!(parsed.clock, Some(180));
    }
}
