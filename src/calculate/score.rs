//! Score normalization.
//!
//! Raw scores arrive as a plain integer, a delimiter-separated string of
//! per-period values, or nothing at all. Normalization resolves that once,
//! up front: dirty or legacy data must never block scoring, so anything
//! unparseable becomes a single zero-valued period.

use tracing::warn;

use crate::models::RawScore;

/// A parsed score: per-period values and their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedScore {
    pub periods: Vec<u32>,
    pub total: u32,
}

impl NormalizedScore {
    /// The single-zero-period score malformed input collapses to.
    pub fn zero() -> Self {
        Self {
            periods: vec![0],
            total: 0,
        }
    }
}

/// Normalize a raw score value.
///
/// Integer input becomes one period. Text input is split on non-digit runs,
/// so "25-20", "25:20" and "25, 20" all parse the same. Absent, negative,
/// or unparseable input normalizes to a single zero period.
pub fn normalize(raw: &RawScore) -> NormalizedScore {
    match raw {
        RawScore::Absent => NormalizedScore::zero(),
        RawScore::Number(n) => {
            if *n < 0 {
                warn!(value = *n, "negative raw score, normalizing to zero");
                return NormalizedScore::zero();
            }
            match u32::try_from(*n) {
                Ok(v) => NormalizedScore {
                    periods: vec![v],
                    total: v,
                },
                Err(_) => {
                    warn!(value = *n, "raw score out of range, normalizing to zero");
                    NormalizedScore::zero()
                }
            }
        }
        RawScore::Text(s) => normalize_text(s),
    }
}

fn normalize_text(s: &str) -> NormalizedScore {
    let mut periods = Vec::new();
    for run in s.split(|c: char| !c.is_ascii_digit()) {
        if run.is_empty() {
            continue;
        }
        match run.parse::<u32>() {
            Ok(v) => periods.push(v),
            Err(_) => {
                warn!(value = %s, "unparseable period in raw score, normalizing to zero");
                return NormalizedScore::zero();
            }
        }
    }

    if periods.is_empty() {
        if !s.trim().is_empty() {
            warn!(value = %s, "no digits in raw score, normalizing to zero");
        }
        return NormalizedScore::zero();
    }

    let total = periods.iter().sum();
    NormalizedScore { periods, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_score() {
        let score = normalize(&RawScore::Number(3));
        assert_eq!(score.periods, vec![3]);
        assert_eq!(score.total, 3);
    }

    #[test]
    fn test_absent_score() {
        assert_eq!(normalize(&RawScore::Absent), NormalizedScore::zero());
    }

    #[test]
    fn test_negative_score_normalizes_to_zero() {
        assert_eq!(normalize(&RawScore::Number(-2)), NormalizedScore::zero());
    }

    #[test]
    fn test_dash_delimited_periods() {
        let score = normalize(&RawScore::Text("25-20".to_string()));
        assert_eq!(score.periods, vec![25, 20]);
        assert_eq!(score.total, 45);
    }

    #[test]
    fn test_colon_and_comma_delimiters() {
        let colon = normalize(&RawScore::Text("25:20".to_string()));
        assert_eq!(colon.periods, vec![25, 20]);

        let comma = normalize(&RawScore::Text("25, 20, 15".to_string()));
        assert_eq!(comma.periods, vec![25, 20, 15]);
        assert_eq!(comma.total, 60);
    }

    #[test]
    fn test_single_number_text() {
        let score = normalize(&RawScore::Text("7".to_string()));
        assert_eq!(score.periods, vec![7]);
        assert_eq!(score.total, 7);
    }

    #[test]
    fn test_garbage_text_normalizes_to_zero() {
        assert_eq!(
            normalize(&RawScore::Text("n/a".to_string())),
            NormalizedScore::zero()
        );
        assert_eq!(
            normalize(&RawScore::Text("".to_string())),
            NormalizedScore::zero()
        );
    }

    #[test]
    fn test_overflowing_period_normalizes_to_zero() {
        assert_eq!(
            normalize(&RawScore::Text("99999999999999999999".to_string())),
            NormalizedScore::zero()
        );
    }

    #[test]
    fn test_total_is_sum_of_periods() {
        // Round-trip property: total equals the sum of the parsed periods.
        for raw in ["25-20-15", "3", "0:0:1", "10, 2"] {
            let score = normalize(&RawScore::Text(raw.to_string()));
            assert_eq!(score.total, score.periods.iter().sum::<u32>());
        }
    }

    #[test]
    fn test_zero_score_is_valid() {
        let score = normalize(&RawScore::Number(0));
        assert_eq!(score.periods, vec![0]);
        assert_eq!(score.total, 0);
    }
}
