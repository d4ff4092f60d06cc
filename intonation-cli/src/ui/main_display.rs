//! # Main Display
//!
//! Formats the score line and the live readout for the terminal.

use intonation_core::{LiveReadout, ScoreState, Snapshot, tuning};

use super::cent_meter::CentMeter;

/// `hits/total` followed by the accuracy, e.g. `7/9 (77.8%)`.
pub fn format_score(score: &ScoreState) -> String {
    let mut line = format!("{}/{}", score.hits, score.total);
    if let Some(accuracy) = score.accuracy() {
        line.push_str(&format!(" ({:.1}%)", accuracy * 100.0));
    }
    if score.missed > 0 {
        line.push_str(&format!(", {} missed", score.missed));
    }
    line
}

/// `E2  12 cents OK`, or `--` when no target is being graded.
pub fn format_readout(readout: &LiveReadout) -> String {
    match readout.matched_target {
        Some(target) => format!(
            "{:<4} {:>4} cents {}",
            tuning::note_name(target),
            readout.abs_cents_error.round() as i64,
            if readout.confirmed_in_tune { "OK" } else { "--" }
        ),
        None => "--".to_string(),
    }
}

/// One status line per snapshot: meter, readout and score.
pub fn render_snapshot(snapshot: &Snapshot, tolerance: f64) -> String {
    let cents = snapshot
        .readout
        .matched_target
        .map(|_| snapshot.readout.abs_cents_error);
    let meter = CentMeter::new(cents, tolerance).render();
    let credit = if snapshot.credit.is_some() { "  +1" } else { "" };
    format!(
        "{} {:<18} {}{}",
        meter,
        format_readout(&snapshot.readout),
        format_score(&snapshot.score),
        credit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_line() {
        assert_eq!(format_score(&ScoreState::default()), "0/0");
        let score = ScoreState { hits: 3, total: 4, missed: 1 };
        assert_eq!(format_score(&score), "3/4 (75.0%), 1 missed");
    }

    #[test]
    fn readout_line() {
        assert_eq!(format_readout(&LiveReadout::neutral()), "--");
        let readout = LiveReadout {
            abs_cents_error: 11.6,
            confirmed_in_tune: true,
            matched_target: Some(40.0),
        };
        assert_eq!(format_readout(&readout), "E2     12 cents OK");
    }
}
