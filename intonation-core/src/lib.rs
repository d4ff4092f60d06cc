// intonation-core/src/lib.rs

//! The core logic for the intonation trainer.
//! This crate grades live pitch detections against the notes expected at the
//! current playback position. It is completely headless: score rendering,
//! transport and audio capture happen elsewhere and reach the scorer only as
//! events.

pub mod config;
pub mod events;
pub mod pending;
pub mod scorer;
pub mod session;
pub mod stability;
pub mod tuning;

pub use config::{ConfigError, MissedNotePolicy, ScorerConfig};
pub use events::{DetectedPitchEvent, ExpectedNoteEvent, ScoreEvent};
pub use scorer::{Credit, DetectionOutcome, ScoreState, ScoringEngine};
pub use session::{Session, SessionHandle, SessionInputs, Snapshot};

/// What the presentation layer shows for the latest detected frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveReadout {
    /// Absolute octave-folded deviation from the matched target in cents.
    pub abs_cents_error: f64,
    /// Whether the stability window currently confirms the match.
    pub confirmed_in_tune: bool,
    /// The pending target the frame was compared against, if any.
    pub matched_target: Option<f64>,
}

impl LiveReadout {
    /// The no-target state shown during rests, silence and between beats.
    pub fn neutral() -> Self {
        Self {
            abs_cents_error: 0.0,
            confirmed_in_tune: false,
            matched_target: None,
        }
    }
}

impl Default for LiveReadout {
    fn default() -> Self {
        Self::neutral()
    }
}
