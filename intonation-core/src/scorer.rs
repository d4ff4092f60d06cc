//! # Scoring Engine
//!
//! Grades a performer's intonation against the beat currently under the
//! playback cursor. The engine owns all grading state; callers feed it the two
//! event streams one event at a time and read back the score and live readout.
//!
//! ## Pipeline per detected frame
//! 1. Pick the closest still-pending target, octave-agnostic (`tuning::cents_error`)
//! 2. Push the verdict into the stability window
//! 3. On quorum, award one credit unless the cooldown is still running
//!
//! Ties between equidistant targets go to the lowest pitch, since pending
//! targets are iterated in ascending order and only a strictly smaller error
//! replaces the current best.

use serde::Serialize;

use crate::{
    LiveReadout,
    config::{ConfigError, MissedNotePolicy, ScorerConfig},
    events::{DetectedPitchEvent, ExpectedNoteEvent},
    pending::PendingTargets,
    stability::{FrameVerdict, StabilityWindow},
    tuning,
};

/// Session-long running score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreState {
    /// Credits awarded.
    pub hits: u32,
    /// Expected notes seen, duplicates included.
    pub total: u32,
    /// Uncredited notes from finished beats. Only counted under
    /// `MissedNotePolicy::Record`.
    pub missed: u32,
}

impl ScoreState {
    /// Fraction of expected notes that were credited, `None` before any note.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.hits as f64 / self.total as f64)
        }
    }
}

/// A single awarded credit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Credit {
    pub t_sec: f64,
    pub target: f64,
    pub abs_cents_error: f64,
}

/// Result of feeding one detected-pitch frame to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionOutcome {
    pub readout: LiveReadout,
    pub credit: Option<Credit>,
}

impl DetectionOutcome {
    fn neutral() -> Self {
        Self {
            readout: LiveReadout::neutral(),
            credit: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScorerConfig,
    pending: PendingTargets,
    window: StabilityWindow,
    /// No credit may be awarded before this time. `NEG_INFINITY` = unrestricted.
    cooldown_deadline: f64,
    score: ScoreState,
    live: LiveReadout,
}

impl ScoringEngine {
    /// Creates an engine with an empty score.
    ///
    /// # Returns
    /// * `Err(ConfigError)` - The config violates its own constraints
    pub fn new(config: ScorerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            window: StabilityWindow::new(config.window_size),
            config,
            pending: PendingTargets::default(),
            cooldown_deadline: f64::NEG_INFINITY,
            score: ScoreState::default(),
            live: LiveReadout::neutral(),
        })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Replaces the configuration at runtime. A smaller window keeps only its
    /// most recent frames; the score and pending targets are untouched.
    pub fn set_config(&mut self, config: ScorerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.window.resize(config.window_size);
        log::debug!("Scorer config updated: {:?}", config);
        self.config = config;
        Ok(())
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn live_readout(&self) -> LiveReadout {
        self.live
    }

    pub fn pending(&self) -> &PendingTargets {
        &self.pending
    }

    /// Starts grading a new beat.
    ///
    /// Whatever was left of the previous beat is discarded (or counted as
    /// missed, depending on policy). `total` grows by the number of usable
    /// pitches, duplicates included.
    pub fn on_expected(&mut self, event: &ExpectedNoteEvent) {
        self.retire_pending();

        self.pending = PendingTargets::from_pitches(event.usable_pitches());
        let notes_in_beat = self.pending.outstanding();
        if notes_in_beat > 0 {
            self.score.total += notes_in_beat;
        }

        self.window.clear();
        self.cooldown_deadline = f64::NEG_INFINITY;
        self.live = LiveReadout::neutral();

        log::debug!(
            "Beat at {:.3}s: {} note(s) expected, score {}/{}",
            event.t_sec,
            notes_in_beat,
            self.score.hits,
            self.score.total
        );
    }

    /// Grades one detected-pitch frame and possibly awards a credit.
    pub fn on_detected(&mut self, event: &DetectedPitchEvent) -> DetectionOutcome {
        if self.pending.is_empty() {
            return self.go_neutral();
        }

        let Some((target, abs_cents_error)) = self.nearest_target(event.hz) else {
            return self.go_neutral();
        };

        let in_tolerance = abs_cents_error <= self.config.tolerance_cents;
        self.window.push(FrameVerdict {
            t_sec: event.t_sec,
            in_tolerance,
            abs_cents_error,
            matched_target: target,
        });

        let confirmed = self.window.is_confirmed(self.config.required_ok_count);
        self.live = LiveReadout {
            abs_cents_error,
            confirmed_in_tune: confirmed,
            matched_target: Some(target),
        };

        log::trace!(
            "Frame {:.3}s: {:.1} Hz -> {} ({:.1} cents, {}/{} ok)",
            event.t_sec,
            event.hz,
            tuning::note_name(target),
            abs_cents_error,
            self.window.ok_count(),
            self.window.len()
        );

        let credit = if confirmed && event.t_sec >= self.cooldown_deadline {
            self.award(target, abs_cents_error, event.t_sec)
        } else {
            None
        };

        DetectionOutcome {
            readout: self.live,
            credit,
        }
    }

    /// Tears down transient grading state. The score is kept.
    pub fn stop(&mut self) {
        self.retire_pending();
        self.window.clear();
        self.cooldown_deadline = f64::NEG_INFINITY;
        self.live = LiveReadout::neutral();
        log::info!(
            "Scoring stopped at {}/{} ({} missed)",
            self.score.hits,
            self.score.total,
            self.score.missed
        );
    }

    /// Explicitly zeroes the score.
    pub fn reset_score(&mut self) {
        self.score = ScoreState::default();
    }

    /// Closest pending target to `hz` with its absolute folded error.
    /// `None` when no target yields a finite error (silence, bad input).
    fn nearest_target(&self, hz: f64) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for target in self.pending.targets() {
            let err = tuning::cents_error(hz, target).abs();
            if !err.is_finite() {
                continue;
            }
            match best {
                Some((_, best_err)) if err >= best_err => {}
                _ => best = Some((target, err)),
            }
        }
        best
    }

    fn award(&mut self, target: f64, abs_cents_error: f64, t_sec: f64) -> Option<Credit> {
        if !self.pending.take_one(target) {
            return None;
        }
        self.score.hits += 1;
        debug_assert!(self.score.hits <= self.score.total);
        self.cooldown_deadline = t_sec + self.config.cooldown_sec();
        self.window.clear();

        log::debug!(
            "Credit at {:.3}s for {} ({:.1} cents, {} left), score {}/{}",
            t_sec,
            tuning::note_name(target),
            abs_cents_error,
            self.pending.remaining(target),
            self.score.hits,
            self.score.total
        );

        Some(Credit {
            t_sec,
            target,
            abs_cents_error,
        })
    }

    fn go_neutral(&mut self) -> DetectionOutcome {
        self.window.clear();
        self.live = LiveReadout::neutral();
        DetectionOutcome::neutral()
    }

    fn retire_pending(&mut self) {
        if self.config.missed_notes == MissedNotePolicy::Record {
            let missed = self.pending.outstanding();
            if missed > 0 {
                log::debug!("{} note(s) missed", missed);
                self.score.missed += missed;
            }
        }
        self.pending.clear();
    }
}
