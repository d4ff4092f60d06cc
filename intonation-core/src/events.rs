//! # Event Types
//!
//! The two inbound event contracts consumed by the scorer. Both are plain data;
//! producers (the playback cursor and the pitch estimator) live outside this
//! crate and hand events over through channels or direct calls.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Target pitches for one beat of the score.
///
/// Emitted once per beat reached during playback, including rests (empty
/// `pitches`) so the scorer resets correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedNoteEvent {
    /// Playback position in seconds.
    pub t_sec: f64,
    /// Fractional MIDI pitches. Duplicates are independent units (unisons).
    #[serde(default)]
    pub pitches: Vec<f64>,
}

impl ExpectedNoteEvent {
    pub fn new(t_sec: f64, pitches: impl Into<Vec<f64>>) -> Self {
        Self {
            t_sec,
            pitches: pitches.into(),
        }
    }

    /// A beat carrying no notes.
    pub fn rest(t_sec: f64) -> Self {
        Self::new(t_sec, Vec::new())
    }

    /// Pitches that can actually be graded. Non-finite values from the
    /// producer are discarded here.
    pub fn usable_pitches(&self) -> impl Iterator<Item = f64> + '_ {
        self.pitches.iter().copied().filter(|p| p.is_finite())
    }
}

/// One frame of the external pitch estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedPitchEvent {
    /// Analysis time in seconds.
    pub t_sec: f64,
    /// Estimated frequency in Hz. `0` (or omitted) means no pitch.
    #[serde(default)]
    pub hz: f64,
}

impl DetectedPitchEvent {
    pub fn new(t_sec: f64, hz: f64) -> Self {
        Self { t_sec, hz }
    }

    /// A frame with no usable pitch.
    pub fn silence(t_sec: f64) -> Self {
        Self::new(t_sec, 0.0)
    }
}

/// Either event, as found in a JSON-lines event script.
///
/// ```json
/// {"type":"expected","t_sec":0.0,"pitches":[60,64]}
/// {"type":"detected","t_sec":0.01,"hz":261.63}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScoreEvent {
    Expected(ExpectedNoteEvent),
    Detected(DetectedPitchEvent),
}

impl From<ExpectedNoteEvent> for ScoreEvent {
    fn from(event: ExpectedNoteEvent) -> Self {
        ScoreEvent::Expected(event)
    }
}

impl From<DetectedPitchEvent> for ScoreEvent {
    fn from(event: DetectedPitchEvent) -> Self {
        ScoreEvent::Detected(event)
    }
}

/// Reads a JSON-lines event script, one `ScoreEvent` per line.
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Returns
/// * `Ok(events)` - All events in file order
/// * `Err(e)` - I/O failure or a malformed line (with its line number)
pub fn read_script<R: BufRead>(reader: R) -> Result<Vec<ScoreEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        if let Some(event) = parse_line(&line)
            .with_context(|| format!("Invalid event on line {}", index + 1))?
        {
            events.push(event);
        }
    }
    Ok(events)
}

/// Parses a single script line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<ScoreEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_lines() {
        let expected: ScoreEvent =
            serde_json::from_str(r#"{"type":"expected","t_sec":0.5,"pitches":[60,64.5]}"#).unwrap();
        assert_eq!(expected, ScoreEvent::Expected(ExpectedNoteEvent::new(0.5, vec![60.0, 64.5])));

        let detected: ScoreEvent =
            serde_json::from_str(r#"{"type":"detected","t_sec":0.51}"#).unwrap();
        assert_eq!(detected, ScoreEvent::Detected(DetectedPitchEvent::silence(0.51)));
    }

    #[test]
    fn rest_without_pitches_field() {
        let rest: ScoreEvent = serde_json::from_str(r#"{"type":"expected","t_sec":2}"#).unwrap();
        assert_eq!(rest, ScoreEvent::Expected(ExpectedNoteEvent::rest(2.0)));
    }

    #[test]
    fn reads_script_skipping_comments() {
        let script = "# warm-up\n{\"type\":\"expected\",\"t_sec\":0,\"pitches\":[40]}\n\n{\"type\":\"detected\",\"t_sec\":0.01,\"hz\":82.4}\n";
        let events = read_script(script.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ScoreEvent::Detected(DetectedPitchEvent::new(0.01, 82.4)));
    }

    #[test]
    fn reports_bad_line_number() {
        let script = "{\"type\":\"expected\",\"t_sec\":0}\n{\"type\":\"bogus\"}\n";
        let err = read_script(script.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn non_finite_pitches_are_not_usable() {
        let event = ExpectedNoteEvent::new(0.0, vec![60.0, f64::NAN, f64::INFINITY, 62.0]);
        let usable: Vec<f64> = event.usable_pitches().collect();
        assert_eq!(usable, vec![60.0, 62.0]);
    }
}
