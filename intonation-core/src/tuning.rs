//! # Pitch Math Module
//!
//! Conversions between frequencies, fractional MIDI pitches and cent deviations.
//! All comparisons made by the scorer go through [`cents_error`], which folds the
//! raw deviation onto a single octave so that a detection one or more octaves
//! away from the target still lines up with it.
//!
//! ## Features
//! - Equal temperament conversions with A4 = 440 Hz
//! - Raw and octave-folded cent deviations
//! - Note names for display and logging

/// Reference pitch for A4 in Hz.
pub const A4_HZ: f64 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: f64 = 69.0;

/// Cents in one octave. Folding is periodic in this value.
pub const OCTAVE_CENTS: f64 = 1200.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Converts a frequency in Hz to a fractional MIDI pitch.
pub fn hz_to_midi(hz: f64) -> f64 {
    A4_MIDI + 12.0 * (hz / A4_HZ).log2()
}

/// Converts a fractional MIDI pitch to its equal temperament frequency.
pub fn midi_to_hz(midi: f64) -> f64 {
    A4_HZ * 2.0_f64.powf((midi - A4_MIDI) / 12.0)
}

/// Calculates the unfolded deviation of `hz` from `midi` in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
///
/// # Returns
/// * The deviation in cents, or `f64::INFINITY` when `hz` is not a usable
///   pitch (zero, negative, NaN or infinite)
pub fn raw_cents_error(hz: f64, midi: f64) -> f64 {
    if !hz.is_finite() || hz <= 0.0 {
        return f64::INFINITY;
    }
    100.0 * (hz_to_midi(hz) - midi)
}

/// Folds a cent value into `[-600, 600)`.
///
/// `+1200 -> 0`, `+700 -> -500`, `-1300 -> -100`. Non-finite input stays
/// infinite so that it can never win a nearest-target search.
pub fn fold_cents(cents: f64) -> f64 {
    if !cents.is_finite() {
        return f64::INFINITY;
    }
    let half = OCTAVE_CENTS / 2.0;
    let folded = (cents + half).rem_euclid(OCTAVE_CENTS) - half;
    // rem_euclid can round up to exactly the period for tiny negative inputs
    if folded >= half { folded - OCTAVE_CENTS } else { folded }
}

/// Octave-agnostic deviation of `hz` from target pitch `midi` in cents.
pub fn cents_error(hz: f64, midi: f64) -> f64 {
    fold_cents(raw_cents_error(hz, midi))
}

/// Returns a note name such as `"C4"` or `"F#2"` for a MIDI pitch.
///
/// Fractional pitches are rounded to the nearest semitone.
pub fn note_name(midi: f64) -> String {
    if !midi.is_finite() {
        return "?".to_string();
    }
    let rounded = midi.round() as i64;
    let pitch_class = rounded.rem_euclid(12) as usize;
    let octave = rounded.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[pitch_class], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn a4_maps_to_69() {
        assert!((hz_to_midi(440.0) - 69.0).abs() < EPS);
        assert!((midi_to_hz(69.0) - 440.0).abs() < EPS);
    }

    #[test]
    fn fold_examples() {
        assert!((fold_cents(1200.0) - 0.0).abs() < EPS);
        assert!((fold_cents(700.0) + 500.0).abs() < EPS);
        assert!((fold_cents(-1300.0) + 100.0).abs() < EPS);
        assert!((fold_cents(600.0) + 600.0).abs() < EPS);
        assert!((fold_cents(-600.0) + 600.0).abs() < EPS);
    }

    #[test]
    fn fold_stays_in_range_and_is_periodic() {
        let mut x = -10_000.0;
        while x < 10_000.0 {
            let f = fold_cents(x);
            assert!((-600.0..600.0).contains(&f), "fold({x}) = {f}");
            let g = fold_cents(x + OCTAVE_CENTS);
            assert!((f - g).abs() < 1e-6, "period broke at {x}");
            x += 37.3;
        }
        assert!((-600.0..600.0).contains(&fold_cents(-1e-17)));
    }

    #[test]
    fn unusable_frequencies_are_infinite() {
        assert_eq!(raw_cents_error(0.0, 60.0), f64::INFINITY);
        assert_eq!(raw_cents_error(-3.0, 60.0), f64::INFINITY);
        assert_eq!(cents_error(f64::NAN, 60.0), f64::INFINITY);
        assert_eq!(cents_error(f64::INFINITY, 60.0), f64::INFINITY);
    }

    #[test]
    fn octave_errors_fold_to_zero() {
        let c4 = midi_to_hz(60.0);
        for k in -3..=3 {
            let hz = c4 * 2.0_f64.powi(k);
            assert!(cents_error(hz, 60.0).abs() < 1e-6, "octave {k}");
        }
    }

    #[test]
    fn note_names() {
        assert_eq!(note_name(60.0), "C4");
        assert_eq!(note_name(69.0), "A4");
        assert_eq!(note_name(40.4), "E2");
        assert_eq!(note_name(f64::NAN), "?");
    }
}
