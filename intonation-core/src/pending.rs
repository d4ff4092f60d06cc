//! Multiset of not-yet-credited target pitches for the current beat.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A fractional MIDI pitch usable as an ordered map key.
///
/// Ordering is `f64::total_cmp`, so iteration over [`PendingTargets`] is
/// ascending by pitch.
#[derive(Debug, Clone, Copy)]
pub struct Semitone(pub f64);

impl Semitone {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Semitone {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Semitone {}

impl PartialOrd for Semitone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Semitone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Pitch -> remaining required count. Keys with a zero count are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingTargets {
    remaining: BTreeMap<Semitone, u32>,
}

impl PendingTargets {
    /// Counts occurrences of each distinct pitch.
    pub fn from_pitches<I: IntoIterator<Item = f64>>(pitches: I) -> Self {
        let mut remaining = BTreeMap::new();
        for pitch in pitches {
            *remaining.entry(Semitone(pitch)).or_insert(0) += 1;
        }
        Self { remaining }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn remaining(&self, target: f64) -> u32 {
        self.remaining.get(&Semitone(target)).copied().unwrap_or(0)
    }

    /// Total number of uncredited units across all pitches.
    pub fn outstanding(&self) -> u32 {
        self.remaining.values().sum()
    }

    /// Distinct pending pitches in ascending order.
    pub fn targets(&self) -> impl Iterator<Item = f64> + '_ {
        self.remaining.keys().map(|s| s.value())
    }

    /// Consumes one unit of `target`. Returns `false` if none was left.
    pub fn take_one(&mut self, target: f64) -> bool {
        let key = Semitone(target);
        match self.remaining.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.remaining.remove(&key);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_duplicates() {
        let pending = PendingTargets::from_pitches([40.0, 52.0, 40.0]);
        assert_eq!(pending.remaining(40.0), 2);
        assert_eq!(pending.remaining(52.0), 1);
        assert_eq!(pending.remaining(45.0), 0);
        assert_eq!(pending.outstanding(), 3);
    }

    #[test]
    fn take_one_removes_at_zero() {
        let mut pending = PendingTargets::from_pitches([40.0, 40.0]);
        assert!(pending.take_one(40.0));
        assert_eq!(pending.remaining(40.0), 1);
        assert!(pending.take_one(40.0));
        assert!(pending.is_empty());
        assert!(!pending.take_one(40.0));
    }

    #[test]
    fn targets_iterate_ascending() {
        let pending = PendingTargets::from_pitches([67.0, 60.0, 64.0, 60.0]);
        let targets: Vec<f64> = pending.targets().collect();
        assert_eq!(targets, vec![60.0, 64.0, 67.0]);
    }

    #[test]
    fn empty_input_is_empty() {
        let pending = PendingTargets::from_pitches(std::iter::empty());
        assert!(pending.is_empty());
        assert_eq!(pending.outstanding(), 0);
    }
}
