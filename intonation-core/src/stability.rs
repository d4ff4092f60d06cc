//! # Stability Debouncer
//!
//! A trailing window of per-frame verdicts. A match is confirmed by majority
//! vote over the window rather than by an unbroken run, so a few flickering
//! frames (attack transients, vibrato excursions, misreads) do not reset it.

use std::collections::VecDeque;

/// One comparator result pushed into the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVerdict {
    pub t_sec: f64,
    pub in_tolerance: bool,
    pub abs_cents_error: f64,
    pub matched_target: f64,
}

/// Fixed-capacity sliding window; insertion order is recency order.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    frames: VecDeque<FrameVerdict>,
    capacity: usize,
}

impl StabilityWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a verdict, evicting the oldest frame when full.
    pub fn push(&mut self, verdict: FrameVerdict) {
        self.frames.push_back(verdict);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    /// Number of in-tolerance verdicts currently in the window.
    pub fn ok_count(&self) -> usize {
        self.frames.iter().filter(|f| f.in_tolerance).count()
    }

    /// True when at least `required` frames in the window are in tolerance.
    pub fn is_confirmed(&self, required: usize) -> bool {
        self.ok_count() >= required
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Changes the capacity, dropping the oldest frames if it shrinks.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.frames.len() > capacity {
            self.frames.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(t_sec: f64, in_tolerance: bool) -> FrameVerdict {
        FrameVerdict {
            t_sec,
            in_tolerance,
            abs_cents_error: if in_tolerance { 3.0 } else { 80.0 },
            matched_target: 60.0,
        }
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut window = StabilityWindow::new(3);
        for i in 0..5 {
            window.push(verdict(i as f64, true));
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.frames.back().map(|f| f.t_sec), Some(4.0));
        assert_eq!(window.frames.front().map(|f| f.t_sec), Some(2.0));
    }

    #[test]
    fn quorum_is_a_vote_not_a_run() {
        let mut window = StabilityWindow::new(10);
        let pattern = [true, false, true, false, true, true, false, true, false, true];
        for (i, ok) in pattern.iter().enumerate() {
            window.push(verdict(i as f64, *ok));
        }
        assert_eq!(window.ok_count(), 6);
        assert!(window.is_confirmed(6));
        assert!(!window.is_confirmed(7));
    }

    #[test]
    fn old_ok_frames_slide_out() {
        let mut window = StabilityWindow::new(4);
        for i in 0..4 {
            window.push(verdict(i as f64, true));
        }
        assert!(window.is_confirmed(3));
        window.push(verdict(4.0, false));
        window.push(verdict(5.0, false));
        assert_eq!(window.ok_count(), 2);
        assert!(!window.is_confirmed(3));
    }

    #[test]
    fn shrinking_drops_oldest() {
        let mut window = StabilityWindow::new(5);
        for i in 0..5 {
            window.push(verdict(i as f64, i % 2 == 0));
        }
        window.resize(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window.capacity, 2);
        assert_eq!(window.frames.back().map(|f| f.t_sec), Some(4.0));
    }
}
