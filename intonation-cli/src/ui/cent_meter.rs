//! # Cent Meter
//!
//! Text rendition of the intonation meter. The bar grows with the absolute
//! cent error of the latest frame and is capped at `METER_RANGE`; the marker
//! shows where the in-tune window ends.

/// Maximum cent deviation shown by the meter.
const METER_RANGE: f64 = 50.0;

/// Number of character cells in the bar.
const METER_WIDTH: usize = 25;

pub struct CentMeter {
    /// Absolute deviation of the latest frame (None when there is no target)
    cents: Option<f64>,
    tolerance: f64,
}

impl CentMeter {
    /// # Arguments
    /// * `cents` - Absolute cent deviation, `None` for the neutral state
    /// * `tolerance` - In-tune half-width, drawn as a `|` marker
    pub fn new(cents: Option<f64>, tolerance: f64) -> Self {
        Self { cents, tolerance }
    }

    fn cell_for(cents: f64) -> usize {
        let clamped = cents.clamp(0.0, METER_RANGE);
        ((clamped / METER_RANGE) * METER_WIDTH as f64).round() as usize
    }

    /// Renders `[####....|.......]`, or a blank bar without a target.
    pub fn render(&self) -> String {
        let marker = Self::cell_for(self.tolerance).min(METER_WIDTH - 1);
        let filled = self.cents.map_or(0, Self::cell_for);

        let bar: String = (0..METER_WIDTH)
            .map(|cell| {
                if cell < filled {
                    '#'
                } else if cell == marker {
                    '|'
                } else {
                    '.'
                }
            })
            .collect();
        let overflow = if self.cents.is_some_and(|c| c > METER_RANGE) { '>' } else { ']' };
        format!("[{}{}", bar, overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_meter_is_empty() {
        let meter = CentMeter::new(None, 25.0);
        let rendered = meter.render();
        assert_eq!(rendered.len(), METER_WIDTH + 2);
        assert!(!rendered.contains('#'));
        assert!(rendered.contains('|'));
    }

    #[test]
    fn bar_scales_with_error() {
        let small = CentMeter::new(Some(10.0), 25.0).render();
        let large = CentMeter::new(Some(40.0), 25.0).render();
        let count = |s: &str| s.chars().filter(|c| *c == '#').count();
        assert_eq!(count(&small), 5);
        assert_eq!(count(&large), 20);
    }

    #[test]
    fn overflow_is_flagged() {
        let meter = CentMeter::new(Some(300.0), 25.0).render();
        assert!(meter.ends_with('>'));
        assert_eq!(meter.chars().filter(|c| *c == '#').count(), METER_WIDTH);
    }
}
