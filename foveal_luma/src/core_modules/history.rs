// THEORY:
// `BrightnessHistory` keeps the per-frame brightness values of the current
// session for the end-of-run statistics. It is a sliding window with a fixed
// capacity: once full, the oldest value is dropped for every new one, so memory
// stays bounded however long a stream plays. Nothing here outlives the session.

use std::collections::VecDeque;
use std::fmt;

/// Coarse brightness category of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessCategory {
    Dark,
    Medium,
    Bright,
}

impl BrightnessCategory {
    const DARK_BELOW: f64 = 0.33;
    const MEDIUM_BELOW: f64 = 0.67;

    pub fn classify(brightness: f64) -> Self {
        if brightness < Self::DARK_BELOW {
            Self::Dark
        } else if brightness < Self::MEDIUM_BELOW {
            Self::Medium
        } else {
            Self::Bright
        }
    }
}

impl fmt::Display for BrightnessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dark => "dark",
            Self::Medium => "medium",
            Self::Bright => "bright",
        })
    }
}

/// Summary statistics over the retained window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl BrightnessStats {
    pub fn category(&self) -> BrightnessCategory {
        BrightnessCategory::classify(self.mean)
    }
}

#[derive(Debug, Clone)]
pub struct BrightnessHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl BrightnessHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, brightness: f64) {
        self.values.push_back(brightness);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn stats(&self) -> Option<BrightnessStats> {
        let count = self.values.len();
        if count == 0 {
            return None;
        }
        let mean = self.values.iter().sum::<f64>() / count as f64;
        let variance = self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let (min, max) = self
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Some(BrightnessStats {
            count,
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_no_stats() {
        assert!(BrightnessHistory::new(4).stats().is_none());
    }

    #[test]
    fn stats_over_the_window() {
        let mut history = BrightnessHistory::new(10);
        for value in [0.2, 0.4, 0.6] {
            history.push(value);
        }
        let stats = history.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 0.4).abs() < 1e-12);
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.6);
        assert!((stats.std_dev - (0.08f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.category(), BrightnessCategory::Medium);
    }

    #[test]
    fn oldest_values_fall_out() {
        let mut history = BrightnessHistory::new(2);
        history.push(0.1);
        history.push(0.2);
        history.push(0.9);
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(0.9));
        assert_eq!(history.stats().unwrap().min, 0.2);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest_value() {
        let mut history = BrightnessHistory::new(0);
        history.push(0.5);
        history.push(0.7);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.latest(), Some(0.7));
    }

    #[test]
    fn categories_follow_the_thresholds() {
        assert_eq!(BrightnessCategory::classify(0.0), BrightnessCategory::Dark);
        assert_eq!(BrightnessCategory::classify(0.329), BrightnessCategory::Dark);
        assert_eq!(BrightnessCategory::classify(0.33), BrightnessCategory::Medium);
        assert_eq!(BrightnessCategory::classify(0.67), BrightnessCategory::Bright);
        assert_eq!(BrightnessCategory::Bright.to_string(), "bright");
    }
}
