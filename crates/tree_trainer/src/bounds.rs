//! Per-feature threshold intervals
//!
//! Each feature carries a half-open interval `[low, high)` of thresholds
//! still worth testing. Splitting narrows the interval of the split column
//! for each child; tables are copied, never shared, so siblings and
//! ancestors keep their own intervals.

use serde::Deserialize;
use std::cmp::Ordering;

use crate::config::BuilderConfig;
use crate::dataset::Dataset;
use crate::errors::{Result, TrainerError};

/// Half-open threshold interval `[low, high)`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// No threshold fits in the interval
    pub fn is_empty(&self) -> bool {
        !matches!(self.low.partial_cmp(&self.high), Some(Ordering::Less))
    }

    /// Thresholds from `low` up to but excluding `high`, `step` apart.
    ///
    /// There are `ceil((high - low) / step)` candidates. The first two are
    /// `low` and `low + step`; the rest are `low + i * delta` where `delta`
    /// is `(low + step) - low`, the step as it rounds at `low`. Thresholds
    /// must come out bit-identical between runs, so this rule is fixed.
    pub fn candidates(&self, step: f64) -> Thresholds {
        let count = ((self.high - self.low) / step).ceil();
        let count = if count > 0.0 { count as usize } else { 0 };

        Thresholds {
            low: self.low,
            step,
            delta: (self.low + step) - self.low,
            index: 0,
            count,
        }
    }
}

/// Iterator over the candidate thresholds of a [`Bound`]
#[derive(Debug, Clone)]
pub struct Thresholds {
    low: f64,
    step: f64,
    delta: f64,
    index: usize,
    count: usize,
}

impl Iterator for Thresholds {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.index >= self.count {
            return None;
        }

        let value = match self.index {
            0 => self.low,
            1 => self.low + self.step,
            i => self.low + i as f64 * self.delta,
        };
        self.index += 1;

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Thresholds {}

/// Threshold intervals for every feature of a dataset, by feature index
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTable {
    bounds: Vec<Bound>,
}

impl BoundTable {
    /// Same interval for `features` columns
    pub fn uniform(features: usize, bound: Bound) -> Self {
        Self {
            bounds: vec![bound; features],
        }
    }

    /// Initial intervals for a dataset: per-column overrides from the
    /// configuration, the default interval everywhere else.
    pub fn for_dataset(dataset: &Dataset, config: &BuilderConfig) -> Result<Self> {
        if let Some(unknown) = config
            .bounds
            .keys()
            .find(|name| dataset.feature_index(name).is_none())
        {
            return Err(TrainerError::InvalidInput(format!(
                "bound configured for unknown feature column `{unknown}`"
            )));
        }

        Ok(Self {
            bounds: dataset
                .feature_names
                .iter()
                .map(|name| config.bound_for(name))
                .collect(),
        })
    }

    pub fn get(&self, column: usize) -> Bound {
        self.bounds[column]
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Copy with the upper bound of `column` set to `high`
    pub fn with_high(&self, column: usize, high: f64) -> Self {
        let mut narrowed = self.clone();
        narrowed.bounds[column].high = high;
        narrowed
    }

    /// Copy with the lower bound of `column` set to `low`
    pub fn with_low(&self, column: usize, low: f64) -> Self {
        let mut narrowed = self.clone();
        narrowed.bounds[column].low = low;
        narrowed
    }

    /// No column has a threshold left to test
    pub fn is_exhausted(&self) -> bool {
        self.bounds.iter().all(Bound::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates() {
        let thresholds: Vec<f64> = Bound::new(0.0, 10.0).candidates(0.1).collect();

        assert_eq!(thresholds.len(), 100);
        assert_eq!(thresholds[0], 0.0);
        assert_eq!(thresholds[1], 0.1);
        assert_eq!(thresholds[19], 19.0 * 0.1);
        assert!(thresholds[19] > 1.9);
        assert!(*thresholds.last().unwrap() < 10.0);
    }

    #[test]
    fn test_candidates_from_rounded_start() {
        let low = 19.0 * 0.1;
        let thresholds: Vec<f64> = Bound::new(low, 10.0).candidates(0.1).collect();

        assert_eq!(thresholds[0], low);
        assert_eq!(thresholds[1], low + 0.1);
        // Stepping from a rounded start drifts below the decimal value
        assert!(thresholds[30] < 4.9);
        assert_eq!(format!("{:.1}", thresholds[30]), "4.9");
    }

    #[test]
    fn test_empty_bound() {
        assert!(Bound::new(1.0, 1.0).is_empty());
        assert!(Bound::new(2.0, 1.0).is_empty());
        assert_eq!(Bound::new(2.0, 1.0).candidates(0.1).count(), 0);
        assert_eq!(Bound::new(1.0, 1.05).candidates(0.1).count(), 1);
    }

    #[test]
    fn test_narrowing_copies() {
        let table = BoundTable::uniform(2, Bound::new(0.0, 10.0));
        let left = table.with_high(0, 1.8);
        let right = table.with_low(0, 1.9);

        assert_eq!(table.get(0), Bound::new(0.0, 10.0));
        assert_eq!(left.get(0), Bound::new(0.0, 1.8));
        assert_eq!(right.get(0), Bound::new(1.9, 10.0));
        assert_eq!(left.get(1), Bound::new(0.0, 10.0));
        assert!(!left.is_exhausted());
        assert!(BoundTable::uniform(2, Bound::new(3.0, 3.0)).is_exhausted());
    }

    #[test]
    fn test_unknown_bound_column() {
        let dataset = Dataset::new(
            vec!["x".to_string()],
            "species",
            vec![vec![1.0]],
            vec!["a".to_string()],
        )
        .unwrap();
        let mut config = BuilderConfig::default();
        config.bounds.insert("x".to_string(), Bound::new(0.5, 2.0));

        let table = BoundTable::for_dataset(&dataset, &config).unwrap();
        assert_eq!(table.get(0), Bound::new(0.5, 2.0));

        config.bounds.insert("y".to_string(), Bound::new(0.0, 1.0));
        assert!(matches!(
            BoundTable::for_dataset(&dataset, &config),
            Err(TrainerError::InvalidInput(_))
        ));
    }
}
