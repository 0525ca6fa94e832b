//! Entropy and information gain over row subsets

use crate::dataset::Subset;

/// Shannon entropy, in bits, of the subset's label distribution.
///
/// An empty subset has entropy 0.
pub fn entropy(subset: &Subset<'_>) -> f64 {
    if subset.is_empty() {
        return 0.0;
    }

    let total = subset.len() as f64;
    let mut entropy = 0.0;

    for &count in subset.class_counts().values() {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }

    entropy
}

/// Information gained by splitting `subset` on `column < threshold`.
///
/// `column` is a feature index of the subset's dataset. A split that leaves
/// one side empty is legal and scores no better than the parent entropy.
/// The subset must not be empty.
pub fn gain(subset: &Subset<'_>, column: usize, threshold: f64) -> f64 {
    debug_assert!(!subset.is_empty(), "gain of an empty subset");

    let (left, right) = subset.partition(column, threshold);
    let total = subset.len() as f64;

    let mut gain = entropy(subset);
    gain -= (left.len() as f64 / total) * entropy(&left);
    gain -= (right.len() as f64 / total) * entropy(&right);

    gain
}
