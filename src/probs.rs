//! Utilities for working with probabilities.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn all_within_unit(&self) -> bool;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Whether every element lies in the closed interval [0, 1].
    fn all_within_unit(&self) -> bool {
        self.iter().all(|p| (0.0..=1.0).contains(p))
    }
}
