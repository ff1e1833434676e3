//! [PlaceTable] holds the output of the place probability calculation: one row per rank and one
//! column per runner. Row 0 always reproduces the win probabilities it was derived from.

use std::ops::Index;

use crate::linear::Matrix;
use crate::probs::SliceExt;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceTable {
    matrix: Matrix<f64>,
}
impl PlaceTable {
    pub(crate) fn new(matrix: Matrix<f64>) -> Self {
        Self { matrix }
    }

    pub fn ranks(&self) -> usize {
        self.matrix.rows()
    }

    pub fn runners(&self) -> usize {
        self.matrix.cols()
    }

    pub fn win_probs(&self) -> &[f64] {
        self.matrix.row_slice(0)
    }

    /// Probabilities of each runner finishing exactly in `rank` (zero-based).
    pub fn rank(&self, rank: usize) -> &[f64] {
        self.matrix.row_slice(rank)
    }

    /// Probabilities of `runner` finishing in each rank, from the win downwards.
    pub fn runner(&self, runner: usize) -> impl Iterator<Item = f64> + '_ {
        self.matrix.col(runner).copied()
    }

    /// Sums each rank across all runners. Every element is close to 1 for a well-formed field, but
    /// the calculator does not renormalise across ranks.
    pub fn rank_sums(&self) -> Vec<f64> {
        (0..self.ranks()).map(|rank| self.rank(rank).sum()).collect()
    }

    /// For each runner, the probability of finishing anywhere in the top `places`.
    pub fn top_n(&self, places: usize) -> Vec<f64> {
        debug_assert!(
            places <= self.ranks(),
            "cannot condense {places} places from a table of {} ranks",
            self.ranks()
        );
        let mut summary = vec![0.0; self.runners()];
        for rank in 0..places {
            for (runner, prob) in self.rank(rank).iter().enumerate() {
                summary[runner] += prob;
            }
        }
        summary
    }

    pub fn as_matrix(&self) -> &Matrix<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> Matrix<f64> {
        self.matrix
    }
}

impl Index<(usize, usize)> for PlaceTable {
    type Output = f64;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.matrix[index]
    }
}

impl From<PlaceTable> for Matrix<f64> {
    fn from(table: PlaceTable) -> Self {
        table.into_matrix()
    }
}
