//! Shrinking cost matrix used by the branch-and-bound search.
//!
//! Rows and columns are deleted as edges get fixed, so every row and
//! column carries the original vertex it stands for. All matrix operations
//! of Little's algorithm live here: reduction, zero coefficients, branch
//! edge selection and row/column deletion.

use crate::matrix::{DistanceMatrix, FORBIDDEN};

/// Square cost matrix whose rows and columns remember their vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: Vec<usize>,
    cols: Vec<usize>,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Copies a distance matrix, forbidding the diagonal.
    pub fn from_distances(matrix: &DistanceMatrix) -> Self {
        let n = matrix.size();
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(if i == j { FORBIDDEN } else { matrix.get(i, j) });
            }
        }
        Self {
            rows: (0..n).collect(),
            cols: (0..n).collect(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols.len() + j]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let width = self.cols.len();
        self.data[i * width + j] = value;
    }

    /// Forbids the cell at row `i`, column `j`.
    pub fn forbid(&mut self, i: usize, j: usize) {
        self.set(i, j, FORBIDDEN);
    }

    /// Original vertex of row `i`.
    pub fn row_vertex(&self, i: usize) -> usize {
        self.rows[i]
    }

    /// Original vertex of column `j`.
    pub fn col_vertex(&self, j: usize) -> usize {
        self.cols[j]
    }

    /// Current row of an original vertex, if it has not been deleted.
    pub fn row_of(&self, vertex: usize) -> Option<usize> {
        self.rows.iter().position(|&v| v == vertex)
    }

    /// Current column of an original vertex, if it has not been deleted.
    pub fn col_of(&self, vertex: usize) -> Option<usize> {
        self.cols.iter().position(|&v| v == vertex)
    }

    fn row_min(&self, i: usize, skip_col: Option<usize>) -> f64 {
        (0..self.cols.len())
            .filter(|&j| Some(j) != skip_col)
            .map(|j| self.get(i, j))
            .fold(FORBIDDEN, f64::min)
    }

    fn col_min(&self, j: usize, skip_row: Option<usize>) -> f64 {
        (0..self.rows.len())
            .filter(|&i| Some(i) != skip_row)
            .map(|i| self.get(i, j))
            .fold(FORBIDDEN, f64::min)
    }

    /// First row whose every entry is forbidden.
    pub fn forbidden_row(&self) -> Option<usize> {
        (0..self.rows.len()).find(|&i| self.row_min(i, None) == FORBIDDEN)
    }

    /// First column whose every entry is forbidden.
    pub fn forbidden_col(&self) -> Option<usize> {
        (0..self.cols.len()).find(|&j| self.col_min(j, None) == FORBIDDEN)
    }

    /// Subtracts every row minimum, then every column minimum.
    ///
    /// Returns the sum of the subtracted minima, which is a lower bound on
    /// the cost still to pay, together with the reduced matrix. Rows and
    /// columns that are entirely forbidden are left alone, but their
    /// infinite minimum makes the returned bound infinite.
    pub fn reduce(&self) -> (f64, CostMatrix) {
        let mut reduced = self.clone();
        let mut total = 0.0;

        for i in 0..reduced.rows.len() {
            let min = reduced.row_min(i, None);
            total += min;
            if min == FORBIDDEN || min == 0.0 {
                continue;
            }
            for j in 0..reduced.cols.len() {
                let value = reduced.get(i, j);
                reduced.set(i, j, value - min);
            }
        }

        for j in 0..reduced.cols.len() {
            let min = reduced.col_min(j, None);
            total += min;
            if min == FORBIDDEN || min == 0.0 {
                continue;
            }
            for i in 0..reduced.rows.len() {
                let value = reduced.get(i, j);
                reduced.set(i, j, value - min);
            }
        }

        (total, reduced)
    }

    /// Penalty for not taking the zero at `(i, j)`: the cheapest other way
    /// out of row `i` plus the cheapest other way into column `j`.
    ///
    /// When both alternatives are forbidden the coefficient is zero.
    pub fn zero_coefficient(&self, i: usize, j: usize) -> f64 {
        let row = self.row_min(i, Some(j));
        let col = self.col_min(j, Some(i));
        if row == FORBIDDEN && col == FORBIDDEN {
            return 0.0;
        }
        row + col
    }

    /// The zero with the largest coefficient, first in row-major order on
    /// ties.
    pub fn select_branch_edge(&self) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for i in 0..self.rows.len() {
            for j in 0..self.cols.len() {
                if self.get(i, j) != 0.0 {
                    continue;
                }
                let coefficient = self.zero_coefficient(i, j);
                if best.is_none_or(|(_, top)| coefficient > top) {
                    best = Some(((i, j), coefficient));
                }
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// The matrix with row `i` and column `j` deleted.
    pub fn without(&self, i: usize, j: usize) -> CostMatrix {
        let width = self.cols.len();
        let data = self
            .data
            .iter()
            .enumerate()
            .filter(|(index, _)| index / width != i && index % width != j)
            .map(|(_, &value)| value)
            .collect();

        let mut rows = self.rows.clone();
        rows.remove(i);
        let mut cols = self.cols.clone();
        cols.remove(j);

        CostMatrix { rows, cols, data }
    }
}
