//! Dense distance matrix consumed by the tour solver.
//!
//! Forbidden moves are stored as [`FORBIDDEN`], which is `f64::INFINITY`.
//! There is no "very large but finite" sentinel: any finite entry is a real
//! travel cost, however costly.

use crate::error::{SolveError, SolveResult};

/// Cost of a move that must never be taken.
pub const FORBIDDEN: f64 = f64::INFINITY;

/// A dense n×n distance matrix stored in row-major order.
///
/// The diagonal carries no meaning and is ignored by the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given size with every move forbidden.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![FORBIDDEN; size * size],
            size,
        }
    }

    /// Creates a matrix from explicit rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> SolveResult<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(SolveError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            data.extend(values);
        }
        Ok(Self { data, size })
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Marks the move `from → to` as forbidden.
    pub fn forbid(&mut self, from: usize, to: usize) {
        self.set(from, to, FORBIDDEN);
    }

    pub fn is_forbidden(&self, from: usize, to: usize) -> bool {
        self.get(from, to) == FORBIDDEN
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.size..(from + 1) * self.size]
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if the off-diagonal entries are symmetric within `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let (forward, backward) = (self.get(i, j), self.get(j, i));
                if forward == backward {
                    continue;
                }
                if (forward - backward).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Total cost of walking `path` vertex by vertex.
    pub fn path_cost(&self, path: &[usize]) -> f64 {
        path.windows(2).map(|step| self.get(step[0], step[1])).sum()
    }
}
