//! Straight-line distance matrix provider.
//!
//! Ignores exclusion zones and corridors entirely. Useful as a quick
//! estimate and as a lower bound for obstacle-aware distances.

use crate::error::GeometryResult;
use crate::geometry::{Point, distance_point_point};
use crate::matrix::DistanceMatrix;
use crate::traits::DistanceMatrixProvider;

#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMatrix;

impl EuclideanMatrix {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, locations: &[Point]) -> DistanceMatrix {
        let n = locations.len();
        let mut matrix = DistanceMatrix::new(n);

        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                let distance = if i == j { 0.0 } else { distance_point_point(from, to) };
                matrix.set(i, j, distance);
            }
        }

        matrix
    }
}

impl DistanceMatrixProvider for EuclideanMatrix {
    fn matrix_for(&self, locations: &[Point]) -> GeometryResult<DistanceMatrix> {
        Ok(self.build(locations))
    }
}
