//! Core domain traits for the planner.
//!
//! These are intentionally minimal. Scenario formats implement them for
//! their own waypoint types.

use std::hash::Hash;

use crate::error::GeometryResult;
use crate::geometry::Point;
use crate::matrix::DistanceMatrix;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A location the fleet has to visit.
pub trait Waypoint {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Planar coordinates of the waypoint.
    fn location(&self) -> Point;
}

/// Provides a distance matrix for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Point]) -> GeometryResult<DistanceMatrix>;
}
