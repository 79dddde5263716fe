//! Error types for geometry queries, the tour solver and scenario planning.

use std::fmt;

use thiserror::Error;

use crate::geometry::{Circle, Point};

/// Result type alias for geometry and routing queries.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Result type alias for the tour solver.
pub type SolveResult<T> = Result<T, SolveError>;

/// Result type alias for scenario loading and planning.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors raised by the geometry kernel and the obstacle router.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A tangent or bypass was requested from a point on or inside a zone.
    #[error("point {point} lies on or inside {circle}")]
    Degenerate { point: Point, circle: Circle },

    /// A line cannot be defined by a single point.
    #[error("cannot build a line through coincident points at {0}")]
    CoincidentPoints(Point),
}

/// Which side of the cost matrix an infeasibility was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// Errors raised by the branch-and-bound tour solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("distance matrix is empty")]
    EmptyMatrix,

    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("entry ({row}, {col}) is {value}; distances must be non-negative")]
    InvalidEntry { row: usize, col: usize, value: f64 },

    #[error("origin {origin} is out of range for {size} vertices")]
    InvalidOrigin { origin: usize, size: usize },

    #[error("a fleet of {fleet} cannot be spread over {customers} non-origin vertices")]
    InvalidFleet { fleet: usize, customers: usize },

    /// Some vertex can never be entered or left.
    #[error("vertex {vertex} is unreachable: its {axis} is entirely forbidden")]
    Infeasible { vertex: usize, axis: Axis },

    /// The search finished without finding any closed tour.
    #[error("no closed tour visits every vertex")]
    NoFeasibleTour,

    /// The node or time budget ran out before any tour was completed.
    #[error("search budget exhausted after {nodes} nodes without a complete tour")]
    BudgetExhausted { nodes: usize },
}

/// Errors raised while loading or planning a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scenario has no data points")]
    NoPoints,

    #[error("forbidden line references unknown point id {0}")]
    UnknownPoint(i64),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}
