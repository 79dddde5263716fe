//! sortie-planner core
//!
//! Plans closed tours for a fleet of vehicles leaving a shared origin,
//! routing every leg around circular forbidden zones and solving the
//! resulting travelling-salesman problem exactly with Little's
//! branch-and-bound.

pub mod error;
pub mod geometry;
pub mod road;
pub mod router;
pub mod matrix;
pub mod traits;
pub mod euclidean;
pub mod obstacle_matrix;
pub mod reduction;
pub mod solver;
pub mod scenario;

pub use error::{GeometryError, ScenarioError, SolveError};
pub use geometry::{Circle, EPSILON, Point};
pub use matrix::{DistanceMatrix, FORBIDDEN};
pub use road::Road;
pub use scenario::{Plan, Scenario};
pub use solver::{Solution, SolveOptions, Tour, solve};
