//! JSON scenario format and end-to-end planning.
//!
//! A scenario lists the points to visit, the first of which is the origin
//! every vehicle leaves from, together with forbidden corridors between
//! pairs of points and circular forbidden zones:
//!
//! ```json
//! {
//!   "n": 2,
//!   "data_points": [{"id": 0, "x": 0, "y": 0}, {"id": 1001, "x": 30, "y": 40}],
//!   "forbidden_lines": [{"id1": 1001, "id2": 1002}],
//!   "data_forbidden_zone": [{"x": 45.1, "y": 44.1, "r": 11}]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ScenarioError, ScenarioResult};
use crate::geometry::{Circle, Point};
use crate::obstacle_matrix::{ObstacleMatrix, RoadMatrix, corridor_indices};
use crate::road::Road;
use crate::solver::{Solution, SolveOptions, Tour, solve};
use crate::traits::Waypoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

impl Waypoint for DataPoint {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Direct travel between two points is not allowed, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenLine {
    pub id1: i64,
    pub id2: i64,
}

fn default_fleet_count() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Number of vehicles.
    #[serde(rename = "n", default = "default_fleet_count")]
    pub fleet_count: usize,
    pub data_points: Vec<DataPoint>,
    #[serde(default)]
    pub forbidden_lines: Vec<ForbiddenLine>,
    #[serde(default, rename = "data_forbidden_zone")]
    pub forbidden_zones: Vec<Circle>,
}

impl Scenario {
    pub fn from_json(json: &str) -> ScenarioResult<Self> {
        serde_json::from_str::<Self>(json)?.checked()
    }

    pub fn from_reader(reader: impl Read) -> ScenarioResult<Self> {
        serde_json::from_reader::<_, Self>(reader)?.checked()
    }

    pub fn from_path(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn checked(self) -> ScenarioResult<Self> {
        if self.data_points.is_empty() {
            return Err(ScenarioError::NoPoints);
        }
        Ok(self)
    }

    pub fn locations(&self) -> Vec<Point> {
        self.data_points.iter().map(Waypoint::location).collect()
    }

    /// Matrix builder with this scenario's zones and corridors.
    pub fn matrix_builder(&self) -> ScenarioResult<ObstacleMatrix> {
        let pairs: Vec<(i64, i64)> = self
            .forbidden_lines
            .iter()
            .map(|line| (line.id1, line.id2))
            .collect();
        let corridors =
            corridor_indices(&self.data_points, &pairs).map_err(ScenarioError::UnknownPoint)?;

        Ok(ObstacleMatrix::new(self.forbidden_zones.clone()).with_corridors(corridors))
    }

    /// Routes every pair of points and solves for the scenario's fleet.
    ///
    /// The fleet size always comes from the scenario; every other option is
    /// taken from `options`.
    pub fn plan(&self, options: SolveOptions) -> ScenarioResult<Plan> {
        if self.data_points.is_empty() {
            return Err(ScenarioError::NoPoints);
        }

        info!(
            points = self.data_points.len(),
            fleet = self.fleet_count,
            zones = self.forbidden_zones.len(),
            corridors = self.forbidden_lines.len(),
            "planning scenario"
        );

        let roads = self.matrix_builder()?.roads_for(&self.locations())?;
        let solution = solve(
            &roads.distances(),
            SolveOptions {
                fleet_count: self.fleet_count,
                ..options
            },
        )?;

        Ok(Plan {
            ids: self.data_points.iter().map(|point| point.id).collect(),
            solution,
            roads,
        })
    }
}

/// Planned tours together with the roads they travel.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Point id of every vertex index.
    pub ids: Vec<i64>,
    pub solution: Solution,
    pub roads: RoadMatrix,
}

impl Plan {
    /// Point ids along a tour.
    pub fn tour_ids(&self, tour: &Tour) -> Vec<i64> {
        tour.vertices.iter().map(|&vertex| self.ids[vertex]).collect()
    }

    /// Roads travelled along a tour, leg by leg.
    pub fn tour_roads(&self, tour: &Tour) -> Vec<&Road> {
        tour.vertices
            .windows(2)
            .filter_map(|leg| self.roads.get(leg[0], leg[1]))
            .collect()
    }
}
