//! Obstacle-aware distance matrix provider.
//!
//! Routes every pair of waypoints around the exclusion zones and keeps the
//! resulting roads so the chosen tours can be drawn later. Forbidden
//! corridors never get a road and are reported as [`FORBIDDEN`].

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::error::GeometryResult;
use crate::geometry::{Circle, Point};
use crate::matrix::{DistanceMatrix, FORBIDDEN};
use crate::road::Road;
use crate::router::ObstacleRouter;
use crate::traits::{DistanceMatrixProvider, Waypoint};

/// Builds distance matrices around circular exclusion zones.
#[derive(Debug, Clone, Default)]
pub struct ObstacleMatrix {
    router: ObstacleRouter,
    corridors: HashSet<(usize, usize)>,
}

impl ObstacleMatrix {
    pub fn new(obstacles: Vec<Circle>) -> Self {
        Self {
            router: ObstacleRouter::new(obstacles),
            corridors: HashSet::new(),
        }
    }

    /// Forbids direct travel between two waypoints, in both directions.
    pub fn forbid_corridor(mut self, a: usize, b: usize) -> Self {
        self.corridors.insert(corridor_key(a, b));
        self
    }

    pub fn with_corridors(mut self, corridors: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.corridors
            .extend(corridors.into_iter().map(|(a, b)| corridor_key(a, b)));
        self
    }

    pub fn is_forbidden(&self, a: usize, b: usize) -> bool {
        self.corridors.contains(&corridor_key(a, b))
    }

    pub fn router(&self) -> &ObstacleRouter {
        &self.router
    }

    /// Routes every allowed pair of locations.
    ///
    /// Each unordered pair is routed once from the lower index; the reverse
    /// direction gets the same road travelled backwards.
    pub fn roads_for(&self, locations: &[Point]) -> GeometryResult<RoadMatrix> {
        let n = locations.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| !self.is_forbidden(i, j))
            .collect();

        let routed = pairs
            .par_iter()
            .map(|&(i, j)| {
                self.router
                    .route(locations[i], locations[j])
                    .map(|road| (i, j, road))
            })
            .collect::<GeometryResult<Vec<_>>>()?;

        let mut roads = RoadMatrix::new(n);
        for (i, j, road) in routed {
            roads.set(j, i, road.reversed());
            roads.set(i, j, road);
        }

        debug!(
            locations = n,
            routed = pairs.len(),
            forbidden = self.corridors.len(),
            "built obstacle-aware road matrix"
        );
        Ok(roads)
    }
}

impl DistanceMatrixProvider for ObstacleMatrix {
    fn matrix_for(&self, locations: &[Point]) -> GeometryResult<DistanceMatrix> {
        Ok(self.roads_for(locations)?.distances())
    }
}

fn corridor_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Resolves corridors given as waypoint id pairs into index pairs.
///
/// Returns the first id that does not belong to any waypoint as the error.
pub fn corridor_indices<W: Waypoint>(
    waypoints: &[W],
    corridors: &[(W::Id, W::Id)],
) -> Result<Vec<(usize, usize)>, W::Id> {
    let index_of = |id: &W::Id| {
        waypoints
            .iter()
            .position(|waypoint| waypoint.id() == id)
            .ok_or_else(|| id.clone())
    };
    corridors
        .iter()
        .map(|(a, b)| Ok((index_of(a)?, index_of(b)?)))
        .collect()
}

/// Roads between every pair of locations; `None` where travel is forbidden.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoadMatrix {
    roads: Vec<Option<Road>>,
    size: usize,
}

impl RoadMatrix {
    fn new(size: usize) -> Self {
        Self {
            roads: vec![None; size * size],
            size,
        }
    }

    fn set(&mut self, from: usize, to: usize, road: Road) {
        self.roads[from * self.size + to] = Some(road);
    }

    pub fn get(&self, from: usize, to: usize) -> Option<&Road> {
        self.roads[from * self.size + to].as_ref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Road lengths as a distance matrix. Missing roads are forbidden and
    /// the diagonal is zero.
    pub fn distances(&self) -> DistanceMatrix {
        let mut matrix = DistanceMatrix::new(self.size);
        for i in 0..self.size {
            for j in 0..self.size {
                let distance = if i == j {
                    0.0
                } else {
                    self.get(i, j).map_or(FORBIDDEN, Road::length)
                };
                matrix.set(i, j, distance);
            }
        }
        matrix
    }
}
