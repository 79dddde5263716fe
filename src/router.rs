//! Shortest collision-free path between two points around circular zones.
//!
//! Only the blocking zone nearest to the start is bypassed: the road goes
//! along a tangent to that zone, around its boundary and along a tangent
//! to the destination. Chains of several blocking zones are not resolved.

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{
    Circle, EPSILON, Line, Point, distance_point_point, intersect, line_through_points,
    tangents_from_point,
};
use crate::road::{Arc, Road, Segment};

/// Router over a fixed set of exclusion zones.
#[derive(Debug, Clone, Default)]
pub struct ObstacleRouter {
    obstacles: Vec<Circle>,
}

impl ObstacleRouter {
    pub fn new(obstacles: Vec<Circle>) -> Self {
        Self { obstacles }
    }

    pub fn obstacles(&self) -> &[Circle] {
        &self.obstacles
    }

    pub fn route(&self, from: Point, to: Point) -> GeometryResult<Road> {
        route(from, to, &self.obstacles)
    }
}

/// Shortest road from `from` to `to` that does not cross any obstacle.
///
/// Returns a single segment when nothing blocks the straight line, and a
/// segment–arc–segment road around the nearest blocking circle otherwise.
/// Fails when either endpoint lies on or inside an obstacle.
pub fn route(from: Point, to: Point, obstacles: &[Circle]) -> GeometryResult<Road> {
    for circle in obstacles {
        for point in [from, to] {
            if circle.contains(&point) {
                return Err(GeometryError::Degenerate { point, circle: *circle });
            }
        }
    }

    let mut road = Road::new();
    if from == to {
        road.push(Segment::new(from, to));
        return Ok(road);
    }

    let line = line_through_points(&from, &to)?;
    match nearest_blocking(&line, &from, &to, obstacles) {
        Some(circle) => bypass(from, to, &circle),
        None => {
            road.push(Segment::new(from, to));
            Ok(road)
        }
    }
}

/// The obstacle whose crossing with the segment `[from, to]` is closest to
/// `from`.
fn nearest_blocking(line: &Line, from: &Point, to: &Point, obstacles: &[Circle]) -> Option<Circle> {
    let mut nearest: Option<(f64, Circle)> = None;
    for circle in obstacles {
        for crossing in intersect(line, circle) {
            if !within_span(&crossing, from, to) {
                continue;
            }
            let distance = distance_point_point(from, &crossing);
            if nearest.is_none_or(|(best, _)| distance < best) {
                nearest = Some((distance, *circle));
            }
        }
    }
    nearest.map(|(_, circle)| circle)
}

/// True when `point` lies in the bounding box spanned by `from` and `to`.
fn within_span(point: &Point, from: &Point, to: &Point) -> bool {
    let (min_x, max_x) = (from.x.min(to.x), from.x.max(to.x));
    let (min_y, max_y) = (from.y.min(to.y), from.y.max(to.y));
    point.x >= min_x - EPSILON
        && point.x <= max_x + EPSILON
        && point.y >= min_y - EPSILON
        && point.y <= max_y + EPSILON
}

/// Shortest of the four tangent–arc–tangent roads around `circle`.
fn bypass(from: Point, to: Point, circle: &Circle) -> GeometryResult<Road> {
    let from_tangents = tangents_from_point(&from, circle)?;
    let to_tangents = tangents_from_point(&to, circle)?;

    let mut best: Option<Road> = None;
    for from_tangent in &from_tangents {
        let touch_from = touch_point(from_tangent, &from, circle)?;
        for to_tangent in &to_tangents {
            let touch_to = touch_point(to_tangent, &to, circle)?;

            let mut candidate = Road::new();
            candidate.push(Segment::new(from, touch_from));
            candidate.push(Arc::new(*circle, touch_from, touch_to));
            candidate.push(Segment::new(touch_to, to));

            if best.as_ref().is_none_or(|road| candidate.length() < road.length()) {
                best = Some(candidate);
            }
        }
    }
    best.ok_or(GeometryError::Degenerate { point: from, circle: *circle })
}

/// Where a tangent line from `origin` touches `circle`.
fn touch_point(tangent: &Line, origin: &Point, circle: &Circle) -> GeometryResult<Point> {
    intersect(tangent, circle)
        .first()
        .copied()
        .ok_or(GeometryError::Degenerate { point: *origin, circle: *circle })
}
