//! Planar geometry kernel.
//!
//! Points, circles and implicit lines, plus the intersection and tangency
//! queries the obstacle router is built on. Every equality check goes
//! through [`EPSILON`]; floating values are never compared exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};

/// Absolute tolerance shared by every geometric comparison in the crate.
pub const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// A point in the plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance_point_point(self, other)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Deserialize)]
struct RawCircle {
    x: f64,
    y: f64,
    r: f64,
}

impl From<RawCircle> for Circle {
    fn from(raw: RawCircle) -> Self {
        Circle::new(raw.x, raw.y, raw.r)
    }
}

/// A circular exclusion zone. The radius is always stored non-negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "RawCircle")]
pub struct Circle {
    x: f64,
    y: f64,
    r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r: r.abs() }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn radius(&self) -> f64 {
        self.r
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True when `point` lies inside the circle or on its boundary.
    pub fn contains(&self, point: &Point) -> bool {
        distance_point_point(&self.center(), point) <= self.r + EPSILON
    }
}

impl PartialEq for Circle {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.r, other.r) && self.center() == other.center()
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circle at ({}, {}) r={}", self.x, self.y, self.r)
    }
}

/// A line in implicit form `a·x + b·y + c = 0`.
///
/// Two lines are equal when their coefficients agree up to a common
/// nonzero factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    fn normal_length(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Coefficients scaled so that `(a, b)` is a unit normal.
    fn normalized(&self) -> (f64, f64, f64) {
        let scale = self.normal_length();
        if scale == 0.0 {
            return (self.a, self.b, self.c);
        }
        (self.a / scale, self.b / scale, self.c / scale)
    }
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        let (a1, b1, c1) = self.normalized();
        let (a2, b2, c2) = other.normalized();
        let sign = if a1 * a2 + b1 * b2 < 0.0 { -1.0 } else { 1.0 };
        approx_eq(a1, sign * a2) && approx_eq(b1, sign * b2) && approx_eq(c1, sign * c2)
    }
}

/// Line through two distinct points.
///
/// Vertical lines are returned as `x + c = 0`; every other line is
/// normalized to `b = 1`.
pub fn line_through_points(p1: &Point, p2: &Point) -> GeometryResult<Line> {
    if p1 == p2 {
        return Err(GeometryError::CoincidentPoints(*p1));
    }
    if approx_eq(p1.x, p2.x) {
        return Ok(Line::new(1.0, 0.0, -p1.x));
    }
    let a = (p1.y - p2.y) / (p2.x - p1.x);
    let b = 1.0;
    let c = -(a * p1.x) - b * p1.y;
    Ok(Line::new(a, b, c))
}

/// Points where `line` meets `circle`: none, one (tangency) or two.
pub fn intersect(line: &Line, circle: &Circle) -> Vec<Point> {
    let normal = line.normal_length();
    if normal == 0.0 {
        return Vec::new();
    }

    // Signed distance from the center to the line.
    let distance = (line.a * circle.x + line.b * circle.y + line.c) / normal;
    if distance.abs() - circle.r > EPSILON / 10.0 {
        return Vec::new();
    }
    let r = circle.r.max(distance.abs());

    let dir_sin = line.a / normal;
    let dir_cos = line.b / normal;
    let foot_x = circle.x - distance * dir_sin;
    let foot_y = circle.y - distance * dir_cos;
    let half_chord = (r * r - distance * distance).max(0.0).sqrt();

    let first = Point::new(foot_x + half_chord * dir_cos, foot_y - half_chord * dir_sin);
    let second = Point::new(foot_x - half_chord * dir_cos, foot_y + half_chord * dir_sin);
    if first == second {
        vec![first]
    } else {
        vec![first, second]
    }
}

/// The two tangent lines from an external point to a circle.
///
/// Fails with [`GeometryError::Degenerate`] when the point lies on or
/// inside the circle, where the tangent angle is undefined.
pub fn tangents_from_point(point: &Point, circle: &Circle) -> GeometryResult<[Line; 2]> {
    let dx = circle.x - point.x;
    let dy = circle.y - point.y;
    let distance = dx.hypot(dy);
    if distance <= circle.r + EPSILON {
        return Err(GeometryError::Degenerate {
            point: *point,
            circle: *circle,
        });
    }

    let bearing = dy.atan2(dx);
    let spread = (circle.r / distance).asin();
    let first = Point::new(
        circle.x + circle.r * (bearing - spread).sin(),
        circle.y - circle.r * (bearing - spread).cos(),
    );
    let second = Point::new(
        circle.x - circle.r * (bearing + spread).sin(),
        circle.y + circle.r * (bearing + spread).cos(),
    );

    Ok([
        line_through_points(&first, point)?,
        line_through_points(&second, point)?,
    ])
}

/// Points on `line` at `distance` from `point`.
pub fn points_at_distance(line: &Line, point: &Point, distance: f64) -> Vec<Point> {
    intersect(line, &Circle::new(point.x, point.y, distance))
}

pub fn distance_point_line(point: &Point, line: &Line) -> f64 {
    (line.a * point.x + line.b * point.y + line.c).abs() / line.normal_length()
}

pub fn distance_point_point(p1: &Point, p2: &Point) -> f64 {
    (p2.x - p1.x).hypot(p2.y - p1.y)
}

/// Real roots of `a·x² + b·x + c = 0`.
///
/// With `a = 0` the equation is linear and yields its single root (or
/// nothing when `b` is zero as well).
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        if b == 0.0 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let root = discriminant.sqrt();
    let t1 = (-b + root) / (2.0 * a);
    let t2 = (-b - root) / (2.0 * a);
    if discriminant > 0.0 {
        vec![t1, t2]
    } else {
        vec![t1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_point_equality_is_tolerant() {
        let p = Point::new(1.0, 2.0);
        assert_eq!(p, Point::new(1.0 + EPSILON / 2.0, 2.0 - EPSILON / 2.0));
        assert_ne!(p, Point::new(1.0 + EPSILON * 10.0, 2.0));
        assert_ne!(p, Point::new(1.0, 2.0 + EPSILON * 10.0));
    }

    #[test]
    fn test_circle_radius_is_absolute() {
        let circle = Circle::new(1.0, 1.0, -3.0);
        assert_eq!(circle.radius(), 3.0);
        assert_eq!(circle, Circle::new(1.0, 1.0, 3.0));
        assert_ne!(circle, Circle::new(1.0, 1.0, 3.1));
        assert_ne!(circle, Circle::new(1.1, 1.0, 3.0));
    }

    #[test]
    fn test_circle_deserializes_absolute_radius() {
        let circle: Circle = serde_json::from_str(r#"{"x": 2, "y": 3, "r": -4}"#).unwrap();
        assert_eq!(circle, Circle::new(2.0, 3.0, 4.0));
        assert_eq!(circle.radius(), 4.0);
    }

    #[test]
    fn test_line_equality_up_to_scale() {
        assert_eq!(Line::new(1.0, 3.0, 0.0), Line::new(2.0, 6.0, 0.0));
        assert_eq!(Line::new(1.0, 3.0, 2.0), Line::new(-0.5, -1.5, -1.0));
        assert_eq!(Line::new(1.1458332, 1.0, -0.208333), Line::new(11.0, 9.6, -2.0));
        assert_ne!(Line::new(1.0, 3.0, 0.0), Line::new(1.0, -3.0, 0.0));
        assert_ne!(Line::new(1.0, 3.0, 0.0), Line::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn test_line_through_points() {
        let horizontal = line_through_points(&Point::new(2.0, 3.0), &Point::new(-6.0, 3.0)).unwrap();
        assert_eq!(horizontal, Line::new(0.0, 1.0, -3.0));

        let vertical = line_through_points(&Point::new(-6.0, 0.0), &Point::new(-6.0, 3.0)).unwrap();
        assert_eq!(vertical.a, 1.0);
        assert_eq!(vertical.b, 0.0);
        assert_eq!(vertical, Line::new(1.0, 0.0, 6.0));

        let slanted = line_through_points(&Point::new(0.0, 2.0), &Point::new(4.0, 0.0)).unwrap();
        assert_eq!(slanted, Line::new(1.0, 2.0, -4.0));
    }

    #[test]
    fn test_line_through_coincident_points_fails() {
        let p = Point::new(1.0, 1.0);
        assert_eq!(
            line_through_points(&p, &p),
            Err(GeometryError::CoincidentPoints(p))
        );
    }

    #[test]
    fn test_intersect_tangent_lines() {
        let x_is_two = Line::new(2.0, 0.0, -4.0);
        let y_is_two = Line::new(0.0, 3.0, -6.0);
        let origin_circle = Circle::new(0.0, 0.0, 2.0);
        let offset_circle = Circle::new(4.0, 4.0, 2.0);

        assert_eq!(intersect(&x_is_two, &origin_circle), vec![Point::new(2.0, 0.0)]);
        assert_eq!(intersect(&x_is_two, &offset_circle), vec![Point::new(2.0, 4.0)]);
        assert_eq!(intersect(&y_is_two, &origin_circle), vec![Point::new(0.0, 2.0)]);
        assert_eq!(intersect(&y_is_two, &offset_circle), vec![Point::new(4.0, 2.0)]);
    }

    #[test]
    fn test_intersect_secant_line() {
        let line = Line::new(0.0, 3.0, -6.0);
        let circle = Circle::new(10.0, 1.0, 12.0);
        let points = intersect(&line, &circle);
        assert_eq!(points.len(), 2);
        assert!(points.contains(&Point::new(21.958_260_743_101_4, 2.0)));
        assert!(points.contains(&Point::new(-1.958_260_743_101_4, 2.0)));
    }

    #[test]
    fn test_intersect_misses() {
        let line = Line::new(0.0, 1.0, -10.0);
        assert!(intersect(&line, &Circle::new(0.0, 0.0, 2.0)).is_empty());
    }

    #[test]
    fn test_intersect_points_lie_on_both() {
        let line = Line::new(12.0, 3.0, 4.0);
        let circle = Circle::new(0.0, 0.0, 2.0);
        let points = intersect(&line, &circle);
        assert_eq!(points.len(), 2);
        for point in points {
            assert!(distance_point_line(&point, &line) < EPSILON);
            assert!(close(distance_point_point(&point, &circle.center()), 2.0));
        }
    }

    #[test]
    fn test_tangents_touch_circle() {
        let point = Point::new(0.0, 0.0);
        let circle = Circle::new(19.95, 0.0, 6.31);
        let tangents = tangents_from_point(&point, &circle).unwrap();
        for tangent in &tangents {
            assert!(close(distance_point_line(&circle.center(), tangent), 6.31));
            assert!(distance_point_line(&point, tangent) < EPSILON);
        }
        assert_ne!(tangents[0], tangents[1]);
    }

    #[test]
    fn test_tangents_from_inside_fail() {
        let circle = Circle::new(0.0, 0.0, 5.0);
        assert!(matches!(
            tangents_from_point(&Point::new(1.0, 1.0), &circle),
            Err(GeometryError::Degenerate { .. })
        ));
        assert!(matches!(
            tangents_from_point(&Point::new(5.0, 0.0), &circle),
            Err(GeometryError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_points_at_distance() {
        let line = Line::new(0.0, 1.0, 0.0);
        let points = points_at_distance(&line, &Point::new(1.0, 0.0), 3.0);
        assert_eq!(points.len(), 2);
        assert!(points.contains(&Point::new(4.0, 0.0)));
        assert!(points.contains(&Point::new(-2.0, 0.0)));
    }

    #[test]
    fn test_distances() {
        assert!(close(distance_point_point(&Point::new(0.0, -1.0), &Point::new(3.0, 3.0)), 5.0));
        assert!(close(
            distance_point_point(&Point::new(0.0, -1.0), &Point::new(17.0, -4.0)),
            17.262_676_501_632_068
        ));
        assert!(close(distance_point_line(&Point::new(2.0, 2.0), &Line::new(1.0, -1.0, 0.0)), 0.0));
        assert!(close(
            distance_point_line(&Point::new(12.0, -8.0), &Line::new(5.0, 0.0, 2.77)),
            12.554
        ));
    }

    #[test]
    fn test_solve_quadratic() {
        assert!(solve_quadratic(1.0, 1.0, 1.0).is_empty());

        let roots = solve_quadratic(2.0, 7.0, 3.0);
        assert_eq!(roots.len(), 2);
        assert!(close(roots[0], -0.5));
        assert!(close(roots[1], -3.0));

        let roots = solve_quadratic(2.0, -10.0, 4.0);
        assert!(close(roots[0], 4.561_552_812_808_83));
        assert!(close(roots[1], 0.438_447_187_191_169_6));

        assert_eq!(solve_quadratic(3.0, 6.0, 3.0), vec![-1.0]);
        assert_eq!(solve_quadratic(0.0, 2.0, -4.0), vec![2.0]);
        assert!(solve_quadratic(0.0, 0.0, 1.0).is_empty());
    }
}
