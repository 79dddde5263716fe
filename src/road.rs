//! Road geometry: straight segments and circular arcs chained into a path.
//!
//! Roads are built by the obstacle router and handed to renderers as-is,
//! so they serialize but are never parsed back.

use serde::Serialize;

use crate::geometry::{Circle, Point, distance_point_point};

/// A straight piece of road.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Segment {
    start: Point,
    end: Point,
    length: f64,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            length: distance_point_point(&start, &end),
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// The minor arc of `circle` between two points on its boundary.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Arc {
    circle: Circle,
    start: Point,
    end: Point,
    length: f64,
}

impl Arc {
    pub fn new(circle: Circle, start: Point, end: Point) -> Self {
        Self {
            circle,
            start,
            end,
            length: arc_length(&circle, &start, &end),
        }
    }

    pub fn circle(&self) -> Circle {
        self.circle
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.circle, self.end, self.start)
    }
}

impl PartialEq for Arc {
    fn eq(&self, other: &Self) -> bool {
        self.circle == other.circle && self.start == other.start && self.end == other.end
    }
}

/// Length of the minor arc, derived from the chord between its endpoints.
fn arc_length(circle: &Circle, start: &Point, end: &Point) -> f64 {
    let radius = circle.radius();
    if radius == 0.0 {
        return 0.0;
    }
    let half_chord = 0.5 * distance_point_point(start, end);
    // Rounding can push the ratio a hair past 1 for diametric endpoints.
    let angle = 2.0 * (half_chord / radius).clamp(-1.0, 1.0).asin();
    radius * angle
}

/// One piece of a [`Road`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoadPart {
    Segment(Segment),
    Arc(Arc),
}

impl RoadPart {
    pub fn length(&self) -> f64 {
        match self {
            RoadPart::Segment(segment) => segment.length(),
            RoadPart::Arc(arc) => arc.length(),
        }
    }

    pub fn start(&self) -> Point {
        match self {
            RoadPart::Segment(segment) => segment.start(),
            RoadPart::Arc(arc) => arc.start(),
        }
    }

    pub fn end(&self) -> Point {
        match self {
            RoadPart::Segment(segment) => segment.end(),
            RoadPart::Arc(arc) => arc.end(),
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            RoadPart::Segment(segment) => RoadPart::Segment(segment.reversed()),
            RoadPart::Arc(arc) => RoadPart::Arc(arc.reversed()),
        }
    }
}

impl From<Segment> for RoadPart {
    fn from(segment: Segment) -> Self {
        RoadPart::Segment(segment)
    }
}

impl From<Arc> for RoadPart {
    fn from(arc: Arc) -> Self {
        RoadPart::Arc(arc)
    }
}

/// An ordered path made of segments and arcs.
///
/// Parts can only be appended. The cached length is always the sum of the
/// part lengths. Equality ignores part order: two roads are equal when
/// they are made of the same parts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Road {
    parts: Vec<RoadPart>,
    length: f64,
}

impl Road {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: impl Into<RoadPart>) {
        let part = part.into();
        self.length += part.length();
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[RoadPart] {
        &self.parts
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The same road travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        self.parts.iter().rev().map(RoadPart::reversed).collect()
    }
}

impl FromIterator<RoadPart> for Road {
    fn from_iter<I: IntoIterator<Item = RoadPart>>(iter: I) -> Self {
        let mut road = Road::new();
        for part in iter {
            road.push(part);
        }
        road
    }
}

impl PartialEq for Road {
    fn eq(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len()
            && self.parts.iter().all(|part| other.parts.contains(part))
            && other.parts.iter().all(|part| self.parts.contains(part))
    }
}
