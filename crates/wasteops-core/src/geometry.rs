//! Zone boundaries in the normalized 0-100 map space.
//!
//! Boundaries arrive as SVG-style path descriptors (`M 0,0 L 100,0 ... Z`).
//! Only absolute move/line/close commands are accepted; anything else is a
//! [`PathError`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

pub const MAP_EXTENT: f64 = 100.0;

/// Distances and cross products below this count as zero.
const TOLERANCE: f64 = 1e-9;
/// How far inside an edge the overlap sample points sit, in map units.
const EDGE_INSET: f64 = 1e-3;

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path must start with 'M', found {0:?}")]
    MissingMove(String),
    #[error("unsupported path command '{0}'")]
    UnsupportedCommand(char),
    #[error("unexpected text {0:?} in path")]
    UnexpectedText(String),
    #[error("command '{command}' expects a coordinate pair")]
    MissingCoordinate { command: char },
    #[error("coordinates after 'Z'")]
    TrailingAfterClose,
    #[error("polygon needs at least 3 vertices, found {0}")]
    TooFewVertices(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn in_extent(&self) -> bool {
        (0.0..=MAP_EXTENT).contains(&self.x) && (0.0..=MAP_EXTENT).contains(&self.y)
    }

    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let length_sq = dx * dx + dy * dy;
        if length_sq <= TOLERANCE {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

/// Twice the signed area of the triangle (o, a, b).
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn opposite_sides(first: f64, second: f64) -> bool {
    (first > TOLERANCE && second < -TOLERANCE) || (first < -TOLERANCE && second > TOLERANCE)
}

/// True only when the segments cross at a point interior to both. Shared
/// endpoints, T-junctions and collinear overlap do not count.
fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    opposite_sides(cross(q1, q2, p1), cross(q1, q2, p2))
        && opposite_sides(cross(p1, p2, q1), cross(p1, p2, q2))
}

/// Closed polygon; the closing edge from the last vertex back to the first
/// is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Polygon {
    vertices: Vec<Point>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn path_token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"[A-Za-z]|-?\d+(?:\.\d+)?").expect("valid regex"))
}

fn tokenize(input: &str) -> Result<Vec<Token>, PathError> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    for found in path_token_regex().find_iter(input) {
        check_separator(&input[cursor..found.start()])?;
        cursor = found.end();
        let text = found.as_str();
        match text.chars().next() {
            Some(ch) if ch.is_ascii_alphabetic() => tokens.push(Token::Command(ch)),
            _ => {
                let number = text
                    .parse::<f64>()
                    .map_err(|_| PathError::UnexpectedText(text.to_string()))?;
                tokens.push(Token::Number(number));
            }
        }
    }
    check_separator(&input[cursor..])?;
    Ok(tokens)
}

fn check_separator(gap: &str) -> Result<(), PathError> {
    if gap.chars().all(|ch| ch.is_whitespace() || ch == ',') {
        Ok(())
    } else {
        Err(PathError::UnexpectedText(gap.trim().to_string()))
    }
}

fn take_pair(
    tokens: &mut std::iter::Peekable<std::vec::IntoIter<Token>>,
    command: char,
) -> Result<Point, PathError> {
    let x = match tokens.next() {
        Some(Token::Number(value)) => value,
        _ => return Err(PathError::MissingCoordinate { command }),
    };
    let y = match tokens.next() {
        Some(Token::Number(value)) => value,
        _ => return Err(PathError::MissingCoordinate { command }),
    };
    Ok(Point::new(x, y))
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Result<Self, PathError> {
        if vertices.len() < 3 {
            return Err(PathError::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Edges as vertex pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let count = self.vertices.len();
        (0..count).map(move |idx| (self.vertices[idx], self.vertices[(idx + 1) % count]))
    }

    /// Even-odd ray casting.
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < cross_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn on_boundary(&self, point: Point) -> bool {
        self.edges()
            .any(|(a, b)| point.distance_to_segment(a, b) <= TOLERANCE)
    }

    /// Inside and not on any edge.
    pub fn contains_strictly(&self, point: Point) -> bool {
        !self.on_boundary(point) && self.contains(point)
    }

    fn signed_area(&self) -> f64 {
        let twice: f64 = self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum();
        twice / 2.0
    }

    /// Shoelace area, always non-negative.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Every vertex plus one point just inside the midpoint of each edge.
    fn overlap_samples(&self) -> Vec<Point> {
        let orientation = if self.signed_area() < 0.0 { -1.0 } else { 1.0 };
        let mut samples = self.vertices.clone();
        for (a, b) in self.edges() {
            let length = a.distance(b);
            if length <= TOLERANCE {
                continue;
            }
            // Interior is left of each edge on a positively oriented ring.
            let nx = -(b.y - a.y) / length * orientation;
            let ny = (b.x - a.x) / length * orientation;
            samples.push(Point::new(
                (a.x + b.x) / 2.0 + nx * EDGE_INSET,
                (a.y + b.y) / 2.0 + ny * EDGE_INSET,
            ));
        }
        samples
    }

    /// Whether the interiors intersect. Polygons that only share edges or
    /// vertices do not overlap.
    pub fn overlaps(&self, other: &Polygon) -> bool {
        let crossing = self
            .edges()
            .any(|(a, b)| other.edges().any(|(c, d)| segments_cross(a, b, c, d)));
        crossing
            || self
                .overlap_samples()
                .into_iter()
                .any(|point| other.contains_strictly(point))
            || other
                .overlap_samples()
                .into_iter()
                .any(|point| self.contains_strictly(point))
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> (Point, Point) {
        let mut min = Point::new(f64::MAX, f64::MAX);
        let mut max = Point::new(f64::MIN, f64::MIN);
        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
        }
        (min, max)
    }

    pub fn to_path(&self) -> String {
        let mut out = String::new();
        for (idx, vertex) in self.vertices.iter().enumerate() {
            let command = if idx == 0 { 'M' } else { 'L' };
            if idx > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{command} {},{}", vertex.x, vertex.y));
        }
        out.push_str(" Z");
        out
    }
}

impl FromStr for Polygon {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(PathError::Empty);
        }
        let mut tokens = tokens.into_iter().peekable();
        match tokens.peek() {
            Some(Token::Command('M')) => {}
            Some(Token::Command(other)) => return Err(PathError::MissingMove(other.to_string())),
            Some(Token::Number(value)) => return Err(PathError::MissingMove(value.to_string())),
            None => return Err(PathError::Empty),
        }

        let mut vertices = Vec::new();
        let mut closed = false;
        while let Some(token) = tokens.next() {
            if closed {
                return Err(PathError::TrailingAfterClose);
            }
            match token {
                Token::Command(command @ ('M' | 'L')) => {
                    vertices.push(take_pair(&mut tokens, command)?);
                    // Implicit repeated line-to, as SVG allows.
                    while let Some(Token::Number(_)) = tokens.peek() {
                        vertices.push(take_pair(&mut tokens, 'L')?);
                    }
                }
                Token::Command('Z' | 'z') => closed = true,
                Token::Command(other) => return Err(PathError::UnsupportedCommand(other)),
                Token::Number(value) => {
                    return Err(PathError::UnexpectedText(value.to_string()));
                }
            }
        }

        Polygon::new(vertices)
    }
}

impl TryFrom<String> for Polygon {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Polygon> for String {
    fn from(value: Polygon) -> Self {
        value.to_path()
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        "M 30,40 L 60,40 L 60,65 L 30,65 Z".parse().expect("parse square")
    }

    #[test]
    fn parses_absolute_move_line_close() {
        let polygon = square();
        assert_eq!(polygon.vertices().len(), 4);
        assert_eq!(polygon.vertices()[2], Point::new(60.0, 65.0));
        assert_eq!(polygon.to_path(), "M 30,40 L 60,40 L 60,65 L 30,65 Z");
    }

    #[test]
    fn accepts_implicit_line_to_after_move() {
        let polygon: Polygon = "M0 0 10 0 10 10".parse().expect("parse implicit");
        assert_eq!(polygon.vertices().len(), 3);
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!("".parse::<Polygon>(), Err(PathError::Empty));
        assert_eq!(
            "L 0,0 L 1,1 L 2,2".parse::<Polygon>(),
            Err(PathError::MissingMove("L".to_string()))
        );
        assert_eq!(
            "M 0,0 C 1,1 L 2,2".parse::<Polygon>(),
            Err(PathError::UnsupportedCommand('C'))
        );
        assert_eq!(
            "M 0,0 L 5".parse::<Polygon>(),
            Err(PathError::MissingCoordinate { command: 'L' })
        );
        assert_eq!(
            "M 0,0 L 1,0 Z L 3,3".parse::<Polygon>(),
            Err(PathError::TrailingAfterClose)
        );
        assert_eq!(
            "M 0,0 L 1,1 Z".parse::<Polygon>(),
            Err(PathError::TooFewVertices(2))
        );
        assert!(matches!(
            "M 0,0 L 1,0 L 1,1 ; Z".parse::<Polygon>(),
            Err(PathError::UnexpectedText(_))
        ));
    }

    #[test]
    fn containment_and_area() {
        let polygon = square();
        assert!(polygon.contains(Point::new(45.0, 50.0)));
        assert!(!polygon.contains(Point::new(70.0, 50.0)));
        assert!(!polygon.contains(Point::new(45.0, 30.0)));
        assert!((polygon.area() - 750.0).abs() < f64::EPSILON);
    }

    #[test]
    fn containment_on_slanted_edges() {
        let polygon: Polygon = "M 60,40 L 100,33 L 100,60 L 60,65 Z".parse().expect("parse");
        assert!(polygon.contains(Point::new(80.0, 45.0)));
        assert!(!polygon.contains(Point::new(80.0, 35.0)));
        assert!(!polygon.contains(Point::new(80.0, 64.0)));
    }

    #[test]
    fn serde_uses_path_descriptor() {
        let json = serde_json::to_string(&square()).expect("serialize");
        assert_eq!(json, "\"M 30,40 L 60,40 L 60,65 L 30,65 Z\"");
        let back: Polygon = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, square());
        assert!(serde_json::from_str::<Polygon>("\"M 0,0\"").is_err());
    }

    #[test]
    fn neighbours_sharing_an_edge_do_not_overlap() {
        let west: Polygon = "M 0,0 L 50,0 L 50,100 L 0,100 Z".parse().expect("west");
        let east: Polygon = "M 50,0 L 100,0 L 100,100 L 50,100 Z".parse().expect("east");
        assert!(!west.overlaps(&east));
        assert!(west.on_boundary(Point::new(50.0, 30.0)));
        assert!(!west.contains_strictly(Point::new(50.0, 30.0)));

        // Reversed winding, T-junction on the shared edge.
        let notch: Polygon = "M 50,40 L 80,40 L 80,20 L 50,20 Z".parse().expect("notch");
        assert!(!west.overlaps(&notch));
        assert!(east.overlaps(&notch));
    }

    #[test]
    fn detects_crossing_identical_and_nested_polygons() {
        let a: Polygon = "M 0,0 L 60,0 L 60,60 L 0,60 Z".parse().expect("a");
        let b: Polygon = "M 40,40 L 100,40 L 100,100 L 40,100 Z".parse().expect("b");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let plus_h: Polygon = "M 0,40 L 100,40 L 100,60 L 0,60 Z".parse().expect("h");
        let plus_v: Polygon = "M 40,0 L 60,0 L 60,100 L 40,100 Z".parse().expect("v");
        assert!(plus_h.overlaps(&plus_v));

        assert!(a.overlaps(&a.clone()));

        let inner: Polygon = "M 10,10 L 20,10 L 20,20 Z".parse().expect("inner");
        assert!(a.overlaps(&inner));
        assert!(inner.overlaps(&a));
    }
}
