//! Geometry primitives used by the chunking tests.

use std::fmt;
use std::ops::Add;

const ORIGIN_LABEL: &str = "origin";

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// Build a vector from its components.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Anything with an area.
pub trait Shape: fmt::Debug {
    fn area(&self) -> f64;
    fn name(&self) -> &str;
}

#[derive(Debug)]
pub enum Kind {
    Circle,
    Square,
}

/// Sum the areas of all shapes.
pub fn total_area(shapes: &[Box<dyn Shape>]) -> f64 {
    shapes.iter().map(|s| s.area()).sum()
}

/// Resolve a label after a simulated delay.
pub async fn resolve(label: &str) -> String {
    format!("{label}@{ORIGIN_LABEL}")
}

pub mod units {
    /// Convert degrees to radians.
    pub fn to_radians(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }
}

pub type Polygon = Vec<Vec2>;
