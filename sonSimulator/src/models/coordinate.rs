use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared_to(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        self.distance_squared_to(other).sqrt()
    }
}

/// Anything placed on the simulation plane.
pub trait Positioned {
    fn get_coordinate(&self) -> &Coordinate;
}
