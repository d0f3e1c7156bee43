use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::coordinate::{Coordinate, Positioned};
use crate::config::constants::MOBILE_VELOCITY_SPAN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MobileStationId(pub usize);

impl fmt::Display for MobileStationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MS{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileStation {
    id: MobileStationId,
    coordinate: Coordinate,
    velocity: (f64, f64),
    received_power: Option<f64>,
}

impl MobileStation {
    pub fn new(id: MobileStationId, coordinate: Coordinate, velocity: (f64, f64)) -> Self {
        Self {
            id,
            coordinate,
            velocity,
            received_power: None,
        }
    }

    /// Spawns a station with each velocity component drawn from
    /// `[-span, span)` and scaled by `speed`.
    pub fn with_random_velocity<R: Rng + ?Sized>(
        id: MobileStationId,
        coordinate: Coordinate,
        speed: f64,
        rng: &mut R,
    ) -> Self {
        let v_x = rng.gen_range(-MOBILE_VELOCITY_SPAN..MOBILE_VELOCITY_SPAN) * speed;
        let v_y = rng.gen_range(-MOBILE_VELOCITY_SPAN..MOBILE_VELOCITY_SPAN) * speed;
        Self::new(id, coordinate, (v_x, v_y))
    }

    pub fn get_id(&self) -> MobileStationId {
        self.id
    }

    pub fn get_velocity(&self) -> (f64, f64) {
        self.velocity
    }

    /// Strongest density seen at the last association refresh, `None`
    /// before the first refresh or when the network has no base stations.
    pub fn get_received_power(&self) -> Option<f64> {
        self.received_power
    }

    pub(crate) fn set_received_power(&mut self, power: Option<f64>) {
        self.received_power = power;
    }

    /// Advances one tick inside `[0, bound]` on both axes, reflecting off
    /// the edges.
    pub fn step(&mut self, bound: f64) {
        let (x, v_x) = reflect(self.coordinate.x + self.velocity.0, self.velocity.0, bound);
        let (y, v_y) = reflect(self.coordinate.y + self.velocity.1, self.velocity.1, bound);
        self.coordinate = Coordinate::new(x, y);
        self.velocity = (v_x, v_y);
    }
}

fn reflect(next: f64, velocity: f64, bound: f64) -> (f64, f64) {
    if next <= 0.0 {
        ((-next).min(bound), -velocity)
    } else if next >= bound {
        ((2.0 * bound - next).max(0.0), -velocity)
    } else {
        (next, velocity)
    }
}

impl Positioned for MobileStation {
    fn get_coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}
