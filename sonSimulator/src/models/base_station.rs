use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinate::{Coordinate, Positioned};

/// Index of a base station in its network's arena. Ids are dense and follow
/// row-major creation order, which is also the canonical iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BaseStationId(pub usize);

impl fmt::Display for BaseStationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BS{}", self.0)
    }
}

/// A fixed transmitter. Connection sets are kept by the network's
/// association table, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStation {
    id: BaseStationId,
    coordinate: Coordinate,
    power: f64,
    min_power: f64,
    max_power: f64,
    neighbors: Vec<BaseStationId>,
}

impl BaseStation {
    pub fn new(
        id: BaseStationId,
        coordinate: Coordinate,
        power: f64,
        min_power: f64,
        max_power: f64,
    ) -> Self {
        Self {
            id,
            coordinate,
            power: power.clamp(min_power, max_power),
            min_power,
            max_power,
            neighbors: Vec::new(),
        }
    }

    pub fn get_id(&self) -> BaseStationId {
        self.id
    }

    pub fn get_power(&self) -> f64 {
        self.power
    }

    pub fn is_on(&self) -> bool {
        self.power > self.min_power
    }

    /// Power as seen by a neighbour's observation: zero while switched off.
    pub fn observed_power(&self) -> f64 {
        if self.is_on() {
            self.power
        } else {
            0.0
        }
    }

    /// Shifts transmit power by `delta`, clamped to the station's bounds.
    /// Returns the power actually applied.
    pub fn apply_power_delta(&mut self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.power;
        }
        self.power = (self.power + delta).clamp(self.min_power, self.max_power);
        self.power
    }

    pub fn get_neighbors(&self) -> &[BaseStationId] {
        &self.neighbors
    }

    /// Records an adjacency. Self-links and duplicates are ignored.
    pub fn add_neighbor(&mut self, neighbor: BaseStationId) {
        if neighbor != self.id && !self.neighbors.contains(&neighbor) {
            self.neighbors.push(neighbor);
        }
    }
}

impl Positioned for BaseStation {
    fn get_coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(power: f64) -> BaseStation {
        BaseStation::new(BaseStationId(0), Coordinate::new(0.0, 0.0), power, 1.0, 100.0)
    }

    #[test]
    fn power_delta_is_clamped_to_bounds() {
        let mut bs = station(50.0);
        assert_eq!(bs.apply_power_delta(1000.0), 100.0);
        assert_eq!(bs.apply_power_delta(-1000.0), 1.0);
    }

    #[test]
    fn station_at_floor_is_off_and_can_come_back() {
        let mut bs = station(1.0);
        assert!(!bs.is_on());
        assert_eq!(bs.observed_power(), 0.0);
        bs.apply_power_delta(10.0);
        assert!(bs.is_on());
        assert_eq!(bs.observed_power(), 11.0);
    }

    #[test]
    fn non_finite_delta_leaves_power_unchanged() {
        let mut bs = station(50.0);
        assert_eq!(bs.apply_power_delta(f64::NAN), 50.0);
        assert_eq!(bs.apply_power_delta(f64::INFINITY), 50.0);
    }

    #[test]
    fn self_and_duplicate_neighbors_are_ignored() {
        let mut bs = station(50.0);
        bs.add_neighbor(BaseStationId(0));
        bs.add_neighbor(BaseStationId(3));
        bs.add_neighbor(BaseStationId(3));
        assert_eq!(bs.get_neighbors(), &[BaseStationId(3)]);
    }
}
