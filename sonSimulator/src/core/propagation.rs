// Simplified inverse-square power density model

use std::f64::consts::PI;

use crate::models::coordinate::Coordinate;

/// Power density a transmitter produces at a receiver location.
///
/// A receiver sitting exactly on the transmitter sees the raw transmit
/// power, which keeps the value finite for downstream comparisons. A
/// station of power `4π` therefore reads `4π` at its own position, not
/// `1.0` as a unit-distance clamp would give.
pub fn power_density(transmitter_power: f64, transmitter: &Coordinate, receiver: &Coordinate) -> f64 {
    let distance_sq = transmitter.distance_squared_to(receiver);
    if distance_sq > 0.0 {
        transmitter_power / (4.0 * PI * distance_sq)
    } else {
        transmitter_power
    }
}

/// Distance at which a transmitter's density falls to `threshold`.
pub fn range_radius(transmitter_power: f64, threshold: f64) -> f64 {
    (transmitter_power.max(0.0) / (4.0 * PI * threshold)).sqrt()
}
