// Per-tick power control: one station observes its neighbourhood, asks the
// policy, and shifts its transmit power.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::constants::POLICY_OUTPUT_WIDTH;
use crate::models::base_station::{BaseStation, BaseStationId};
use crate::utils::logging::{self, OperationCategory};
use crate::utils::traits::Policy;

/// One power-control decision, reported to tick observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerDecision {
    pub station: BaseStationId,
    pub observation: Vec<f64>,
    /// Raw policy output; empty when no policy is configured.
    pub output: Vec<f64>,
    /// Delta actually requested, `None` when the step was skipped.
    pub delta: Option<f64>,
    pub power_before: f64,
    pub power_after: f64,
}

pub fn select_station<R: Rng + ?Sized>(station_count: usize, rng: &mut R) -> Option<BaseStationId> {
    if station_count == 0 {
        None
    } else {
        Some(BaseStationId(rng.gen_range(0..station_count)))
    }
}

/// Local view of `id`: its own power, then each neighbour's power in stored
/// order (zero for stations that are off), zero-padded to `width`.
pub fn build_observation(stations: &[BaseStation], id: BaseStationId, width: usize) -> Vec<f64> {
    let mut observation = Vec::with_capacity(width);
    if let Some(station) = stations.get(id.0) {
        observation.push(station.observed_power());
        observation.extend(
            station
                .get_neighbors()
                .iter()
                .map(|n| stations.get(n.0).map_or(0.0, BaseStation::observed_power)),
        );
    }
    observation.resize(width, 0.0);
    observation
}

/// `(increase - decrease) * resolution`, or `None` for short or non-finite
/// output.
pub fn power_delta(output: &[f64], resolution: f64) -> Option<f64> {
    if output.len() < POLICY_OUTPUT_WIDTH {
        return None;
    }
    let delta = (output[0] - output[1]) * resolution;
    delta.is_finite().then_some(delta)
}

/// Runs one decision for a randomly chosen station. Returns `None` only when
/// there are no stations. Without a policy the station is observed but its
/// power is left alone.
pub fn control_step<R: Rng + ?Sized>(
    stations: &mut [BaseStation],
    policy: Option<&dyn Policy>,
    observation_width: usize,
    resolution: f64,
    rng: &mut R,
) -> Option<PowerDecision> {
    let _timing = logging::start_timing("control_step", OperationCategory::PowerControl);

    let id = select_station(stations.len(), rng)?;
    Some(decide(stations, id, policy, observation_width, resolution))
}

/// Runs one decision for the given station.
pub fn decide(
    stations: &mut [BaseStation],
    id: BaseStationId,
    policy: Option<&dyn Policy>,
    observation_width: usize,
    resolution: f64,
) -> PowerDecision {
    let observation = build_observation(stations, id, observation_width);
    let power_before = stations.get(id.0).map_or(0.0, BaseStation::get_power);

    let output = policy.map(|p| p.predict(&observation)).unwrap_or_default();
    let delta = if policy.is_some() {
        let delta = power_delta(&output, resolution);
        if delta.is_none() {
            warn!(station = %id, width = output.len(), "Policy output unusable; skipping power change");
        }
        delta
    } else {
        None
    };

    let power_after = match (delta, stations.get_mut(id.0)) {
        (Some(delta), Some(station)) => station.apply_power_delta(delta),
        _ => power_before,
    };

    debug!(station = %id, ?delta, power_before, power_after, "Power control decision");

    PowerDecision {
        station: id,
        observation,
        output,
        delta,
        power_before,
        power_after,
    }
}
