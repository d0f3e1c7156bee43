//! End-to-end behaviour of the tick loop: association scenarios, power
//! control through a policy, episode rollover and the threaded runner.

use std::f64::consts::PI;
use std::sync::Arc;

use parking_lot::Mutex;

use sonsim::core::episode::EpisodeSummary;
use sonsim::core::runner::SimulationRunner;
use sonsim::{
    BaseStation, BaseStationId, Coordinate, EpisodeObserver, MobileStation, MobileStationId, Network, Policy,
    Simulation, SimulationConfig,
};

fn bs(id: usize, x: f64, y: f64, power: f64) -> BaseStation {
    BaseStation::new(BaseStationId(id), Coordinate::new(x, y), power, 1.0, 650_000.0)
}

fn still(id: usize, x: f64, y: f64) -> MobileStation {
    MobileStation::new(MobileStationId(id), Coordinate::new(x, y), (0.0, 0.0))
}

fn small_config() -> SimulationConfig {
    SimulationConfig {
        grid_rows: 2,
        grid_cols: 2,
        mobile_station_count: 5,
        episode_duration: 10,
        seed: Some(3),
        ..SimulationConfig::default()
    }
}

struct AlwaysIncrease;

impl Policy for AlwaysIncrease {
    fn predict(&self, _observation: &[f64]) -> Vec<f64> {
        vec![1.0, 0.0]
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<EpisodeSummary>>>);

impl EpisodeObserver for Recorder {
    fn on_episode_finished(&mut self, summary: &EpisodeSummary) {
        self.0.lock().push(summary.clone());
    }
}

#[test]
fn co_located_mobile_is_served_by_first_station() {
    let config = SimulationConfig::default();
    let mut network = Network::from_parts(
        vec![bs(0, 0.0, 0.0, 4.0 * PI), bs(1, 1000.0, 0.0, 4.0 * PI)],
        vec![still(0, 0.0, 0.0)],
        &config,
    );

    network.refresh_associations();

    assert_eq!(network.serving_station(MobileStationId(0)), Some(BaseStationId(0)));
    // Zero distance reports the transmit power itself.
    let received = network.mobile_stations()[0].get_received_power().unwrap();
    assert!((received - 4.0 * PI).abs() < 1e-12);
}

#[test]
fn distant_mobile_is_unserved() {
    let config = SimulationConfig::default();
    let power = 1000.0;
    // 4π·d² = 4π·100 > 1000
    let mut network = Network::from_parts(vec![bs(0, 0.0, 0.0, power)], vec![still(0, 10.0, 0.0)], &config);

    let stats = network.refresh_associations();

    assert_eq!(network.serving_station(MobileStationId(0)), None);
    assert_eq!(stats.unserved, 1);
    assert_eq!(network.associations().connection_count(BaseStationId(0)), 0);
    assert!(network.mobile_stations()[0].get_received_power().unwrap() < 1.0);
}

#[test]
fn repeated_refresh_does_not_churn() {
    let config = SimulationConfig::default();
    let stations = vec![bs(0, 100.0, 100.0, 200_000.0), bs(1, 400.0, 100.0, 200_000.0)];
    let mobiles = vec![still(0, 120.0, 100.0), still(1, 390.0, 110.0), still(2, 200.0, 100.0)];
    let mut network = Network::from_parts(stations, mobiles, &config);

    let first = network.refresh_associations();
    let links: Vec<_> = network.associations().links().collect();
    let second = network.refresh_associations();

    assert_eq!(first.handoffs, 3);
    assert_eq!(second.handoffs, 0);
    assert_eq!(network.associations().links().collect::<Vec<_>>(), links);
}

#[test]
fn power_change_takes_effect_on_the_next_tick() {
    // 4π·d² at d = 10 is about 1256.6: 1200 falls short of the threshold, 1300 clears it.
    let config = SimulationConfig::default();
    let network = Network::from_parts(
        vec![bs(0, 100.0, 100.0, 1200.0)],
        vec![still(0, 110.0, 100.0)],
        &config,
    );
    let mut simulation = Simulation::new(config)
        .unwrap()
        .with_network(network)
        .with_policy(AlwaysIncrease);

    let mut before = simulation.network().clone();
    before.step_mobiles();
    before.refresh_associations();
    let expected = before.score_tick();

    let first = simulation.tick();
    assert_eq!(first.score_delta, expected);
    assert!((first.score_delta + 1000.0 / 1200.0).abs() < 1e-12);
    assert_eq!(first.associations.connected, 0);
    let decision = first.decision.unwrap();
    assert_eq!(decision.power_before, 1200.0);
    assert_eq!(decision.power_after, 1300.0);
    assert_eq!(simulation.network().serving_station(MobileStationId(0)), None);

    let second = simulation.tick();
    assert_eq!(second.associations.connected, 1);
    assert_eq!(simulation.network().serving_station(MobileStationId(0)), Some(BaseStationId(0)));
    assert!((second.score_delta - 1000.0 / 1300.0).abs() < 1e-12);
    assert_eq!(second.decision.unwrap().power_before, 1300.0);
}

#[test]
fn episode_rolls_over_at_duration() {
    let recorder = Recorder::default();
    let mut simulation = Simulation::new(small_config()).unwrap();
    simulation.add_episode_observer(recorder.clone());

    let summaries = simulation.run_ticks(25);

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].ticks, 10);
    assert_eq!(summaries[1].episode, 1);
    assert_eq!(simulation.episode().tick, 5);
    assert_eq!(simulation.episode().episodes_completed, 2);
    assert_eq!(recorder.0.lock().len(), 2);
    assert!(simulation.network().is_consistent());
}

#[test]
fn policy_raises_power_until_the_cap() {
    let config = SimulationConfig {
        episode_duration: 100_000,
        ..small_config()
    };
    let mut simulation = Simulation::new(config.clone()).unwrap().with_policy(AlwaysIncrease);
    let before = simulation.network().total_power();

    simulation.run_ticks(50);

    let after = simulation.network().total_power();
    assert!(after > before);
    for bs in simulation.network().base_stations() {
        assert!(bs.get_power() <= config.max_power);
        assert!(bs.get_power() >= config.default_power);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let mut simulation = Simulation::new(small_config()).unwrap().with_policy(AlwaysIncrease);
        simulation.run_ticks(25).into_iter().map(|s| s.final_score).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn runner_hands_back_the_simulation() {
    let simulation = Simulation::new(small_config()).unwrap();
    let runner = SimulationRunner::start_for(simulation, false, 15).unwrap();
    let simulation = runner.join().unwrap();

    assert_eq!(simulation.episode().episodes_completed, 1);
    assert_eq!(simulation.episode().tick, 5);
    assert_eq!(simulation.snapshot().tick, 5);
}
