//! Property tests for the structural invariants of the network:
//! - neighbour links are symmetric, never self-referential, at most six
//! - power density is maximal at the transmitter and falls off with distance
//! - every mobile station sits in at most one connection set, mirrored by
//!   its serving station
//! - transmit power never leaves `[min_power, max_power]`

use proptest::prelude::*;

use sonsim::config::constants::MAX_NEIGHBORS;
use sonsim::core::association::strongest_signal;
use sonsim::core::propagation::power_density;
use sonsim::core::topology::HexGrid;
use sonsim::models::coordinate::Positioned;
use sonsim::{BaseStation, BaseStationId, Coordinate, MobileStation, MobileStationId, Network, SimulationConfig};

fn grid_config(rows: usize, cols: usize) -> SimulationConfig {
    SimulationConfig {
        grid_rows: rows,
        grid_cols: cols,
        ..SimulationConfig::default()
    }
}

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (0.0..600.0f64, 0.0..600.0f64).prop_map(|(x, y)| Coordinate::new(x, y))
}

proptest! {
    #[test]
    fn neighbour_links_are_symmetric(rows in 1usize..8, cols in 1usize..8) {
        let config = grid_config(rows, cols);
        let stations = HexGrid::from_config(&config).unwrap().build(&config);

        for station in &stations {
            let id = station.get_id();
            prop_assert!(station.get_neighbors().len() <= MAX_NEIGHBORS);
            prop_assert!(!station.get_neighbors().contains(&id));
            for neighbor in station.get_neighbors() {
                prop_assert!(stations[neighbor.0].get_neighbors().contains(&id));
            }
        }
    }

    #[test]
    fn station_count_matches_staggered_rows(rows in 1usize..10, cols in 1usize..10) {
        let grid = HexGrid::new(rows, cols, 600.0).unwrap();
        let expected: usize = (0..rows).map(|r| if r % 2 == 0 { cols } else { cols + 1 }).sum();
        prop_assert_eq!(grid.station_count(), expected);
    }

    #[test]
    fn density_at_transmitter_is_transmit_power(power in 0.0..1e6f64, at in coordinate()) {
        prop_assert_eq!(power_density(power, &at, &at), power);
    }

    #[test]
    fn density_falls_with_distance(power in 1.0..1e6f64, near in 0.1..100.0f64, extra in 0.1..100.0f64) {
        let origin = Coordinate::new(0.0, 0.0);
        let close = power_density(power, &origin, &Coordinate::new(near, 0.0));
        let far = power_density(power, &origin, &Coordinate::new(near + extra, 0.0));
        prop_assert!(far < close);
    }

    #[test]
    fn strongest_signal_is_the_maximum(
        stations in prop::collection::vec((coordinate(), 2.0..650_000.0f64), 1..12),
        at in coordinate(),
    ) {
        let stations: Vec<BaseStation> = stations
            .into_iter()
            .enumerate()
            .map(|(i, (c, p))| BaseStation::new(BaseStationId(i), c, p, 1.0, 650_000.0))
            .collect();

        let (winner, density) = strongest_signal(&stations, &at).unwrap();
        let first_max = stations
            .iter()
            .position(|bs| power_density(bs.get_power(), bs.get_coordinate(), &at) == density)
            .unwrap();
        prop_assert_eq!(winner, BaseStationId(first_max));
        for bs in &stations {
            prop_assert!(power_density(bs.get_power(), bs.get_coordinate(), &at) <= density);
        }
    }

    #[test]
    fn associations_stay_bidirectional(
        positions in prop::collection::vec(coordinate(), 0..30),
        moves in prop::collection::vec((-20.0..20.0f64, -20.0..20.0f64), 0..30),
    ) {
        let config = SimulationConfig::default();
        let stations = HexGrid::from_config(&config).unwrap().build(&config);
        let mobiles: Vec<MobileStation> = positions
            .iter()
            .zip(moves.iter().chain(std::iter::repeat(&(0.0, 0.0))))
            .enumerate()
            .map(|(i, (c, v))| MobileStation::new(MobileStationId(i), *c, *v))
            .collect();
        let mut network = Network::from_parts(stations, mobiles, &config);

        for _ in 0..5 {
            network.step_mobiles();
            network.refresh_associations();
            prop_assert!(network.is_consistent());

            let served: usize = network
                .base_stations()
                .iter()
                .map(|bs| network.associations().connection_count(bs.get_id()))
                .sum();
            prop_assert_eq!(served, network.connected_count());

            for ms in network.mobile_stations() {
                if let Some(bs) = network.serving_station(ms.get_id()) {
                    prop_assert!(network.associations().connections(bs).any(|m| m == ms.get_id()));
                    prop_assert!(ms.get_received_power().unwrap() > config.power_density_threshold);
                }
                let c = ms.get_coordinate();
                prop_assert!((0.0..=config.window_size).contains(&c.x));
                prop_assert!((0.0..=config.window_size).contains(&c.y));
            }
        }
    }

    #[test]
    fn power_stays_in_bounds(start in 0.0..1e6f64, deltas in prop::collection::vec(-1e6..1e6f64, 1..50)) {
        let mut bs = BaseStation::new(BaseStationId(0), Coordinate::new(0.0, 0.0), start, 1.0, 650_000.0);
        prop_assert!((1.0..=650_000.0).contains(&bs.get_power()));
        for delta in deltas {
            let power = bs.apply_power_delta(delta);
            prop_assert!((1.0..=650_000.0).contains(&power));
            prop_assert_eq!(power, bs.get_power());
        }
    }
}

#[test]
fn single_cell_grid_has_no_neighbours() {
    let config = grid_config(1, 1);
    let stations = HexGrid::from_config(&config).unwrap().build(&config);
    assert_eq!(stations.len(), 1);
    assert!(stations[0].get_neighbors().is_empty());
}

#[test]
fn empty_grid_is_rejected() {
    assert!(HexGrid::new(0, 4, 600.0).is_err());
    assert!(HexGrid::new(4, 0, 600.0).is_err());
}
