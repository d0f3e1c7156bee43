//! The station population of one episode: base-station and mobile-station
//! arenas plus the association table linking them.

use rand::Rng;
use serde::Serialize;

use super::association::{self, AssociationStats, AssociationTable};
use super::episode;
use super::propagation;
use super::topology::HexGrid;
use crate::config::simulation_config::{ConfigError, SimulationConfig};
use crate::models::base_station::{BaseStation, BaseStationId};
use crate::models::coordinate::{Coordinate, Positioned};
use crate::models::mobile_station::{MobileStation, MobileStationId};

#[derive(Debug, Clone)]
pub struct Network {
    base_stations: Vec<BaseStation>,
    mobile_stations: Vec<MobileStation>,
    associations: AssociationTable,
    window_size: f64,
    power_density_threshold: f64,
}

impl Network {
    /// Lays out the hexagonal grid and spawns the mobile stations at the
    /// window centre.
    pub fn build<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self, ConfigError> {
        let grid = HexGrid::from_config(config)?;
        let base_stations = grid.build(config);

        let (cx, cy) = config.center_point();
        let mobile_stations = (0..config.mobile_station_count)
            .map(|i| {
                MobileStation::with_random_velocity(
                    MobileStationId(i),
                    Coordinate::new(cx, cy),
                    config.mobile_speed,
                    rng,
                )
            })
            .collect();

        Ok(Self::from_parts(base_stations, mobile_stations, config))
    }

    /// Assembles a network from explicit stations. Ids are reassigned to
    /// match arena positions and neighbour links pointing outside the arena
    /// are dropped.
    pub fn from_parts(
        base_stations: Vec<BaseStation>,
        mobile_stations: Vec<MobileStation>,
        config: &SimulationConfig,
    ) -> Self {
        let count = base_stations.len();
        let base_stations: Vec<BaseStation> = base_stations
            .into_iter()
            .enumerate()
            .map(|(i, bs)| {
                let mut station = BaseStation::new(
                    BaseStationId(i),
                    *bs.get_coordinate(),
                    bs.get_power(),
                    config.min_power,
                    config.max_power,
                );
                for neighbor in bs.get_neighbors() {
                    if neighbor.0 < count {
                        station.add_neighbor(*neighbor);
                    }
                }
                station
            })
            .collect();

        let mobile_stations: Vec<MobileStation> = mobile_stations
            .into_iter()
            .enumerate()
            .map(|(i, ms)| MobileStation::new(MobileStationId(i), *ms.get_coordinate(), ms.get_velocity()))
            .collect();

        let associations = AssociationTable::new(base_stations.len(), mobile_stations.len());
        Self {
            base_stations,
            mobile_stations,
            associations,
            window_size: config.window_size,
            power_density_threshold: config.power_density_threshold,
        }
    }

    pub fn base_stations(&self) -> &[BaseStation] {
        &self.base_stations
    }

    pub(crate) fn base_stations_mut(&mut self) -> &mut [BaseStation] {
        &mut self.base_stations
    }

    pub fn base_station(&self, id: BaseStationId) -> Option<&BaseStation> {
        self.base_stations.get(id.0)
    }

    pub fn mobile_stations(&self) -> &[MobileStation] {
        &self.mobile_stations
    }

    pub fn associations(&self) -> &AssociationTable {
        &self.associations
    }

    pub fn serving_station(&self, ms: MobileStationId) -> Option<BaseStationId> {
        self.associations.serving_station(ms)
    }

    pub fn connected_count(&self) -> usize {
        self.associations.connected_count()
    }

    pub fn total_power(&self) -> f64 {
        self.base_stations.iter().map(BaseStation::get_power).sum()
    }

    /// Moves every mobile station one tick inside the window.
    pub fn step_mobiles(&mut self) {
        for ms in &mut self.mobile_stations {
            ms.step(self.window_size);
        }
    }

    pub fn refresh_associations(&mut self) -> AssociationStats {
        association::refresh_associations(
            &self.base_stations,
            &mut self.mobile_stations,
            &mut self.associations,
            self.power_density_threshold,
        )
    }

    pub fn score_tick(&self) -> f64 {
        episode::score_tick(&self.base_stations, &self.mobile_stations, &self.associations)
    }

    pub fn is_consistent(&self) -> bool {
        self.associations.is_consistent()
    }

    pub fn snapshot(&self, tick: u64, score: f64) -> NetworkSnapshot {
        let base_stations = self
            .base_stations
            .iter()
            .map(|bs| BaseStationView {
                id: bs.get_id(),
                position: *bs.get_coordinate(),
                power: bs.get_power(),
                on: bs.is_on(),
                connections: self.associations.connection_count(bs.get_id()),
                range_radius: propagation::range_radius(bs.get_power(), self.power_density_threshold),
            })
            .collect();

        let mobile_stations = self
            .mobile_stations
            .iter()
            .map(|ms| MobileStationView {
                id: ms.get_id(),
                position: *ms.get_coordinate(),
                serving_station: self.associations.serving_station(ms.get_id()),
            })
            .collect();

        let links = self
            .associations
            .links()
            .filter_map(|(ms, bs)| {
                let from = self.mobile_stations.get(ms.0)?.get_coordinate();
                let to = self.base_stations.get(bs.0)?.get_coordinate();
                Some((*from, *to))
            })
            .collect();

        NetworkSnapshot {
            tick,
            score,
            base_stations,
            mobile_stations,
            links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStationView {
    pub id: BaseStationId,
    pub position: Coordinate,
    pub power: f64,
    pub on: bool,
    pub connections: usize,
    pub range_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobileStationView {
    pub id: MobileStationId,
    pub position: Coordinate,
    pub serving_station: Option<BaseStationId>,
}

/// Read-only picture of the network between two ticks, for renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub tick: u64,
    pub score: f64,
    pub base_stations: Vec<BaseStationView>,
    pub mobile_stations: Vec<MobileStationView>,
    pub links: Vec<(Coordinate, Coordinate)>,
}
