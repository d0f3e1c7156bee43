//! Which base station serves which mobile station.
//!
//! Both directions of the relation live in one [`AssociationTable`] and are
//! only ever changed together by [`AssociationTable::assign`], so a station's
//! connection set and a mobile station's serving reference always agree.

use std::collections::BTreeSet;

use tracing::trace;

use super::propagation::power_density;
use crate::models::base_station::{BaseStation, BaseStationId};
use crate::models::coordinate::{Coordinate, Positioned};
use crate::models::mobile_station::{MobileStation, MobileStationId};
use crate::utils::logging::{self, OperationCategory};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationTable {
    serving: Vec<Option<BaseStationId>>,
    connections: Vec<BTreeSet<MobileStationId>>,
}

/// Outcome of one association pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociationStats {
    pub handoffs: usize,
    pub connected: usize,
    pub unserved: usize,
}

impl AssociationTable {
    pub fn new(base_station_count: usize, mobile_station_count: usize) -> Self {
        Self {
            serving: vec![None; mobile_station_count],
            connections: vec![BTreeSet::new(); base_station_count],
        }
    }

    pub fn serving_station(&self, ms: MobileStationId) -> Option<BaseStationId> {
        self.serving.get(ms.0).copied().flatten()
    }

    pub fn connections(&self, bs: BaseStationId) -> impl Iterator<Item = MobileStationId> + '_ {
        self.connections.get(bs.0).into_iter().flatten().copied()
    }

    pub fn connection_count(&self, bs: BaseStationId) -> usize {
        self.connections.get(bs.0).map_or(0, BTreeSet::len)
    }

    pub fn connected_count(&self) -> usize {
        self.serving.iter().filter(|s| s.is_some()).count()
    }

    /// Every `(mobile, base)` pair currently linked, in mobile-station order.
    pub fn links(&self) -> impl Iterator<Item = (MobileStationId, BaseStationId)> + '_ {
        self.serving
            .iter()
            .enumerate()
            .filter_map(|(ms, bs)| bs.map(|bs| (MobileStationId(ms), bs)))
    }

    /// Moves `ms` to `target`, updating both sides of the relation. Returns
    /// true when the association changed. Unknown ids are ignored.
    pub fn assign(&mut self, ms: MobileStationId, target: Option<BaseStationId>) -> bool {
        if ms.0 >= self.serving.len() {
            return false;
        }
        if let Some(bs) = target {
            if bs.0 >= self.connections.len() {
                return false;
            }
        }

        let current = self.serving[ms.0];
        if current == target {
            return false;
        }

        if let Some(old) = current {
            self.connections[old.0].remove(&ms);
            self.serving[ms.0] = None;
        }
        if let Some(new) = target {
            self.connections[new.0].insert(ms);
            self.serving[ms.0] = Some(new);
        }
        true
    }

    pub fn is_consistent(&self) -> bool {
        let forward = self.serving.iter().enumerate().all(|(ms, bs)| match bs {
            Some(bs) => self
                .connections
                .get(bs.0)
                .map_or(false, |set| set.contains(&MobileStationId(ms))),
            None => true,
        });
        let backward = self.connections.iter().enumerate().all(|(bs, set)| {
            set.iter()
                .all(|ms| self.serving.get(ms.0).copied().flatten() == Some(BaseStationId(bs)))
        });
        forward && backward
    }
}

/// Strongest base station at `location`. Ties go to the first station in
/// arena order; `None` only when there are no stations.
pub fn strongest_signal(stations: &[BaseStation], location: &Coordinate) -> Option<(BaseStationId, f64)> {
    let mut best: Option<(BaseStationId, f64)> = None;
    for station in stations {
        let density = power_density(station.get_power(), station.get_coordinate(), location);
        match best {
            Some((_, best_density)) if density <= best_density => {}
            _ => best = Some((station.get_id(), density)),
        }
    }
    best
}

/// Re-associates every mobile station with the strongest station above
/// `threshold`, or leaves it unserved.
pub fn refresh_associations(
    stations: &[BaseStation],
    mobiles: &mut [MobileStation],
    table: &mut AssociationTable,
    threshold: f64,
) -> AssociationStats {
    let _timing = logging::start_timing("refresh_associations", OperationCategory::Association);

    let mut stats = AssociationStats::default();
    for ms in mobiles.iter_mut() {
        let strongest = strongest_signal(stations, ms.get_coordinate());
        ms.set_received_power(strongest.map(|(_, density)| density));

        let target = strongest
            .filter(|(_, density)| *density > threshold)
            .map(|(bs, _)| bs);

        if table.assign(ms.get_id(), target) {
            stats.handoffs += 1;
            trace!(ms = %ms.get_id(), target = ?target, "Handoff");
        }
        if target.is_some() {
            stats.connected += 1;
        } else {
            stats.unserved += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn bs(id: usize, x: f64, y: f64, power: f64) -> BaseStation {
        BaseStation::new(BaseStationId(id), Coordinate::new(x, y), power, 0.0, 1e9)
    }

    fn ms(id: usize, x: f64, y: f64) -> MobileStation {
        MobileStation::new(MobileStationId(id), Coordinate::new(x, y), (0.0, 0.0))
    }

    #[test]
    fn co_located_mobile_joins_first_station() {
        let stations = vec![bs(0, 0.0, 0.0, 4.0 * PI), bs(1, 1000.0, 0.0, 4.0 * PI)];
        let mut mobiles = vec![ms(0, 0.0, 0.0)];
        let mut table = AssociationTable::new(2, 1);

        refresh_associations(&stations, &mut mobiles, &mut table, 1.0);
        // Density equals transmit power at zero distance, which is above 1.
        assert_eq!(table.serving_station(MobileStationId(0)), Some(BaseStationId(0)));

        let density = mobiles[0].get_received_power().unwrap();
        assert!((density - 4.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn weak_signal_leaves_mobile_unserved() {
        let power = 4.0 * PI * 50.0;
        let stations = vec![bs(0, 0.0, 0.0, power)];
        // 4π·d² = 4π·100 > power, so density is 0.5.
        let mut mobiles = vec![ms(0, 10.0, 0.0)];
        let mut table = AssociationTable::new(1, 1);

        let stats = refresh_associations(&stations, &mut mobiles, &mut table, 1.0);
        assert_eq!(table.serving_station(MobileStationId(0)), None);
        assert_eq!(stats.unserved, 1);
        assert!((mobiles[0].get_received_power().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_first_station() {
        let stations = vec![bs(0, -10.0, 0.0, 1e6), bs(1, 10.0, 0.0, 1e6)];
        let (winner, _) = strongest_signal(&stations, &Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(winner, BaseStationId(0));
    }

    #[test]
    fn no_stations_means_no_signal() {
        let mut mobiles = vec![ms(0, 1.0, 1.0)];
        let mut table = AssociationTable::new(0, 1);
        let stats = refresh_associations(&[], &mut mobiles, &mut table, 1.0);
        assert_eq!(stats.unserved, 1);
        assert_eq!(mobiles[0].get_received_power(), None);
    }

    #[test]
    fn repeated_refresh_does_not_churn() {
        let stations = vec![bs(0, 0.0, 0.0, 1e6), bs(1, 100.0, 0.0, 1e6)];
        let mut mobiles = vec![ms(0, 10.0, 0.0), ms(1, 90.0, 0.0), ms(2, 5000.0, 0.0)];
        let mut table = AssociationTable::new(2, 3);

        let first = refresh_associations(&stations, &mut mobiles, &mut table, 1.0);
        let snapshot = table.clone();
        let second = refresh_associations(&stations, &mut mobiles, &mut table, 1.0);

        assert_eq!(first.handoffs, 2);
        assert_eq!(second.handoffs, 0);
        assert_eq!(table, snapshot);
    }

    #[test]
    fn handoff_moves_mobile_between_sets() {
        let mut table = AssociationTable::new(2, 1);
        let id = MobileStationId(0);
        assert!(table.assign(id, Some(BaseStationId(0))));
        assert!(table.assign(id, Some(BaseStationId(1))));
        assert_eq!(table.connection_count(BaseStationId(0)), 0);
        assert_eq!(table.connections(BaseStationId(1)).collect::<Vec<_>>(), vec![id]);
        assert!(table.is_consistent());

        assert!(table.assign(id, None));
        assert_eq!(table.connected_count(), 0);
        assert!(table.is_consistent());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut table = AssociationTable::new(1, 1);
        assert!(!table.assign(MobileStationId(5), Some(BaseStationId(0))));
        assert!(!table.assign(MobileStationId(0), Some(BaseStationId(9))));
        assert!(table.is_consistent());
    }
}
