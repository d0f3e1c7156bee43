// Scoring and episode bookkeeping

use serde::{Deserialize, Serialize};

use super::association::AssociationTable;
use crate::config::constants::SCORE_POWER_UNIT;
use crate::models::base_station::BaseStation;
use crate::models::mobile_station::MobileStation;
use crate::utils::logging::{self, OperationCategory};

/// Contribution of a single mobile station this tick: 1 divided by
/// `power / SCORE_POWER_UNIT` for every station that is on.
pub fn station_contribution(stations: &[BaseStation]) -> f64 {
    stations
        .iter()
        .filter(|bs| bs.is_on())
        .fold(1.0, |contribution, bs| contribution / (bs.get_power() / SCORE_POWER_UNIT))
}

/// Per-tick score delta: connected mobile stations add the contribution,
/// unserved ones subtract it.
pub fn score_tick(stations: &[BaseStation], mobiles: &[MobileStation], table: &AssociationTable) -> f64 {
    let _timing = logging::start_timing("score_tick", OperationCategory::Scoring);

    if mobiles.is_empty() {
        return 0.0;
    }
    let contribution = station_contribution(stations);
    mobiles
        .iter()
        .map(|ms| {
            if table.serving_station(ms.get_id()).is_some() {
                contribution
            } else {
                -contribution
            }
        })
        .sum()
}

/// Reported once per finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u64,
    pub final_score: f64,
    pub ticks: u64,
    pub connected_at_end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub tick: u64,
    pub score: f64,
    pub episodes_completed: u64,
    pub best_score: Option<f64>,
    pub total_score: f64,
}

impl EpisodeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self, score_delta: f64) {
        self.tick += 1;
        self.score += score_delta;
    }

    pub fn is_finished(&self, duration: u64) -> bool {
        self.tick >= duration
    }

    /// Closes the running episode: folds its score into the totals and
    /// resets tick and score to zero.
    pub fn finish(&mut self, connected_at_end: usize) -> EpisodeSummary {
        let summary = EpisodeSummary {
            episode: self.episodes_completed,
            final_score: self.score,
            ticks: self.tick,
            connected_at_end,
        };

        self.episodes_completed += 1;
        self.total_score += self.score;
        self.best_score = Some(match self.best_score {
            Some(best) if best >= self.score => best,
            _ => self.score,
        });
        self.tick = 0;
        self.score = 0.0;

        summary
    }

    pub fn mean_score(&self) -> Option<f64> {
        (self.episodes_completed > 0).then(|| self.total_score / self.episodes_completed as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::base_station::BaseStationId;
    use crate::models::coordinate::Coordinate;
    use crate::models::mobile_station::MobileStationId;

    fn bs(id: usize, power: f64) -> BaseStation {
        BaseStation::new(BaseStationId(id), Coordinate::new(0.0, 0.0), power, 1.0, 1e6)
    }

    fn ms(id: usize) -> MobileStation {
        MobileStation::new(MobileStationId(id), Coordinate::new(0.0, 0.0), (0.0, 0.0))
    }

    #[test]
    fn contribution_divides_by_each_on_station() {
        let stations = vec![bs(0, 2000.0), bs(1, 4000.0), bs(2, 1.0)];
        // The third station is at the floor and does not count.
        assert!((station_contribution(&stations) - 1.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn connected_add_and_unserved_subtract() {
        let stations = vec![bs(0, 2000.0)];
        let mobiles = vec![ms(0), ms(1), ms(2)];
        let mut table = AssociationTable::new(1, 3);
        table.assign(MobileStationId(0), Some(BaseStationId(0)));
        table.assign(MobileStationId(1), Some(BaseStationId(0)));

        assert!((score_tick(&stations, &mobiles, &table) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_population_scores_nothing() {
        let table = AssociationTable::new(0, 0);
        assert_eq!(score_tick(&[], &[], &table), 0.0);
    }

    #[test]
    fn finish_resets_tick_and_score() {
        let mut state = EpisodeState::new();
        state.record_tick(2.5);
        state.record_tick(-0.5);
        assert!(state.is_finished(2));

        let summary = state.finish(4);
        assert_eq!(summary.final_score, 2.0);
        assert_eq!(summary.ticks, 2);
        assert_eq!(state.tick, 0);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.best_score, Some(2.0));
    }

    #[test]
    fn best_and_mean_track_across_episodes() {
        let mut state = EpisodeState::new();
        state.record_tick(-3.0);
        state.finish(0);
        state.record_tick(1.0);
        state.finish(0);
        assert_eq!(state.best_score, Some(1.0));
        assert_eq!(state.mean_score(), Some(-1.0));
        assert_eq!(state.episodes_completed, 2);
    }
}
