use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use super::association::AssociationStats;
use super::episode::{EpisodeState, EpisodeSummary};
use super::network::{Network, NetworkSnapshot};
use super::power_control::{self, PowerDecision};
use crate::config::simulation_config::{ConfigError, SimulationConfig};
use crate::models::base_station::BaseStation;
use crate::models::mobile_station::MobileStation;
use crate::utils::logging::{self, OperationCategory};
use crate::utils::traits::{EpisodeObserver, Policy, TickObserver};

/// What tick observers see after each tick.
#[derive(Debug)]
pub struct TickReport<'a> {
    /// Tick number within the episode, starting at 1.
    pub tick: u64,
    pub selected: Option<&'a BaseStation>,
    pub decision: Option<&'a PowerDecision>,
    pub mobile_stations: &'a [MobileStation],
    pub associations: AssociationStats,
    pub score_delta: f64,
    pub score: f64,
}

/// Result of a single call to [`Simulation::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub associations: AssociationStats,
    pub score_delta: f64,
    pub decision: Option<PowerDecision>,
    /// Set when this tick crossed the episode boundary.
    pub finished: Option<EpisodeSummary>,
}

/// Single-owner simulation state. Each tick runs, in order: mobility,
/// association refresh, scoring, one power-control decision, and the
/// episode-duration check.
pub struct Simulation {
    config: SimulationConfig,
    network: Network,
    episode: EpisodeState,
    rng: StdRng,
    policy: Option<Box<dyn Policy>>,
    tick_observers: Vec<Box<dyn TickObserver>>,
    episode_observers: Vec<Box<dyn EpisodeObserver>>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let network = Network::build(&config, &mut rng)?;

        Ok(Self {
            config,
            network,
            episode: EpisodeState::new(),
            rng,
            policy: None,
            tick_observers: Vec::new(),
            episode_observers: Vec::new(),
        })
    }

    /// Replaces the generated population with a hand-built one. The next
    /// episode restart rebuilds from the configuration as usual.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_policy<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.set_policy(policy);
        self
    }

    pub fn set_policy<P: Policy + 'static>(&mut self, policy: P) {
        self.policy = Some(Box::new(policy));
    }

    pub fn clear_policy(&mut self) {
        self.policy = None;
    }

    pub fn add_tick_observer<O: TickObserver + 'static>(&mut self, observer: O) {
        self.tick_observers.push(Box::new(observer));
    }

    pub fn add_episode_observer<O: EpisodeObserver + 'static>(&mut self, observer: O) {
        self.episode_observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot(self.episode.tick, self.episode.score)
    }

    pub fn tick(&mut self) -> TickOutcome {
        let _timing = logging::start_timing("tick", OperationCategory::Simulation);

        self.network.step_mobiles();
        let associations = self.network.refresh_associations();
        let score_delta = self.network.score_tick();
        self.episode.record_tick(score_delta);

        let decision = power_control::control_step(
            self.network.base_stations_mut(),
            self.policy.as_deref(),
            self.config.observation_width,
            self.config.power_resolution,
            &mut self.rng,
        );

        if !self.tick_observers.is_empty() {
            let report = TickReport {
                tick: self.episode.tick,
                selected: decision.as_ref().and_then(|d| self.network.base_station(d.station)),
                decision: decision.as_ref(),
                mobile_stations: self.network.mobile_stations(),
                associations,
                score_delta,
                score: self.episode.score,
            };
            for observer in &mut self.tick_observers {
                observer.on_tick(&report);
            }
        }

        let finished = if self.episode.is_finished(self.config.episode_duration) {
            Some(self.finish_episode())
        } else {
            None
        };

        TickOutcome {
            associations,
            score_delta,
            decision,
            finished,
        }
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Vec<EpisodeSummary> {
        (0..ticks).filter_map(|_| self.tick().finished).collect()
    }

    /// Ticks until the running episode ends and returns its summary.
    pub fn run_episode(&mut self) -> EpisodeSummary {
        loop {
            if let Some(summary) = self.tick().finished {
                return summary;
            }
        }
    }

    /// Throws away the current population and score and starts over.
    pub fn restart(&mut self) {
        self.episode.tick = 0;
        self.episode.score = 0.0;
        self.rebuild_network();
    }

    fn finish_episode(&mut self) -> EpisodeSummary {
        let summary = self.episode.finish(self.network.connected_count());
        info!(
            episode = summary.episode,
            score = summary.final_score,
            connected = summary.connected_at_end,
            "Episode finished"
        );
        for observer in &mut self.episode_observers {
            observer.on_episode_finished(&summary);
        }
        self.rebuild_network();
        summary
    }

    fn rebuild_network(&mut self) {
        // The configuration was validated in `new`, so the grid is non-empty.
        match Network::build(&self.config, &mut self.rng) {
            Ok(network) => self.network = network,
            Err(e) => warn!("Keeping previous network: {}", e),
        }
    }
}
