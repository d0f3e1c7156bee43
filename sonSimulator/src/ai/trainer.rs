use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, instrument};

use super::evolution::{EvolutionParams, Population};
use super::network::FeedForwardNetwork;
use super::stats::{FitnessTracker, GenerationRecord};
use crate::config::constants::POLICY_OUTPUT_WIDTH;
use crate::config::simulation_config::{ConfigError, SimulationConfig};
use crate::core::episode::EpisodeSummary;
use crate::core::simulation::Simulation;
use crate::utils::logging::{self, OperationCategory};

/// Runs one full episode with `network` as the policy.
pub fn evaluate_network(
    network: &FeedForwardNetwork,
    config: &SimulationConfig,
) -> Result<EpisodeSummary, ConfigError> {
    let mut simulation = Simulation::new(config.clone())?.with_policy(network.clone());
    Ok(simulation.run_episode())
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best_network: FeedForwardNetwork,
    pub best_score: f64,
    pub history: Vec<GenerationRecord>,
    pub episodes: Vec<EpisodeSummary>,
}

/// Generational loop: every member plays one episode, its final score is its
/// fitness, and the population evolves on those scores.
pub struct Trainer {
    config: SimulationConfig,
    population: Population,
    tracker: FitnessTracker,
    rng: StdRng,
    parallel: bool,
    best: Option<(FeedForwardNetwork, f64)>,
    episodes: Vec<EpisodeSummary>,
}

impl Trainer {
    pub fn new(config: SimulationConfig, params: EvolutionParams, parallel: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        params.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = Population::new(
            params,
            config.observation_width,
            POLICY_OUTPUT_WIDTH,
            1.0 / config.max_power,
            &mut rng,
        );

        Ok(Self {
            config,
            population,
            tracker: FitnessTracker::new(),
            rng,
            parallel,
            best: None,
            episodes: Vec::new(),
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn history(&self) -> &[GenerationRecord] {
        self.tracker.history()
    }

    /// Evaluates and evolves one generation. Every member faces the same
    /// seeded scenario so their scores are comparable.
    #[instrument(skip_all, fields(generation = self.population.generation()))]
    pub fn step_generation(&mut self) -> Result<GenerationRecord, ConfigError> {
        let _timing = logging::start_timing("step_generation", OperationCategory::Evolution);

        let scenario = self.config.clone().with_seed(Some(self.rng.gen()));
        let members = self.population.members();
        let summaries: Vec<EpisodeSummary> = if self.parallel {
            members
                .par_iter()
                .map(|network| evaluate_network(network, &scenario))
                .collect::<Result<_, _>>()?
        } else {
            members
                .iter()
                .map(|network| evaluate_network(network, &scenario))
                .collect::<Result<_, _>>()?
        };

        let scores: Vec<f64> = summaries.iter().map(|s| s.final_score).collect();
        let generation = self.population.generation();
        let record = self
            .tracker
            .record_generation(generation, &scores)
            .unwrap_or(GenerationRecord {
                generation,
                best: 0.0,
                mean: 0.0,
                best_overall: 0.0,
            });

        if let Some(champion) = self.population.evolve(&scores, &mut self.rng) {
            let improved = self.best.as_ref().map_or(true, |(_, best)| record.best > *best);
            if improved {
                self.best = Some((champion, record.best));
            }
        }
        self.episodes.extend(summaries);

        info!(
            generation = record.generation,
            best = record.best,
            mean = record.mean,
            best_overall = record.best_overall,
            "Generation evaluated"
        );
        Ok(record)
    }

    /// Runs `generations` generations, calling `on_generation` after each.
    pub fn train<F>(mut self, generations: usize, mut on_generation: F) -> Result<TrainingOutcome, ConfigError>
    where
        F: FnMut(&GenerationRecord),
    {
        for _ in 0..generations {
            let record = self.step_generation()?;
            on_generation(&record);
        }

        let (best_network, best_score) = match self.best {
            Some(best) => best,
            None => (
                self.population.members()[0].clone(),
                f64::NEG_INFINITY,
            ),
        };

        Ok(TrainingOutcome {
            best_network,
            best_score,
            history: self.tracker.history().to_vec(),
            episodes: self.episodes,
        })
    }
}
