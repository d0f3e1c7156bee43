use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::network::FeedForwardNetwork;
use crate::config::constants::*;
use crate::config::simulation_config::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    pub population_size: usize,
    pub hidden_size: usize,
    pub hidden_layers: usize,
    pub mutation_rate: f64,
    pub elite_count: usize,
    pub mutation_scale: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            hidden_size: DEFAULT_HIDDEN_SIZE,
            hidden_layers: DEFAULT_HIDDEN_LAYERS,
            mutation_rate: DEFAULT_MUTATION_RATE,
            elite_count: DEFAULT_ELITE_COUNT,
            mutation_scale: DEFAULT_MUTATION_SCALE,
        }
    }
}

impl EvolutionParams {
    /// Mutation rate must be a probability and the mutation scale a finite,
    /// non-negative step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::OutOfRange {
                name: "mutation_rate",
                value: self.mutation_rate,
            });
        }
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "mutation_scale",
                value: self.mutation_scale,
            });
        }
        Ok(())
    }
}

/// A generation of candidate policies. Elites survive unchanged; the rest of
/// the next generation are mutated copies of them.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<FeedForwardNetwork>,
    generation: usize,
    params: EvolutionParams,
}

impl Population {
    pub fn new<R: Rng + ?Sized>(
        params: EvolutionParams,
        input_size: usize,
        output_size: usize,
        input_scale: f64,
        rng: &mut R,
    ) -> Self {
        let size = params.population_size.max(1);
        let members = (0..size)
            .map(|_| {
                FeedForwardNetwork::random(
                    input_size,
                    params.hidden_layers,
                    params.hidden_size,
                    output_size,
                    input_scale,
                    rng,
                )
            })
            .collect();

        Self {
            members,
            generation: 0,
            params,
        }
    }

    pub fn members(&self) -> &[FeedForwardNetwork] {
        &self.members
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Replaces the population using one fitness per member, in member
    /// order. Returns the fittest member of the evaluated generation, or
    /// `None` (leaving the population untouched) when the fitness count does
    /// not match.
    pub fn evolve<R: Rng + ?Sized>(&mut self, fitness: &[f64], rng: &mut R) -> Option<FeedForwardNetwork> {
        if fitness.len() != self.members.len() {
            return None;
        }

        let mut ranked: Vec<usize> = (0..self.members.len()).collect();
        // Stable sort keeps earlier members ahead on equal fitness.
        ranked.sort_by(|&a, &b| {
            fitness[b]
                .partial_cmp(&fitness[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let elite_count = self.params.elite_count.clamp(1, self.members.len());
        let elites: Vec<FeedForwardNetwork> = ranked[..elite_count]
            .iter()
            .map(|&i| self.members[i].clone())
            .collect();
        let champion = elites[0].clone();

        let mut next = elites.clone();
        let mut parent = 0;
        while next.len() < self.members.len() {
            let mut child = elites[parent % elite_count].clone();
            child.mutate(self.params.mutation_rate, self.params.mutation_scale, rng);
            next.push(child);
            parent += 1;
        }

        debug!(
            generation = self.generation,
            best = fitness[ranked[0]],
            "Evolved population"
        );

        self.members = next;
        self.generation += 1;
        Some(champion)
    }
}
