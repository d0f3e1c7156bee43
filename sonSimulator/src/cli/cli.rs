use clap::Parser;

use crate::ai::EvolutionParams;
use crate::config::constants::*;

#[derive(Parser)]
#[command(author, version, about = "Self-organizing cellular network simulator", long_about = None)]
pub struct Args {
    #[arg(short, long, default_value_t = 20)]
    generations: usize,

    #[arg(short, long, help = "Evaluate each generation's networks in parallel")]
    parallel: bool,

    #[arg(long, help = "Random seed for deterministic simulation")]
    seed: Option<u64>,

    #[arg(long, help = "JSON file overriding the default simulation configuration")]
    config: Option<String>,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,

    #[arg(long, default_value = "results")]
    csv_dir: String,

    #[arg(long, help = "Replay the best policy for this many ticks on a worker thread", default_value_t = 0)]
    replay_ticks: u64,

    #[arg(long, help = "Replay speed multiplier; pacing is disabled when zero", default_value_t = DEFAULT_SPEED)]
    speed: f64,

    #[arg(long, help = "Write the final replay snapshot as JSON to this path")]
    snapshot_out: Option<String>,

    #[arg(long, default_value_t = DEFAULT_POPULATION_SIZE)]
    population_size: usize,

    #[arg(long, default_value_t = DEFAULT_ELITE_COUNT)]
    elite_count: usize,

    #[arg(long, default_value_t = DEFAULT_MUTATION_RATE)]
    mutation_rate: f64,
}

impl Args {
    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    pub fn csv_dir(&self) -> &str {
        &self.csv_dir
    }

    pub fn replay_ticks(&self) -> u64 {
        self.replay_ticks
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn snapshot_out(&self) -> Option<&str> {
        self.snapshot_out.as_deref()
    }

    pub fn evolution_params(&self) -> EvolutionParams {
        EvolutionParams {
            population_size: self.population_size,
            elite_count: self.elite_count,
            mutation_rate: self.mutation_rate,
            ..EvolutionParams::default()
        }
    }
}
