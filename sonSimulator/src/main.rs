use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use sonsim::ai::{FeedForwardNetwork, Trainer, TrainingOutcome};
use sonsim::cli::cli::Args;
use sonsim::core::runner::SimulationRunner;
use sonsim::utils::csv_export::CsvExporter;
use sonsim::utils::snapshot_export::write_snapshot;
use sonsim::utils::logging::{self, FileIOType, OperationCategory};
use sonsim::{NetworkSnapshot, Simulation, SimulationConfig};

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging());

    println!("Self-Organizing Network Simulator");
    println!(
        "Generations: {}, parallel: {}, seed: {}",
        args.generations(),
        if args.parallel() { "enabled" } else { "disabled" },
        args.seed().map_or_else(|| "random".to_string(), |s| s.to_string()),
    );

    let config = load_config(&args)?;
    let outcome = train(&args, &config)?;

    let exporter = CsvExporter::new(args.csv_dir())?;
    exporter.export_generation_history(&outcome.history)?;
    exporter.export_episode_scores(&outcome.episodes)?;
    println!(
        "Best score {:.4}; results written to {}",
        outcome.best_score,
        exporter.output_dir().display()
    );

    let snapshot = if args.replay_ticks() > 0 {
        Some(replay(&args, &config, outcome.best_network)?)
    } else if args.snapshot_out().is_some() {
        // No replay requested: dump the starting state the best policy would face.
        Some(Simulation::new(config.clone())?.with_policy(outcome.best_network).snapshot())
    } else {
        None
    };
    if let (Some(path), Some(snapshot)) = (args.snapshot_out(), snapshot) {
        write_snapshot(path, &snapshot)?;
    }

    logging::print_timing_report();
    Ok(())
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let _timing = logging::start_timing(
        "load_config",
        OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad },
    );

    let config = match args.config() {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => SimulationConfig::default(),
    };
    let config = match args.seed() {
        Some(seed) => config.with_seed(Some(seed)),
        None => config,
    };
    config.validate().context("Invalid simulation configuration")?;
    Ok(config)
}

fn train(args: &Args, config: &SimulationConfig) -> Result<TrainingOutcome> {
    let progress = ProgressBar::new(args.generations() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    progress.enable_steady_tick(Duration::from_millis(200));

    let trainer = Trainer::new(config.clone(), args.evolution_params(), args.parallel())
        .context("Failed to set up trainer")?;
    let outcome = trainer.train(args.generations(), |record| {
        progress.set_message(format!("best {:.4} mean {:.4}", record.best, record.mean));
        progress.inc(1);
    })?;

    progress.finish_with_message(format!("best overall {:.4}", outcome.best_score));
    Ok(outcome)
}

fn replay(args: &Args, config: &SimulationConfig, policy: FeedForwardNetwork) -> Result<NetworkSnapshot> {
    let simulation = Simulation::new(config.clone())?.with_policy(policy);
    let paced = args.speed() > 0.0;
    let runner = SimulationRunner::start_for(simulation, paced, args.replay_ticks())
        .context("Failed to spawn simulation worker")?;
    if paced {
        runner.change_speed(args.speed());
    }
    info!(ticks = args.replay_ticks(), paced, "Replaying best policy");

    let simulation = runner.join().context("Simulation worker did not return")?;
    let snapshot = simulation.snapshot();
    println!(
        "Replay finished at tick {} with score {:.4} ({} episodes completed)",
        snapshot.tick,
        snapshot.score,
        simulation.episode().episodes_completed
    );
    Ok(snapshot)
}
