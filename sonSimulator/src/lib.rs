// Main module declarations for the self-organizing network simulator

// Core simulation modules
pub mod core {
    pub mod propagation;
    pub mod topology;
    pub mod association;
    pub mod power_control;
    pub mod episode;
    pub mod network;
    pub mod simulation;
    pub mod runner;
}

// Reference learning system that drives the power-control policy
pub mod ai;

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod simulation_config;
}

// Model definitions
pub mod models {
    pub mod coordinate;
    pub mod base_station;
    pub mod mobile_station;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod csv_export;
    pub mod snapshot_export;
    pub mod traits;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export commonly used modules
pub use crate::config::simulation_config::{ConfigError, SimulationConfig};
pub use crate::core::network::{Network, NetworkSnapshot};
pub use crate::core::simulation::Simulation;
pub use crate::models::base_station::{BaseStation, BaseStationId};
pub use crate::models::coordinate::Coordinate;
pub use crate::models::mobile_station::{MobileStation, MobileStationId};
pub use crate::utils::traits::{EpisodeObserver, Policy, TickObserver};
