// Reference learning system for the power-control policy
// The simulation core only sees it through the `Policy` trait.

// Feed-forward network used as the policy
pub mod network;

// Population of networks improved by selection and mutation
pub mod evolution;

// Best/mean fitness bookkeeping per generation
pub mod stats;

// Episode evaluation and the generational training loop
pub mod trainer;

// Re-export common types for convenience
pub use evolution::{EvolutionParams, Population};
pub use network::FeedForwardNetwork;
pub use stats::{FitnessTracker, GenerationRecord};
pub use trainer::{evaluate_network, Trainer, TrainingOutcome};
