// Map Constants
pub const WINDOW_SIZE: f64 = 600.0;

// Grid Layout Constants
pub const DEFAULT_GRID_ROWS: usize = 4;
pub const DEFAULT_GRID_COLS: usize = 4;
pub const MAX_NEIGHBORS: usize = 6;              // Hexagonal lattice

// Base Station Power Constants
pub const DEFAULT_POWER: f64 = 200_000.0;
pub const MIN_POWER: f64 = 1.0;                  // Stations at or below this are off
pub const MAX_POWER: f64 = 650_000.0;
pub const POWER_DENSITY_THRESHOLD: f64 = 1.0;    // Minimum density for a usable link

// Power Control Constants
pub const POWER_RESOLUTION: f64 = 100.0;         // Scale on (increase - decrease) policy output
pub const OBSERVATION_WIDTH: usize = 1 + MAX_NEIGHBORS;
pub const POLICY_OUTPUT_WIDTH: usize = 2;

// Scoring Constants
pub const SCORE_POWER_UNIT: f64 = 1000.0;        // Each on station divides a contribution by power / unit

// Mobile Station Constants
pub const DEFAULT_MOBILE_STATIONS: usize = 10;
pub const MOBILE_VELOCITY_SPAN: f64 = 0.5;       // Velocity components drawn from [-span, span)
pub const DEFAULT_MOBILE_SPEED: f64 = 1.0;

// Episode and Pacing Constants
pub const DEFAULT_EPISODE_DURATION: u64 = 1000;  // Ticks
pub const DEFAULT_TICK_RATE: f64 = 60.0;         // Ticks per second at speed 1.0
pub const DEFAULT_SPEED: f64 = 1.0;
pub const MIN_SPEED: f64 = 0.1;

// Evolution Defaults
pub const DEFAULT_POPULATION_SIZE: usize = 10;
pub const DEFAULT_HIDDEN_SIZE: usize = 4;
pub const DEFAULT_HIDDEN_LAYERS: usize = 1;
pub const DEFAULT_MUTATION_RATE: f64 = 0.5;
pub const DEFAULT_ELITE_COUNT: usize = 3;
pub const DEFAULT_MUTATION_SCALE: f64 = 10.0;
