pub mod fitness;
pub mod noise;

pub use fitness::{FitnessBreakdown, FitnessEvaluator, CRASH_FITNESS};
pub use noise::{NoiseFilter, DEFAULT_NOISE_PATTERNS};
