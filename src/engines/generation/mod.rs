pub mod chromosome;
pub mod operators;
pub mod hall_of_fame;
pub mod evolution_engine;
pub mod progress;

pub use chromosome::{Chromosome, TraceStatus};
pub use hall_of_fame::{HallOfFame, EliteChromosome};
pub use evolution_engine::{EvolutionEngine, GenerationStats, ProgressCallback, SearchOutcome};
pub use operators::{crossover, mutate, tournament_selection, CrossoverOutcome};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage};
