use super::noise::NoiseFilter;
use crate::engines::generation::chromosome::Chromosome;
use crate::oracle::RunResult;
use std::collections::HashSet;

/// Fitness of a chromosome whose run crashed the session. Sorts below every
/// other score, but is still a recorded fitness.
pub const CRASH_FITNESS: f64 = -1.0;

pub const STATE_REWARD: f64 = 50.0;
pub const SERVER_ERROR_BOUNTY: f64 = 1000.0;
pub const CLIENT_ERROR_BOUNTY: f64 = 20.0;
pub const SCRIPT_ERROR_BOUNTY: f64 = 150.0;

/// The components a fitness score is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    pub crashed: bool,
    pub unique_states: usize,
    pub bug_bounty: f64,
    pub length_penalty: f64,
}

impl FitnessBreakdown {
    pub fn total(&self) -> f64 {
        if self.crashed {
            return CRASH_FITNESS;
        }
        let base = self.unique_states as f64 * STATE_REWARD;
        (base + self.bug_bounty + self.length_penalty).max(0.0)
    }
}

/// Scores a run: exploration (distinct states), application defects found
/// (filtered through the noise block-list) and a small length penalty.
#[derive(Debug, Clone, Default)]
pub struct FitnessEvaluator {
    noise: NoiseFilter,
}

impl FitnessEvaluator {
    pub fn new(noise: NoiseFilter) -> Self {
        Self { noise }
    }

    pub fn breakdown(&self, chromosome: &Chromosome, run: &RunResult) -> FitnessBreakdown {
        let unique_states = run
            .states
            .iter()
            .map(|state| state.hash.as_str())
            .collect::<HashSet<_>>()
            .len();

        let http_bounty: f64 = run
            .http_errors
            .iter()
            .filter(|event| !self.noise.is_noise(&event.url))
            .map(|event| match event.status {
                500..=599 => SERVER_ERROR_BOUNTY,
                400..=499 => CLIENT_ERROR_BOUNTY,
                _ => 0.0,
            })
            .sum();

        let js_bounty = run
            .js_errors
            .iter()
            .filter(|event| !self.noise.is_noise(&event.url))
            .count() as f64
            * SCRIPT_ERROR_BOUNTY;

        FitnessBreakdown {
            crashed: run.crashed,
            unique_states,
            bug_bounty: http_bounty + js_bounty,
            length_penalty: -(chromosome.len() as f64),
        }
    }

    pub fn fitness(&self, chromosome: &Chromosome, run: &RunResult) -> f64 {
        self.breakdown(chromosome, run).total()
    }

    /// Score `chromosome` and attach the run's state trace as ground truth.
    pub fn score(&self, chromosome: Chromosome, run: &RunResult) -> Chromosome {
        let fitness = self.fitness(&chromosome, run);
        chromosome.scored(fitness, run.states.clone())
    }
}
