use super::traits::ConfigSection;
use crate::error::UitestgenError;
use serde::{Deserialize, Serialize};

/// Parameters of the generational search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub max_chromosome_length: usize,
    /// Probability that a chromosome (not an action) is mutated
    pub mutation_rate: f64,
    pub elitism_count: usize,
    pub hall_of_fame_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 50,
            tournament_size: 5,
            max_chromosome_length: 30,
            mutation_rate: 1.0,
            elitism_count: 1,
            hall_of_fame_size: 5,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), UitestgenError> {
        if self.population_size == 0 {
            return Err(UitestgenError::Configuration(
                "Population size must be at least 1".to_string()
            ));
        }
        if self.generations == 0 {
            return Err(UitestgenError::Configuration(
                "Generations must be at least 1".to_string()
            ));
        }
        if self.tournament_size == 0 {
            return Err(UitestgenError::Configuration(
                "Tournament size must be at least 1".to_string()
            ));
        }
        if self.max_chromosome_length == 0 {
            return Err(UitestgenError::Configuration(
                "Max chromosome length must be at least 1".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(UitestgenError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        if self.elitism_count > self.population_size {
            return Err(UitestgenError::Configuration(format!(
                "Elitism count {} exceeds population size {}",
                self.elitism_count, self.population_size
            )));
        }
        if self.hall_of_fame_size == 0 {
            return Err(UitestgenError::Configuration(
                "Hall of fame size must be at least 1".to_string()
            ));
        }
        Ok(())
    }
}
