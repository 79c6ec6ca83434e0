use crate::config::EvolutionConfig;
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::{
    chromosome::{compare_fitness_desc, Chromosome},
    hall_of_fame::{EliteChromosome, HallOfFame},
    operators::{
        action_for_element, crossover, mutate, random_walk_limit, tournament_selection,
        CrossoverOutcome, SEED_EDIT_VALUE,
    },
};
use crate::error::UitestgenError;
use crate::oracle::ExecutionOracle;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;

/// Summary of one evaluated generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub population_size: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub best_length: usize,
    /// Distinct page states across all traces of the generation
    pub distinct_states: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Global best, `None` when no chromosome was ever scored
    pub best: Option<Chromosome>,
    pub hall_of_fame: Vec<EliteChromosome>,
    pub generations: Vec<GenerationStats>,
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize, total: usize);
    fn on_chromosome_evaluated(&mut self, evaluated: usize, total: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats, hall_of_fame_size: usize);
}

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_generation_start(&mut self, generation: usize, total: usize) {
        (**self).on_generation_start(generation, total);
    }

    fn on_chromosome_evaluated(&mut self, evaluated: usize, total: usize) {
        (**self).on_chromosome_evaluated(evaluated, total);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats, hall_of_fame_size: usize) {
        (**self).on_generation_complete(stats, hall_of_fame_size);
    }
}

/// Generational search over UI action sequences.
///
/// Every generation is evaluated in full before selection, and selection
/// finishes before any offspring is produced. The oracle is one shared
/// session, reset to its baseline before each run.
pub struct EvolutionEngine<O: ExecutionOracle> {
    config: EvolutionConfig,
    oracle: O,
    evaluator: FitnessEvaluator,
    hall_of_fame: HallOfFame,
    rng: StdRng,
}

impl<O: ExecutionOracle> EvolutionEngine<O> {
    pub fn new(config: EvolutionConfig, oracle: O) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hall_of_fame = HallOfFame::new(config.hall_of_fame_size);

        Self {
            config,
            oracle,
            evaluator: FitnessEvaluator::default(),
            hall_of_fame,
            rng,
        }
    }

    pub fn with_evaluator(mut self, evaluator: FitnessEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Run the search. Only oracle tool failures are returned as errors.
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<SearchOutcome, UitestgenError> {
        info!("Starting genetic search...");
        self.oracle.start()?;

        let outcome = self.search(&mut callback);
        let stopped = self.oracle.stop();

        let outcome = outcome?;
        stopped?;
        info!("Genetic search finished.");
        Ok(outcome)
    }

    fn search<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<SearchOutcome, UitestgenError> {
        let mut history = Vec::with_capacity(self.config.generations);
        let mut population = self.initialize_population()?;

        if population.is_empty() {
            warn!("Population is empty; the site offers nothing to interact with");
            return Ok(self.outcome(history));
        }

        for generation in 0..self.config.generations {
            callback.on_generation_start(generation, self.config.generations);

            population = self.evaluate_population(population, callback)?;
            population.sort_by(compare_fitness_desc);

            if let Some(top) = population.first() {
                if self.hall_of_fame.record_best(top) {
                    debug!("New global best with fitness {:?}", top.fitness());
                }
            }
            for chromosome in &population {
                self.hall_of_fame.try_add(chromosome, generation);
            }

            let stats = generation_stats(generation, &population);
            callback.on_generation_complete(&stats, self.hall_of_fame.len());
            history.push(stats);

            // Check termination
            if generation + 1 == self.config.generations {
                break;
            }

            population = self.create_next_generation(&population);
        }

        Ok(self.outcome(history))
    }

    fn outcome(&self, generations: Vec<GenerationStats>) -> SearchOutcome {
        SearchOutcome {
            best: self.hall_of_fame.best().cloned(),
            hall_of_fame: self.hall_of_fame.get_all().to_vec(),
            generations,
        }
    }

    /// One single-action chromosome per element on the starting page, then
    /// random walks until the population is full or the attempt budget
    /// (twice the population size) runs out.
    fn initialize_population(&mut self) -> Result<Vec<Chromosome>, UitestgenError> {
        let target = self.config.population_size;
        info!("Initializing population of size {}...", target);

        self.oracle.reset()?;
        let mut population: Vec<Chromosome> = self
            .oracle
            .current_elements()?
            .iter()
            .filter_map(|element| action_for_element(element, SEED_EDIT_VALUE).ok())
            .map(Chromosome::from_action)
            .take(target)
            .collect();

        if population.is_empty() {
            warn!("No initial actions discovered on the starting page");
        }

        let max_attempts = 2 * target;
        let mut attempts = 0;
        while population.len() < target && attempts < max_attempts {
            attempts += 1;
            let walk = self.random_walk()?;
            if !walk.is_empty() {
                population.push(walk);
            }
        }

        if population.len() < target {
            warn!(
                "Population under-filled: {}/{} chromosomes after {} random walks",
                population.len(),
                target,
                attempts
            );
        }
        info!("Initialized population with {} chromosomes.", population.len());

        Ok(population)
    }

    /// A short sequence of actions, each picked from what the page offers at
    /// that point. Ends early, keeping what it has, if an action fails.
    fn random_walk(&mut self) -> Result<Chromosome, UitestgenError> {
        self.oracle.reset()?;

        let limit = random_walk_limit(self.config.max_chromosome_length);
        let steps = self
            .rng
            .gen_range(2..=limit)
            .min(self.config.max_chromosome_length);

        let mut actions = Vec::with_capacity(steps);
        for _ in 0..steps {
            let elements = self.oracle.current_elements()?;
            let Some(element) = elements.choose(&mut self.rng) else {
                break;
            };
            let Ok(action) = action_for_element(element, SEED_EDIT_VALUE) else {
                break;
            };
            if let Err(e) = self.oracle.execute(&action) {
                debug!("Random walk stopped at step {}: {}", actions.len(), e);
                break;
            }
            actions.push(action);
        }

        Ok(Chromosome::new(actions))
    }

    fn evaluate_population<C: ProgressCallback>(
        &mut self,
        population: Vec<Chromosome>,
        callback: &mut C,
    ) -> Result<Vec<Chromosome>, UitestgenError> {
        let total = population.len();
        let mut evaluated = Vec::with_capacity(total);

        for (i, chromosome) in population.into_iter().enumerate() {
            self.oracle.reset()?;
            let run = self.oracle.run(&chromosome)?;
            let scored = self.evaluator.score(chromosome, &run);

            debug!(
                "  [{}] fitness={:?} length={} states={} errors(exec/http/js)={}/{}/{} crashed={}",
                i + 1,
                scored.fitness(),
                scored.len(),
                run.states.len(),
                run.execution_errors.len(),
                run.http_errors.len(),
                run.js_errors.len(),
                run.crashed
            );
            callback.on_chromosome_evaluated(i + 1, total);
            evaluated.push(scored);
        }

        Ok(evaluated)
    }

    /// Elites carried over unchanged, the rest bred from tournament winners.
    /// `ranked` must be sorted best first.
    fn create_next_generation(&mut self, ranked: &[Chromosome]) -> Vec<Chromosome> {
        let size = self.config.population_size;
        let parents = tournament_selection(ranked, size, self.config.tournament_size, &mut self.rng);

        let mut next_generation: Vec<Chromosome> = ranked
            .iter()
            .take(self.config.elitism_count.min(size))
            .cloned()
            .collect();

        if parents.is_empty() {
            return next_generation;
        }

        let mut offspring = 0;
        let mut fallbacks = 0;
        while next_generation.len() < size {
            let parent1 = parents[self.rng.gen_range(0..parents.len())];
            let parent2 = parents[self.rng.gen_range(0..parents.len())];

            let (child, outcome) = crossover(
                parent1,
                parent2,
                self.config.max_chromosome_length,
                &mut self.rng,
            );
            if outcome == CrossoverOutcome::Duplicated {
                fallbacks += 1;
            }
            offspring += 1;

            next_generation.push(mutate(
                &child,
                self.config.mutation_rate,
                self.config.max_chromosome_length,
                &mut self.rng,
            ));
        }

        debug!(
            "Bred {} offspring, {} without a shared state to splice at",
            offspring, fallbacks
        );
        next_generation
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

fn generation_stats(generation: usize, ranked: &[Chromosome]) -> GenerationStats {
    let scores: Vec<f64> = ranked.iter().filter_map(Chromosome::fitness).collect();
    let mean_fitness = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    let distinct_states = ranked
        .iter()
        .flat_map(|c| c.states().iter().map(|s| s.hash.as_str()))
        .collect::<HashSet<_>>()
        .len();

    GenerationStats {
        generation,
        population_size: ranked.len(),
        best_fitness: ranked.first().and_then(Chromosome::fitness).unwrap_or(0.0),
        mean_fitness,
        best_length: ranked.first().map_or(0, Chromosome::len),
        distinct_states,
    }
}
