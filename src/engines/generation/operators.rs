use crate::engines::generation::chromosome::Chromosome;
use crate::error::Result;
use crate::types::{Action, ElementType, PageState, UIElement};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

/// Text typed into inputs by seed and random-walk actions
pub const SEED_EDIT_VALUE: &str = "test";
/// Text typed into inputs by mutation
pub const MUTATION_EDIT_VALUE: &str = "mutated_text";

/// The natural action for an element: click buttons and links, fill inputs.
pub fn action_for_element(element: &UIElement, edit_value: &str) -> Result<Action> {
    match element.element_type {
        ElementType::Button | ElementType::Link => Action::click(element.clone()),
        ElementType::Input => Action::edit(element.clone(), edit_value),
    }
}

/// Longest random walk used to seed the population
pub fn random_walk_limit(max_chromosome_length: usize) -> usize {
    (max_chromosome_length / 2).max(2).min(5)
}

/// Tournament selection: fill a parent pool of `pool_size` entries.
///
/// Each tournament draws `tournament_size` distinct entrants (clamped to the
/// population size) and keeps the one with the strictly highest fitness, so
/// ties go to whichever entrant was drawn first. The population is sampled
/// with replacement across tournaments.
pub fn tournament_selection<'a, R: Rng>(
    population: &'a [Chromosome],
    pool_size: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<&'a Chromosome> {
    if population.is_empty() {
        return Vec::new();
    }
    let entrants = tournament_size.clamp(1, population.len());

    (0..pool_size)
        .map(|_| run_tournament(population, entrants, rng))
        .collect()
}

fn run_tournament<'a, R: Rng>(
    population: &'a [Chromosome],
    entrants: usize,
    rng: &mut R,
) -> &'a Chromosome {
    let mut winner: Option<&'a Chromosome> = None;

    for idx in index::sample(rng, population.len(), entrants) {
        let candidate = &population[idx];
        match winner {
            Some(best) if candidate.ranking_fitness() <= best.ranking_fitness() => {}
            _ => winner = Some(candidate),
        }
    }

    winner.unwrap_or(&population[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverOutcome {
    /// Parents shared a state and were cut and spliced there
    Spliced,
    /// No shared state; the child is a copy of one parent
    Duplicated,
}

/// State-aware cut-and-splice crossover.
///
/// The child takes A's actions up to a state both parents visited, then B's
/// actions from that state on. Parents that never visited a common state are
/// not recombined; one of them is copied instead. The child's trace is
/// provisional until the next evaluation.
pub fn crossover<R: Rng>(
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    max_length: usize,
    rng: &mut R,
) -> (Chromosome, CrossoverOutcome) {
    let a_hashes: HashSet<&str> = parent_a.states().iter().map(|s| s.hash.as_str()).collect();
    // Ordered so seeded runs pick the same cut point
    let shared: Vec<&str> = parent_b
        .states()
        .iter()
        .map(|s| s.hash.as_str())
        .filter(|hash| a_hashes.contains(hash))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let Some(&cut_hash) = shared.choose(rng) else {
        let parent = if rng.gen_bool(0.5) { parent_a } else { parent_b };
        return (parent.clone(), CrossoverOutcome::Duplicated);
    };

    let (Some(cut_a), Some(cut_b)) = (
        last_index_of(parent_a.states(), cut_hash),
        last_index_of(parent_b.states(), cut_hash),
    ) else {
        return (parent_a.clone(), CrossoverOutcome::Duplicated);
    };

    let mut actions: Vec<Action> = parent_a.actions()[..cut_a.min(parent_a.len())].to_vec();
    actions.extend_from_slice(&parent_b.actions()[cut_b.min(parent_b.len())..]);

    let mut states: Vec<PageState> = parent_a.states()[..=cut_a].to_vec();
    states.extend_from_slice(&parent_b.states()[cut_b + 1..]);

    actions.truncate(max_length);
    states.truncate(actions.len() + 1);

    (
        Chromosome::with_provisional_trace(actions, states),
        CrossoverOutcome::Spliced,
    )
}

fn last_index_of(states: &[PageState], hash: &str) -> Option<usize> {
    states.iter().rposition(|s| s.hash == hash)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Insert,
    Delete,
}

/// Append is three times as likely as insert or delete
const MUTATION_WHEEL: [MutationKind; 5] = [
    MutationKind::Add,
    MutationKind::Add,
    MutationKind::Add,
    MutationKind::Insert,
    MutationKind::Delete,
];

/// Validity-preserving mutation, applied to the whole chromosome with
/// probability `mutation_rate`.
///
/// New actions are drawn from the elements recorded in the state at the
/// insertion point, and everything after the inserted action is discarded,
/// so the result always ends at a point where its last action was known to be
/// applicable. Deletion truncates the suffix from a random index. Any
/// structural change clears the trace.
pub fn mutate<R: Rng>(
    chromosome: &Chromosome,
    mutation_rate: f64,
    max_length: usize,
    rng: &mut R,
) -> Chromosome {
    let mut mutated = chromosome.clone();
    if !rng.gen_bool(mutation_rate.clamp(0.0, 1.0)) {
        return mutated;
    }

    let len = mutated.len();
    let mut kind = if len > 1 {
        MUTATION_WHEEL.choose(rng).copied().unwrap_or(MutationKind::Add)
    } else {
        MutationKind::Add
    };
    if kind != MutationKind::Delete && mutated.states().is_empty() {
        kind = MutationKind::Delete;
    }

    match kind {
        MutationKind::Delete => {
            if len > 0 {
                let cut = rng.gen_range(0..len);
                mutated.truncate_actions(cut);
            }
        }
        MutationKind::Add | MutationKind::Insert => {
            if max_length == 0 {
                return mutated;
            }
            let point = if kind == MutationKind::Add {
                len
            } else {
                rng.gen_range(0..len)
            };
            // A run that aborted early leaves the trace short of the end;
            // insert at the last state actually observed instead.
            let point = point
                .min(mutated.states().len() - 1)
                .min(max_length - 1);

            let Some(element) = mutated.states()[point].available_elements.choose(rng) else {
                return mutated;
            };
            let action = match action_for_element(element, MUTATION_EDIT_VALUE) {
                Ok(action) => action,
                Err(e) => {
                    log::debug!("Skipping mutation: {}", e);
                    return mutated;
                }
            };
            mutated.splice_action(point, action);
        }
    }

    mutated
}
