use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uitestgen::engines::evaluation::FitnessEvaluator;
use uitestgen::engines::generation::{
    crossover, mutate, tournament_selection, Chromosome, CrossoverOutcome, TraceStatus,
};
use uitestgen::oracle::RunResult;
use uitestgen::types::{Action, ElementType, PageState, UIElement};

fn button(id: &str) -> UIElement {
    UIElement::new(ElementType::Button).with_id(id)
}

/// A chromosome clicking `ids` whose trace visited `hashes`; every state
/// offers one follow-up button named after it
fn traced(ids: &[&str], hashes: &[&str]) -> Chromosome {
    let actions = ids.iter().map(|id| Action::click(button(id)).unwrap()).collect();
    let states = hashes
        .iter()
        .map(|h| PageState::new(*h, vec![button(&format!("{}-next", h))]))
        .collect();
    Chromosome::with_provisional_trace(actions, states)
}

fn labels(chromosome: &Chromosome) -> Vec<String> {
    chromosome.actions().iter().map(ToString::to_string).collect()
}

#[test]
fn test_crossover_child_never_exceeds_max_length() {
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..200 {
        let len_a = rng.gen_range(1..8);
        let len_b = rng.gen_range(1..8);
        let ids_a: Vec<String> = (0..len_a).map(|i| format!("a{}", i)).collect();
        let ids_b: Vec<String> = (0..len_b).map(|i| format!("b{}", i)).collect();
        // Both traces draw from a small hash alphabet so they overlap often
        let hashes_a: Vec<String> = (0..=len_a).map(|_| format!("s{}", rng.gen_range(0..4))).collect();
        let hashes_b: Vec<String> = (0..=len_b).map(|_| format!("s{}", rng.gen_range(0..4))).collect();

        let a = traced(
            &ids_a.iter().map(String::as_str).collect::<Vec<_>>(),
            &hashes_a.iter().map(String::as_str).collect::<Vec<_>>(),
        );
        let b = traced(
            &ids_b.iter().map(String::as_str).collect::<Vec<_>>(),
            &hashes_b.iter().map(String::as_str).collect::<Vec<_>>(),
        );

        let max_length = rng.gen_range(1..6);
        let (child, outcome) = crossover(&a, &b, max_length, &mut rng);
        if outcome == CrossoverOutcome::Spliced {
            assert!(child.len() <= max_length);
            assert!(child.states().len() <= child.len() + 1);
        }
    }
}

#[test]
fn test_crossover_splices_at_shared_state() {
    let a = traced(&["a0", "a1", "a2"], &["home", "login", "shared", "a-end"]);
    let b = traced(&["b0", "b1", "b2"], &["home2", "shared", "b-mid", "b-end"]);
    let mut rng = StdRng::seed_from_u64(4);

    let (child, outcome) = crossover(&a, &b, 30, &mut rng);

    assert_eq!(outcome, CrossoverOutcome::Spliced);
    assert_eq!(
        labels(&child),
        vec!["CLICK button[id='a0']", "CLICK button[id='a1']", "CLICK button[id='b1']", "CLICK button[id='b2']"]
    );
    let hashes: Vec<&str> = child.states().iter().map(|s| s.hash.as_str()).collect();
    assert_eq!(hashes, vec!["home", "login", "shared", "b-mid", "b-end"]);
    assert_eq!(child.trace_status(), TraceStatus::Provisional);
    assert_eq!(child.fitness(), None);
}

#[test]
fn test_disjoint_parents_duplicate_one_parent() {
    let a = traced(&["a0", "a1"], &["x0", "x1", "x2"]);
    let b = traced(&["b0"], &["y0", "y1"]);
    let mut rng = StdRng::seed_from_u64(12);

    for _ in 0..50 {
        let (child, outcome) = crossover(&a, &b, 30, &mut rng);
        assert_eq!(outcome, CrossoverOutcome::Duplicated);
        let child_labels = labels(&child);
        assert!(child_labels == labels(&a) || child_labels == labels(&b));
    }
}

#[test]
fn test_zero_mutation_rate_is_identity() {
    let parent = traced(&["a0", "a1", "a2"], &["s0", "s1", "s2", "s3"]);
    let mut rng = StdRng::seed_from_u64(8);

    for _ in 0..100 {
        let child = mutate(&parent, 0.0, 30, &mut rng);
        assert_eq!(child.actions(), parent.actions());
        assert_eq!(child.states(), parent.states());
    }
}

#[test]
fn test_mutation_only_adds_actions_from_recorded_states() {
    let parent = traced(&["a0", "a1"], &["s0", "s1", "s2"]);
    let mut rng = StdRng::seed_from_u64(17);
    let mut grown = 0;

    for _ in 0..500 {
        let child = mutate(&parent, 1.0, 30, &mut rng);
        assert_eq!(child.trace_status(), TraceStatus::Unknown);
        assert!(child.states().is_empty());
        assert_eq!(child.fitness(), None);

        let n = child.len();
        if n > 0 && child.actions()[n - 1].target() == parent.states()[n - 1].available_elements.first() {
            // Add or insert at n - 1: prefix kept, everything after the new action dropped
            assert_eq!(child.actions()[..n - 1], parent.actions()[..n - 1]);
            grown += 1;
        } else {
            // Delete: a strict prefix of the parent
            assert!(n < parent.len());
            assert_eq!(child.actions(), &parent.actions()[..n]);
        }
    }

    assert!(grown > 0);
}

#[test]
fn test_insertion_draws_from_state_at_insertion_point() {
    let parent = traced(&["a0", "a1", "a2", "a3"], &["s0", "s1", "s2", "s3", "s4"]);
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..500 {
        let child = mutate(&parent, 1.0, 30, &mut rng);
        let n = child.len();
        if n == 0 {
            continue;
        }
        let last = child.actions()[n - 1].to_string();
        let expected = format!("CLICK button[id='s{}-next']", n - 1);
        if last.ends_with("-next']") {
            assert_eq!(last, expected);
            assert_eq!(labels(&child)[..n - 1], labels(&parent)[..n - 1]);
        }
    }
}

#[test]
fn test_tournament_prefers_fitter_entrants() {
    fn run(hashes: &[&str]) -> RunResult {
        RunResult {
            states: hashes.iter().map(|h| PageState::new(*h, vec![])).collect(),
            ..RunResult::default()
        }
    }

    let evaluator = FitnessEvaluator::default();
    let weak = evaluator.score(Chromosome::from_action(Action::click(button("weak")).unwrap()), &run(&["a"]));
    let strong = evaluator.score(
        Chromosome::from_action(Action::click(button("strong")).unwrap()),
        &run(&["a", "b", "c"]),
    );
    let population = vec![weak, strong];
    let mut rng = StdRng::seed_from_u64(2);

    // Tournament as large as the population always sees both
    let pool = tournament_selection(&population, 20, 5, &mut rng);
    assert_eq!(pool.len(), 20);
    assert!(pool.iter().all(|c| c.fitness() == population[1].fitness()));
}
