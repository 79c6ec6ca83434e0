use crate::types::{Action, PageState};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Where a chromosome's state trace came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    /// No trace, or the actions changed since the last run
    Unknown,
    /// Stitched together by crossover; not yet confirmed by a run
    Provisional,
    /// Recorded by the fitness evaluator from a real run
    Verified,
}

/// Candidate UI test: an ordered action sequence plus the page states it visited.
///
/// When a full run succeeds, `states.len() == actions.len() + 1`: index 0 is the
/// page before any action, index `i + 1` the page after action `i`. A run that
/// aborts early leaves a shorter trace.
#[derive(Debug, Clone, Serialize)]
pub struct Chromosome {
    actions: Vec<Action>,
    states: Vec<PageState>,
    trace: TraceStatus,
    fitness: Option<f64>,
}

impl Chromosome {
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            states: Vec::new(),
            trace: TraceStatus::Unknown,
            fitness: None,
        }
    }

    pub fn from_action(action: Action) -> Self {
        Self::new(vec![action])
    }

    /// Chromosome whose trace is an unverified assumption (crossover output)
    pub fn with_provisional_trace(actions: Vec<Action>, states: Vec<PageState>) -> Self {
        let trace = if states.is_empty() {
            TraceStatus::Unknown
        } else {
            TraceStatus::Provisional
        };
        Self {
            actions,
            states,
            trace,
            fitness: None,
        }
    }

    /// Functional update used by the fitness evaluator: same actions, new
    /// score and a ground-truth trace.
    pub(crate) fn scored(self, fitness: f64, states: Vec<PageState>) -> Self {
        Self {
            actions: self.actions,
            states,
            trace: TraceStatus::Verified,
            fitness: Some(fitness),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn states(&self) -> &[PageState] {
        &self.states
    }

    pub fn trace_status(&self) -> TraceStatus {
        self.trace
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness for ranking purposes; unscored chromosomes lose to everything.
    pub fn ranking_fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Drop `actions[cut..]`.
    pub(crate) fn truncate_actions(&mut self, cut: usize) {
        self.actions.truncate(cut);
        self.invalidate();
    }

    /// Insert `action` at `point` and discard everything that followed it.
    pub(crate) fn splice_action(&mut self, point: usize, action: Action) {
        self.actions.truncate(point);
        self.actions.push(action);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.states.clear();
        self.trace = TraceStatus::Unknown;
        self.fitness = None;
    }
}

/// Descending fitness order, unscored last. Stable under `sort_by`.
pub fn compare_fitness_desc(a: &Chromosome, b: &Chromosome) -> Ordering {
    b.ranking_fitness()
        .partial_cmp(&a.ranking_fitness())
        .unwrap_or(Ordering::Equal)
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fitness = match self.fitness {
            Some(fitness) => format!("{:.3}", fitness),
            None => "??".to_string(),
        };
        let actions: Vec<String> = self.actions.iter().map(|a| a.to_string()).collect();
        write!(
            f,
            "Chromosome(fitness={}, length={}, actions=[\n{}\n])",
            fitness,
            self.len(),
            actions.join(",\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementType, UIElement};

    fn click(id: &str) -> Action {
        Action::click(UIElement::new(ElementType::Button).with_id(id)).unwrap()
    }

    #[test]
    fn test_structural_change_clears_trace() {
        let states = vec![PageState::new("a", vec![]), PageState::new("b", vec![])];
        let mut chromosome = Chromosome::with_provisional_trace(vec![click("x")], states);
        assert_eq!(chromosome.trace_status(), TraceStatus::Provisional);

        chromosome.splice_action(1, click("y"));
        assert_eq!(chromosome.len(), 2);
        assert!(chromosome.states().is_empty());
        assert_eq!(chromosome.trace_status(), TraceStatus::Unknown);
        assert_eq!(chromosome.fitness(), None);
    }

    #[test]
    fn test_scored_is_verified() {
        let chromosome = Chromosome::from_action(click("x"))
            .scored(42.0, vec![PageState::new("a", vec![])]);
        assert_eq!(chromosome.trace_status(), TraceStatus::Verified);
        assert_eq!(chromosome.fitness(), Some(42.0));
    }

    #[test]
    fn test_ordering_puts_unscored_last() {
        let unscored = Chromosome::from_action(click("a"));
        let crashed = Chromosome::from_action(click("b")).scored(-1.0, vec![]);
        let good = Chromosome::from_action(click("c")).scored(10.0, vec![]);

        let mut population = vec![unscored, crashed, good];
        population.sort_by(compare_fitness_desc);
        let fitness: Vec<Option<f64>> = population.iter().map(|c| c.fitness()).collect();
        assert_eq!(fitness, vec![Some(10.0), Some(-1.0), None]);
    }

    #[test]
    fn test_display_unscored() {
        let rendered = Chromosome::from_action(click("go")).to_string();
        assert!(rendered.starts_with("Chromosome(fitness=??, length=1"));
        assert!(rendered.contains("CLICK button[id='go']"));
    }
}
