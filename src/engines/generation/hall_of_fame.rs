use crate::engines::generation::chromosome::Chromosome;
use crate::types::Action;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Clone, Debug, Serialize)]
pub struct EliteChromosome {
    pub chromosome: Chromosome,
    pub fitness: f64,
    pub generation: usize,       // Generation it was first recorded in
    pub canonical_string: String, // For deduplication
}

/// Best chromosomes seen across the whole search.
///
/// Holds two things: the single global best, replaced only on strict
/// improvement, and the top `max_size` distinct action sequences.
pub struct HallOfFame {
    entries: Vec<EliteChromosome>,
    max_size: usize,
    seen_signatures: HashSet<String>,
    best: Option<Chromosome>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size: max_size.max(1),
            seen_signatures: HashSet::new(),
            best: None,
        }
    }

    /// Snapshot `candidate` as the global best if it strictly beats the current one.
    pub fn record_best(&mut self, candidate: &Chromosome) -> bool {
        let Some(fitness) = candidate.fitness() else {
            return false;
        };
        let improved = match self.best.as_ref().and_then(Chromosome::fitness) {
            Some(best_fitness) => fitness > best_fitness,
            None => true,
        };
        if improved {
            self.best = Some(candidate.clone());
        }
        improved
    }

    /// Attempt to add a scored chromosome to the ranked entries
    pub fn try_add(&mut self, chromosome: &Chromosome, generation: usize) -> bool {
        let Some(fitness) = chromosome.fitness() else {
            return false;
        };
        let canonical_string = get_canonical_actions_string(chromosome.actions());

        if self.seen_signatures.contains(&canonical_string) {
            // Same sequence can score differently on a non-deterministic site
            let improved = match self
                .entries
                .iter_mut()
                .find(|e| e.canonical_string == canonical_string)
            {
                Some(entry) if fitness > entry.fitness => {
                    entry.chromosome = chromosome.clone();
                    entry.fitness = fitness;
                    true
                }
                _ => false,
            };
            if improved {
                self.sort_and_trim();
            }
            return improved;
        }

        self.seen_signatures.insert(canonical_string.clone());
        self.entries.push(EliteChromosome {
            chromosome: chromosome.clone(),
            fitness,
            generation,
            canonical_string,
        });
        self.sort_and_trim();
        true
    }

    fn sort_and_trim(&mut self) {
        // Stable: earlier entries win ties
        self.entries.sort_by(|a, b| {
            b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen_signatures.remove(&removed.canonical_string);
            }
        }
    }

    pub fn best(&self) -> Option<&Chromosome> {
        self.best.as_ref()
    }

    pub fn get_all(&self) -> &[EliteChromosome] {
        &self.entries
    }

    pub fn get_top_n(&self, n: usize) -> &[EliteChromosome] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generate canonical string for deduplication
pub fn get_canonical_actions_string(actions: &[Action]) -> String {
    serde_json::to_string(actions).unwrap_or_else(|_| String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementType, UIElement};

    fn scored(id: &str, fitness: f64) -> Chromosome {
        let action = Action::click(UIElement::new(ElementType::Button).with_id(id)).unwrap();
        Chromosome::from_action(action).scored(fitness, vec![])
    }

    #[test]
    fn test_best_only_replaced_on_strict_improvement() {
        let mut hall = HallOfFame::new(3);
        assert!(hall.record_best(&scored("a", 10.0)));
        assert!(!hall.record_best(&scored("b", 10.0)));
        assert_eq!(hall.best().unwrap().actions()[0].to_string(), "CLICK button[id='a']");

        assert!(hall.record_best(&scored("c", 11.0)));
        assert_eq!(hall.best().unwrap().fitness(), Some(11.0));

        assert!(!hall.record_best(&Chromosome::new(vec![])));
    }

    #[test]
    fn test_crash_sentinel_still_counts_as_recorded() {
        let mut hall = HallOfFame::new(3);
        assert!(hall.record_best(&scored("boom", -1.0)));
        assert!(hall.record_best(&scored("ok", 0.0)));
    }

    #[test]
    fn test_entries_deduplicated_and_trimmed() {
        let mut hall = HallOfFame::new(2);
        assert!(hall.try_add(&scored("a", 5.0), 0));
        assert!(!hall.try_add(&scored("a", 5.0), 1));
        assert!(hall.try_add(&scored("a", 8.0), 1));
        assert!(hall.try_add(&scored("b", 7.0), 1));
        assert!(hall.try_add(&scored("c", 9.0), 2));

        let fitness: Vec<f64> = hall.get_all().iter().map(|e| e.fitness).collect();
        assert_eq!(fitness, vec![9.0, 8.0]);
        assert_eq!(hall.len(), 2);
        // "b" was evicted, so it can come back
        assert!(hall.try_add(&scored("b", 8.5), 3));
    }

    #[test]
    fn test_top_n_is_clamped_and_ordered() {
        let mut hall = HallOfFame::new(5);
        hall.try_add(&scored("a", 3.0), 0);
        hall.try_add(&scored("b", 9.0), 0);
        hall.try_add(&scored("c", 6.0), 1);

        let top: Vec<f64> = hall.get_top_n(2).iter().map(|e| e.fitness).collect();
        assert_eq!(top, vec![9.0, 6.0]);
        assert_eq!(hall.get_top_n(10).len(), 3);
        assert!(hall.get_top_n(0).is_empty());
    }
}
