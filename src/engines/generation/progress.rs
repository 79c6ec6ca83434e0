use super::evolution_engine::{GenerationStats, ProgressCallback};
use std::sync::mpsc::Sender;

/// Reports progress through the `log` facade
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize, total: usize) {
        log::info!("----- Generation {}/{} -----", generation + 1, total);
    }

    fn on_chromosome_evaluated(&mut self, evaluated: usize, total: usize) {
        if evaluated % 10 == 0 || evaluated == total {
            log::debug!("  Evaluated {}/{} chromosomes", evaluated, total);
        }
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats, hall_of_fame_size: usize) {
        log::info!(
            "Generation {} complete. Best fitness: {:.2} | Mean: {:.2} | Best length: {} | Distinct states: {} | Hall of Fame: {}",
            stats.generation + 1,
            stats.best_fitness,
            stats.mean_fitness,
            stats.best_length,
            stats.distinct_states,
            hall_of_fame_size
        );
    }
}

/// Forwards progress over a channel, for callers driving the search from another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart { generation: usize, total: usize },
    ChromosomeEvaluated { current: usize, total: usize },
    GenerationComplete { stats: GenerationStats, hall_of_fame_size: usize },
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize, total: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart { generation, total });
    }

    fn on_chromosome_evaluated(&mut self, evaluated: usize, total: usize) {
        let _ = self.sender.send(ProgressMessage::ChromosomeEvaluated {
            current: evaluated,
            total,
        });
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats, hall_of_fame_size: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            stats: stats.clone(),
            hall_of_fame_size,
        });
    }
}
