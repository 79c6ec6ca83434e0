mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use uitestgen::config::{AppConfig, ConfigManager};
use uitestgen::engines::generation::{ConsoleProgressCallback, EvolutionEngine, SearchOutcome};
use uitestgen::export::{PlaywrightEmitter, SearchReport};
use uitestgen::oracle::SimulatedSite;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let manager = ConfigManager::new();
    if let Some(path) = &cli.config {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?;
    }
    manager
        .update(|config| cli.apply(config))
        .context("invalid search options")?;
    let config = manager.get();

    print_summary(&config);

    let site = SimulatedSite::from_config(&config.oracle).context("building the site oracle")?;
    let mut engine = EvolutionEngine::new(config.evolution.clone(), site);
    let outcome = engine
        .run(ConsoleProgressCallback)
        .context("genetic search aborted")?;

    print_best(&outcome);

    if let Some(best) = &outcome.best {
        let emitter = PlaywrightEmitter::from_config(config.oracle.url.clone(), &config.export);
        match &config.export.output {
            Some(path) => {
                emitter
                    .write_to(best.actions(), path)
                    .with_context(|| format!("writing script to {}", path.display()))?;
            }
            None => {
                emitter.emit(best.actions()).context("generating script")?;
            }
        }
    }

    if let Some(path) = &cli.report {
        SearchReport::new(&config, &outcome)
            .save(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(())
}

fn print_summary(config: &AppConfig) {
    let evolution = &config.evolution;
    println!("Starting UI Test Generation with the following configuration:");
    println!("  URL: {}", config.oracle.url);
    match &config.oracle.site_model {
        Some(path) => println!("  Site model: {}", path.display()),
        None => println!("  Site model: built-in demo"),
    }
    println!("  Population Size: {}", evolution.population_size);
    println!("  Generations: {}", evolution.generations);
    println!("  Tournament Size: {}", evolution.tournament_size);
    println!("  Max Chromosome Length: {}", evolution.max_chromosome_length);
    println!("  Mutation Rate: {}", evolution.mutation_rate);
    println!("  Elitism Count: {}", evolution.elitism_count);
    if let Some(seed) = evolution.seed {
        println!("  Seed: {}", seed);
    }
}

fn print_best(outcome: &SearchOutcome) {
    println!("\n--- Genetic Search Complete ---");
    let Some(best) = &outcome.best else {
        println!("No effective chromosome was found.");
        return;
    };

    println!("Best Chromosome Found:");
    if let Some(fitness) = best.fitness() {
        println!("  Fitness: {:.2}", fitness);
    }
    println!("  Actions ({} steps):", best.len());
    for (i, action) in best.actions().iter().enumerate() {
        println!("    {}: {}", i + 1, action);
    }
}
