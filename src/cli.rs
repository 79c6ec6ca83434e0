//! Command-line surface of the `uitestgen` binary.
//!
//! Every search option is optional so that values from `--config` (or the
//! built-in defaults) stay in force unless the flag is given explicitly.

use clap::Parser;
use std::path::PathBuf;
use uitestgen::config::AppConfig;

/// Evolve UI action sequences against a web application and emit the best
/// one as a Playwright script.
#[derive(Parser, Debug)]
#[command(name = "uitestgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target URL to start every run from
    #[arg(long)]
    pub url: Option<String>,

    /// Number of chromosomes per generation
    #[arg(long = "pop-size")]
    pub pop_size: Option<usize>,

    /// Number of generations to evolve
    #[arg(long)]
    pub generations: Option<usize>,

    /// Entrants per selection tournament
    #[arg(long = "tournament-size")]
    pub tournament_size: Option<usize>,

    /// Maximum number of actions per chromosome
    #[arg(long = "max-length")]
    pub max_length: Option<usize>,

    /// Probability that an offspring is mutated
    #[arg(long = "mutation-rate")]
    pub mutation_rate: Option<f64>,

    /// Best chromosomes copied unchanged into the next generation
    #[arg(long)]
    pub elitism: Option<usize>,

    /// Seed for a reproducible search
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of distinct sequences kept in the hall of fame
    #[arg(long = "hall-of-fame")]
    pub hall_of_fame: Option<usize>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// TOML site model for the simulated oracle
    #[arg(long)]
    pub site: Option<PathBuf>,

    /// Write the generated script to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Launch the browser headless in the generated script
    #[arg(long)]
    pub headless: bool,

    /// Do not print the generated script to stdout
    #[arg(long = "quiet-source")]
    pub quiet_source: bool,

    /// Write a JSON report of the search to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Layer the explicitly given flags over `config`
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.url {
            config.oracle.url = url.clone();
        }
        if let Some(site) = &self.site {
            config.oracle.site_model = Some(site.clone());
        }

        let evolution = &mut config.evolution;
        if let Some(v) = self.pop_size {
            evolution.population_size = v;
        }
        if let Some(v) = self.generations {
            evolution.generations = v;
        }
        if let Some(v) = self.tournament_size {
            evolution.tournament_size = v;
        }
        if let Some(v) = self.max_length {
            evolution.max_chromosome_length = v;
        }
        if let Some(v) = self.mutation_rate {
            evolution.mutation_rate = v;
        }
        if let Some(v) = self.elitism {
            evolution.elitism_count = v;
        }
        if let Some(v) = self.hall_of_fame {
            evolution.hall_of_fame_size = v;
        }
        if self.seed.is_some() {
            evolution.seed = self.seed;
        }

        if let Some(output) = &self.output {
            config.export.output = Some(output.clone());
        }
        if self.headless {
            config.export.headless = true;
        }
        if self.quiet_source {
            config.export.echo_source = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_defaults() {
        let cli = Cli::try_parse_from(["uitestgen"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.evolution.population_size, 50);
        assert_eq!(config.oracle.url, "https://the-internet.herokuapp.com/");
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "uitestgen",
            "--url",
            "http://localhost:8080/",
            "--pop-size",
            "12",
            "--generations",
            "3",
            "--tournament-size",
            "2",
            "--max-length",
            "8",
            "--mutation-rate",
            "0.5",
            "--elitism",
            "2",
            "--seed",
            "42",
            "--headless",
            "--quiet-source",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.oracle.url, "http://localhost:8080/");
        assert_eq!(config.evolution.population_size, 12);
        assert_eq!(config.evolution.generations, 3);
        assert_eq!(config.evolution.tournament_size, 2);
        assert_eq!(config.evolution.max_chromosome_length, 8);
        assert_eq!(config.evolution.mutation_rate, 0.5);
        assert_eq!(config.evolution.elitism_count, 2);
        assert_eq!(config.evolution.seed, Some(42));
        assert!(config.export.headless);
        assert!(!config.export.echo_source);
    }

    #[test]
    fn test_rejects_non_numeric_population() {
        assert!(Cli::try_parse_from(["uitestgen", "--pop-size", "many"]).is_err());
    }
}
