use super::{
    evolution::EvolutionConfig,
    export::ExportConfig,
    oracle::OracleConfig,
    traits::ConfigSection,
};
use crate::error::UitestgenError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix for environment overrides, e.g. `UITESTGEN__EVOLUTION__POPULATION_SIZE=20`
pub const ENV_PREFIX: &str = "UITESTGEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub oracle: OracleConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), UitestgenError> {
        self.evolution.validate().map_err(|e| in_section::<EvolutionConfig>(e))?;
        self.oracle.validate().map_err(|e| in_section::<OracleConfig>(e))?;
        self.export.validate().map_err(|e| in_section::<ExportConfig>(e))?;
        Ok(())
    }
}

fn in_section<S: ConfigSection>(error: UitestgenError) -> UitestgenError {
    match error {
        UitestgenError::Configuration(msg) => {
            UitestgenError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML file, layer environment overrides on top, and validate.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), UitestgenError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(UitestgenError::Configuration(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), UitestgenError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| UitestgenError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply `f` to a copy of the configuration and commit it only if it validates.
    pub fn update<F>(&self, f: F) -> Result<(), UitestgenError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        self.replace(candidate)
    }

    fn replace(&self, config: AppConfig) -> Result<(), UitestgenError> {
        let mut current = self
            .config
            .write()
            .map_err(|_| UitestgenError::Configuration("Configuration lock poisoned".to_string()))?;
        *current = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("uitestgen-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let path = temp_path("partial");
        std::fs::write(
            &path,
            "[evolution]\npopulation_size = 12\nmutation_rate = 0.25\n\n[oracle]\nurl = \"http://localhost:8000/\"\n",
        )
        .unwrap();

        let manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.get();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.evolution.population_size, 12);
        assert_eq!(config.evolution.mutation_rate, 0.25);
        assert_eq!(config.evolution.tournament_size, 5);
        assert_eq!(config.oracle.url, "http://localhost:8000/");
        assert!(config.export.echo_source);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = temp_path("invalid");
        std::fs::write(&path, "[evolution]\nmutation_rate = 2.0\n").unwrap();

        let manager = ConfigManager::new();
        let result = manager.load_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        assert_eq!(manager.get(), AppConfig::default());
    }

    #[test]
    fn test_failed_update_leaves_config_untouched() {
        let manager = ConfigManager::new();
        assert!(manager.update(|c| c.evolution.generations = 0).is_err());
        assert_eq!(manager.get().evolution.generations, 50);

        manager.update(|c| c.evolution.generations = 3).unwrap();
        assert_eq!(manager.get().evolution.generations, 3);
    }

    #[test]
    fn test_save_round_trips_through_loader() {
        let path = temp_path("saved");
        let manager = ConfigManager::new();
        manager.update(|c| c.evolution.seed = Some(7)).unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.get().evolution.seed, Some(7));
    }
}
