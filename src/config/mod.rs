pub mod traits;
pub mod evolution;
pub mod oracle;
pub mod export;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use oracle::OracleConfig;
pub use export::ExportConfig;
pub use traits::ConfigSection;
