pub mod config;
pub mod engines;
pub mod error;
pub mod export;
pub mod oracle;
pub mod types;

pub use error::{Result, UitestgenError};
