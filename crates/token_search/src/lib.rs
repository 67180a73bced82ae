pub mod config;
pub mod search;
pub mod ui;

pub use config::{ConfigError, FieldConfig, SearchConfig};
