//! Configuration file loading for answer-critique
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CRITIQUE_` environment variables (`CRITIQUE_REVISION__MAX_ATTEMPTS=3`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./critique.toml` or `./.critique.toml`
//! 4. Global: `$XDG_CONFIG_HOME/answer-critique/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileFallacyConfig, FileGenerationConfig,
    FileLoggingConfig, FileOutputConfig, GenerationProvider,
};
pub use loader::ConfigLoader;
