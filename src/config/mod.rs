// Configuration management: TOML settings plus the interactive setup
// flow behind the `config` command.

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{Config, ConfigError, IndexConfig, OcrConfig, OllamaConfig};

/// Default per-user data directory holding the config file, the raw
/// document images, and the persisted index.
#[inline]
pub fn default_data_dir() -> Result<std::path::PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("scandex"))
        .ok_or(ConfigError::DirectoryError)
}
