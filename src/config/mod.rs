#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{BuildArgs, CliConfig, Command, LogFormat, MatrixArgs};
pub use toml_config::LayerConfig;
