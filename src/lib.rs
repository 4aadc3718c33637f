pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::LayerConfig;

pub use adapters::process::ProcessRunner;
pub use core::layer::{LayerBuilder, LayerPlan, LayerReport};
pub use core::matrix::{MatrixGenerator, MatrixOutput};
pub use core::repository::LocalRepository;
pub use domain::model::{Coordinate, Exclusion, LibraryDescriptor, Matrix};
pub use domain::ports::{CommandRunner, CommandSpec, ConfigProvider};
pub use utils::error::{LayerError, Result};
