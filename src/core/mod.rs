pub mod layer;
pub mod matrix;
pub mod repository;

pub use crate::domain::model::{Coordinate, Exclusion, LibraryDescriptor, Matrix};
pub use crate::domain::ports::{CommandRunner, CommandSpec, ConfigProvider};
pub use crate::utils::error::Result;
