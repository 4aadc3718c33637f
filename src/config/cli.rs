use crate::core::matrix::MatrixOutput;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "layer-builder")]
#[command(about = "Generates the native-image layer build matrix and builds layers for Maven coordinates")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the TOML configuration file [default: ./layer-builder.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the CI build matrix of non-excluded catalog coordinates
    Matrix(MatrixArgs),
    /// Resolve one coordinate and build its native-image layer
    Build(BuildArgs),
}

#[derive(Debug, Clone, Args)]
pub struct MatrixArgs {
    /// Directory holding the catalog and exclusion JSON files
    pub data_dir: PathBuf,

    /// Where the matrix is written
    #[arg(long, value_enum, default_value_t = MatrixOutput::SetOutput)]
    pub output: MatrixOutput,
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Maven coordinate, group:artifact:version
    pub coordinate: String,

    /// Path to the native-image binary; falls back to [native_image].path
    pub native_image: Option<String>,

    /// Directory in which the per-coordinate output directory is created
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Print the build plan without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log process and host memory stats around the compile step
    #[arg(long)]
    pub monitor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}
