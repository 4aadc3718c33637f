use clap::Parser;
use layer_builder::config::{BuildArgs, Command, LogFormat, MatrixArgs};
use layer_builder::core::matrix;
use layer_builder::utils::{logger, validation::Validate};
use layer_builder::{
    CliConfig, ConfigProvider, Coordinate, LayerBuilder, LayerConfig, LayerError, LayerPlan,
    LocalRepository, MatrixGenerator, ProcessRunner,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("CLI config: {:?}", cli);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => report_failure(&e),
    };
    std::process::exit(code);
}

async fn run(cli: CliConfig) -> layer_builder::Result<i32> {
    let config = LayerConfig::load(cli.config.as_deref())?;
    config.validate()?;
    tracing::debug!("Layer config: {:?}", config);

    match cli.command {
        Command::Matrix(args) => run_matrix(args, &config),
        Command::Build(args) => run_build(args, &config).await,
    }
}

fn run_matrix(args: MatrixArgs, config: &LayerConfig) -> layer_builder::Result<i32> {
    let generator = MatrixGenerator::with_files(&args.data_dir, &config.matrix);
    let build_matrix = generator.run()?;
    matrix::emit(&build_matrix, args.output)?;
    Ok(0)
}

async fn run_build(args: BuildArgs, config: &LayerConfig) -> layer_builder::Result<i32> {
    let coordinate = Coordinate::parse(&args.coordinate)?;
    let native_image = args
        .native_image
        .clone()
        .or_else(|| config.native_image_path().map(str::to_string))
        .ok_or(LayerError::MissingNativeImage)?;

    let repository = LocalRepository::from_config(config.repository_root())?;
    let plan = LayerPlan::new(coordinate, native_image, &repository, &args.work_dir, config)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No commands will be executed");
        println!("{}", plan.describe());
        return Ok(0);
    }

    let monitor_enabled = args.monitor || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let builder = LayerBuilder::new_with_monitoring(ProcessRunner::new(), monitor_enabled);
    let report = builder.build(&plan).await?;

    tracing::info!("📁 Output directory: {}", report.output_dir.display());
    // build() only returns a report when native-image exited normally.
    Ok(report.exit_code.unwrap_or(1))
}

fn report_failure(e: &LayerError) -> i32 {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    e.exit_code()
}
