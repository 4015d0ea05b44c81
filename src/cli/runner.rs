use tracing::info;
use tracing_subscriber::EnvFilter;

use bandseries::{FailurePolicy, PipelineConfig, RunReport, run_pipeline};

use super::args::CliArgs;
use super::errors::AppError;

const DEFAULT_CATALOG: &str = "coordenadas sensores.csv";
const DEFAULT_RASTER_DIR: &str = "crops";
const DEFAULT_OUTPUT: &str = "valores_pixeles.csv";

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Merge the optional config file with command-line overrides.
pub fn build_config(args: &CliArgs) -> Result<PipelineConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::new(DEFAULT_CATALOG, DEFAULT_RASTER_DIR, DEFAULT_OUTPUT),
    };

    if let Some(catalog) = &args.catalog {
        config.catalog_path = catalog.clone();
    }
    if let Some(dir) = &args.raster_dir {
        config.raster_directory = dir.clone();
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(ext) = &args.extension {
        config.raster_extension = ext.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.catalog_delimiter = delimiter;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.fail_fast {
        config.failure_policy = FailurePolicy::Abort;
    }
    if let Some(report) = &args.report {
        config.report_path = Some(report.clone());
    }

    config.validate()?;
    Ok(config)
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    init_logging(args.log);
    execute(&args).map(|_| ())
}

/// Run the pipeline for parsed arguments; `--strict` turns collected failures into an error.
pub fn execute(args: &CliArgs) -> Result<RunReport, AppError> {
    let config = build_config(args)?;
    info!("Catalog: {:?}", config.catalog_path);
    info!("Raster directory: {:?}", config.raster_directory);
    info!("Output: {:?}", config.output_path);

    let report = run_pipeline(&config)?;

    info!("Extraction complete!");
    info!("Rows written: {}", report.rows_written);
    info!("Cloud masks skipped: {}", report.skipped_cloud_masks);
    info!("Errors: {}", report.failures.len());

    if args.strict && !report.failures.is_empty() {
        return Err(AppError::IncompleteRun {
            failed: report.failures.len(),
            total: report.failures.len() + report.rows_written,
        });
    }
    Ok(report)
}
