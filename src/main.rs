use clap::{Parser, Subcommand};
use print_grade::batch::{self, BatchOptions};
use print_grade::config::{self, PrintGradeConfig};
use print_grade::print_size::PrintSize;
use print_grade::{output, raster, report};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Shared flags for commands that print a report.
#[derive(clap::Args, Clone)]
struct ReportArgs {
    /// Print sizes to evaluate, e.g. 16x20,24x36 (default: config, then whole catalog)
    #[arg(long, value_delimiter = ',')]
    sizes: Vec<PrintSize>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "print-grade")]
#[command(about = "Technical quality grading for fine art photographs")]
#[command(long_about = "\
Technical quality grading for fine art photographs

Measures sharpness (with a 5x5 soft-zone map), noise, highlight and shadow
clipping, and JPEG block artifacts, then grades every catalog print size by
the DPI the image can deliver. Soft images lose effective resolution, so
they grade lower at the same pixel count.

Supported inputs: .jpg .jpeg .tif .tiff

Grades:
  A  composite >= 90    B  >= 75    C  >= 60    D  >= 40    F  below

A print size is sellable at 150 DPI or more.

Run 'print-grade gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log analyzer measurements to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single image
    Analyze {
        file: PathBuf,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Analyze every supported image in a folder
    Batch {
        dir: PathBuf,
        #[command(flatten)]
        report: ReportArgs,
        /// Ignore and do not update the report cache
        #[arg(long)]
        no_cache: bool,
        /// Only analyze files directly inside the folder
        #[arg(long)]
        no_recursive: bool,
        /// Also write the JSON report to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare two images metric by metric
    Compare {
        first: PathBuf,
        second: PathBuf,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Check whether an image reaches a DPI threshold at one print size
    CheckSize {
        file: PathBuf,
        /// Print size in inches, e.g. 16x20
        #[arg(long)]
        size: PrintSize,
        /// Minimum DPI to pass (default: [print] min_dpi)
        #[arg(long)]
        min_dpi: Option<u32>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze { file, report: args } => {
            raster::ensure_supported(&file)?;
            let sizes = resolve_sizes(&args.sizes, &config)?;
            let quality = report::analyze(&file, &sizes)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&quality)?);
            } else {
                output::print_report(&quality);
            }
        }
        Command::Batch {
            dir,
            report: args,
            no_cache,
            no_recursive,
            output: json_path,
        } => {
            init_thread_pool(&config.processing);
            let options = BatchOptions {
                sizes: resolve_sizes(&args.sizes, &config)?,
                recursive: config.batch.recursive && !no_recursive,
                use_cache: config.batch.cache && !no_cache,
            };
            let result = batch::analyze_folder(&dir, &options)?;
            if let Some(path) = &json_path {
                std::fs::write(path, serde_json::to_string_pretty(&result)?)?;
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_batch(&result);
            }
        }
        Command::Compare {
            first,
            second,
            report: args,
        } => {
            raster::ensure_supported(&first)?;
            raster::ensure_supported(&second)?;
            let sizes = resolve_sizes(&args.sizes, &config)?;
            let comparison = report::compare(&first, &second, &sizes)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                output::print_comparison(&comparison);
            }
        }
        Command::CheckSize {
            file,
            size,
            min_dpi,
            json,
        } => {
            raster::ensure_supported(&file)?;
            let min_dpi = min_dpi.unwrap_or(config.print.min_dpi);
            let check = report::check_print_size(&file, size, min_dpi)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&check)?);
            } else {
                output::print_print_check(&file, &check);
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "print_grade=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Load the explicit config file, or `./config.toml` when present.
fn load_config(explicit: Option<&Path>) -> Result<PrintGradeConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            Ok(config::load_config_file(path)?)
        }
        None => Ok(config::load_config(Path::new("."))?),
    }
}

/// CLI sizes take precedence over `[print] sizes`.
fn resolve_sizes(
    cli_sizes: &[PrintSize],
    config: &PrintGradeConfig,
) -> Result<Vec<PrintSize>, config::ConfigError> {
    if cli_sizes.is_empty() {
        config.print.size_filter()
    } else {
        Ok(cli_sizes.to_vec())
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
