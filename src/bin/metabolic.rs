//! Metabolic CLI - Command-line interface for Metabolic Flux
//!
//! Commands:
//! - estimate: TDEE estimate for a request
//! - trend: sliding-window TDEE series for charting
//! - insights: ranked insights and next-week focus
//! - report: full encoded analysis report
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use metabolic_flux::config::EngineConfig;
use metabolic_flux::encoder::ReportEncoder;
use metabolic_flux::estimator::TdeeEstimator;
use metabolic_flux::report::{analyze, AnalysisRequest};
use metabolic_flux::types::{intakes_from_logs, Insight};
use metabolic_flux::{ComputeError, ENGINE_VERSION, PRODUCER_NAME};

/// Metabolic - adaptive TDEE estimation and behavioral nutrition insights
#[derive(Parser)]
#[command(name = "metabolic")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Estimate energy expenditure and surface nutrition insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RequestArgs {
    /// Request JSON file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Engine configuration JSON; overrides any config inside the request
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json-pretty")]
    output_format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate TDEE
    Estimate(RequestArgs),

    /// Sliding-window TDEE series
    Trend(RequestArgs),

    /// Ranked insights and next-week focus
    Insights(RequestArgs),

    /// Full analysis report with producer metadata
    Report(RequestArgs),

    /// Diagnose configuration and environment
    Doctor {
        /// Engine configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MetabolicCliError> {
    match cli.command {
        Commands::Estimate(args) => cmd_estimate(&args),
        Commands::Trend(args) => cmd_trend(&args),
        Commands::Insights(args) => cmd_insights(&args),
        Commands::Report(args) => cmd_report(&args),
        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_estimate(args: &RequestArgs) -> Result<(), MetabolicCliError> {
    let request = load_request(args)?;
    let config = request.engine_config()?;
    let intakes = intakes_from_logs(&request.logs);
    let estimate = TdeeEstimator::new(config.estimator).estimate(&request.weights, &intakes, &request.biometrics);
    print_output(&estimate, &args.output_format)
}

fn cmd_trend(args: &RequestArgs) -> Result<(), MetabolicCliError> {
    let request = load_request(args)?;
    let config = request.engine_config()?;
    let intakes = intakes_from_logs(&request.logs);
    let trend = TdeeEstimator::new(config.estimator).trend(&request.weights, &intakes, &request.biometrics);
    print_output(&trend, &args.output_format)
}

fn cmd_insights(args: &RequestArgs) -> Result<(), MetabolicCliError> {
    #[derive(Serialize)]
    struct InsightsOutput {
        insights: Vec<Insight>,
        next_week_focus: Vec<String>,
    }

    let request = load_request(args)?;
    let report = analyze(&request)?;
    let output = InsightsOutput {
        insights: report.insights,
        next_week_focus: report.next_week_focus,
    };
    print_output(&output, &args.output_format)
}

fn cmd_report(args: &RequestArgs) -> Result<(), MetabolicCliError> {
    let request = load_request(args)?;
    let report = analyze(&request)?;
    let envelope = ReportEncoder::new().encode(&report);
    print_output(&envelope, &args.output_format)
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), MetabolicCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    let defaults_check = match EngineConfig::default().validate() {
        Ok(()) => DoctorCheck {
            name: "default_config".to_string(),
            status: CheckStatus::Ok,
            message: "Built-in defaults are valid".to_string(),
        },
        Err(e) => DoctorCheck {
            name: "default_config".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    };
    checks.push(defaults_check);

    // Check config file if provided
    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(parsed) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (EWMA α {}, regression window {} days)",
                            parsed.estimator.ewma_alpha, parsed.estimator.regression_window
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Metabolic Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MetabolicCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Read the request, applying a config file when given
fn load_request(args: &RequestArgs) -> Result<AnalysisRequest, MetabolicCliError> {
    let content = if args.input.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.input)?
    };
    if content.trim().is_empty() {
        return Err(MetabolicCliError::EmptyInput);
    }

    let mut request = AnalysisRequest::from_json(&content)?;
    if let Some(path) = &args.config {
        request.config = Some(EngineConfig::from_json(&fs::read_to_string(path)?)?);
    }
    Ok(request)
}

fn print_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<(), MetabolicCliError> {
    let json = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{}", json);
    Ok(())
}

// Error types

#[derive(Debug)]
enum MetabolicCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    EmptyInput,
    DoctorFailed,
}

impl From<io::Error> for MetabolicCliError {
    fn from(e: io::Error) -> Self {
        MetabolicCliError::Io(e)
    }
}

impl From<ComputeError> for MetabolicCliError {
    fn from(e: ComputeError) -> Self {
        MetabolicCliError::Compute(e)
    }
}

impl From<serde_json::Error> for MetabolicCliError {
    fn from(e: serde_json::Error) -> Self {
        MetabolicCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MetabolicCliError> for CliError {
    fn from(e: MetabolicCliError) -> Self {
        match e {
            MetabolicCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MetabolicCliError::Compute(e) => {
                let hint = match &e {
                    ComputeError::InvalidConfig(_) => "Run 'metabolic doctor --config <file>' to check the configuration",
                    ComputeError::JsonError(_) => "Ensure the request has a biometrics object and ISO YYYY-MM-DD dates",
                    _ => "Check the request contents",
                };
                CliError {
                    code: "COMPUTE_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MetabolicCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MetabolicCliError::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "Input is empty".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            MetabolicCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
