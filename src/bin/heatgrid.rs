//! HeatGrid CLI - Command-line interface for UX HeatGrid
//!
//! Commands:
//! - replay: Run a recorded session and print its report
//! - evaluate: Score the layout of a static page snapshot
//! - render: Write the heat overlay of a replayed session as a PPM image
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ux_heatgrid::render::theme_backdrop;
use ux_heatgrid::{
    evaluate_page, replay, HeatGridConfig, Recording, ReportEncoder, StaticPage,
    HEATGRID_VERSION, PRODUCER_NAME,
};

/// HeatGrid - Attention heat grid and UX density scoring
#[derive(Parser)]
#[command(name = "heatgrid")]
#[command(version = HEATGRID_VERSION)]
#[command(about = "Replay attention sessions and score page layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session and print the session report
    Replay {
        /// Recording file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Also print every command response, one per line, before the report
        #[arg(long)]
        responses: bool,
    },

    /// Evaluate the UX density of a static page snapshot
    Evaluate {
        /// Page snapshot path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Replay a session and write its heat overlay as a binary PPM
    Render {
        /// Recording file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Image output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HeatGridCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            output_format,
            responses,
        } => cmd_replay(&input, &output, output_format, responses),
        Commands::Evaluate {
            input,
            config,
            output_format,
        } => cmd_evaluate(&input, config.as_deref(), output_format),
        Commands::Render { input, output } => cmd_render(&input, &output),
        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    responses: bool,
) -> Result<(), HeatGridCliError> {
    let recording = Recording::from_json(&read_input(input)?)?;
    let mut outcome = replay(&recording)?;

    let mut text = String::new();
    if responses {
        for response in &outcome.responses {
            text.push_str(&response.to_json()?);
            text.push('\n');
        }
    }

    let driver = &mut outcome.driver;
    let analytics = driver.session.analytics(&driver.page)?;
    let report = ReportEncoder::new().encode(&driver.session, analytics, outcome.ended_at);
    text.push_str(&format_json(&report, &output_format)?);
    text.push('\n');

    write_output(output, text.as_bytes())
}

fn cmd_evaluate(
    input: &Path,
    config: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), HeatGridCliError> {
    let page = StaticPage::from_json(&read_input(input)?)?;
    let config = load_config(config)?;
    let evaluation = evaluate_page(&page, &config)?;
    println!("{}", format_json(&evaluation, &output_format)?);
    Ok(())
}

fn cmd_render(input: &Path, output: &Path) -> Result<(), HeatGridCliError> {
    let recording = Recording::from_json(&read_input(input)?)?;
    let outcome = replay(&recording)?;
    let session = &outcome.driver.session;

    let frame = session.render_frame();
    if frame.width == 0 || frame.height == 0 {
        return Err(HeatGridCliError::EmptyGrid);
    }

    let mut image = Vec::new();
    frame.write_ppm(&mut image, theme_backdrop(session.theme()))?;
    write_output(output, &image)?;

    log::info!(
        "wrote {}x{} overlay to {}",
        frame.width,
        frame.height,
        output.display()
    );
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), HeatGridCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "heatgrid_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("HeatGrid version {}", HEATGRID_VERSION),
    });

    match HeatGridConfig::default().validate() {
        Ok(()) => checks.push(DoctorCheck {
            name: "default_config".to_string(),
            status: CheckStatus::Ok,
            message: "Built-in configuration is valid".to_string(),
        }),
        Err(e) => checks.push(DoctorCheck {
            name: "default_config".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        }),
    }

    if let Some(config_path) = config {
        if config_path.exists() {
            let check = match fs::read_to_string(config_path) {
                Ok(content) => match HeatGridConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Configuration valid ({}px cells, {}ms ticks)",
                            config.cell_size, config.tick_interval_ms
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
                    message: format!("Cannot read configuration file: {}", e),
                },
            };
            checks.push(check);
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist".to_string(),
            });
        }
    }

    // Recordings can be piped in with `-i -`
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (recording input ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: HEATGRID_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("HeatGrid Doctor Report");
        println!("======================");
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

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HeatGridCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String, HeatGridCliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), HeatGridCliError> {
    if path.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
    } else {
        fs::write(path, bytes)?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<HeatGridConfig, HeatGridCliError> {
    match path {
        Some(path) => Ok(HeatGridConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(HeatGridConfig::default()),
    }
}

fn format_json<T: serde::Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, HeatGridCliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    })
}

// Error types

#[derive(Debug)]
enum HeatGridCliError {
    Io(io::Error),
    Engine(ux_heatgrid::HeatGridError),
    Json(serde_json::Error),
    EmptyGrid,
    DoctorFailed,
}

impl From<io::Error> for HeatGridCliError {
    fn from(e: io::Error) -> Self {
        HeatGridCliError::Io(e)
    }
}

impl From<ux_heatgrid::HeatGridError> for HeatGridCliError {
    fn from(e: ux_heatgrid::HeatGridError) -> Self {
        HeatGridCliError::Engine(e)
    }
}

impl From<serde_json::Error> for HeatGridCliError {
    fn from(e: serde_json::Error) -> Self {
        HeatGridCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HeatGridCliError> for CliError {
    fn from(e: HeatGridCliError) -> Self {
        match e {
            HeatGridCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HeatGridCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the page snapshot and recording format".to_string()),
            },
            HeatGridCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HeatGridCliError::EmptyGrid => CliError {
                code: "EMPTY_GRID".to_string(),
                message: "The replay produced no heat grid".to_string(),
                hint: Some("Start tracking or show the heatmap in the recording".to_string()),
            },
            HeatGridCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
