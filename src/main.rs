//! plcopen-validate: semantic checks for PLCopen TC6 XML projects.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::{info, Level};

use plcopen_validator_lib::emit::write_to_file;
use plcopen_validator_lib::parser::parse_file;
use plcopen_validator_lib::report::ValidationReport;
use plcopen_validator_lib::rules::config::load_config;
use plcopen_validator_lib::rules::{validate_document, DiagnosticKind, ValidatorConfig};

#[derive(Parser, Debug)]
#[command(name = "plcopen-validate")]
#[command(about = "Check a PLCopen XML project for semantic errors")]
struct Cli {
    /// PLCopen XML project file
    file: PathBuf,

    /// JSON file with extra keywords, standard POUs and library function blocks
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the annotated project to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(err) => return fail(&err.to_string()),
        },
        None => ValidatorConfig::default(),
    };

    info!("Loading project from: {}", cli.file.display());
    let mut doc = match parse_file(&cli.file) {
        Ok(doc) => doc,
        Err(err) => return fail(&err.to_string()),
    };

    let report = validate_document(&mut doc, &config);

    if let Some(output) = &cli.output {
        if let Err(err) = write_to_file(&doc, output) {
            return fail(&format!("cannot write {}: {}", output.display(), err));
        }
        info!("Annotated project written to: {}", output.display());
    }

    if cli.json {
        println!("{}", report.to_json());
    } else {
        print_report(&report);
    }

    if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("{} {}", "error:".red().bold(), message);
    ExitCode::from(2)
}

fn print_report(report: &ValidationReport) {
    for d in &report.diagnostics {
        match d.kind {
            DiagnosticKind::Error => println!("{} {}\n      {}", "ERROR".red().bold(), d.path, d.message),
            DiagnosticKind::Info => {
                let value = if d.message.is_empty() { "(deferred)" } else { d.message.as_str() };
                println!("{}  {} = {}", "INFO".cyan(), d.path, value.dimmed())
            }
        }
    }
    let summary = format!("{} error(s), {} value(s) resolved", report.error_count, report.info_count);
    if report.is_ok() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
}
