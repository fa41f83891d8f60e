//! EduBase command-line entry point.
//!
//! # Responsibility
//! - Wire config, logging, the connection pool and the seed loader together.
//! - Own the single `ConnectionProvider` for the process and close it on exit.

use clap::{Parser, Subcommand};
use edubase_core::{
    init_logging, AppConfig, ConnectionProvider, CourseService, ProgramService, SeedLoader,
    SourceOutcome,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "edubase", version, about = "Course and degree program catalog")]
struct Cli {
    /// YAML config file; defaults are used when it does not exist.
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge the configured seed files and print a summary (default).
    Load,
    /// Write every course and program to JSON files.
    Export {
        #[arg(short, long, default_value = "data")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("edubase: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config.logging) {
        eprintln!("edubase: {err}");
        return ExitCode::FAILURE;
    }

    info!(
        "event=cli_start module=cli status=ok app={} version={} core_version={}",
        config.application.name,
        config.application.version,
        edubase_core::core_version()
    );

    let provider = ConnectionProvider::new();
    if let Err(err) = provider.initialize(&config.database) {
        error!("event=cli_start module=cli status=error error={err}");
        return ExitCode::FAILURE;
    }

    let code = match cli.command.unwrap_or(Command::Load) {
        Command::Load => run_load(&provider, &config),
        Command::Export { dir } => run_export(&provider, &config, dir),
    };

    provider.close();
    info!("event=cli_exit module=cli status=ok");
    code
}

fn run_load(provider: &ConnectionProvider, config: &AppConfig) -> ExitCode {
    let loader = SeedLoader::new(provider, config.seed.clone());
    let report = match loader.load_all() {
        Ok(report) => report,
        Err(err) => {
            error!("event=cli_load module=cli status=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    let courses = CourseService::new(provider);
    let programs = ProgramService::new(provider);
    match (courses.count_all(), programs.count_all()) {
        (Ok(course_count), Ok(program_count)) => {
            println!("courses:  {course_count} ({})", describe(report.courses));
            println!("programs: {program_count} ({})", describe(report.programs));
            ExitCode::SUCCESS
        }
        (Err(err), _) | (_, Err(err)) => {
            error!("event=cli_load module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run_export(provider: &ConnectionProvider, config: &AppConfig, dir: PathBuf) -> ExitCode {
    let loader = SeedLoader::new(provider, config.seed.clone());
    match loader.export_all(&dir) {
        Ok(report) => {
            println!(
                "exported {} courses to {}",
                report.courses,
                report.courses_path.display()
            );
            println!(
                "exported {} programs to {}",
                report.programs,
                report.programs_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_export module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn describe(outcome: SourceOutcome) -> String {
    match outcome {
        SourceOutcome::Loaded {
            inserted, skipped, ..
        } => format!("seed: {inserted} new, {skipped} already present"),
        SourceOutcome::Missing => "seed: file not found".to_string(),
        SourceOutcome::Failed => "seed: file unreadable".to_string(),
    }
}
