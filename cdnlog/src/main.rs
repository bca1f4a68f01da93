use cdnlog_core::conf::{AppConfig, ConfigError, load_config};
use cdnlog_core::logging::{LogFormat, default_log_format, init_logging};
use cdnlog_core::pipeline;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_CONFIG: &str = "config/config.yaml";

#[derive(Parser, Debug)]
#[command(name = "cdnlog", version, about = "CDN access log analyzer")]
struct Cli {
    /// Log output format (defaults to pretty on a terminal, json otherwise)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest, parse and analyze logs, then run the configured reporters
    Analyze {
        /// Path to the YAML config file
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    /// Load and validate the config file, then print a summary
    Check {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { config } => {
            init_logging(cli.log_format.map(Into::into).unwrap_or_else(default_log_format));
            analyze(&config)
        }
        Command::Config {
            cmd: ConfigCmd::Check { config },
        } => check(&config),
    }
}

fn analyze(path: &Path) -> ExitCode {
    let cfg = match load_config(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(config = %path.display(), error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(config = %path.display(), modules = ?cfg.analysis.modules, "configuration loaded");

    match pipeline::run(&cfg) {
        Ok(outcome) => {
            tracing::info!(
                lines = outcome.stats.lines,
                records = outcome.stats.records,
                reports = outcome.reports_generated,
                "run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "run failed");
            ExitCode::FAILURE
        }
    }
}

fn check(path: &Path) -> ExitCode {
    match load_config(path) {
        Ok(cfg) => {
            print_summary(&cfg);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_config_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn print_summary(cfg: &AppConfig) {
    println!("✔ Config loaded successfully");
    println!(
        "✔ source: {} ({})",
        cfg.input.source_type,
        cfg.input.path.display()
    );
    if let Some(api) = &cfg.input.api {
        println!(
            "✔ api window: {} → {} for {}",
            api.start_time, api.end_time, api.domain_name
        );
    }
    println!("✔ {} analysis modules: {}", cfg.analysis.modules.len(), cfg.analysis.modules.join(", "));
    println!("✔ {} reporters: {}", cfg.output.reporters.len(), cfg.output.reporters.join(", "));
}

fn print_config_error(err: &ConfigError) {
    match err {
        ConfigError::Validation { errors } => {
            eprintln!("✘ invalid configuration:");
            for e in errors {
                eprintln!("  - {e}");
            }
        }
        other => eprintln!("✘ {other}"),
    }
}
