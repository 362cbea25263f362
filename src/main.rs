use clap::{Parser, Subcommand};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod api;
use crate::api::job::{Column, SubmitOutcome, SyncController};
mod config;
mod http;
use crate::http::HttpJobApi;
mod shutdown;
use crate::shutdown::ShutdownCoordinator;
mod state;
mod view;
mod worker;

/// Terminal client for the remote job list
#[derive(Parser, Debug)]
#[command(name = "job-console", version, about)]
struct Cli {
    /// Base URL of the job service; overrides JOBS_API_BASE_URL and the per-endpoint variables
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Delay before the refresh that follows a successful write
    #[arg(long, global = true)]
    refresh_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the job list
    List,
    /// Change one column of one job
    Update {
        #[arg(long)]
        job_id: i64,
        #[arg(long, value_parser = parse_editable_column)]
        column: Column,
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },
    /// Create a new job
    Insert {
        #[arg(long, default_value = "")]
        start_date: String,
        #[arg(long, default_value = "")]
        start_hour: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        description: String,
        #[arg(long, default_value = "")]
        is_active: String,
    },
    /// Interactive session (default)
    Shell,
}

fn parse_editable_column(raw: &str) -> Result<Column, String> {
    match raw.parse::<Column>() {
        Ok(column) if column.is_editable() => Ok(column),
        _ => Err(format!(
            "expected one of: {}",
            Column::EDITABLE.map(|c| c.as_str()).join(", ")
        )),
    }
}

fn init_logging(log_dir: &str) -> io::Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(log_dir)?;

    // Log files are created as: logs/info.log.2024-12-22, logs/error.log.2024-12-22, etc.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(log_dir, "debug.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    // stdout carries the table, so console logging goes to stderr
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();
    Ok(())
}

/// Apply the command-line overrides on top of the environment configuration
fn apply_overrides(mut config: config::Config, cli: &Cli) -> Result<config::Config, String> {
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(delay) = cli.refresh_delay_ms {
        config = config.with_refresh_delay_ms(delay)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match config::Config::from_env().and_then(|config| apply_overrides(config, &cli)) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Configuration error: {}", message);
            return Ok(ExitCode::FAILURE);
        }
    };

    init_logging(&config.log_dir)?;

    info!("Starting job-console");
    info!("Configuration loaded successfully:");
    info!("  - Data endpoint: {}", config.data_url);
    info!("  - Update endpoint: {}", config.update_url);
    info!("  - Insert endpoint: {}", config.insert_url);
    info!("  - Refresh delay: {} ms", config.refresh_delay_ms);

    let controller = SyncController::new(HttpJobApi::new(config.endpoints()), config.refresh_delay());

    let outcome = match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
            let shell_task = tokio::spawn(view::shell::run(controller.clone(), shutdown_rx));
            ShutdownCoordinator::new(shell_task, shutdown_tx, controller)
                .wait_for_shutdown()
                .await;
            return Ok(ExitCode::SUCCESS);
        }
        Command::List => {
            let loaded = controller.fetch_all().await;
            print!("{}", view::render(&controller.snapshot()));
            return Ok(if loaded { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Command::Update { job_id, column, value } => {
            controller.fetch_all().await;
            controller.select_job(job_id);
            if !controller.select_field(column) {
                warn!("Rejected update column {}", column);
            }
            controller.set_candidate_value(value);
            controller.submit_update().await
        }
        Command::Insert {
            start_date,
            start_hour,
            name,
            description,
            is_active,
        } => {
            controller.fetch_all().await;
            for (column, value) in [
                (Column::StartDate, start_date),
                (Column::StartHour, start_hour),
                (Column::Name, name),
                (Column::Description, description),
                (Column::IsActive, is_active),
            ] {
                if !controller.set_draft_field(column, value) {
                    warn!("Rejected draft field {}", column);
                }
            }
            controller.submit_insert().await
        }
    };

    Ok(finish_write(&controller, outcome).await)
}

/// Wait for the scheduled refresh, print the page and map the outcome to an exit code
async fn finish_write(controller: &Arc<SyncController<HttpJobApi>>, outcome: SubmitOutcome) -> ExitCode {
    let code = match outcome {
        SubmitOutcome::Submitted(ticket) => {
            ticket.wait().await;
            ExitCode::SUCCESS
        }
        SubmitOutcome::Failed | SubmitOutcome::Invalid => ExitCode::FAILURE,
    };
    print!("{}", view::render(&controller.snapshot()));
    code
}
