use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{render, render_draft, render_session};
use crate::api::job::{Column, SubmitOutcome, SyncController};
use crate::http::JobApi;

const HELP: &str = "\
commands:
  list                   show jobs, status and error
  show                   show the pending update and insert draft
  refresh                reload the job list
  select <job id>        pick the job to update
  column <name>          pick the column (Name, StartDate, StartHour, Description, IsActive)
  value <text>           set the new value
  update                 submit the update
  draft <field> <text>   set a field of the new job
  insert                 submit the new job
  help                   show this text
  quit                   leave";

/// One line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Show,
    Refresh,
    Select(i64),
    Column(Column),
    Value(String),
    Update,
    Draft(Column, String),
    Insert,
    Help,
    Quit,
}

/// Parse a shell line; the error is the message to print
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim_start();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line.trim_end(), ""),
    };

    match word {
        "list" | "ls" => Ok(Command::List),
        "show" => Ok(Command::Show),
        "refresh" => Ok(Command::Refresh),
        "select" => rest
            .trim()
            .parse()
            .map(Command::Select)
            .map_err(|_| format!("not a job id: {:?}", rest.trim())),
        "column" => match rest.trim().parse::<Column>() {
            Ok(column) if column.is_editable() => Ok(Command::Column(column)),
            _ => Err(format!(
                "column must be one of: {}",
                editable_names().join(", ")
            )),
        },
        // the rest of the line is the value, spaces included
        "value" => Ok(Command::Value(rest.to_string())),
        "update" => Ok(Command::Update),
        "draft" => {
            let (field, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            match field.parse::<Column>() {
                Ok(column) if column.is_editable() => {
                    Ok(Command::Draft(column, text.trim_start().to_string()))
                }
                _ => Err(format!("draft field must be one of: {}", editable_names().join(", "))),
            }
        }
        "insert" => Ok(Command::Insert),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command: {} (try help)", other)),
    }
}

fn editable_names() -> Vec<&'static str> {
    Column::EDITABLE.iter().map(Column::as_str).collect()
}

/// Read lines on a plain thread so a blocked stdin never holds up shutdown
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Interactive loop; returns when the user quits, stdin closes or shutdown is signalled
pub async fn run<A: JobApi>(controller: Arc<SyncController<A>>, mut shutdown_rx: watch::Receiver<bool>) {
    info!("Shell started");
    controller.fetch_all().await;
    print!("{}", render(&controller.snapshot()));
    println!("type help for commands");

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Input closed, leaving shell");
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => dispatch(&controller, command),
                    Err(message) if message.is_empty() => {}
                    Err(message) => println!("{}", message),
                }
            }
            _ = shutdown_rx.changed() => {
                info!("Shutdown signalled, leaving shell");
                break;
            }
        }
    }
}

fn dispatch<A: JobApi>(controller: &Arc<SyncController<A>>, command: Command) {
    debug!("Shell command: {:?}", command);
    match command {
        Command::List => print!("{}", render(&controller.snapshot())),
        Command::Show => {
            println!("{}", render_session(&controller.edit_session()));
            println!("{}", render_draft(&controller.insert_draft()));
        }
        Command::Refresh => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                controller.fetch_all().await;
                print!("{}", render(&controller.snapshot()));
            });
        }
        Command::Select(job_id) => {
            if controller.has_job(job_id) {
                controller.select_job(job_id);
                println!("{}", render_session(&controller.edit_session()));
            } else {
                warn!("Selection of unknown job id {}", job_id);
                let known: Vec<String> = controller
                    .jobs()
                    .iter()
                    .map(|job| job.job_id.to_string())
                    .collect();
                println!("no job with id {} in the current list (known: {})", job_id, known.join(", "));
            }
        }
        Command::Column(column) => {
            if !controller.select_field(column) {
                warn!("Rejected update column {}", column);
            }
            println!("{}", render_session(&controller.edit_session()));
        }
        Command::Value(value) => {
            controller.set_candidate_value(value);
            println!("{}", render_session(&controller.edit_session()));
        }
        Command::Draft(column, value) => {
            if !controller.set_draft_field(column, value) {
                warn!("Rejected draft field {}", column);
            }
            println!("{}", render_draft(&controller.insert_draft()));
        }
        Command::Update => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                let outcome = controller.submit_update().await;
                report(&controller, outcome).await;
            });
        }
        Command::Insert => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                let outcome = controller.submit_insert().await;
                report(&controller, outcome).await;
            });
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

async fn report<A: JobApi>(controller: &SyncController<A>, outcome: SubmitOutcome) {
    println!("{}", controller.status());
    match outcome {
        SubmitOutcome::Submitted(ticket) => {
            ticket.wait().await;
            print!("{}", render(&controller.snapshot()));
        }
        SubmitOutcome::Failed => {
            let error = controller.error();
            if !error.is_empty() {
                println!("Error: {}", error);
            }
        }
        SubmitOutcome::Invalid => {}
    }
}
