pub mod shell;

use std::fmt::Write;

use crate::api::job::Job;
use crate::state::{ControllerState, EditSession, InsertDraft};

const HEADERS: [&str; 6] = ["JobId", "StartDate", "StartHour", "Name", "Description", "IsActive"];

fn cells(job: &Job) -> [String; 6] {
    [
        job.job_id.to_string(),
        job.start_date.clone(),
        job.start_hour.clone(),
        job.name.clone(),
        job.description.clone().unwrap_or_default(),
        if job.is_active { "Yes" } else { "No" }.to_string(),
    ]
}

/// Render the job list as an aligned text table
pub fn render_table(jobs: &[Job]) -> String {
    let rows: Vec<[String; 6]> = jobs.iter().map(cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{:<width$}", value, width = width))
            .collect();
        let _ = writeln!(out, "| {} |", padded.join(" | ").trim_end());
    };

    line(&mut out, &HEADERS.map(String::from)[..]);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "|-{}-|", rule.join("-|-"));
    for row in &rows {
        line(&mut out, &row[..]);
    }
    out
}

/// Render the error line, then the job table and status line, the same way
/// the page lays them out
pub fn render(state: &ControllerState) -> String {
    let mut out = String::new();
    if !state.error.is_empty() {
        let _ = writeln!(out, "Error: {}", state.error);
    }
    out.push_str(&render_table(state.store.jobs()));
    if !state.status.is_empty() {
        let _ = writeln!(out, "\n{}", state.status);
    }
    out
}

pub fn render_session(session: &EditSession) -> String {
    format!(
        "update: job={} column={} value={:?}",
        session
            .target_job_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        session
            .target_field
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        session.candidate_value
    )
}

pub fn render_draft(draft: &InsertDraft) -> String {
    format!(
        "insert: StartDate={:?} StartHour={:?} Name={:?} Description={:?} IsActive={:?}",
        draft.start_date, draft.start_hour, draft.name, draft.description, draft.is_active
    )
}
