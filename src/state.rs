use crate::api::job::dto::InsertRequest;
use crate::api::job::{Column, Job};

/// Snapshot of the remote job collection, in server response order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStore {
    jobs: Vec<Job>,
}

impl JobStore {
    /// Swap in a freshly fetched collection; never patched incrementally
    pub fn replace(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn contains(&self, job_id: i64) -> bool {
        self.jobs.iter().any(|job| job.job_id == job_id)
    }
}

/// Single-field update in progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    pub target_job_id: Option<i64>,
    pub target_field: Option<Column>,
    pub candidate_value: String,
}

impl EditSession {
    /// Pick the column to update; non-editable columns are refused
    pub fn select_field(&mut self, column: Column) -> bool {
        if !column.is_editable() {
            return false;
        }
        self.target_field = Some(column);
        true
    }

    pub fn clear(&mut self) {
        *self = EditSession::default();
    }
}

/// Field values for a job that has not been inserted yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertDraft {
    pub start_date: String,
    pub start_hour: String,
    pub name: String,
    pub description: String,
    pub is_active: String,
}

impl InsertDraft {
    /// Set one draft field. `JobId` is server-assigned, so it is refused.
    pub fn set(&mut self, column: Column, value: impl Into<String>) -> bool {
        let slot = match column {
            Column::StartDate => &mut self.start_date,
            Column::StartHour => &mut self.start_hour,
            Column::Name => &mut self.name,
            Column::Description => &mut self.description,
            Column::IsActive => &mut self.is_active,
            Column::JobId => return false,
        };
        *slot = value.into();
        true
    }

    pub fn reset(&mut self) {
        *self = InsertDraft::default();
    }

    pub fn to_request(&self) -> InsertRequest {
        InsertRequest {
            start_date: self.start_date.clone(),
            start_hour: self.start_hour.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            is_active: self.is_active.clone(),
        }
    }
}

/// Everything the controller owns; status and error are separate display regions
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub store: JobStore,
    pub session: EditSession,
    pub draft: InsertDraft,
    pub status: String,
    pub error: String,
}
