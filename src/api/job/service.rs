use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tokio::time::Duration;
use tracing::{error, info, warn};

use super::dto::UpdateRequest;
use super::models::{Column, Job};
use crate::api::validation;
use crate::http::client::JobApi;
use crate::state::{ControllerState, EditSession, InsertDraft};
use crate::worker::refresh_worker::{self, RefreshTicket};

pub const INVALID_INPUT: &str = "Invalid input. Please correct the errors.";
pub const UPDATE_SUCCEEDED: &str = "Update successful. Refreshing data...";
pub const UPDATE_FAILED: &str = "Update failed. Please check the error details.";
pub const INSERT_SUCCEEDED: &str = "Job inserted successfully. Refreshing data...";
pub const INSERT_FAILED: &str = "Job insertion failed. Please check the error details.";

/// Result of a submit intent
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Local checks failed; nothing was sent
    Invalid,
    /// The remote write failed; the user's input is kept
    Failed,
    /// The write succeeded and a refresh is scheduled
    Submitted(RefreshTicket),
}

/// Owns the job snapshot and the in-progress edits, and drives the three
/// remote operations.
///
/// Operations may overlap. Each one applies its result when it completes, so
/// a slow fetch can overwrite the outcome of a faster write.
pub struct SyncController<A> {
    api: A,
    state: Mutex<ControllerState>,
    refresh_delay: Duration,
    pending_refreshes: Mutex<Vec<AbortHandle>>,
}

impl<A: JobApi> SyncController<A> {
    pub fn new(api: A, refresh_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            api,
            state: Mutex::new(ControllerState::default()),
            refresh_delay,
            pending_refreshes: Mutex::new(Vec::new()),
        })
    }

    // The guard is never held across an await, so a poisoned lock still holds
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ControllerState {
        self.lock().clone()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.lock().store.jobs().to_vec()
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    pub fn error(&self) -> String {
        self.lock().error.clone()
    }

    pub fn edit_session(&self) -> EditSession {
        self.lock().session.clone()
    }

    pub fn insert_draft(&self) -> InsertDraft {
        self.lock().draft.clone()
    }

    pub fn has_job(&self, job_id: i64) -> bool {
        self.lock().store.contains(job_id)
    }

    pub fn select_job(&self, job_id: i64) {
        self.lock().session.target_job_id = Some(job_id);
    }

    /// Returns false for columns that cannot be edited
    pub fn select_field(&self, column: Column) -> bool {
        self.lock().session.select_field(column)
    }

    pub fn set_candidate_value(&self, value: impl Into<String>) {
        self.lock().session.candidate_value = value.into();
    }

    /// Returns false for `JobId`, which the server assigns
    pub fn set_draft_field(&self, column: Column, value: impl Into<String>) -> bool {
        self.lock().draft.set(column, value)
    }

    /// Load the full collection
    ///
    /// On failure the previous jobs stay in place and the error region gets
    /// the failure detail. Returns whether the store was replaced.
    pub async fn fetch_all(&self) -> bool {
        info!("Fetching job list");
        match self.api.fetch_jobs().await {
            Ok(jobs) => {
                info!("Fetched {} jobs", jobs.len());
                let mut state = self.lock();
                state.store.replace(jobs);
                state.error.clear();
                true
            }
            Err(e) => {
                error!("Error fetching data: {}", e);
                self.lock().error = e.detail();
                false
            }
        }
    }

    /// Send the current edit session as a single-field update
    pub async fn submit_update(self: &Arc<Self>) -> SubmitOutcome {
        let session = self.edit_session();

        let request = match (session.target_job_id, session.target_field) {
            (Some(job_id), Some(column))
                if validation::validate(column.as_str(), &session.candidate_value) =>
            {
                UpdateRequest {
                    job_id,
                    column: column.to_string(),
                    value: session.candidate_value,
                }
            }
            _ => {
                warn!("Rejected update with invalid input: {:?}", session);
                self.lock().status = INVALID_INPUT.to_string();
                return SubmitOutcome::Invalid;
            }
        };

        info!("Updating job {}: {} = {:?}", request.job_id, request.column, request.value);
        match self.api.update_job(&request).await {
            Ok(()) => {
                info!("Update of job {} succeeded", request.job_id);
                {
                    let mut state = self.lock();
                    state.status = UPDATE_SUCCEEDED.to_string();
                    state.session.clear();
                }
                SubmitOutcome::Submitted(self.schedule_refresh())
            }
            Err(e) => {
                error!("Error in update request for job {}: {}", request.job_id, e);
                let mut state = self.lock();
                state.status = UPDATE_FAILED.to_string();
                state.error = e.detail();
                SubmitOutcome::Failed
            }
        }
    }

    /// Send the current draft as a new job; the draft is not validated locally
    pub async fn submit_insert(self: &Arc<Self>) -> SubmitOutcome {
        let request = self.insert_draft().to_request();

        info!("Inserting job with name={:?}", request.name);
        match self.api.insert_job(&request).await {
            Ok(()) => {
                info!("Insert succeeded");
                {
                    let mut state = self.lock();
                    state.status = INSERT_SUCCEEDED.to_string();
                    state.draft.reset();
                }
                SubmitOutcome::Submitted(self.schedule_refresh())
            }
            Err(e) => {
                error!("Error inserting job: {}", e);
                let mut state = self.lock();
                state.status = INSERT_FAILED.to_string();
                state.error = e.detail();
                SubmitOutcome::Failed
            }
        }
    }

    /// Abort refreshes that have not fired yet; returns how many were stopped
    pub fn abort_pending_refreshes(&self) -> usize {
        let mut pending = self
            .pending_refreshes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut aborted = 0;
        for handle in pending.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    fn schedule_refresh(self: &Arc<Self>) -> RefreshTicket {
        let controller = Arc::clone(self);
        let ticket = refresh_worker::schedule(self.refresh_delay, async move {
            controller.fetch_all().await;
        });

        let mut pending = self
            .pending_refreshes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.push(ticket.abort_handle());
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::dto::InsertRequest;
    use crate::http::mock::{sample_job, server_error, MockApi};
    use tokio::time::{sleep, Instant};

    fn controller(api: &MockApi) -> Arc<SyncController<MockApi>> {
        SyncController::new(api.clone(), Duration::from_millis(1000))
    }

    #[tokio::test]
    async fn fetch_replaces_store_and_clears_error() {
        let api = MockApi::default();
        let c = controller(&api);

        api.reply_fetch(Err(server_error("down")));
        assert!(!c.fetch_all().await);
        assert_eq!(c.error(), "down");

        let second = Job {
            job_id: 2,
            name: "B".to_string(),
            ..sample_job()
        };
        api.reply_fetch(Ok(vec![second.clone(), sample_job()]));
        assert!(c.fetch_all().await);
        assert_eq!(c.jobs(), vec![second, sample_job()]);
        assert_eq!(c.error(), "");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_jobs() {
        let api = MockApi::default();
        let c = controller(&api);

        api.reply_fetch(Ok(vec![sample_job()]));
        c.fetch_all().await;

        api.reply_fetch(Err(server_error(r#"{"error":"database offline"}"#)));
        assert!(!c.fetch_all().await);
        assert_eq!(c.jobs(), vec![sample_job()]);
        assert_eq!(c.error(), "database offline");
    }

    #[tokio::test]
    async fn fetch_error_on_first_load_leaves_store_empty() {
        let api = MockApi::default();
        let c = controller(&api);

        api.reply_fetch(Err(server_error("")));
        c.fetch_all().await;
        assert!(c.jobs().is_empty());
        assert!(!c.error().is_empty());
    }

    #[tokio::test]
    async fn update_without_preconditions_never_calls_remote() {
        let api = MockApi::default();
        let c = controller(&api);

        // nothing selected
        assert!(matches!(c.submit_update().await, SubmitOutcome::Invalid));
        assert_eq!(c.status(), INVALID_INPUT);

        // job but no column
        c.select_job(1);
        c.set_candidate_value("Bob");
        assert!(matches!(c.submit_update().await, SubmitOutcome::Invalid));

        // column but value fails its rule
        c.select_field(Column::IsActive);
        c.set_candidate_value("yes");
        assert!(matches!(c.submit_update().await, SubmitOutcome::Invalid));

        // column set, job missing
        let c2 = controller(&api);
        c2.select_field(Column::Name);
        c2.set_candidate_value("Bob");
        assert!(matches!(c2.submit_update().await, SubmitOutcome::Invalid));

        assert!(api.updates().is_empty());
        assert_eq!(api.fetch_calls(), 0);
        // input is kept for correction
        assert_eq!(c.edit_session().candidate_value, "yes");
    }

    #[tokio::test]
    async fn empty_description_update_is_invalid() {
        let api = MockApi::default();
        let c = controller(&api);

        c.select_job(1);
        c.select_field(Column::Description);
        c.set_candidate_value("");
        assert!(matches!(c.submit_update().await, SubmitOutcome::Invalid));
        assert!(api.updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_update_clears_session_and_refreshes_once() {
        let api = MockApi::default();
        let c = controller(&api);

        api.reply_fetch(Ok(vec![sample_job()]));
        c.fetch_all().await;
        assert_eq!(api.fetch_calls(), 1);

        c.select_job(1);
        assert!(c.select_field(Column::Name));
        c.set_candidate_value("Bob");

        let start = Instant::now();
        let ticket = match c.submit_update().await {
            SubmitOutcome::Submitted(ticket) => ticket,
            other => panic!("expected submitted, got {:?}", other),
        };

        assert_eq!(c.status(), UPDATE_SUCCEEDED);
        assert_eq!(c.edit_session(), EditSession::default());
        assert_eq!(
            api.updates(),
            vec![UpdateRequest {
                job_id: 1,
                column: "Name".to_string(),
                value: "Bob".to_string(),
            }]
        );
        assert_eq!(api.fetch_calls(), 1);

        ticket.wait().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1010));
        assert_eq!(api.fetch_calls(), 2);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(api.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn failed_update_keeps_session() {
        let api = MockApi::default();
        let c = controller(&api);

        c.select_job(1);
        c.select_field(Column::StartHour);
        c.set_candidate_value("10:30:00");
        let before = c.edit_session();

        api.reply_write(Err(server_error(r#"{"error":"Job not found"}"#)));
        assert!(matches!(c.submit_update().await, SubmitOutcome::Failed));

        assert_eq!(c.status(), UPDATE_FAILED);
        assert_eq!(c.error(), "Job not found");
        assert_eq!(c.edit_session(), before);
        assert_eq!(api.fetch_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_insert_resets_draft_and_refreshes() {
        let api = MockApi::default();
        let c = controller(&api);

        c.set_draft_field(Column::StartDate, "2024-02-02");
        c.set_draft_field(Column::StartHour, "10:00:00");
        c.set_draft_field(Column::Name, "New");
        c.set_draft_field(Column::Description, "D");
        c.set_draft_field(Column::IsActive, "1");

        let ticket = match c.submit_insert().await {
            SubmitOutcome::Submitted(ticket) => ticket,
            other => panic!("expected submitted, got {:?}", other),
        };
        assert_eq!(c.status(), INSERT_SUCCEEDED);
        assert_eq!(c.insert_draft(), InsertDraft::default());
        assert_eq!(
            api.inserts(),
            vec![InsertRequest {
                start_date: "2024-02-02".to_string(),
                start_hour: "10:00:00".to_string(),
                name: "New".to_string(),
                description: "D".to_string(),
                is_active: "1".to_string(),
            }]
        );

        ticket.wait().await;
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn insert_skips_local_validation() {
        let api = MockApi::default();
        let c = controller(&api);

        c.set_draft_field(Column::StartDate, "not a date");
        c.set_draft_field(Column::IsActive, "maybe");
        let outcome = c.submit_insert().await;

        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
        assert_eq!(api.inserts().len(), 1);
        assert_eq!(api.inserts()[0].start_date, "not a date");
    }

    #[tokio::test]
    async fn failed_insert_keeps_draft() {
        let api = MockApi::default();
        let c = controller(&api);

        c.set_draft_field(Column::Name, "New");
        c.set_draft_field(Column::IsActive, "0");
        let before = c.insert_draft();

        api.reply_write(Err(server_error("constraint violated")));
        assert!(matches!(c.submit_insert().await, SubmitOutcome::Failed));

        assert_eq!(c.status(), INSERT_FAILED);
        assert_eq!(c.error(), "constraint violated");
        assert_eq!(c.insert_draft(), before);
        assert_eq!(api.fetch_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_sets_error_but_keeps_status() {
        let api = MockApi::default();
        let c = controller(&api);

        c.set_draft_field(Column::Name, "New");
        api.reply_fetch(Err(server_error("refresh failed")));
        let SubmitOutcome::Submitted(ticket) = c.submit_insert().await else {
            panic!("expected submitted");
        };
        ticket.wait().await;

        assert_eq!(c.status(), INSERT_SUCCEEDED);
        assert_eq!(c.error(), "refresh failed");
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_submissions_each_schedule_a_refresh() {
        let api = MockApi::default();
        let c = controller(&api);

        let first = c.submit_insert().await;
        let second = c.submit_insert().await;
        for outcome in [first, second] {
            match outcome {
                SubmitOutcome::Submitted(ticket) => ticket.wait().await,
                other => panic!("expected submitted, got {:?}", other),
            }
        }
        assert_eq!(api.inserts().len(), 2);
        assert_eq!(api.fetch_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abort_pending_refreshes_stops_unfired_refresh() {
        let api = MockApi::default();
        let c = controller(&api);

        let SubmitOutcome::Submitted(ticket) = c.submit_insert().await else {
            panic!("expected submitted");
        };
        assert_eq!(c.abort_pending_refreshes(), 1);
        ticket.wait().await;

        sleep(Duration::from_secs(2)).await;
        assert_eq!(api.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn job_id_column_cannot_be_selected() {
        let api = MockApi::default();
        let c = controller(&api);
        assert!(!c.select_field(Column::JobId));
        assert_eq!(c.edit_session().target_field, None);
        assert!(!c.set_draft_field(Column::JobId, "5"));
    }
}
