//! Scripted `JobApi` shared by the controller, shell and shutdown tests

use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::client::{ApiError, JobApi};
use crate::api::job::dto::{InsertRequest, UpdateRequest};
use crate::api::job::Job;

#[derive(Default)]
struct MockInner {
    fetch_replies: Mutex<VecDeque<Result<Vec<Job>, ApiError>>>,
    write_replies: Mutex<VecDeque<Result<(), ApiError>>>,
    fetch_calls: AtomicUsize,
    updates: Mutex<Vec<UpdateRequest>>,
    inserts: Mutex<Vec<InsertRequest>>,
}

/// Scripted remote service; unscripted calls succeed with an empty result
#[derive(Clone, Default)]
pub struct MockApi(Arc<MockInner>);

impl MockApi {
    pub fn reply_fetch(&self, reply: Result<Vec<Job>, ApiError>) {
        self.0.fetch_replies.lock().unwrap().push_back(reply);
    }

    pub fn reply_write(&self, reply: Result<(), ApiError>) {
        self.0.write_replies.lock().unwrap().push_back(reply);
    }

    pub fn fetch_calls(&self) -> usize {
        self.0.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<UpdateRequest> {
        self.0.updates.lock().unwrap().clone()
    }

    pub fn inserts(&self) -> Vec<InsertRequest> {
        self.0.inserts.lock().unwrap().clone()
    }

    fn next_write(&self) -> Result<(), ApiError> {
        self.0.write_replies.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

impl JobApi for MockApi {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.0.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.0
            .fetch_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn update_job(&self, request: &UpdateRequest) -> Result<(), ApiError> {
        self.0.updates.lock().unwrap().push(request.clone());
        self.next_write()
    }

    async fn insert_job(&self, request: &InsertRequest) -> Result<(), ApiError> {
        self.0.inserts.lock().unwrap().push(request.clone());
        self.next_write()
    }
}

pub fn server_error(body: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: body.to_string(),
    }
}


pub fn sample_job() -> Job {
    Job {
        job_id: 1,
        start_date: "2024-01-01".to_string(),
        start_hour: "09:00:00".to_string(),
        name: "A".to_string(),
        description: Some(String::new()),
        is_active: true,
    }
}
