// src/core/gateway/mock.rs

use super::CheckGateway;
use crate::core::error::CheckError;
use crate::core::models::{CheckId, RawCheckPayload};
use crate::core::session::CheckRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted gateway for orchestrator tests.
///
/// Fetch responses are consumed in order; once the script runs out the last
/// response repeats. Both calls can be slowed down to keep them in flight.
#[derive(Default)]
pub struct MockGateway {
    submits: AtomicUsize,
    fetches: AtomicUsize,
    submit_delay: Duration,
    fetch_delay: Duration,
    submit_error: Option<CheckError>,
    script: Mutex<VecDeque<Result<RawCheckPayload, CheckError>>>,
    last: Mutex<Option<Result<RawCheckPayload, CheckError>>>,
    requests: Mutex<Vec<CheckRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn with_submit_error(mut self, error: CheckError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub fn respond(self, response: Result<RawCheckPayload, CheckError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
        self
    }

    /// Queues a response after construction (e.g. between polls).
    pub fn push(&self, response: Result<RawCheckPayload, CheckError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CheckRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_response(&self) -> Result<RawCheckPayload, CheckError> {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = script.pop_front() {
            *last = Some(next);
        }
        last.clone().unwrap_or_else(|| Ok(RawCheckPayload::default()))
    }
}

#[async_trait]
impl CheckGateway for MockGateway {
    async fn submit_check(&self, request: &CheckRequest) -> Result<CheckId, CheckError> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        match &self.submit_error {
            Some(err) => Err(err.clone()),
            None => Ok(CheckId::new(format!("{}-{}", request.check_type, n))),
        }
    }

    async fn fetch_check(&self, _check_id: &CheckId) -> Result<RawCheckPayload, CheckError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.next_response()
    }
}
