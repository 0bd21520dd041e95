// src/core/gateway/mod.rs

//! Request/response boundary to the remote check service.

pub mod http_gateway;
#[cfg(test)]
pub mod mock;

use crate::core::error::CheckError;
use crate::core::models::{CheckId, RawCheckPayload};
use crate::core::session::CheckRequest;
use async_trait::async_trait;

pub use self::http_gateway::HttpGateway;

/// The two calls the dashboard needs from the check service.
///
/// Implementations are stateless per call; the orchestrator shares one
/// instance across sessions.
#[async_trait]
pub trait CheckGateway: Send + Sync {
    /// Creates a remote check and returns its identifier.
    async fn submit_check(&self, request: &CheckRequest) -> Result<CheckId, CheckError>;

    /// Returns the current state of a check; incomplete checks come back with placeholder tasks.
    async fn fetch_check(&self, check_id: &CheckId) -> Result<RawCheckPayload, CheckError>;
}
