// src/core/gateway/http_gateway.rs

use super::CheckGateway;
use crate::core::error::{CheckError, FieldError};
use crate::core::models::{CheckId, RawCheckPayload};
use crate::core::session::CheckRequest;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const TOKEN_HEADER: &str = "X-Login-Session-Token";
const UID_HEADER: &str = "X-Login-Session-Uid";

/// Login session headers attached to every check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub uid: String,
}

#[derive(Serialize)]
struct SubmitEnvelope<'a> {
    payload: &'a CheckRequest,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(alias = "check_uid", alias = "id")]
    uid: String,
}

/// [`CheckGateway`] over the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, CheckError> {
        let client = Client::builder()
            .user_agent(concat!("NetcheckDashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client for the check gateway.");
                CheckError::Transport(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => builder.header(TOKEN_HEADER, &creds.token).header(UID_HEADER, &creds.uid),
            None => builder,
        }
    }

    /// Sends the request and maps non-2xx statuses onto the error taxonomy.
    async fn send(&self, builder: RequestBuilder, check_id: Option<&CheckId>) -> Result<Response, CheckError> {
        let response = self.authorize(builder).send().await.map_err(|e| {
            warn!(error = %e, "Check service request failed.");
            CheckError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!(%status, "Check service returned an error status.");
        match status {
            StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                Err(CheckError::Validation(format_validation_error(&body)))
            }
            StatusCode::UNAUTHORIZED => {
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                let detail = body
                    .get("detail")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string();
                Err(CheckError::Unauthorized(detail))
            }
            StatusCode::NOT_FOUND => match check_id {
                Some(id) => Err(CheckError::NotFound(id.clone())),
                None => Err(CheckError::Transport("HTTP error! status: 404".to_string())),
            },
            _ => Err(CheckError::Transport(format!("HTTP error! status: {}", status.as_u16()))),
        }
    }
}

#[async_trait]
impl CheckGateway for HttpGateway {
    async fn submit_check(&self, request: &CheckRequest) -> Result<CheckId, CheckError> {
        let url = format!("{}/checks", self.base_url);
        info!(check_type = request.check_type, "Submitting check.");
        let builder = self.client.post(&url).json(&SubmitEnvelope { payload: request });
        let response = self.send(builder, None).await?;
        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| CheckError::Transport(format!("Unreadable submit response: {}", e)))?;
        debug!(check_id = %body.uid, "Check created.");
        Ok(CheckId::new(body.uid))
    }

    async fn fetch_check(&self, check_id: &CheckId) -> Result<RawCheckPayload, CheckError> {
        let url = format!("{}/checks/{}", self.base_url, check_id);
        debug!(%check_id, "Fetching check.");
        let response = self.send(self.client.get(&url), Some(check_id)).await?;
        response
            .json::<RawCheckPayload>()
            .await
            .map_err(|e| CheckError::Transport(format!("Unreadable check payload: {}", e)))
    }
}

/// Turns the service's 422 body into field-level messages.
///
/// The body is either `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`
/// or `{"detail": "..."}`.
pub fn format_validation_error(body: &Value) -> Vec<FieldError> {
    match body.get("detail") {
        Some(Value::Array(items)) => items.iter().map(format_validation_item).collect(),
        Some(Value::String(detail)) => vec![FieldError::new("general", detail)],
        _ => vec![FieldError::new("general", "Validation error")],
    }
}

fn format_validation_item(item: &Value) -> FieldError {
    let field = match item.get("loc").and_then(Value::as_array).and_then(|loc| loc.last()) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "general".to_string(),
    };

    let message = match item.get("type").and_then(Value::as_str) {
        Some("ip_v4_address") => "Must be a valid IPv4 address".to_string(),
        Some("int_parsing") => "Must be a valid integer".to_string(),
        Some("string_type") => "Must be a string".to_string(),
        Some("missing") => "This field is required".to_string(),
        _ => {
            let msg = item.get("msg").and_then(Value::as_str).unwrap_or("Invalid value");
            match msg.strip_prefix("Input ") {
                Some(rest) => lowercase_first(rest),
                None => msg.to_string(),
            }
        }
    };

    FieldError { field, message }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
