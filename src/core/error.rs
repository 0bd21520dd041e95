// src/core/error.rs

use crate::core::models::CheckId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self { field: field.to_string(), message: message.to_string() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failures of a check submission or fetch.
///
/// "Not ready yet" and partial per-agent failures are not errors: the former
/// is reported by the normalizer returning no data, the latter lives inside
/// the normalized rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Bad target/port/category parameters. Never retried automatically.
    #[error("{}", join_fields(.0))]
    Validation(Vec<FieldError>),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("check {0} not found")]
    NotFound(CheckId),
    /// Gateway unreachable, non-2xx, or an unreadable body.
    #[error("request failed: {0}")]
    Transport(String),
}

impl CheckError {
    pub fn validation(field: &str, message: &str) -> Self {
        CheckError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CheckError::Validation(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return "Validation error".to_string();
    }
    fields.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
