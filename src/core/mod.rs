// src/core/mod.rs

// The engine behind the dashboard. Nothing in here touches the terminal:
// the front end talks to it through `CheckOrchestrator` and its change
// subscription.

/// Categories, check identifiers, raw payloads and the normalized view records.
pub mod models;

pub mod error;

/// Validated target/port and the category to remote check mapping.
pub mod session;

pub mod tab_state;
pub mod timer;
pub mod debounce;

/// Boundary to the remote check service.
pub mod gateway;

/// One pure transform per category, from raw payload to view records.
pub mod normalizer;

pub mod orchestrator;
