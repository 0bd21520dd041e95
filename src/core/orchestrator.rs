// src/core/orchestrator.rs

//! Drives every category's [`TabState`] through its lifecycle for the current session.
//!
//! All state lives behind one mutex that is never held across an `.await`.
//! Gateway calls run unlocked and their results are applied only if the
//! session that issued them is still the active one.

use crate::core::debounce::RefreshDebouncer;
use crate::core::error::CheckError;
use crate::core::gateway::CheckGateway;
use crate::core::models::{Category, CheckId, CheckOptions};
use crate::core::normalizer;
use crate::core::session::{CheckRequest, Session, SessionId};
use crate::core::tab_state::{TabPatch, TabState, TabStatus, TabStore};
use crate::core::timer::TimerSet;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// --- Settings and outcomes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay before an automatic re-poll of a check that is not ready yet.
    pub retry_delay: Duration,
    /// Automatic fetches per category before the tab goes dormant.
    pub max_retries: u32,
    /// Manual refresh coalescing window.
    pub debounce: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(1500),
            max_retries: 10,
            debounce: Duration::from_millis(300),
        }
    }
}

/// What a single `activate`/`poll`/`refresh_now` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready,
    NotReady { retry_count: u32, retry_scheduled: bool },
    /// The gateway call failed; the tab is in `Error`.
    Failed,
    Unavailable,
    /// Nothing to do: already requested, already settled, or a fetch is in flight.
    Skipped,
    /// A manual refresh found a fetch in flight and was pushed into the next debounce window.
    Deferred,
    /// The session was superseded; nothing was applied.
    Stale,
}

/// Published whenever a tab of the active session changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStateChange {
    pub session: SessionId,
    pub category: Category,
    pub state: TabState,
}

// --- Shared state ---

struct ActiveSession {
    session: Arc<Session>,
    tabs: TabStore,
    check_ids: HashMap<Category, CheckId>,
    in_flight: HashSet<Category>,
    retries: TimerSet<Category>,
    debouncer: RefreshDebouncer,
}

impl ActiveSession {
    fn new(session: Arc<Session>, debounce: Duration) -> Self {
        Self {
            tabs: TabStore::for_session(&session),
            session,
            check_ids: HashMap::new(),
            in_flight: HashSet::new(),
            retries: TimerSet::new(),
            debouncer: RefreshDebouncer::new(debounce),
        }
    }

    fn apply(&mut self, category: Category, patch: TabPatch, listeners: &mut Listeners) -> TabState {
        let state = self.tabs.set(category, patch).clone();
        listeners.publish(TabStateChange { session: self.session.id(), category, state: state.clone() });
        state
    }
}

#[derive(Default)]
struct Listeners(Vec<mpsc::UnboundedSender<TabStateChange>>);

impl Listeners {
    fn publish(&mut self, change: TabStateChange) {
        self.0.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

#[derive(Default)]
struct Shared {
    active: Option<ActiveSession>,
    next_session_id: u64,
    listeners: Listeners,
}

/// Where `activate` goes after marking the tab pending.
enum Next {
    Fetch(CheckId),
    Submit(CheckRequest),
}

// --- Orchestrator ---

/// Lazily creates one remote check per category and polls it until the
/// normalizer reports data, the gateway fails or the retry budget is spent.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct CheckOrchestrator {
    gateway: Arc<dyn CheckGateway>,
    settings: PollSettings,
    check_options: CheckOptions,
    shared: Arc<Mutex<Shared>>,
}

impl CheckOrchestrator {
    pub fn new(gateway: Arc<dyn CheckGateway>, settings: PollSettings) -> Self {
        Self {
            gateway,
            settings,
            check_options: CheckOptions::default(),
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    pub fn with_check_options(mut self, check_options: CheckOptions) -> Self {
        self.check_options = check_options;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the active session if it is still `session_id`.
    fn with_active<R>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut ActiveSession, &mut Listeners) -> R,
    ) -> Option<R> {
        let mut shared = self.lock();
        let Shared { active, listeners, .. } = &mut *shared;
        match active {
            Some(active) if active.session.id() == session_id => Some(f(active, listeners)),
            _ => None,
        }
    }

    /// Receives every tab change from now on, across sessions.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TabStateChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().listeners.0.push(tx);
        rx
    }

    /// Validates the input and makes the new session the active one.
    ///
    /// The previous session is dropped along with its retry and debounce
    /// timers; fetches it still has in flight are discarded when they land.
    pub fn create_session(&self, target: &str, port: Option<&str>) -> Result<Arc<Session>, CheckError> {
        let mut shared = self.lock();
        shared.next_session_id += 1;
        let id = SessionId(shared.next_session_id);
        let session = match Session::new(id, target, port) {
            Ok(session) => Arc::new(session),
            Err(e) => {
                warn!(session = %id, error = %e, "Rejected session input.");
                return Err(e);
            }
        };

        let Shared { active, listeners, .. } = &mut *shared;
        if let Some(previous) = active.replace(ActiveSession::new(Arc::clone(&session), self.settings.debounce)) {
            debug!(previous = %previous.session.id(), "Superseding session.");
        }
        if let Some(active) = active.as_ref() {
            for (category, state) in active.tabs.iter() {
                listeners.publish(TabStateChange { session: id, category, state: state.clone() });
            }
        }
        info!(session = %id, target = session.target(), port = ?session.port(), "Session created.");
        Ok(session)
    }

    /// Snapshot for rendering. `None` once `session` has been superseded.
    pub fn tab_state(&self, session: &Session, category: Category) -> Option<TabState> {
        self.with_active(session.id(), |active, _| active.tabs.get(category).clone())
    }

    pub fn check_id(&self, session: &Session, category: Category) -> Option<CheckId> {
        self.with_active(session.id(), |active, _| active.check_ids.get(&category).cloned())
            .flatten()
    }

    /// Fire-and-forget [`activate`](Self::activate), for the presentation layer.
    pub fn activate_category(&self, session: &Arc<Session>, category: Category) {
        let this = self.clone();
        let session = Arc::clone(session);
        tokio::spawn(async move {
            this.activate(&session, category).await;
        });
    }

    /// Creates the category's check on first use and fetches it.
    ///
    /// Idempotent: a tab that is pending, ready or in error is left alone.
    pub async fn activate(&self, session: &Session, category: Category) -> PollOutcome {
        let session_id = session.id();
        let step = self.with_active(session_id, |active, listeners| {
            match active.tabs.get(category).status {
                TabStatus::Unavailable => return Err(PollOutcome::Unavailable),
                TabStatus::Unrequested if !active.in_flight.contains(&category) => {}
                _ => return Err(PollOutcome::Skipped),
            }
            let next = match active.check_ids.get(&category) {
                Some(check_id) => Next::Fetch(check_id.clone()),
                None => Next::Submit(
                    session
                        .check_request(category, &self.check_options)
                        .ok_or(PollOutcome::Unavailable)?,
                ),
            };
            active.in_flight.insert(category);
            active.apply(category, TabPatch::Pending, listeners);
            Ok(next)
        });
        let next = match step {
            None => return PollOutcome::Stale,
            Some(Err(outcome)) => return outcome,
            Some(Ok(next)) => next,
        };

        let check_id = match next {
            Next::Fetch(check_id) => check_id,
            Next::Submit(request) => {
                info!(session = %session_id, %category, "Creating remote check.");
                let result = self.gateway.submit_check(&request).await;
                let stored = self.with_active(session_id, |active, listeners| match result {
                    Ok(check_id) => {
                        debug!(session = %session_id, %category, %check_id, "Remote check created.");
                        active.check_ids.insert(category, check_id.clone());
                        Ok(check_id)
                    }
                    Err(e) => {
                        warn!(session = %session_id, %category, error = %e, "Failed to create remote check.");
                        active.in_flight.remove(&category);
                        active.apply(category, TabPatch::Failed(e.to_string()), listeners);
                        Err(PollOutcome::Failed)
                    }
                });
                match stored {
                    None => {
                        debug!(session = %session_id, %category, "Discarding check created for a superseded session.");
                        return PollOutcome::Stale;
                    }
                    Some(Err(outcome)) => return outcome,
                    Some(Ok(check_id)) => check_id,
                }
            }
        };

        self.fetch_and_apply(session_id, category, check_id).await
    }

    /// Fetches the category's check once. No-op while a fetch is in flight
    /// or before the check exists.
    pub async fn poll(&self, session: &Session, category: Category) -> PollOutcome {
        let session_id = session.id();
        let step = self.with_active(session_id, |active, _| {
            if active.tabs.get(category).status == TabStatus::Unavailable {
                return Err(PollOutcome::Unavailable);
            }
            if active.in_flight.contains(&category) {
                debug!(session = %session_id, %category, "Fetch already in flight.");
                return Err(PollOutcome::Skipped);
            }
            let check_id = active.check_ids.get(&category).cloned().ok_or(PollOutcome::Skipped)?;
            active.in_flight.insert(category);
            Ok(check_id)
        });
        match step {
            None => PollOutcome::Stale,
            Some(Err(outcome)) => outcome,
            Some(Ok(check_id)) => self.fetch_and_apply(session_id, category, check_id).await,
        }
    }

    /// Debounced manual refresh. Bursts within the window collapse into one
    /// [`refresh_now`](Self::refresh_now).
    pub fn manual_refresh(&self, session: &Session, category: Category) {
        self.with_active(session.id(), |active, _| self.arm_refresh(active, category));
    }

    /// The trailing action of a manual refresh: restores the retry budget
    /// and fetches again, or creates the check if it never was.
    pub async fn refresh_now(&self, session: &Session, category: Category) -> PollOutcome {
        let session_id = session.id();
        let step = self.with_active(session_id, |active, listeners| {
            if active.tabs.get(category).status == TabStatus::Unavailable {
                return Err(PollOutcome::Unavailable);
            }
            if active.in_flight.contains(&category) {
                debug!(session = %session_id, %category, "Refresh deferred behind an in-flight fetch.");
                self.arm_refresh(active, category);
                return Err(PollOutcome::Deferred);
            }
            active.retries.cancel(category);
            active.tabs.set(category, TabPatch::ResetRetries);
            info!(session = %session_id, %category, "Manual refresh.");
            match active.check_ids.get(&category).cloned() {
                Some(check_id) => {
                    active.in_flight.insert(category);
                    active.apply(category, TabPatch::Pending, listeners);
                    Ok(Some(check_id))
                }
                None => {
                    active.tabs.set(category, TabPatch::Reset);
                    Ok(None)
                }
            }
        });
        match step {
            None => PollOutcome::Stale,
            Some(Err(outcome)) => outcome,
            Some(Ok(Some(check_id))) => self.fetch_and_apply(session_id, category, check_id).await,
            Some(Ok(None)) => self.activate(session, category).await,
        }
    }

    /// Runs one fetch for a category already marked in flight and applies the result.
    async fn fetch_and_apply(&self, session_id: SessionId, category: Category, check_id: CheckId) -> PollOutcome {
        debug!(session = %session_id, %category, %check_id, "Fetching check.");
        let result = self.gateway.fetch_check(&check_id).await;

        let max_retries = self.settings.max_retries;
        let applied = self.with_active(session_id, |active, listeners| {
            active.in_flight.remove(&category);
            match result {
                Err(e) => {
                    warn!(session = %session_id, %category, %check_id, error = %e, "Fetch failed.");
                    active.apply(category, TabPatch::Failed(e.to_string()), listeners);
                    PollOutcome::Failed
                }
                Ok(payload) => match normalizer::normalize(category, &payload) {
                    Some(data) => {
                        info!(session = %session_id, %category, records = data.record_count(), "Results ready.");
                        active.retries.cancel(category);
                        active.apply(category, TabPatch::Ready(data), listeners);
                        PollOutcome::Ready
                    }
                    None => {
                        let state = active.apply(category, TabPatch::NotReady, listeners);
                        let retry_scheduled = state.retry_count < max_retries;
                        if retry_scheduled {
                            self.schedule_retry(active, category);
                        } else {
                            info!(
                                session = %session_id, %category, retry_count = state.retry_count,
                                "Retry budget spent; waiting for a manual refresh."
                            );
                        }
                        debug!(session = %session_id, %category, retry_count = state.retry_count, "Check not ready yet.");
                        PollOutcome::NotReady { retry_count: state.retry_count, retry_scheduled }
                    }
                },
            }
        });

        applied.unwrap_or_else(|| {
            debug!(session = %session_id, %category, "Discarding result for a superseded session.");
            PollOutcome::Stale
        })
    }

    fn schedule_retry(&self, active: &mut ActiveSession, category: Category) {
        let this = self.clone();
        let session = Arc::clone(&active.session);
        active.retries.arm(category, self.settings.retry_delay, async move {
            this.poll(&session, category).await;
        });
    }

    fn arm_refresh(&self, active: &mut ActiveSession, category: Category) {
        if active.tabs.get(category).status == TabStatus::Unavailable {
            return;
        }
        let this = self.clone();
        let session = Arc::clone(&active.session);
        active.debouncer.trigger(category, async move {
            this.refresh_now(&session, category).await;
        });
    }
}
