// src/core/tab_state.rs

use crate::core::models::{Category, NormalizedData};
use crate::core::session::Session;
use serde::Serialize;
use strum::{Display, EnumCount};

/// Lifecycle of one category within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum TabStatus {
    /// Needs a port the session does not have. Terminal.
    Unavailable,
    Unrequested,
    Pending,
    Ready,
    Error,
}

/// Snapshot of a category's fetch state.
///
/// `status == Ready` exactly when `data` is set and `status == Error`
/// exactly when `error` is set. Only [`TabStore::set`] builds these, which
/// keeps the pairs consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabState {
    pub status: TabStatus,
    pub data: Option<NormalizedData>,
    pub error: Option<String>,
    pub retry_count: u32,
}

impl TabState {
    fn with_status(status: TabStatus) -> Self {
        Self { status, data: None, error: None, retry_count: 0 }
    }

    pub fn unrequested() -> Self {
        Self::with_status(TabStatus::Unrequested)
    }

    pub fn unavailable() -> Self {
        Self::with_status(TabStatus::Unavailable)
    }

    /// Pending with the retry budget spent: nothing will poll again until a manual refresh.
    pub fn is_dormant(&self, max_retries: u32) -> bool {
        self.status == TabStatus::Pending && self.retry_count >= max_retries
    }
}

/// Transitions accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum TabPatch {
    /// A fetch was issued (or is about to be). Clears data and error.
    Pending,
    /// Normalized data arrived. Resets the retry budget.
    Ready(NormalizedData),
    /// The gateway call failed.
    Failed(String),
    /// A fetch returned a payload that is not computed yet.
    NotReady,
    /// Manual refresh: the retry budget starts over.
    ResetRetries,
    /// Back to the initial state, forgetting data and errors.
    Reset,
}

/// Per-session map from category to its state, dense over [`Category`].
#[derive(Debug, Clone)]
pub struct TabStore {
    tabs: [TabState; Category::COUNT],
}

impl TabStore {
    /// Fresh store for a new session. Categories the session cannot run
    /// start (and stay) `Unavailable`.
    pub fn for_session(session: &Session) -> Self {
        let tabs = std::array::from_fn(|index| match Category::from_index(index) {
            Some(category) if !session.is_available(category) => TabState::unavailable(),
            _ => TabState::unrequested(),
        });
        Self { tabs }
    }

    pub fn get(&self, category: Category) -> &TabState {
        &self.tabs[category.index()]
    }

    /// Applies `patch` and returns the resulting state. `Unavailable` tabs ignore every patch.
    pub fn set(&mut self, category: Category, patch: TabPatch) -> &TabState {
        let tab = &mut self.tabs[category.index()];
        if tab.status == TabStatus::Unavailable {
            return tab;
        }

        match patch {
            TabPatch::Pending => {
                tab.status = TabStatus::Pending;
                tab.data = None;
                tab.error = None;
            }
            TabPatch::Ready(data) => {
                tab.status = TabStatus::Ready;
                tab.data = Some(data);
                tab.error = None;
                tab.retry_count = 0;
            }
            TabPatch::Failed(message) => {
                tab.status = TabStatus::Error;
                tab.data = None;
                tab.error = Some(message);
            }
            TabPatch::NotReady => {
                tab.status = TabStatus::Pending;
                tab.data = None;
                tab.error = None;
                tab.retry_count = tab.retry_count.saturating_add(1);
            }
            TabPatch::ResetRetries => tab.retry_count = 0,
            TabPatch::Reset => *tab = TabState::unrequested(),
        }
        tab
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &TabState)> {
        Category::all().map(move |category| (category, self.get(category)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DnsRecords, DnsReport, RowStatus};
    use crate::core::session::SessionId;

    fn dns_data() -> NormalizedData {
        NormalizedData::Dns(DnsReport {
            agent: "Toronto, CA".into(),
            status: RowStatus::Success,
            records: DnsRecords::default(),
        })
    }

    fn store_for(port: Option<&str>) -> TabStore {
        TabStore::for_session(&Session::new(SessionId(7), "example.com", port).unwrap())
    }

    #[test]
    fn port_categories_start_unavailable_without_port() {
        let store = store_for(None);
        assert_eq!(store.get(Category::Tcp).status, TabStatus::Unavailable);
        assert_eq!(store.get(Category::Udp).status, TabStatus::Unavailable);
        assert_eq!(store.get(Category::Dns).status, TabStatus::Unrequested);

        let with_port = store_for(Some("443"));
        assert_eq!(with_port.get(Category::Tcp).status, TabStatus::Unrequested);
    }

    #[test]
    fn unavailable_ignores_patches() {
        let mut store = store_for(None);
        let state = store.set(Category::Tcp, TabPatch::Pending);
        assert_eq!(state.status, TabStatus::Unavailable);
    }

    #[test]
    fn ready_and_error_keep_their_payloads_paired() {
        let mut store = store_for(None);
        store.set(Category::Dns, TabPatch::NotReady);
        store.set(Category::Dns, TabPatch::NotReady);
        let ready = store.set(Category::Dns, TabPatch::Ready(dns_data())).clone();
        assert_eq!(ready.status, TabStatus::Ready);
        assert!(ready.data.is_some() && ready.error.is_none());
        assert_eq!(ready.retry_count, 0);

        let failed = store.set(Category::Dns, TabPatch::Failed("boom".into())).clone();
        assert_eq!(failed.status, TabStatus::Error);
        assert!(failed.data.is_none());
        assert_eq!(failed.error.as_deref(), Some("boom"));

        let pending = store.set(Category::Dns, TabPatch::Pending);
        assert!(pending.data.is_none() && pending.error.is_none());
    }

    #[test]
    fn not_ready_counts_retries_until_reset() {
        let mut store = store_for(None);
        for _ in 0..3 {
            store.set(Category::Ping, TabPatch::NotReady);
        }
        assert_eq!(store.get(Category::Ping).retry_count, 3);
        assert!(store.get(Category::Ping).is_dormant(3));
        store.set(Category::Ping, TabPatch::ResetRetries);
        assert_eq!(store.get(Category::Ping).retry_count, 0);
        assert_eq!(store.get(Category::Ping).status, TabStatus::Pending);
    }
}
