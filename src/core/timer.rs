// src/core/timer.rs

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Keyed, cancellable one-shot timers.
///
/// Each armed timer sleeps for its delay and then hands its action to a
/// detached task. Cancelling (or dropping the set) stops timers that are
/// still sleeping; an action that already started runs to completion, so a
/// fetch is never cut off halfway.
#[derive(Debug)]
pub struct TimerSet<K: Eq + Hash> {
    timers: HashMap<K, JoinHandle<()>>,
}

impl<K: Eq + Hash + Copy + std::fmt::Debug> TimerSet<K> {
    pub fn new() -> Self {
        Self { timers: HashMap::new() }
    }

    /// Arms the timer for `key`, replacing (and cancelling) any timer already armed for it.
    pub fn arm<F>(&mut self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel(key);
        trace!(?key, delay_ms = delay.as_millis() as u64, "Arming timer.");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        });
        self.timers.insert(key, handle);
    }

    /// Cancels the timer for `key`. Returns whether one was still sleeping.
    pub fn cancel(&mut self, key: K) -> bool {
        match self.timers.remove(&key) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self, key: K) -> bool {
        self.timers.get(&key).is_some_and(|handle| !handle.is_finished())
    }
}

impl<K: Eq + Hash + Copy + std::fmt::Debug> Default for TimerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for TimerSet<K> {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_action(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_previous_timer() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timers = TimerSet::new();
        timers.arm("a", Duration::from_millis(100), counting_action(&counter));
        tokio::time::sleep(Duration::from_millis(50)).await;
        timers.arm("a", Duration::from_millis(100), counting_action(&counter));
        assert!(timers.is_armed("a"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!timers.is_armed("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_set_cancels_sleeping_timers() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timers = TimerSet::new();
        timers.arm(1u8, Duration::from_millis(100), counting_action(&counter));
        timers.arm(2u8, Duration::from_millis(100), counting_action(&counter));
        assert!(timers.cancel(1));
        drop(timers);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
