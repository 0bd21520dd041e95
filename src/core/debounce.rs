// src/core/debounce.rs

use crate::core::models::Category;
use crate::core::timer::TimerSet;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Coalesces bursts of manual refreshes per category into one trailing action.
///
/// Every trigger restarts the category's window, so only the last trigger of
/// a burst fires. Automatic retry polls are scheduled elsewhere and are not
/// affected.
#[derive(Debug)]
pub struct RefreshDebouncer {
    window: Duration,
    timers: TimerSet<Category>,
}

impl RefreshDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, timers: TimerSet::new() }
    }

    pub fn trigger<F>(&mut self, category: Category, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.timers.is_armed(category) {
            debug!(%category, "Coalescing refresh into the pending window.");
        }
        self.timers.arm(category, self.window, action);
    }

    pub fn is_pending(&self, category: Category) -> bool {
        self.timers.is_armed(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_after_the_last_trigger() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = RefreshDebouncer::new(Duration::from_millis(300));

        for _ in 0..5 {
            let fired = fired.clone();
            debouncer.trigger(Category::Ping, async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(debouncer.is_pending(Category::Ping));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn categories_debounce_independently() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = RefreshDebouncer::new(Duration::from_millis(300));
        for category in [Category::Ping, Category::Dns] {
            let fired = fired.clone();
            debouncer.trigger(category, async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
