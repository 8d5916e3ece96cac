//! Subscription manager: notifies observers once per operation.

use crate::error::{Result, StoreError};
use crate::printer::LogLevel;
use crate::store::Store;
use crate::types::{ChangeDelta, LogEntry};

use super::types::{Subscriber, SubscriptionId};

/// Internal subscription state.
struct Subscription<T, K> {
    id: SubscriptionId,
    subscriber: Subscriber<T, K>,
}

/// Holds observers in subscription order and dispatches to them.
pub struct SubscriptionManager<T, K> {
    subscriptions: Vec<Subscription<T, K>>,
    /// Counter for generating subscription IDs.
    next_id: u64,
}

impl<T, K> SubscriptionManager<T, K> {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a subscriber.
    ///
    /// Fails with `InvalidObserver` if the subscriber has no observer.
    pub fn subscribe(&mut self, subscriber: Subscriber<T, K>) -> Result<SubscriptionId> {
        if subscriber.is_empty() {
            return Err(StoreError::InvalidObserver(
                "subscriber has neither a change nor an error observer".to_string(),
            ));
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, subscriber });
        Ok(id)
    }

    /// Remove a subscription and both of its observers.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Notify observers of one finished operation.
    ///
    /// Error observers hear about any rejections. In strict mode a call with
    /// rejections stops there; otherwise change observers are notified if the
    /// delta is non-empty.
    pub(crate) fn dispatch(
        &self,
        store: &Store<T, K>,
        delta: &ChangeDelta<T>,
        errors: &[LogEntry<T, K>],
    ) {
        let config = store.config();
        let state = store.state_ref();

        if !errors.is_empty() {
            for sub in &self.subscriptions {
                if let Some(on_error) = &sub.subscriber.on_error {
                    on_error(errors, state, store);
                }
            }
            if config.strict {
                return;
            }
        }

        if delta.is_empty() {
            return;
        }

        if config.debug {
            let mut message = format!("applied change: {}", delta.summary());
            if !errors.is_empty() {
                message.push_str(&format!(" ({} rejected)", errors.len()));
            }
            config.printer.print(LogLevel::Info, &message);
        }

        for sub in &self.subscriptions {
            if let Some(on_change) = &sub.subscriber.on_change {
                on_change(state, delta, store);
            }
        }
    }
}

impl<T, K> Default for SubscriptionManager<T, K> {
    fn default() -> Self {
        Self::new()
    }
}
