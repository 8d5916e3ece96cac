//! Subscription types.

use crate::store::Store;
use crate::types::{ChangeDelta, LogEntry, StateSnapshot};

/// Called with the new state and the delta after a successful change.
pub type ChangeObserver<T, K> = Box<dyn Fn(&StateSnapshot<T>, &ChangeDelta<T>, &Store<T, K>)>;

/// Called with the rejections of an operation.
pub type ErrorObserver<T, K> = Box<dyn Fn(&[LogEntry<T, K>], &StateSnapshot<T>, &Store<T, K>)>;

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A change observer paired with an error observer.
///
/// At least one of the two must be set.
pub struct Subscriber<T, K> {
    pub(crate) on_change: Option<ChangeObserver<T, K>>,
    pub(crate) on_error: Option<ErrorObserver<T, K>>,
}

impl<T, K> Subscriber<T, K> {
    pub fn new() -> Self {
        Self {
            on_change: None,
            on_error: None,
        }
    }

    pub fn on_change<F>(mut self, observer: F) -> Self
    where
        F: Fn(&StateSnapshot<T>, &ChangeDelta<T>, &Store<T, K>) + 'static,
    {
        self.on_change = Some(Box::new(observer));
        self
    }

    pub fn on_error<F>(mut self, observer: F) -> Self
    where
        F: Fn(&[LogEntry<T, K>], &StateSnapshot<T>, &Store<T, K>) + 'static,
    {
        self.on_error = Some(Box::new(observer));
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.on_change.is_none() && self.on_error.is_none()
    }
}

impl<T, K> Default for Subscriber<T, K> {
    fn default() -> Self {
        Self::new()
    }
}
