//! Core types shared by the store, the change engine and observers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a sub-operation was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReason {
    NotExist,
    AlreadyExist,
    AlreadySelected,
    NotSelected,
    InvalidObserver,
    InvalidState,
}

impl ErrorReason {
    /// Wire name of the reason (e.g. `ALREADY_EXIST`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::NotExist => "NOT_EXIST",
            ErrorReason::AlreadyExist => "ALREADY_EXIST",
            ErrorReason::AlreadySelected => "ALREADY_SELECTED",
            ErrorReason::NotSelected => "NOT_SELECTED",
            ErrorReason::InvalidObserver => "INVALID_OBSERVER",
            ErrorReason::InvalidState => "INVALID_STATE",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            ErrorReason::NotExist => "item does not exist",
            ErrorReason::AlreadyExist => "item already exists",
            ErrorReason::AlreadySelected => "item is already selected",
            ErrorReason::NotSelected => "item is not selected",
            ErrorReason::InvalidObserver => "observer is not callable",
            ErrorReason::InvalidState => "state has an invalid shape",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The input a caller handed to the store: a full item or a bare key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Subject<T, K> {
    Item(T),
    Key(K),
}

/// A rejected sub-operation.
///
/// Entries are immutable once built. They are collected and handed to
/// observers; they never abort the operation that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry<T, K> {
    reason: ErrorReason,
    message: String,
    data: Subject<T, K>,
}

impl<T, K> LogEntry<T, K> {
    pub fn new(reason: ErrorReason, message: impl Into<String>, data: Subject<T, K>) -> Self {
        Self {
            reason,
            message: message.into(),
            data,
        }
    }

    /// Build an entry for an operation verb, e.g. `"select"`.
    pub(crate) fn rejected(verb: &str, reason: ErrorReason, data: Subject<T, K>) -> Self {
        let message = format!("cannot {}: {} ({})", verb, reason.describe(), reason);
        Self::new(reason, message, data)
    }

    pub fn reason(&self) -> ErrorReason {
        self.reason
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Subject<T, K> {
        &self.data
    }
}

/// Net changes of one logical operation.
///
/// Each list holds only items whose state actually transitioned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeDelta<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
    pub selected: Vec<T>,
    pub deselected: Vec<T>,
}

impl<T> Default for ChangeDelta<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            selected: Vec::new(),
            deselected: Vec::new(),
        }
    }
}

impl<T> ChangeDelta<T> {
    /// True if nothing transitioned.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.selected.is_empty()
            && self.deselected.is_empty()
    }

    /// Short human-readable summary used by debug logging.
    pub fn summary(&self) -> String {
        format!(
            "added {}, removed {}, selected {}, deselected {}",
            self.added.len(),
            self.removed.len(),
            self.selected.len(),
            self.deselected.len()
        )
    }
}

/// Derived view of the store: visible items and visible selections, in
/// insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot<T> {
    pub items: Vec<T>,
    pub selections: Vec<T>,
}

impl<T> Default for StateSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selections: Vec::new(),
        }
    }
}
