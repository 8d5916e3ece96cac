//! Input normalization: turning a selector into validated hits.

use super::selector::Selector;
use crate::records::{ItemIndex, ItemRecord, ItemView, KeyResolver};
use crate::types::{ErrorReason, LogEntry, StateSnapshot, Subject};
use std::collections::HashSet;
use std::hash::Hash;

/// How candidates are validated against the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResolveMode {
    /// New items; the key must be free.
    Adding,
    /// Any stored record, filtered or not.
    Existing,
    /// Visible records.
    Getting,
    /// Visible, unselected records.
    Selecting,
    /// Visible, selected records.
    Deselecting,
}

impl ResolveMode {
    fn verb(&self) -> &'static str {
        match self {
            ResolveMode::Adding => "add",
            ResolveMode::Existing => "remove",
            ResolveMode::Getting => "get",
            ResolveMode::Selecting => "select",
            ResolveMode::Deselecting => "deselect",
        }
    }

    fn sees<T, K>(&self, record: &ItemRecord<T, K>) -> bool {
        *self == ResolveMode::Existing || record.is_visible()
    }

    /// Reason for a key repeated within one request; `None` folds repeats.
    fn repeat_reason(&self) -> Option<ErrorReason> {
        match self {
            ResolveMode::Adding => Some(ErrorReason::AlreadyExist),
            ResolveMode::Existing => Some(ErrorReason::NotExist),
            ResolveMode::Getting => None,
            ResolveMode::Selecting => Some(ErrorReason::AlreadySelected),
            ResolveMode::Deselecting => Some(ErrorReason::NotSelected),
        }
    }
}

/// Candidates split into valid hits and rejections.
pub(crate) struct Resolution<T, K> {
    /// `(key, value)`; the value is the stored one except when adding.
    pub hits: Vec<(K, T)>,
    pub errors: Vec<LogEntry<T, K>>,
}

impl<T, K> Default for Resolution<T, K> {
    fn default() -> Self {
        Self {
            hits: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Store state a resolution runs against.
pub(crate) struct ResolveContext<'a, T, K> {
    pub index: &'a ItemIndex<T, K>,
    pub keys: &'a KeyResolver<T, K>,
    /// Derived state before the operation started.
    pub current: &'a StateSnapshot<T>,
    /// Construction-time snapshot; the source for predicates when adding.
    pub initial: &'a StateSnapshot<T>,
}

impl<'a, T, K> ResolveContext<'a, T, K>
where
    T: Clone,
    K: Clone + Eq + Hash,
{
    pub fn resolve(&self, selector: Selector<T, K>, mode: ResolveMode) -> Resolution<T, K> {
        let mut resolution = Resolution::default();
        let mut seen = HashSet::new();

        for subject in self.candidates(selector, mode) {
            let key = match &subject {
                Subject::Item(item) => self.keys.resolve(item),
                Subject::Key(key) => key.clone(),
            };

            if !seen.insert(key.clone()) {
                if let Some(reason) = mode.repeat_reason() {
                    resolution
                        .errors
                        .push(LogEntry::rejected(mode.verb(), reason, subject));
                }
                continue;
            }

            match self.check(&key, subject, mode) {
                Ok(value) => resolution.hits.push((key, value)),
                Err(entry) => resolution.errors.push(entry),
            }
        }

        resolution
    }

    fn candidates(&self, selector: Selector<T, K>, mode: ResolveMode) -> Vec<Subject<T, K>> {
        match selector {
            Selector::Items(items) => items.into_iter().map(Subject::Item).collect(),
            Selector::Keys(keys) => keys.into_iter().map(Subject::Key).collect(),
            Selector::Matching(predicate) if mode == ResolveMode::Adding => {
                let selected: HashSet<K> = self
                    .initial
                    .selections
                    .iter()
                    .map(|item| self.keys.resolve(item))
                    .collect();
                self.initial
                    .items
                    .iter()
                    .filter(|item| {
                        let key = self.keys.resolve(*item);
                        predicate(&ItemView {
                            value: *item,
                            selected: selected.contains(&key),
                            key: &key,
                        })
                    })
                    .cloned()
                    .map(Subject::Item)
                    .collect()
            }
            Selector::Matching(predicate) => self
                .index
                .records()
                .filter(|record| mode.sees(*record) && predicate(&record.view()))
                .map(|record| Subject::Item(record.value.clone()))
                .collect(),
            // adds run after removals, so they see the state the caller saw
            Selector::Resolve(resolve) => {
                let items = if mode == ResolveMode::Adding {
                    resolve(self.current, self.initial)
                } else {
                    resolve(&self.index.snapshot(), self.initial)
                };
                items.into_iter().map(Subject::Item).collect()
            }
        }
    }

    fn check(
        &self,
        key: &K,
        subject: Subject<T, K>,
        mode: ResolveMode,
    ) -> std::result::Result<T, LogEntry<T, K>> {
        let reject = |reason| LogEntry::rejected(mode.verb(), reason, subject.clone());
        let record = self.index.get(key);

        if mode == ResolveMode::Adding {
            return match (record, &subject) {
                (Some(_), _) => Err(reject(ErrorReason::AlreadyExist)),
                (None, Subject::Item(item)) => Ok(item.clone()),
                (None, Subject::Key(_)) => Err(reject(ErrorReason::NotExist)),
            };
        }

        let record = match record {
            Some(record) if mode.sees(record) => record,
            _ => return Err(reject(ErrorReason::NotExist)),
        };

        match mode {
            ResolveMode::Selecting if record.selected => Err(reject(ErrorReason::AlreadySelected)),
            ResolveMode::Deselecting if !record.selected => Err(reject(ErrorReason::NotSelected)),
            _ => Ok(record.value.clone()),
        }
    }
}
