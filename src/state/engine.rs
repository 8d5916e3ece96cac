//! The change engine: resolves a request phase by phase and mutates the
//! index.

use super::operations::{Action, ChangeRequest};
use super::resolve::ResolveContext;
use crate::records::{ItemIndex, KeyResolver};
use crate::types::{ChangeDelta, LogEntry, StateSnapshot};
use std::hash::Hash;

/// Result of one logical operation.
#[derive(Debug)]
pub(crate) struct ChangeOutcome<T, K> {
    pub delta: ChangeDelta<T>,
    pub errors: Vec<LogEntry<T, K>>,
}

impl<T, K> ChangeOutcome<T, K> {
    pub fn new(delta: ChangeDelta<T>, errors: Vec<LogEntry<T, K>>) -> Self {
        Self { delta, errors }
    }
}

pub(crate) struct ChangeEngine<'a, T, K> {
    pub index: &'a mut ItemIndex<T, K>,
    pub keys: &'a KeyResolver<T, K>,
    pub current: &'a StateSnapshot<T>,
    pub initial: &'a StateSnapshot<T>,
    pub strict: bool,
}

impl<'a, T, K> ChangeEngine<'a, T, K>
where
    T: Clone,
    K: Clone + Eq + Hash,
{
    /// Apply a request in `Action::ORDER`.
    ///
    /// In strict mode the first phase with a rejection applies none of its
    /// hits and later phases are skipped. Phases already applied stay
    /// applied.
    pub fn apply(&mut self, mut request: ChangeRequest<T, K>) -> ChangeOutcome<T, K> {
        let mut delta = ChangeDelta::default();
        let mut errors = std::mem::take(&mut request.rejected);
        let mut halted = self.strict && !errors.is_empty();

        for action in Action::ORDER {
            let Some(selector) = request.take(action) else {
                continue;
            };
            if halted {
                tracing::debug!(?action, "skipping phase after rejection in strict mode");
                continue;
            }

            let resolution = ResolveContext {
                index: &*self.index,
                keys: self.keys,
                current: self.current,
                initial: self.initial,
            }
            .resolve(selector, action.mode());

            tracing::trace!(
                ?action,
                hits = resolution.hits.len(),
                errors = resolution.errors.len(),
                "resolved phase"
            );

            if !resolution.errors.is_empty() {
                errors.extend(resolution.errors);
                if self.strict {
                    halted = true;
                    continue;
                }
            }

            for (key, value) in resolution.hits {
                self.commit(action, key, value, &mut delta);
            }
        }

        ChangeOutcome::new(delta, errors)
    }

    fn commit(&mut self, action: Action, key: K, value: T, delta: &mut ChangeDelta<T>) {
        match action {
            Action::Remove => {
                // a filtered record already left the visible state
                if let Some(record) = self.index.delete(&key).filter(|record| !record.filtered) {
                    if record.selected {
                        delta.deselected.push(record.value.clone());
                    }
                    delta.removed.push(record.value);
                }
            }
            Action::Add => {
                if self.index.insert(key, value.clone()) {
                    delta.added.push(value);
                }
            }
            Action::Deselect => {
                if let Some(record) = self.index.get_mut(&key) {
                    record.selected = false;
                    delta.deselected.push(record.value.clone());
                }
            }
            Action::Select => {
                if let Some(record) = self.index.get_mut(&key) {
                    record.selected = true;
                    delta.selected.push(record.value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Selector;
    use crate::types::ErrorReason;

    struct Fixture {
        index: ItemIndex<i32, i32>,
        keys: KeyResolver<i32, i32>,
        current: StateSnapshot<i32>,
        initial: StateSnapshot<i32>,
    }

    impl Fixture {
        fn new(items: &[i32]) -> Self {
            let mut index = ItemIndex::new();
            for item in items {
                index.insert(*item, *item);
            }
            Self {
                index,
                keys: KeyResolver::identity(),
                current: StateSnapshot::default(),
                initial: StateSnapshot::default(),
            }
        }

        fn apply(&mut self, strict: bool, request: ChangeRequest<i32, i32>) -> ChangeOutcome<i32, i32> {
            ChangeEngine {
                index: &mut self.index,
                keys: &self.keys,
                current: &self.current,
                initial: &self.initial,
                strict,
            }
            .apply(request)
        }
    }

    #[test]
    fn test_remove_then_add_reuses_key() {
        let mut fixture = Fixture::new(&[1, 2, 3]);
        let outcome = fixture.apply(true, ChangeRequest::new().add(vec![2]).remove(vec![2]));
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.delta.removed, vec![2]);
        assert_eq!(outcome.delta.added, vec![2]);
        assert_eq!(fixture.index.snapshot().items, vec![1, 3, 2]);
    }

    #[test]
    fn test_remove_synthesizes_deselect() {
        let mut fixture = Fixture::new(&[1, 2]);
        fixture.apply(false, ChangeRequest::new().select(vec![2]));

        let outcome = fixture.apply(false, ChangeRequest::new().remove(vec![2]));
        assert_eq!(outcome.delta.removed, vec![2]);
        assert_eq!(outcome.delta.deselected, vec![2]);
    }

    #[test]
    fn test_removing_filtered_record_reports_nothing() {
        let mut fixture = Fixture::new(&[1, 2]);
        fixture.apply(false, ChangeRequest::new().select(vec![2]));
        fixture.index.get_mut(&2).unwrap().filtered = true;

        let outcome = fixture.apply(false, ChangeRequest::new().remove(Selector::keys([1, 2])));
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.delta.removed, vec![1]);
        assert!(outcome.delta.deselected.is_empty());
        assert!(fixture.index.is_empty());
    }

    #[test]
    fn test_lenient_applies_hits_alongside_errors() {
        let mut fixture = Fixture::new(&[1]);
        let outcome = fixture.apply(false, ChangeRequest::new().add(vec![1, 2]).select(vec![2]));
        assert_eq!(outcome.delta.added, vec![2]);
        assert_eq!(outcome.delta.selected, vec![2]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].reason(), ErrorReason::AlreadyExist);
    }

    #[test]
    fn test_strict_halts_at_first_rejecting_phase() {
        let mut fixture = Fixture::new(&[1, 2]);
        let outcome = fixture.apply(
            true,
            ChangeRequest::new()
                .remove(vec![2])
                .add(vec![1, 3])
                .select(vec![1]),
        );

        // removal committed, add and select skipped
        assert_eq!(outcome.delta.removed, vec![2]);
        assert!(outcome.delta.added.is_empty());
        assert!(outcome.delta.selected.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(fixture.index.snapshot().items, vec![1]);
    }

    #[test]
    fn test_strict_with_prior_rejections_applies_nothing() {
        let mut fixture = Fixture::new(&[1]);
        let prior = vec![LogEntry::rejected(
            "get",
            ErrorReason::NotExist,
            crate::types::Subject::Item(5),
        )];
        let outcome = fixture.apply(
            true,
            ChangeRequest::new().select(vec![1]).with_rejected(prior),
        );
        assert!(outcome.delta.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }
}
