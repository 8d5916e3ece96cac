//! Main Store struct tying all components together.

use crate::error::Result;
use crate::printer::{LogLevel, Printer, TracingPrinter};
use crate::records::{ItemIndex, ItemView, KeyResolver};
use crate::state::{
    ChangeEngine, ChangeOutcome, ChangeRequest, ResolveContext, ResolveMode, Selector, StateInput,
};
use crate::subscriptions::{Subscriber, SubscriptionId, SubscriptionManager};
use crate::types::{ChangeDelta, ErrorReason, LogEntry, StateSnapshot, Subject};
use crate::validation::{validate, Validator};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Store configuration. Fixed for the lifetime of a store.
pub struct StoreConfig<T, K = T> {
    /// How items map to keys.
    pub track_by: KeyResolver<T, K>,

    /// Suppress change notification for any operation with a rejection.
    pub strict: bool,

    /// Print a summary of every applied change.
    pub debug: bool,

    /// Checks backing `Store::is_valid`.
    pub validators: Vec<Validator<T, K>>,

    /// Destination for rejection and debug output.
    pub printer: Arc<dyn Printer>,
}

impl<T, K> StoreConfig<T, K> {
    /// Default settings with a custom key resolver.
    pub fn tracked_by(track_by: KeyResolver<T, K>) -> Self {
        Self {
            track_by,
            strict: false,
            debug: false,
            validators: Vec::new(),
            printer: Arc::new(TracingPrinter),
        }
    }

    /// Add a validator.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&StateSnapshot<T>, &Store<T, K>) -> bool + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }
}

impl<T: Clone + 'static> Default for StoreConfig<T, T> {
    fn default() -> Self {
        Self::tracked_by(KeyResolver::identity())
    }
}

impl<T, K> fmt::Debug for StoreConfig<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("track_by", &self.track_by)
            .field("strict", &self.strict)
            .field("debug", &self.debug)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// A keyed collection of items with a selected subset.
///
/// All mutation goes through the change engine; each public mutator
/// notifies observers at most once. Mutators take `&mut self` and observers
/// receive `&Store`, so an observer can read the store but cannot mutate it
/// from inside a notification.
pub struct Store<T, K = T> {
    /// Store configuration.
    config: StoreConfig<T, K>,

    /// Item records in insertion order.
    index: ItemIndex<T, K>,

    /// Derived state, recomputed after every operation.
    state: StateSnapshot<T>,

    /// State right after construction, used by `reset`.
    initial: StateSnapshot<T>,

    /// Change and error observers.
    subscriptions: SubscriptionManager<T, K>,
}

impl<T> Store<T, T>
where
    T: Clone + Eq + Hash + 'static,
{
    /// Create an empty store keyed by item identity.
    pub fn new() -> Self {
        Self::create(StateInput::default(), StoreConfig::default())
    }

    /// Create a store holding `items`, keyed by item identity.
    pub fn with_items(items: Vec<T>) -> Self {
        Self::create(items, StoreConfig::default())
    }
}

impl<T> Default for Store<T, T>
where
    T: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> Store<T, K> {
    pub fn config(&self) -> &StoreConfig<T, K> {
        &self.config
    }

    pub(crate) fn state_ref(&self) -> &StateSnapshot<T> {
        &self.state
    }
}

impl<T, K> Store<T, K>
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + 'static,
{
    /// Create a store and install its initial state.
    ///
    /// The resulting state is kept as the target of `reset`.
    pub fn create(initial: impl Into<StateInput<T, K>>, config: StoreConfig<T, K>) -> Self {
        let mut store = Self {
            config,
            index: ItemIndex::new(),
            state: StateSnapshot::default(),
            initial: StateSnapshot::default(),
            subscriptions: SubscriptionManager::new(),
        };
        store.set_state(initial);
        store.initial = store.state.clone();
        store
    }

    // --- Subscriptions ---

    /// Register observers. Fails if the subscriber carries none.
    ///
    /// Error observers run only for calls that notify: one that changed
    /// something, or a strict one with rejections. A lenient call whose
    /// every sub-operation was rejected (selecting an already selected
    /// item, say) notifies nobody; its rejections go to the printer at
    /// `Debug`.
    pub fn subscribe(&mut self, subscriber: Subscriber<T, K>) -> Result<SubscriptionId> {
        self.subscriptions.subscribe(subscriber)
    }

    /// Remove both observers of a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    // --- Mutations ---

    /// Apply a combined request as one operation.
    pub fn apply(&mut self, request: ChangeRequest<T, K>) -> &mut Self {
        let outcome = ChangeEngine {
            index: &mut self.index,
            keys: &self.config.track_by,
            current: &self.state,
            initial: &self.initial,
            strict: self.config.strict,
        }
        .apply(request);
        self.finish(outcome)
    }

    pub fn add(&mut self, input: impl Into<Selector<T, K>>) -> &mut Self {
        self.apply(ChangeRequest::new().add(input))
    }

    pub fn remove(&mut self, input: impl Into<Selector<T, K>>) -> &mut Self {
        self.apply(ChangeRequest::new().remove(input))
    }

    pub fn select(&mut self, input: impl Into<Selector<T, K>>) -> &mut Self {
        self.apply(ChangeRequest::new().select(input))
    }

    pub fn deselect(&mut self, input: impl Into<Selector<T, K>>) -> &mut Self {
        self.apply(ChangeRequest::new().deselect(input))
    }

    pub fn select_all(&mut self) -> &mut Self {
        self.select(Selector::matching(|view: &ItemView<'_, T, K>| !view.selected))
    }

    pub fn deselect_all(&mut self) -> &mut Self {
        self.deselect(Selector::matching(|view: &ItemView<'_, T, K>| view.selected))
    }

    /// Remove every item, filtered ones included.
    pub fn clear(&mut self) -> &mut Self {
        let keys = self.index.keys();
        self.remove(Selector::Keys(keys))
    }

    /// Flip the selection of each visible item in `input`.
    pub fn toggle(&mut self, input: impl Into<Selector<T, K>>) -> &mut Self {
        let resolution = self.context().resolve(input.into(), ResolveMode::Getting);

        let mut select = Vec::new();
        let mut deselect = Vec::new();
        for (key, _) in resolution.hits {
            let selected = self.index.get(&key).map_or(false, |record| record.selected);
            if selected {
                deselect.push(key);
            } else {
                select.push(key);
            }
        }

        self.apply(
            ChangeRequest::new()
                .deselect(Selector::Keys(deselect))
                .select(Selector::Keys(select))
                .with_rejected(resolution.errors),
        )
    }

    /// Replace the whole state: remove everything, add `input.items`, then
    /// select `input.selections`.
    pub fn set_state(&mut self, input: impl Into<StateInput<T, K>>) -> &mut Self {
        let StateInput { items, selections } = input.into();

        let mut request = ChangeRequest::new()
            .remove(Selector::Keys(self.index.keys()))
            .add(items);
        if let Some(selections) = selections {
            request = request.select(selections);
        }
        self.apply(request)
    }

    /// `set_state` from a JSON state document.
    pub fn set_state_json(&mut self, value: serde_json::Value) -> Result<&mut Self>
    where
        T: DeserializeOwned,
    {
        let input = StateInput::from_json(value)?;
        Ok(self.set_state(input))
    }

    /// Return to the state captured at construction.
    pub fn reset(&mut self) -> &mut Self {
        let input = StateInput::new(self.initial.items.clone())
            .with_selections(self.initial.selections.clone());
        self.set_state(input)
    }

    /// Show only the items the predicate accepts.
    ///
    /// Hidden items stay stored (with their selection) and reappear when a
    /// later filter accepts them. Items that become hidden are reported as
    /// removed (and deselected if selected); items that reappear as added.
    pub fn filter<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&ItemView<'_, T, K>) -> bool,
    {
        let mut delta = ChangeDelta::default();

        for record in self.index.records_mut() {
            let visible = predicate(&record.view());
            if visible == record.is_visible() {
                continue;
            }
            record.filtered = !visible;

            let (items, selections) = if visible {
                (&mut delta.added, &mut delta.selected)
            } else {
                (&mut delta.removed, &mut delta.deselected)
            };
            items.push(record.value.clone());
            if record.selected {
                selections.push(record.value.clone());
            }
        }

        self.finish(ChangeOutcome::new(delta, Vec::new()))
    }

    /// Make every stored item visible again.
    pub fn clear_filter(&mut self) -> &mut Self {
        self.filter(|_| true)
    }

    /// Replace one stored item with `replacement`, keeping its position and
    /// selection.
    pub fn swap(&mut self, existing: impl Into<Selector<T, K>>, replacement: T) -> &mut Self {
        let resolution = self.context().resolve(existing.into(), ResolveMode::Getting);
        let mut errors = resolution.errors;
        let mut delta = ChangeDelta::default();
        let halted = self.config.strict && !errors.is_empty();

        if let Some((key, _)) = resolution.hits.into_iter().next().filter(|_| !halted) {
            let new_key = self.config.track_by.resolve(&replacement);

            if new_key != key && self.index.has(&new_key) {
                errors.push(LogEntry::rejected(
                    "swap",
                    ErrorReason::AlreadyExist,
                    Subject::Item(replacement),
                ));
            } else if let Some(old) = self.index.replace(&key, new_key, replacement.clone()) {
                if old.selected {
                    delta.deselected.push(old.value.clone());
                    delta.selected.push(replacement.clone());
                }
                delta.removed.push(old.value);
                delta.added.push(replacement);
            }
        }

        self.finish(ChangeOutcome::new(delta, errors))
    }

    /// Apply the structural inverse of a delta.
    ///
    /// Added items are removed, removed items added, and selections flipped.
    /// This is not an undo: order and earlier rejections are not restored.
    pub fn revert(&mut self, delta: &ChangeDelta<T>) -> &mut Self {
        let keys = &self.config.track_by;
        let removing: HashSet<K> = delta.added.iter().map(|item| keys.resolve(item)).collect();
        // removal already deselects
        let deselect: Vec<T> = delta
            .selected
            .iter()
            .filter(|item| !removing.contains(&keys.resolve(item)))
            .cloned()
            .collect();

        self.apply(
            ChangeRequest::new()
                .remove(delta.added.clone())
                .add(delta.removed.clone())
                .deselect(deselect)
                .select(delta.deselected.clone()),
        )
    }

    // --- Queries ---

    /// Fresh copy of the derived state.
    pub fn state(&self) -> StateSnapshot<T> {
        self.state.clone()
    }

    /// Visible items in insertion order.
    pub fn items(&self) -> &[T] {
        &self.state.items
    }

    /// Visible selected items in insertion order.
    pub fn selections(&self) -> &[T] {
        &self.state.selections
    }

    /// Visible item stored under `key`.
    pub fn get(&self, key: &K) -> Option<&T> {
        self.index
            .get(key)
            .filter(|record| record.is_visible())
            .map(|record| &record.value)
    }

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// True if `input` names at least one item and every named item is
    /// stored and visible.
    pub fn has(&self, input: impl Into<Selector<T, K>>) -> bool {
        let resolution = self.context().resolve(input.into(), ResolveMode::Getting);
        resolution.errors.is_empty() && !resolution.hits.is_empty()
    }

    /// Like `has`, and every named item is selected.
    pub fn is_selected(&self, input: impl Into<Selector<T, K>>) -> bool {
        let resolution = self.context().resolve(input.into(), ResolveMode::Getting);
        resolution.errors.is_empty()
            && !resolution.hits.is_empty()
            && resolution
                .hits
                .iter()
                .all(|(key, _)| self.index.get(key).map_or(false, |record| record.selected))
    }

    /// True if any visible item matches.
    pub fn some<F>(&self, predicate: F) -> bool
    where
        F: Fn(&ItemView<'_, T, K>) -> bool,
    {
        self.index.visible().any(|record| predicate(&record.view()))
    }

    /// True if every visible item matches.
    pub fn every<F>(&self, predicate: F) -> bool
    where
        F: Fn(&ItemView<'_, T, K>) -> bool,
    {
        self.index.visible().all(|record| predicate(&record.view()))
    }

    /// Run every configured validator against the current state.
    pub fn is_valid(&self) -> bool {
        validate(&self.config.validators, &self.state, self)
    }

    // --- Internal ---

    fn context(&self) -> ResolveContext<'_, T, K> {
        ResolveContext {
            index: &self.index,
            keys: &self.config.track_by,
            current: &self.state,
            initial: &self.initial,
        }
    }

    /// Refresh derived state, print rejections and notify observers.
    fn finish(&mut self, outcome: ChangeOutcome<T, K>) -> &mut Self {
        self.state = self.index.snapshot();

        let level = if self.config.strict {
            LogLevel::Warn
        } else {
            LogLevel::Debug
        };
        for entry in &outcome.errors {
            self.config.printer.print(level, entry.message());
        }

        let notify = !outcome.delta.is_empty() || (self.config.strict && !outcome.errors.is_empty());
        if notify {
            let store: &Self = self;
            store
                .subscriptions
                .dispatch(store, &outcome.delta, &outcome.errors);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn strict_config() -> StoreConfig<i32> {
        StoreConfig {
            strict: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_with_selections() {
        let store = Store::create(
            StateInput::new(vec![1, 2, 3]).with_selections(vec![2]),
            StoreConfig::default(),
        );
        assert_eq!(store.items(), &[1, 2, 3]);
        assert_eq!(store.selections(), &[2]);
        assert!(store.is_selected(Selector::item(2)));
        assert!(!store.is_selected(vec![1, 2]));
    }

    #[test]
    fn test_create_with_selection_predicate() {
        let store = Store::create(
            StateInput::new(vec![1, 2, 3, 4])
                .with_selections(Selector::matching(|view: &ItemView<'_, i32, i32>| *view.value % 2 == 0)),
            StoreConfig::default(),
        );
        assert_eq!(store.selections(), &[2, 4]);
    }

    #[test]
    fn test_queries() {
        let mut store = Store::with_items(vec![1, 2, 3]);
        store.select(vec![3]);

        assert!(store.has(vec![1, 2]));
        assert!(!store.has(vec![1, 9]));
        assert!(!store.has(Vec::<i32>::new()));
        assert!(store.some(|view| view.selected));
        assert!(store.every(|view| *view.value > 0));
        assert!(!store.every(|view| view.selected));
        assert_eq!(store.get(&2), Some(&2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_filter_hides_without_removing() {
        let mut store = Store::with_items(vec![1, 2, 3, 4]);
        store.select(vec![2, 3]);

        let deltas = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&deltas);
        store
            .subscribe(Subscriber::new().on_change(move |_, delta, _| {
                captured.lock().push(delta.clone());
            }))
            .unwrap();

        store.filter(|view| *view.value != 2);
        assert_eq!(store.items(), &[1, 3, 4]);
        assert_eq!(store.selections(), &[3]);
        assert!(!store.has(Selector::item(2)));
        assert_eq!(store.get(&2), None);

        store.clear_filter();
        assert_eq!(store.items(), &[1, 2, 3, 4]);
        assert_eq!(store.selections(), &[2, 3]);

        let deltas = deltas.lock();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].removed, vec![2]);
        assert_eq!(deltas[0].deselected, vec![2]);
        assert_eq!(deltas[1].added, vec![2]);
        assert_eq!(deltas[1].selected, vec![2]);
    }

    #[test]
    fn test_filter_without_visibility_change_is_silent() {
        let mut store = Store::with_items(vec![1, 2]);
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        store
            .subscribe(Subscriber::new().on_change(move |_, _, _| *counter.lock() += 1))
            .unwrap();

        store.filter(|_| true);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_swap_keeps_position_and_selection() {
        let mut store = Store::with_items(vec![1, 2, 3]);
        store.select(vec![2]);

        let deltas = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&deltas);
        store
            .subscribe(Subscriber::new().on_change(move |_, delta, _| {
                captured.lock().push(delta.clone());
            }))
            .unwrap();

        store.swap(Selector::item(2), 20);
        assert_eq!(store.items(), &[1, 20, 3]);
        assert_eq!(store.selections(), &[20]);

        let deltas = deltas.lock();
        assert_eq!(deltas.len(), 1);
        assert_eq!(
            deltas[0],
            ChangeDelta {
                added: vec![20],
                removed: vec![2],
                selected: vec![20],
                deselected: vec![2],
            }
        );
    }

    #[test]
    fn test_swap_onto_existing_key_rejected() {
        let mut store = Store::create(vec![1, 2, 3], strict_config());
        let errors = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&errors);
        store
            .subscribe(Subscriber::new().on_error(move |entries, _, _| {
                captured.lock().extend(entries.iter().map(|e| e.reason()));
            }))
            .unwrap();

        store.swap(Selector::item(1), 3);
        assert_eq!(store.items(), &[1, 2, 3]);
        assert_eq!(*errors.lock(), vec![ErrorReason::AlreadyExist]);
    }

    #[test]
    fn test_revert_restores_membership() {
        let mut store = Store::with_items(vec![1, 2, 3]);
        store.select(vec![2]);

        let last = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&last);
        store
            .subscribe(Subscriber::new().on_change(move |_, delta, _| {
                *captured.lock() = Some(delta.clone());
            }))
            .unwrap();

        store.apply(ChangeRequest::new().remove(vec![2]).add(vec![4]).select(vec![4]));
        assert_eq!(store.items(), &[1, 3, 4]);

        let delta = last.lock().take().unwrap();
        store.revert(&delta);
        assert_eq!(store.items(), &[1, 3, 2]);
        assert_eq!(store.selections(), &[2]);
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut store = Store::create(
            StateInput::new(vec![1, 2, 3]).with_selections(vec![1]),
            StoreConfig::default(),
        );
        store.remove(vec![1]).add(vec![9]).select(vec![9]).filter(|v| *v.value > 2);

        store.reset();
        assert_eq!(
            store.state(),
            StateSnapshot {
                items: vec![1, 2, 3],
                selections: vec![1],
            }
        );
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut store = Store::with_items(vec![1, 2, 3]);
        store.select(vec![1]).select_all();
        assert_eq!(store.selections(), &[1, 2, 3]);

        store.deselect_all();
        assert!(store.selections().is_empty());

        store.filter(|v| *v.value == 1).clear();
        store.clear_filter();
        assert!(store.is_empty());
    }

    #[test]
    fn test_validators() {
        let config = StoreConfig::default()
            .with_validator(|state: &StateSnapshot<i32>, _: &Store<i32>| !state.selections.is_empty());
        let mut store = Store::create(vec![1, 2], config);
        assert!(!store.is_valid());

        store.select(vec![1]);
        assert!(store.is_valid());

        assert!(Store::with_items(vec![1]).is_valid());
    }

    #[test]
    fn test_state_is_a_copy() {
        let mut store = Store::with_items(vec![1]);
        let mut state = store.state();
        state.items.push(99);
        assert_eq!(store.items(), &[1]);

        store.add(vec![2]);
        assert_eq!(state.items, vec![1, 99]);
    }
}
