//! Mutation and query inputs.

use crate::error::{Result, StoreError};
use crate::records::ItemView;
use crate::types::StateSnapshot;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Predicate over a stored item.
pub type ItemPredicate<T, K> = Box<dyn Fn(&ItemView<'_, T, K>) -> bool>;

/// Function producing items from the current and the construction-time
/// snapshots, in that order.
pub type StateResolver<T> = Box<dyn Fn(&StateSnapshot<T>, &StateSnapshot<T>) -> Vec<T>>;

/// Which items an operation targets.
pub enum Selector<T, K> {
    /// Full items.
    Items(Vec<T>),
    /// Bare keys.
    Keys(Vec<K>),
    /// Every item the predicate accepts.
    Matching(ItemPredicate<T, K>),
    /// Whatever the function returns for the current snapshot.
    Resolve(StateResolver<T>),
}

impl<T, K> Selector<T, K> {
    pub fn item(item: T) -> Self {
        Selector::Items(vec![item])
    }

    pub fn items(items: impl IntoIterator<Item = T>) -> Self {
        Selector::Items(items.into_iter().collect())
    }

    pub fn key(key: K) -> Self {
        Selector::Keys(vec![key])
    }

    pub fn keys(keys: impl IntoIterator<Item = K>) -> Self {
        Selector::Keys(keys.into_iter().collect())
    }

    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&ItemView<'_, T, K>) -> bool + 'static,
    {
        Selector::Matching(Box::new(predicate))
    }

    /// Like `resolve_with`, also handing over the snapshot taken at
    /// construction.
    pub fn resolve_with_initial<F>(resolve: F) -> Self
    where
        F: Fn(&StateSnapshot<T>, &StateSnapshot<T>) -> Vec<T> + 'static,
    {
        Selector::Resolve(Box::new(resolve))
    }
}

impl<T: 'static, K: 'static> Selector<T, K> {
    /// Every visible item.
    pub fn all() -> Self {
        Selector::matching(|_| true)
    }

    /// Items computed from the current snapshot.
    pub fn resolve_with<F>(resolve: F) -> Self
    where
        F: Fn(&StateSnapshot<T>) -> Vec<T> + 'static,
    {
        Selector::resolve_with_initial(move |current: &StateSnapshot<T>, _: &StateSnapshot<T>| {
            resolve(current)
        })
    }
}

impl<T, K> From<Vec<T>> for Selector<T, K> {
    fn from(items: Vec<T>) -> Self {
        Selector::Items(items)
    }
}

impl<T, K, const N: usize> From<[T; N]> for Selector<T, K> {
    fn from(items: [T; N]) -> Self {
        Selector::Items(items.into_iter().collect())
    }
}

impl<T: fmt::Debug, K: fmt::Debug> fmt::Debug for Selector<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Items(items) => f.debug_tuple("Items").field(items).finish(),
            Selector::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            Selector::Matching(_) => write!(f, "Matching(..)"),
            Selector::Resolve(_) => write!(f, "Resolve(..)"),
        }
    }
}

/// A full state to install with `set_state` or at construction.
pub struct StateInput<T, K> {
    pub items: Selector<T, K>,
    pub selections: Option<Selector<T, K>>,
}

impl<T, K> StateInput<T, K> {
    pub fn new(items: impl Into<Selector<T, K>>) -> Self {
        Self {
            items: items.into(),
            selections: None,
        }
    }

    pub fn with_selections(mut self, selections: impl Into<Selector<T, K>>) -> Self {
        self.selections = Some(selections.into());
        self
    }
}

impl<T: DeserializeOwned, K> StateInput<T, K> {
    /// Parse a JSON state document.
    ///
    /// Accepts an array of items, or an object whose `items` is an array and
    /// whose optional `selections` is an array.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(_) => Ok(Self::new(parse_items::<T>(value, "items")?)),
            Value::Object(mut map) => {
                let items = match map.remove("items") {
                    Some(items @ Value::Array(_)) => parse_items::<T>(items, "items")?,
                    Some(other) => return Err(shape_error("items", &other)),
                    None => {
                        return Err(StoreError::InvalidState(
                            "state object is missing `items`".to_string(),
                        ))
                    }
                };
                let mut input = Self::new(items);
                match map.remove("selections") {
                    Some(selections @ Value::Array(_)) => {
                        input.selections = Some(parse_items::<T>(selections, "selections")?.into());
                    }
                    Some(Value::Null) | None => {}
                    Some(other) => return Err(shape_error("selections", &other)),
                }
                Ok(input)
            }
            other => Err(StoreError::InvalidState(format!(
                "expected an array or an object with `items`, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<T, K> Default for StateInput<T, K> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T, K> From<Vec<T>> for StateInput<T, K> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T, K> From<Selector<T, K>> for StateInput<T, K> {
    fn from(items: Selector<T, K>) -> Self {
        Self::new(items)
    }
}

fn parse_items<T: DeserializeOwned>(value: Value, field: &str) -> Result<Vec<T>> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::InvalidState(format!("`{}` has an invalid item: {}", field, e)))
}

fn shape_error(field: &str, value: &Value) -> StoreError {
    StoreError::InvalidState(format!(
        "`{}` must be an array, got {}",
        field,
        json_kind(value)
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
