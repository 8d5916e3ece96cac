//! Key resolution: mapping items to their identity key.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Maps an item to the key that identifies it in the store.
///
/// Key derivation must be pure and stable for as long as the item is stored.
pub struct KeyResolver<T, K> {
    select: Arc<dyn Fn(&T) -> K>,
    mode: TrackMode,
}

#[derive(Clone, Debug)]
enum TrackMode {
    Identity,
    Field(String),
    Function,
}

impl<T: Clone + 'static> KeyResolver<T, T> {
    /// Items are their own keys.
    pub fn identity() -> Self {
        Self {
            select: Arc::new(|item: &T| item.clone()),
            mode: TrackMode::Identity,
        }
    }
}

impl<T, K> KeyResolver<T, K> {
    /// Derive keys with a function.
    pub fn by<F>(select: F) -> Self
    where
        F: Fn(&T) -> K + 'static,
    {
        Self {
            select: Arc::new(select),
            mode: TrackMode::Function,
        }
    }

    /// Resolve the key of an item.
    pub fn resolve(&self, item: &T) -> K {
        (self.select)(item)
    }
}

impl KeyResolver<Value, String> {
    /// Track JSON items by a property name.
    ///
    /// Objects carrying the property are keyed by its value. Anything else
    /// (a scalar, or an object without the property) is its own key, so a
    /// bare key such as `"a"` resolves to the same key as `{"id": "a"}`.
    /// Keys are the compact JSON text of the chosen value.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        let field = name.clone();
        Self {
            select: Arc::new(move |item: &Value| match item {
                Value::Object(map) => map.get(&field).unwrap_or(item).to_string(),
                other => other.to_string(),
            }),
            mode: TrackMode::Field(name),
        }
    }
}

impl<T, K> Clone for KeyResolver<T, K> {
    fn clone(&self) -> Self {
        Self {
            select: Arc::clone(&self.select),
            mode: self.mode.clone(),
        }
    }
}

impl<T, K> fmt::Debug for KeyResolver<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            TrackMode::Identity => write!(f, "KeyResolver(identity)"),
            TrackMode::Field(name) => write!(f, "KeyResolver(field: {})", name),
            TrackMode::Function => write!(f, "KeyResolver(fn)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity() {
        let keys = KeyResolver::<i32, i32>::identity();
        assert_eq!(keys.resolve(&7), 7);
        assert_eq!(format!("{:?}", keys), "KeyResolver(identity)");
    }

    #[test]
    fn test_field_accepts_item_or_bare_key() {
        let keys = KeyResolver::field("id");
        assert_eq!(keys.resolve(&json!({"id": "a", "name": "x"})), "\"a\"");
        assert_eq!(keys.resolve(&json!("a")), "\"a\"");
        assert_eq!(keys.resolve(&json!({"id": 7})), keys.resolve(&json!(7)));
        assert_eq!(keys.resolve(&json!({"name": "x"})), r#"{"name":"x"}"#);
        assert_eq!(format!("{:?}", keys), "KeyResolver(field: id)");
    }

    #[test]
    fn test_function() {
        #[derive(Clone)]
        struct User {
            id: u32,
        }

        let keys = KeyResolver::by(|user: &User| user.id);
        assert_eq!(keys.resolve(&User { id: 3 }), 3);
        assert_eq!(format!("{:?}", keys), "KeyResolver(fn)");
    }
}
