//! # Selection Store
//!
//! A reactive, keyed collection of items with a selected subset. Observers
//! are told about the net change of every operation.
//!
//! ## Core Concepts
//!
//! - **Items**: Stored in insertion order under a key (the item itself, or a
//!   key derived with a [`KeyResolver`])
//! - **Selections**: A subset of the items, kept consistent with removals
//! - **Change engine**: Resolves removes, adds, deselects and selects in that
//!   order and produces one [`ChangeDelta`] per operation
//! - **Strict mode**: Any rejected sub-operation suppresses change
//!   notification for that operation
//! - **Filters**: Hide items from the derived state without removing them
//!
//! ## Example
//!
//! ```ignore
//! use selection_store::{Selector, StateInput, Store, StoreConfig, Subscriber};
//!
//! let mut store = Store::create(
//!     StateInput::new(vec![1, 2, 3]).with_selections(vec![2]),
//!     StoreConfig::default(),
//! );
//!
//! store.subscribe(Subscriber::new().on_change(|state, delta, _store| {
//!     println!("{:?} after {:?}", state, delta);
//! }))?;
//!
//! store.remove(vec![2]).toggle(vec![1, 3]);
//! assert_eq!(store.selections(), &[1, 3]);
//! ```

pub mod error;
pub mod printer;
pub mod records;
pub mod state;
pub mod store;
pub mod subscriptions;
pub mod types;
pub mod validation;

// Re-exports
pub use error::{Result, StoreError};
pub use printer::{LogLevel, Printer, TracingPrinter};
pub use records::{ItemIndex, ItemRecord, ItemView, KeyResolver};
pub use state::{Action, ChangeRequest, ItemPredicate, Selector, StateInput, StateResolver};
pub use store::{Store, StoreConfig};
pub use subscriptions::{
    ChangeObserver, ErrorObserver, Subscriber, SubscriptionId, SubscriptionManager,
};
pub use types::*;
pub use validation::Validator;
