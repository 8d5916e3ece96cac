//! Observer subscriptions.
//!
//! Each subscription pairs a change observer with an optional error
//! observer. The store notifies every subscription at most once per public
//! operation, synchronously and in subscription order.
//!
//! # Example
//!
//! ```ignore
//! let id = store.subscribe(
//!     Subscriber::new()
//!         .on_change(|state, delta, _store| println!("{:?} -> {:?}", delta, state))
//!         .on_error(|errors, _state, _store| eprintln!("{} rejected", errors.len())),
//! )?;
//!
//! store.unsubscribe(id);
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{ChangeObserver, ErrorObserver, Subscriber, SubscriptionId};
