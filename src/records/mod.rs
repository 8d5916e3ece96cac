//! Item records and key resolution.
//!
//! Records live in an ordered index keyed by a resolved key. Insertion order
//! is the enumeration order of derived state.

mod index;
mod key;

pub use index::{ItemIndex, ItemRecord, ItemView};
pub use key::KeyResolver;
