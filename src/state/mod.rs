//! Input normalization and the change engine.
//!
//! Every mutation is expressed as a [`ChangeRequest`]: up to four selectors,
//! one per [`Action`]. The engine resolves each selector against the store in
//! a fixed order (remove, add, deselect, select), applies the valid hits and
//! collects the rejections.

mod engine;
mod operations;
mod resolve;
mod selector;

pub(crate) use engine::{ChangeEngine, ChangeOutcome};
pub use operations::{Action, ChangeRequest};
pub(crate) use resolve::{ResolveContext, ResolveMode};
pub use selector::{ItemPredicate, Selector, StateInput, StateResolver};
