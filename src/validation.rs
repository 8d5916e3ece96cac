//! Caller-supplied validity checks.

use crate::store::Store;
use crate::types::StateSnapshot;

/// Predicate over the derived state. Expected to be free of side effects.
pub type Validator<T, K> = Box<dyn Fn(&StateSnapshot<T>, &Store<T, K>) -> bool>;

/// True if every validator accepts the state. No validators means valid.
pub(crate) fn validate<T, K>(
    validators: &[Validator<T, K>],
    state: &StateSnapshot<T>,
    store: &Store<T, K>,
) -> bool {
    validators.iter().all(|validator| validator(state, store))
}
