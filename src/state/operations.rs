//! Change requests and the actions they carry.

use super::resolve::ResolveMode;
use super::selector::Selector;
use crate::types::LogEntry;

/// One phase of a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Remove,
    Add,
    Deselect,
    Select,
}

impl Action {
    /// Evaluation order of a change.
    ///
    /// Removal frees keys before an add reuses them, and deselection runs
    /// before selection.
    pub const ORDER: [Action; 4] = [Action::Remove, Action::Add, Action::Deselect, Action::Select];

    pub(crate) fn mode(&self) -> ResolveMode {
        match self {
            Action::Remove => ResolveMode::Existing,
            Action::Add => ResolveMode::Adding,
            Action::Deselect => ResolveMode::Deselecting,
            Action::Select => ResolveMode::Selecting,
        }
    }
}

/// A combined mutation applied as one logical operation.
///
/// ```ignore
/// // Replace item 1 with item 10 and select it, notifying observers once.
/// store.apply(ChangeRequest::new().remove(vec![1]).add(vec![10]).select(vec![10]));
/// ```
pub struct ChangeRequest<T, K> {
    remove: Option<Selector<T, K>>,
    add: Option<Selector<T, K>>,
    deselect: Option<Selector<T, K>>,
    select: Option<Selector<T, K>>,
    /// Rejections found before the change ran (e.g. while toggling).
    pub(crate) rejected: Vec<LogEntry<T, K>>,
}

impl<T, K> Default for ChangeRequest<T, K> {
    fn default() -> Self {
        Self {
            remove: None,
            add: None,
            deselect: None,
            select: None,
            rejected: Vec::new(),
        }
    }
}

impl<T, K> ChangeRequest<T, K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(mut self, selector: impl Into<Selector<T, K>>) -> Self {
        self.remove = Some(selector.into());
        self
    }

    pub fn add(mut self, selector: impl Into<Selector<T, K>>) -> Self {
        self.add = Some(selector.into());
        self
    }

    pub fn deselect(mut self, selector: impl Into<Selector<T, K>>) -> Self {
        self.deselect = Some(selector.into());
        self
    }

    pub fn select(mut self, selector: impl Into<Selector<T, K>>) -> Self {
        self.select = Some(selector.into());
        self
    }

    pub(crate) fn with_rejected(mut self, rejected: Vec<LogEntry<T, K>>) -> Self {
        self.rejected.extend(rejected);
        self
    }

    pub(crate) fn take(&mut self, action: Action) -> Option<Selector<T, K>> {
        match action {
            Action::Remove => self.remove.take(),
            Action::Add => self.add.take(),
            Action::Deselect => self.deselect.take(),
            Action::Select => self.select.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_per_action() {
        let mut request: ChangeRequest<i32, i32> = ChangeRequest::new().add(vec![1]).select(vec![1]);
        assert!(request.take(Action::Remove).is_none());
        assert!(request.take(Action::Add).is_some());
        assert!(request.take(Action::Add).is_none());
        assert!(request.take(Action::Select).is_some());
    }

    #[test]
    fn test_order() {
        assert_eq!(Action::ORDER[0], Action::Remove);
        assert_eq!(Action::ORDER[3], Action::Select);
        assert_eq!(Action::Add.mode(), ResolveMode::Adding);
    }
}
