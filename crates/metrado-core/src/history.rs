//! Bounded undo/redo history over one cloneable state slice.

use std::collections::VecDeque;

/// Maximum number of past states retained. Oldest entries are evicted
/// first once the cap is reached.
pub const MAX_PAST: usize = 50;

/// Undo/redo wrapper around a single state slice.
///
/// Every [`History::set`] is one undo step and starts a new timeline
/// branch (the redo stack is cleared unconditionally). Rapid edits are
/// expected to be coalesced by the caller - commit on blur, not one call
/// per keystroke. One `History` wraps exactly one independently-edited
/// slice; do not share it between two.
#[derive(Debug, Clone)]
pub struct History<T> {
    present: T,
    past: VecDeque<T>,
    future: Vec<T>,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            present: initial,
            past: VecDeque::new(),
            future: Vec::new(),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Install a new present, recording the old one as an undo step.
    pub fn set(&mut self, next: T) {
        let prev = std::mem::replace(&mut self.present, next);
        self.push_past_bounded(prev);
        self.future.clear();
    }

    /// Reducer-style variant of [`History::set`].
    pub fn set_with(&mut self, update: impl FnOnce(&T) -> T) {
        let next = update(&self.present);
        self.set(next);
    }

    /// Replace the present without recording history, clearing both
    /// stacks. For hydrating restored state: loading persisted data must
    /// not itself become an undoable step.
    pub fn reset(&mut self, value: T) {
        self.present = value;
        self.past.clear();
        self.future.clear();
    }

    /// Step back one state. No-op (returns false) when the past is empty.
    pub fn undo(&mut self) -> bool {
        match self.past.pop_back() {
            Some(prev) => {
                let current = std::mem::replace(&mut self.present, prev);
                self.future.push(current);
                true
            }
            None => false,
        }
    }

    /// Step forward one state. No-op (returns false) when the future is
    /// empty.
    pub fn redo(&mut self) -> bool {
        match self.future.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.present, next);
                self.push_past_bounded(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    fn push_past_bounded(&mut self, value: T) {
        if self.past.len() == MAX_PAST {
            self.past.pop_front();
        }
        self.past.push_back(value);
    }
}
