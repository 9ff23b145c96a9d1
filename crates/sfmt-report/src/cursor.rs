//! # Violation Navigation
//!
//! [`NavigationState`] is the "current violation" cursor a host keeps
//! across renders. Stepping is clamped at the first and last entries.
//! When the violation list changes, [`NavigationState::resync`] keeps the
//! index if it is still in range and resets it to the first entry only
//! when the new list is too short for it.

use serde::{Deserialize, Serialize};

/// Position within a list of violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationState {
    /// 0-based index of the current entry.
    pub index: usize,
    /// Number of entries.
    pub total: usize,
}

impl NavigationState {
    /// A cursor on the first of `total` entries.
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    /// The current index, or `None` when there are no entries.
    pub fn current(&self) -> Option<usize> {
        (self.index < self.total).then_some(self.index)
    }

    /// Step forward, staying on the last entry.
    pub fn next(self) -> Self {
        if self.total == 0 {
            return self;
        }
        Self {
            index: (self.index + 1).min(self.total - 1),
            ..self
        }
    }

    /// Step back, staying on the first entry.
    pub fn previous(self) -> Self {
        Self {
            index: self.index.saturating_sub(1),
            ..self
        }
    }

    /// Adopt a new list length after the violations changed.
    pub fn resync(self, total: usize) -> Self {
        let index = if self.index < total { self.index } else { 0 };
        Self { index, total }
    }

    /// Returns true on the first entry.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Returns true on the last entry (or when there are none).
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }

    /// 1-based position label, e.g. `2 / 5`.
    pub fn label(&self) -> String {
        if self.total == 0 {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.total)
        }
    }
}

/// Step to the next violation.
pub fn next_violation(state: NavigationState) -> NavigationState {
    state.next()
}

/// Step to the previous violation.
pub fn previous_violation(state: NavigationState) -> NavigationState {
    state.previous()
}
