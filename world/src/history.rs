//! Undo/redo stacks of full roster snapshots.

use skirmish_core::TurnRecord;

/// Ordered snapshot history with a parallel redo stack.
///
/// Records are owned copies, so restoring one never aliases the live
/// rosters. The earliest record is never discarded by [`History::undo`].
#[derive(Clone, Debug, Default)]
pub struct History {
    records: Vec<TurnRecord>,
    redo: Vec<TurnRecord>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot. The redo stack is left untouched.
    pub fn push(&mut self, record: TurnRecord) {
        self.records.push(record);
    }

    /// Moves the newest snapshot onto the redo stack and returns the one now on top.
    ///
    /// Returns `None` without changes when fewer than two snapshots exist.
    pub fn undo(&mut self) -> Option<&TurnRecord> {
        if self.records.len() < 2 {
            return None;
        }
        let undone = self.records.pop()?;
        self.redo.push(undone);
        self.records.last()
    }

    /// Moves the most recently undone snapshot back onto the history and returns it.
    pub fn redo(&mut self) -> Option<&TurnRecord> {
        let replayed = self.redo.pop()?;
        self.records.push(replayed);
        self.records.last()
    }

    /// Newest recorded snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&TurnRecord> {
        self.records.last()
    }

    /// Number of snapshots in the history.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether no snapshot has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of snapshots waiting on the redo stack.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
