//! Undo/redo history ledger.
//!
//! Every structural mutation records the block sequence as it stood just
//! before the mutation. Undo swaps the current sequence with the newest
//! `past` entry; redo swaps it with the oldest `future` entry. Snapshots are
//! `BlockSeq`s, so moving one between stacks is a pointer copy.
//!
//! Gestures (a drag that moves blocks many times) are grouped with
//! `begin_batch` / `end_batch`: only the first mutation inside the outermost
//! batch records a snapshot, so the whole gesture undoes in one step.

use ctx_core::model::BlockSeq;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded past/future stacks of block-sequence snapshots.
///
/// `past` is ordered oldest → newest; `future` is ordered next-to-redo →
/// furthest. This is also the persisted shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub past: VecDeque<BlockSeq>,
    pub future: VecDeque<BlockSeq>,
    /// Batch nesting depth (0 = not batching).
    #[serde(skip)]
    batch_depth: usize,
    /// Whether the current batch already recorded its snapshot.
    #[serde(skip)]
    batch_recorded: bool,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `snapshot` as the newest undo step.
    ///
    /// Evicts the oldest entry beyond `limit` and discards the redo branch.
    /// Inside a batch, only the first call records.
    pub fn record(&mut self, snapshot: BlockSeq, limit: usize) {
        self.future.clear();
        if self.batch_depth > 0 {
            if self.batch_recorded {
                return;
            }
            self.batch_recorded = true;
        }

        self.push_past(snapshot, limit);
        log::trace!(
            "history: recorded step ({} undo / 0 redo)",
            self.past.len()
        );
    }

    /// Undo: make the newest `past` entry current. Returns `false` when
    /// there is nothing to undo.
    ///
    /// Inside an open batch, the next mutation records a fresh snapshot of
    /// the sequence undo left behind.
    pub fn undo(&mut self, current: &mut BlockSeq) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        self.future.push_front(replaced);
        self.batch_recorded = false;
        true
    }

    /// Redo: make the front `future` entry current. Returns `false` when
    /// there is nothing to redo.
    pub fn redo(&mut self, current: &mut BlockSeq, limit: usize) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        self.push_past(replaced, limit);
        self.batch_recorded = false;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Start a batch group. Nested calls extend the outermost batch.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_recorded = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. Unbalanced calls are ignored.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.batch_recorded = false;
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    fn push_past(&mut self, snapshot: BlockSeq, limit: usize) {
        self.past.push_back(snapshot);
        while self.past.len() > limit {
            self.past.pop_front();
        }
    }
}
