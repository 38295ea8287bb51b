//! The complete mutable state of a canvas workspace.

use crate::history::History;
use ctx_core::id::BlockId;
use ctx_core::model::{Block, BlockSeq, Viewport, empty_seq};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Selected block ids. Order is insignificant except that `copy` takes the
/// first entry.
pub type Selection = SmallVec<[BlockId; 4]>;

/// Blocks, selection, viewport and history. Persisted and restored whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasState {
    pub blocks: BlockSeq,
    pub selected_ids: Selection,
    pub viewport: Viewport,
    pub history: History,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            blocks: empty_seq(),
            selected_ids: Selection::new(),
            viewport: Viewport::default(),
            history: History::default(),
        }
    }
}

impl CanvasState {
    pub fn block(&self, id: BlockId) -> Option<&Arc<Block>> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.block(id).is_some()
    }

    pub fn is_selected(&self, id: BlockId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Selected blocks in sequence order.
    pub fn selected_blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.iter().filter(|b| self.is_selected(b.id))
    }
}
