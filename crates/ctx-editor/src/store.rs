//! The block store: sole owner and mutator of the canvas state.
//!
//! Every structural change goes through [`BlockStore::apply`], which builds
//! the new block sequence, records the previous one in the history ledger,
//! swaps the new one in, and only then notifies subscribers. Subscribers
//! therefore never observe a sequence whose history step is missing.
//!
//! Selection, viewport, clipboard slot, grid flag and AI configuration are
//! plain state: they notify (where rendered) but are never undoable.
//!
//! Nothing here fails. Operations naming unknown ids are accepted as no-ops
//! and leave a `debug` log line behind.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::state::{CanvasState, Selection};
use ctx_core::ai::{AiConfig, AiConfigPatch};
use ctx_core::clock::{Clock, Millis, SystemClock};
use ctx_core::id::BlockId;
use ctx_core::ingest::DEFAULT_PASTE_POSITION;
use ctx_core::model::*;
use ctx_core::order::chronological;
use std::collections::HashSet;
use std::sync::Arc;

// ─── Config ───────────────────────────────────────────────────────────────

/// Construction-time settings for a [`BlockStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Maximum undo depth. Default: **50**.
    pub history_limit: usize,
    /// Offset applied to a pasted copy relative to the original.
    /// Default: **(+20, +20)**.
    pub paste_offset: Position,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            paste_offset: Position::new(20.0, 20.0),
        }
    }
}

// ─── Mutations ────────────────────────────────────────────────────────────

/// A structural change to the block sequence. Each one is one undo step.
#[derive(Debug, Clone)]
pub enum BlockMutation {
    AddBlock { block: Box<Block> },
    UpdateBlock { id: BlockId, patch: Box<BlockPatch> },
    DeleteBlocks { ids: Vec<BlockId> },
    MoveBlocks { ids: Vec<BlockId>, dx: f64, dy: f64 },
    ClearCanvas,
    ReorderBlocks { blocks: BlockSeq },
    AutoLayout,
}

impl BlockMutation {
    pub fn description(&self) -> &'static str {
        match self {
            BlockMutation::AddBlock { .. } => "add block",
            BlockMutation::UpdateBlock { .. } => "edit block",
            BlockMutation::DeleteBlocks { .. } => "delete blocks",
            BlockMutation::MoveBlocks { .. } => "move blocks",
            BlockMutation::ClearCanvas => "clear canvas",
            BlockMutation::ReorderBlocks { .. } => "reorder blocks",
            BlockMutation::AutoLayout => "auto layout",
        }
    }
}

// ─── Subscriptions ────────────────────────────────────────────────────────

/// Handle returned by [`BlockStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&CanvasState)>;

// ─── Store ────────────────────────────────────────────────────────────────

pub struct BlockStore {
    state: CanvasState,
    /// Single most-recently-copied block.
    clipboard: Option<Arc<Block>>,
    ai_config: AiConfig,
    /// Grid mode (`true`) or free-form mode.
    show_grid: bool,
    /// Last click on the free-form surface; pastes land here.
    click_position: Option<Position>,
    config: StoreConfig,
    clock: Box<dyn Clock>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    /// Bumped on every change subscribers are told about.
    revision: u64,
    /// Bumped on every AI configuration change.
    ai_revision: u64,
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl BlockStore {
    /// A store reading time from the system clock.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: StoreConfig, clock: impl Clock + 'static) -> Self {
        Self {
            state: CanvasState::default(),
            clipboard: None,
            ai_config: AiConfig::default(),
            show_grid: true,
            click_position: None,
            config,
            clock: Box::new(clock),
            subscribers: Vec::new(),
            next_subscription: 0,
            revision: 0,
            ai_revision: 0,
        }
    }

    // ─── Structural mutations (undoable) ─────────────────────────────────

    /// Apply one structural mutation and record it as an undo step.
    ///
    /// Returns `false` only when the mutation was refused outright (a
    /// duplicate id, or auto-layout of an empty canvas); in that case no
    /// history is recorded and subscribers are not notified. Mutations that
    /// match nothing still record a step.
    pub fn apply(&mut self, mutation: BlockMutation) -> bool {
        let now = self.clock.now_ms();
        let current = &self.state.blocks;

        let next: BlockSeq = match mutation {
            BlockMutation::AddBlock { block } => {
                if self.state.contains(block.id) {
                    log::debug!("add_block: id {} already on the canvas; ignored", block.id);
                    return false;
                }
                current
                    .iter()
                    .cloned()
                    .chain(std::iter::once(Arc::new(*block)))
                    .collect()
            }
            BlockMutation::UpdateBlock { id, patch } => {
                let mut found = false;
                let next = current
                    .iter()
                    .map(|b| {
                        if b.id != id {
                            return Arc::clone(b);
                        }
                        found = true;
                        let mut updated = Block::clone(b);
                        if !updated.apply_patch(&patch, now) {
                            log::debug!(
                                "update_block: dropped fields not valid for {} block {id}",
                                updated.kind.type_name()
                            );
                        }
                        Arc::new(updated)
                    })
                    .collect();
                if !found {
                    log::debug!("update_block: no block {id}");
                }
                next
            }
            BlockMutation::DeleteBlocks { ids } => {
                let doomed: HashSet<BlockId> = ids.into_iter().collect();
                self.state.selected_ids.retain(|id| !doomed.contains(id));
                current
                    .iter()
                    .filter(|b| !doomed.contains(&b.id))
                    .cloned()
                    .collect()
            }
            BlockMutation::MoveBlocks { ids, dx, dy } => {
                let moving: HashSet<BlockId> = ids.into_iter().collect();
                current
                    .iter()
                    .map(|b| {
                        if !moving.contains(&b.id) {
                            return Arc::clone(b);
                        }
                        let mut moved = Block::clone(b);
                        moved.position = moved.position.offset(dx, dy);
                        moved.updated_at = now;
                        Arc::new(moved)
                    })
                    .collect()
            }
            BlockMutation::ClearCanvas => {
                self.state.selected_ids.clear();
                empty_seq()
            }
            BlockMutation::ReorderBlocks { blocks } => {
                let mut seen = HashSet::with_capacity(blocks.len());
                if blocks.iter().all(|b| seen.insert(b.id)) {
                    blocks
                } else {
                    log::debug!("reorder_blocks: duplicate ids in new order; keeping first of each");
                    let mut seen = HashSet::with_capacity(blocks.len());
                    blocks.iter().filter(|b| seen.insert(b.id)).cloned().collect()
                }
            }
            BlockMutation::AutoLayout => {
                if current.is_empty() {
                    return false;
                }
                chronological(current).into()
            }
        };

        let before = std::mem::replace(&mut self.state.blocks, next);
        self.state
            .history
            .record(before, self.config.history_limit);
        self.changed();
        true
    }

    /// Append a block. A block whose id is already present is ignored.
    pub fn add_block(&mut self, block: Block) -> bool {
        self.apply(BlockMutation::AddBlock {
            block: Box::new(block),
        })
    }

    /// Shallow-merge `patch` into block `id` and refresh its `updated_at`.
    pub fn update_block(&mut self, id: BlockId, patch: BlockPatch) -> bool {
        self.apply(BlockMutation::UpdateBlock {
            id,
            patch: Box::new(patch),
        })
    }

    /// Remove every block in `ids`, and drop them from the selection.
    pub fn delete_blocks(&mut self, ids: &[BlockId]) -> bool {
        self.apply(BlockMutation::DeleteBlocks { ids: ids.to_vec() })
    }

    /// Delete whatever is currently selected. With nothing selected this
    /// is a no-op: no undo step, and the redo branch survives.
    pub fn delete_selected(&mut self) -> bool {
        if self.state.selected_ids.is_empty() {
            return false;
        }
        let ids = self.state.selected_ids.to_vec();
        self.apply(BlockMutation::DeleteBlocks { ids })
    }

    /// Translate the selection by `delta`. No-op when nothing is selected.
    pub fn move_selected(&mut self, delta: Position) -> bool {
        if self.state.selected_ids.is_empty() {
            return false;
        }
        let ids = self.state.selected_ids.to_vec();
        self.move_blocks(&ids, delta)
    }

    /// Translate every block in `ids` by `delta`.
    pub fn move_blocks(&mut self, ids: &[BlockId], delta: Position) -> bool {
        self.apply(BlockMutation::MoveBlocks {
            ids: ids.to_vec(),
            dx: delta.x,
            dy: delta.y,
        })
    }

    /// Remove all blocks and clear the selection.
    pub fn clear_canvas(&mut self) -> bool {
        self.apply(BlockMutation::ClearCanvas)
    }

    /// Replace the block sequence with `blocks` as given (grid-mode drag).
    pub fn reorder_blocks(&mut self, blocks: impl IntoIterator<Item = Arc<Block>>) -> bool {
        self.apply(BlockMutation::ReorderBlocks {
            blocks: blocks.into_iter().collect(),
        })
    }

    /// Move block `id` to `index` in the sequence, shifting the rest.
    /// `index` past the end moves it to the end. Returns `false` if `id`
    /// is not on the canvas.
    pub fn move_block_to(&mut self, id: BlockId, index: usize) -> bool {
        let Some(from) = self.state.blocks.iter().position(|b| b.id == id) else {
            log::debug!("move_block_to: no block {id}");
            return false;
        };
        let mut order = self.state.blocks.to_vec();
        let block = order.remove(from);
        order.insert(index.min(order.len()), block);
        self.reorder_blocks(order)
    }

    /// Order blocks by creation time. Positions are untouched.
    pub fn auto_layout(&mut self) -> bool {
        self.apply(BlockMutation::AutoLayout)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let undone = self.state.history.undo(&mut self.state.blocks);
        if undone {
            self.changed();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self
            .state
            .history
            .redo(&mut self.state.blocks, self.config.history_limit);
        if redone {
            self.changed();
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.state.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.history.can_redo()
    }

    /// Group subsequent mutations into one undo step until the matching
    /// [`end_batch`](Self::end_batch).
    pub fn begin_batch(&mut self) {
        self.state.history.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.state.history.end_batch();
    }

    // ─── Selection & viewport (not undoable) ─────────────────────────────

    /// Replace the selection wholesale. Ids are not checked.
    pub fn select_blocks(&mut self, ids: impl IntoIterator<Item = BlockId>) {
        self.state.selected_ids = ids.into_iter().collect();
        self.changed();
    }

    pub fn select_all(&mut self) {
        let ids: Selection = self.state.blocks.iter().map(|b| b.id).collect();
        self.state.selected_ids = ids;
        self.changed();
    }

    pub fn set_viewport(&mut self, patch: ViewportPatch) {
        self.state.viewport.merge(patch);
        self.changed();
    }

    /// One zoom step around a screen-space pointer.
    pub fn zoom_at(&mut self, pointer: Position, zoom_in: bool) {
        let patch = self.state.viewport.zoom_at(pointer, zoom_in);
        self.set_viewport(patch);
    }

    // ─── Clipboard slot ──────────────────────────────────────────────────

    /// Hold the first selected block (by selection order) in the clipboard
    /// slot. Only one block is ever held.
    pub fn copy(&mut self) -> bool {
        let first = self
            .state
            .selected_ids
            .iter()
            .find_map(|id| self.state.block(*id))
            .cloned();
        match first {
            Some(block) => {
                if self.state.selected_ids.len() > 1 {
                    log::debug!(
                        "copy: {} blocks selected; holding only {}",
                        self.state.selected_ids.len(),
                        block.id
                    );
                }
                self.clipboard = Some(block);
                true
            }
            None => false,
        }
    }

    /// `copy` followed by deleting the selection.
    pub fn cut(&mut self) -> bool {
        let copied = self.copy();
        let deleted = self.delete_selected();
        copied || deleted
    }

    /// Insert a copy of the held block with a fresh id, offset from the
    /// original. Returns the new id, or `None` if the slot is empty.
    pub fn paste(&mut self) -> Option<BlockId> {
        let held = self.clipboard.clone()?;
        let now = self.clock.now_ms();

        let mut id = BlockId::generate(now);
        while self.state.contains(id) {
            id = BlockId::generate(now);
        }

        let mut block = Block::clone(&held);
        block.id = id;
        block.position = held
            .position
            .offset(self.config.paste_offset.x, self.config.paste_offset.y);
        block.created_at = now;
        block.updated_at = now;

        self.add_block(block).then_some(id)
    }

    pub fn clipboard(&self) -> Option<&Arc<Block>> {
        self.clipboard.as_ref()
    }

    // ─── Auxiliary state ─────────────────────────────────────────────────

    pub fn ai_config(&self) -> &AiConfig {
        &self.ai_config
    }

    pub fn update_ai_config(&mut self, patch: AiConfigPatch) {
        self.ai_config.merge(patch);
        self.ai_revision += 1;
    }

    /// Replace the AI configuration wholesale (persistence seed).
    pub fn set_ai_config(&mut self, config: AiConfig) {
        self.ai_config = config;
        self.ai_revision += 1;
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn set_show_grid(&mut self, show: bool) {
        if self.show_grid != show {
            self.show_grid = show;
            self.changed();
        }
    }

    pub fn click_position(&self) -> Option<Position> {
        self.click_position
    }

    pub fn set_click_position(&mut self, position: Option<Position>) {
        self.click_position = position;
    }

    /// Where an externally pasted block should land.
    pub fn paste_position(&self) -> Position {
        self.click_position.unwrap_or(DEFAULT_PASTE_POSITION)
    }

    /// Replace the whole canvas state (persistence seed). Bypasses history.
    pub fn restore(&mut self, state: CanvasState) {
        self.state = state;
        self.changed();
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    /// Register a callback run synchronously after every visible change.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CanvasState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn changed(&mut self) {
        self.revision += 1;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn blocks(&self) -> &BlockSeq {
        &self.state.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Arc<Block>> {
        self.state.block(id)
    }

    pub fn selected_ids(&self) -> &[BlockId] {
        &self.state.selected_ids
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn now_ms(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ai_revision(&self) -> u64 {
        self.ai_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctx_core::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn text(id: &str, x: f64, y: f64, created_at: Millis) -> Block {
        Block::new(
            BlockId::intern(id),
            BlockKind::text(id),
            Position::new(x, y),
            Size::new(300.0, 100.0),
            created_at,
        )
    }

    fn store() -> (BlockStore, ManualClock) {
        let clock = ManualClock::new(10_000);
        (BlockStore::with_clock(StoreConfig::default(), clock.clone()), clock)
    }

    fn ids(store: &BlockStore) -> Vec<&str> {
        store.blocks().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn add_appends_and_records() {
        let (mut store, _) = store();
        assert!(store.add_block(text("u-a", 0.0, 0.0, 1)));
        assert!(store.add_block(text("u-b", 0.0, 0.0, 2)));
        assert_eq!(ids(&store), vec!["u-a", "u-b"]);
        assert_eq!(store.state().history.past.len(), 2);
    }

    #[test]
    fn duplicate_add_is_refused() {
        let (mut store, _) = store();
        store.add_block(text("u-dup", 0.0, 0.0, 1));
        assert!(!store.add_block(text("u-dup", 5.0, 5.0, 2)));
        assert_eq!(ids(&store), vec!["u-dup"]);
        assert_eq!(store.state().history.past.len(), 1);
    }

    #[test]
    fn update_overrides_updated_at() {
        let (mut store, clock) = store();
        store.add_block(text("u-up", 0.0, 0.0, 1));
        clock.set(55_000);
        let patch = BlockPatch {
            content: Some("changed".into()),
            updated_at: Some(3),
            ..BlockPatch::default()
        };
        store.update_block(BlockId::intern("u-up"), patch);
        let block = store.block(BlockId::intern("u-up")).unwrap();
        assert_eq!(block.text_content(), Some("changed"));
        assert_eq!(block.updated_at, 55_000);
        assert_eq!(block.created_at, 1);
    }

    #[test]
    fn update_unknown_id_still_records() {
        let (mut store, _) = store();
        store.add_block(text("u-known", 0.0, 0.0, 1));
        assert!(store.update_block(BlockId::intern("u-missing"), BlockPatch::content("x")));
        assert_eq!(store.state().history.past.len(), 2);
        assert_eq!(ids(&store), vec!["u-known"]);
    }

    #[test]
    fn delete_prunes_selection() {
        let (mut store, _) = store();
        store.add_block(text("u-d1", 0.0, 0.0, 1));
        store.add_block(text("u-d2", 0.0, 0.0, 2));
        store.select_blocks([BlockId::intern("u-d1"), BlockId::intern("u-d2")]);
        store.delete_blocks(&[BlockId::intern("u-d1"), BlockId::intern("u-nothing")]);
        assert_eq!(ids(&store), vec!["u-d2"]);
        assert_eq!(store.selected_ids(), &[BlockId::intern("u-d2")]);
    }

    #[test]
    fn move_offsets_and_stamps() {
        let (mut store, clock) = store();
        store.add_block(text("u-mv", 0.0, 0.0, 1));
        clock.advance(500);
        store.move_blocks(&[BlockId::intern("u-mv")], Position::new(10.0, 20.0));
        let block = store.block(BlockId::intern("u-mv")).unwrap();
        assert_eq!(block.position, Position::new(10.0, 20.0));
        assert_eq!(block.updated_at, 10_500);
    }

    #[test]
    fn move_selected_needs_a_selection() {
        let (mut store, _) = store();
        store.add_block(text("u-ms", 0.0, 0.0, 1));
        assert!(!store.move_selected(Position::new(5.0, 5.0)));
        assert_eq!(store.state().history.past.len(), 1);

        store.select_blocks([BlockId::intern("u-ms")]);
        assert!(store.move_selected(Position::new(5.0, 5.0)));
        assert_eq!(
            store.block(BlockId::intern("u-ms")).unwrap().position,
            Position::new(5.0, 5.0)
        );
    }

    #[test]
    fn move_block_to_reorders() {
        let (mut store, _) = store();
        for id in ["u-r1", "u-r2", "u-r3"] {
            store.add_block(text(id, 0.0, 0.0, 1));
        }
        assert!(store.move_block_to(BlockId::intern("u-r3"), 0));
        assert_eq!(ids(&store), vec!["u-r3", "u-r1", "u-r2"]);
        assert!(store.move_block_to(BlockId::intern("u-r3"), 99));
        assert_eq!(ids(&store), vec!["u-r1", "u-r2", "u-r3"]);
        assert!(!store.move_block_to(BlockId::intern("u-r9"), 0));
    }

    #[test]
    fn reorder_drops_duplicate_ids() {
        let (mut store, _) = store();
        store.add_block(text("u-x", 0.0, 0.0, 1));
        let block = store.blocks()[0].clone();
        store.reorder_blocks([block.clone(), block]);
        assert_eq!(ids(&store), vec!["u-x"]);
    }

    #[test]
    fn auto_layout_on_empty_is_silent() {
        let (mut store, _) = store();
        assert!(!store.auto_layout());
        assert!(!store.can_undo());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn copy_uses_selection_order() {
        let (mut store, _) = store();
        store.add_block(text("u-c1", 0.0, 0.0, 1));
        store.add_block(text("u-c2", 0.0, 0.0, 2));
        store.select_blocks([BlockId::intern("u-c2"), BlockId::intern("u-c1")]);
        assert!(store.copy());
        assert_eq!(store.clipboard().unwrap().id, BlockId::intern("u-c2"));
    }

    #[test]
    fn copy_skips_stale_selection() {
        let (mut store, _) = store();
        store.add_block(text("u-live", 0.0, 0.0, 1));
        store.select_blocks([BlockId::intern("u-gone"), BlockId::intern("u-live")]);
        assert!(store.copy());
        assert_eq!(store.clipboard().unwrap().id, BlockId::intern("u-live"));
    }

    #[test]
    fn cut_holds_and_removes() {
        let (mut store, _) = store();
        store.add_block(text("u-cut", 3.0, 4.0, 1));
        store.select_blocks([BlockId::intern("u-cut")]);
        assert!(store.cut());
        assert!(store.blocks().is_empty());
        assert!(store.selected_ids().is_empty());
        let pasted = store.paste().unwrap();
        assert_eq!(
            store.block(pasted).unwrap().position,
            Position::new(23.0, 24.0)
        );
    }

    #[test]
    fn paste_with_empty_slot_is_noop() {
        let (mut store, _) = store();
        assert_eq!(store.paste(), None);
        assert!(!store.can_undo());
    }

    #[test]
    fn paste_refreshes_timestamps() {
        let (mut store, clock) = store();
        store.add_block(text("u-p", 0.0, 0.0, 1));
        store.select_blocks([BlockId::intern("u-p")]);
        store.copy();
        clock.set(77_000);
        let id = store.paste().unwrap();
        let pasted = store.block(id).unwrap();
        assert_eq!(pasted.created_at, 77_000);
        assert_eq!(pasted.updated_at, 77_000);
        assert_eq!(pasted.text_content(), Some("u-p"));
    }

    #[test]
    fn subscribers_see_every_visible_change() {
        let (mut store, _) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |state| sink.borrow_mut().push(state.blocks.len()));

        store.add_block(text("u-s1", 0.0, 0.0, 1));
        store.select_blocks([BlockId::intern("u-s1")]);
        store.set_viewport(ViewportPatch {
            x: Some(5.0),
            ..ViewportPatch::default()
        });
        store.undo();
        assert_eq!(*seen.borrow(), vec![1, 1, 1, 0]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.redo();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn ai_config_changes_bump_their_own_revision() {
        let (mut store, _) = store();
        store.update_ai_config(AiConfigPatch {
            system_prompt: Some("short".into()),
            ..AiConfigPatch::default()
        });
        assert_eq!(store.ai_config().system_prompt, "short");
        assert_eq!(store.ai_revision(), 1);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn paste_position_defaults_until_clicked() {
        let (mut store, _) = store();
        assert_eq!(store.paste_position(), DEFAULT_PASTE_POSITION);
        store.set_click_position(Some(Position::new(7.0, 8.0)));
        assert_eq!(store.paste_position(), Position::new(7.0, 8.0));
    }
}
