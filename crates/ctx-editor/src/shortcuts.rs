//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, and applies
//! those actions to a [`BlockStore`]. The map lives in Rust so the browser
//! bridge and native hosts share it.

use crate::store::BlockStore;
use ctx_core::model::{Position, ViewportPatch};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    Delete,
    SelectAll,
    Deselect,
    AutoLayout,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleGrid,
}

impl ShortcutAction {
    /// Stable name used across the browser bridge.
    pub fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Delete => "delete",
            Self::SelectAll => "selectAll",
            Self::Deselect => "deselect",
            Self::AutoLayout => "autoLayout",
            Self::ZoomIn => "zoomIn",
            Self::ZoomOut => "zoomOut",
            Self::ResetView => "resetView",
            Self::ToggleGrid => "toggleGrid",
        }
    }

    /// Perform the action on `store`. Returns whether anything changed.
    ///
    /// Keyboard zoom anchors at the canvas origin.
    pub fn apply(self, store: &mut BlockStore) -> bool {
        match self {
            Self::Undo => store.undo(),
            Self::Redo => store.redo(),
            Self::Copy => store.copy(),
            Self::Cut => store.cut(),
            Self::Paste => store.paste().is_some(),
            Self::Delete => store.delete_selected(),
            Self::SelectAll => {
                store.select_all();
                true
            }
            Self::Deselect => {
                let had_selection = !store.selected_ids().is_empty();
                store.select_blocks([]);
                had_selection
            }
            Self::AutoLayout => store.auto_layout(),
            Self::ZoomIn | Self::ZoomOut => {
                store.zoom_at(Position::default(), self == Self::ZoomIn);
                true
            }
            Self::ResetView => {
                store.set_viewport(ViewportPatch {
                    x: Some(0.0),
                    y: Some(0.0),
                    scale: Some(1.0),
                });
                true
            }
            Self::ToggleGrid => {
                let show = !store.show_grid();
                store.set_show_grid(show);
                true
            }
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if alt {
            return None;
        }

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                "l" | "L" => Some(ShortcutAction::AutoLayout),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetView),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "g" | "G" => Some(ShortcutAction::ToggleGrid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctx_core::clock::ManualClock;
    use ctx_core::id::BlockId;
    use ctx_core::model::{Block, BlockKind, Size};
    use crate::store::StoreConfig;

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Cmd+Shift+Z → Redo (browsers report an upper-case key)
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, false, true),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn resolve_clipboard() {
        assert_eq!(
            ShortcutMap::resolve("c", false, false, false, true),
            Some(ShortcutAction::Copy)
        );
        assert_eq!(
            ShortcutMap::resolve("x", false, false, false, true),
            Some(ShortcutAction::Cut)
        );
        assert_eq!(
            ShortcutMap::resolve("v", true, false, false, false),
            Some(ShortcutAction::Paste)
        );
    }

    #[test]
    fn resolve_delete_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn resolve_view() {
        assert_eq!(
            ShortcutMap::resolve("=", false, false, false, true),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", true, false, false, false),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", false, false, false, true),
            Some(ShortcutAction::ResetView)
        );
        assert_eq!(
            ShortcutMap::resolve("g", false, false, false, false),
            Some(ShortcutAction::ToggleGrid)
        );
        assert_eq!(
            ShortcutMap::resolve("l", false, false, false, true),
            Some(ShortcutAction::AutoLayout)
        );
    }

    #[test]
    fn resolve_unbound() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("z", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("z", false, false, true, true), None);
        assert_eq!(ShortcutMap::resolve("G", false, true, false, false), None);
    }

    #[test]
    fn apply_edits_store() {
        let mut store = BlockStore::with_clock(StoreConfig::default(), ManualClock::new(1));
        store.add_block(Block::new(
            BlockId::intern("kb-1"),
            BlockKind::text("k"),
            Position::default(),
            Size::new(300.0, 100.0),
            1,
        ));

        assert!(ShortcutAction::SelectAll.apply(&mut store));
        assert!(ShortcutAction::Delete.apply(&mut store));
        assert!(store.blocks().is_empty());
        assert!(!ShortcutAction::Deselect.apply(&mut store));

        assert!(ShortcutAction::Undo.apply(&mut store));
        assert_eq!(store.blocks().len(), 1);

        assert!(ShortcutAction::ToggleGrid.apply(&mut store));
        assert!(!store.show_grid());

        ShortcutAction::ZoomIn.apply(&mut store);
        assert!(store.viewport().scale > 1.0);
        ShortcutAction::ResetView.apply(&mut store);
        assert_eq!(store.viewport().scale, 1.0);
    }

    #[test]
    fn delete_without_selection_changes_nothing() {
        let mut store = BlockStore::with_clock(StoreConfig::default(), ManualClock::new(1));
        store.add_block(Block::new(
            BlockId::intern("kb-keep"),
            BlockKind::text("k"),
            Position::default(),
            Size::new(300.0, 100.0),
            1,
        ));
        let revision = store.revision();

        assert!(!ShortcutAction::Delete.apply(&mut store));
        assert_eq!(store.blocks().len(), 1);
        assert_eq!(store.state().history.past.len(), 1);
        assert_eq!(store.revision(), revision);
    }
}
