//! Durable storage for canvas state and AI configuration.
//!
//! The persisted canvas carries all of [`CanvasState`], history included,
//! so undo survives a reload. Blocks are written once each into a table and
//! the current sequence and every history snapshot refer to them by index,
//! so a snapshot that shares a block with its neighbours costs an index,
//! not another copy of an image payload. Backends implement
//! [`StateStorage`]; the store itself never touches storage.

use crate::history::History;
use crate::state::{CanvasState, Selection};
use crate::store::BlockStore;
use ctx_core::ai::AiConfig;
use ctx_core::clock::Millis;
use ctx_core::id::BlockId;
use ctx_core::model::{Block, BlockSeq, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("MessagePack encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("MessagePack decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("corrupt canvas snapshot: {0}")]
    Corrupt(String),
}

// ─── Codec ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    /// Human-readable; the shape the browser UI reads and writes.
    Json,
    /// Compact binary with named fields. Default for file storage.
    #[default]
    MessagePack,
}

/// Encoding side of the block table. Borrows everything from the state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackedRef<'a> {
    table: Vec<&'a Block>,
    blocks: Vec<usize>,
    selected_ids: &'a Selection,
    viewport: &'a Viewport,
    past: Vec<Vec<usize>>,
    future: Vec<Vec<usize>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Packed {
    table: Vec<Block>,
    blocks: Vec<usize>,
    selected_ids: Selection,
    viewport: Viewport,
    past: Vec<Vec<usize>>,
    future: Vec<Vec<usize>>,
}

/// A saved canvas: the packed form, or a plain `CanvasState` as written
/// before blocks were tabled.
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Packed(Packed),
    Plain(CanvasState),
}

/// Assigns each distinct block one table slot. Blocks are the same when
/// they are the same allocation, or equal in value.
#[derive(Default)]
struct BlockTable<'a> {
    blocks: Vec<&'a Block>,
    by_ptr: HashMap<*const Block, usize>,
    by_version: HashMap<(BlockId, Millis), Vec<usize>>,
}

impl<'a> BlockTable<'a> {
    fn index(&mut self, block: &'a Arc<Block>) -> usize {
        let ptr = Arc::as_ptr(block);
        if let Some(&slot) = self.by_ptr.get(&ptr) {
            return slot;
        }
        let versions = self
            .by_version
            .entry((block.id, block.updated_at))
            .or_default();
        let slot = match versions
            .iter()
            .copied()
            .find(|&slot| self.blocks[slot] == &**block)
        {
            Some(slot) => slot,
            None => {
                let slot = self.blocks.len();
                self.blocks.push(&**block);
                versions.push(slot);
                slot
            }
        };
        self.by_ptr.insert(ptr, slot);
        slot
    }

    fn seq(&mut self, seq: &'a BlockSeq) -> Vec<usize> {
        seq.iter().map(|block| self.index(block)).collect()
    }
}

impl<'a> PackedRef<'a> {
    fn new(state: &'a CanvasState) -> Self {
        let mut table = BlockTable::default();
        let blocks = table.seq(&state.blocks);
        let past = state.history.past.iter().map(|s| table.seq(s)).collect();
        let future = state.history.future.iter().map(|s| table.seq(s)).collect();
        Self {
            table: table.blocks,
            blocks,
            selected_ids: &state.selected_ids,
            viewport: &state.viewport,
            past,
            future,
        }
    }
}

impl Packed {
    /// Rebuild the state, sharing one `Arc` per table entry.
    fn into_state(self) -> Result<CanvasState, PersistError> {
        let table: Vec<Arc<Block>> = self.table.into_iter().map(Arc::new).collect();
        let seq = |indices: Vec<usize>| -> Result<BlockSeq, PersistError> {
            indices
                .into_iter()
                .map(|slot| {
                    table.get(slot).cloned().ok_or_else(|| {
                        PersistError::Corrupt(format!(
                            "block index {slot} out of range ({} blocks)",
                            table.len()
                        ))
                    })
                })
                .collect()
        };

        let mut history = History::new();
        history.past = self.past.into_iter().map(&seq).collect::<Result<_, _>>()?;
        history.future = self.future.into_iter().map(&seq).collect::<Result<_, _>>()?;

        Ok(CanvasState {
            blocks: seq(self.blocks)?,
            selected_ids: self.selected_ids,
            viewport: self.viewport,
            history,
        })
    }
}

pub fn encode_canvas(state: &CanvasState, format: SnapshotFormat) -> Result<Vec<u8>, PersistError> {
    let packed = PackedRef::new(state);
    Ok(match format {
        SnapshotFormat::Json => serde_json::to_vec(&packed)?,
        SnapshotFormat::MessagePack => rmp_serde::to_vec_named(&packed)?,
    })
}

pub fn decode_canvas(bytes: &[u8], format: SnapshotFormat) -> Result<CanvasState, PersistError> {
    let stored: Stored = match format {
        SnapshotFormat::Json => serde_json::from_slice(bytes)?,
        SnapshotFormat::MessagePack => rmp_serde::from_slice(bytes)?,
    };
    match stored {
        Stored::Packed(packed) => packed.into_state(),
        Stored::Plain(state) => Ok(state),
    }
}

/// Everything the application saves, in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedData {
    pub canvas: CanvasState,
    pub ai_config: AiConfig,
    pub last_saved: Millis,
}

impl PersistedData {
    pub fn capture(store: &BlockStore) -> Self {
        Self {
            canvas: store.state().clone(),
            ai_config: store.ai_config().clone(),
            last_saved: store.now_ms(),
        }
    }
}

// ─── Storage ──────────────────────────────────────────────────────────────

/// A place canvas state and AI configuration can be saved to and loaded
/// from. `load_*` returns `Ok(None)` when nothing has been saved yet.
pub trait StateStorage {
    fn save_canvas(&mut self, canvas: &CanvasState) -> Result<(), PersistError>;
    fn load_canvas(&self) -> Result<Option<CanvasState>, PersistError>;
    fn save_ai_config(&mut self, config: &AiConfig) -> Result<(), PersistError>;
    fn load_ai_config(&self) -> Result<Option<AiConfig>, PersistError>;
    fn clear_all(&mut self) -> Result<(), PersistError>;
}

/// In-memory storage holding encoded bytes, so a round trip exercises the
/// same codec as a real backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    format: SnapshotFormat,
    canvas: Option<Vec<u8>>,
    ai_config: Option<Vec<u8>>,
}

impl MemoryStorage {
    pub fn new(format: SnapshotFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Raw saved canvas bytes, if any.
    pub fn canvas_bytes(&self) -> Option<&[u8]> {
        self.canvas.as_deref()
    }
}

impl StateStorage for MemoryStorage {
    fn save_canvas(&mut self, canvas: &CanvasState) -> Result<(), PersistError> {
        self.canvas = Some(encode_canvas(canvas, self.format)?);
        Ok(())
    }

    fn load_canvas(&self) -> Result<Option<CanvasState>, PersistError> {
        self.canvas
            .as_deref()
            .map(|bytes| decode_canvas(bytes, self.format))
            .transpose()
    }

    fn save_ai_config(&mut self, config: &AiConfig) -> Result<(), PersistError> {
        self.ai_config = Some(serde_json::to_vec(config)?);
        Ok(())
    }

    fn load_ai_config(&self) -> Result<Option<AiConfig>, PersistError> {
        Ok(self
            .ai_config
            .as_deref()
            .map(serde_json::from_slice)
            .transpose()?)
    }

    fn clear_all(&mut self) -> Result<(), PersistError> {
        self.canvas = None;
        self.ai_config = None;
        Ok(())
    }
}

/// Directory-backed storage: `canvas_state.msgpack` (or `.json`) and
/// `ai_config.json`. Writes go to a temporary file first and are renamed
/// into place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    format: SnapshotFormat,
}

impl FileStorage {
    const AI_CONFIG_FILE: &'static str = "ai_config.json";

    pub fn new(dir: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn canvas_path(&self) -> PathBuf {
        match self.format {
            SnapshotFormat::Json => self.dir.join("canvas_state.json"),
            SnapshotFormat::MessagePack => self.dir.join("canvas_state.msgpack"),
        }
    }

    fn ai_config_path(&self) -> PathBuf {
        self.dir.join(Self::AI_CONFIG_FILE)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// `Ok(None)` for a missing file, the bytes otherwise.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, PersistError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_optional(path: &Path) -> Result<(), PersistError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

impl StateStorage for FileStorage {
    fn save_canvas(&mut self, canvas: &CanvasState) -> Result<(), PersistError> {
        let bytes = encode_canvas(canvas, self.format)?;
        self.write_atomic(&self.canvas_path(), &bytes)
    }

    fn load_canvas(&self) -> Result<Option<CanvasState>, PersistError> {
        read_optional(&self.canvas_path())?
            .map(|bytes| decode_canvas(&bytes, self.format))
            .transpose()
    }

    fn save_ai_config(&mut self, config: &AiConfig) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(config)?;
        self.write_atomic(&self.ai_config_path(), &bytes)
    }

    fn load_ai_config(&self) -> Result<Option<AiConfig>, PersistError> {
        Ok(read_optional(&self.ai_config_path())?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()?)
    }

    fn clear_all(&mut self) -> Result<(), PersistError> {
        remove_optional(&self.canvas_path())?;
        remove_optional(&self.ai_config_path())
    }
}

// ─── Startup ──────────────────────────────────────────────────────────────

/// What [`restore_store`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Restored {
    pub canvas: bool,
    pub ai_config: bool,
}

/// Seed `store` from `storage`. Unreadable data is logged and treated as
/// absent, leaving the store's defaults in place.
pub fn restore_store(storage: &dyn StateStorage, store: &mut BlockStore) -> Restored {
    let mut restored = Restored::default();

    match storage.load_canvas() {
        Ok(Some(canvas)) => {
            store.restore(canvas);
            restored.canvas = true;
        }
        Ok(None) => {}
        Err(e) => log::warn!("could not load saved canvas: {e}"),
    }

    match storage.load_ai_config() {
        Ok(Some(config)) => {
            store.set_ai_config(config);
            restored.ai_config = true;
        }
        Ok(None) => {}
        Err(e) => log::warn!("could not load saved AI configuration: {e}"),
    }

    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctx_core::id::BlockId;
    use ctx_core::model::{Block, BlockKind, Position, Size};

    fn populated() -> BlockStore {
        let mut store = BlockStore::default();
        store.add_block(Block::new(
            BlockId::intern("p-1"),
            BlockKind::text("saved"),
            Position::new(1.0, 2.0),
            Size::new(300.0, 100.0),
            5,
        ));
        store.add_block(Block::new(
            BlockId::intern("p-2"),
            BlockKind::image("data:image/png;base64,AAAA", "png"),
            Position::new(3.0, 4.0),
            Size::new(64.0, 64.0),
            6,
        ));
        store.select_blocks([BlockId::intern("p-2")]);
        store
    }

    fn assert_same(a: &CanvasState, b: &CanvasState) {
        let blocks = |s: &CanvasState| s.blocks.iter().map(|b| (**b).clone()).collect::<Vec<_>>();
        assert_eq!(blocks(a), blocks(b));
        assert_eq!(a.selected_ids, b.selected_ids);
        assert_eq!(a.viewport, b.viewport);
        assert_eq!(a.history.past.len(), b.history.past.len());
        assert_eq!(a.history.future.len(), b.history.future.len());
    }

    #[test]
    fn json_and_msgpack_round_trip() {
        let store = populated();
        for format in [SnapshotFormat::Json, SnapshotFormat::MessagePack] {
            let bytes = encode_canvas(store.state(), format).unwrap();
            let back = decode_canvas(&bytes, format).unwrap();
            assert_same(store.state(), &back);
        }
    }

    #[test]
    fn memory_storage_starts_empty_and_clears() {
        let mut storage = MemoryStorage::new(SnapshotFormat::Json);
        assert!(storage.load_canvas().unwrap().is_none());
        assert!(storage.load_ai_config().unwrap().is_none());

        let store = populated();
        storage.save_canvas(store.state()).unwrap();
        storage.save_ai_config(store.ai_config()).unwrap();
        assert!(storage.canvas_bytes().is_some());

        storage.clear_all().unwrap();
        assert!(storage.load_canvas().unwrap().is_none());
    }

    #[test]
    fn history_shares_block_payloads() {
        let mut store = BlockStore::default();
        let payload = format!("data:image/png;base64,{}", "A".repeat(200_000));
        store.add_block(Block::new(
            BlockId::intern("p-big"),
            BlockKind::image(payload, "png"),
            Position::default(),
            Size::new(400.0, 300.0),
            1,
        ));
        store.add_block(Block::new(
            BlockId::intern("p-note"),
            BlockKind::text("note"),
            Position::default(),
            Size::new(300.0, 100.0),
            2,
        ));
        for _ in 0..50 {
            store.move_blocks(&[BlockId::intern("p-note")], Position::new(1.0, 1.0));
        }

        for format in [SnapshotFormat::Json, SnapshotFormat::MessagePack] {
            let bytes = encode_canvas(store.state(), format).unwrap();
            assert!(bytes.len() < 300_000, "{format:?}: {} bytes", bytes.len());

            let back = decode_canvas(&bytes, format).unwrap();
            assert_same(store.state(), &back);
            let newest = back.history.past.back().unwrap();
            assert!(Arc::ptr_eq(&back.blocks[0], &newest[0]));
        }
    }

    #[test]
    fn plain_canvas_state_still_loads() {
        let store = populated();
        let bytes = serde_json::to_vec(store.state()).unwrap();
        let back = decode_canvas(&bytes, SnapshotFormat::Json).unwrap();
        assert_same(store.state(), &back);
    }

    #[test]
    fn dangling_table_index_is_reported() {
        let json = br#"{"table":[],"blocks":[3],"selectedIds":[],"viewport":{"x":0.0,"y":0.0,"scale":1.0},"past":[],"future":[]}"#;
        let err = decode_canvas(json, SnapshotFormat::Json).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt(_)), "{err}");
    }

    #[test]
    fn corrupt_canvas_is_reported() {
        let err = decode_canvas(b"{not json", SnapshotFormat::Json).unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
    }

    #[test]
    fn restore_keeps_history() {
        let mut storage = MemoryStorage::default();
        let original = populated();
        storage.save_canvas(original.state()).unwrap();

        let mut fresh = BlockStore::default();
        let restored = restore_store(&storage, &mut fresh);
        assert_eq!(
            restored,
            Restored {
                canvas: true,
                ai_config: false
            }
        );
        assert_eq!(fresh.blocks().len(), 2);
        assert!(fresh.undo());
        assert_eq!(fresh.blocks().len(), 1);
    }

    #[test]
    fn persisted_data_uses_camel_case() {
        let data = PersistedData::capture(&populated());
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("aiConfig").is_some());
        assert!(json.get("lastSaved").is_some());
        assert!(json["canvas"].get("selectedIds").is_some());
    }
}
