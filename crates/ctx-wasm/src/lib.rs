//! WASM bridge for the AI Context Canvas: exposes the block store to the
//! browser UI.
//!
//! Compiled via `wasm-pack build --target web`. Structured values cross the
//! boundary as JSON strings; failures come back as
//! `{"ok":false,"error":"…"}` or a `false` return, never as a panic.

mod storage;

use ctx_core::ai::{AiConfigPatch, SummaryRequest};
#[cfg(target_arch = "wasm32")]
use ctx_core::clock::Clock;
use ctx_core::clock::Millis;
use ctx_core::export::{ExportCounter, ExportFormat, ExportPlan, local_date};
use ctx_core::id::BlockId;
use ctx_core::ingest::{self, DropPlacer};
use ctx_core::model::{Block, BlockPatch, Position, Size, ViewportPatch};
use ctx_editor::autosave::{Autosave, AutosaveConfig};
use ctx_editor::persist::restore_store;
use ctx_editor::shortcuts::ShortcutMap;
use ctx_editor::state::CanvasState;
use ctx_editor::store::{BlockStore, StoreConfig, SubscriptionId};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use storage::LocalStorage;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Wall-clock time from the JS host (`Date.now()`).
#[cfg(target_arch = "wasm32")]
struct JsClock;

#[cfg(target_arch = "wasm32")]
impl Clock for JsClock {
    fn now_ms(&self) -> Millis {
        js_sys::Date::now() as Millis
    }
}

/// A dropped file as the UI hands it over after decoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DroppedFile {
    data_uri: String,
    width: f64,
    height: f64,
}

/// The main WASM-facing canvas controller.
///
/// Owns the block store and the autosave driver. All interaction from the
/// page goes through this struct.
#[wasm_bindgen]
pub struct ContextCanvas {
    store: BlockStore,
    autosave: Autosave,
    storage: Option<LocalStorage>,
    export_counter: ExportCounter,
    /// Live JS subscriptions, indexed by the handle given to JS.
    subscriptions: Vec<Option<SubscriptionId>>,
}

impl Default for ContextCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ContextCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self::with_store(new_store())
    }

    // ─── Persistence ────────────────────────────────────────────────────

    /// Seed the store from `localStorage`. Returns `true` if a saved canvas
    /// was found.
    pub fn load_saved(&mut self) -> bool {
        let Some(storage) = &self.storage else {
            return false;
        };
        let restored = restore_store(storage, &mut self.store);
        self.export_counter = storage.load_export_counter();
        self.autosave = Autosave::new(AutosaveConfig::default(), &self.store);
        restored.canvas
    }

    /// Drive the debounced autosave. Call from a timer; returns whether
    /// anything was written.
    pub fn tick(&mut self) -> bool {
        let Some(storage) = self.storage.as_mut() else {
            return false;
        };
        let now = self.store.now_ms();
        match self.autosave.poll(&self.store, storage, now) {
            Ok(saved) => saved.any(),
            Err(e) => {
                log::warn!("autosave failed: {e}");
                false
            }
        }
    }

    /// Write anything pending right away (page hide / unload).
    pub fn flush(&mut self) -> bool {
        let Some(storage) = self.storage.as_mut() else {
            return false;
        };
        match self.autosave.flush(&self.store, storage) {
            Ok(saved) => saved.any(),
            Err(e) => {
                log::warn!("flush failed: {e}");
                false
            }
        }
    }

    /// Replace the whole canvas state from JSON. Bypasses history.
    pub fn load_state_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<CanvasState>(json) {
            Ok(state) => {
                self.store.restore(state);
                true
            }
            Err(e) => {
                log::warn!("load_state_json: {e}");
                false
            }
        }
    }

    pub fn state_json(&self) -> String {
        to_json(self.store.state())
    }

    pub fn blocks_json(&self) -> String {
        to_json(self.store.blocks())
    }

    // ─── Adding content ─────────────────────────────────────────────────

    /// Add a fully-formed block. Refused if the id is already present.
    pub fn add_block_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Block>(json) {
            Ok(block) => self.store.add_block(block),
            Err(e) => {
                log::warn!("add_block_json: {e}");
                false
            }
        }
    }

    /// Add pasted text at the last click position.
    pub fn add_text(&mut self, content: &str) -> String {
        let now = self.store.now_ms();
        match ingest::text_block(content, self.store.paste_position(), now) {
            Some(block) => self.add_new(block),
            None => error_json("nothing to paste: text is empty"),
        }
    }

    /// Add a pasted image (data URI + decoded natural size) at the last
    /// click position.
    pub fn add_image(&mut self, data_uri: &str, width: f64, height: f64) -> String {
        let now = self.store.now_ms();
        let position = self.store.paste_position();
        match ingest::image_block(data_uri, Size::new(width, height), position, now) {
            Ok(block) => self.add_new(block),
            Err(e) => error_json(e),
        }
    }

    /// Add dropped files (`[{dataUri,width,height}]`), laid out in rows.
    /// The additions undo as one step. Returns the new ids.
    pub fn add_dropped_json(&mut self, json: &str) -> String {
        let files: Vec<DroppedFile> = match serde_json::from_str(json) {
            Ok(files) => files,
            Err(e) => return error_json(e),
        };
        let now = self.store.now_ms();
        let blocks = DropPlacer::new().place_images(
            files
                .iter()
                .map(|f| (f.data_uri.as_str(), Size::new(f.width, f.height))),
            now,
        );

        self.store.begin_batch();
        let ids: Vec<String> = blocks
            .into_iter()
            .filter_map(|block| {
                let id = block.id;
                self.store.add_block(block).then(|| id.to_string())
            })
            .collect();
        self.store.end_batch();
        json!({ "ok": true, "ids": ids }).to_string()
    }

    /// Remember where the user last clicked on the free-form surface.
    pub fn set_click_position(&mut self, x: f64, y: f64) {
        self.store.set_click_position(Some(Position::new(x, y)));
    }

    pub fn clear_click_position(&mut self) {
        self.store.set_click_position(None);
    }

    // ─── Editing ────────────────────────────────────────────────────────

    pub fn update_block_json(&mut self, id: &str, patch_json: &str) -> bool {
        match serde_json::from_str::<BlockPatch>(patch_json) {
            Ok(patch) => self.store.update_block(BlockId::intern(id), patch),
            Err(e) => {
                log::warn!("update_block_json: {e}");
                false
            }
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        self.store.delete_selected()
    }

    pub fn delete_blocks_json(&mut self, ids_json: &str) -> bool {
        match parse_ids(ids_json) {
            Some(ids) => self.store.delete_blocks(&ids),
            None => false,
        }
    }

    /// Replace the selection. Returns `false` on malformed input.
    pub fn select_json(&mut self, ids_json: &str) -> bool {
        match parse_ids(ids_json) {
            Some(ids) => {
                self.store.select_blocks(ids);
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.store.select_all();
    }

    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<&str> = self.store.selected_ids().iter().map(|id| id.as_str()).collect();
        to_json(&ids)
    }

    pub fn move_selected(&mut self, dx: f64, dy: f64) -> bool {
        self.store.move_selected(Position::new(dx, dy))
    }

    /// Start a drag gesture: moves until `end_gesture` undo as one step.
    pub fn begin_gesture(&mut self) {
        self.store.begin_batch();
    }

    pub fn end_gesture(&mut self) {
        self.store.end_batch();
    }

    pub fn clear(&mut self) -> bool {
        self.store.clear_canvas()
    }

    /// Reorder by id list (grid-mode drag). Unknown ids are skipped; blocks
    /// missing from the list are dropped from the sequence.
    pub fn reorder_json(&mut self, ids_json: &str) -> bool {
        let Some(ids) = parse_ids(ids_json) else {
            return false;
        };
        let blocks: Vec<Arc<Block>> = ids
            .iter()
            .filter_map(|id| self.store.block(*id).cloned())
            .collect();
        self.store.reorder_blocks(blocks)
    }

    pub fn move_block_to(&mut self, id: &str, index: usize) -> bool {
        self.store.move_block_to(BlockId::intern(id), index)
    }

    pub fn auto_layout(&mut self) -> bool {
        self.store.auto_layout()
    }

    // ─── View ───────────────────────────────────────────────────────────

    pub fn set_viewport_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<ViewportPatch>(json) {
            Ok(patch) => {
                self.store.set_viewport(patch);
                true
            }
            Err(e) => {
                log::warn!("set_viewport_json: {e}");
                false
            }
        }
    }

    /// Wheel zoom around a screen-space pointer.
    pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
        self.store.zoom_at(Position::new(x, y), zoom_in);
    }

    pub fn show_grid(&self) -> bool {
        self.store.show_grid()
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.store.set_show_grid(show);
    }

    // ─── Clipboard slot & history ───────────────────────────────────────

    pub fn copy(&mut self) -> bool {
        self.store.copy()
    }

    pub fn cut(&mut self) -> bool {
        self.store.cut()
    }

    /// Paste the held block. Returns the new id, or an empty string.
    pub fn paste(&mut self) -> String {
        self.store
            .paste()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Handle a key event. Returns `{"changed":bool,"action":"…"}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = action.apply(&mut self.store);
        json!({ "changed": changed, "action": action.name() }).to_string()
    }

    // ─── AI & export ────────────────────────────────────────────────────

    pub fn ai_config_json(&self) -> String {
        to_json(self.store.ai_config())
    }

    pub fn update_ai_config_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<AiConfigPatch>(json) {
            Ok(patch) => {
                self.store.update_ai_config(patch);
                true
            }
            Err(e) => {
                log::warn!("update_ai_config_json: {e}");
                false
            }
        }
    }

    /// The request the page should send to the selected provider.
    pub fn summary_request_json(&self) -> String {
        match SummaryRequest::build(self.store.blocks(), self.store.ai_config()) {
            Ok(request) => json!({ "ok": true, "request": request }).to_string(),
            Err(e) => error_json(e),
        }
    }

    /// Plan an export (`"pdf"` or `"word"`) and allocate its filename.
    pub fn export_plan_json(&mut self, format: &str) -> String {
        let format = match format {
            "pdf" => ExportFormat::Pdf,
            "word" | "docx" => ExportFormat::Word,
            other => return error_json(format!("unknown export format `{other}`")),
        };
        let plan = match ExportPlan::build(self.store.blocks(), format) {
            Ok(plan) => plan,
            Err(e) => return error_json(e),
        };

        let date = local_date(self.store.now_ms());
        let filename = self.export_counter.next_filename(format, date);
        if let Some(storage) = &self.storage
            && let Err(e) = storage.save_export_counter(&self.export_counter)
        {
            log::warn!("could not save export counter: {e}");
        }
        json!({ "ok": true, "filename": filename, "plan": plan }).to_string()
    }

    // ─── Subscriptions ──────────────────────────────────────────────────

    /// Call `callback(stateJson)` after every visible change. Returns a
    /// handle for `unsubscribe`.
    ///
    /// The call is queued as a microtask, so it runs once the current
    /// `ContextCanvas` method has returned and the callback is free to call
    /// back into the canvas. Each call carries the state as of its change.
    pub fn subscribe(&mut self, callback: js_sys::Function) -> usize {
        self.subscribe_with(move |state_json| {
            notify_later(&callback, &JsValue::from_str(&state_json));
        })
    }

    pub fn unsubscribe(&mut self, handle: usize) -> bool {
        match self.subscriptions.get_mut(handle).and_then(Option::take) {
            Some(id) => self.store.unsubscribe(id),
            None => false,
        }
    }
}

/// Run `callback(arg)` after the current call stack unwinds. Outside a
/// window (a worker without `Window`) the call is made immediately.
fn notify_later(callback: &js_sys::Function, arg: &JsValue) {
    let bound = callback.bind1(&JsValue::NULL, arg);
    match web_sys::window() {
        Some(window) => window.queue_microtask(bound.unchecked_ref()),
        None => {
            if let Err(e) = bound.call0(&JsValue::NULL) {
                log::warn!("subscriber threw: {e:?}");
            }
        }
    }
}

impl ContextCanvas {
    /// Register `deliver`, called with the state JSON captured at each
    /// change. `deliver` must not run its consumer synchronously.
    fn subscribe_with(&mut self, deliver: impl Fn(String) + 'static) -> usize {
        let id = self.store.subscribe(move |state| deliver(to_json(state)));
        self.subscriptions.push(Some(id));
        self.subscriptions.len() - 1
    }

    fn with_store(store: BlockStore) -> Self {
        let autosave = Autosave::new(AutosaveConfig::default(), &store);
        Self {
            store,
            autosave,
            storage: open_storage(),
            export_counter: ExportCounter::default(),
            subscriptions: Vec::new(),
        }
    }

    fn add_new(&mut self, block: Block) -> String {
        let id = block.id;
        if self.store.add_block(block) {
            json!({ "ok": true, "id": id.as_str() }).to_string()
        } else {
            error_json(format!("block {id} already exists"))
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn new_store() -> BlockStore {
    BlockStore::with_clock(StoreConfig::default(), JsClock)
}

#[cfg(not(target_arch = "wasm32"))]
fn new_store() -> BlockStore {
    BlockStore::new(StoreConfig::default())
}

#[cfg(target_arch = "wasm32")]
fn open_storage() -> Option<LocalStorage> {
    LocalStorage::open()
}

#[cfg(not(target_arch = "wasm32"))]
fn open_storage() -> Option<LocalStorage> {
    None
}

fn parse_ids(json: &str) -> Option<Vec<BlockId>> {
    match serde_json::from_str::<Vec<String>>(json) {
        Ok(ids) => Some(ids.iter().map(|id| BlockId::intern(id)).collect()),
        Err(e) => {
            log::warn!("expected a JSON array of ids: {e}");
            None
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(e))
}

fn error_json(err: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": err.to_string() }).to_string()
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Context canvas WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions ──────────────────────────────────────────────────

/// Resolve a key combo without a canvas (for menus and help overlays).
#[wasm_bindgen]
pub fn shortcut_for(key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
    ShortcutMap::resolve(key, ctrl, shift, alt, meta)
        .map(|action| action.name().to_string())
        .unwrap_or_default()
}

/// Filename the next export would get with the given day counter.
#[wasm_bindgen]
pub fn export_filename_for(format: &str, now_ms: f64, counter: u32) -> String {
    let format = if format == "pdf" {
        ExportFormat::Pdf
    } else {
        ExportFormat::Word
    };
    ctx_core::export::export_filename(format, local_date(now_ms as Millis), counter)
}
