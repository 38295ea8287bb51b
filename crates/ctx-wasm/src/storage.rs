//! `window.localStorage` backend for the persistence layer.
//!
//! Canvas and AI configuration are stored as JSON strings under
//! `ai-context-canvas/…` keys. Any JS exception is reported as an I/O
//! error so the autosave driver can retry on its next tick.

use ctx_core::ai::AiConfig;
use ctx_core::export::ExportCounter;
use ctx_editor::persist::{PersistError, SnapshotFormat, StateStorage, decode_canvas, encode_canvas};
use ctx_editor::state::CanvasState;
use std::io;
use wasm_bindgen::JsValue;

const CANVAS_KEY: &str = "ai-context-canvas/canvas_state";
const AI_CONFIG_KEY: &str = "ai-context-canvas/ai_config";
const EXPORT_COUNTER_KEY: &str = "ai-context-canvas/export_counter";

pub struct LocalStorage {
    storage: web_sys::Storage,
}

fn js_error(context: &str, err: JsValue) -> PersistError {
    PersistError::Io(io::Error::other(format!("{context}: {err:?}")))
}

impl LocalStorage {
    /// The page's local storage, or `None` outside a browser window or when
    /// storage is disabled.
    #[cfg(target_arch = "wasm32")]
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }

    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("localStorage.getItem", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("localStorage.setItem", e))
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("localStorage.removeItem", e))
    }

    pub fn load_export_counter(&self) -> ExportCounter {
        match self.get(EXPORT_COUNTER_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("discarding unreadable export counter: {e}");
                ExportCounter::default()
            }),
            Ok(None) => ExportCounter::default(),
            Err(e) => {
                log::warn!("{e}");
                ExportCounter::default()
            }
        }
    }

    pub fn save_export_counter(&self, counter: &ExportCounter) -> Result<(), PersistError> {
        self.set(EXPORT_COUNTER_KEY, &serde_json::to_string(counter)?)
    }
}

impl StateStorage for LocalStorage {
    fn save_canvas(&mut self, canvas: &CanvasState) -> Result<(), PersistError> {
        let bytes = encode_canvas(canvas, SnapshotFormat::Json)?;
        let json = String::from_utf8_lossy(&bytes);
        self.set(CANVAS_KEY, &json)
    }

    fn load_canvas(&self) -> Result<Option<CanvasState>, PersistError> {
        self.get(CANVAS_KEY)?
            .map(|json| decode_canvas(json.as_bytes(), SnapshotFormat::Json))
            .transpose()
    }

    fn save_ai_config(&mut self, config: &AiConfig) -> Result<(), PersistError> {
        self.set(AI_CONFIG_KEY, &serde_json::to_string(config)?)
    }

    fn load_ai_config(&self) -> Result<Option<AiConfig>, PersistError> {
        Ok(self
            .get(AI_CONFIG_KEY)?
            .map(|json| serde_json::from_str(&json))
            .transpose()?)
    }

    fn clear_all(&mut self) -> Result<(), PersistError> {
        self.remove(CANVAS_KEY)?;
        self.remove(AI_CONFIG_KEY)
    }
}
