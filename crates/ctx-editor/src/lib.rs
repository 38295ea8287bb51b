pub mod autosave;
pub mod history;
pub mod persist;
pub mod shortcuts;
pub mod state;
pub mod store;

pub use autosave::{Autosave, AutosaveConfig, Saved};
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use persist::{
    FileStorage, MemoryStorage, PersistError, PersistedData, SnapshotFormat, StateStorage,
    restore_store,
};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use state::{CanvasState, Selection};
pub use store::{BlockMutation, BlockStore, StoreConfig, SubscriptionId};
