//! Debounced autosave.
//!
//! Pull-based: the host calls [`Autosave::poll`] from its tick (a timer in
//! the browser, a loop natively). A change is written once the store has
//! stayed quiet for `delay_ms`; a burst of edits produces one write.
//!
//! A failed write (full storage quota, say) is retried with exponential
//! backoff from [`RETRY_BASE_MS`] up to [`RETRY_MAX_MS`].

use crate::persist::{PersistError, StateStorage};
use crate::store::BlockStore;
use ctx_core::clock::Millis;

/// Wait before the first retry after a failed write.
pub const RETRY_BASE_MS: Millis = 1_000;
/// Longest wait between retries.
pub const RETRY_MAX_MS: Millis = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period before a write. Default: **500 ms**.
    pub delay_ms: Millis,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { delay_ms: 500 }
    }
}

/// What a [`Autosave::poll`] call wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Saved {
    pub canvas: bool,
    pub ai_config: bool,
}

impl Saved {
    pub fn any(self) -> bool {
        self.canvas || self.ai_config
    }
}

/// Tracks which store revisions have reached storage.
#[derive(Debug, Clone)]
pub struct Autosave {
    config: AutosaveConfig,
    canvas: Pending,
    ai_config: Pending,
    /// Consecutive failed writes.
    failures: u32,
    /// No write is attempted before this time.
    retry_at: Millis,
}

fn retry_delay(failures: u32) -> Millis {
    let doublings = failures.saturating_sub(1).min(16);
    (RETRY_BASE_MS << doublings).min(RETRY_MAX_MS)
}

/// Debounce state for one saved document.
#[derive(Debug, Clone, Copy)]
struct Pending {
    saved_revision: u64,
    seen_revision: u64,
    /// When `seen_revision` was first observed.
    changed_at: Millis,
}

impl Pending {
    fn new(revision: u64) -> Self {
        Self {
            saved_revision: revision,
            seen_revision: revision,
            changed_at: 0,
        }
    }

    /// Observe `revision`; returns whether it is due for saving.
    fn observe(&mut self, revision: u64, now: Millis, delay: Millis) -> bool {
        if revision == self.saved_revision {
            return false;
        }
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.changed_at = now;
        }
        now - self.changed_at >= delay
    }
}

impl Autosave {
    /// Start tracking `store` as it is now: nothing is pending.
    pub fn new(config: AutosaveConfig, store: &BlockStore) -> Self {
        Self {
            config,
            canvas: Pending::new(store.revision()),
            ai_config: Pending::new(store.ai_revision()),
            failures: 0,
            retry_at: 0,
        }
    }

    /// When the next write may be attempted, if an earlier one failed.
    pub fn retry_at(&self) -> Option<Millis> {
        (self.failures > 0).then_some(self.retry_at)
    }

    /// Whether some change has not reached storage yet.
    pub fn is_dirty(&self, store: &BlockStore) -> bool {
        store.revision() != self.canvas.saved_revision
            || store.ai_revision() != self.ai_config.saved_revision
    }

    /// Write whatever has been quiet long enough.
    ///
    /// On error the revision stays pending and writes pause until
    /// [`retry_at`](Self::retry_at); each further failure doubles the wait.
    pub fn poll(
        &mut self,
        store: &BlockStore,
        storage: &mut dyn StateStorage,
        now: Millis,
    ) -> Result<Saved, PersistError> {
        if self.failures > 0 && now < self.retry_at {
            return Ok(Saved::default());
        }
        match self.write_due(store, storage, now) {
            Ok(saved) => {
                self.failures = 0;
                Ok(saved)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                self.retry_at = now + retry_delay(self.failures);
                log::debug!(
                    "autosave: write failed {} time(s); next attempt at {}",
                    self.failures,
                    self.retry_at
                );
                Err(e)
            }
        }
    }

    fn write_due(
        &mut self,
        store: &BlockStore,
        storage: &mut dyn StateStorage,
        now: Millis,
    ) -> Result<Saved, PersistError> {
        let delay = self.config.delay_ms;
        let mut saved = Saved::default();

        if self.canvas.observe(store.revision(), now, delay) {
            storage.save_canvas(store.state())?;
            self.canvas.saved_revision = store.revision();
            saved.canvas = true;
        }

        if self.ai_config.observe(store.ai_revision(), now, delay) {
            storage.save_ai_config(store.ai_config())?;
            self.ai_config.saved_revision = store.ai_revision();
            saved.ai_config = true;
        }

        if saved.any() {
            log::debug!("autosave: wrote {saved:?} at {now}");
        }
        Ok(saved)
    }

    /// Write everything pending immediately (e.g. on page hide). Ignores
    /// any retry backoff.
    pub fn flush(
        &mut self,
        store: &BlockStore,
        storage: &mut dyn StateStorage,
    ) -> Result<Saved, PersistError> {
        let mut saved = Saved::default();
        if store.revision() != self.canvas.saved_revision {
            storage.save_canvas(store.state())?;
            self.canvas = Pending::new(store.revision());
            saved.canvas = true;
        }
        if store.ai_revision() != self.ai_config.saved_revision {
            storage.save_ai_config(store.ai_config())?;
            self.ai_config = Pending::new(store.ai_revision());
            saved.ai_config = true;
        }
        self.failures = 0;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStorage;
    use ctx_core::ai::AiConfigPatch;
    use ctx_core::id::BlockId;
    use ctx_core::model::{Block, BlockKind, Position, Size};

    fn add(store: &mut BlockStore, id: &str) {
        store.add_block(Block::new(
            BlockId::intern(id),
            BlockKind::text(id),
            Position::default(),
            Size::new(300.0, 100.0),
            0,
        ));
    }

    #[test]
    fn clean_store_saves_nothing() {
        let store = BlockStore::default();
        let mut storage = MemoryStorage::default();
        let mut autosave = Autosave::new(AutosaveConfig::default(), &store);
        assert!(!autosave.is_dirty(&store));
        assert_eq!(autosave.poll(&store, &mut storage, 10_000).unwrap(), Saved::default());
        assert!(storage.canvas_bytes().is_none());
    }

    #[test]
    fn writes_after_quiet_period() {
        let mut store = BlockStore::default();
        let mut storage = MemoryStorage::default();
        let mut autosave = Autosave::new(AutosaveConfig::default(), &store);

        add(&mut store, "as-1");
        assert!(!autosave.poll(&store, &mut storage, 1_000).unwrap().any());
        // A further edit restarts the quiet period.
        add(&mut store, "as-2");
        assert!(!autosave.poll(&store, &mut storage, 1_400).unwrap().any());
        assert!(!autosave.poll(&store, &mut storage, 1_800).unwrap().any());

        let saved = autosave.poll(&store, &mut storage, 1_900).unwrap();
        assert!(saved.canvas);
        assert!(!saved.ai_config);
        assert!(!autosave.is_dirty(&store));
        assert_eq!(storage.load_canvas().unwrap().unwrap().blocks.len(), 2);

        assert!(!autosave.poll(&store, &mut storage, 5_000).unwrap().any());
    }

    #[test]
    fn ai_config_saved_separately() {
        let mut store = BlockStore::default();
        let mut storage = MemoryStorage::default();
        let mut autosave = Autosave::new(AutosaveConfig { delay_ms: 0 }, &store);

        store.update_ai_config(AiConfigPatch {
            system_prompt: Some("be brief".into()),
            ..AiConfigPatch::default()
        });
        let saved = autosave.poll(&store, &mut storage, 0).unwrap();
        assert_eq!(
            saved,
            Saved {
                canvas: false,
                ai_config: true
            }
        );
        assert_eq!(
            storage.load_ai_config().unwrap().unwrap().system_prompt,
            "be brief"
        );
    }

    /// Storage that refuses canvas writes while `full` is set.
    #[derive(Default)]
    struct QuotaStorage {
        inner: MemoryStorage,
        full: bool,
        attempts: usize,
    }

    impl StateStorage for QuotaStorage {
        fn save_canvas(&mut self, canvas: &crate::state::CanvasState) -> Result<(), PersistError> {
            self.attempts += 1;
            if self.full {
                return Err(PersistError::Io(std::io::Error::other("quota exceeded")));
            }
            self.inner.save_canvas(canvas)
        }

        fn load_canvas(&self) -> Result<Option<crate::state::CanvasState>, PersistError> {
            self.inner.load_canvas()
        }

        fn save_ai_config(&mut self, config: &ctx_core::ai::AiConfig) -> Result<(), PersistError> {
            self.inner.save_ai_config(config)
        }

        fn load_ai_config(&self) -> Result<Option<ctx_core::ai::AiConfig>, PersistError> {
            self.inner.load_ai_config()
        }

        fn clear_all(&mut self) -> Result<(), PersistError> {
            self.inner.clear_all()
        }
    }

    #[test]
    fn failed_writes_back_off() {
        let mut store = BlockStore::default();
        let mut storage = QuotaStorage {
            full: true,
            ..QuotaStorage::default()
        };
        let mut autosave = Autosave::new(AutosaveConfig { delay_ms: 0 }, &store);
        add(&mut store, "as-full");

        assert!(autosave.poll(&store, &mut storage, 0).is_err());
        assert_eq!(autosave.retry_at(), Some(RETRY_BASE_MS));

        // Ticks inside the backoff window do not touch storage.
        for now in [10, 200, 999] {
            assert!(!autosave.poll(&store, &mut storage, now).unwrap().any());
        }
        assert_eq!(storage.attempts, 1);

        assert!(autosave.poll(&store, &mut storage, 1_000).is_err());
        assert_eq!(autosave.retry_at(), Some(3_000));
        assert_eq!(storage.attempts, 2);

        storage.full = false;
        assert!(autosave.poll(&store, &mut storage, 3_000).unwrap().canvas);
        assert_eq!(autosave.retry_at(), None);
        assert!(!autosave.is_dirty(&store));
    }

    #[test]
    fn retry_delay_is_capped() {
        assert_eq!(retry_delay(1), 1_000);
        assert_eq!(retry_delay(2), 2_000);
        assert_eq!(retry_delay(5), 16_000);
        assert_eq!(retry_delay(6), RETRY_MAX_MS);
        assert_eq!(retry_delay(u32::MAX), RETRY_MAX_MS);
    }

    #[test]
    fn flush_ignores_delay() {
        let mut store = BlockStore::default();
        let mut storage = MemoryStorage::default();
        let mut autosave = Autosave::new(AutosaveConfig::default(), &store);
        add(&mut store, "as-flush");
        assert!(autosave.flush(&store, &mut storage).unwrap().canvas);
        assert!(!autosave.is_dirty(&store));
    }
}
