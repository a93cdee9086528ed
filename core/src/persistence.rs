//! Persistence manager: save and preferences documents for one slot.
//!
//! Reads are forgiving: a missing or malformed save yields a new game and
//! malformed preferences yield the defaults. Only storage failures are
//! reported as errors.

use crate::{
    catalog::ItemCatalog,
    error::SimResult,
    preferences::Preferences,
    snapshot::SaveDocument,
    state::SimulationState,
    store::SimStore,
    types::{now_millis, Tick, Timestamp},
};

pub struct PersistenceManager {
    store: SimStore,
    slot: String,
}

impl PersistenceManager {
    /// Wrap an opened store; applies migrations.
    pub fn new(store: SimStore, slot: impl Into<String>) -> SimResult<Self> {
        store.migrate()?;
        Ok(Self {
            store,
            slot: slot.into(),
        })
    }

    pub fn open(path: &str, slot: impl Into<String>) -> SimResult<Self> {
        Self::new(SimStore::open(path)?, slot)
    }

    pub fn in_memory(slot: impl Into<String>) -> SimResult<Self> {
        Self::new(SimStore::in_memory()?, slot)
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    pub fn has_save(&self) -> SimResult<bool> {
        Ok(self.store.get_save(&self.slot)?.is_some())
    }

    /// Restore the saved game, or start a new one.
    /// Returns the state and the tick to resume from.
    pub fn load_state(&self, catalog: &ItemCatalog) -> SimResult<(SimulationState, Tick)> {
        let Some(payload) = self.store.get_save(&self.slot)? else {
            log::debug!("slot '{}': no save, starting a new game", self.slot);
            return Ok((SimulationState::new_game(catalog, now_millis()), 0));
        };
        match SaveDocument::from_json(&payload) {
            Ok(doc) => {
                let (state, tick) = doc.into_state(catalog);
                log::info!(
                    "slot '{}': restored save at tick {tick} with {} points",
                    self.slot,
                    state.currency
                );
                Ok((state, tick))
            }
            Err(e) => {
                log::warn!("slot '{}': unreadable save ({e}), starting a new game", self.slot);
                Ok((SimulationState::new_game(catalog, now_millis()), 0))
            }
        }
    }

    /// Write an already-built document.
    pub fn write_document(&self, doc: &SaveDocument) -> SimResult<()> {
        let payload = doc.to_json()?;
        self.store
            .put_save(&self.slot, &payload, doc.last_persisted_at)?;
        log::debug!("slot '{}': saved at tick {}", self.slot, doc.tick);
        Ok(())
    }

    /// Serialize and write `state`. Returns the save time.
    pub fn save_state(&self, state: &SimulationState, tick: Tick) -> SimResult<Timestamp> {
        let mut doc = SaveDocument::from_state(state, tick);
        doc.last_persisted_at = now_millis();
        self.write_document(&doc)?;
        Ok(doc.last_persisted_at)
    }

    /// Remove the save document. Preferences are left alone.
    pub fn delete_save(&self) -> SimResult<bool> {
        self.store.delete_save(&self.slot)
    }

    pub fn load_preferences(&self) -> SimResult<Preferences> {
        let Some(payload) = self.store.get_preferences(&self.slot)? else {
            return Ok(Preferences::default());
        };
        match serde_json::from_str(&payload) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                log::warn!("slot '{}': unreadable preferences ({e}), using defaults", self.slot);
                Ok(Preferences::default())
            }
        }
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> SimResult<()> {
        let payload = serde_json::to_string(prefs)?;
        self.store
            .put_preferences(&self.slot, &payload, now_millis())
    }
}
