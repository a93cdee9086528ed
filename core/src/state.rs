//! The live simulation state owned by the engine.
//!
//! RULE: only the command processor and the tick subsystems mutate this.
//! Everything else gets `&SimulationState` or a cloned snapshot.

use crate::{
    catalog::ItemCatalog,
    grid::Grid,
    types::{ItemId, Points, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationState {
    pub currency: Points,
    /// Yield of the most recent tick, for display.
    pub current_yield_rate: Points,
    pub grid: Grid,
    pub unlocked: BTreeSet<ItemId>,
    pub selected_item: Option<ItemId>,
    pub last_persisted_at: Timestamp,
}

impl SimulationState {
    /// A fresh game: no currency, empty grid, only the starter unlocked.
    pub fn new_game(catalog: &ItemCatalog, now: Timestamp) -> Self {
        let mut unlocked = BTreeSet::new();
        unlocked.insert(catalog.starter_id().to_string());
        Self {
            currency: 0,
            current_yield_rate: 0,
            grid: Grid::new(),
            unlocked,
            selected_item: None,
            last_persisted_at: now,
        }
    }

    pub fn is_unlocked(&self, item_id: &str) -> bool {
        self.unlocked.contains(item_id)
    }

    /// Unlock every catalog item. Used by tooling and tests.
    pub fn unlock_all(&mut self, catalog: &ItemCatalog) {
        self.unlocked
            .extend(catalog.iter().map(|def| def.id.clone()));
    }
}
