//! Progression subsystem: one-way unlock gate per catalog item.
//!
//! Execution: every tick, last in registration order, so it sees the
//! currency after this tick's production has been credited.
//!
//! An item unlocks once currency reaches its price and never locks again.
//! Unlocks of the same tick are emitted in catalog order.

use crate::{
    catalog::{ItemCatalog, ItemDefinition},
    event::SimEvent,
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
    types::{ItemId, Points},
};
use serde::{Deserialize, Serialize};

pub struct ProgressionSubsystem;

impl ProgressionSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProgressionSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSubsystem for ProgressionSubsystem {
    fn name(&self) -> &'static str {
        "progression"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>, _events_in: &[SimEvent]) -> Vec<SimEvent> {
        let mut out = Vec::new();
        for def in ctx.catalog.iter() {
            if ctx.state.is_unlocked(&def.id) || ctx.state.currency < def.price {
                continue;
            }
            ctx.state.unlocked.insert(def.id.clone());
            log::info!("tick={} unlocked '{}' at {} points", ctx.tick, def.name, ctx.state.currency);
            out.push(SimEvent::ItemUnlocked {
                tick: ctx.tick,
                item_id: def.id.clone(),
            });
        }
        out
    }
}

/// How an item looks in the shop right now.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemAvailability {
    Locked,
    Affordable,
    Unaffordable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShopEntry {
    pub item_id: ItemId,
    pub price: Points,
    pub availability: ItemAvailability,
}

/// Every catalog item with its availability, catalog order.
pub fn availability(state: &SimulationState, catalog: &ItemCatalog) -> Vec<ShopEntry> {
    catalog
        .iter()
        .map(|def| {
            let availability = if !state.is_unlocked(&def.id) {
                ItemAvailability::Locked
            } else if state.currency >= def.price {
                ItemAvailability::Affordable
            } else {
                ItemAvailability::Unaffordable
            };
            ShopEntry {
                item_id: def.id.clone(),
                price: def.price,
                availability,
            }
        })
        .collect()
}

/// The cheapest item still locked; the first in catalog order wins ties.
pub fn next_unlock<'a>(
    state: &SimulationState,
    catalog: &'a ItemCatalog,
) -> Option<&'a ItemDefinition> {
    catalog
        .iter()
        .filter(|def| !state.is_unlocked(&def.id))
        .min_by_key(|def| def.price)
}
