//! The event bus: all inter-subsystem communication.
//!
//! RULE: Subsystems communicate ONLY through events.
//! A subsystem may never call another subsystem's functions directly.
//! The same events are handed to the presentation layer's listeners.

use crate::types::{CellIndex, ItemId, Points, Tick};
use serde::{Deserialize, Serialize};

/// Units a collector gained from its neighbours this tick (before clamping).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectorFill {
    pub cell: CellIndex,
    pub units: u64,
}

/// Every event emitted during simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
        yield_rate: Points,
        currency: Points,
    },
    GameReset {
        tick: Tick,
    },

    // ── Production ─────────────────────────────────
    YieldProduced {
        tick: Tick,
        total_yield: Points,
        collector_fill: Vec<CollectorFill>,
    },

    // ── Accumulator ────────────────────────────────
    BasketFull {
        tick: Tick,
        cell: CellIndex,
        units: u64,
    },

    // ── Progression ────────────────────────────────
    ItemUnlocked {
        tick: Tick,
        item_id: ItemId,
    },

    // ── Player commands ────────────────────────────
    ItemPlaced {
        tick: Tick,
        cell: CellIndex,
        item_id: ItemId,
        price: Points,
    },
    ItemRemoved {
        tick: Tick,
        cell: CellIndex,
        item_id: ItemId,
        refund: Points,
    },
    UnitsCollected {
        tick: Tick,
        cell: CellIndex,
        units: u64,
        unit_value: Points,
        payout: Points,
    },
    SelectionChanged {
        tick: Tick,
        item_id: Option<ItemId>,
    },
}

impl SimEvent {
    /// Stable name of the variant, used in log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::TickStarted { .. } => "tick_started",
            SimEvent::TickCompleted { .. } => "tick_completed",
            SimEvent::GameReset { .. } => "game_reset",
            SimEvent::YieldProduced { .. } => "yield_produced",
            SimEvent::BasketFull { .. } => "basket_full",
            SimEvent::ItemUnlocked { .. } => "item_unlocked",
            SimEvent::ItemPlaced { .. } => "item_placed",
            SimEvent::ItemRemoved { .. } => "item_removed",
            SimEvent::UnitsCollected { .. } => "units_collected",
            SimEvent::SelectionChanged { .. } => "selection_changed",
        }
    }
}
