//! Player commands and the command processor.
//!
//! RULE: every command validates completely before it touches the state.
//! A rejected command leaves the state exactly as it was.

use crate::{
    catalog::ItemCatalog,
    collection,
    error::CommandError,
    event::SimEvent,
    grid::PlacedItem,
    state::SimulationState,
    types::{CellIndex, ItemId, Tick, Timestamp},
};
use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// Variants are only ever appended; the tags are part of the IPC protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Board ─────────────────────────────────────
    PlaceItem { cell: CellIndex, item_id: ItemId },
    RemoveItem { cell: CellIndex },
    Collect { cell: CellIndex },

    // ── Shop selection ────────────────────────────
    SelectItem { item_id: ItemId },
    DeselectItem,

    // ── Tile click ────────────────────────────────
    Interact { cell: CellIndex },
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::PlaceItem { .. } => "place_item",
            PlayerCommand::RemoveItem { .. } => "remove_item",
            PlayerCommand::Collect { .. } => "collect",
            PlayerCommand::SelectItem { .. } => "select_item",
            PlayerCommand::DeselectItem => "deselect_item",
            PlayerCommand::Interact { .. } => "interact",
        }
    }
}

/// What a command gets to work with.
pub struct CommandContext<'a> {
    /// Tick the command lands in (the last completed tick).
    pub tick: Tick,
    pub state: &'a mut SimulationState,
    pub catalog: &'a ItemCatalog,
    /// Wall-clock time stamped onto placed items.
    pub now: Timestamp,
}

/// Validate and apply one command.
pub fn apply_command(
    ctx: &mut CommandContext<'_>,
    command: &PlayerCommand,
) -> Result<Vec<SimEvent>, CommandError> {
    match command {
        PlayerCommand::PlaceItem { cell, item_id } => place_item(ctx, *cell, item_id),
        PlayerCommand::RemoveItem { cell } => remove_item(ctx, *cell),
        PlayerCommand::Collect { cell } => collect(ctx, *cell),
        PlayerCommand::SelectItem { item_id } => select_item(ctx, item_id),
        PlayerCommand::DeselectItem => Ok(deselect_item(ctx)),
        PlayerCommand::Interact { cell } => interact(ctx, *cell),
    }
}

fn place_item(
    ctx: &mut CommandContext<'_>,
    cell: CellIndex,
    item_id: &str,
) -> Result<Vec<SimEvent>, CommandError> {
    ctx.state.grid.check_index(cell)?;
    let def = ctx
        .catalog
        .get(item_id)
        .ok_or_else(|| CommandError::UnknownItem {
            item_id: item_id.to_string(),
        })?;
    if !ctx.state.is_unlocked(&def.id) {
        return Err(CommandError::NotUnlocked {
            item_id: def.id.clone(),
        });
    }
    if ctx.state.currency < def.price {
        return Err(CommandError::InsufficientFunds {
            item_id: def.id.clone(),
            price: def.price,
            available: ctx.state.currency,
        });
    }
    ctx.state
        .grid
        .place(cell, PlacedItem::new(def.id.clone(), ctx.now))?;
    ctx.state.currency -= def.price;

    log::info!(
        "tick={} placed '{}' at cell {cell} for {}",
        ctx.tick,
        def.id,
        def.price
    );
    Ok(vec![SimEvent::ItemPlaced {
        tick: ctx.tick,
        cell,
        item_id: def.id.clone(),
        price: def.price,
    }])
}

fn remove_item(ctx: &mut CommandContext<'_>, cell: CellIndex) -> Result<Vec<SimEvent>, CommandError> {
    let removed = ctx.state.grid.remove(cell)?;
    let refund = ctx.catalog.get(&removed.item_id).map_or(0, |def| def.price);
    ctx.state.currency = ctx.state.currency.saturating_add(refund);

    log::info!(
        "tick={} removed '{}' from cell {cell}, refunded {refund}",
        ctx.tick,
        removed.item_id
    );
    Ok(vec![SimEvent::ItemRemoved {
        tick: ctx.tick,
        cell,
        item_id: removed.item_id,
        refund,
    }])
}

fn collect(ctx: &mut CommandContext<'_>, cell: CellIndex) -> Result<Vec<SimEvent>, CommandError> {
    let Some(done) = collection::collect(ctx.state, ctx.catalog, cell)? else {
        return Ok(Vec::new());
    };
    log::info!(
        "tick={} collected {} units at cell {cell} ({} each) for {}",
        ctx.tick,
        done.units,
        done.unit_value,
        done.payout
    );
    Ok(vec![SimEvent::UnitsCollected {
        tick: ctx.tick,
        cell,
        units: done.units,
        unit_value: done.unit_value,
        payout: done.payout,
    }])
}

fn select_item(ctx: &mut CommandContext<'_>, item_id: &str) -> Result<Vec<SimEvent>, CommandError> {
    let def = ctx
        .catalog
        .get(item_id)
        .ok_or_else(|| CommandError::UnknownItem {
            item_id: item_id.to_string(),
        })?;
    if !ctx.state.is_unlocked(&def.id) {
        return Err(CommandError::NotUnlocked {
            item_id: def.id.clone(),
        });
    }

    // Selecting the selected item again toggles it off.
    let next = if ctx.state.selected_item.as_deref() == Some(def.id.as_str()) {
        None
    } else {
        Some(def.id.clone())
    };
    ctx.state.selected_item = next.clone();
    Ok(vec![SimEvent::SelectionChanged {
        tick: ctx.tick,
        item_id: next,
    }])
}

fn deselect_item(ctx: &mut CommandContext<'_>) -> Vec<SimEvent> {
    if ctx.state.selected_item.take().is_none() {
        return Vec::new();
    }
    vec![SimEvent::SelectionChanged {
        tick: ctx.tick,
        item_id: None,
    }]
}

/// A click on a tile: collect from a collector, place the selected item
/// on an empty cell, otherwise nothing.
fn interact(ctx: &mut CommandContext<'_>, cell: CellIndex) -> Result<Vec<SimEvent>, CommandError> {
    ctx.state.grid.check_index(cell)?;
    if ctx.state.grid.is_occupied(cell) {
        return collect(ctx, cell);
    }
    match ctx.state.selected_item.clone() {
        Some(item_id) => place_item(ctx, cell, &item_id),
        None => Ok(Vec::new()),
    }
}
