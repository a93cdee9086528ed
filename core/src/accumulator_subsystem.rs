//! Accumulator subsystem: applies a tick's production to the state.
//!
//! Execution: after production, before progression.
//! Depends on: reads events_in for YieldProduced.
//!
//! Credits the tick's yield to currency, records it as the displayed
//! yield rate and fills collectors up to their capacity. A collector
//! going from below capacity to full emits exactly one BasketFull.

use crate::{
    catalog::ItemCatalog,
    event::{CollectorFill, SimEvent},
    grid::Grid,
    subsystem::{SimSubsystem, TickContext},
    types::{CellIndex, Tick},
};

pub struct AccumulatorSubsystem;

impl AccumulatorSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AccumulatorSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Add `units` to the collector at `cell`, clamped to its capacity.
/// Returns true when this fill made the collector full.
pub fn fill_collector(grid: &mut Grid, catalog: &ItemCatalog, cell: CellIndex, units: u64) -> bool {
    let Some(placed) = grid.get_mut(cell) else {
        return false;
    };
    let Some(def) = catalog.get(&placed.item_id) else {
        return false;
    };
    if !def.is_collector() {
        return false;
    }
    let capacity = def.capacity_or_zero();
    let was_below = placed.accumulated_units < capacity;
    placed.accumulated_units = placed.accumulated_units.saturating_add(units).min(capacity);
    was_below && placed.accumulated_units >= capacity
}

fn apply_fill(
    tick: Tick,
    grid: &mut Grid,
    catalog: &ItemCatalog,
    fills: &[CollectorFill],
    out: &mut Vec<SimEvent>,
) {
    for fill in fills {
        if fill_collector(grid, catalog, fill.cell, fill.units) {
            let units = grid.get(fill.cell).map_or(0, |p| p.accumulated_units);
            log::debug!("tick={tick} collector at cell {} is full ({units})", fill.cell);
            out.push(SimEvent::BasketFull {
                tick,
                cell: fill.cell,
                units,
            });
        }
    }
}

impl SimSubsystem for AccumulatorSubsystem {
    fn name(&self) -> &'static str {
        "accumulator"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>, events_in: &[SimEvent]) -> Vec<SimEvent> {
        let mut out = Vec::new();

        for event in events_in {
            if let SimEvent::YieldProduced {
                total_yield,
                collector_fill,
                ..
            } = event
            {
                ctx.state.currency = ctx.state.currency.saturating_add(*total_yield);
                ctx.state.current_yield_rate = *total_yield;
                apply_fill(ctx.tick, &mut ctx.state.grid, ctx.catalog, collector_fill, &mut out);
            }
        }

        out
    }
}
