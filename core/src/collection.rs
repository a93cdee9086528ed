//! Collector payout, computed on demand when the player collects,
//! never during a tick.
//!
//! unit value = BASE_UNIT_VALUE + Σ boost of each adjacent amplifier
//! amplifier boost = 1 + range amplifiers sharing its row or column

use crate::{
    catalog::{ItemCatalog, ItemCategory},
    error::CommandError,
    grid::{shares_line, Grid},
    production_subsystem::count_adjacent,
    state::SimulationState,
    types::{CellIndex, Points},
};
use serde::{Deserialize, Serialize};

/// Points per collected unit with no amplifiers around.
pub const BASE_UNIT_VALUE: Points = 5;
/// Boost of an amplifier with no range amplifiers in line.
pub const AMPLIFIER_BASE_BOOST: Points = 1;
/// Extra boost per range amplifier in an amplifier's row or column.
pub const RANGE_AMPLIFIER_BONUS: Points = 1;

/// Range amplifiers on the same row or column as `index`, itself excluded.
pub fn range_amplifiers_in_line(grid: &Grid, catalog: &ItemCatalog, index: CellIndex) -> usize {
    grid.occupied()
        .filter(|(other, _)| *other != index && shares_line(*other, index))
        .filter_map(|(_, placed)| catalog.get(&placed.item_id))
        .filter(|def| def.category == ItemCategory::RangeAmplifier)
        .count()
}

/// Effective boost of an amplifier standing at `index`.
pub fn amplifier_boost(grid: &Grid, catalog: &ItemCatalog, index: CellIndex) -> Points {
    let in_line = range_amplifiers_in_line(grid, catalog, index) as Points;
    AMPLIFIER_BASE_BOOST.saturating_add(in_line.saturating_mul(RANGE_AMPLIFIER_BONUS))
}

/// Points per unit for the collector at `index` under the current layout.
pub fn unit_value(grid: &Grid, catalog: &ItemCatalog, index: CellIndex) -> Points {
    grid.adjacent(index)
        .filter(|(_, placed)| {
            catalog
                .get(&placed.item_id)
                .is_some_and(|def| def.category == ItemCategory::Amplifier)
        })
        .map(|(amp, _)| amplifier_boost(grid, catalog, amp))
        .fold(BASE_UNIT_VALUE, Points::saturating_add)
}

/// Amplifiers touching the collector at `index`.
pub fn adjacent_amplifiers(grid: &Grid, catalog: &ItemCatalog, index: CellIndex) -> usize {
    count_adjacent(grid, catalog, index, |def| {
        def.category == ItemCategory::Amplifier
    })
}

/// A completed collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    pub cell: CellIndex,
    pub units: u64,
    pub unit_value: Points,
    pub payout: Points,
}

/// Empty the collector at `cell` into currency.
///
/// An empty cell, a non-collector or a collector holding nothing is a
/// silent no-op (`Ok(None)`); only an out-of-range cell is an error.
pub fn collect(
    state: &mut SimulationState,
    catalog: &ItemCatalog,
    cell: CellIndex,
) -> Result<Option<Collection>, CommandError> {
    state.grid.check_index(cell)?;

    let units = match state.grid.get(cell) {
        Some(placed) if placed.accumulated_units > 0 => {
            match catalog.get(&placed.item_id) {
                Some(def) if def.is_collector() => placed.accumulated_units,
                _ => return Ok(None),
            }
        }
        _ => return Ok(None),
    };

    let unit_value = unit_value(&state.grid, catalog, cell);
    let payout = units.saturating_mul(unit_value);

    state.currency = state.currency.saturating_add(payout);
    if let Some(placed) = state.grid.get_mut(cell) {
        placed.accumulated_units = 0;
    }

    Ok(Some(Collection {
        cell,
        units,
        unit_value,
        payout,
    }))
}
