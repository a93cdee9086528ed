//! Cell inspection: the live synergy numbers behind one cell, as data.

use crate::{
    catalog::{ItemCatalog, ItemCategory},
    collection::{adjacent_amplifiers, amplifier_boost, range_amplifiers_in_line, unit_value},
    error::CommandError,
    grid::shares_line,
    production_subsystem::{booster_bonus, count_adjacent, producer_yield},
    state::SimulationState,
    types::{CellIndex, ItemId, Points},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellDetail {
    Producer {
        base_yield: Points,
        booster_bonus: Points,
        effective_yield: Points,
        feeds_collectors: bool,
    },
    Booster {
        producers_boosted: usize,
    },
    Collector {
        units: u64,
        capacity: u64,
        unit_value: Points,
        adjacent_amplifiers: usize,
        full: bool,
    },
    Amplifier {
        boost: Points,
        range_amplifiers_in_line: usize,
    },
    RangeAmplifier {
        amplifiers_in_line: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellReport {
    pub cell: CellIndex,
    pub item_id: Option<ItemId>,
    pub name: Option<String>,
    pub detail: Option<CellDetail>,
}

pub fn inspect(
    state: &SimulationState,
    catalog: &ItemCatalog,
    cell: CellIndex,
) -> Result<CellReport, CommandError> {
    state.grid.check_index(cell)?;
    let grid = &state.grid;

    let Some((placed, def)) = grid
        .get(cell)
        .and_then(|placed| catalog.get(&placed.item_id).map(|def| (placed, def)))
    else {
        return Ok(CellReport {
            cell,
            item_id: None,
            name: None,
            detail: None,
        });
    };

    let detail = match def.category {
        ItemCategory::Producer => CellDetail::Producer {
            base_yield: def.base_yield_per_tick,
            booster_bonus: booster_bonus(grid, catalog, cell),
            effective_yield: producer_yield(grid, catalog, cell, def),
            feeds_collectors: def.feeds_collectors,
        },
        ItemCategory::Booster => CellDetail::Booster {
            producers_boosted: count_adjacent(grid, catalog, cell, |d| {
                d.category == ItemCategory::Producer
            }),
        },
        ItemCategory::Collector => {
            let capacity = def.capacity_or_zero();
            CellDetail::Collector {
                units: placed.accumulated_units,
                capacity,
                unit_value: unit_value(grid, catalog, cell),
                adjacent_amplifiers: adjacent_amplifiers(grid, catalog, cell),
                full: placed.accumulated_units >= capacity,
            }
        }
        ItemCategory::Amplifier => CellDetail::Amplifier {
            boost: amplifier_boost(grid, catalog, cell),
            range_amplifiers_in_line: range_amplifiers_in_line(grid, catalog, cell),
        },
        ItemCategory::RangeAmplifier => CellDetail::RangeAmplifier {
            amplifiers_in_line: grid
                .occupied()
                .filter(|(other, _)| *other != cell && shares_line(*other, cell))
                .filter_map(|(_, p)| catalog.get(&p.item_id))
                .filter(|d| d.category == ItemCategory::Amplifier)
                .count(),
        },
    };

    Ok(CellReport {
        cell,
        item_id: Some(def.id.clone()),
        name: Some(def.name.clone()),
        detail: Some(detail),
    })
}
