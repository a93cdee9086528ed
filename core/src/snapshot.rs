//! Save document: full simulation state to/from JSON.
//!
//! Loading never fails on content: missing fields take defaults, legacy
//! field names and item ids are accepted, and the result is normalized
//! against the catalog before it becomes a `SimulationState`.

use crate::{
    catalog::ItemCatalog,
    grid::{Grid, PlacedItem, GRID_SIZE},
    state::SimulationState,
    types::{ItemId, Points, Tick, Timestamp},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Format version written into every new save.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SaveDocument {
    pub version: u32,
    #[serde(alias = "points", deserialize_with = "lenient_points")]
    pub currency: Points,
    #[serde(alias = "pointsPerSecond", deserialize_with = "lenient_points")]
    pub current_yield_rate: Points,
    #[serde(alias = "gardenGrid", deserialize_with = "lenient_cells")]
    pub grid: Vec<Option<SavedCell>>,
    #[serde(deserialize_with = "lenient_unlocked")]
    pub unlocked: BTreeSet<ItemId>,
    #[serde(alias = "selectedSeed", deserialize_with = "lenient_id")]
    pub selected_item: Option<ItemId>,
    #[serde(alias = "lastSave", deserialize_with = "lenient_timestamp")]
    pub last_persisted_at: Timestamp,
    #[serde(deserialize_with = "lenient_points")]
    pub tick: Tick,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedCell {
    #[serde(alias = "type")]
    pub item_id: ItemId,
    #[serde(default, alias = "plantedAt", deserialize_with = "lenient_timestamp")]
    pub placed_at: Timestamp,
    #[serde(default, alias = "limes", deserialize_with = "lenient_points")]
    pub accumulated_units: u64,
}

impl SaveDocument {
    pub fn from_state(state: &SimulationState, tick: Tick) -> Self {
        let grid = state
            .grid
            .cells()
            .iter()
            .map(|cell| {
                cell.as_ref().map(|placed| SavedCell {
                    item_id: placed.item_id.clone(),
                    placed_at: placed.placed_at,
                    accumulated_units: placed.accumulated_units,
                })
            })
            .collect();
        Self {
            version: SAVE_VERSION,
            currency: state.currency,
            current_yield_rate: state.current_yield_rate,
            grid,
            unlocked: state.unlocked.clone(),
            selected_item: state.selected_item.clone(),
            last_persisted_at: state.last_persisted_at,
            tick,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a state from this document, normalized against `catalog`.
    /// Returns the state and the tick counter to resume from.
    pub fn into_state(self, catalog: &ItemCatalog) -> (SimulationState, Tick) {
        let mut cells: Vec<Option<PlacedItem>> = self
            .grid
            .into_iter()
            .take(GRID_SIZE)
            .enumerate()
            .map(|(index, cell)| restore_cell(catalog, index, cell?))
            .collect();
        cells.resize(GRID_SIZE, None);

        let mut unlocked: BTreeSet<ItemId> = self
            .unlocked
            .iter()
            .filter_map(|id| catalog.resolve(id))
            .map(|def| def.id.clone())
            .collect();
        unlocked.insert(catalog.starter_id().to_string());

        let selected_item = self
            .selected_item
            .as_deref()
            .and_then(|id| catalog.resolve(id))
            .map(|def| def.id.clone())
            .filter(|id| unlocked.contains(id));

        let state = SimulationState {
            currency: self.currency,
            current_yield_rate: self.current_yield_rate,
            grid: Grid::from_cells(cells),
            unlocked,
            selected_item,
            last_persisted_at: self.last_persisted_at,
        };
        (state, self.tick)
    }
}

fn restore_cell(catalog: &ItemCatalog, index: usize, cell: SavedCell) -> Option<PlacedItem> {
    let Some(def) = catalog.resolve(&cell.item_id) else {
        log::warn!("save: dropping unknown item '{}' at cell {index}", cell.item_id);
        return None;
    };
    let accumulated_units = if def.is_collector() {
        cell.accumulated_units.min(def.capacity_or_zero())
    } else {
        0
    };
    Some(PlacedItem {
        item_id: def.id.clone(),
        placed_at: cell.placed_at,
        accumulated_units,
    })
}

// ── Lenient field readers ─────────────────────────────────────

/// Whole non-negative number from any JSON value.
/// Fractions are floored, negatives and non-numbers read as 0.
fn points_from_value(value: &Value) -> u64 {
    let float = match value {
        Value::Number(n) => {
            if let Some(whole) = n.as_u64() {
                return whole;
            }
            n.as_f64()
        }
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match float {
        Some(f) if f.is_finite() && f > 0.0 => f.floor() as u64,
        _ => 0,
    }
}

fn lenient_points<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(points_from_value(&value))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(de: D) -> Result<Timestamp, D::Error> {
    let value = Value::deserialize(de)?;
    let millis = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(millis.unwrap_or(0))
}

fn lenient_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<ItemId>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// A cell that does not parse reads as empty; a non-list grid reads as
/// an empty grid.
fn lenient_cells<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Option<SavedCell>>, D::Error> {
    let value = Value::deserialize(de)?;
    let Value::Array(cells) = value else {
        return Ok(Vec::new());
    };
    Ok(cells
        .into_iter()
        .map(|cell| match cell {
            Value::Null => None,
            other => serde_json::from_value(other).ok(),
        })
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UnlockedRepr {
    List(Vec<ItemId>),
    Map(BTreeMap<ItemId, bool>),
    Other(Value),
}

fn lenient_unlocked<'de, D: Deserializer<'de>>(de: D) -> Result<BTreeSet<ItemId>, D::Error> {
    Ok(match UnlockedRepr::deserialize(de)? {
        UnlockedRepr::List(ids) => ids.into_iter().collect(),
        UnlockedRepr::Map(flags) => flags
            .into_iter()
            .filter_map(|(id, on)| on.then_some(id))
            .collect(),
        UnlockedRepr::Other(_) => BTreeSet::new(),
    })
}
