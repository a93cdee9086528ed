//! Item catalog: the static definitions of everything that can be placed.
//!
//! RULE: behaviour is decided by `ItemCategory`, never by comparing ids.
//! Catalog order is significant: unlock events for the same tick are
//! emitted in this order.

use crate::{
    error::CatalogError,
    types::{ItemId, Points},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Behaviour category of an item. Each category has its own
/// contribution rule in the production subsystem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Yields currency every tick.
    Producer,
    /// Adds a flat bonus to adjacent producers.
    Booster,
    /// Fills up from adjacent producers; paid out on collection.
    Collector,
    /// Raises the per-unit value of adjacent collectors.
    Amplifier,
    /// Raises the boost of amplifiers in the same row or column.
    RangeAmplifier,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Points,
    pub base_yield_per_tick: Points,
    /// Unit capacity; present exactly on collectors.
    #[serde(default)]
    pub capacity: Option<u64>,
    pub category: ItemCategory,
    /// Producer sub-type that fills adjacent collectors.
    #[serde(default)]
    pub feeds_collectors: bool,
    /// Older ids this item was saved under.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ItemDefinition {
    pub fn is_collector(&self) -> bool {
        self.category == ItemCategory::Collector
    }

    /// Capacity of a collector; zero for everything else.
    pub fn capacity_or_zero(&self) -> u64 {
        self.capacity.unwrap_or(0)
    }
}

/// On-disk shape of `catalog/items.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub starter_item: ItemId,
    pub items: Vec<ItemDefinition>,
}

/// Validated, immutable item catalog.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    starter_item: ItemId,
    items: Vec<ItemDefinition>,
    /// id and alias -> position in `items`.
    lookup: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Validate and build a catalog.
    pub fn new(starter_item: ItemId, items: Vec<ItemDefinition>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for item in &items {
            if !ids.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            match (item.category, item.capacity) {
                (ItemCategory::Collector, None) => {
                    return Err(CatalogError::MissingCapacity(item.id.clone()))
                }
                (ItemCategory::Collector, Some(_)) => {}
                (_, Some(_)) => return Err(CatalogError::UnexpectedCapacity(item.id.clone())),
                (_, None) => {}
            }
            if item.category != ItemCategory::Producer && item.base_yield_per_tick > 0 {
                return Err(CatalogError::YieldOnNonProducer(item.id.clone()));
            }
        }
        if !ids.contains(starter_item.as_str()) {
            return Err(CatalogError::MissingStarter(starter_item));
        }
        for item in &items {
            for alias in &item.aliases {
                if ids.contains(alias.as_str()) {
                    return Err(CatalogError::AliasCollision {
                        alias: alias.clone(),
                        item_id: item.id.clone(),
                    });
                }
            }
        }
        Ok(Self::assemble(starter_item, items))
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        Self::new(file.starter_item, file.items)
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            starter_item: self.starter_item.clone(),
            items: self.items.clone(),
        }
    }

    fn assemble(starter_item: ItemId, items: Vec<ItemDefinition>) -> Self {
        let mut lookup = HashMap::new();
        for (pos, item) in items.iter().enumerate() {
            for alias in &item.aliases {
                lookup.entry(alias.clone()).or_insert(pos);
            }
        }
        // Canonical ids win over aliases.
        for (pos, item) in items.iter().enumerate() {
            lookup.insert(item.id.clone(), pos);
        }
        Self { starter_item, items, lookup }
    }

    /// The built-in lime garden catalog.
    pub fn standard() -> Self {
        let item = |id: &str,
                    name: &str,
                    description: &str,
                    price: Points,
                    base: Points,
                    category: ItemCategory,
                    aliases: &[&str]| ItemDefinition {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            base_yield_per_tick: base,
            capacity: None,
            category,
            feeds_collectors: false,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };

        let lime_bush = item(
            "lime_bush",
            "Lime Bush",
            "Earns 1 point per second from falling limes.",
            0,
            1,
            ItemCategory::Producer,
            &["limeBush"],
        );
        let lime_tree = ItemDefinition {
            feeds_collectors: true,
            ..item(
                "lime_tree",
                "Lime Tree",
                "Earns 3 points per second. Trees are just big bushes.",
                100,
                3,
                ItemCategory::Producer,
                &["limeTree"],
            )
        };
        let pond = item(
            "pond",
            "Pond",
            "Adjacent lime plants produce +1 point per second.",
            1_000,
            0,
            ItemCategory::Booster,
            &[],
        );
        let basket = ItemDefinition {
            capacity: Some(100),
            ..item(
                "basket",
                "Basket",
                "Collects 1 lime per second for each adjacent tree. Each lime is worth 5 points. Holds 100 limes.",
                5_000,
                0,
                ItemCategory::Collector,
                &[],
            )
        };
        let market = item(
            "market",
            "Market",
            "Adjacent baskets earn +1 point per lime.",
            10_000,
            0,
            ItemCategory::Amplifier,
            &[],
        );
        let billboard = item(
            "billboard",
            "Billboard",
            "Markets in the same row or column get +1 to their basket boost.",
            20_000,
            0,
            ItemCategory::RangeAmplifier,
            &[],
        );

        Self::assemble(
            "lime_bush".into(),
            vec![lime_bush, lime_tree, pond, basket, market, billboard],
        )
    }

    /// Look up an item by canonical id.
    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.lookup
            .get(id)
            .map(|&pos| &self.items[pos])
            .filter(|def| def.id == id)
    }

    /// Look up an item by canonical id or legacy alias.
    pub fn resolve(&self, id_or_alias: &str) -> Option<&ItemDefinition> {
        self.lookup.get(id_or_alias).map(|&pos| &self.items[pos])
    }

    pub fn starter(&self) -> &ItemDefinition {
        // `new` guarantees presence; `assemble` is only fed validated or built-in data.
        self.get(&self.starter_item).unwrap_or(&self.items[0])
    }

    pub fn starter_id(&self) -> &str {
        &self.starter_item
    }

    /// Items in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
