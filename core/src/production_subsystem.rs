//! Production subsystem: per-tick yield of every placed item.
//!
//! Reads the grid only; it never mutates state. The result is published
//! as a `YieldProduced` event and applied by the accumulator subsystem.
//!
//! Category rules:
//!   - Producer:        base yield + BOOSTER_BONUS per adjacent booster
//!   - Booster:         no yield of its own (acts through producers)
//!   - Collector:       no yield; +1 unit per adjacent collector-feeding producer
//!   - Amplifier:       nothing at tick time (collection only)
//!   - RangeAmplifier:  nothing at tick time (collection only)

use crate::{
    catalog::{ItemCatalog, ItemCategory, ItemDefinition},
    event::{CollectorFill, SimEvent},
    grid::{Grid, PlacedItem},
    subsystem::{SimSubsystem, TickContext},
    types::{CellIndex, Points},
};

/// Flat yield bonus a booster gives each adjacent producer.
pub const BOOSTER_BONUS: Points = 1;

/// Units a collector gains per adjacent feeding producer per tick.
pub const FILL_PER_FEEDER: u64 = 1;

/// Everything a contribution rule may look at for one cell.
pub struct CellContext<'a> {
    pub index: CellIndex,
    pub placed: &'a PlacedItem,
    pub def: &'a ItemDefinition,
    pub grid: &'a Grid,
    pub catalog: &'a ItemCatalog,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contribution {
    pub yield_amount: Points,
    pub collector_units: u64,
}

type ContributionRule = fn(&CellContext<'_>) -> Contribution;

/// Rule table keyed by category.
fn contribution_rule(category: ItemCategory) -> ContributionRule {
    match category {
        ItemCategory::Producer => producer_contribution,
        ItemCategory::Collector => collector_contribution,
        ItemCategory::Booster | ItemCategory::Amplifier | ItemCategory::RangeAmplifier => {
            no_contribution
        }
    }
}

fn producer_contribution(ctx: &CellContext<'_>) -> Contribution {
    Contribution {
        yield_amount: producer_yield(ctx.grid, ctx.catalog, ctx.index, ctx.def),
        collector_units: 0,
    }
}

fn collector_contribution(ctx: &CellContext<'_>) -> Contribution {
    let feeders = count_adjacent(ctx.grid, ctx.catalog, ctx.index, |def| {
        def.category == ItemCategory::Producer && def.feeds_collectors
    });
    Contribution {
        yield_amount: 0,
        collector_units: feeders as u64 * FILL_PER_FEEDER,
    }
}

fn no_contribution(_ctx: &CellContext<'_>) -> Contribution {
    Contribution::default()
}

/// Count items next to `index` whose definition matches `pred`.
/// Each matching instance counts once.
pub fn count_adjacent(
    grid: &Grid,
    catalog: &ItemCatalog,
    index: CellIndex,
    pred: impl Fn(&ItemDefinition) -> bool,
) -> usize {
    grid.adjacent(index)
        .filter_map(|(_, placed)| catalog.get(&placed.item_id))
        .filter(|def| pred(def))
        .count()
}

/// Bonus the boosters around `index` add to a producer standing there.
pub fn booster_bonus(grid: &Grid, catalog: &ItemCatalog, index: CellIndex) -> Points {
    let boosters = count_adjacent(grid, catalog, index, |def| {
        def.category == ItemCategory::Booster
    });
    boosters as Points * BOOSTER_BONUS
}

/// Effective per-tick yield of a producer at `index`.
pub fn producer_yield(
    grid: &Grid,
    catalog: &ItemCatalog,
    index: CellIndex,
    def: &ItemDefinition,
) -> Points {
    def.base_yield_per_tick
        .saturating_add(booster_bonus(grid, catalog, index))
}

/// Result of one production pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionReport {
    pub total_yield: Points,
    /// Yield per contributing cell, index order.
    pub cell_yields: Vec<(CellIndex, Points)>,
    /// Raw units gained by each collector with at least one feeder.
    pub collector_fill: Vec<CollectorFill>,
}

/// Compute one tick of production from a read-only view of the grid.
pub fn compute_production(grid: &Grid, catalog: &ItemCatalog) -> ProductionReport {
    let mut report = ProductionReport::default();

    for (index, placed) in grid.occupied() {
        let Some(def) = catalog.get(&placed.item_id) else {
            log::debug!("cell {index}: unknown item '{}' skipped", placed.item_id);
            continue;
        };
        let ctx = CellContext {
            index,
            placed,
            def,
            grid,
            catalog,
        };
        let contribution = contribution_rule(def.category)(&ctx);

        if contribution.yield_amount > 0 {
            report.total_yield = report.total_yield.saturating_add(contribution.yield_amount);
            report.cell_yields.push((index, contribution.yield_amount));
        }
        if contribution.collector_units > 0 {
            report.collector_fill.push(CollectorFill {
                cell: index,
                units: contribution.collector_units,
            });
        }
    }

    report
}

pub struct ProductionSubsystem;

impl ProductionSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSubsystem for ProductionSubsystem {
    fn name(&self) -> &'static str {
        "production"
    }

    fn update(&mut self, ctx: &mut TickContext<'_>, _events_in: &[SimEvent]) -> Vec<SimEvent> {
        let report = compute_production(&ctx.state.grid, ctx.catalog);

        log::debug!(
            "tick={} production: yield={} producers={} filling_collectors={}",
            ctx.tick,
            report.total_yield,
            report.cell_yields.len(),
            report.collector_fill.len()
        );

        vec![SimEvent::YieldProduced {
            tick: ctx.tick,
            total_yield: report.total_yield,
            collector_fill: report.collector_fill,
        }]
    }
}
