//! Collector fill, "became full" transitions and on-demand collection.

use garden_core::{
    catalog::ItemCatalog,
    engine::GardenEngine,
    error::CommandError,
    event::SimEvent,
    grid::PlacedItem,
    state::SimulationState,
    types::{CellIndex, Tick},
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn garden(items: &[(CellIndex, &str)]) -> GardenEngine {
    let catalog = ItemCatalog::standard();
    let mut state = SimulationState::new_game(&catalog, 0);
    state.unlock_all(&catalog);
    for (cell, id) in items {
        state
            .grid
            .place(*cell, PlacedItem::new(id.to_string(), 0))
            .expect("place test item");
    }
    GardenEngine::with_state(state)
}

fn units_at(engine: &GardenEngine, cell: CellIndex) -> u64 {
    engine.state().grid.get(cell).map_or(0, |p| p.accumulated_units)
}

/// Run `n` ticks and return the ticks on which `cell` became full.
fn full_ticks(engine: &mut GardenEngine, n: u64, cell: CellIndex) -> Vec<Tick> {
    let mut out = Vec::new();
    for _ in 0..n {
        for event in engine.tick() {
            if let SimEvent::BasketFull { tick, cell: c, .. } = event {
                if c == cell {
                    out.push(tick);
                }
            }
        }
    }
    out
}

#[test]
fn basket_fills_to_capacity_and_signals_once() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);

    let full = full_ticks(&mut engine, 100, 0);

    assert_eq!(units_at(&engine, 0), 100);
    assert_eq!(full, vec![100]);
}

#[test]
fn full_basket_stays_clamped_without_repeating_the_signal() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);
    let full = full_ticks(&mut engine, 250, 0);
    assert_eq!(units_at(&engine, 0), 100);
    assert_eq!(full.len(), 1);
}

#[test]
fn collecting_a_full_basket_pays_five_per_unit() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);
    engine.run_ticks(100);
    let before = engine.state().currency;

    let payout = engine.collect(0).unwrap();

    assert_eq!(payout, 500);
    assert_eq!(engine.state().currency, before + 500);
    assert_eq!(units_at(&engine, 0), 0);
}

#[test]
fn collecting_twice_pays_nothing_the_second_time() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);
    engine.run_ticks(40);

    assert_eq!(engine.collect(0).unwrap(), 200);
    assert_eq!(engine.collect(0).unwrap(), 0);
}

#[test]
fn market_and_billboard_raise_unit_value_to_seven() {
    // Market at 5 touches the basket at 0; billboard at 9 shares row 1 with it.
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree"), (5, "market"), (9, "billboard")]);
    engine.run_ticks(100);

    assert_eq!(engine.collect(0).unwrap(), 700);
}

#[test]
fn billboard_in_the_market_column_counts_too() {
    // Market at 5 (column 0), billboard at 20 (column 0, row 4).
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree"), (5, "market"), (20, "billboard")]);
    engine.run_ticks(10);
    assert_eq!(engine.collect(0).unwrap(), 70);
}

#[test]
fn billboard_off_the_market_lines_does_nothing() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree"), (5, "market"), (13, "billboard")]);
    engine.run_ticks(10);
    assert_eq!(engine.collect(0).unwrap(), 60);
}

#[test]
fn each_adjacent_market_adds_its_own_boost() {
    // Basket at 12 with markets at 11 and 13 and a tree at 7.
    let mut engine = garden(&[(12, "basket"), (7, "lime_tree"), (11, "market"), (13, "market")]);
    engine.run_ticks(10);
    assert_eq!(engine.collect(12).unwrap(), 10 * (5 + 1 + 1));
}

#[test]
fn two_trees_fill_twice_as_fast() {
    let mut engine = garden(&[(12, "basket"), (7, "lime_tree"), (17, "lime_tree")]);
    let full = full_ticks(&mut engine, 60, 12);
    assert_eq!(full, vec![50]);
}

#[test]
fn refilling_after_collection_signals_again() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);
    assert_eq!(full_ticks(&mut engine, 100, 0), vec![100]);
    engine.collect(0).unwrap();
    assert_eq!(full_ticks(&mut engine, 100, 0), vec![200]);
}

#[test]
fn collecting_non_collectors_and_empty_cells_is_a_no_op() {
    let mut engine = garden(&[(3, "lime_tree")]);
    engine.run_ticks(5);
    let before = engine.snapshot();

    assert_eq!(engine.collect(3).unwrap(), 0);
    assert_eq!(engine.collect(4).unwrap(), 0);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn collecting_outside_the_grid_is_rejected() {
    let mut engine = garden(&[]);
    assert_eq!(
        engine.collect(30),
        Err(CommandError::InvalidIndex { index: 30, size: 25 })
    );
}

#[test]
fn collect_listener_sees_cell_units_and_payout() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.on_collect(move |cell, units, payout| sink.lock().unwrap().push((cell, units, payout)));

    engine.run_ticks(30);
    engine.collect(0).unwrap();
    engine.collect(0).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(0, 30, 150)]);
}

#[test]
fn basket_full_listener_fires_on_the_crossing() {
    let mut engine = garden(&[(0, "basket"), (1, "lime_tree")]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.on_basket_full(move |cell| sink.lock().unwrap().push(cell));

    engine.run_ticks(150);

    assert_eq!(*seen.lock().unwrap(), vec![0]);
}

proptest! {
    #[test]
    fn units_never_exceed_capacity(ticks in 0u64..260, trees in 1usize..=4) {
        let around = [7, 11, 13, 17];
        let mut items: Vec<(CellIndex, &str)> = vec![(12, "basket")];
        items.extend(around.iter().take(trees).map(|&c| (c, "lime_tree")));
        let mut engine = garden(&items);

        let full = full_ticks(&mut engine, ticks, 12);
        let expected = (ticks * trees as u64).min(100);

        prop_assert_eq!(units_at(&engine, 12), expected);
        prop_assert_eq!(full.len(), usize::from(ticks * trees as u64 >= 100));
    }
}
