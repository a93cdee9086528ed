//! Production subsystem tests: base yield and booster adjacency.

use garden_core::{
    catalog::ItemCatalog,
    engine::GardenEngine,
    grid::PlacedItem,
    production_subsystem::compute_production,
    state::SimulationState,
    types::CellIndex,
};

/// Every item unlocked, no currency, `items` already standing.
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

#[test]
fn starter_bush_in_the_middle_yields_one() {
    let mut engine = GardenEngine::build_test();
    engine.place_item(12, "lime_bush").unwrap();

    engine.tick();

    assert_eq!(engine.state().currency, 1);
    assert_eq!(engine.state().current_yield_rate, 1);
}

#[test]
fn empty_grid_yields_nothing() {
    let mut engine = GardenEngine::build_test();
    engine.run_ticks(10);
    assert_eq!(engine.state().currency, 0);
    assert_eq!(engine.state().current_yield_rate, 0);
}

#[test]
fn booster_adds_one_to_adjacent_producer() {
    let engine = garden(&[(7, "lime_bush"), (12, "pond")]);
    let report = compute_production(&engine.state().grid, engine.catalog());

    assert_eq!(report.cell_yields, vec![(7, 2)]);
    assert_eq!(report.total_yield, 2);
}

#[test]
fn boosters_stack_per_instance() {
    // Tree at 12 with ponds on three sides: 3 + 3.
    let engine = garden(&[(12, "lime_tree"), (7, "pond"), (11, "pond"), (13, "pond")]);
    let report = compute_production(&engine.state().grid, engine.catalog());
    assert_eq!(report.total_yield, 6);
}

#[test]
fn booster_only_reaches_orthogonal_neighbours() {
    // 6 is diagonal to 12.
    let engine = garden(&[(6, "lime_bush"), (12, "pond")]);
    let report = compute_production(&engine.state().grid, engine.catalog());
    assert_eq!(report.total_yield, 1);
}

#[test]
fn one_pond_boosts_every_adjacent_producer() {
    let engine = garden(&[(12, "pond"), (7, "lime_bush"), (17, "lime_tree")]);
    let report = compute_production(&engine.state().grid, engine.catalog());
    assert_eq!(report.cell_yields, vec![(7, 2), (17, 4)]);
}

#[test]
fn non_producers_never_yield() {
    let engine = garden(&[(0, "pond"), (1, "basket"), (2, "market"), (3, "billboard")]);
    let report = compute_production(&engine.state().grid, engine.catalog());
    assert_eq!(report.total_yield, 0);
    assert!(report.cell_yields.is_empty());
}

#[test]
fn yield_rate_tracks_the_latest_tick() {
    let mut engine = garden(&[(0, "lime_tree"), (1, "lime_bush")]);
    engine.run_ticks(3);
    assert_eq!(engine.state().current_yield_rate, 4);
    assert_eq!(engine.state().currency, 12);

    engine.remove_item(0).unwrap();
    engine.tick();
    assert_eq!(engine.state().current_yield_rate, 1);
}

#[test]
fn only_tree_type_producers_fill_collectors() {
    let mut engine = garden(&[(12, "basket"), (7, "lime_bush"), (13, "lime_tree")]);
    engine.run_ticks(5);
    let units = engine.state().grid.get(12).unwrap().accumulated_units;
    assert_eq!(units, 5);
}
