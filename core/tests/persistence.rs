//! Save/load, legacy documents, malformed data and reset semantics.

use garden_core::{
    catalog::ItemCatalog,
    config::GardenConfig,
    engine::GardenEngine,
    persistence::PersistenceManager,
    preferences::{AssetVariant, Preferences, Theme},
    snapshot::SaveDocument,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn manager() -> PersistenceManager {
    PersistenceManager::in_memory("test").expect("in-memory persistence")
}

fn played_engine() -> GardenEngine {
    let mut engine = GardenEngine::build_test();
    engine.place_item(12, "lime_bush").unwrap();
    engine.run_ticks(150);
    engine.place_item(0, "lime_tree").unwrap();
    engine.select_item("lime_tree").unwrap();
    engine.run_ticks(20);
    engine
}

#[test]
fn save_and_load_restore_the_same_state() {
    let persistence = manager();
    let mut engine = played_engine();

    let doc = engine.save_document(1_700_000_000_000);
    persistence.write_document(&doc).unwrap();

    let (state, tick) = persistence.load_state(engine.catalog()).unwrap();
    assert_eq!(tick, 170);
    assert_eq!(&state, engine.state());
    assert_eq!(state.last_persisted_at, 1_700_000_000_000);
}

#[test]
fn restored_engine_continues_where_it_stopped() {
    let persistence = manager();
    let config = GardenConfig::default_test();
    let mut engine = played_engine();
    persistence.save_state(engine.state(), engine.current_tick()).unwrap();

    let mut restored = GardenEngine::load(&config, &persistence).unwrap();
    engine.run_ticks(10);
    restored.run_ticks(10);

    assert_eq!(restored.current_tick(), engine.current_tick());
    assert_eq!(restored.state().currency, engine.state().currency);
}

#[test]
fn missing_save_starts_a_new_game() {
    let persistence = manager();
    let (state, tick) = persistence.load_state(&ItemCatalog::standard()).unwrap();
    assert_eq!(tick, 0);
    assert_eq!(state.currency, 0);
    assert!(state.grid.is_empty());
    assert!(state.is_unlocked("lime_bush"));
}

#[test]
fn malformed_save_falls_back_to_a_new_game() {
    init_logger();
    let persistence = manager();
    persistence.store().put_save("test", "{not json", 0).unwrap();

    let (state, tick) = persistence.load_state(&ItemCatalog::standard()).unwrap();
    assert_eq!(tick, 0);
    assert_eq!(state.currency, 0);
    assert_eq!(state.unlocked.len(), 1);
}

#[test]
fn empty_document_defaults_every_field() {
    let (state, tick) = SaveDocument::from_json("{}")
        .unwrap()
        .into_state(&ItemCatalog::standard());
    assert_eq!(tick, 0);
    assert_eq!(state.currency, 0);
    assert_eq!(state.grid.len(), 25);
    assert!(state.grid.is_empty());
    assert!(state.is_unlocked("lime_bush"));
    assert_eq!(state.selected_item, None);
}

#[test]
fn legacy_document_is_translated_and_normalized() {
    init_logger();
    let legacy = r#"{
        "points": 1234.7,
        "pointsPerSecond": 4,
        "gardenGrid": [
            {"type": "limeBush", "plantedAt": 1700000000000, "limes": 7},
            null,
            {"type": "basket", "plantedAt": 1700000000500, "limes": 250},
            {"type": "mystery_plant", "plantedAt": 1},
            "garbage"
        ],
        "unlocked": {"limeBush": true, "limeTree": true, "basket": true, "market": false},
        "selectedSeed": "limeTree",
        "lastSave": 1700000001000
    }"#;

    let (state, _) = SaveDocument::from_json(legacy)
        .unwrap()
        .into_state(&ItemCatalog::standard());

    assert_eq!(state.currency, 1234);
    assert_eq!(state.current_yield_rate, 4);
    assert_eq!(state.last_persisted_at, 1_700_000_001_000);
    assert_eq!(state.grid.len(), 25);

    let bush = state.grid.get(0).unwrap();
    assert_eq!(bush.item_id, "lime_bush");
    assert_eq!(bush.accumulated_units, 0);
    assert_eq!(bush.placed_at, 1_700_000_000_000);

    let basket = state.grid.get(2).unwrap();
    assert_eq!(basket.item_id, "basket");
    assert_eq!(basket.accumulated_units, 100);

    assert!(state.grid.get(3).is_none());
    assert!(state.grid.get(4).is_none());
    assert_eq!(state.grid.occupied().count(), 2);

    assert!(state.is_unlocked("lime_bush"));
    assert!(state.is_unlocked("lime_tree"));
    assert!(state.is_unlocked("basket"));
    assert!(!state.is_unlocked("market"));
    assert_eq!(state.selected_item.as_deref(), Some("lime_tree"));
}

#[test]
fn negative_currency_is_clamped_to_zero() {
    let (state, _) = SaveDocument::from_json(r#"{"points": -50}"#)
        .unwrap()
        .into_state(&ItemCatalog::standard());
    assert_eq!(state.currency, 0);
}

#[test]
fn starter_is_unlocked_even_when_the_save_forgot_it() {
    let (state, _) = SaveDocument::from_json(r#"{"unlocked": ["pond"]}"#)
        .unwrap()
        .into_state(&ItemCatalog::standard());
    assert!(state.is_unlocked("lime_bush"));
    assert!(state.is_unlocked("pond"));
}

#[test]
fn locked_or_unknown_selection_is_cleared() {
    let catalog = ItemCatalog::standard();
    let (state, _) = SaveDocument::from_json(r#"{"selected_item": "billboard"}"#)
        .unwrap()
        .into_state(&catalog);
    assert_eq!(state.selected_item, None);

    let (state, _) = SaveDocument::from_json(r#"{"selected_item": "cactus"}"#)
        .unwrap()
        .into_state(&catalog);
    assert_eq!(state.selected_item, None);
}

#[test]
fn oversized_grid_is_truncated() {
    let cells = vec![r#"{"item_id": "pond"}"#; 30].join(",");
    let json = format!(r#"{{"grid": [{cells}], "unlocked": ["pond"]}}"#);
    let (state, _) = SaveDocument::from_json(&json)
        .unwrap()
        .into_state(&ItemCatalog::standard());
    assert_eq!(state.grid.len(), 25);
    assert_eq!(state.grid.occupied().count(), 25);
}

#[test]
fn preferences_round_trip_and_default() {
    let persistence = manager();
    assert_eq!(persistence.load_preferences().unwrap(), Preferences::default());

    let prefs = Preferences {
        muted_music: true,
        muted_sfx: false,
        theme: Theme::Dark,
        asset_variant: AssetVariant::Vector,
    };
    persistence.save_preferences(&prefs).unwrap();
    assert_eq!(persistence.load_preferences().unwrap(), prefs);
}

#[test]
fn malformed_preferences_fall_back_to_defaults() {
    init_logger();
    let persistence = manager();
    persistence.store().put_preferences("test", "[1, 2", 0).unwrap();
    assert_eq!(persistence.load_preferences().unwrap(), Preferences::default());
}

#[test]
fn deleting_the_save_keeps_preferences() {
    let persistence = manager();
    let engine = played_engine();
    let prefs = Preferences {
        theme: Theme::Dark,
        ..Preferences::default()
    };
    persistence.save_state(engine.state(), engine.current_tick()).unwrap();
    persistence.save_preferences(&prefs).unwrap();

    assert!(persistence.delete_save().unwrap());

    assert!(!persistence.has_save().unwrap());
    assert_eq!(persistence.load_preferences().unwrap(), prefs);
    assert!(!persistence.delete_save().unwrap());
}

#[test]
fn slots_are_independent() {
    let persistence = manager();
    let engine = played_engine();
    persistence.save_state(engine.state(), engine.current_tick()).unwrap();

    assert!(persistence.store().get_save("other").unwrap().is_none());
    assert!(persistence.store().get_save("test").unwrap().is_some());
}

#[test]
fn file_backed_store_survives_reopening() {
    let path = std::env::temp_dir().join(format!("garden-persist-{}.db", std::process::id()));
    let path_str = path.to_string_lossy().to_string();
    let _ = std::fs::remove_file(&path);

    let engine = played_engine();
    {
        let persistence = PersistenceManager::open(&path_str, "default").unwrap();
        persistence.save_state(engine.state(), engine.current_tick()).unwrap();
    }
    let persistence = PersistenceManager::open(&path_str, "default").unwrap();
    let (state, tick) = persistence.load_state(engine.catalog()).unwrap();

    assert_eq!(tick, engine.current_tick());
    assert_eq!(state.grid, engine.state().grid);
    assert_eq!(state.currency, engine.state().currency);

    drop(persistence);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path_str}{suffix}"));
    }
}
