//! Real-time runtime tests: workers, autosave, reset and shutdown.

use garden_core::{
    catalog::ItemCatalog,
    command::PlayerCommand,
    engine::GardenEngine,
    persistence::PersistenceManager,
    preferences::{Preferences, Theme},
    runtime::GardenRuntime,
};
use std::{thread, time::Duration};

const FAST: Duration = Duration::from_millis(5);
const NEVER: Duration = Duration::from_secs(3600);

fn start(tick: Duration, autosave: Duration) -> GardenRuntime {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = GardenEngine::build_test();
    engine.place_item(12, "lime_bush").unwrap();
    GardenRuntime::start_with(
        engine,
        PersistenceManager::in_memory("rt").unwrap(),
        Preferences::default(),
        tick,
        autosave,
    )
    .expect("start runtime")
}

fn temp_db(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("garden-{name}-{}.db", std::process::id()))
        .to_string_lossy()
        .to_string()
}

fn remove_db(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}

#[test]
fn tick_worker_advances_the_game() {
    let runtime = start(FAST, NEVER);
    thread::sleep(Duration::from_millis(150));

    let state = runtime.state();
    assert!(state.currency > 0, "no ticks ran");
    assert_eq!(state.current_yield_rate, 1);
    runtime.shutdown().unwrap();
}

#[test]
fn commands_apply_between_ticks() {
    let runtime = start(NEVER, NEVER);

    let events = runtime
        .execute(&PlayerCommand::PlaceItem {
            cell: 3,
            item_id: "lime_bush".into(),
        })
        .unwrap();
    assert_eq!(events.len(), 1);
    assert!(runtime.state().grid.is_occupied(3));

    assert!(runtime
        .execute(&PlayerCommand::RemoveItem { cell: 4 })
        .is_err());
    runtime.shutdown().unwrap();
}

#[test]
fn autosave_writes_the_game_periodically() {
    let runtime = start(FAST, Duration::from_millis(20));
    thread::sleep(Duration::from_millis(150));

    let saved = runtime.with_persistence(|p| p.load_state(&ItemCatalog::standard()).unwrap());
    assert!(saved.0.grid.is_occupied(12));
    assert!(saved.1 > 0);
    runtime.shutdown().unwrap();
}

#[test]
fn reset_deletes_the_save_and_keeps_preferences() {
    let runtime = start(NEVER, NEVER);
    runtime
        .update_preferences(|p| p.theme = Theme::Dark)
        .unwrap();
    runtime.save_now().unwrap();
    assert!(runtime.with_persistence(|p| p.has_save().unwrap()));

    runtime.reset().unwrap();

    assert!(!runtime.with_persistence(|p| p.has_save().unwrap()));
    let state = runtime.state();
    assert_eq!(state.currency, 0);
    assert!(state.grid.is_empty());
    assert_eq!(runtime.with_engine(|e| e.current_tick()), 0);

    assert_eq!(runtime.preferences().theme, Theme::Dark);
    let stored = runtime.with_persistence(|p| p.load_preferences().unwrap());
    assert_eq!(stored.theme, Theme::Dark);
    runtime.shutdown().unwrap();
}

#[test]
fn repeated_resets_under_fast_workers_do_not_deadlock() {
    let runtime = start(Duration::from_millis(1), Duration::from_millis(1));
    for _ in 0..50 {
        runtime.reset().unwrap();
    }
    runtime.shutdown().unwrap();
}

#[test]
fn preference_updates_are_saved_immediately() {
    let runtime = start(NEVER, NEVER);
    runtime.update_preferences(|p| p.muted_sfx = true).unwrap();
    let stored = runtime.with_persistence(|p| p.load_preferences().unwrap());
    assert!(stored.muted_sfx);
    runtime.shutdown().unwrap();
}

#[test]
fn shutdown_writes_a_final_save() {
    let path = temp_db("shutdown");
    remove_db(&path);

    let runtime = GardenRuntime::start_with(
        GardenEngine::build_test(),
        PersistenceManager::open(&path, "default").unwrap(),
        Preferences::default(),
        NEVER,
        NEVER,
    )
    .unwrap();
    runtime
        .execute(&PlayerCommand::PlaceItem {
            cell: 6,
            item_id: "lime_bush".into(),
        })
        .unwrap();
    runtime.shutdown().unwrap();

    let persistence = PersistenceManager::open(&path, "default").unwrap();
    let (state, _) = persistence.load_state(&ItemCatalog::standard()).unwrap();
    assert!(state.grid.is_occupied(6));

    drop(persistence);
    remove_db(&path);
}

#[test]
fn dropping_the_runtime_stops_workers_and_saves() {
    let path = temp_db("drop");
    remove_db(&path);
    {
        let mut engine = GardenEngine::build_test();
        engine.place_item(0, "lime_bush").unwrap();
        let _runtime = GardenRuntime::start_with(
            engine,
            PersistenceManager::open(&path, "default").unwrap(),
            Preferences::default(),
            FAST,
            NEVER,
        )
        .unwrap();
        thread::sleep(Duration::from_millis(30));
    }

    let persistence = PersistenceManager::open(&path, "default").unwrap();
    assert!(persistence.has_save().unwrap());

    drop(persistence);
    remove_db(&path);
}
