//! garden-runner: headless runner for the lime garden simulation.
//!
//! Usage:
//!   garden-runner --ticks 600 --db garden.db
//!   garden-runner --realtime 30 --db garden.db
//!   garden-runner --ipc-mode --db garden.db

use anyhow::Result;
use garden_core::{
    command::PlayerCommand,
    config::GardenConfig,
    engine::GardenEngine,
    event::SimEvent,
    format::format_points,
    grid::PlacedItem,
    inspect::CellReport,
    persistence::PersistenceManager,
    preferences::Preferences,
    progression_subsystem::ShopEntry,
    runtime::GardenRuntime,
    types::{now_millis, CellIndex, ItemId, Points, Tick, Timestamp},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Inspect { cell: CellIndex },
    Shop,
    Reset,
    SetPreferences { preferences: Preferences },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick: Tick,
    currency: Points,
    currency_display: String,
    yield_rate: Points,
    grid: Vec<Option<PlacedItem>>,
    unlocked: Vec<ItemId>,
    selected_item: Option<ItemId>,
    next_unlock: Option<ItemId>,
    preferences: Preferences,
    events: Vec<SimEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inspect: Option<CellReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shop: Option<Vec<ShopEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 60u64);
    let realtime = args
        .windows(2)
        .find(|w| w[0] == "--realtime")
        .and_then(|w| w[1].parse::<u64>().ok());
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = GardenConfig::load(data_dir)?;

    if !ipc_mode {
        println!("Lime Garden: garden-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  slot:      {}", config.save_slot);
        println!();
    }

    let persistence = if db == ":memory:" {
        PersistenceManager::in_memory(config.save_slot.clone())?
    } else {
        PersistenceManager::open(db, config.save_slot.clone())?
    };

    if ipc_mode {
        run_ipc_loop(&config, &persistence)?;
    } else if let Some(secs) = realtime {
        run_realtime(&config, persistence, secs)?;
    } else {
        let mut engine = GardenEngine::load(&config, &persistence)?;
        let start_tick = engine.current_tick();
        engine.run_ticks(ticks);
        let doc = engine.save_document(now_millis());
        persistence.write_document(&doc)?;
        print_summary(&engine, start_tick, doc.last_persisted_at);
    }

    Ok(())
}

fn run_realtime(config: &GardenConfig, persistence: PersistenceManager, secs: u64) -> Result<()> {
    println!("running in real time for {secs}s (tick every {} ms)", config.tick_interval_ms);

    let runtime = GardenRuntime::start(config, persistence)?;
    let start_tick = runtime.with_engine(|engine| {
        engine.on_unlock(|item_id| log::info!("unlocked {item_id}"));
        engine.on_basket_full(|cell| log::info!("basket at cell {cell} is full"));
        engine.current_tick()
    });

    std::thread::sleep(Duration::from_secs(secs));

    let state = runtime.state();
    let final_tick = runtime.with_engine(|engine| engine.current_tick());
    runtime.shutdown()?;

    println!("=== REALTIME SUMMARY ===");
    println!("  ticks run:      {}", final_tick.saturating_sub(start_tick));
    println!("  final tick:     {final_tick}");
    println!("  points:         {}", format_points(state.currency));
    println!("  points/sec:     {}", format_points(state.current_yield_rate));
    Ok(())
}

fn run_ipc_loop(config: &GardenConfig, persistence: &PersistenceManager) -> Result<()> {
    let mut engine = GardenEngine::load(config, persistence)?;
    let mut preferences = persistence.load_preferences()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let mut events = Vec::new();
        let mut error = None;
        let mut inspect = None;
        let mut shop = None;
        let mut changed = false;

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => {}
            IpcRequest::Tick { count } => {
                for _ in 0..count {
                    events.extend(engine.tick());
                }
                changed = true;
            }
            IpcRequest::Command { command } => match engine.submit_command(&command) {
                Ok(out) => {
                    events = out;
                    changed = true;
                }
                Err(e) => error = Some(e.to_string()),
            },
            IpcRequest::Inspect { cell } => match engine.inspect(cell) {
                Ok(report) => inspect = Some(report),
                Err(e) => error = Some(e.to_string()),
            },
            IpcRequest::Shop => shop = Some(engine.availability()),
            IpcRequest::Reset => {
                persistence.delete_save()?;
                events = engine.reset();
                changed = true;
            }
            IpcRequest::SetPreferences { preferences: prefs } => {
                persistence.save_preferences(&prefs)?;
                preferences = prefs;
            }
        }

        if changed {
            persistence.write_document(&engine.save_document(now_millis()))?;
        }

        let state = build_ui_state(&engine, &preferences, events, inspect, shop, error);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }

    persistence.write_document(&engine.save_document(now_millis()))?;
    Ok(())
}

fn build_ui_state(
    engine: &GardenEngine,
    preferences: &Preferences,
    events: Vec<SimEvent>,
    inspect: Option<CellReport>,
    shop: Option<Vec<ShopEntry>>,
    error: Option<String>,
) -> UiState {
    let state = engine.state();
    UiState {
        tick: engine.current_tick(),
        currency: state.currency,
        currency_display: format_points(state.currency),
        yield_rate: state.current_yield_rate,
        grid: state.grid.cells().to_vec(),
        unlocked: state.unlocked.iter().cloned().collect(),
        selected_item: state.selected_item.clone(),
        next_unlock: engine.next_unlock().map(|def| def.id.clone()),
        preferences: preferences.clone(),
        events,
        inspect,
        shop,
        error,
    }
}

fn print_summary(engine: &GardenEngine, start_tick: Tick, saved_at: Timestamp) {
    let state = engine.state();
    let saved = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(saved_at)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| saved_at.to_string());

    println!("=== RUN SUMMARY ===");
    println!("  ticks run:      {}", engine.current_tick() - start_tick);
    println!("  final tick:     {}", engine.current_tick());
    println!("  points:         {}", format_points(state.currency));
    println!("  points/sec:     {}", format_points(state.current_yield_rate));
    println!("  items placed:   {}", state.grid.occupied().count());
    println!("  unlocked:       {}/{}", state.unlocked.len(), engine.catalog().len());
    match engine.next_unlock() {
        Some(def) => println!("  next unlock:    {} at {}", def.name, format_points(def.price)),
        None => println!("  next unlock:    (everything unlocked)"),
    }
    println!("  saved at:       {saved}");
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
