//! The simulation engine: owns the garden state and runs the tick pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Production subsystem   (computes yield and collector fill)
//!   2. Accumulator subsystem  (credits currency, fills collectors)
//!   3. Progression subsystem  (unlocks against the updated currency)
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - No subsystem calls another subsystem's functions directly.
//!   - Player commands go through `submit_command` and are applied whole.
//!   - Every event of a tick or command is handed to the listeners.

use crate::{
    accumulator_subsystem::AccumulatorSubsystem,
    catalog::{ItemCatalog, ItemDefinition},
    clock::SimClock,
    command::{apply_command, CommandContext, PlayerCommand},
    config::GardenConfig,
    error::{CommandError, SimResult},
    event::SimEvent,
    inspect::{self, CellReport},
    persistence::PersistenceManager,
    production_subsystem::ProductionSubsystem,
    progression_subsystem::{self, ProgressionSubsystem, ShopEntry},
    snapshot::SaveDocument,
    state::SimulationState,
    subsystem::{SimSubsystem, TickContext},
    types::{now_millis, CellIndex, ItemId, Points, Tick, Timestamp},
};

pub type TickListener = Box<dyn FnMut(Tick, &SimulationState) + Send>;
pub type UnlockListener = Box<dyn FnMut(&str) + Send>;
pub type CollectListener = Box<dyn FnMut(CellIndex, u64, Points) + Send>;
pub type BasketFullListener = Box<dyn FnMut(CellIndex) + Send>;
pub type EventListener = Box<dyn FnMut(&SimEvent) + Send>;

#[derive(Default)]
struct Listeners {
    tick: Vec<TickListener>,
    unlock: Vec<UnlockListener>,
    collect: Vec<CollectListener>,
    basket_full: Vec<BasketFullListener>,
    events: Vec<EventListener>,
}

impl Listeners {
    fn dispatch(&mut self, state: &SimulationState, events: &[SimEvent]) {
        for event in events {
            for listener in &mut self.events {
                listener(event);
            }
            match event {
                SimEvent::TickCompleted { tick, .. } => {
                    for listener in &mut self.tick {
                        listener(*tick, state);
                    }
                }
                SimEvent::ItemUnlocked { item_id, .. } => {
                    for listener in &mut self.unlock {
                        listener(item_id);
                    }
                }
                SimEvent::UnitsCollected {
                    cell, units, payout, ..
                } => {
                    for listener in &mut self.collect {
                        listener(*cell, *units, *payout);
                    }
                }
                SimEvent::BasketFull { cell, .. } => {
                    for listener in &mut self.basket_full {
                        listener(*cell);
                    }
                }
                _ => {}
            }
        }
    }
}

pub struct GardenEngine {
    pub clock: SimClock,
    catalog: ItemCatalog,
    state: SimulationState,
    subsystems: Vec<Box<dyn SimSubsystem>>,
    listeners: Listeners,
}

impl GardenEngine {
    /// An engine with no subsystems registered.
    pub fn new(catalog: ItemCatalog, state: SimulationState, tick: Tick) -> Self {
        Self {
            clock: SimClock::starting_at(tick),
            catalog,
            state,
            subsystems: Vec::new(),
            listeners: Listeners::default(),
        }
    }

    /// Build a fully wired engine with all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(catalog: ItemCatalog, state: SimulationState, tick: Tick) -> Self {
        let mut engine = GardenEngine::new(catalog, state, tick);

        // EXECUTION ORDER: fixed, never reordered.
        engine.register(Box::new(ProductionSubsystem::new()));
        engine.register(Box::new(AccumulatorSubsystem::new()));
        engine.register(Box::new(ProgressionSubsystem::new()));
        engine
    }

    /// Fresh game on the standard catalog.
    pub fn build_test() -> Self {
        Self::with_catalog(ItemCatalog::standard())
    }

    /// Fresh game on `catalog`.
    pub fn with_catalog(catalog: ItemCatalog) -> Self {
        let state = SimulationState::new_game(&catalog, now_millis());
        Self::build(catalog, state, 0)
    }

    /// Standard catalog with a prepared state, starting at tick 0.
    pub fn with_state(state: SimulationState) -> Self {
        Self::build(ItemCatalog::standard(), state, 0)
    }

    /// Restore the persisted game of the configured slot.
    pub fn load(config: &GardenConfig, persistence: &PersistenceManager) -> SimResult<Self> {
        let (state, tick) = persistence.load_state(&config.catalog)?;
        Ok(Self::build(config.catalog.clone(), state, tick))
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push(subsystem);
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let current_tick = self.clock.advance();
        let mut tick_events = vec![SimEvent::TickStarted { tick: current_tick }];

        // Each subsystem sees all events emitted so far this tick.
        for subsystem in &mut self.subsystems {
            let mut ctx = TickContext {
                tick: current_tick,
                state: &mut self.state,
                catalog: &self.catalog,
            };
            let new_events = subsystem.update(&mut ctx, &tick_events);
            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted {
            tick: current_tick,
            yield_rate: self.state.current_yield_rate,
            currency: self.state.currency,
        });

        log::debug!(
            "tick={current_tick} currency={} rate={} events={}",
            self.state.currency,
            self.state.current_yield_rate,
            tick_events.len()
        );

        self.listeners.dispatch(&self.state, &tick_events);
        tick_events
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    // ── Commands ───────────────────────────────────────────────

    /// Validate and apply one player command.
    pub fn submit_command(&mut self, command: &PlayerCommand) -> Result<Vec<SimEvent>, CommandError> {
        let mut ctx = CommandContext {
            tick: self.clock.current_tick,
            state: &mut self.state,
            catalog: &self.catalog,
            now: now_millis(),
        };
        match apply_command(&mut ctx, command) {
            Ok(events) => {
                self.listeners.dispatch(&self.state, &events);
                Ok(events)
            }
            Err(e) => {
                log::warn!("{} rejected: {e}", command.name());
                Err(e)
            }
        }
    }

    pub fn place_item(&mut self, cell: CellIndex, item_id: &str) -> Result<(), CommandError> {
        self.submit_command(&PlayerCommand::PlaceItem {
            cell,
            item_id: item_id.to_string(),
        })
        .map(|_| ())
    }

    /// Returns the refund.
    pub fn remove_item(&mut self, cell: CellIndex) -> Result<Points, CommandError> {
        let events = self.submit_command(&PlayerCommand::RemoveItem { cell })?;
        Ok(events
            .iter()
            .map(|e| match e {
                SimEvent::ItemRemoved { refund, .. } => *refund,
                _ => 0,
            })
            .sum())
    }

    /// Returns the payout; 0 when there was nothing to collect.
    pub fn collect(&mut self, cell: CellIndex) -> Result<Points, CommandError> {
        let events = self.submit_command(&PlayerCommand::Collect { cell })?;
        Ok(payout_of(&events))
    }

    /// Returns the selection after the command.
    pub fn select_item(&mut self, item_id: &str) -> Result<Option<ItemId>, CommandError> {
        self.submit_command(&PlayerCommand::SelectItem {
            item_id: item_id.to_string(),
        })?;
        Ok(self.state.selected_item.clone())
    }

    pub fn deselect_item(&mut self) {
        // Deselecting cannot be rejected.
        let _ = self.submit_command(&PlayerCommand::DeselectItem);
    }

    pub fn interact(&mut self, cell: CellIndex) -> Result<Vec<SimEvent>, CommandError> {
        self.submit_command(&PlayerCommand::Interact { cell })
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Start over: fresh state, tick counter back to 0.
    pub fn reset(&mut self) -> Vec<SimEvent> {
        self.state = SimulationState::new_game(&self.catalog, now_millis());
        self.clock.reset();
        log::info!("game reset");
        let events = vec![SimEvent::GameReset { tick: 0 }];
        self.listeners.dispatch(&self.state, &events);
        events
    }

    /// Stamp the state as persisted at `now` and build its save document.
    pub fn save_document(&mut self, now: Timestamp) -> SaveDocument {
        self.state.last_persisted_at = now;
        SaveDocument::from_state(&self.state, self.clock.current_tick)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Owned copy of the state for readers outside the engine.
    pub fn snapshot(&self) -> SimulationState {
        self.state.clone()
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn inspect(&self, cell: CellIndex) -> Result<CellReport, CommandError> {
        inspect::inspect(&self.state, &self.catalog, cell)
    }

    pub fn availability(&self) -> Vec<ShopEntry> {
        progression_subsystem::availability(&self.state, &self.catalog)
    }

    pub fn next_unlock(&self) -> Option<&ItemDefinition> {
        progression_subsystem::next_unlock(&self.state, &self.catalog)
    }

    // ── Listeners ──────────────────────────────────────────────

    /// Called after every completed tick.
    pub fn on_tick(&mut self, listener: impl FnMut(Tick, &SimulationState) + Send + 'static) {
        self.listeners.tick.push(Box::new(listener));
    }

    pub fn on_unlock(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.listeners.unlock.push(Box::new(listener));
    }

    /// Called with (cell, units, payout) for every non-empty collection.
    pub fn on_collect(&mut self, listener: impl FnMut(CellIndex, u64, Points) + Send + 'static) {
        self.listeners.collect.push(Box::new(listener));
    }

    pub fn on_basket_full(&mut self, listener: impl FnMut(CellIndex) + Send + 'static) {
        self.listeners.basket_full.push(Box::new(listener));
    }

    /// Every event, ticks and commands alike.
    pub fn subscribe(&mut self, listener: impl FnMut(&SimEvent) + Send + 'static) {
        self.listeners.events.push(Box::new(listener));
    }
}

fn payout_of(events: &[SimEvent]) -> Points {
    events
        .iter()
        .map(|e| match e {
            SimEvent::UnitsCollected { payout, .. } => *payout,
            _ => 0,
        })
        .sum()
}
