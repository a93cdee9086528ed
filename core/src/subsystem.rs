//! Subsystem trait.
//!
//! RULE: Every tick stage implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{catalog::ItemCatalog, event::SimEvent, state::SimulationState, types::Tick};

/// What a subsystem gets to work with during one tick.
pub struct TickContext<'a> {
    pub tick: Tick,
    pub state: &'a mut SimulationState,
    pub catalog: &'a ItemCatalog,
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `ctx`:       the tick number, the state and the catalog
    /// - `events_in`: events emitted by earlier subsystems this tick
    ///
    /// Returns a vec of new events to add to the tick's event list.
    fn update(&mut self, ctx: &mut TickContext<'_>, events_in: &[SimEvent]) -> Vec<SimEvent>;
}
