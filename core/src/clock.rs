//! Simulation clock: owns the tick counter.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimClock {
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new() -> Self {
        Self { current_tick: 0 }
    }

    /// Resume counting from a persisted tick.
    pub fn starting_at(tick: Tick) -> Self {
        Self { current_tick: tick }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    pub fn reset(&mut self) {
        self.current_tick = 0;
    }
}
