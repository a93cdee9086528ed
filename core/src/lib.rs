//! garden-core: the simulation and scoring engine of an idle lime garden.

pub mod accumulator_subsystem;
pub mod catalog;
pub mod clock;
pub mod collection;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod grid;
pub mod inspect;
pub mod persistence;
pub mod preferences;
pub mod production_subsystem;
pub mod progression_subsystem;
pub mod runtime;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod subsystem;
pub mod types;
