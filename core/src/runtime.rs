//! Real-time runtime: a tick worker and an autosave worker around one engine.
//!
//! LOCK ORDER: persistence, then engine. Never the other way round.
//!   - tick worker:  engine only
//!   - autosave:     persistence -> engine (snapshot, released) -> write
//!   - reset:        persistence -> engine, both held across delete + reinit
//!
//! Holding the persistence lock through a reset means an autosave that
//! started before it can never write a pre-reset snapshot after it.

use crate::{
    command::PlayerCommand,
    config::GardenConfig,
    engine::GardenEngine,
    error::{CommandError, SimError, SimResult},
    event::SimEvent,
    persistence::PersistenceManager,
    preferences::Preferences,
    state::SimulationState,
    types::now_millis,
};
use std::{
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Lock, recovering the data of a poisoned mutex.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    name: &'static str,
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Run `job` every `interval` until told to stop.
fn spawn_worker(
    name: &'static str,
    interval: Duration,
    mut job: impl FnMut() + Send + 'static,
) -> SimResult<Worker> {
    let (stop, stop_rx) = mpsc::channel::<()>();
    let handle = thread::Builder::new()
        .name(format!("garden-{name}"))
        .spawn(move || {
            let mut next = Instant::now() + interval;
            loop {
                let wait = next.saturating_duration_since(Instant::now());
                match stop_rx.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {
                        job();
                        next += interval;
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::debug!("worker '{name}' stopped");
        })
        .map_err(|e| anyhow::anyhow!("Cannot spawn worker '{name}': {e}"))?;
    Ok(Worker { name, stop, handle })
}

/// Snapshot under the engine lock, write without it.
fn autosave(
    engine: &Mutex<GardenEngine>,
    persistence: &Mutex<PersistenceManager>,
    preferences: &Mutex<Preferences>,
) -> SimResult<()> {
    let persistence = lock(persistence);
    let doc = lock(engine).save_document(now_millis());
    persistence.write_document(&doc)?;
    let prefs = lock(preferences).clone();
    persistence.save_preferences(&prefs)
}

pub struct GardenRuntime {
    engine: Arc<Mutex<GardenEngine>>,
    persistence: Arc<Mutex<PersistenceManager>>,
    preferences: Arc<Mutex<Preferences>>,
    workers: Vec<Worker>,
}

impl GardenRuntime {
    /// Load the saved game and preferences, then start both workers.
    pub fn start(config: &GardenConfig, persistence: PersistenceManager) -> SimResult<Self> {
        let engine = GardenEngine::load(config, &persistence)?;
        let preferences = persistence.load_preferences()?;
        Self::start_with(
            engine,
            persistence,
            preferences,
            config.tick_interval(),
            config.autosave_interval(),
        )
    }

    pub fn start_with(
        engine: GardenEngine,
        persistence: PersistenceManager,
        preferences: Preferences,
        tick_interval: Duration,
        autosave_interval: Duration,
    ) -> SimResult<Self> {
        let mut runtime = Self {
            engine: Arc::new(Mutex::new(engine)),
            persistence: Arc::new(Mutex::new(persistence)),
            preferences: Arc::new(Mutex::new(preferences)),
            workers: Vec::new(),
        };

        let engine = Arc::clone(&runtime.engine);
        runtime.workers.push(spawn_worker("tick", tick_interval, move || {
            lock(&engine).tick();
        })?);

        let engine = Arc::clone(&runtime.engine);
        let persistence = Arc::clone(&runtime.persistence);
        let preferences = Arc::clone(&runtime.preferences);
        runtime
            .workers
            .push(spawn_worker("autosave", autosave_interval, move || {
                if let Err(e) = autosave(&engine, &persistence, &preferences) {
                    log::warn!("autosave failed: {e}");
                }
            })?);

        log::info!(
            "runtime started: tick every {tick_interval:?}, autosave every {autosave_interval:?}"
        );
        Ok(runtime)
    }

    /// Apply a player command between ticks.
    pub fn execute(&self, command: &PlayerCommand) -> Result<Vec<SimEvent>, CommandError> {
        lock(&self.engine).submit_command(command)
    }

    pub fn state(&self) -> SimulationState {
        lock(&self.engine).snapshot()
    }

    /// Run `f` with exclusive access to the engine (listeners, queries).
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut GardenEngine) -> R) -> R {
        f(&mut lock(&self.engine))
    }

    /// Run `f` against the persistence layer. Blocks autosave meanwhile.
    pub fn with_persistence<R>(&self, f: impl FnOnce(&PersistenceManager) -> R) -> R {
        f(&lock(&self.persistence))
    }

    pub fn preferences(&self) -> Preferences {
        lock(&self.preferences).clone()
    }

    /// Change preferences and save them right away.
    pub fn update_preferences(&self, f: impl FnOnce(&mut Preferences)) -> SimResult<Preferences> {
        let updated = {
            let mut prefs = lock(&self.preferences);
            f(&mut prefs);
            prefs.clone()
        };
        lock(&self.persistence).save_preferences(&updated)?;
        Ok(updated)
    }

    /// Delete the save and start a new game. Preferences stay.
    pub fn reset(&self) -> SimResult<()> {
        let persistence = lock(&self.persistence);
        persistence.delete_save()?;
        lock(&self.engine).reset();
        Ok(())
    }

    pub fn save_now(&self) -> SimResult<()> {
        autosave(&self.engine, &self.persistence, &self.preferences)
    }

    /// Stop both workers and write a final save.
    pub fn shutdown(mut self) -> SimResult<()> {
        self.stop_workers()?;
        self.save_now()?;
        log::info!("runtime stopped");
        Ok(())
    }

    fn stop_workers(&mut self) -> SimResult<()> {
        let mut result = Ok(());
        for worker in self.workers.drain(..) {
            // A worker that already exited has dropped its receiver.
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                log::warn!("worker '{}' panicked", worker.name);
                result = Err(SimError::WorkerPanicked { name: worker.name });
            }
        }
        result
    }
}

impl Drop for GardenRuntime {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        if let Err(e) = self.stop_workers().and_then(|()| self.save_now()) {
            log::warn!("runtime dropped without a clean shutdown: {e}");
        }
    }
}
