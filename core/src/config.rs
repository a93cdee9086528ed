use crate::catalog::{CatalogFile, ItemCatalog};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_SAVE_SLOT: &str = "default";

/// On-disk shape of `runtime.json`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RuntimeFile {
    tick_interval_ms: u64,
    autosave_interval_ms: u64,
    save_slot: String,
}

impl Default for RuntimeFile {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            save_slot: DEFAULT_SAVE_SLOT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GardenConfig {
    pub catalog: ItemCatalog,
    pub tick_interval_ms: u64,
    pub autosave_interval_ms: u64,
    pub save_slot: String,
}

impl GardenConfig {
    /// Load from the data/ directory.
    /// In tests, use GardenConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let catalog_path = format!("{data_dir}/catalog/items.json");
        let catalog_content = std::fs::read_to_string(&catalog_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {catalog_path}: {e}"))?;
        let catalog_file: CatalogFile = serde_json::from_str(&catalog_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {catalog_path}: {e}"))?;
        let catalog = ItemCatalog::from_file(catalog_file)
            .map_err(|e| anyhow::anyhow!("Invalid catalog {catalog_path}: {e}"))?;

        let runtime_path = format!("{data_dir}/runtime.json");
        let runtime = match std::fs::read_to_string(&runtime_path) {
            Ok(content) => serde_json::from_str::<RuntimeFile>(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse {runtime_path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RuntimeFile::default(),
            Err(e) => anyhow::bail!("Cannot read {runtime_path}: {e}"),
        };
        anyhow::ensure!(
            runtime.tick_interval_ms > 0 && runtime.autosave_interval_ms > 0,
            "{runtime_path}: intervals must be positive"
        );

        log::debug!(
            "config: {} catalog items, tick every {} ms, autosave every {} ms",
            catalog.len(),
            runtime.tick_interval_ms,
            runtime.autosave_interval_ms
        );

        Ok(Self {
            catalog,
            tick_interval_ms: runtime.tick_interval_ms,
            autosave_interval_ms: runtime.autosave_interval_ms,
            save_slot: runtime.save_slot,
        })
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let runtime = RuntimeFile::default();
        Self {
            catalog: ItemCatalog::standard(),
            tick_interval_ms: runtime.tick_interval_ms,
            autosave_interval_ms: runtime.autosave_interval_ms,
            save_slot: runtime.save_slot,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }
}
