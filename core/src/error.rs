use crate::types::{CellIndex, ItemId, Points};
use thiserror::Error;

/// Rejections of player input. The command is dropped and the
/// state is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Cell {index} is outside the grid (size {size})")]
    InvalidIndex { index: CellIndex, size: usize },

    #[error("Cell {index} is already occupied")]
    Occupied { index: CellIndex },

    #[error("Cell {index} is empty")]
    EmptyCell { index: CellIndex },

    #[error("Item '{item_id}' is not unlocked yet")]
    NotUnlocked { item_id: ItemId },

    #[error("Item '{item_id}' costs {price}, only {available} available")]
    InsufficientFunds {
        item_id: ItemId,
        price: Points,
        available: Points,
    },

    #[error("Item '{item_id}' is not in the catalog")]
    UnknownItem { item_id: ItemId },
}

/// Catalog validation failures, raised when catalog data is loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate item id '{0}'")]
    DuplicateId(ItemId),

    #[error("Starter item '{0}' is not in the catalog")]
    MissingStarter(ItemId),

    #[error("Collector '{0}' has no capacity")]
    MissingCapacity(ItemId),

    #[error("Item '{0}' has a capacity but is not a collector")]
    UnexpectedCapacity(ItemId),

    #[error("Item '{0}' yields currency but is not a producer")]
    YieldOnNonProducer(ItemId),

    #[error("Alias '{alias}' of '{item_id}' collides with another item")]
    AliasCollision { alias: String, item_id: ItemId },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Command rejected: {0}")]
    Command(#[from] CommandError),

    #[error("Runtime worker '{name}' panicked")]
    WorkerPanicked { name: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
