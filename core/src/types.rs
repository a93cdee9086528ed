//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one second of garden time.
pub type Tick = u64;

/// Index of a cell in the garden grid, row-major.
pub type CellIndex = usize;

/// Stable identifier of a catalog item, e.g. "lime_tree".
pub type ItemId = String;

/// Whole currency units ("points").
pub type Points = u64;

/// Wall-clock time in milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Current wall-clock time. Only used for bookkeeping fields
/// (placement and save times), never for simulation math.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
