//! Garden grid: fixed 5×5 placement board and its adjacency topology.
//!
//! Cells are stored row-major. Adjacency is orthogonal only and clipped
//! at the borders (no wraparound).

use crate::{
    error::CommandError,
    types::{CellIndex, ItemId, Timestamp},
};
use serde::{Deserialize, Serialize};

pub const GRID_WIDTH: usize = 5;
pub const GRID_SIZE: usize = GRID_WIDTH * GRID_WIDTH;

/// An item standing in a cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacedItem {
    pub item_id: ItemId,
    pub placed_at: Timestamp,
    /// Units held by a collector. Always 0 for other categories.
    pub accumulated_units: u64,
}

impl PlacedItem {
    pub fn new(item_id: ItemId, placed_at: Timestamp) -> Self {
        Self {
            item_id,
            placed_at,
            accumulated_units: 0,
        }
    }
}

pub fn row_of(index: CellIndex) -> usize {
    index / GRID_WIDTH
}

pub fn col_of(index: CellIndex) -> usize {
    index % GRID_WIDTH
}

/// True when two cells lie on the same row or the same column.
pub fn shares_line(a: CellIndex, b: CellIndex) -> bool {
    row_of(a) == row_of(b) || col_of(a) == col_of(b)
}

/// Orthogonal neighbours of `index` on the garden grid.
pub fn neighbors(index: CellIndex) -> Vec<CellIndex> {
    neighbors_in(index, GRID_WIDTH, GRID_SIZE)
}

/// Orthogonal neighbours on an arbitrary row-major grid of `size` cells
/// laid out `width` per row. Order: up, right, down, left.
/// Returns nothing for an index outside the grid.
pub fn neighbors_in(index: CellIndex, width: usize, size: usize) -> Vec<CellIndex> {
    if width == 0 || index >= size {
        return Vec::new();
    }
    let row = index / width;
    let col = index % width;
    let mut out = Vec::with_capacity(4);

    if row > 0 {
        out.push(index - width);
    }
    if col + 1 < width && index + 1 < size {
        out.push(index + 1);
    }
    if index + width < size {
        out.push(index + width);
    }
    if col > 0 {
        out.push(index - 1);
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Option<PlacedItem>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: vec![None; GRID_SIZE],
        }
    }

    /// Build a grid from a possibly mis-sized cell list: short lists are
    /// padded with empty cells, long lists are truncated.
    pub fn from_cells(mut cells: Vec<Option<PlacedItem>>) -> Self {
        cells.resize(GRID_SIZE, None);
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn check_index(&self, index: CellIndex) -> Result<(), CommandError> {
        if index < self.cells.len() {
            Ok(())
        } else {
            Err(CommandError::InvalidIndex {
                index,
                size: self.cells.len(),
            })
        }
    }

    pub fn get(&self, index: CellIndex) -> Option<&PlacedItem> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: CellIndex) -> Option<&mut PlacedItem> {
        self.cells.get_mut(index).and_then(Option::as_mut)
    }

    pub fn is_occupied(&self, index: CellIndex) -> bool {
        self.get(index).is_some()
    }

    pub fn place(&mut self, index: CellIndex, item: PlacedItem) -> Result<(), CommandError> {
        self.check_index(index)?;
        let cell = &mut self.cells[index];
        if cell.is_some() {
            return Err(CommandError::Occupied { index });
        }
        *cell = Some(item);
        Ok(())
    }

    pub fn remove(&mut self, index: CellIndex) -> Result<PlacedItem, CommandError> {
        self.check_index(index)?;
        self.cells[index]
            .take()
            .ok_or(CommandError::EmptyCell { index })
    }

    /// Occupied cells in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellIndex, &PlacedItem)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|p| (i, p)))
    }

    /// Items standing orthogonally next to `index`.
    pub fn adjacent(&self, index: CellIndex) -> impl Iterator<Item = (CellIndex, &PlacedItem)> {
        neighbors(index)
            .into_iter()
            .filter_map(move |n| self.get(n).map(|p| (n, p)))
    }

    pub fn cells(&self) -> &[Option<PlacedItem>] {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }
}
