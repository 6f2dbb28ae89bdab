//! Board: fixed grid of locked cells, collision, locking and line clears.

use crate::pieces::{Shape, TetrominoKind};
use std::collections::VecDeque;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// Single cell: either empty or filled by a locked piece of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(TetrominoKind),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

pub type Row = [Cell; BOARD_WIDTH];

/// Playfield: grid of cells. y=0 is top; rows are stored [0..BOARD_HEIGHT].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Row>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: (0..BOARD_HEIGHT).map(|_| [Cell::Empty; BOARD_WIDTH]).collect(),
        }
    }

    /// Cell at (x, y), `None` when outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[cfg(test)]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(row) = self.rows.get_mut(y) {
            if x < BOARD_WIDTH {
                row[x] = cell;
            }
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// True if any filled cell of `shape` anchored at (x, y) leaves the side or bottom
    /// walls or overlaps a locked cell. Cells above the top edge never collide.
    pub fn collides(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape.filled_cells().any(|(dx, dy)| {
            let (bx, by) = (x + dx, y + dy);
            if bx < 0 || bx >= BOARD_WIDTH as i32 || by >= BOARD_HEIGHT as i32 {
                return true;
            }
            by >= 0 && self.get(bx, by).is_some_and(Cell::is_filled)
        })
    }

    /// Write the shape's cells into the grid. Cells above row 0 are dropped.
    pub fn lock(&mut self, shape: &Shape, x: i32, y: i32, kind: TetrominoKind) {
        for (dx, dy) in shape.filled_cells() {
            let (bx, by) = (x + dx, y + dy);
            let (Ok(bx), Ok(by)) = (usize::try_from(bx), usize::try_from(by)) else {
                continue;
            };
            if let Some(row) = self.rows.get_mut(by) {
                if let Some(cell) = row.get_mut(bx) {
                    *cell = Cell::Filled(kind);
                }
            }
        }
    }

    /// Indices of every completely filled row, top to bottom.
    pub fn full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|c| c.is_filled()))
            .map(|(y, _)| y)
            .collect()
    }

    /// Remove all full rows, inserting empty rows on top. Surviving rows keep their order.
    pub fn clear_full_lines(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().all(|c| c.is_filled()));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front([Cell::Empty; BOARD_WIDTH]);
        }
        cleared
    }

    /// Coordinates of every filled cell.
    #[cfg(test)]
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, c)| c.is_filled())
                .map(move |(x, _)| (x, y))
        })
    }
}
