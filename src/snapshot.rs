//! Read-only projection of a session for renderers.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Cell, Row};
use crate::game::{ActivePiece, PieceSnapshot};
use crate::pieces::TetrominoKind;

/// What a renderer should draw in one board cell. The falling piece is drawn over
/// the ghost, and the ghost only shows on empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Locked(TetrominoKind),
    Ghost(TetrominoKind),
    Active(TetrominoKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// board[y][x], row 0 on top.
    pub board: Vec<Row>,
    pub piece: Option<ActivePiece>,
    /// Landing row for the falling piece.
    pub ghost_y: Option<i32>,
    pub next: PieceSnapshot,
    pub hold: Option<PieceSnapshot>,
    pub can_hold: bool,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub drop_ms: u64,
    pub game_over: bool,
}

impl Snapshot {
    /// Layered view of cell (x, y).
    pub fn cell(&self, x: usize, y: usize, show_ghost: bool) -> CellView {
        let (xi, yi) = (x as i32, y as i32);
        if let Some(piece) = &self.piece {
            if piece.cells_at(piece.y).any(|c| c == (xi, yi)) {
                return CellView::Active(piece.kind);
            }
        }
        match self.board.get(y).and_then(|row| row.get(x)) {
            Some(Cell::Filled(kind)) => return CellView::Locked(*kind),
            None => return CellView::Empty,
            Some(Cell::Empty) => {}
        }
        if show_ghost {
            if let (Some(piece), Some(gy)) = (&self.piece, self.ghost_y) {
                if piece.cells_at(gy).any(|c| c == (xi, yi)) {
                    return CellView::Ghost(piece.kind);
                }
            }
        }
        CellView::Empty
    }

    /// Whole board as rows of `CellView`, top to bottom.
    pub fn layered(&self, show_ghost: bool) -> Vec<[CellView; BOARD_WIDTH]> {
        (0..BOARD_HEIGHT)
            .map(|y| std::array::from_fn(|x| self.cell(x, y, show_ghost)))
            .collect()
    }
}
