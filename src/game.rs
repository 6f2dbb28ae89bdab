//! Game session: board, falling piece, next/hold slots, score and level.

use crate::bag::Bag;
use crate::board::{BOARD_WIDTH, Board};
use crate::pieces::{Shape, TetrominoKind};
use crate::scoring::Scoring;
use crate::snapshot::Snapshot;

/// Rotation kick order: in place, left, right, up one row, two left, two right.
const WALL_KICKS: [(i32, i32); 6] = [(0, 0), (-1, 0), (1, 0), (0, -1), (-2, 0), (2, 0)];

/// A piece detached from the board (next preview, hold slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSnapshot {
    pub kind: TetrominoKind,
    pub shape: Shape,
}

impl PieceSnapshot {
    pub fn fresh(kind: TetrominoKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
        }
    }
}

/// Falling piece; (x, y) is the top-left corner of its shape matrix in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: TetrominoKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Centered horizontally on row 0.
    fn spawned(piece: PieceSnapshot) -> Self {
        Self {
            kind: piece.kind,
            shape: piece.shape,
            x: (BOARD_WIDTH / 2) as i32 - (piece.shape.cols() / 2) as i32,
            y: 0,
        }
    }

    fn detached(&self) -> PieceSnapshot {
        PieceSnapshot {
            kind: self.kind,
            shape: self.shape,
        }
    }

    /// Board coordinates of the piece's filled cells when anchored at row `y`.
    pub fn cells_at(&self, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled_cells()
            .map(move |(dx, dy)| (self.x + dx, y + dy))
    }
}

/// Rows removed by the most recent lock and the points they earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    /// Row indices as they were on the board before clearing.
    pub rows: Vec<usize>,
    pub points: u32,
}

/// Game state: playfield, current piece, next piece, hold slot, score, level.
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    bag: Bag,
    piece: Option<ActivePiece>,
    next: PieceSnapshot,
    hold: Option<PieceSnapshot>,
    can_hold: bool,
    scoring: Scoring,
    game_over: bool,
    pieces_locked: u64,
    last_clear: Option<LineClear>,
    seed: u64,
}

impl Session {
    pub fn new(seed: u64, initial_level: u32) -> Self {
        let mut bag = Bag::new(seed);
        let first = bag.draw();
        let next = PieceSnapshot::fresh(bag.draw());
        let mut session = Self {
            board: Board::new(),
            bag,
            piece: None,
            next,
            hold: None,
            can_hold: true,
            scoring: Scoring::new(initial_level),
            game_over: false,
            pieces_locked: 0,
            last_clear: None,
            seed,
        };
        session.spawn(first);
        session
    }

    #[cfg(test)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn piece(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    #[cfg(test)]
    pub fn next(&self) -> PieceSnapshot {
        self.next
    }

    #[cfg(test)]
    pub fn held(&self) -> Option<PieceSnapshot> {
        self.hold
    }

    #[cfg(test)]
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn level(&self) -> u32 {
        self.scoring.level()
    }

    #[cfg(test)]
    pub fn lines(&self) -> u32 {
        self.scoring.lines()
    }

    pub fn drop_ms(&self) -> u64 {
        self.scoring.drop_ms()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Incremented on every lock; lets the driver notice lock-and-advance.
    pub fn pieces_locked(&self) -> u64 {
        self.pieces_locked
    }

    /// Line clear from the most recent lock, `None` if that lock cleared nothing.
    pub fn last_clear(&self) -> Option<&LineClear> {
        self.last_clear.as_ref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Put a fresh `kind` at the spawn position.
    pub fn spawn(&mut self, kind: TetrominoKind) {
        if self.game_over {
            return;
        }
        let active = ActivePiece::spawned(PieceSnapshot::fresh(kind));
        self.can_hold = true;
        if self.board.collides(&active.shape, active.x, active.y) {
            self.game_over = true;
            log::info!(
                "game over: score {}, level {}, lines {}",
                self.scoring.score(),
                self.scoring.level(),
                self.scoring.lines()
            );
        }
        self.piece = Some(active);
    }

    /// Translate the piece. A blocked downward move locks it and brings in the next piece.
    /// Returns whether the piece moved.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        if !self.board.collides(&piece.shape, piece.x + dx, piece.y + dy) {
            piece.x += dx;
            piece.y += dy;
            return true;
        }
        if dy > 0 {
            self.lock_and_advance();
        }
        false
    }

    pub fn move_left(&mut self) -> bool {
        self.move_by(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_by(1, 0)
    }

    pub fn soft_drop(&mut self) -> bool {
        self.move_by(0, 1)
    }

    fn lock_and_advance(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        self.board.lock(&piece.shape, piece.x, piece.y, piece.kind);
        let rows = self.board.full_rows();
        let cleared = self.board.clear_full_lines();
        let points = self.scoring.add_line_clear(cleared);
        self.pieces_locked += 1;
        log::debug!(
            "locked {} at ({}, {}), cleared {cleared} (+{points})",
            piece.kind.letter(),
            piece.x,
            piece.y
        );
        self.last_clear = (cleared > 0).then_some(LineClear { rows, points });

        let promoted = self.next.kind;
        self.next = PieceSnapshot::fresh(self.bag.draw());
        self.spawn(promoted);
    }

    /// Rotate clockwise, trying each wall kick in order. A rotation with no free
    /// kick is discarded and the piece is left exactly as it was.
    pub fn rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = self.piece.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated_cw();
        for (kx, ky) in WALL_KICKS {
            if !self.board.collides(&rotated, piece.x + kx, piece.y + ky) {
                piece.shape = rotated;
                piece.x += kx;
                piece.y += ky;
                return true;
            }
        }
        false
    }

    /// Drop until the piece locks. Scores one point per row fallen; returns that distance.
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over || self.piece.is_none() {
            return 0;
        }
        let mut distance = 0;
        while self.move_by(0, 1) {
            distance += 1;
        }
        self.scoring.add_drop(distance);
        distance
    }

    /// Bank the falling piece. Allowed once per spawned piece; an empty slot pulls in the
    /// next piece, otherwise the held piece comes back at the spawn position.
    pub fn hold(&mut self) -> bool {
        if self.game_over || !self.can_hold {
            return false;
        }
        let Some(current) = self.piece else {
            return false;
        };
        let incoming = ActivePiece::spawned(self.hold.unwrap_or(self.next));
        if self.board.collides(&incoming.shape, incoming.x, incoming.y) {
            return false;
        }
        if self.hold.is_none() {
            self.next = PieceSnapshot::fresh(self.bag.draw());
        }
        self.hold = Some(current.detached());
        self.piece = Some(incoming);
        self.can_hold = false;
        true
    }

    /// Row the falling piece would land on with a hard drop.
    pub fn ghost_y(&self) -> Option<i32> {
        let piece = self.piece.as_ref()?;
        let mut y = piece.y;
        while !self.board.collides(&piece.shape, piece.x, y + 1) {
            y += 1;
        }
        Some(y)
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.rows().copied().collect(),
            piece: self.piece,
            ghost_y: self.ghost_y(),
            next: self.next,
            hold: self.hold,
            can_hold: self.can_hold,
            score: self.scoring.score(),
            level: self.scoring.level(),
            lines: self.scoring.lines(),
            drop_ms: self.scoring.drop_ms(),
            game_over: self.game_over,
        }
    }
}
