//! Piece catalog: the seven tetrominoes and their immutable shape matrices.

/// Largest side of any tetromino bounding box.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Tetromino kinds (I, O, T, S, Z, J, L). The kind doubles as the colour tag of locked cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Canonical rotation-0 shape.
    pub fn shape(self) -> Shape {
        match self {
            Self::I => Shape::from_rows(&[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]]),
            Self::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            Self::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]]),
            Self::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
            Self::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
            Self::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]]),
            Self::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]]),
        }
    }

    /// Index 0..7 into the theme's piece colours.
    pub fn color_index(self) -> usize {
        match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::S => 3,
            Self::Z => 4,
            Self::J => 5,
            Self::L => 6,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::T => 'T',
            Self::S => 'S',
            Self::Z => 'Z',
            Self::J => 'J',
            Self::L => 'L',
        }
    }
}

/// Boolean occupancy matrix of `rows` x `cols`, stored in a fixed 4x4 block.
///
/// Shapes are values: rotating produces a new `Shape` and never touches the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    fn from_rows(rows: &[&[u8]]) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                cells[r][c] = v != 0;
            }
        }
        Self {
            rows: rows.len(),
            cols: rows.first().map_or(0, |r| r.len()),
            cells,
        }
    }

    #[inline]
    #[cfg(test)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[cfg(test)]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row][col]
    }

    /// Occupied cells as (col, row) offsets from the top-left anchor.
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (c as i32, r as i32))
        })
    }

    /// Clockwise quarter turn: `new[col][rows - 1 - row] = old[row][col]`.
    #[must_use]
    pub fn rotated_cw(&self) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for r in 0..self.rows {
            for c in 0..self.cols {
                cells[c][self.rows - 1 - r] = self.cells[r][c];
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_four_cells() {
        for kind in TetrominoKind::ALL {
            assert_eq!(kind.shape().filled_cells().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn catalog_dimensions() {
        assert_eq!((TetrominoKind::I.shape().rows(), TetrominoKind::I.shape().cols()), (4, 4));
        assert_eq!((TetrominoKind::O.shape().rows(), TetrominoKind::O.shape().cols()), (2, 2));
        assert_eq!((TetrominoKind::T.shape().rows(), TetrominoKind::T.shape().cols()), (3, 3));
    }

    #[test]
    fn t_rotates_clockwise() {
        let r = TetrominoKind::T.shape().rotated_cw();
        // .#.      .#.
        // ###  ->  .##
        // ...      .#.
        let cells: Vec<_> = r.filled_cells().collect();
        assert_eq!(cells, vec![(1, 0), (1, 1), (2, 1), (1, 2)]);
    }

    #[test]
    fn four_turns_are_identity() {
        for kind in TetrominoKind::ALL {
            let s = kind.shape();
            let back = s.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
            assert_eq!(s, back, "{kind:?}");
        }
    }

    #[test]
    fn rotation_leaves_original_untouched() {
        let s = TetrominoKind::L.shape();
        let _ = s.rotated_cw();
        assert_eq!(s, TetrominoKind::L.shape());
    }

    #[test]
    fn color_indices_are_distinct() {
        let mut seen = [false; 7];
        for kind in TetrominoKind::ALL {
            assert!(!seen[kind.color_index()]);
            seen[kind.color_index()] = true;
        }
    }
}
