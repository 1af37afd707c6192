//! The 3×3 board and its terminal predicate.

use serde::Serialize;

use crate::config::game::BOARD_CELLS;
use crate::game::types::{Mark, RoundOutcome};

/// Rows, columns, then the two diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    cells: [Option<Mark>; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    /// True if `index` is on the board and nobody has played there.
    pub fn is_free(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    /// Write `mark` into a free cell. Returns false (and changes nothing) otherwise.
    pub fn place(&mut self, index: usize, mark: Mark) -> bool {
        if !self.is_free(index) {
            return false;
        }
        self.cells[index] = Some(mark);
        true
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Mark holding three in a row, if any.
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|&[a, b, c]| match (self.cells[a], self.cells[b], self.cells[c]) {
            (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
            _ => None,
        })
    }

    /// `Some` once the round is over: a line was completed or every cell is taken.
    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.winner() {
            Some(mark) => Some(RoundOutcome::Win(mark)),
            None if self.is_full() => Some(RoundOutcome::Draw),
            None => None,
        }
    }

    pub fn reset(&mut self) {
        self.cells = [None; BOARD_CELLS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(plays: &[(usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(index, mark) in plays {
            assert!(board.place(index, mark));
        }
        board
    }

    #[test]
    fn rejects_occupied_and_out_of_range_cells() {
        let mut board = Board::new();
        assert!(board.place(4, Mark::X));
        assert!(!board.place(4, Mark::O));
        assert!(!board.place(9, Mark::O));
        assert_eq!(board.get(4), Some(Mark::X));
    }

    #[test]
    fn detects_every_line() {
        for line in LINES {
            let plays: Vec<_> = line.iter().map(|&i| (i, Mark::O)).collect();
            assert_eq!(board_from(&plays).outcome(), Some(RoundOutcome::Win(Mark::O)));
        }
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        // X O X / X O O / O X X
        let board = board_from(&[
            (0, Mark::X),
            (1, Mark::O),
            (2, Mark::X),
            (3, Mark::X),
            (4, Mark::O),
            (5, Mark::O),
            (6, Mark::O),
            (7, Mark::X),
            (8, Mark::X),
        ]);
        assert_eq!(board.outcome(), Some(RoundOutcome::Draw));
    }

    #[test]
    fn open_board_has_no_outcome_and_resets() {
        let mut board = board_from(&[(0, Mark::X), (4, Mark::O)]);
        assert_eq!(board.outcome(), None);
        board.reset();
        assert_eq!(board, Board::new());
    }
}
