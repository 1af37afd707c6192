/// Game configuration constants.
///
/// This module defines the board dimensions used by the turn state machine.
pub const BOARD_SIDE: usize = 3; // Cells per row and per column.

/// Number of cells on the board.
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;
