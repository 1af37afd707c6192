//! Board rules for a single 3×3 round.

pub mod board;
pub mod types;
