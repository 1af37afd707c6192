/// Matchmaking configuration constants.
///
/// This module defines the defaults for the continue/rematch negotiation window
/// and the statistics lookups issued around it.
pub const PROMPT_TIMEOUT_SECS: u64 = 60; // Unanswered prompts count as "leave" after this delay.

/// Upper bound (in milliseconds) for a display-only statistics fetch.
pub const STATS_TIMEOUT_MS: u64 = 2000;

/// Number of players listed by the rankings endpoint.
pub const RANKINGS_LIMIT: usize = 10;
