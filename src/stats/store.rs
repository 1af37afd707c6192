use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Result of one finished round from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub username: String,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub winrate: f64,
}

impl PlayerStats {
    fn empty(username: &str) -> Self {
        Self { username: username.to_string(), ..Self::default() }
    }

    fn apply(&mut self, result: GameResult) {
        self.games_played += 1;
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
        self.winrate = f64::from(self.wins) / f64::from(self.games_played.max(1));
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("statistics store unavailable: {0}")]
    Unavailable(String),
    #[error("statistics lookup timed out")]
    Timeout,
}

/// Persistent win/draw/loss counters keyed by display name.
pub trait StatsStore: 'static {
    fn record_outcome(
        &self,
        username: &str,
        result: GameResult,
    ) -> impl Future<Output = Result<(), StatsError>>;

    fn get_stats(&self, username: &str) -> impl Future<Output = Result<PlayerStats, StatsError>>;

    /// Players with at least one game, best winrate first, ties broken by games played.
    fn rankings(&self, limit: usize) -> impl Future<Output = Result<Vec<PlayerStats>, StatsError>>;
}

/// Process-local store. Names compare case-insensitively; unknown names report zeroes.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    players: RwLock<HashMap<String, PlayerStats>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for MemoryStatsStore {
    async fn record_outcome(&self, username: &str, result: GameResult) -> Result<(), StatsError> {
        let mut players = self.players.write().await;
        players
            .entry(username.to_lowercase())
            .or_insert_with(|| PlayerStats::empty(username))
            .apply(result);
        Ok(())
    }

    async fn get_stats(&self, username: &str) -> Result<PlayerStats, StatsError> {
        let players = self.players.read().await;
        Ok(players
            .get(&username.to_lowercase())
            .cloned()
            .unwrap_or_else(|| PlayerStats::empty(username)))
    }

    async fn rankings(&self, limit: usize) -> Result<Vec<PlayerStats>, StatsError> {
        let players = self.players.read().await;
        let mut ranked: Vec<_> = players
            .values()
            .filter(|stats| stats.games_played > 0)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| {
            b.winrate
                .total_cmp(&a.winrate)
                .then(b.games_played.cmp(&a.games_played))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}
