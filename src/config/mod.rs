/// Main configuration module.
///
/// Re-exports submodules for game, matchmaking, flood-protection and server configuration.
pub mod anti_spam;
pub mod game;
pub mod matchmaking;
pub mod server;

pub use server::AppConfig;
