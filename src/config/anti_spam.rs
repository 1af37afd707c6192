/// Configuration for inbound flood protection and connection liveness.
/// All values are in seconds or counts per second.
pub const MAX_REQUESTS_PER_SECOND: u32 = 30;
pub const HEARTBEAT_INTERVAL_SECS: u64 = 5;
pub const CLIENT_TIMEOUT_SECS: u64 = 15;
