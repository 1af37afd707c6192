//! Session coordinator: admission, queueing, turn arbitration, seat replacement and
//! the continue/rematch negotiation.

pub mod error;
pub mod messages;
pub mod queue;
pub mod server;
pub mod session;
pub mod state;
pub mod types;


pub use server::CoordinatorActor;
pub use types::ConnectionId;
