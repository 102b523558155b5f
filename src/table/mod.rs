//! Async room layer: one actor task per table, a registry keyed by room
//! code, and the command/event types that cross the actor boundary.

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;
pub mod session;

pub use actor::{SessionActor, SessionHandle};
pub use config::{BOT_NAMES, TableConfig};
pub use messages::{JoinReply, RoomId, ServerMessage, SessionCommand, SessionEvent};
pub use registry::SessionRegistry;
pub use session::TableSession;
