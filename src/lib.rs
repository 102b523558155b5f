//! # Holdem Engine
//!
//! A Texas Hold'em table engine: private rooms with join codes, a full
//! betting state machine, side-pot settlement, and bot opponents.
//!
//! Each room is a tokio actor owning a synchronous [`table::TableSession`];
//! every join, action, and scheduled bot move is a command on the actor's
//! inbox, processed strictly in arrival order. Players receive pushed
//! state snapshots redacted per recipient, so nobody's hole cards ever
//! leave the server before a contested showdown.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hand evaluation, betting rounds, pot settlement
//! - [`bot`]: automated opponents
//! - [`table`]: room sessions, the actor layer, and the room registry
//!
//! ## Example
//!
//! ```no_run
//! use holdem_engine::table::{SessionRegistry, TableConfig};
//!
//! # async fn demo() -> Result<(), holdem_engine::GameError> {
//! let registry = SessionRegistry::new();
//! let (room_id, host) = registry
//!     .create_room("ana", TableConfig::default(), None)
//!     .await?;
//! let handle = registry.room(&room_id).await?;
//! handle.add_bots(host.player_id, 2).await?;
//! handle.start_hand(host.player_id).await?;
//! # Ok(())
//! # }
//! ```

/// Automated opponents.
pub mod bot;
pub use bot::BotPolicy;

/// Core game logic and entities.
pub mod game;
pub use game::{
    Action, BettingEngine, Blinds, Card, Chips, Deck, GameError, HandCategory, HandPhase,
    HandRank, Payout, Player, PlayerId, SeatIndex, Suit, TableView, best_hand, hand_strength,
};

/// Room sessions, actors, and the registry.
pub mod table;
pub use table::{SessionHandle, SessionRegistry, TableConfig, TableSession};
