//! Session actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{Action, PlayerId, SeatIndex, TableView};
use crate::game::errors::GameError;
use crate::game::settlement::Payout;

/// Short uppercase room code, shared out-of-band to invite players.
pub type RoomId = String;

/// Commands accepted by a session actor. Every command is processed in
/// arrival order on the actor task; there is no other path to the game
/// state.
#[derive(Debug)]
pub enum SessionCommand {
    /// Seat a new player.
    Join {
        name: String,
        respond_to: oneshot::Sender<Result<JoinReply, GameError>>,
    },

    /// Remove a player; mid-hand they are folded out first.
    Leave {
        player_id: PlayerId,
        respond_to: oneshot::Sender<Result<(), GameError>>,
    },

    /// Seat bots (host only).
    AddBots {
        player_id: PlayerId,
        count: usize,
        respond_to: oneshot::Sender<Result<(), GameError>>,
    },

    /// Deal the first hand (host only).
    StartHand {
        player_id: PlayerId,
        respond_to: oneshot::Sender<Result<(), GameError>>,
    },

    /// A player's betting action.
    TakeAction {
        player_id: PlayerId,
        action: Action,
        respond_to: oneshot::Sender<Result<(), GameError>>,
    },

    /// Snapshot redacted for the given viewer (or fully redacted for none).
    GetState {
        player_id: Option<PlayerId>,
        respond_to: oneshot::Sender<TableView>,
    },

    /// Subscribe to pushed state updates.
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
    },

    /// Stop receiving pushed state updates.
    Unsubscribe { player_id: PlayerId },

    /// Scheduled: let the bot whose turn it is act. Discarded when `seq` no
    /// longer matches the session's, meaning the table moved on.
    BotTurn { seq: u64 },

    /// Scheduled: deal the next hand after the between-hands pause. Same
    /// staleness rule as `BotTurn`.
    NextHand { seq: u64 },

    /// Shut the room down.
    Close {
        respond_to: oneshot::Sender<()>,
    },
}

/// Successful join: the caller's identity plus the room they landed in.
#[derive(Clone, Debug)]
pub struct JoinReply {
    pub player_id: PlayerId,
    pub room_id: RoomId,
}

/// Things that happened at the table, broadcast to subscribers.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    PlayerJoined { name: String },
    PlayerLeft { name: String },
    BotsAdded { count: usize },
    HandStarted,
    ActionApplied { seat_idx: SeatIndex, action: Action },
    HandComplete { payouts: Vec<Payout> },
    RoomClosed,
}

/// One push to one subscriber: the event plus a state snapshot redacted for
/// that subscriber.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerMessage {
    pub event: SessionEvent,
    pub state: TableView,
}
