//! Error taxonomy for room and game operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by session and engine operations.
///
/// Action-level errors (`NotYourTurn`, `IllegalAction`) are recoverable and
/// reported back to the issuing player only; the hand state is left exactly
/// as it was before the command (apply-or-reject, never partial).
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("room is full")]
    RoomFull,
    #[error("room not found")]
    RoomNotFound,
    #[error("only the host can do that")]
    NotAuthorized,
    #[error("need 2+ players")]
    NotEnoughPlayers,
    #[error("hand already in progress")]
    AlreadyStarted,
    #[error("not your turn")]
    NotYourTurn,
    #[error("illegal action: {0}")]
    IllegalAction(String),
    #[error("deck is empty")]
    EmptyDeck,
    #[error("not enough cards to evaluate")]
    InsufficientCards,
    #[error("no such player")]
    UnknownPlayer,
}
