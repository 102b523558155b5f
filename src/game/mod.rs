//! Core game logic: cards, hand evaluation, betting, and settlement. All of
//! it synchronous and deterministic given an RNG; the async table layer
//! lives in [`crate::table`].

pub mod betting;
pub mod entities;
pub mod errors;
pub mod evaluator;
pub mod settlement;

pub use betting::{ActionOutcome, BettingEngine};
pub use entities::{
    Action, Blinds, Card, CardValue, Chips, Deck, HandPhase, Player, PlayerId, PlayerView,
    SeatIndex, Suit, TableView,
};
pub use errors::GameError;
pub use evaluator::{HandCategory, HandRank, best_hand, hand_strength};
pub use settlement::Payout;
