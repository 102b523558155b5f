//! Core value types: cards, the deck, chips, seats, and player views.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::GameError;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hearts => "♥",
            Self::Diamonds => "♦",
            Self::Clubs => "♣",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Numeric card value: 2..=10, J=11, Q=12, K=13, A=14.
pub type CardValue = u8;

pub const VALUE_JACK: CardValue = 11;
pub const VALUE_QUEEN: CardValue = 12;
pub const VALUE_KING: CardValue = 13;
pub const VALUE_ACE: CardValue = 14;

/// A playing card. Equality is by (suit, value).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub value: CardValue,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(value: CardValue, suit: Suit) -> Self {
        Self { value, suit }
    }

    #[must_use]
    pub fn rank_str(&self) -> &'static str {
        match self.value {
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            VALUE_JACK => "J",
            VALUE_QUEEN => "Q",
            VALUE_KING => "K",
            _ => "A",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank_str(), self.suit)
    }
}

/// A 52-card deck, owned exclusively by one hand. Cards are dealt from the
/// top and never returned, so no card can repeat within a hand.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Fresh deck in deterministic suit/value enumeration order.
    #[must_use]
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for value in 2..=VALUE_ACE {
                cards.push(Card::new(value, suit));
            }
        }
        Self { cards }
    }

    /// Fisher-Yates shuffle of the remaining cards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Remove and return the top card.
    pub fn deal(&mut self) -> Result<Card, GameError> {
        self.cards.pop().ok_or(GameError::EmptyDeck)
    }

    /// Deal the top card into the discard pile without exposing it.
    pub fn burn(&mut self) -> Result<(), GameError> {
        self.deal().map(|_| ())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole chips. If a table ever holds more than ~4.2 billion chips we have
/// bigger problems than overflow.
pub type Chips = u32;

/// Seat position at the table. Seat order is join order and defines the
/// blind/dealer rotation.
pub type SeatIndex = usize;

/// Stable player identifier, persistent across hands.
pub type PlayerId = Uuid;

/// The betting phases of one hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandPhase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl fmt::Display for HandPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// A player's move during a betting round. `Raise` carries the total bet
/// level for the round, not the increment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "lowercase")]
pub enum Action {
    Check,
    Call,
    Raise(Chips),
    Fold,
    AllIn,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "checks".to_string(),
            Self::Call => "calls".to_string(),
            Self::Raise(amount) => format!("raises to {amount}"),
            Self::Fold => "folds".to_string(),
            Self::AllIn => "goes all-in".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// Forced bet levels posted before cards are seen.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

/// One seat at the table. Owned exclusively by its session; removed from the
/// session when the player leaves or disconnects.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub seat_idx: SeatIndex,
    pub is_bot: bool,
    pub is_host: bool,
    /// 0 or 2 hole cards.
    pub hole_cards: Vec<Card>,
    /// Chips committed this betting round.
    pub current_bet: Chips,
    /// Chips committed this hand, across all rounds.
    pub total_committed: Chips,
    pub has_acted: bool,
    pub is_folded: bool,
    pub is_all_in: bool,
}

impl Player {
    #[must_use]
    pub fn new(name: &str, chips: Chips, seat_idx: SeatIndex, is_bot: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            chips,
            seat_idx,
            is_bot,
            is_host: false,
            hole_cards: Vec::with_capacity(2),
            current_bet: 0,
            total_committed: 0,
            has_acted: false,
            is_folded: false,
            is_all_in: false,
        }
    }

    /// Reset per-hand state. Busted seats (zero chips) sit the hand out as
    /// folded so turn advancement skips them.
    pub fn reset_for_hand(&mut self) {
        self.hole_cards.clear();
        self.current_bet = 0;
        self.total_committed = 0;
        self.has_acted = false;
        self.is_all_in = false;
        self.is_folded = self.chips == 0;
    }

    /// Still holding cards in this hand.
    #[must_use]
    pub fn in_hand(&self) -> bool {
        !self.is_folded
    }

    /// Still able to act: neither folded nor all-in.
    #[must_use]
    pub fn is_contesting(&self) -> bool {
        !self.is_folded && !self.is_all_in
    }
}

/// One player as seen by a snapshot recipient; hole cards are present only
/// in the recipient's own entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub seat_idx: SeatIndex,
    pub is_bot: bool,
    pub is_host: bool,
    pub current_bet: Chips,
    pub total_committed: Chips,
    pub is_folded: bool,
    pub is_all_in: bool,
    pub hole_cards: Vec<Card>,
}

/// Public state snapshot sent to one player. Other players' hole cards are
/// redacted; a player only ever sees their own hand plus the board.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TableView {
    pub room_id: String,
    pub phase: HandPhase,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub current_seat: Option<SeatIndex>,
    pub dealer_seat: SeatIndex,
    pub hand_active: bool,
    pub players: Vec<PlayerView>,
}
