//! Best-hand evaluation: 5-of-7 search, category ranking, and tiebreak keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::entities::{Card, CardValue, VALUE_ACE};
use super::errors::GameError;

/// Hand categories in ascending strength. Royal flush gets its own top
/// category rather than folding into straight flush, applied consistently
/// on both sides of every comparison.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::Pair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        };
        write!(f, "{repr}")
    }
}

/// Total-ordered rank of a five-card hand. Comparison is lexicographic:
/// category first, then the tiebreak key most-significant value first.
/// Equal rank means a true tie (split pot).
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandRank {
    pub category: HandCategory,
    pub tiebreak: Vec<CardValue>,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.category.fmt(f)
    }
}

/// Straight high card for five distinct, sorted-ascending values, if any.
/// The wheel A-2-3-4-5 counts as a straight with high card 5 even though
/// the ace's numeric value is 14.
fn straight_high(sorted_asc: &[CardValue; 5]) -> Option<CardValue> {
    if sorted_asc.windows(2).all(|w| w[1] == w[0] + 1) {
        return Some(sorted_asc[4]);
    }
    if *sorted_asc == [2, 3, 4, 5, VALUE_ACE] {
        return Some(5);
    }
    None
}

/// Rank exactly five cards.
#[must_use]
pub fn score_five(hand: &[Card; 5]) -> HandRank {
    let mut asc: [CardValue; 5] = [
        hand[0].value,
        hand[1].value,
        hand[2].value,
        hand[3].value,
        hand[4].value,
    ];
    asc.sort_unstable();

    let is_flush = hand.iter().all(|c| c.suit == hand[0].suit);
    let straight = straight_high(&asc);

    if let Some(high) = straight
        && is_flush
    {
        let category = if high == VALUE_ACE {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
        return HandRank {
            category,
            tiebreak: vec![high],
        };
    }

    // Group values by multiplicity: highest count first, then highest value.
    let mut counts: BTreeMap<CardValue, u8> = BTreeMap::new();
    for value in asc {
        *counts.entry(value).or_default() += 1;
    }
    let mut groups: Vec<(u8, CardValue)> = counts.iter().map(|(&v, &c)| (c, v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    match (groups[0].0, groups.get(1).map(|g| g.0).unwrap_or(0)) {
        (4, _) => HandRank {
            category: HandCategory::FourOfAKind,
            tiebreak: vec![groups[0].1, groups[1].1],
        },
        (3, 2) => HandRank {
            category: HandCategory::FullHouse,
            tiebreak: vec![groups[0].1, groups[1].1],
        },
        _ if is_flush => HandRank {
            category: HandCategory::Flush,
            tiebreak: descending(&asc),
        },
        _ if straight.is_some() => HandRank {
            category: HandCategory::Straight,
            tiebreak: vec![straight.unwrap_or(0)],
        },
        (3, _) => HandRank {
            category: HandCategory::ThreeOfAKind,
            tiebreak: vec![groups[0].1, groups[1].1, groups[2].1],
        },
        (2, 2) => HandRank {
            category: HandCategory::TwoPair,
            tiebreak: vec![groups[0].1, groups[1].1, groups[2].1],
        },
        (2, _) => HandRank {
            category: HandCategory::Pair,
            tiebreak: vec![groups[0].1, groups[1].1, groups[2].1, groups[3].1],
        },
        _ => HandRank {
            category: HandCategory::HighCard,
            tiebreak: descending(&asc),
        },
    }
}

fn descending(asc: &[CardValue; 5]) -> Vec<CardValue> {
    let mut values = asc.to_vec();
    values.reverse();
    values
}

/// Best five-card rank over 5-7 cards: every C(n,5) subset is scored and the
/// maximum kept.
pub fn best_hand(cards: &[Card]) -> Result<HandRank, GameError> {
    let n = cards.len();
    if n < 5 {
        return Err(GameError::InsufficientCards);
    }
    let mut best: Option<HandRank> = None;
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        let rank =
                            score_five(&[cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        if best.as_ref().is_none_or(|current| rank > *current) {
                            best = Some(rank);
                        }
                    }
                }
            }
        }
    }
    best.ok_or(GameError::InsufficientCards)
}

/// Heuristic pre-flop strength in [0, 1] from two hole cards. Used only for
/// bot decisions, never at showdown.
#[must_use]
pub fn preflop_strength(first: Card, second: Card) -> f64 {
    let hi = first.value.max(second.value);
    let lo = first.value.min(second.value);
    let is_pair = first.value == second.value;
    let is_suited = first.suit == second.suit;
    let is_connected = hi - lo == 1;

    if is_pair && hi >= 10 {
        return 0.9;
    }
    if is_pair && hi >= 7 {
        return 0.75;
    }
    if is_pair {
        return 0.6;
    }
    if is_suited && is_connected && hi >= 10 {
        return 0.8;
    }
    if hi == VALUE_ACE && lo >= 10 {
        return 0.75;
    }
    if hi >= 12 && lo >= 10 {
        return 0.65;
    }
    if is_suited && hi >= 12 {
        return 0.6;
    }
    if is_connected && hi >= 8 {
        return 0.5;
    }
    ((f64::from(hi) + f64::from(lo)) / 28.0).min(0.4)
}

/// Map a made-hand category onto the same [0, 1] strength scale the pre-flop
/// heuristic uses, so the bot policy works in either regime.
#[must_use]
pub fn category_strength(category: HandCategory) -> f64 {
    match category {
        HandCategory::HighCard => 0.1,
        HandCategory::Pair => 0.25,
        HandCategory::TwoPair => 0.40,
        HandCategory::ThreeOfAKind => 0.55,
        HandCategory::Straight => 0.70,
        HandCategory::Flush => 0.75,
        HandCategory::FullHouse => 0.85,
        HandCategory::FourOfAKind => 0.95,
        HandCategory::StraightFlush | HandCategory::RoyalFlush => 0.99,
    }
}

/// Strength of a hole-cards-plus-board combination in [0, 1]. Falls back to
/// the pre-flop heuristic while fewer than five cards are visible.
pub fn hand_strength(hole: &[Card], board: &[Card]) -> Result<f64, GameError> {
    if hole.len() < 2 {
        return Err(GameError::InsufficientCards);
    }
    if hole.len() + board.len() < 5 {
        return Ok(preflop_strength(hole[0], hole[1]));
    }
    let mut cards = hole.to_vec();
    cards.extend_from_slice(board);
    let rank = best_hand(&cards)?;
    Ok(category_strength(rank.category))
}
