//! Per-room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::entities::{Blinds, Chips};

/// Names handed out to bots, in order. Also caps how many bots one room can
/// hold.
pub const BOT_NAMES: [&str; 7] = [
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace",
];

/// Room settings fixed at creation time.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TableConfig {
    /// Seats at the table.
    pub max_players: usize,

    /// Players needed before a hand can start.
    pub min_players: usize,

    /// Stack every player and bot sits down with.
    pub starting_chips: Chips,

    pub small_blind: Chips,
    pub big_blind: Chips,

    /// Pause before a bot acts, so moves are followable by humans.
    pub bot_delay: Duration,

    /// Pause between a hand ending and the next one being dealt.
    pub next_hand_delay: Duration,
}

impl TableConfig {
    #[must_use]
    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
        }
    }

    /// Reject configurations no table could run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < 2 {
            return Err("min_players must be at least 2".to_string());
        }
        if self.max_players < self.min_players {
            return Err("max_players must be at least min_players".to_string());
        }
        if self.small_blind >= self.big_blind {
            return Err("small blind must be below the big blind".to_string());
        }
        if self.starting_chips < self.big_blind {
            return Err("starting stack must cover the big blind".to_string());
        }
        Ok(())
    }

    /// Zero out the scheduling delays; tests drive bots and next hands
    /// without waiting.
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.bot_delay = Duration::ZERO;
        self.next_hand_delay = Duration::ZERO;
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_players: 8,
            min_players: 2,
            starting_chips: 10_000,
            small_blind: 50,
            big_blind: 100,
            bot_delay: Duration::from_secs(1),
            next_hand_delay: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_blinds_rejected() {
        let config = TableConfig {
            small_blind: 100,
            big_blind: 50,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn single_seat_rejected() {
        let config = TableConfig {
            max_players: 1,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
