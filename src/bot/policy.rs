//! Threshold-based bot decisions driven by the heuristic hand strength from
//! the evaluator.

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::entities::{Action, Chips};

/// Everything a bot sees when deciding: its cards are already folded into
/// `strength`, so only the money situation remains.
#[derive(Clone, Copy, Debug)]
pub struct BotContext {
    /// Heuristic strength in `[0, 1]` from [`crate::game::hand_strength`].
    pub strength: f64,
    /// Chips owed to match the table bet; zero means a check is free.
    pub call_amount: Chips,
    /// The table's current bet level, used to size raises.
    pub table_bet: Chips,
    /// Fallback raise size when nobody has bet yet.
    pub big_blind: Chips,
}

/// Strength-threshold policy with a dash of randomness so bots are not
/// perfectly predictable. Owns its RNG: seed it for reproducible games.
#[derive(Debug)]
pub struct BotPolicy {
    rng: StdRng,
}

impl BotPolicy {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Pick an action. Never returns an out-of-turn or undersized move: the
    /// raise target always exceeds the table bet and the betting engine
    /// clamps it to the bot's stack.
    pub fn decide(&mut self, ctx: BotContext) -> Action {
        let free = ctx.call_amount == 0;
        let action = if ctx.strength >= 0.8 {
            if self.rng.random_bool(0.5) {
                Action::Raise(raise_target(ctx))
            } else if free {
                Action::Check
            } else {
                Action::Call
            }
        } else if ctx.strength >= 0.6 {
            if free {
                Action::Check
            } else if self.rng.random_bool(0.7) {
                Action::Call
            } else {
                Action::Fold
            }
        } else if ctx.strength >= 0.4 {
            if free {
                Action::Check
            } else if self.rng.random_bool(0.3) {
                Action::Call
            } else {
                Action::Fold
            }
        } else if free {
            Action::Check
        } else {
            Action::Fold
        };
        trace!(
            "bot strength={:.2} owes={} -> {action}",
            ctx.strength, ctx.call_amount
        );
        action
    }
}

/// Double the table bet, or open for a big blind when checking is free.
fn raise_target(ctx: BotContext) -> Chips {
    if ctx.table_bet == 0 {
        ctx.big_blind
    } else {
        ctx.table_bet * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(strength: f64, call_amount: Chips, table_bet: Chips) -> BotContext {
        BotContext {
            strength,
            call_amount,
            table_bet,
            big_blind: 100,
        }
    }

    #[test]
    fn weak_hand_folds_to_a_bet_and_checks_for_free() {
        let mut policy = BotPolicy::from_seed(1);
        for _ in 0..50 {
            assert_eq!(policy.decide(ctx(0.2, 100, 100)), Action::Fold);
            assert_eq!(policy.decide(ctx(0.2, 0, 0)), Action::Check);
        }
    }

    #[test]
    fn strong_hand_never_folds() {
        let mut policy = BotPolicy::from_seed(7);
        for _ in 0..200 {
            let action = policy.decide(ctx(0.9, 100, 100));
            assert!(matches!(action, Action::Call | Action::Raise(_)));
        }
    }

    #[test]
    fn raises_double_the_table_bet() {
        let mut policy = BotPolicy::from_seed(3);
        let raise = std::iter::repeat_with(|| policy.decide(ctx(0.95, 100, 100)))
            .find_map(|action| match action {
                Action::Raise(amount) => Some(amount),
                _ => None,
            })
            .unwrap();
        assert_eq!(raise, 200);
    }

    #[test]
    fn opens_for_the_big_blind_when_unbet() {
        let mut policy = BotPolicy::from_seed(3);
        let raise = std::iter::repeat_with(|| policy.decide(ctx(0.95, 0, 0)))
            .find_map(|action| match action {
                Action::Raise(amount) => Some(amount),
                _ => None,
            })
            .unwrap();
        assert_eq!(raise, 100);
    }

    #[test]
    fn same_seed_same_decisions() {
        let decisions = |seed| {
            let mut policy = BotPolicy::from_seed(seed);
            (0..20)
                .map(|_| policy.decide(ctx(0.7, 50, 100)))
                .collect::<Vec<_>>()
        };
        assert_eq!(decisions(11), decisions(11));
    }

    #[test]
    fn middling_hand_sometimes_calls_sometimes_folds() {
        let mut policy = BotPolicy::from_seed(5);
        let actions: Vec<Action> = (0..100).map(|_| policy.decide(ctx(0.5, 50, 100))).collect();
        assert!(actions.contains(&Action::Call));
        assert!(actions.contains(&Action::Fold));
    }
}
