//! End-of-hand settlement: side-pot construction from per-player
//! commitments, showdown comparison, and chip distribution.

use log::debug;
use serde::{Deserialize, Serialize};

use super::entities::{Card, Chips, Player, SeatIndex};
use super::errors::GameError;
use super::evaluator::{self, HandRank};

/// One seat's winnings from a settled hand. `rank` is absent when the pot
/// went uncontested and no cards were shown.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payout {
    pub seat_idx: SeatIndex,
    pub amount: Chips,
    pub rank: Option<HandRank>,
}

/// Settle a finished hand: build pot tiers from contribution ceilings, award
/// each tier to the best eligible hand, and credit winners' stacks.
///
/// Every chip committed this hand (folded seats included) is paid out; when
/// a tier splits unevenly the odd chips go to tied winners in clockwise
/// order starting left of the button.
pub fn settle(
    players: &mut [Player],
    board: &[Card],
    dealer_seat: SeatIndex,
) -> Result<Vec<Payout>, GameError> {
    let contenders: Vec<SeatIndex> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.in_hand())
        .map(|(idx, _)| idx)
        .collect();
    let total: Chips = players.iter().map(|p| p.total_committed).sum();

    // Uncontested: last player standing takes everything unseen.
    if let [winner] = contenders[..] {
        players[winner].chips += total;
        debug!("seat {winner} wins {total} uncontested");
        return Ok(vec![Payout {
            seat_idx: winner,
            amount: total,
            rank: None,
        }]);
    }

    let mut ranks: Vec<(SeatIndex, HandRank)> = Vec::with_capacity(contenders.len());
    for &seat in &contenders {
        let mut cards = players[seat].hole_cards.clone();
        cards.extend_from_slice(board);
        ranks.push((seat, evaluator::best_hand(&cards)?));
    }

    // Tier ceilings: the distinct commitment levels among contenders. Each
    // tier takes from every seat the slice of its commitment between the
    // previous ceiling and this one, and only contenders committed to the
    // ceiling can win it.
    let mut levels: Vec<Chips> = contenders
        .iter()
        .map(|&seat| players[seat].total_committed)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut won = vec![0 as Chips; players.len()];
    let mut prev = 0;
    let mut distributed = 0;
    for &level in &levels {
        let amount: Chips = players
            .iter()
            .map(|p| p.total_committed.min(level) - p.total_committed.min(prev))
            .sum();
        prev = level;
        if amount == 0 {
            continue;
        }
        distributed += amount;

        let eligible: Vec<SeatIndex> = contenders
            .iter()
            .copied()
            .filter(|&seat| players[seat].total_committed >= level)
            .collect();
        award_tier(&mut won, amount, &eligible, &ranks, players.len(), dealer_seat);
    }

    // A folded seat can outcommit every contender when all callers were
    // short; that overage rides on top of the last tier.
    if distributed < total {
        let top = *levels.last().unwrap_or(&0);
        let eligible: Vec<SeatIndex> = contenders
            .iter()
            .copied()
            .filter(|&seat| players[seat].total_committed >= top)
            .collect();
        award_tier(
            &mut won,
            total - distributed,
            &eligible,
            &ranks,
            players.len(),
            dealer_seat,
        );
    }

    let mut payouts = Vec::new();
    for (seat, &amount) in won.iter().enumerate() {
        if amount > 0 {
            players[seat].chips += amount;
            let rank = ranks
                .iter()
                .find(|(s, _)| *s == seat)
                .map(|(_, r)| r.clone());
            debug!("seat {seat} wins {amount} with {:?}", rank);
            payouts.push(Payout {
                seat_idx: seat,
                amount,
                rank,
            });
        }
    }
    Ok(payouts)
}

/// Split one tier among the best-ranked eligible seats. Integer division
/// leaves a remainder of at most winners-1 odd chips, paid one each in
/// clockwise seat order starting left of the button.
fn award_tier(
    won: &mut [Chips],
    amount: Chips,
    eligible: &[SeatIndex],
    ranks: &[(SeatIndex, HandRank)],
    seat_count: usize,
    dealer_seat: SeatIndex,
) {
    let best = ranks
        .iter()
        .filter(|(seat, _)| eligible.contains(seat))
        .map(|(_, rank)| rank)
        .max();
    let Some(best) = best else { return };

    let mut winners: Vec<SeatIndex> = ranks
        .iter()
        .filter(|(seat, rank)| eligible.contains(seat) && rank == best)
        .map(|(seat, _)| *seat)
        .collect();
    winners.sort_unstable_by_key(|&seat| (seat + seat_count - (dealer_seat + 1) % seat_count) % seat_count);

    let share = amount / winners.len() as Chips;
    let remainder = amount as usize % winners.len();
    for (idx, &seat) in winners.iter().enumerate() {
        won[seat] += share + Chips::from(idx < remainder);
    }
}
