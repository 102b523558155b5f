//! Per-hand betting state machine: blinds, dealing, turn order, action
//! validation, and phase transitions.

use log::debug;
use rand::Rng;

use super::entities::{Action, Blinds, Card, Chips, Deck, HandPhase, Player, SeatIndex};
use super::errors::GameError;
use super::settlement::{self, Payout};

/// What a successfully applied action did to the hand.
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub seat_idx: SeatIndex,
    /// The action as applied, with raise amounts normalized to the clamped
    /// total bet level.
    pub action: Action,
    pub phase: HandPhase,
    /// Present when the action ended the hand; chips have already moved.
    pub payouts: Option<Vec<Payout>>,
}

/// Drives one hand at a time over a seat list owned by the caller. The deck
/// lives here for exactly one hand; a fresh shuffled deck replaces it on
/// every `start_hand`.
#[derive(Debug)]
pub struct BettingEngine {
    pub phase: HandPhase,
    deck: Deck,
    pub board: Vec<Card>,
    /// Required match for the current round: the maximum round bet among
    /// non-folded players.
    pub current_bet: Chips,
    pub current_seat: Option<SeatIndex>,
    pub dealer_seat: SeatIndex,
    hands_dealt: u64,
}

impl BettingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: HandPhase::Waiting,
            deck: Deck::new(),
            board: Vec::with_capacity(5),
            current_bet: 0,
            current_seat: None,
            dealer_seat: 0,
            hands_dealt: 0,
        }
    }

    /// Pot size: the sum of every seat's commitment this hand. Folded
    /// players' contributions stay in.
    #[must_use]
    pub fn pot(&self, players: &[Player]) -> Chips {
        players.iter().map(|p| p.total_committed).sum()
    }

    #[must_use]
    pub fn hand_in_progress(&self) -> bool {
        matches!(
            self.phase,
            HandPhase::Preflop | HandPhase::Flop | HandPhase::Turn | HandPhase::River
        )
    }

    /// Start a hand: rotate the dealer, shuffle a fresh deck, post blinds,
    /// and deal hole cards one at a time in two passes.
    ///
    /// Returns payouts in the degenerate case where nobody can act at all
    /// (every live seat all-in from the blinds) and the hand runs out
    /// immediately.
    pub fn start_hand<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        blinds: Blinds,
        rng: &mut R,
    ) -> Result<Option<Vec<Payout>>, GameError> {
        if self.hand_in_progress() {
            return Err(GameError::AlreadyStarted);
        }
        if players.iter().filter(|p| p.chips > 0).count() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }

        for player in players.iter_mut() {
            player.reset_for_hand();
        }

        // First hand: dealer stays at seat 0. Afterwards the button moves
        // one live seat clockwise.
        if self.hands_dealt > 0 {
            self.dealer_seat = next_in_hand(players, self.dealer_seat);
        } else if !players[self.dealer_seat].in_hand() {
            self.dealer_seat = next_in_hand(players, self.dealer_seat);
        }
        self.hands_dealt += 1;

        self.board.clear();
        self.deck = Deck::new();
        self.deck.shuffle(rng);

        // Heads-up, the dealer posts the small blind and acts first preflop;
        // with three or more seats the blinds sit left of the button.
        let live = players.iter().filter(|p| p.in_hand()).count();
        let small_blind_seat = if live == 2 {
            self.dealer_seat
        } else {
            next_in_hand(players, self.dealer_seat)
        };
        let big_blind_seat = next_in_hand(players, small_blind_seat);

        post_blind(&mut players[small_blind_seat], blinds.small);
        post_blind(&mut players[big_blind_seat], blinds.big);
        self.current_bet = players
            .iter()
            .filter(|p| p.in_hand())
            .map(|p| p.current_bet)
            .max()
            .unwrap_or(0);

        // Two passes, one card per live seat per pass, starting left of the
        // button.
        for _ in 0..2 {
            let mut seat = small_blind_seat;
            for _ in 0..players.len() {
                if players[seat].in_hand() {
                    let card = self.deck.deal()?;
                    players[seat].hole_cards.push(card);
                }
                seat = (seat + 1) % players.len();
            }
        }

        self.phase = HandPhase::Preflop;
        self.current_seat = next_contesting(players, big_blind_seat);
        debug!(
            "hand {} started: dealer={} sb={} bb={} pot={}",
            self.hands_dealt,
            self.dealer_seat,
            small_blind_seat,
            big_blind_seat,
            self.pot(players)
        );

        // Blinds can leave nobody able to act (both seats all-in); run the
        // board out to showdown right away.
        if self.current_seat.is_none() {
            return self.resolve(players);
        }
        Ok(None)
    }

    /// Validate and apply one player action, then advance the turn and, if
    /// the round or hand completed, the phase. A rejected action leaves all
    /// state untouched.
    pub fn apply_action(
        &mut self,
        players: &mut [Player],
        seat_idx: SeatIndex,
        action: Action,
    ) -> Result<ActionOutcome, GameError> {
        if !self.hand_in_progress() {
            return Err(GameError::IllegalAction("no betting round in progress".into()));
        }
        if self.current_seat != Some(seat_idx) {
            return Err(GameError::NotYourTurn);
        }

        // Validation before any mutation (apply-or-reject).
        let table_bet = self.current_bet;
        {
            let player = &players[seat_idx];
            match action {
                Action::Check if player.current_bet != table_bet => {
                    return Err(GameError::IllegalAction(
                        "cannot check, a call is owed".into(),
                    ));
                }
                Action::Raise(amount) if amount <= table_bet => {
                    return Err(GameError::IllegalAction(
                        "raise must exceed the current bet".into(),
                    ));
                }
                _ => {}
            }
        }

        let applied = {
            let player = &mut players[seat_idx];
            match action {
                Action::Check => {
                    player.has_acted = true;
                    Action::Check
                }
                Action::Call => {
                    let owed = table_bet - player.current_bet;
                    let paid = owed.min(player.chips);
                    commit(player, paid);
                    player.has_acted = true;
                    Action::Call
                }
                Action::Raise(amount) => {
                    // A raise is to a total bet level, clamped so a player
                    // can never bet past their own stack.
                    let target = amount.min(player.chips + player.current_bet);
                    let added = target - player.current_bet;
                    commit(player, added);
                    player.has_acted = true;
                    if target > table_bet {
                        self.current_bet = target;
                        reopen_action(players, seat_idx);
                    }
                    Action::Raise(target)
                }
                Action::Fold => {
                    player.is_folded = true;
                    player.has_acted = true;
                    Action::Fold
                }
                Action::AllIn => {
                    let added = player.chips;
                    commit(player, added);
                    player.has_acted = true;
                    let target = players[seat_idx].current_bet;
                    if target > table_bet {
                        self.current_bet = target;
                        reopen_action(players, seat_idx);
                    }
                    Action::AllIn
                }
            }
        };
        debug!("seat {seat_idx} {applied}; pot={}", self.pot(players));

        let payouts = self.resolve(players)?;
        Ok(ActionOutcome {
            seat_idx,
            action: applied,
            phase: self.phase,
            payouts,
        })
    }

    /// Fold a seat out of the hand regardless of whose turn it is, for a
    /// player leaving mid-hand. Their committed chips stay in the pot. If
    /// the fold leaves one contender or it was their turn, the hand moves
    /// on (possibly all the way to settlement).
    pub fn forfeit(
        &mut self,
        players: &mut [Player],
        seat_idx: SeatIndex,
    ) -> Result<Option<Vec<Payout>>, GameError> {
        if !self.hand_in_progress() || !players[seat_idx].in_hand() {
            return Ok(None);
        }
        players[seat_idx].is_folded = true;
        if players.iter().filter(|p| p.in_hand()).count() <= 1 {
            return self.settle(players).map(Some);
        }
        if self.current_seat == Some(seat_idx) {
            return self.resolve(players);
        }
        Ok(None)
    }

    /// Advance turn/round/phase after a mutation, cascading through streets
    /// when nobody is left to act (all-in run-outs), and settling the hand
    /// when it ends.
    fn resolve(&mut self, players: &mut [Player]) -> Result<Option<Vec<Payout>>, GameError> {
        // All but one folded: uncontested win, no further cards revealed.
        if players.iter().filter(|p| p.in_hand()).count() <= 1 {
            return self.settle(players).map(Some);
        }

        loop {
            if !round_complete(players, self.current_bet) {
                // Pass the turn: from whoever just acted, or from the
                // button at the start of a street.
                let from = self.current_seat.unwrap_or(self.dealer_seat);
                self.current_seat = next_contesting(players, from);
                return Ok(None);
            }

            // Round done; deal the next street and let the loop decide
            // whether anyone can actually bet on it.
            match self.phase {
                HandPhase::Preflop => self.enter_street(players, HandPhase::Flop, 3)?,
                HandPhase::Flop => self.enter_street(players, HandPhase::Turn, 1)?,
                HandPhase::Turn => self.enter_street(players, HandPhase::River, 1)?,
                HandPhase::River => return self.settle(players).map(Some),
                HandPhase::Waiting | HandPhase::Showdown => return Ok(None),
            }
        }
    }

    /// Round reset: round bets to zero (hand commitments stay), burn one,
    /// reveal the street. The caller decides who acts first.
    fn enter_street(
        &mut self,
        players: &mut [Player],
        phase: HandPhase,
        reveal: usize,
    ) -> Result<(), GameError> {
        for player in players.iter_mut() {
            player.current_bet = 0;
            if player.is_contesting() {
                player.has_acted = false;
            }
        }
        self.current_bet = 0;
        self.current_seat = None;

        self.deck.burn()?;
        for _ in 0..reveal {
            let card = self.deck.deal()?;
            self.board.push(card);
        }

        self.phase = phase;
        debug!("{phase}: board {:?}", self.board);
        Ok(())
    }

    fn settle(&mut self, players: &mut [Player]) -> Result<Vec<Payout>, GameError> {
        self.phase = HandPhase::Showdown;
        self.current_seat = None;
        settlement::settle(players, &self.board, self.dealer_seat)
    }
}

impl Default for BettingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Move chips from a stack into the round/hand commitments, flagging all-in
/// when the stack empties. Forced blinds go through here too, so a short
/// stack posts whatever it has and never goes negative.
fn commit(player: &mut Player, amount: Chips) {
    let paid = amount.min(player.chips);
    player.chips -= paid;
    player.current_bet += paid;
    player.total_committed += paid;
    if player.chips == 0 {
        player.is_all_in = true;
    }
}

fn post_blind(player: &mut Player, blind: Chips) {
    commit(player, blind);
}

/// A raise invalidates every other contesting player's prior action; they
/// must all respond to the new bet level.
fn reopen_action(players: &mut [Player], raiser: SeatIndex) {
    for (idx, player) in players.iter_mut().enumerate() {
        if idx != raiser && player.is_contesting() {
            player.has_acted = false;
        }
    }
}

/// Next seat clockwise still holding cards (used for blinds and the button).
fn next_in_hand(players: &[Player], from: SeatIndex) -> SeatIndex {
    let len = players.len();
    let mut seat = (from + 1) % len;
    for _ in 0..len {
        if players[seat].in_hand() {
            return seat;
        }
        seat = (seat + 1) % len;
    }
    from
}

/// Next seat clockwise able to act, scanning at most one full lap.
fn next_contesting(players: &[Player], from: SeatIndex) -> Option<SeatIndex> {
    let len = players.len();
    let mut seat = (from + 1) % len;
    for _ in 0..len {
        if players[seat].is_contesting() {
            return Some(seat);
        }
        seat = (seat + 1) % len;
    }
    None
}

/// A betting round is complete once every contesting player has acted and
/// matched the table bet. All-in players are exempt from matching; their
/// turn is over for the hand. A lone contesting player with everyone else
/// all-in only acts while a call is owed; once matched there is nobody
/// left to bet against.
fn round_complete(players: &[Player], table_bet: Chips) -> bool {
    let mut contesting = players.iter().filter(|p| p.is_contesting());
    let Some(first) = contesting.next() else {
        return true;
    };
    if contesting.next().is_none() {
        return first.current_bet >= table_bet;
    }
    players
        .iter()
        .filter(|p| p.is_contesting())
        .all(|p| p.has_acted && p.current_bet == table_bet)
}
