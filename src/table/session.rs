//! Synchronous room state: the seat list, the betting engine, and the event
//! queue. One session is owned by exactly one actor task, so nothing here
//! needs locking.

use std::collections::HashSet;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bot::policy::{BotContext, BotPolicy};
use crate::game::betting::BettingEngine;
use crate::game::entities::{Action, HandPhase, Player, PlayerId, PlayerView, SeatIndex, TableView};
use crate::game::errors::GameError;
use crate::game::evaluator;
use crate::game::settlement::Payout;

use super::config::{BOT_NAMES, TableConfig};
use super::messages::{RoomId, SessionEvent};

/// All state for one room. Every mutation appends the events it caused;
/// the actor drains them after each command and fans them out.
pub struct TableSession {
    room_id: RoomId,
    config: TableConfig,
    players: Vec<Player>,
    engine: BettingEngine,
    rng: StdRng,
    policy: BotPolicy,
    /// Seats vacated mid-hand; kept (folded) until the hand ends so seat
    /// indices and the pot stay coherent, then purged.
    departed: HashSet<PlayerId>,
    /// Whose hole cards the last showdown exposed to everyone.
    revealed: Vec<PlayerId>,
    events: Vec<SessionEvent>,
    closed: bool,
}

impl TableSession {
    /// Seed the deck and bot RNGs for reproducible games; `None` seeds from
    /// the OS.
    #[must_use]
    pub fn new(room_id: RoomId, config: TableConfig, seed: Option<u64>) -> Self {
        let (rng, policy) = match seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                BotPolicy::from_seed(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_os_rng(), BotPolicy::from_os_rng()),
        };
        Self {
            room_id,
            config,
            players: Vec::new(),
            engine: BettingEngine::new(),
            rng,
            policy,
            departed: HashSet::new(),
            revealed: Vec::new(),
            events: Vec::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn hand_in_progress(&self) -> bool {
        self.engine.hand_in_progress()
    }

    /// Take the events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seat a new player. The first player in becomes host. Joining while a
    /// hand runs is fine; the newcomer sits out until the next deal.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, GameError> {
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RoomFull);
        }
        let seat_idx = self.players.len();
        let mut player = Player::new(name, self.config.starting_chips, seat_idx, false);
        player.is_host = !self.players.iter().any(|p| p.is_host);
        if self.engine.hand_in_progress() {
            player.is_folded = true;
        }
        let player_id = player.id;
        debug!("room {}: {name} joined seat {seat_idx}", self.room_id);
        self.players.push(player);
        self.events.push(SessionEvent::PlayerJoined {
            name: name.to_string(),
        });
        Ok(player_id)
    }

    /// Seat `count` bots. Host only.
    pub fn add_bots(&mut self, requester: PlayerId, count: usize) -> Result<(), GameError> {
        let seat = self.seat_of(requester)?;
        if !self.players[seat].is_host {
            return Err(GameError::NotAuthorized);
        }
        let available: Vec<&str> = BOT_NAMES
            .into_iter()
            .filter(|name| !self.players.iter().any(|p| p.name == *name))
            .collect();
        if self.players.len() + count > self.config.max_players || count > available.len() {
            return Err(GameError::RoomFull);
        }
        for name in &available[..count] {
            let seat_idx = self.players.len();
            let mut bot = Player::new(name, self.config.starting_chips, seat_idx, true);
            if self.engine.hand_in_progress() {
                bot.is_folded = true;
            }
            self.players.push(bot);
        }
        if count > 0 {
            self.events.push(SessionEvent::BotsAdded { count });
        }
        Ok(())
    }

    /// Remove a player. Mid-hand they are folded out first and their chips
    /// already in the pot stay there; the seat is reclaimed once the hand
    /// ends. The room closes when its last human leaves.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        let seat = self.seat_of(player_id)?;
        let name = self.players[seat].name.clone();
        let was_host = self.players[seat].is_host;
        self.players[seat].is_host = false;
        self.departed.insert(player_id);
        debug!("room {}: {name} left", self.room_id);
        self.events.push(SessionEvent::PlayerLeft { name });

        if self.engine.hand_in_progress() {
            if let Some(payouts) = self.engine.forfeit(&mut self.players, seat)? {
                self.finish_hand(payouts);
            }
        } else {
            self.purge_departed();
        }

        if was_host
            && let Some(next_host) = self
                .players
                .iter_mut()
                .find(|p| !p.is_bot && !self.departed.contains(&p.id))
        {
            next_host.is_host = true;
        }
        if !self
            .players
            .iter()
            .any(|p| !p.is_bot && !self.departed.contains(&p.id))
        {
            self.close();
        }
        Ok(())
    }

    /// Deal the first hand of a game. Host only.
    pub fn start_hand(&mut self, requester: PlayerId) -> Result<(), GameError> {
        let seat = self.seat_of(requester)?;
        if !self.players[seat].is_host {
            return Err(GameError::NotAuthorized);
        }
        self.deal()
    }

    /// Deal the next hand after the between-hands pause. Errors are
    /// expected here (not enough funded players left) and just leave the
    /// table waiting.
    pub fn begin_next_hand(&mut self) {
        if self.closed || self.engine.hand_in_progress() {
            return;
        }
        if let Err(err) = self.deal() {
            debug!("room {}: next hand not dealt: {err}", self.room_id);
        }
    }

    /// Apply one player's betting action.
    pub fn submit_action(&mut self, player_id: PlayerId, action: Action) -> Result<(), GameError> {
        let seat = self.seat_of(player_id)?;
        let outcome = self.engine.apply_action(&mut self.players, seat, action)?;
        self.events.push(SessionEvent::ActionApplied {
            seat_idx: outcome.seat_idx,
            action: outcome.action,
        });
        if let Some(payouts) = outcome.payouts {
            self.finish_hand(payouts);
        }
        Ok(())
    }

    /// Seat of the bot due to act, if it is a bot's turn.
    #[must_use]
    pub fn bot_seat_to_act(&self) -> Option<SeatIndex> {
        if !self.engine.hand_in_progress() {
            return None;
        }
        self.engine
            .current_seat
            .filter(|&seat| self.players[seat].is_bot)
    }

    /// The hand just ended and nobody is due to act; the actor should
    /// schedule the next deal.
    #[must_use]
    pub fn awaiting_next_hand(&self) -> bool {
        !self.closed
            && !self.engine.hand_in_progress()
            && self.players.iter().filter(|p| p.chips > 0).count() >= self.config.min_players
            && self.engine.phase == HandPhase::Showdown
    }

    /// Let the bot whose turn it is act once. No-op when it is not a bot's
    /// turn (the table moved on before the scheduled wakeup landed).
    pub fn bot_act(&mut self) -> Result<(), GameError> {
        let Some(seat) = self.bot_seat_to_act() else {
            return Ok(());
        };
        let player = &self.players[seat];
        let strength = evaluator::hand_strength(&player.hole_cards, &self.engine.board)?;
        let ctx = BotContext {
            strength,
            call_amount: self.engine.current_bet - player.current_bet,
            table_bet: self.engine.current_bet,
            big_blind: self.config.big_blind,
        };
        let action = self.policy.decide(ctx);
        let outcome = self.engine.apply_action(&mut self.players, seat, action)?;
        self.events.push(SessionEvent::ActionApplied {
            seat_idx: outcome.seat_idx,
            action: outcome.action,
        });
        if let Some(payouts) = outcome.payouts {
            self.finish_hand(payouts);
        }
        Ok(())
    }

    /// State snapshot redacted for one viewer: hole cards appear only for
    /// the viewer's own seat, plus every contender's after a contested
    /// showdown.
    #[must_use]
    pub fn snapshot_for(&self, viewer: Option<PlayerId>) -> TableView {
        let players = self
            .players
            .iter()
            .filter(|p| !self.departed.contains(&p.id))
            .map(|p| {
                let show = viewer == Some(p.id) || self.revealed.contains(&p.id);
                PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    chips: p.chips,
                    seat_idx: p.seat_idx,
                    is_bot: p.is_bot,
                    is_host: p.is_host,
                    current_bet: p.current_bet,
                    total_committed: p.total_committed,
                    is_folded: p.is_folded,
                    is_all_in: p.is_all_in,
                    hole_cards: if show { p.hole_cards.clone() } else { Vec::new() },
                }
            })
            .collect();
        TableView {
            room_id: self.room_id.clone(),
            phase: self.engine.phase,
            board: self.engine.board.clone(),
            pot: self.engine.pot(&self.players),
            current_bet: self.engine.current_bet,
            current_seat: self.engine.current_seat,
            dealer_seat: self.engine.dealer_seat,
            hand_active: self.engine.hand_in_progress(),
            players,
        }
    }

    fn deal(&mut self) -> Result<(), GameError> {
        self.purge_departed();
        if self.players.iter().filter(|p| p.chips > 0).count() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers);
        }
        self.revealed.clear();
        let blinds = self.config.blinds();
        let payouts = self
            .engine
            .start_hand(&mut self.players, blinds, &mut self.rng)?;
        self.events.push(SessionEvent::HandStarted);
        if let Some(payouts) = payouts {
            self.finish_hand(payouts);
        }
        Ok(())
    }

    fn finish_hand(&mut self, payouts: Vec<Payout>) {
        // A contested showdown exposes every contender's cards; an
        // uncontested pot exposes nothing.
        if payouts.iter().any(|p| p.rank.is_some()) {
            self.revealed = self
                .players
                .iter()
                .filter(|p| p.in_hand())
                .map(|p| p.id)
                .collect();
        }
        self.events.push(SessionEvent::HandComplete { payouts });
        self.purge_departed();
    }

    /// Drop seats vacated during the last hand and compact seat indices.
    /// The dealer button follows its player, or falls back to seat 0 if
    /// that player is gone.
    fn purge_departed(&mut self) {
        if self.departed.is_empty() {
            return;
        }
        let dealer_id = self
            .players
            .get(self.engine.dealer_seat)
            .map(|p| p.id);
        let departed = std::mem::take(&mut self.departed);
        self.players.retain(|p| !departed.contains(&p.id));
        for (idx, player) in self.players.iter_mut().enumerate() {
            player.seat_idx = idx;
        }
        self.engine.dealer_seat = dealer_id
            .and_then(|id| self.players.iter().position(|p| p.id == id))
            .unwrap_or(0);
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.events.push(SessionEvent::RoomClosed);
            debug!("room {} closed", self.room_id);
        }
    }

    fn seat_of(&self, player_id: PlayerId) -> Result<SeatIndex, GameError> {
        if self.departed.contains(&player_id) {
            return Err(GameError::UnknownPlayer);
        }
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::UnknownPlayer)
    }
}
