//! Session actor: owns a [`TableSession`] and serializes every command to
//! it through one mpsc inbox. Bot moves and next-hand deals arrive as
//! delayed self-commands carrying a sequence number, so wakeups scheduled
//! against a state the table has moved past are discarded.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;

use crate::game::entities::{Action, PlayerId, TableView};
use crate::game::errors::GameError;

use super::config::TableConfig;
use super::messages::{JoinReply, RoomId, ServerMessage, SessionCommand, SessionEvent};
use super::session::TableSession;

/// Cloneable handle for talking to one room's actor. Every method fails
/// with [`GameError::RoomNotFound`] once the actor has shut down.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
    room_id: RoomId,
}

impl SessionHandle {
    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    async fn send(&self, command: SessionCommand) -> Result<(), GameError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| GameError::RoomNotFound)
    }

    pub async fn join(&self, name: &str) -> Result<JoinReply, GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::Join {
            name: name.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| GameError::RoomNotFound)?
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::Leave {
            player_id,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| GameError::RoomNotFound)?
    }

    pub async fn add_bots(&self, player_id: PlayerId, count: usize) -> Result<(), GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::AddBots {
            player_id,
            count,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| GameError::RoomNotFound)?
    }

    pub async fn start_hand(&self, player_id: PlayerId) -> Result<(), GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::StartHand {
            player_id,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| GameError::RoomNotFound)?
    }

    pub async fn take_action(&self, player_id: PlayerId, action: Action) -> Result<(), GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::TakeAction {
            player_id,
            action,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| GameError::RoomNotFound)?
    }

    /// Snapshot redacted for `player_id`, or for a spectator when `None`.
    pub async fn state(&self, player_id: Option<PlayerId>) -> Result<TableView, GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::GetState {
            player_id,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| GameError::RoomNotFound)
    }

    /// Register a channel for pushed [`ServerMessage`]s. A full or closed
    /// receiver is pruned by the actor, not an error here.
    pub async fn subscribe(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<(), GameError> {
        self.send(SessionCommand::Subscribe { player_id, sender })
            .await
    }

    pub async fn unsubscribe(&self, player_id: PlayerId) -> Result<(), GameError> {
        self.send(SessionCommand::Unsubscribe { player_id }).await
    }

    pub async fn close(&self) -> Result<(), GameError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SessionCommand::Close { respond_to }).await?;
        response.await.map_err(|_| GameError::RoomNotFound)
    }
}

/// The actor task for one room.
pub struct SessionActor {
    session: TableSession,
    inbox: mpsc::Receiver<SessionCommand>,
    /// For scheduled self-commands. Weak so pending sleeps never keep a
    /// dead room's channel alive.
    weak_sender: mpsc::WeakSender<SessionCommand>,
    subscribers: HashMap<PlayerId, mpsc::Sender<ServerMessage>>,
    /// Bumped on every state change; scheduled wakeups quoting an older
    /// value are stale and dropped.
    seq: u64,
    is_closed: bool,
}

impl SessionActor {
    #[must_use]
    pub fn new(room_id: RoomId, config: TableConfig, seed: Option<u64>) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(64);
        let weak_sender = sender.downgrade();
        let session = TableSession::new(room_id.clone(), config, seed);
        let actor = Self {
            session,
            inbox,
            weak_sender,
            subscribers: HashMap::new(),
            seq: 0,
            is_closed: false,
        };
        let handle = SessionHandle { sender, room_id };
        (actor, handle)
    }

    /// Run until the room closes: last human gone, or an explicit `Close`.
    pub async fn run(mut self) {
        info!("room {} starting", self.session.room_id());

        while let Some(command) = self.inbox.recv().await {
            self.handle_command(command);
            self.after_update();
            if self.is_closed || self.session.is_closed() {
                break;
            }
        }

        info!("room {} closed", self.session.room_id());
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Join { name, respond_to } => {
                let result = self.session.add_player(&name).map(|player_id| JoinReply {
                    player_id,
                    room_id: self.session.room_id().clone(),
                });
                let _ = respond_to.send(result);
            }

            SessionCommand::Leave {
                player_id,
                respond_to,
            } => {
                self.subscribers.remove(&player_id);
                let _ = respond_to.send(self.session.remove_player(player_id));
            }

            SessionCommand::AddBots {
                player_id,
                count,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.add_bots(player_id, count));
            }

            SessionCommand::StartHand {
                player_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.start_hand(player_id));
            }

            SessionCommand::TakeAction {
                player_id,
                action,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.submit_action(player_id, action));
            }

            SessionCommand::GetState {
                player_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.snapshot_for(player_id));
            }

            SessionCommand::Subscribe { player_id, sender } => {
                self.subscribers.insert(player_id, sender);
                debug!(
                    "room {}: player {player_id} subscribed",
                    self.session.room_id()
                );
            }

            SessionCommand::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
            }

            SessionCommand::BotTurn { seq } => {
                if seq == self.seq {
                    if let Err(err) = self.session.bot_act() {
                        error!("room {}: bot move failed: {err}", self.session.room_id());
                    }
                } else {
                    trace!("room {}: stale bot wakeup dropped", self.session.room_id());
                }
            }

            SessionCommand::NextHand { seq } => {
                if seq == self.seq {
                    self.session.begin_next_hand();
                } else {
                    trace!(
                        "room {}: stale next-hand wakeup dropped",
                        self.session.room_id()
                    );
                }
            }

            SessionCommand::Close { respond_to } => {
                self.is_closed = true;
                let _ = respond_to.send(());
            }
        }
    }

    /// Fan out whatever the last command changed and schedule the follow-up
    /// it calls for (a bot's move, or the next deal).
    fn after_update(&mut self) {
        let events = self.session.drain_events();
        if events.is_empty() {
            return;
        }
        self.seq += 1;
        for event in &events {
            self.broadcast(event);
        }

        if self.session.bot_seat_to_act().is_some() {
            self.schedule(self.session.config().bot_delay, |seq| {
                SessionCommand::BotTurn { seq }
            });
        } else if self.session.awaiting_next_hand() {
            self.schedule(self.session.config().next_hand_delay, |seq| {
                SessionCommand::NextHand { seq }
            });
        }
    }

    /// Push one event to every subscriber, each with a snapshot redacted
    /// for them. Disconnected subscribers are pruned; a full channel just
    /// drops this update.
    fn broadcast(&mut self, event: &SessionEvent) {
        let session = &self.session;
        self.subscribers.retain(|player_id, sender| {
            let message = ServerMessage {
                event: event.clone(),
                state: session.snapshot_for(Some(*player_id)),
            };
            match sender.try_send(message) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("subscriber {player_id} channel full, dropping update");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("subscriber {player_id} disconnected, removing");
                    false
                }
            }
        });
    }

    fn schedule(&self, delay: Duration, make: impl FnOnce(u64) -> SessionCommand + Send + 'static) {
        let seq = self.seq;
        let weak = self.weak_sender.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            if let Some(sender) = weak.upgrade() {
                let _ = sender.send(make(seq)).await;
            }
        });
    }
}
