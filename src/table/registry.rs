//! Room registry: creates session actors, hands out their handles by room
//! code, and forgets rooms when their actors finish.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use rand::Rng;
use tokio::sync::RwLock;

use crate::game::errors::GameError;

use super::actor::{SessionActor, SessionHandle};
use super::config::TableConfig;
use super::messages::{JoinReply, RoomId};

const ROOM_ID_LEN: usize = 6;

/// Shared registry of live rooms. Cheap to clone; all clones see the same
/// map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    rooms: Arc<RwLock<HashMap<RoomId, SessionHandle>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new room and return its code plus the host's seat in it.
    /// A watcher task removes the registry entry as soon as the room's
    /// actor finishes, whatever ended it.
    pub async fn create_room(
        &self,
        host_name: &str,
        config: TableConfig,
        seed: Option<u64>,
    ) -> Result<(RoomId, JoinReply), GameError> {
        config.validate().map_err(GameError::IllegalAction)?;

        let room_id = self.unused_room_id().await;
        let (actor, handle) = SessionActor::new(room_id.clone(), config, seed);
        self.rooms
            .write()
            .await
            .insert(room_id.clone(), handle.clone());

        let rooms = Arc::clone(&self.rooms);
        let id = room_id.clone();
        tokio::spawn(async move {
            actor.run().await;
            rooms.write().await.remove(&id);
            info!("room {id} removed from registry");
        });

        let reply = handle.join(host_name).await?;
        Ok((room_id, reply))
    }

    /// Look up a live room's handle.
    pub async fn room(&self, room_id: &str) -> Result<SessionHandle, GameError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or(GameError::RoomNotFound)
    }

    /// Join an existing room by code.
    pub async fn join_room(&self, room_id: &str, name: &str) -> Result<JoinReply, GameError> {
        self.room(room_id).await?.join(name).await
    }

    /// Shut a room down; its watcher task then drops the registry entry.
    pub async fn close_room(&self, room_id: &str) -> Result<(), GameError> {
        self.room(room_id).await?.close().await
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    async fn unused_room_id(&self) -> RoomId {
        let rooms = self.rooms.read().await;
        loop {
            let id = generate_room_id(&mut rand::rng());
            if !rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Six uppercase alphanumeric characters, shareable over voice chat.
fn generate_room_id<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..ROOM_ID_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn room_ids_are_six_uppercase_alphanumerics() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let id = generate_room_id(&mut rng);
            assert_eq!(id.len(), 6);
            assert!(id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
