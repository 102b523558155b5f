//! Room lifecycle tests through the registry and actor layer.

use std::time::Duration;

use holdem_engine::game::{Action, GameError};
use holdem_engine::table::{ServerMessage, SessionEvent, SessionRegistry, TableConfig};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

fn test_config() -> TableConfig {
    TableConfig {
        // Keep scheduled deals out of the way; bots still act instantly.
        bot_delay: Duration::ZERO,
        next_hand_delay: Duration::from_secs(600),
        ..TableConfig::default()
    }
}

async fn recv_until<F>(rx: &mut mpsc::Receiver<ServerMessage>, mut pred: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            let message = rx.recv().await.expect("event stream ended");
            if pred(&message) {
                return message;
            }
        }
    })
    .await
    .expect("expected event never arrived")
}

#[tokio::test]
async fn create_room_seats_the_host() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(1))
        .await
        .unwrap();
    assert_eq!(room_id.len(), 6);
    assert_eq!(registry.room_count().await, 1);

    let handle = registry.room(&room_id).await.unwrap();
    let view = handle.state(Some(host.player_id)).await.unwrap();
    assert_eq!(view.players.len(), 1);
    assert!(view.players[0].is_host);
    assert_eq!(view.room_id, room_id);
}

#[tokio::test]
async fn unknown_room_code_is_rejected() {
    let registry = SessionRegistry::new();
    let err = registry.join_room("NOSUCH", "ben").await;
    assert_eq!(err.unwrap_err(), GameError::RoomNotFound);
}

#[tokio::test]
async fn room_fills_at_eight_seats() {
    let registry = SessionRegistry::new();
    let (room_id, _) = registry
        .create_room("ana", test_config(), Some(2))
        .await
        .unwrap();
    for i in 1..8 {
        registry.join_room(&room_id, &format!("p{i}")).await.unwrap();
    }
    let err = registry.join_room(&room_id, "late").await;
    assert_eq!(err.unwrap_err(), GameError::RoomFull);
}

#[tokio::test]
async fn guests_cannot_start_or_add_bots() {
    let registry = SessionRegistry::new();
    let (room_id, _) = registry
        .create_room("ana", test_config(), Some(3))
        .await
        .unwrap();
    let guest = registry.join_room(&room_id, "ben").await.unwrap();
    let handle = registry.room(&room_id).await.unwrap();

    assert_eq!(
        handle.add_bots(guest.player_id, 1).await,
        Err(GameError::NotAuthorized)
    );
    assert_eq!(
        handle.start_hand(guest.player_id).await,
        Err(GameError::NotAuthorized)
    );
}

#[tokio::test]
async fn starting_alone_is_rejected() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(4))
        .await
        .unwrap();
    let handle = registry.room(&room_id).await.unwrap();
    assert_eq!(
        handle.start_hand(host.player_id).await,
        Err(GameError::NotEnoughPlayers)
    );
}

#[tokio::test]
async fn pushed_snapshots_redact_per_subscriber() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(5))
        .await
        .unwrap();
    let guest = registry.join_room(&room_id, "ben").await.unwrap();
    let handle = registry.room(&room_id).await.unwrap();

    let (host_tx, mut host_rx) = mpsc::channel(32);
    let (guest_tx, mut guest_rx) = mpsc::channel(32);
    handle.subscribe(host.player_id, host_tx).await.unwrap();
    handle.subscribe(guest.player_id, guest_tx).await.unwrap();

    handle.start_hand(host.player_id).await.unwrap();

    let started = |m: &ServerMessage| matches!(m.event, SessionEvent::HandStarted);
    let host_msg = recv_until(&mut host_rx, started).await;
    let guest_msg = recv_until(&mut guest_rx, started).await;

    for player in &host_msg.state.players {
        if player.id == host.player_id {
            assert_eq!(player.hole_cards.len(), 2);
        } else {
            assert!(player.hole_cards.is_empty(), "host saw {}'s cards", player.name);
        }
    }
    for player in &guest_msg.state.players {
        if player.id == guest.player_id {
            assert_eq!(player.hole_cards.len(), 2);
        } else {
            assert!(player.hole_cards.is_empty(), "guest saw {}'s cards", player.name);
        }
    }
}

#[tokio::test]
async fn scheduled_bots_play_a_hand_through() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(6))
        .await
        .unwrap();
    let handle = registry.room(&room_id).await.unwrap();
    handle.add_bots(host.player_id, 3).await.unwrap();

    let (tx, mut rx) = mpsc::channel(256);
    handle.subscribe(host.player_id, tx).await.unwrap();
    handle.start_hand(host.player_id).await.unwrap();

    // Bots act on their own scheduled wakeups; we only have to move when
    // the action lands on the human seat.
    let complete = timeout(Duration::from_secs(10), async {
        loop {
            let view = handle.state(Some(host.player_id)).await.unwrap();
            if view.hand_active
                && view.current_seat
                    == view
                        .players
                        .iter()
                        .find(|p| p.id == host.player_id)
                        .map(|p| p.seat_idx)
            {
                handle.take_action(host.player_id, Action::Fold).await.unwrap();
            }
            while let Ok(message) = rx.try_recv() {
                if matches!(message.event, SessionEvent::HandComplete { .. }) {
                    return message;
                }
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("bots never finished the hand");

    assert!(matches!(complete.event, SessionEvent::HandComplete { .. }));
    let bankroll: u32 = complete.state.players.iter().map(|p| p.chips).sum();
    assert_eq!(bankroll, 4 * test_config().starting_chips);
}

#[tokio::test]
async fn closing_a_room_prunes_the_registry() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(7))
        .await
        .unwrap();
    registry.close_room(&room_id).await.unwrap();

    // The watcher task removes the entry once the actor finishes.
    for _ in 0..100 {
        if registry.room_count().await == 0 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.room_count().await, 0);

    let handle_err = registry.room(&room_id).await;
    assert_eq!(handle_err.unwrap_err(), GameError::RoomNotFound);
    let _ = host;
}

#[tokio::test]
async fn last_human_leaving_shuts_the_room_down() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(8))
        .await
        .unwrap();
    let handle = registry.room(&room_id).await.unwrap();
    handle.add_bots(host.player_id, 2).await.unwrap();

    handle.leave(host.player_id).await.unwrap();

    for _ in 0..100 {
        if registry.room_count().await == 0 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.room_count().await, 0);

    // Commands against the dead room fail cleanly.
    let err = handle.state(None).await;
    assert_eq!(err.unwrap_err(), GameError::RoomNotFound);
}

#[tokio::test]
async fn leaver_mid_hand_is_folded_and_play_continues() {
    let registry = SessionRegistry::new();
    let (room_id, host) = registry
        .create_room("ana", test_config(), Some(9))
        .await
        .unwrap();
    let ben = registry.join_room(&room_id, "ben").await.unwrap();
    let cy = registry.join_room(&room_id, "cy").await.unwrap();
    let handle = registry.room(&room_id).await.unwrap();

    handle.start_hand(host.player_id).await.unwrap();
    let pot_before = handle.state(None).await.unwrap().pot;

    // Ben posted the small blind; his chips stay in the pot when he goes.
    handle.leave(ben.player_id).await.unwrap();
    let view = handle.state(None).await.unwrap();
    assert_eq!(view.pot, pot_before);
    assert!(view.hand_active);

    // Ben can no longer act.
    let err = handle.take_action(ben.player_id, Action::Fold).await;
    assert_eq!(err.unwrap_err(), GameError::UnknownPlayer);
    let _ = cy;
}
