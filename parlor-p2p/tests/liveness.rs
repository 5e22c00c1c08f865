//! Liveness over a real poll loop: silent peers expire, abrupt closes
//! end sessions, and a lost host ends the lobby for its guests.

mod support;

use instant::Duration;
use parlor_core::{Discipline, PlayerStatus};
use parlor_p2p::{LobbyEvent, MemoryNetwork};

fn fast_config() -> parlor_p2p::LobbyConfig {
    support::config()
        .with_heartbeat_interval(Duration::from_millis(10))
        .with_liveness_timeout(Duration::from_millis(40))
}

#[test]
fn test_silent_peer_expires_and_its_game_ends() {
    let network = MemoryNetwork::new();
    let mut host = support::join_with(&network, "Host", fast_config());
    let mut alice = support::join_with(&network, "Alice", fast_config());
    let mut bob = support::join_with(&network, "Bob", fast_config());
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);

    bob.start_hosting(Discipline::TurnBased).unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);
    alice.request_join(bob.local_id().clone()).unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);
    assert!(alice.session().is_some());

    // Bob's process hangs: it stops polling but its link stays up
    let mut host_events = Vec::new();
    let mut alice_events = Vec::new();
    for _ in 0..30 {
        std::thread::sleep(Duration::from_millis(5));
        let now = instant::Instant::now();
        host_events.extend(host.poll(now));
        alice_events.extend(alice.poll(now));
    }

    assert!(host_events
        .iter()
        .any(|e| matches!(e, LobbyEvent::PeerOffline(p) if p == bob.local_id())));
    assert!(alice_events
        .iter()
        .any(|e| matches!(e, LobbyEvent::OpponentLeft { who } if who == bob.local_id())));
    assert!(alice.session().is_none());
    assert_eq!(host.roster().len(), 2);
    assert!(host
        .roster()
        .iter()
        .all(|r| r.status() == PlayerStatus::Idle));
}

#[test]
fn test_responsive_peers_never_expire() {
    let network = MemoryNetwork::new();
    let mut host = support::join_with(&network, "Host", fast_config());
    let mut alice = support::join_with(&network, "Alice", fast_config());
    support::pump(&mut [&mut host, &mut alice], 4);

    let mut events = Vec::new();
    for _ in 0..30 {
        std::thread::sleep(Duration::from_millis(5));
        let now = instant::Instant::now();
        events.extend(host.poll(now));
        events.extend(alice.poll(now));
    }

    // 150ms of pumping, several timeouts deep, and nobody was declared dead
    assert!(!events
        .iter()
        .any(|e| matches!(e, LobbyEvent::PeerOffline(_) | LobbyEvent::HostUnreachable)));
    assert_eq!(host.roster().len(), 2);
}

#[test]
fn test_abrupt_disconnect_ends_the_session_for_the_survivor() {
    let network = MemoryNetwork::new();
    let mut host = support::join(&network, "Host");
    let mut alice = support::join(&network, "Alice");
    let mut bob = support::join(&network, "Bob");
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);

    bob.start_hosting(Discipline::TurnBased).unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);
    alice.request_join(bob.local_id().clone()).unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);

    network.disconnect(bob.local_id());
    drop(bob);
    let events = support::pump(&mut [&mut host, &mut alice], 4);

    assert!(events[1]
        .iter()
        .any(|e| matches!(e, LobbyEvent::OpponentLeft { .. })));
    assert!(alice.session().is_none());
    assert_eq!(host.roster().len(), 2);
}

#[test]
fn test_host_loss_ends_the_lobby_for_guests() {
    let network = MemoryNetwork::new();
    let mut host = support::join(&network, "Host");
    let mut alice = support::join(&network, "Alice");
    support::pump(&mut [&mut host, &mut alice], 4);

    let host_id = host.local_id().clone();
    network.disconnect(&host_id);
    drop(host);
    let events = support::pump(&mut [&mut alice], 4);

    assert!(events[0]
        .iter()
        .any(|e| matches!(e, LobbyEvent::HostUnreachable)));
    assert!(alice.session().is_none());
}
