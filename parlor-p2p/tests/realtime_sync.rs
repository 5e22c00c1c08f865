//! Real-time duel over two live lobbies: input flows one way, snapshots
//! and scoring flow the other, and only the authority ever scores.

mod support;

use instant::{Duration, Instant};
use parlor_core::arena::{ArenaEvent, EntityId, SyncTuning, Vec2};
use parlor_core::{Discipline, Seat};
use parlor_p2p::{LobbyEvent, MemoryNetwork};

struct Duel {
    host: parlor_p2p::Lobby<parlor_p2p::net::MemoryEndpoint>,
    alice: parlor_p2p::Lobby<parlor_p2p::net::MemoryEndpoint>,
    bob: parlor_p2p::Lobby<parlor_p2p::net::MemoryEndpoint>,
}

/// Bob offers a real-time room, Alice joins: Bob is the authority
/// (Starter), Alice the mirror (Responder).
fn start_duel(network: &MemoryNetwork) -> Duel {
    let mut host = support::join(network, "Host");
    let mut alice = support::join(network, "Alice");
    let mut bob = support::join(network, "Bob");
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);

    // A firm blend keeps the mirror's lag well inside the assertions
    let tuning = SyncTuning::default().with_blend_factor(0.5);
    alice.set_sync_tuning(tuning.clone());
    bob.set_sync_tuning(tuning);

    bob.start_hosting(Discipline::Realtime).unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);
    alice.request_join(bob.local_id().clone()).unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);

    assert!(bob.realtime().is_some_and(|r| r.is_authoritative()));
    assert!(alice.realtime().is_some_and(|r| !r.is_authoritative()));
    assert_eq!(alice.realtime().unwrap().seat(), Seat::Responder);

    Duel { host, alice, bob }
}

#[test]
fn test_realtime_session_spins_up_on_both_sides() {
    let network = MemoryNetwork::new();
    let duel = start_duel(&network);

    // The uninvolved host carries no driver
    assert!(duel.host.realtime().is_none());
}

#[test]
fn test_input_crosses_the_relay_and_mirror_tracks_the_ball() {
    let network = MemoryNetwork::new();
    let Duel {
        mut host,
        mut alice,
        mut bob,
    } = start_duel(&network);

    let target = Vec2::new(700.0, 380.0);
    alice.set_input_target(target).unwrap();

    support::pump_at(
        &mut [&mut host, &mut alice, &mut bob],
        Instant::now(),
        Duration::from_millis(16),
        40,
    );

    // The authority adopted the relayed input as the responder's target
    assert_eq!(bob.realtime().unwrap().arena().target(Seat::Responder), target);

    // The mirror's ball stays close to the authority's
    let auth_ball = bob
        .realtime()
        .unwrap()
        .arena()
        .entity(EntityId::Ball)
        .position();
    let mirror_ball = alice
        .realtime()
        .unwrap()
        .arena()
        .entity(EntityId::Ball)
        .position();
    assert!(
        auth_ball.distance(mirror_ball) < 40.0,
        "mirror ball off by {}",
        auth_ball.distance(mirror_ball)
    );
}

#[test]
fn test_only_the_authority_scores_and_both_sides_agree() {
    let network = MemoryNetwork::new();
    let Duel {
        mut host,
        mut alice,
        mut bob,
    } = start_duel(&network);

    // Alice pulls her paddle out of the serve's path and concedes
    alice.set_input_target(Vec2::new(700.0, 60.0)).unwrap();

    let goal = |events: &[LobbyEvent]| {
        events.iter().find_map(|e| match e {
            LobbyEvent::ArenaScored(ArenaEvent::Goal { scorer, score }) => Some((*scorer, *score)),
            _ => None,
        })
    };

    let mut alice_events = Vec::new();
    let mut bob_events = Vec::new();
    let start = Instant::now();
    let mut flush_rounds = 10u32;
    for round in 0..400u32 {
        let now = start + Duration::from_millis(16) * round;
        host.poll(now);
        alice_events.extend(alice.poll(now));
        bob_events.extend(bob.poll(now));

        // Keep pumping briefly after the first goal so the relayed copy
        // lands, then stop before the next rally resolves
        if goal(&bob_events).is_some() {
            flush_rounds -= 1;
            if flush_rounds == 0 {
                break;
            }
        }
    }

    let (bob_scorer, _) = goal(&bob_events).expect("the authority never scored");
    let (alice_scorer, _) = goal(&alice_events).expect("the goal never reached the mirror");
    assert_eq!(bob_scorer, Seat::Starter);
    assert_eq!(alice_scorer, Seat::Starter);

    // Scores agree and the mirror adopted, never derived, its copy
    let bob_score = bob.realtime().unwrap().arena().score();
    let alice_score = alice.realtime().unwrap().arena().score();
    assert_eq!(bob_score, alice_score);
    assert!(bob_score[Seat::Starter.index()] >= 1);
}

#[test]
fn test_leaving_a_realtime_game_tears_down_both_drivers() {
    let network = MemoryNetwork::new();
    let Duel {
        mut host,
        mut alice,
        mut bob,
    } = start_duel(&network);

    alice.leave_game().unwrap();
    support::pump(&mut [&mut host, &mut alice, &mut bob], 4);

    assert!(alice.realtime().is_none());
    assert!(bob.realtime().is_none());
}
