//! Shared fixtures for the integration scenarios: lobbies wired over the
//! in-process memory network, pumped cooperatively from the test thread.
#![allow(dead_code)]

use instant::{Duration, Instant};
use parlor_p2p::net::MemoryEndpoint;
use parlor_p2p::{Lobby, LobbyConfig, LobbyEvent, MemoryNetwork, PlayerProfile};
use parlor_core::PlayerId;

pub const LOBBY: &str = "LOBBY-1";

pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    futures::executor::block_on(fut)
}

pub fn config() -> LobbyConfig {
    LobbyConfig::new(PlayerId::from(LOBBY))
}

/// Join the lobby under the given display name, becoming host or guest
/// depending on who got there first.
pub fn join(network: &MemoryNetwork, name: &str) -> Lobby<MemoryEndpoint> {
    join_with(network, name, config())
}

pub fn join_with(
    network: &MemoryNetwork,
    name: &str,
    config: LobbyConfig,
) -> Lobby<MemoryEndpoint> {
    block_on(Lobby::establish(
        network,
        config,
        PlayerProfile::new(name, "cat"),
    ))
    .unwrap_or_else(|err| panic!("establish failed for {name}: {err}"))
}

/// Pump every lobby `rounds` times at a fixed instant, collecting the
/// events each one surfaced. A handful of rounds is enough for any
/// command to complete its round trip through the host.
pub fn pump(lobbies: &mut [&mut Lobby<MemoryEndpoint>], rounds: usize) -> Vec<Vec<LobbyEvent>> {
    pump_at(lobbies, Instant::now(), Duration::ZERO, rounds)
}

/// Pump with simulated time: each round advances `step` past `start`.
pub fn pump_at(
    lobbies: &mut [&mut Lobby<MemoryEndpoint>],
    start: Instant,
    step: Duration,
    rounds: usize,
) -> Vec<Vec<LobbyEvent>> {
    let mut collected: Vec<Vec<LobbyEvent>> = vec![Vec::new(); lobbies.len()];

    for round in 0..rounds {
        let now = start + step * round as u32;
        for (lobby, sink) in lobbies.iter_mut().zip(collected.iter_mut()) {
            sink.extend(lobby.poll(now));
        }
    }

    collected
}

/// The one `GameStarted` event in a batch, if any
pub fn game_started(events: &[LobbyEvent]) -> Option<&LobbyEvent> {
    events
        .iter()
        .find(|e| matches!(e, LobbyEvent::GameStarted { .. }))
}
