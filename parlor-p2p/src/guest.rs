//! Guest-side lobby mirror.
//!
//! Holds a read-only copy of the roster, replaced wholesale on each
//! `PLAYER_LIST`, and translates inbound envelopes into app-facing
//! [`LobbyEvent`]s. The host runs the same mirror for its own view, fed
//! by looped-back broadcasts, so host-as-player needs no special casing.

use crate::wire::{Envelope, MoveKind};
use parlor_core::{GameSession, PlayerId, PlayerRecord};

/// Events surfaced to the embedding application
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// Roster mirror replaced
    RosterChanged(Vec<PlayerRecord>),
    GameStarted {
        session: GameSession,
        opponent: PlayerId,
        starts_first: bool,
    },
    /// Relayed game traffic addressed to us
    MoveReceived {
        kind: MoveKind,
        payload: serde_json::Value,
    },
    /// The opponent offered a rematch with a complete baseline state
    RematchOffered { state: serde_json::Value },
    /// Scoring decided by the authoritative side of a real-time session
    ArenaScored(parlor_core::arena::ArenaEvent),
    OpponentLeft { who: PlayerId },
    /// A peer went silent past the liveness timeout
    PeerOffline(PlayerId),
    /// Our link to the host is gone; the lobby is over for us
    HostUnreachable,
}

/// Read-only roster mirror plus the active session, per peer
#[derive(Default)]
pub struct GuestLobby {
    roster: Vec<PlayerRecord>,
    session: Option<GameSession>,
}

impl GuestLobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &[PlayerRecord] {
        &self.roster
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Apply one inbound envelope to the mirror. Transport concerns
    /// (PING/PONG) are handled before this point.
    pub fn apply(&mut self, envelope: Envelope) -> Option<LobbyEvent> {
        match envelope {
            Envelope::PlayerList { roster } => {
                self.roster = roster.clone();
                Some(LobbyEvent::RosterChanged(roster))
            }
            Envelope::GameStart {
                session,
                opponent,
                starts_first,
                ..
            } => {
                tracing::info!(session = %session.id(), %opponent, starts_first, "game started");
                self.session = Some(session.clone());
                Some(LobbyEvent::GameStarted {
                    session,
                    opponent,
                    starts_first,
                })
            }
            Envelope::GameMove { kind, payload, .. } => {
                Some(LobbyEvent::MoveReceived { kind, payload })
            }
            Envelope::RematchStart { state } => Some(LobbyEvent::RematchOffered { state }),
            Envelope::LeaveGame { from } => {
                tracing::info!(%from, "opponent left the game");
                self.session = None;
                Some(LobbyEvent::OpponentLeft { who: from })
            }
            Envelope::Unknown => {
                tracing::debug!("ignoring unknown envelope");
                None
            }
            other => {
                tracing::debug!(?other, "envelope not meant for the mirror");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_core::Discipline;

    fn record(id: &str) -> PlayerRecord {
        PlayerRecord::new(PlayerId::from(id), id.to_uppercase(), "cat").unwrap()
    }

    #[test]
    fn test_player_list_replaces_mirror_wholesale() {
        let mut lobby = GuestLobby::new();

        lobby.apply(Envelope::PlayerList {
            roster: vec![record("alice"), record("bob")],
        });
        assert_eq!(lobby.roster().len(), 2);

        let event = lobby.apply(Envelope::PlayerList {
            roster: vec![record("alice")],
        });
        assert_eq!(lobby.roster().len(), 1);
        assert!(matches!(event, Some(LobbyEvent::RosterChanged(r)) if r.len() == 1));
    }

    #[test]
    fn test_game_start_installs_session() {
        let mut lobby = GuestLobby::new();
        let session = GameSession::new(
            PlayerId::from("bob"),
            PlayerId::from("alice"),
            Discipline::TurnBased,
        );

        let event = lobby.apply(Envelope::GameStart {
            session: session.clone(),
            opponent: PlayerId::from("bob"),
            starts_first: false,
            discipline: Discipline::TurnBased,
        });

        assert_eq!(lobby.session().map(|s| s.id()), Some(session.id()));
        assert!(matches!(
            event,
            Some(LobbyEvent::GameStarted { starts_first: false, .. })
        ));
    }

    #[test]
    fn test_leave_game_clears_session() {
        let mut lobby = GuestLobby::new();
        lobby.apply(Envelope::GameStart {
            session: GameSession::new(
                PlayerId::from("bob"),
                PlayerId::from("alice"),
                Discipline::TurnBased,
            ),
            opponent: PlayerId::from("bob"),
            starts_first: false,
            discipline: Discipline::TurnBased,
        });

        let event = lobby.apply(Envelope::LeaveGame {
            from: PlayerId::from("bob"),
        });

        assert!(lobby.session().is_none());
        assert_eq!(
            event,
            Some(LobbyEvent::OpponentLeft {
                who: PlayerId::from("bob")
            })
        );
    }

    #[test]
    fn test_unknown_envelope_produces_no_event() {
        let mut lobby = GuestLobby::new();
        assert_eq!(lobby.apply(Envelope::Unknown), None);
    }
}
