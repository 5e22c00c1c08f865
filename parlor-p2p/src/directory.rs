//! Host-side presence directory and relay router.
//!
//! All roster truth lives here; guests only ever see broadcast mirrors.
//! Directory commands mutate the roster and trigger a full-roster
//! rebroadcast. Relay-tagged traffic never touches the roster: it is
//! forwarded to the named target with the original bytes, so a relayed
//! message is byte-identical to what the sender produced.

use crate::wire::Envelope;
use parlor_core::{Discipline, GameSession, PlayerId, PlayerRecord, Roster};
use std::collections::HashMap;
use uuid::Uuid;

/// One instruction for the transport layer
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// Encode and send an envelope to a peer
    To(PlayerId, Envelope),
    /// Forward raw bytes untouched (the relay path)
    Forward(PlayerId, Vec<u8>),
}

pub struct HostDirectory {
    roster: Roster,
    sessions: HashMap<Uuid, GameSession>,
    /// Discipline announced with each open room offer
    offered: HashMap<PlayerId, Discipline>,
}

impl HostDirectory {
    /// The host is a player like any other; its own record is in the
    /// roster from the start.
    pub fn new(local: PlayerRecord) -> Self {
        let mut roster = Roster::new();
        // A fresh roster cannot already hold this id
        let _ = roster.insert(local);

        Self {
            roster,
            sessions: HashMap::new(),
            offered: HashMap::new(),
        }
    }

    // ===== Queries =====

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn session_of(&self, player: &PlayerId) -> Option<&GameSession> {
        self.sessions.values().find(|s| s.contains(player))
    }

    // ===== Inbound dispatch =====

    /// Process one inbound message from `from` and return the transport
    /// instructions it produces. Protocol violations are no-ops: nothing
    /// mutates and nothing is sent.
    pub fn handle(&mut self, from: &PlayerId, bytes: &[u8]) -> Vec<Outgoing> {
        match Envelope::decode(bytes) {
            Envelope::Hello { name, avatar } => self.on_hello(from, name, avatar),
            Envelope::CreateRoom { discipline } => self.on_create_room(from, discipline),
            Envelope::CancelHosting => self.on_cancel_hosting(from),
            Envelope::JoinRoom { target } => self.on_join_room(from, &target),
            Envelope::LeaveGame { .. } => self.on_leave_game(from),
            Envelope::GameMove { to, .. } => self.relay(from, &to, bytes),
            Envelope::RematchStart { .. } => self.relay_to_opponent(from, bytes),
            Envelope::Ping => vec![Outgoing::To(from.clone(), Envelope::Pong)],
            Envelope::Pong => Vec::new(),
            Envelope::PlayerList { .. } | Envelope::GameStart { .. } => {
                // Host-originated types have no business arriving inbound
                tracing::debug!(%from, "ignoring host-only envelope from guest");
                Vec::new()
            }
            Envelope::Unknown => {
                tracing::debug!(%from, "ignoring unknown envelope");
                Vec::new()
            }
        }
    }

    /// A link died (deliberate close or liveness expiry). Removes the
    /// record, rebroadcasts, and synthesizes the leave the dead peer can
    /// no longer send.
    pub fn peer_closed(&mut self, peer: &PlayerId) -> Vec<Outgoing> {
        let mut out = Vec::new();

        if let Some(session) = self.session_of(peer).cloned() {
            out.extend(self.end_session(&session, peer));
        }

        self.offered.remove(peer);
        if self.roster.remove(peer).is_some() {
            tracing::info!(%peer, "removed from roster");
            out.extend(self.broadcast_roster());
        }

        out
    }

    // ===== Handlers =====

    fn on_hello(&mut self, from: &PlayerId, name: String, avatar: String) -> Vec<Outgoing> {
        let record = match PlayerRecord::new(from.clone(), name, avatar) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%from, %err, "rejected HELLO");
                return Vec::new();
            }
        };

        match self.roster.insert(record) {
            Ok(()) => {
                tracing::info!(%from, "player joined lobby");
                self.broadcast_roster()
            }
            Err(err) => {
                tracing::debug!(%from, %err, "HELLO ignored");
                Vec::new()
            }
        }
    }

    fn on_create_room(&mut self, from: &PlayerId, discipline: Discipline) -> Vec<Outgoing> {
        match self.roster.start_hosting(from) {
            Ok(()) => {
                self.offered.insert(from.clone(), discipline);
                tracing::info!(%from, %discipline, "room offered");
                self.broadcast_roster()
            }
            Err(err) => {
                tracing::debug!(%from, %err, "CREATE_ROOM rejected");
                Vec::new()
            }
        }
    }

    fn on_cancel_hosting(&mut self, from: &PlayerId) -> Vec<Outgoing> {
        match self.roster.cancel_hosting(from) {
            Ok(()) => {
                self.offered.remove(from);
                tracing::info!(%from, "room offer withdrawn");
                self.broadcast_roster()
            }
            Err(err) => {
                tracing::debug!(%from, %err, "CANCEL_HOSTING rejected");
                Vec::new()
            }
        }
    }

    fn on_join_room(&mut self, from: &PlayerId, target: &PlayerId) -> Vec<Outgoing> {
        if let Err(err) = self.roster.pair(from, target) {
            // Stale roster view on the requester's side; no message back
            tracing::debug!(%from, %target, %err, "JOIN_ROOM rejected");
            return Vec::new();
        }

        let discipline = self.offered.remove(target).unwrap_or(Discipline::TurnBased);
        let session = GameSession::new(target.clone(), from.clone(), discipline);
        tracing::info!(session = %session.id(), starter = %target, responder = %from, "session created");

        let mut out = vec![
            Outgoing::To(
                target.clone(),
                Envelope::GameStart {
                    session: session.clone(),
                    opponent: from.clone(),
                    starts_first: true,
                    discipline,
                },
            ),
            Outgoing::To(
                from.clone(),
                Envelope::GameStart {
                    session: session.clone(),
                    opponent: target.clone(),
                    starts_first: false,
                    discipline,
                },
            ),
        ];
        self.sessions.insert(session.id(), session);

        out.extend(self.broadcast_roster());
        out
    }

    fn on_leave_game(&mut self, from: &PlayerId) -> Vec<Outgoing> {
        let Some(session) = self.session_of(from).cloned() else {
            tracing::debug!(%from, "LEAVE_GAME without a session");
            return Vec::new();
        };

        let mut out = self.end_session(&session, from);
        out.extend(self.broadcast_roster());
        out
    }

    /// Tear down a session on behalf of `leaver` and notify the survivor
    fn end_session(&mut self, session: &GameSession, leaver: &PlayerId) -> Vec<Outgoing> {
        self.sessions.remove(&session.id());
        for player in session.players() {
            self.roster.release(player);
        }

        match session.opponent_of(leaver) {
            Some(survivor) => {
                tracing::info!(session = %session.id(), %leaver, %survivor, "session ended");
                vec![Outgoing::To(
                    survivor.clone(),
                    Envelope::LeaveGame {
                        from: leaver.clone(),
                    },
                )]
            }
            None => Vec::new(),
        }
    }

    // ===== Relay =====

    fn relay(&self, from: &PlayerId, to: &PlayerId, bytes: &[u8]) -> Vec<Outgoing> {
        if !self.roster.contains(to) {
            // Stale target; drop silently
            tracing::debug!(%from, %to, "relay target unknown, dropped");
            return Vec::new();
        }
        vec![Outgoing::Forward(to.clone(), bytes.to_vec())]
    }

    fn relay_to_opponent(&self, from: &PlayerId, bytes: &[u8]) -> Vec<Outgoing> {
        match self.session_of(from).and_then(|s| s.opponent_of(from)) {
            Some(opponent) => vec![Outgoing::Forward(opponent.clone(), bytes.to_vec())],
            None => {
                tracing::debug!(%from, "REMATCH_START outside a session, dropped");
                Vec::new()
            }
        }
    }

    // ===== Broadcast =====

    /// Full roster to every member, the host's own mirror included
    fn broadcast_roster(&self) -> Vec<Outgoing> {
        let roster = self.roster.to_broadcast();
        roster
            .iter()
            .map(|record| {
                Outgoing::To(
                    record.id().clone(),
                    Envelope::PlayerList {
                        roster: roster.clone(),
                    },
                )
            })
            .collect()
    }
}
