//! Poll-driven lobby runtime.
//!
//! One `Lobby` per process, host or guest, created by running the
//! election. A single cooperative `poll()` pumps endpoint events,
//! liveness, envelope dispatch and the active real-time driver; no
//! background threads. Commands are fire-and-forget: their effects come
//! back as [`LobbyEvent`]s from later polls.
//!
//! The host is a player like any other: directory outputs addressed to
//! the host loop back into its own mirror, so every app-facing code path
//! is identical across roles.

use crate::config::{LobbyConfig, PlayerProfile};
use crate::directory::{HostDirectory, Outgoing};
use crate::election::{elect, Elected, LobbyRole};
use crate::error::{NetError, Result};
use crate::guest::{GuestLobby, LobbyEvent};
use crate::heartbeat::LivenessMonitor;
use crate::net::{Endpoint, LinkEvent, Network};
use crate::realtime::RealtimeSession;
use crate::wire::{Envelope, MoveKind};
use instant::Instant;
use parlor_core::arena::{ArenaConfig, SyncTuning};
use parlor_core::{Discipline, PlayerId, PlayerRecord, Seat};
use uuid::Uuid;

pub struct Lobby<E: Endpoint> {
    endpoint: E,
    role: LobbyRole,
    /// The host's identity; for the host itself this is its own id
    host: PlayerId,
    profile: PlayerProfile,
    directory: Option<HostDirectory>,
    mirror: GuestLobby,
    liveness: LivenessMonitor,
    realtime: Option<RealtimeSession>,
    tuning: SyncTuning,
    helloed: bool,
    pending: Vec<LobbyEvent>,
}

impl<E: Endpoint> Lobby<E> {
    /// Run the election and set up the runtime for whichever role it
    /// yields
    pub async fn establish<N>(network: &N, config: LobbyConfig, profile: PlayerProfile) -> Result<Self>
    where
        N: Network<Endpoint = E>,
    {
        let fresh = PlayerId::from(Uuid::new_v4().to_string());
        let elected = elect(network, config.lobby_id.clone(), fresh).await?;
        let role = elected.role();

        let (endpoint, host) = match elected {
            Elected::Host(endpoint) => {
                let host = endpoint.local_id().clone();
                (endpoint, host)
            }
            Elected::Guest { endpoint, host } => (endpoint, host),
        };

        let mut lobby = Lobby {
            endpoint,
            role,
            host,
            profile,
            directory: None,
            mirror: GuestLobby::new(),
            liveness: LivenessMonitor::new(config.heartbeat_interval, config.liveness_timeout),
            realtime: None,
            tuning: SyncTuning::default(),
            helloed: false,
            pending: Vec::new(),
        };

        if role == LobbyRole::Host {
            let record = PlayerRecord::new(
                lobby.endpoint.local_id().clone(),
                lobby.profile.name.clone(),
                lobby.profile.avatar.clone(),
            )?;
            let directory = HostDirectory::new(record);

            // Seed the host's own mirror with the one-player roster
            lobby.deliver_local(Envelope::PlayerList {
                roster: directory.roster().to_broadcast(),
            });
            lobby.directory = Some(directory);
        }

        Ok(lobby)
    }

    // ===== Queries =====

    pub fn role(&self) -> LobbyRole {
        self.role
    }

    pub fn local_id(&self) -> &PlayerId {
        self.endpoint.local_id()
    }

    pub fn roster(&self) -> &[PlayerRecord] {
        self.mirror.roster()
    }

    pub fn session(&self) -> Option<&parlor_core::GameSession> {
        self.mirror.session()
    }

    pub fn realtime(&self) -> Option<&RealtimeSession> {
        self.realtime.as_ref()
    }

    /// Per-game tuning for the next real-time session
    pub fn set_sync_tuning(&mut self, tuning: SyncTuning) {
        self.tuning = tuning;
    }

    // ===== Poll pump =====

    /// Pump everything once: endpoint events, liveness, the real-time
    /// driver. Returns the app-facing events that resulted.
    pub fn poll(&mut self, now: Instant) -> Vec<LobbyEvent> {
        for event in self.endpoint.poll_events() {
            match event {
                LinkEvent::Opened(peer) => self.on_opened(peer, now),
                LinkEvent::Data { from, bytes } => {
                    self.liveness.refresh(&from, now);
                    self.on_data(&from, &bytes);
                }
                LinkEvent::Closed(peer) => self.on_closed(peer),
                LinkEvent::Failed { peer, reason } => {
                    tracing::warn!(%peer, %reason, "link failed");
                    self.on_closed(peer);
                }
            }
        }

        self.pump_liveness(now);
        self.pump_realtime(now);

        std::mem::take(&mut self.pending)
    }

    fn on_opened(&mut self, peer: PlayerId, now: Instant) {
        self.liveness.track(peer.clone(), now);

        // Our side of the handshake: introduce ourselves to the host
        if self.role == LobbyRole::Guest && peer == self.host && !self.helloed {
            self.helloed = true;
            let hello = Envelope::Hello {
                name: self.profile.name.clone(),
                avatar: self.profile.avatar.clone(),
            };
            self.send_to_peer(&self.host.clone(), &hello);
        }
    }

    fn on_data(&mut self, from: &PlayerId, bytes: &[u8]) {
        match self.role {
            LobbyRole::Host => {
                let out = match self.directory.as_mut() {
                    Some(directory) => directory.handle(from, bytes),
                    None => Vec::new(),
                };
                self.dispatch(out);
            }
            LobbyRole::Guest => match Envelope::decode(bytes) {
                Envelope::Ping => {
                    self.send_to_peer(&self.host.clone(), &Envelope::Pong);
                }
                Envelope::Pong => {}
                envelope => self.deliver_local(envelope),
            },
        }
    }

    fn on_closed(&mut self, peer: PlayerId) {
        self.liveness.forget(&peer);

        match self.role {
            LobbyRole::Host => {
                let out = match self.directory.as_mut() {
                    Some(directory) => directory.peer_closed(&peer),
                    None => Vec::new(),
                };
                self.dispatch(out);
            }
            LobbyRole::Guest => {
                if peer == self.host {
                    tracing::warn!("lost the link to the host");
                    self.realtime = None;
                    self.mirror.clear_session();
                    self.pending.push(LobbyEvent::HostUnreachable);
                }
            }
        }
    }

    fn pump_liveness(&mut self, now: Instant) {
        let report = self.liveness.poll(now);

        for peer in report.due_pings {
            self.send_to_peer(&peer, &Envelope::Ping);
        }

        for peer in report.expired {
            self.endpoint.close(&peer);
            self.pending.push(LobbyEvent::PeerOffline(peer.clone()));
            // Same consequences as an observed close
            self.on_closed(peer);
        }
    }

    fn pump_realtime(&mut self, now: Instant) {
        let Some(realtime) = self.realtime.as_mut() else {
            return;
        };

        let outs = match realtime.tick(now) {
            Ok(outs) => outs,
            Err(err) => {
                tracing::warn!(%err, "real-time tick failed");
                return;
            }
        };

        for (kind, payload) in outs {
            // Scoring decided locally surfaces here; the mirror's copy
            // surfaces when the relayed event arrives
            if kind == MoveKind::ArenaEvent {
                match serde_json::from_value(payload.clone()) {
                    Ok(event) => self.pending.push(LobbyEvent::ArenaScored(event)),
                    Err(err) => tracing::warn!(%err, "unreadable arena event"),
                }
            }

            if let Err(err) = self.send_game(kind, payload) {
                tracing::debug!(%err, "dropping real-time payload");
            }
        }
    }

    // ===== Commands (fire-and-forget) =====

    /// Offer a room with the given discipline
    pub fn start_hosting(&mut self, discipline: Discipline) -> Result<()> {
        self.upstream(Envelope::CreateRoom { discipline })
    }

    pub fn cancel_hosting(&mut self) -> Result<()> {
        self.upstream(Envelope::CancelHosting)
    }

    pub fn request_join(&mut self, target: PlayerId) -> Result<()> {
        self.upstream(Envelope::JoinRoom { target })
    }

    /// Leave the active game. Our own session state clears immediately;
    /// the opponent learns via the host's relay.
    pub fn leave_game(&mut self) -> Result<()> {
        let leave = Envelope::LeaveGame {
            from: self.local_id().clone(),
        };
        self.mirror.clear_session();
        self.realtime = None;
        self.upstream(leave)
    }

    /// Record the local input target for the active real-time session;
    /// the wire report rides on the next due tick
    pub fn set_input_target(&mut self, target: parlor_core::arena::Vec2) -> Result<()> {
        self.realtime
            .as_mut()
            .ok_or(NetError::NoActiveSession)?
            .set_target(target);
        Ok(())
    }

    /// Send game traffic to the session opponent via the host's relay
    pub fn send_game(&mut self, kind: MoveKind, payload: serde_json::Value) -> Result<()> {
        let opponent = self.opponent()?;
        self.upstream(Envelope::GameMove {
            to: opponent,
            kind,
            payload,
        })
    }

    /// Offer a rematch. Turn-based callers pass the exported baseline;
    /// real-time sessions reset in place and the state rides along as
    /// `null`.
    pub fn send_rematch(&mut self, state: serde_json::Value) -> Result<()> {
        if let Some(realtime) = self.realtime.as_mut() {
            realtime.rematch();
        }
        self.upstream(Envelope::RematchStart { state })
    }

    // ===== Routing =====

    /// Send a command through the lobby's authority: guests hand it to
    /// the host, the host hands it to its own directory
    fn upstream(&mut self, envelope: Envelope) -> Result<()> {
        match self.role {
            LobbyRole::Guest => {
                let bytes = envelope.encode()?;
                self.endpoint.send_to(&self.host.clone(), bytes)
            }
            LobbyRole::Host => {
                let bytes = envelope.encode()?;
                let local = self.local_id().clone();
                let out = match self.directory.as_mut() {
                    Some(directory) => directory.handle(&local, &bytes),
                    None => Vec::new(),
                };
                self.dispatch(out);
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, out: Vec<Outgoing>) {
        let local = self.local_id().clone();

        for instruction in out {
            match instruction {
                Outgoing::To(to, envelope) if to == local => self.deliver_local(envelope),
                Outgoing::To(to, envelope) => self.send_to_peer(&to, &envelope),
                Outgoing::Forward(to, bytes) if to == local => {
                    self.deliver_local(Envelope::decode(&bytes))
                }
                Outgoing::Forward(to, bytes) => {
                    if let Err(err) = self.endpoint.send_to(&to, bytes) {
                        tracing::debug!(%to, %err, "relay send failed");
                    }
                }
            }
        }
    }

    fn send_to_peer(&mut self, to: &PlayerId, envelope: &Envelope) {
        match envelope.encode() {
            Ok(bytes) => {
                if let Err(err) = self.endpoint.send_to(to, bytes) {
                    tracing::debug!(%to, %err, "send failed");
                }
            }
            Err(err) => tracing::warn!(%err, "envelope encoding failed"),
        }
    }

    /// An envelope addressed to this player, whichever role produced it
    fn deliver_local(&mut self, envelope: Envelope) {
        // Real-time payloads feed the driver instead of the app
        if let Envelope::GameMove { kind, payload, .. } = &envelope {
            if *kind != MoveKind::TurnMove {
                if let Some(realtime) = self.realtime.as_mut() {
                    match realtime.handle(*kind, payload.clone()) {
                        Ok(Some(event)) => self.pending.push(LobbyEvent::ArenaScored(event)),
                        Ok(None) => {}
                        Err(err) => tracing::warn!(%err, "real-time payload rejected"),
                    }
                    return;
                }
            }
        }

        let Some(event) = self.mirror.apply(envelope) else {
            return;
        };

        match &event {
            LobbyEvent::GameStarted {
                session,
                starts_first,
                ..
            } => {
                if session.discipline() == Discipline::Realtime {
                    let seat = if *starts_first {
                        Seat::Starter
                    } else {
                        Seat::Responder
                    };
                    self.realtime = Some(RealtimeSession::new(
                        ArenaConfig::default(),
                        self.tuning.clone(),
                        seat,
                        *starts_first,
                    ));
                }
            }
            LobbyEvent::OpponentLeft { .. } => {
                self.realtime = None;
            }
            LobbyEvent::RematchOffered { .. } => {
                if let Some(realtime) = self.realtime.as_mut() {
                    realtime.rematch();
                }
            }
            _ => {}
        }

        self.pending.push(event);
    }

    fn opponent(&self) -> Result<PlayerId> {
        let local = self.endpoint.local_id();
        self.mirror
            .session()
            .and_then(|s| s.opponent_of(local))
            .cloned()
            .ok_or(NetError::NoActiveSession)
    }
}
