//! Matchbox (WebRTC) adapter.
//!
//! The signalling room is named by the lobby's rendezvous identifier, so
//! every lobby member joins the same room. Registering the rendezvous id
//! itself is the ownership claim: the claimer pings each occupant it sees
//! during the claim window, and an answer proves an established lobby
//! already holds the identity, reported as `IdentityTaken`. Rival claimers
//! never answer (they are still claiming themselves), so a simultaneous
//! race is broken by socket id, lowest wins.
//!
//! Matchbox assigns its own peer ids, so a guest's endpoint identity is
//! the socket id rather than the requested fresh id; `local_id()` is
//! authoritative either way. The rendezvous id is kept as an alias for
//! the first connected peer so guests can address the host by name.

use crate::error::{NetError, Result};
use crate::net::{Endpoint, LinkEvent, Network};
use crate::wire::Envelope;
use async_trait::async_trait;
use instant::{Duration, Instant};
use matchbox_socket::{PeerState, RtcIceServerConfig, WebRtcSocket, WebRtcSocketBuilder};
use parlor_core::PlayerId;
use uuid::Uuid;

/// Network over a matchbox signalling server
#[derive(Debug, Clone)]
pub struct MatchboxNetwork {
    signalling_url: String,
    /// Rendezvous identifier, also the signalling room name
    lobby: PlayerId,
    claim_window: Duration,
    ice: Option<RtcIceServerConfig>,
}

impl MatchboxNetwork {
    pub fn new(signalling_url: impl Into<String>, lobby: PlayerId) -> Self {
        Self {
            signalling_url: signalling_url.into(),
            lobby,
            claim_window: Duration::from_millis(1500),
            ice: None,
        }
    }

    pub fn with_claim_window(mut self, window: Duration) -> Self {
        self.claim_window = window;
        self
    }

    pub fn with_ice_server(mut self, ice: RtcIceServerConfig) -> Self {
        self.ice = Some(ice);
        self
    }

    fn room_url(&self) -> String {
        format!("{}/{}", self.signalling_url, self.lobby)
    }
}

#[async_trait(?Send)]
impl Network for MatchboxNetwork {
    type Endpoint = MatchboxEndpoint;

    async fn register(&self, id: PlayerId) -> Result<MatchboxEndpoint> {
        let room = self.room_url();
        tracing::info!(%id, %room, "connecting to signalling server");

        // ICE config must precede the channel; the builder locks it
        // afterwards
        let mut builder = WebRtcSocketBuilder::new(&room);
        if let Some(ice) = &self.ice {
            builder = builder.ice_server(ice.clone());
        }
        let (mut socket, loop_fut) = builder
            .add_channel(matchbox_socket::ChannelConfig::reliable())
            .build();

        // Platform-agnostic spawn of the socket driver future
        let span = tracing::info_span!("matchbox::socket_loop");

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let _enter = span.enter();
            let _ = loop_fut.await;
        });

        #[cfg(not(target_arch = "wasm32"))]
        {
            #[cfg(feature = "native")]
            tokio::spawn(async move {
                let _enter = span.enter();
                let _ = loop_fut.await;
            });

            #[cfg(not(feature = "native"))]
            compile_error!("Non-WASM builds require the 'native' feature to be enabled");
        }

        let socket_id = wait_for_socket_id(&mut socket).await?;
        tracing::info!(%socket_id, "signalling handshake complete");

        let claiming = id == self.lobby;
        if claiming {
            // Probe the room for the claim window. Each occupant gets a
            // ping; an established lobby answers it, rival claimers stay
            // silent because they are inside this very loop themselves.
            let ping = Envelope::Ping.encode()?;
            let deadline = Instant::now() + self.claim_window;
            let mut occupants: Vec<Uuid> = Vec::new();
            let mut heard_reply = false;

            while Instant::now() < deadline && !heard_reply {
                for (peer, state) in socket.update_peers() {
                    if state == PeerState::Connected {
                        occupants.push(peer.0);
                        socket
                            .channel_mut(0)
                            .send(ping.clone().into_boxed_slice(), peer);
                    }
                }
                for (_, packet) in socket.channel_mut(0).receive() {
                    if matches!(Envelope::decode(&packet), Envelope::Pong) {
                        heard_reply = true;
                    }
                }
                platform_sleep(20).await;
            }

            if !claim_won(socket_id, heard_reply, &occupants) {
                tracing::info!(%id, "rendezvous identity already claimed");
                return Err(NetError::IdentityTaken(id));
            }
        }

        let local = if claiming {
            id
        } else {
            PlayerId::from(socket_id.to_string())
        };

        Ok(MatchboxEndpoint {
            socket,
            local,
            alias: None,
            pending_alias: None,
        })
    }
}

/// Whether our claim on the room stands. A reply heard during the window
/// means the identity is already held, no matter whose socket id is lower;
/// silent occupants are rival claimers and the lowest socket id wins.
fn claim_won(ours: Uuid, heard_reply: bool, rivals: &[Uuid]) -> bool {
    !heard_reply && rivals.iter().all(|other| ours < *other)
}

/// One matchbox socket in the lobby room
pub struct MatchboxEndpoint {
    socket: WebRtcSocket,
    local: PlayerId,
    /// Rendezvous id bound to the host's socket peer, for guests
    alias: Option<(PlayerId, matchbox_socket::PeerId)>,
    pending_alias: Option<PlayerId>,
}

impl MatchboxEndpoint {
    fn resolve(&self, peer: &PlayerId) -> Option<matchbox_socket::PeerId> {
        if let Some((name, bound)) = &self.alias {
            if name == peer {
                return Some(*bound);
            }
        }
        Uuid::parse_str(peer.as_str())
            .ok()
            .map(matchbox_socket::PeerId)
    }

    fn name_of(&self, peer: matchbox_socket::PeerId) -> PlayerId {
        if let Some((name, bound)) = &self.alias {
            if *bound == peer {
                return name.clone();
            }
        }
        PlayerId::from(peer.0.to_string())
    }
}

impl Endpoint for MatchboxEndpoint {
    fn local_id(&self) -> &PlayerId {
        &self.local
    }

    fn open(&mut self, peer: &PlayerId) {
        // Matchbox links every room member automatically; opening by the
        // rendezvous name arms the alias so the first peer to connect is
        // addressed by it.
        if Uuid::parse_str(peer.as_str()).is_err() {
            self.pending_alias = Some(peer.clone());
        }
    }

    fn send_to(&mut self, peer: &PlayerId, bytes: Vec<u8>) -> Result<()> {
        let target = self
            .resolve(peer)
            .ok_or_else(|| NetError::PeerNotFound(peer.clone()))?;

        let channel = self.socket.channel_mut(0);
        channel.send(bytes.into_boxed_slice(), target);
        Ok(())
    }

    fn broadcast(&mut self, bytes: Vec<u8>) {
        let peers: Vec<matchbox_socket::PeerId> = self.socket.connected_peers().collect();
        let channel = self.socket.channel_mut(0);
        for peer in peers {
            channel.send(bytes.clone().into_boxed_slice(), peer);
        }
    }

    fn poll_events(&mut self) -> Vec<LinkEvent> {
        let mut events = Vec::new();

        for (peer, state) in self.socket.update_peers() {
            match state {
                PeerState::Connected => {
                    if let Some(name) = self.pending_alias.take() {
                        self.alias = Some((name, peer));
                    }
                    let name = self.name_of(peer);
                    tracing::info!(peer = %name, "link opened");
                    events.push(LinkEvent::Opened(name));
                }
                PeerState::Disconnected => {
                    let name = self.name_of(peer);
                    tracing::info!(peer = %name, "link closed");
                    events.push(LinkEvent::Closed(name));
                }
            }
        }

        let channel = self.socket.channel_mut(0);
        for (peer, packet) in channel.receive() {
            events.push(LinkEvent::Data {
                from: self.name_of(peer),
                bytes: packet.to_vec(),
            });
        }

        events
    }

    fn close(&mut self, peer: &PlayerId) {
        // Matchbox offers no per-peer teardown; the liveness layer stops
        // routing to the peer and the socket drops it on its own timeout.
        tracing::debug!(%peer, "close requested; leaving teardown to the socket");
    }
}

async fn wait_for_socket_id(socket: &mut WebRtcSocket) -> Result<Uuid> {
    let start = Instant::now();
    let timeout = Duration::from_secs(5);

    loop {
        socket.update_peers();

        if let Some(id) = socket.id() {
            return Ok(id.0);
        }

        if start.elapsed() > timeout {
            return Err(NetError::Unavailable(
                "timeout waiting for signalling server".to_string(),
            ));
        }

        platform_sleep(10).await;
    }
}

#[cfg(target_arch = "wasm32")]
async fn platform_sleep(millis: u32) {
    use gloo_timers::future::TimeoutFuture;
    TimeoutFuture::new(millis).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn platform_sleep(millis: u32) {
    #[cfg(feature = "native")]
    tokio::time::sleep(Duration::from_millis(millis as u64)).await;

    #[cfg(not(feature = "native"))]
    compile_error!("Non-WASM builds require the 'native' feature to be enabled");
}
