use instant::Duration;
use parlor_core::PlayerId;

/// Configuration for a lobby runtime
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Matchbox signalling server URL
    pub signalling_url: String,

    /// Rendezvous identifier; also names the signalling room
    pub lobby_id: PlayerId,

    /// How often the embedding app should call `poll`
    pub poll_interval: Duration,

    /// Ping cadence per open link
    pub heartbeat_interval: Duration,

    /// Silence after which a link is declared dead; several multiples of
    /// the heartbeat interval so one lost ping never kills a link
    pub liveness_timeout: Duration,

    /// How long a registration watches the room before a claim stands
    pub claim_window: Duration,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            signalling_url: "wss://match.parlor.games".to_string(),
            lobby_id: PlayerId::from("parlor-lobby"),
            poll_interval: Duration::from_millis(50),
            heartbeat_interval: Duration::from_secs(2),
            liveness_timeout: Duration::from_secs(8),
            claim_window: Duration::from_millis(1500),
        }
    }
}

impl LobbyConfig {
    pub fn new(lobby_id: PlayerId) -> Self {
        Self {
            lobby_id,
            ..Default::default()
        }
    }

    pub fn with_signalling_url(mut self, url: impl Into<String>) -> Self {
        self.signalling_url = url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_liveness_timeout(mut self, timeout: Duration) -> Self {
        self.liveness_timeout = timeout;
        self
    }

    pub fn with_claim_window(mut self, window: Duration) -> Self {
        self.claim_window = window;
        self
    }
}

/// Local player identity presented in `HELLO`
#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub name: String,
    pub avatar: String,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_timeout_above_interval() {
        let config = LobbyConfig::default();
        assert!(config.liveness_timeout >= config.heartbeat_interval * 3);
    }

    #[test]
    fn test_builders() {
        let config = LobbyConfig::new(PlayerId::from("LOBBY-1"))
            .with_signalling_url("ws://localhost:3536")
            .with_heartbeat_interval(Duration::from_millis(500))
            .with_liveness_timeout(Duration::from_secs(2));

        assert_eq!(config.lobby_id, PlayerId::from("LOBBY-1"));
        assert_eq!(config.signalling_url, "ws://localhost:3536");
        assert_eq!(config.heartbeat_interval, Duration::from_millis(500));
    }
}
