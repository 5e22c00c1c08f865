use parlor_core::PlayerId;

/// Transport and runtime errors.
///
/// `IdentityTaken` is the one unambiguous claim rejection the election
/// routine depends on; `Unavailable` is the only fatal case and is always
/// reported to the caller, never silently retried.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Identity already claimed: {0}")]
    IdentityTaken(PlayerId),

    #[error("Network unavailable: {0}")]
    Unavailable(String),

    #[error("Peer not found: {0}")]
    PeerNotFound(PlayerId),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No active game session")]
    NoActiveSession,

    #[error("Invalid player profile: {0}")]
    InvalidProfile(#[from] parlor_core::domain::PlayerError),
}

pub type Result<T> = std::result::Result<T, NetError>;
