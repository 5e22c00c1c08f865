use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a peer in the lobby.
///
/// One namespace for everything: transport identity, roster key, relay
/// target and the rendezvous identifier are all `PlayerId`s. The rendezvous
/// identifier is a claimable transport identity, which is why this is a
/// string and not a generated UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Matchmaking status of a player.
///
/// A player is in exactly one status at a time; transitions are owned by
/// the host's presence directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PlayerStatus {
    /// Connected, not offering or playing a game
    Idle,
    /// Offering a room that an idle player may join
    Hosting,
    /// Paired into an active game session
    InGame,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Idle => write!(f, "Idle"),
            PlayerStatus::Hosting => write!(f, "Hosting"),
            PlayerStatus::InGame => write!(f, "InGame"),
        }
    }
}

/// A player as seen in the lobby roster.
///
/// Owned and mutated only by the host's presence directory; guests hold
/// read-only mirrors received via roster broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerRecord {
    /// Transport identity of the player
    id: PlayerId,
    /// Display name
    name: String,
    /// Cosmetic/avatar reference, opaque to the core
    avatar: String,
    /// Matchmaking status
    status: PlayerStatus,
}

/// Errors that can occur when building a player record
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlayerError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name must be between 1 and 50 characters")]
    InvalidNameLength,
}

impl PlayerRecord {
    /// Create a new idle player record
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Result<Self, PlayerError> {
        let name = name.into();
        Self::validate_name(&name)?;

        Ok(PlayerRecord {
            id,
            name,
            avatar: avatar.into(),
            status: PlayerStatus::Idle,
        })
    }

    fn validate_name(name: &str) -> Result<(), PlayerError> {
        if name.is_empty() {
            return Err(PlayerError::EmptyName);
        }

        if name.len() > 50 {
            return Err(PlayerError::InvalidNameLength);
        }

        Ok(())
    }

    // Getters

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn avatar(&self) -> &str {
        &self.avatar
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    // Queries

    pub fn is_idle(&self) -> bool {
        matches!(self.status, PlayerStatus::Idle)
    }

    pub fn is_hosting(&self) -> bool {
        matches!(self.status, PlayerStatus::Hosting)
    }

    pub fn is_in_game(&self) -> bool {
        matches!(self.status, PlayerStatus::InGame)
    }

    // Mutations (roster-internal)

    pub(crate) fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }
}
