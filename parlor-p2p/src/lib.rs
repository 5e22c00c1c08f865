// Transport seam and lobby runtime on top of the parlor-core domain.

pub mod config;
pub mod directory;
pub mod election;
pub mod error;
pub mod guest;
pub mod heartbeat;
pub mod lobby;
pub mod net;
pub mod realtime;
pub mod turn_session;
pub mod wire;

// Re-exports for convenience
pub use config::{LobbyConfig, PlayerProfile};
pub use directory::{HostDirectory, Outgoing};
pub use election::{elect, Elected, LobbyRole};
pub use error::{NetError, Result};
pub use guest::{GuestLobby, LobbyEvent};
pub use heartbeat::{LivenessMonitor, LivenessReport};
pub use lobby::Lobby;
pub use net::{Endpoint, LinkEvent, MatchboxNetwork, MemoryNetwork, Network};
pub use realtime::RealtimeSession;
pub use turn_session::TurnSession;
pub use wire::{Envelope, MoveKind};
