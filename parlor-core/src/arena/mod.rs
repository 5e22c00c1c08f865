//! Continuous-state duel arena.
//!
//! The authoritative side steps the full simulation; the other side only
//! pursues its own paddle and blends everything else toward received
//! snapshots. Nothing here touches the network.

pub mod snapshot;
pub mod state;
pub mod tuning;
pub mod vec2;

pub use snapshot::{ArenaSnapshot, EntityId, EntityState};
pub use state::{ArenaConfig, ArenaEvent, ArenaState, SimPhase};
pub use tuning::SyncTuning;
pub use vec2::Vec2;
