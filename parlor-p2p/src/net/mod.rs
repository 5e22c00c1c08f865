//! Transport seam.
//!
//! Everything above this module sees peers only through [`Endpoint`] and
//! [`Network`]; the in-memory broker and the matchbox adapter are the two
//! implementations. Delivery contract: at-most-once, ordered per link, no
//! built-in retry.

pub mod matchbox;
pub mod memory;

pub use matchbox::{MatchboxEndpoint, MatchboxNetwork};
pub use memory::{MemoryEndpoint, MemoryNetwork};

use crate::error::Result;
use async_trait::async_trait;
use parlor_core::PlayerId;

/// The four external transport events the runtime consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A link to `peer` is now open in both directions
    Opened(PlayerId),
    Data {
        from: PlayerId,
        bytes: Vec<u8>,
    },
    /// The link closed (deliberately or by transport failure)
    Closed(PlayerId),
    Failed {
        peer: PlayerId,
        reason: String,
    },
}

/// One registered transport identity and its open links.
///
/// `open` and `close` are fire-and-forget; their results surface later as
/// [`LinkEvent`]s from `poll_events`.
pub trait Endpoint {
    fn local_id(&self) -> &PlayerId;

    /// Ask for a link to `peer`. Success or failure arrives as an
    /// `Opened`/`Failed` event.
    fn open(&mut self, peer: &PlayerId);

    fn send_to(&mut self, peer: &PlayerId, bytes: Vec<u8>) -> Result<()>;

    /// Send to every open link
    fn broadcast(&mut self, bytes: Vec<u8>);

    fn poll_events(&mut self) -> Vec<LinkEvent>;

    fn close(&mut self, peer: &PlayerId);
}

/// Factory for endpoints with register-claim semantics: registering an
/// identity that is already held anywhere on the network fails with
/// [`crate::NetError::IdentityTaken`]. Host election is built entirely on
/// this guarantee.
#[async_trait(?Send)]
pub trait Network {
    type Endpoint: Endpoint;

    async fn register(&self, id: PlayerId) -> Result<Self::Endpoint>;
}
