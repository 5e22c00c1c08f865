//! Host election by rendezvous claim.
//!
//! Exactly one process in a lobby can hold the rendezvous identity, so
//! claiming it IS the election; there is no voting round. The loser of
//! the claim re-registers under a fresh identity and links to the winner.

use crate::error::{NetError, Result};
use crate::net::{Endpoint, Network};
use parlor_core::PlayerId;

/// Which side of the lobby this process ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyRole {
    Host,
    Guest,
}

/// Outcome of a finished election
pub enum Elected<E> {
    /// Claim succeeded; this endpoint owns the rendezvous identity
    Host(E),
    /// Claim rejected; registered under the fresh identity, link to the
    /// host requested
    Guest { endpoint: E, host: PlayerId },
}

impl<E> Elected<E> {
    pub fn role(&self) -> LobbyRole {
        match self {
            Elected::Host(_) => LobbyRole::Host,
            Elected::Guest { .. } => LobbyRole::Guest,
        }
    }
}

/// Run the two-outcome election. `IdentityTaken` is the only rejection
/// that demotes to guest; any other registration failure is returned to
/// the caller as-is, fatal to the attempt.
pub async fn elect<N: Network>(
    network: &N,
    rendezvous: PlayerId,
    fresh_id: PlayerId,
) -> Result<Elected<N::Endpoint>> {
    match network.register(rendezvous.clone()).await {
        Ok(endpoint) => {
            tracing::info!(%rendezvous, "claimed rendezvous identity, acting as host");
            Ok(Elected::Host(endpoint))
        }
        Err(NetError::IdentityTaken(_)) => {
            tracing::info!(%rendezvous, %fresh_id, "rendezvous taken, joining as guest");
            let mut endpoint = network.register(fresh_id).await?;
            endpoint.open(&rendezvous);
            Ok(Elected::Guest {
                endpoint,
                host: rendezvous,
            })
        }
        Err(err) => Err(err),
    }
}
