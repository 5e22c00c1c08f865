//! In-process network broker with true claim semantics.
//!
//! First-class, not a test double: registering an identity inserts it into
//! a shared registry, and a second registration of the same identity fails
//! with `IdentityTaken`. Election semantics are defined against this
//! implementation; the matchbox adapter maps onto them.

use crate::error::{NetError, Result};
use crate::net::{Endpoint, LinkEvent, Network};
use async_trait::async_trait;
use parlor_core::PlayerId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

type Inbox = Arc<Mutex<VecDeque<LinkEvent>>>;

#[derive(Default)]
struct Broker {
    inboxes: HashMap<PlayerId, Inbox>,
    /// Open links, stored as normalized pairs
    links: HashSet<(PlayerId, PlayerId)>,
}

impl Broker {
    fn link_key(a: &PlayerId, b: &PlayerId) -> (PlayerId, PlayerId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    fn linked(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.links.contains(&Self::link_key(a, b))
    }

    fn push(&self, to: &PlayerId, event: LinkEvent) {
        if let Some(inbox) = self.inboxes.get(to) {
            inbox.lock().unwrap().push_back(event);
        }
    }

    fn peers_linked_with(&self, id: &PlayerId) -> Vec<PlayerId> {
        self.links
            .iter()
            .filter_map(|(a, b)| {
                if a == id {
                    Some(b.clone())
                } else if b == id {
                    Some(a.clone())
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Shared in-process network
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    broker: Arc<Mutex<Broker>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear a peer out of the network abruptly, as a crashed process
    /// would: its identity is freed and every linked peer observes
    /// `Closed`.
    pub fn disconnect(&self, id: &PlayerId) {
        let mut broker = self.broker.lock().unwrap();
        broker.inboxes.remove(id);

        let linked = broker.peers_linked_with(id);
        for peer in linked {
            broker.links.remove(&Broker::link_key(id, &peer));
            broker.push(&peer, LinkEvent::Closed(id.clone()));
        }
        tracing::debug!(%id, "peer disconnected from memory network");
    }

    pub fn is_registered(&self, id: &PlayerId) -> bool {
        self.broker.lock().unwrap().inboxes.contains_key(id)
    }
}

#[async_trait(?Send)]
impl Network for MemoryNetwork {
    type Endpoint = MemoryEndpoint;

    async fn register(&self, id: PlayerId) -> Result<MemoryEndpoint> {
        let mut broker = self.broker.lock().unwrap();

        if broker.inboxes.contains_key(&id) {
            return Err(NetError::IdentityTaken(id));
        }

        let inbox: Inbox = Arc::new(Mutex::new(VecDeque::new()));
        broker.inboxes.insert(id.clone(), inbox.clone());
        tracing::debug!(%id, "registered on memory network");

        Ok(MemoryEndpoint {
            id,
            broker: self.broker.clone(),
            inbox,
        })
    }
}

/// One registered identity on the memory network
pub struct MemoryEndpoint {
    id: PlayerId,
    broker: Arc<Mutex<Broker>>,
    inbox: Inbox,
}

impl Endpoint for MemoryEndpoint {
    fn local_id(&self) -> &PlayerId {
        &self.id
    }

    fn open(&mut self, peer: &PlayerId) {
        let mut broker = self.broker.lock().unwrap();

        if !broker.inboxes.contains_key(peer) {
            let failed = LinkEvent::Failed {
                peer: peer.clone(),
                reason: "peer not registered".to_string(),
            };
            broker.push(&self.id, failed);
            return;
        }

        if broker.links.insert(Broker::link_key(&self.id, peer)) {
            broker.push(peer, LinkEvent::Opened(self.id.clone()));
            broker.push(&self.id, LinkEvent::Opened(peer.clone()));
        }
    }

    fn send_to(&mut self, peer: &PlayerId, bytes: Vec<u8>) -> Result<()> {
        let broker = self.broker.lock().unwrap();

        if !broker.inboxes.contains_key(peer) {
            return Err(NetError::PeerNotFound(peer.clone()));
        }

        tracing::trace!(from = %self.id, to = %peer, len = bytes.len(), "send");
        broker.push(
            peer,
            LinkEvent::Data {
                from: self.id.clone(),
                bytes,
            },
        );
        Ok(())
    }

    fn broadcast(&mut self, bytes: Vec<u8>) {
        let broker = self.broker.lock().unwrap();
        for peer in broker.peers_linked_with(&self.id) {
            broker.push(
                &peer,
                LinkEvent::Data {
                    from: self.id.clone(),
                    bytes: bytes.clone(),
                },
            );
        }
    }

    fn poll_events(&mut self) -> Vec<LinkEvent> {
        self.inbox.lock().unwrap().drain(..).collect()
    }

    fn close(&mut self, peer: &PlayerId) {
        let mut broker = self.broker.lock().unwrap();
        if broker.links.remove(&Broker::link_key(&self.id, peer)) {
            broker.push(peer, LinkEvent::Closed(self.id.clone()));
            broker.push(&self.id, LinkEvent::Closed(peer.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        futures::executor::block_on(fut)
    }

    #[test]
    fn test_identity_claim_is_exclusive() {
        let network = MemoryNetwork::new();
        let id = PlayerId::from("LOBBY-1");

        let first = block_on(network.register(id.clone()));
        assert!(first.is_ok());

        let second = block_on(network.register(id.clone()));
        assert!(matches!(second, Err(NetError::IdentityTaken(taken)) if taken == id));
    }

    #[test]
    fn test_open_notifies_both_sides() {
        let network = MemoryNetwork::new();
        let mut a = block_on(network.register(PlayerId::from("a"))).unwrap();
        let mut b = block_on(network.register(PlayerId::from("b"))).unwrap();

        a.open(&PlayerId::from("b"));

        assert_eq!(a.poll_events(), vec![LinkEvent::Opened(PlayerId::from("b"))]);
        assert_eq!(b.poll_events(), vec![LinkEvent::Opened(PlayerId::from("a"))]);
    }

    #[test]
    fn test_open_to_unregistered_peer_fails_locally() {
        let network = MemoryNetwork::new();
        let mut a = block_on(network.register(PlayerId::from("a"))).unwrap();

        a.open(&PlayerId::from("ghost"));

        let events = a.poll_events();
        assert!(matches!(
            &events[..],
            [LinkEvent::Failed { peer, .. }] if *peer == PlayerId::from("ghost")
        ));
    }

    #[test]
    fn test_data_is_delivered_in_order() {
        let network = MemoryNetwork::new();
        let mut a = block_on(network.register(PlayerId::from("a"))).unwrap();
        let mut b = block_on(network.register(PlayerId::from("b"))).unwrap();
        a.open(&PlayerId::from("b"));
        b.poll_events();

        a.send_to(&PlayerId::from("b"), vec![1]).unwrap();
        a.send_to(&PlayerId::from("b"), vec![2]).unwrap();

        let events = b.poll_events();
        assert_eq!(
            events,
            vec![
                LinkEvent::Data {
                    from: PlayerId::from("a"),
                    bytes: vec![1]
                },
                LinkEvent::Data {
                    from: PlayerId::from("a"),
                    bytes: vec![2]
                },
            ]
        );
    }

    #[test]
    fn test_broadcast_reaches_only_linked_peers() {
        let network = MemoryNetwork::new();
        let mut a = block_on(network.register(PlayerId::from("a"))).unwrap();
        let mut b = block_on(network.register(PlayerId::from("b"))).unwrap();
        let mut c = block_on(network.register(PlayerId::from("c"))).unwrap();
        a.open(&PlayerId::from("b"));

        a.broadcast(vec![9]);

        assert!(b
            .poll_events()
            .iter()
            .any(|e| matches!(e, LinkEvent::Data { .. })));
        assert!(!c
            .poll_events()
            .iter()
            .any(|e| matches!(e, LinkEvent::Data { .. })));
    }

    #[test]
    fn test_disconnect_frees_identity_and_closes_links() {
        let network = MemoryNetwork::new();
        let mut a = block_on(network.register(PlayerId::from("a"))).unwrap();
        let mut b = block_on(network.register(PlayerId::from("b"))).unwrap();
        a.open(&PlayerId::from("b"));
        a.poll_events();
        b.poll_events();

        network.disconnect(&PlayerId::from("b"));
        drop(b);

        assert_eq!(a.poll_events(), vec![LinkEvent::Closed(PlayerId::from("b"))]);
        assert!(!network.is_registered(&PlayerId::from("b")));
        assert!(block_on(network.register(PlayerId::from("b"))).is_ok());
    }
}
