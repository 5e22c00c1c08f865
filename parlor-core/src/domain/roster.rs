use crate::domain::{PlayerId, PlayerRecord, PlayerStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Roster aggregate: one record per connected peer, plus the host itself.
///
/// Invariants: identifiers are unique; a player is in exactly one status at
/// a time. Mutated only on the host; guests hold read-only mirrors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Roster {
    records: HashMap<PlayerId, PlayerRecord>,
}

/// Errors that can occur in roster operations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RosterError {
    #[error("Player already registered: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} is not idle")]
    NotIdle(PlayerId),

    #[error("Player {0} is not hosting a room")]
    NotHosting(PlayerId),

    #[error("Cannot join own room")]
    CannotJoinSelf,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Queries =====

    pub fn get(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.records.keys()
    }

    /// Records in an order suitable for broadcast (sorted by id so every
    /// rebroadcast of the same membership is identical on the wire)
    pub fn to_broadcast(&self) -> Vec<PlayerRecord> {
        let mut records: Vec<PlayerRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        records
    }

    // ===== Membership =====

    /// Register a new player; fails if the identifier is already present
    pub fn insert(&mut self, record: PlayerRecord) -> Result<(), RosterError> {
        if self.records.contains_key(record.id()) {
            return Err(RosterError::DuplicatePlayer(record.id().clone()));
        }

        self.records.insert(record.id().clone(), record);
        Ok(())
    }

    /// Remove a player, returning the record if it existed
    pub fn remove(&mut self, id: &PlayerId) -> Option<PlayerRecord> {
        self.records.remove(id)
    }

    // ===== Status transitions =====

    /// `Idle` -> `Hosting`
    pub fn start_hosting(&mut self, id: &PlayerId) -> Result<(), RosterError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| RosterError::PlayerNotFound(id.clone()))?;

        if !record.is_idle() {
            return Err(RosterError::NotIdle(id.clone()));
        }

        record.set_status(PlayerStatus::Hosting);
        Ok(())
    }

    /// `Hosting` -> `Idle`
    pub fn cancel_hosting(&mut self, id: &PlayerId) -> Result<(), RosterError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| RosterError::PlayerNotFound(id.clone()))?;

        if !record.is_hosting() {
            return Err(RosterError::NotHosting(id.clone()));
        }

        record.set_status(PlayerStatus::Idle);
        Ok(())
    }

    /// Match an idle requester into a hosting target's room.
    ///
    /// Valid only when the requester is `Idle` and the target is
    /// specifically `Hosting`; on success both flip to `InGame`. On any
    /// failure nothing changes.
    pub fn pair(&mut self, requester: &PlayerId, target: &PlayerId) -> Result<(), RosterError> {
        if requester == target {
            return Err(RosterError::CannotJoinSelf);
        }

        // Validate both sides before mutating either
        let req = self
            .records
            .get(requester)
            .ok_or_else(|| RosterError::PlayerNotFound(requester.clone()))?;
        if !req.is_idle() {
            return Err(RosterError::NotIdle(requester.clone()));
        }

        let tgt = self
            .records
            .get(target)
            .ok_or_else(|| RosterError::PlayerNotFound(target.clone()))?;
        if !tgt.is_hosting() {
            return Err(RosterError::NotHosting(target.clone()));
        }

        if let Some(r) = self.records.get_mut(requester) {
            r.set_status(PlayerStatus::InGame);
        }
        if let Some(t) = self.records.get_mut(target) {
            t.set_status(PlayerStatus::InGame);
        }

        Ok(())
    }

    /// Return a player to `Idle` after a session ends; tolerant of the
    /// player having already been removed
    pub fn release(&mut self, id: &PlayerId) {
        if let Some(record) = self.records.get_mut(id) {
            record.set_status(PlayerStatus::Idle);
        }
    }
}
