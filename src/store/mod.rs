//! Entity store consumed by the draw logic.
//!
//! Any backend works (relational, document, in-memory) as long as it can answer the
//! queries below. Methods take `&self`; implementations handle their own locking.

mod memory;

pub use memory::MemoryStore;

use crate::models::{Entrant, GameMatch, GroupAssignment, MatchId, Tournament, TournamentId};
use uuid::Uuid;

/// Errors raised by a store backend.
#[derive(Debug)]
pub enum StoreError {
    /// A lock inside the store was poisoned.
    Poisoned,
    /// An update targeted a record that does not exist.
    MissingRecord(Uuid),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Poisoned => write!(f, "store lock poisoned"),
            StoreError::MissingRecord(id) => write!(f, "record {} does not exist", id),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait EntityStore {
    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError>;

    fn update_tournament(&self, tournament: &Tournament) -> Result<(), StoreError>;

    /// Teams enrolled in the tournament, rejected enrollments excluded, in registration order.
    fn eligible_entrants(&self, tournament_id: TournamentId) -> Result<Vec<Entrant>, StoreError>;

    fn insert_match(&self, game: &GameMatch) -> Result<(), StoreError>;

    /// Overwrite an existing match.
    fn update_match(&self, game: &GameMatch) -> Result<(), StoreError>;

    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError>;

    /// All matches of a tournament, in creation order.
    fn matches(&self, tournament_id: TournamentId) -> Result<Vec<GameMatch>, StoreError>;

    fn delete_match(&self, id: MatchId) -> Result<(), StoreError>;

    /// Delete every match of a tournament, returning the deleted ids.
    fn delete_matches(&self, tournament_id: TournamentId) -> Result<Vec<MatchId>, StoreError>;

    /// Drop records hanging off deleted matches (chat rooms, live streams).
    fn purge_match_attachments(&self, _ids: &[MatchId]) -> Result<(), StoreError> {
        Ok(())
    }

    fn insert_group_assignment(&self, assignment: &GroupAssignment) -> Result<(), StoreError>;

    fn group_assignments(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<GroupAssignment>, StoreError>;

    /// Delete every group assignment of a tournament, returning how many were removed.
    fn delete_group_assignments(&self, tournament_id: TournamentId) -> Result<usize, StoreError>;
}
