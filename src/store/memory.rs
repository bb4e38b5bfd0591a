//! In-memory entity store: tournaments, enrollments, matches, group assignments.

use super::{EntityStore, StoreError};
use crate::models::{
    Enrollment, EnrollmentStatus, Entrant, EntrantId, GameMatch, GroupAssignment, MatchId,
    Tournament, TournamentId,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    tournaments: HashMap<TournamentId, Tournament>,
    enrollments: Vec<Enrollment>,
    /// Kept in creation order.
    matches: Vec<GameMatch>,
    assignments: Vec<GroupAssignment>,
    /// Live-stream / chat room links keyed by match.
    stream_links: HashMap<MatchId, String>,
}

/// Store backed by a single `RwLock`; every method is one short critical section.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    pub fn insert_tournament(&self, tournament: Tournament) -> Result<(), StoreError> {
        self.write()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    /// Register a team to a tournament (status Pending). Fails if the tournament does not exist.
    pub fn register_entrant(
        &self,
        tournament_id: TournamentId,
        name: impl Into<String>,
    ) -> Result<Entrant, StoreError> {
        let mut g = self.write()?;
        if !g.tournaments.contains_key(&tournament_id) {
            return Err(StoreError::MissingRecord(tournament_id));
        }
        let entrant = Entrant::new(name);
        g.enrollments.push(Enrollment {
            tournament_id,
            entrant: entrant.clone(),
            status: EnrollmentStatus::Pending,
        });
        Ok(entrant)
    }

    pub fn set_enrollment_status(
        &self,
        tournament_id: TournamentId,
        entrant_id: EntrantId,
        status: EnrollmentStatus,
    ) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let enrollment = g
            .enrollments
            .iter_mut()
            .find(|e| e.tournament_id == tournament_id && e.entrant.id == entrant_id)
            .ok_or(StoreError::MissingRecord(entrant_id))?;
        enrollment.status = status;
        Ok(())
    }

    pub fn set_stream_link(&self, match_id: MatchId, url: impl Into<String>) -> Result<(), StoreError> {
        self.write()?.stream_links.insert(match_id, url.into());
        Ok(())
    }

    pub fn stream_link(&self, match_id: MatchId) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.stream_links.get(&match_id).cloned())
    }
}

impl EntityStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn update_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let slot = g
            .tournaments
            .get_mut(&tournament.id)
            .ok_or(StoreError::MissingRecord(tournament.id))?;
        *slot = tournament.clone();
        Ok(())
    }

    fn eligible_entrants(&self, tournament_id: TournamentId) -> Result<Vec<Entrant>, StoreError> {
        Ok(self
            .read()?
            .enrollments
            .iter()
            .filter(|e| e.tournament_id == tournament_id && e.is_eligible())
            .map(|e| e.entrant.clone())
            .collect())
    }

    fn insert_match(&self, game: &GameMatch) -> Result<(), StoreError> {
        self.write()?.matches.push(game.clone());
        Ok(())
    }

    fn update_match(&self, game: &GameMatch) -> Result<(), StoreError> {
        let mut g = self.write()?;
        let slot = g
            .matches
            .iter_mut()
            .find(|m| m.id == game.id)
            .ok_or(StoreError::MissingRecord(game.id))?;
        *slot = game.clone();
        Ok(())
    }

    fn get_match(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError> {
        Ok(self.read()?.matches.iter().find(|m| m.id == id).cloned())
    }

    fn matches(&self, tournament_id: TournamentId) -> Result<Vec<GameMatch>, StoreError> {
        Ok(self
            .read()?
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    fn delete_match(&self, id: MatchId) -> Result<(), StoreError> {
        self.write()?.matches.retain(|m| m.id != id);
        Ok(())
    }

    fn delete_matches(&self, tournament_id: TournamentId) -> Result<Vec<MatchId>, StoreError> {
        let mut g = self.write()?;
        let deleted: Vec<MatchId> = g
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .map(|m| m.id)
            .collect();
        g.matches.retain(|m| m.tournament_id != tournament_id);
        Ok(deleted)
    }

    fn purge_match_attachments(&self, ids: &[MatchId]) -> Result<(), StoreError> {
        let mut g = self.write()?;
        for id in ids {
            g.stream_links.remove(id);
        }
        Ok(())
    }

    fn insert_group_assignment(&self, assignment: &GroupAssignment) -> Result<(), StoreError> {
        let mut g = self.write()?;
        g.assignments.retain(|a| {
            !(a.tournament_id == assignment.tournament_id && a.entrant_id == assignment.entrant_id)
        });
        g.assignments.push(assignment.clone());
        Ok(())
    }

    fn group_assignments(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<GroupAssignment>, StoreError> {
        Ok(self
            .read()?
            .assignments
            .iter()
            .filter(|a| a.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    fn delete_group_assignments(&self, tournament_id: TournamentId) -> Result<usize, StoreError> {
        let mut g = self.write()?;
        let before = g.assignments.len();
        g.assignments.retain(|a| a.tournament_id != tournament_id);
        Ok(before - g.assignments.len())
    }
}
