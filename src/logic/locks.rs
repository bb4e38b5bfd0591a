//! Per-tournament write serialization.

use crate::models::{TournamentError, TournamentId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One mutex per tournament. Writers hold it for the whole draw, promotion or result write.
#[derive(Default)]
pub struct TournamentLocks {
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tournament's mutex, created on first use.
    pub fn handle(&self, tournament_id: TournamentId) -> Result<Arc<Mutex<()>>, TournamentError> {
        let mut g = self
            .locks
            .lock()
            .map_err(|_| TournamentError::LockPoisoned)?;
        Ok(g.entry(tournament_id).or_default().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn same_tournament_shares_one_mutex() {
        let locks = TournamentLocks::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(Arc::ptr_eq(&locks.handle(a).unwrap(), &locks.handle(a).unwrap()));
        assert!(!Arc::ptr_eq(&locks.handle(a).unwrap(), &locks.handle(b).unwrap()));
    }
}
