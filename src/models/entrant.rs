//! Entrant (a team placed into a draw) and its enrollment record.

use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entrant (used in matches, groups and standings).
pub type EntrantId = Uuid;

/// A team eligible to be placed into a draw.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub name: String,
}

impl Entrant {
    /// Create a new entrant with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Review state of a team's registration to a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A team registered to a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub tournament_id: TournamentId,
    pub entrant: Entrant,
    pub status: EnrollmentStatus,
}

impl Enrollment {
    /// Rejected registrations never take part in a draw.
    pub fn is_eligible(&self) -> bool {
        self.status != EnrollmentStatus::Rejected
    }
}

/// Which group an entrant was drawn into. At most one per entrant and tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub tournament_id: TournamentId,
    pub entrant_id: EntrantId,
    pub group: String,
}
