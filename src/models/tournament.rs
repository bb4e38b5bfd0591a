//! Tournament, its draw state, and the errors draw operations report.

use crate::models::entrant::EntrantId;
use crate::models::game::MatchId;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Which generator produced the tournament's current matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawType {
    Bracket,
    Groups,
}

/// A tournament as seen by the draw subsystem.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// None until a draw has been generated.
    pub draw_type: Option<DrawType>,
    /// Configured group count (group draws only).
    pub groups_count: Option<usize>,
}

impl Tournament {
    /// Create a new tournament with no draw.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            draw_type: None,
            groups_count: None,
        }
    }
}

/// How a caller should react to a [`TournamentError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad or insufficient input; fix it and retry.
    Validation,
    /// A draw already exists; retry with `force` to regenerate.
    Conflict,
    /// Tournament, entrant or match id does not resolve.
    NotFound,
    /// Storage or locking failure.
    Internal,
}

/// Errors that can occur during draw, promotion and result operations.
#[derive(Debug)]
pub enum TournamentError {
    /// Fewer than 2 eligible entrants.
    NotEnoughEntrants { found: usize },
    /// Group draw requested without a group count.
    MissingGroupCount,
    /// Group count must be at least 1.
    InvalidGroupCount(usize),
    /// Strict manual groups left these entrants out.
    UnassignedEntrants(Vec<EntrantId>),
    /// Matches already exist and `force` was not set.
    DrawAlreadyExists { matches: usize },
    /// Knockout matches already exist and `force` was not set.
    KnockoutAlreadyExists { matches: usize },
    /// Group play produced fewer than 2 qualifiers.
    NotEnoughQualifiers { found: usize },
    /// Promotion requested on a tournament without groups.
    NoGroups,
    TournamentNotFound(Uuid),
    MatchNotFound(MatchId),
    EntrantNotFound(EntrantId),
    /// A finished result needs both scores.
    MissingScores,
    /// A match cannot finish before both of its sides are known.
    UndeterminedSides(MatchId),
    /// An elimination match feeding a next match cannot end level.
    DrawnEliminationMatch(MatchId),
    /// Changing this result would swap a team out of a next match that has already started.
    NextMatchUnderway { match_id: MatchId, next: MatchId },
    /// A per-tournament lock was poisoned by a panicking writer.
    LockPoisoned,
    Store(StoreError),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            NotEnoughEntrants { .. }
            | MissingGroupCount
            | InvalidGroupCount(_)
            | UnassignedEntrants(_)
            | NotEnoughQualifiers { .. }
            | NoGroups
            | MissingScores
            | UndeterminedSides(_)
            | DrawnEliminationMatch(_) => ErrorKind::Validation,
            DrawAlreadyExists { .. } | KnockoutAlreadyExists { .. } | NextMatchUnderway { .. } => {
                ErrorKind::Conflict
            }
            TournamentNotFound(_) | MatchNotFound(_) | EntrantNotFound(_) => ErrorKind::NotFound,
            LockPoisoned | Store(_) => ErrorKind::Internal,
        }
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::NotEnoughEntrants { found } => {
                write!(f, "Need at least 2 eligible teams for a draw (found {})", found)
            }
            TournamentError::MissingGroupCount => write!(f, "Group draws need a group count"),
            TournamentError::InvalidGroupCount(n) => {
                write!(f, "Group count must be at least 1 (got {})", n)
            }
            TournamentError::UnassignedEntrants(ids) => {
                write!(f, "{} team(s) are not assigned to any group", ids.len())
            }
            TournamentError::DrawAlreadyExists { matches } => write!(
                f,
                "A draw already exists ({} matches); regenerate with force to replace it",
                matches
            ),
            TournamentError::KnockoutAlreadyExists { matches } => write!(
                f,
                "A knockout stage already exists ({} matches); promote with force to replace it",
                matches
            ),
            TournamentError::NotEnoughQualifiers { found } => {
                write!(f, "Need at least 2 qualifiers for a knockout stage (found {})", found)
            }
            TournamentError::NoGroups => write!(f, "Tournament has no groups to promote from"),
            TournamentError::TournamentNotFound(id) => write!(f, "Tournament {} not found", id),
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::EntrantNotFound(id) => write!(f, "Team {} not found", id),
            TournamentError::MissingScores => {
                write!(f, "A finished match needs both home and away scores")
            }
            TournamentError::UndeterminedSides(id) => {
                write!(f, "Match {} cannot finish before both teams are known", id)
            }
            TournamentError::DrawnEliminationMatch(id) => write!(
                f,
                "Elimination match {} cannot end in a draw; submit the deciding score",
                id
            ),
            TournamentError::NextMatchUnderway { match_id, next } => write!(
                f,
                "Match {} already sent its winner into match {}, which has started; correct that match first",
                match_id, next
            ),
            TournamentError::LockPoisoned => write!(f, "Tournament lock poisoned"),
            TournamentError::Store(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for TournamentError {
    fn from(e: StoreError) -> Self {
        TournamentError::Store(e)
    }
}
