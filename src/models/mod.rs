//! Data structures for draws: entrants, matches, tournaments, standings.

mod entrant;
mod game;
mod standing;
mod tournament;

pub use entrant::{Enrollment, EnrollmentStatus, Entrant, EntrantId, GroupAssignment};
pub use game::{GameMatch, MatchId, MatchStatus, NextMatch, Phase, Slot, WALKOVER_SCORE};
pub use standing::{Standing, POINTS_PER_DRAW, POINTS_PER_WIN};
pub use tournament::{DrawType, ErrorKind, Tournament, TournamentError, TournamentId};
