//! Intramural tournament draws: library with models, the entity store seam and draw logic.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    bracket_rounds, compute_standings, compute_standings_by_group, generate_bracket,
    generate_groups, on_match_result_updated, propagate_result, retract_winner, standings_csv, BracketRound,
    DrawOutcome, DrawService, DrawSettings, GroupTable, ManualGroups, PromotionSettings,
    ResultUpdate,
};
pub use models::{
    DrawType, EnrollmentStatus, Entrant, EntrantId, ErrorKind, GameMatch, GroupAssignment,
    MatchId, MatchStatus, NextMatch, Phase, Slot, Standing, Tournament, TournamentError,
    TournamentId,
};
pub use store::{EntityStore, MemoryStore, StoreError};
