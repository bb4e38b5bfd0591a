//! Draw business logic: standings, brackets, groups, orchestration and result propagation.

mod bracket;
mod draw;
mod groups;
mod locks;
mod propagation;
mod standings;

pub use bracket::{
    bracket_rounds, bracket_size, generate_bracket, round_phases, seed_first_round, BracketRound,
    FirstRoundSlot,
};
pub use draw::{
    DrawOutcome, DrawService, DrawSettings, PromotionSettings, ResultUpdate,
    DEFAULT_QUALIFIERS_PER_GROUP,
};
pub use groups::{
    assign_groups, create_group_fixtures, generate_groups, group_key, group_label, label_order,
    round_robin_pairs, Group, ManualGroups,
};
pub use locks::TournamentLocks;
pub use propagation::{
    on_match_result_updated, on_match_result_withdrawn, propagate_result, retract_winner,
};
pub use standings::{
    compute_standings, compute_standings_by_group, sort_standings, standings_csv, GroupTable,
};
