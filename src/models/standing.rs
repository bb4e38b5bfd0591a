//! Standing: derived ranking record for one entrant. Never persisted.

use crate::models::entrant::{Entrant, EntrantId};
use serde::{Deserialize, Serialize};

pub const POINTS_PER_WIN: u32 = 3;
pub const POINTS_PER_DRAW: u32 = 1;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub entrant_id: EntrantId,
    pub name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    /// Totals over many matches; wider than a single score.
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub points: u32,
}

impl Standing {
    /// Zero-valued record for an entrant.
    pub fn new(entrant: &Entrant) -> Self {
        Self {
            entrant_id: entrant.id,
            name: entrant.name.clone(),
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    /// Fold one finished match in from this entrant's point of view.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += u64::from(scored);
        self.goals_against += u64::from(conceded);
        if scored > conceded {
            self.wins += 1;
            self.points += POINTS_PER_WIN;
        } else if scored < conceded {
            self.losses += 1;
        } else {
            self.draws += 1;
            self.points += POINTS_PER_DRAW;
        }
        self.goal_difference = self.goals_for as i64 - self.goals_against as i64;
    }
}
