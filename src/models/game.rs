//! Match (fixture), its phase, status and forward link into the next bracket match.

use crate::models::entrant::EntrantId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Canonical walkover score recorded on a bye.
pub const WALKOVER_SCORE: (u32, u32) = (3, 0);

/// Which side of a match an entrant occupies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Slot {
    Home,
    Away,
}

impl Slot {
    /// Slot a bracket match at `index` (0-based within its round) fills in the next round.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Slot::Home
        } else {
            Slot::Away
        }
    }
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    Cancelled,
}

/// Phase of the tournament this match belongs to.
///
/// Serialized as its label: `GROUPS`, `ROUND_OF_16`, `QUARTERFINAL`, `SEMIFINAL`, `FINAL`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Phase {
    Groups,
    /// Knockout round with this many entrants (16, 32, 64, ...).
    RoundOf(u32),
    Quarterfinal,
    Semifinal,
    Final,
}

impl Phase {
    /// Knockout phase for a round that starts with `entrants` teams (a power of two ≥ 2).
    pub fn for_round(entrants: u32) -> Self {
        match entrants {
            0..=2 => Phase::Final,
            3..=4 => Phase::Semifinal,
            5..=8 => Phase::Quarterfinal,
            n => Phase::RoundOf(n),
        }
    }

    /// Entrants at the start of this knockout round; `None` for group play.
    pub fn entrants(&self) -> Option<u32> {
        match self {
            Phase::Groups => None,
            Phase::RoundOf(n) => Some(*n),
            Phase::Quarterfinal => Some(8),
            Phase::Semifinal => Some(4),
            Phase::Final => Some(2),
        }
    }

    pub fn is_knockout(&self) -> bool {
        !matches!(self, Phase::Groups)
    }

    /// Prefix of the bracket key, e.g. `Q` for `Q1`.
    pub fn key_prefix(&self) -> String {
        match self {
            Phase::Groups => "G".to_string(),
            Phase::RoundOf(n) => format!("R{}-", n),
            Phase::Quarterfinal => "Q".to_string(),
            Phase::Semifinal => "S".to_string(),
            Phase::Final => "F".to_string(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Groups => write!(f, "GROUPS"),
            Phase::RoundOf(n) => write!(f, "ROUND_OF_{}", n),
            Phase::Quarterfinal => write!(f, "QUARTERFINAL"),
            Phase::Semifinal => write!(f, "SEMIFINAL"),
            Phase::Final => write!(f, "FINAL"),
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GROUPS" => Ok(Phase::Groups),
            "QUARTERFINAL" => Ok(Phase::Quarterfinal),
            "SEMIFINAL" => Ok(Phase::Semifinal),
            "FINAL" => Ok(Phase::Final),
            other => other
                .strip_prefix("ROUND_OF_")
                .and_then(|n| n.parse().ok())
                .map(Phase::RoundOf)
                .ok_or_else(|| format!("Unknown match phase: {}", s)),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.to_string()
    }
}

impl TryFrom<String> for Phase {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where the winner of a bracket match goes. Id and slot are always set together.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NextMatch {
    pub match_id: MatchId,
    pub slot: Slot,
}

/// A single fixture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub phase: Phase,
    /// Group or bracket slot key, e.g. `GA` or `Q1`.
    pub key: String,
    /// None means bye or not yet determined.
    pub home: Option<EntrantId>,
    pub away: Option<EntrantId>,
    pub status: MatchStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub venue_id: Option<Uuid>,
    pub next: Option<NextMatch>,
}

impl GameMatch {
    pub fn new(tournament_id: TournamentId, phase: Phase, key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            phase,
            key: key.into(),
            home: None,
            away: None,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            scheduled_at: None,
            venue_id: None,
            next: None,
        }
    }

    /// Entrant in the given slot.
    pub fn entrant(&self, slot: Slot) -> Option<EntrantId> {
        match slot {
            Slot::Home => self.home,
            Slot::Away => self.away,
        }
    }

    /// Put an entrant into a slot, leaving everything else untouched.
    pub fn set_entrant(&mut self, slot: Slot, entrant: EntrantId) {
        match slot {
            Slot::Home => self.home = Some(entrant),
            Slot::Away => self.away = Some(entrant),
        }
    }

    /// Empty a slot again.
    pub fn clear_entrant(&mut self, slot: Slot) {
        match slot {
            Slot::Home => self.home = None,
            Slot::Away => self.away = None,
        }
    }

    /// Both scores, if the match is finished and fully scored.
    pub fn final_score(&self) -> Option<(u32, u32)> {
        if self.status != MatchStatus::Finished {
            return None;
        }
        Some((self.home_score?, self.away_score?))
    }

    /// Winning entrant of a finished match. None for draws, unplayed matches or a missing winner side.
    pub fn winner(&self) -> Option<EntrantId> {
        let (home, away) = self.final_score()?;
        if home > away {
            self.home
        } else if away > home {
            self.away
        } else {
            None
        }
    }

    /// A finished match with a single entrant: the entrant advanced on a walkover.
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Finished && self.home.is_some() != self.away.is_some()
    }
}
