//! Draw orchestration: preconditions, regeneration, dispatch, promotion, result writes.

use crate::logic::bracket::{bracket_rounds, generate_bracket, BracketRound};
use crate::logic::groups::{assign_groups, create_group_fixtures, ManualGroups};
use crate::logic::locks::TournamentLocks;
use crate::logic::propagation::{on_match_result_updated, on_match_result_withdrawn};
use crate::logic::standings::{compute_standings, compute_standings_by_group, GroupTable};
use crate::models::{
    DrawType, Entrant, EntrantId, GameMatch, MatchId, MatchStatus, NextMatch, Phase, Standing,
    Tournament, TournamentError, TournamentId,
};
use crate::store::EntityStore;
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Qualifiers taken from each group when promoting to a knockout stage.
pub const DEFAULT_QUALIFIERS_PER_GROUP: usize = 2;

/// Options for [`DrawService::generate_draw`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DrawSettings {
    /// Delete an existing draw instead of failing with a conflict.
    #[serde(default)]
    pub force: bool,
    /// Required for group draws.
    #[serde(default)]
    pub groups_count: Option<usize>,
    /// Manual membership; replaces the random deal entirely.
    #[serde(default)]
    pub groups: Option<ManualGroups>,
    /// Reject manual groups that leave eligible teams out.
    #[serde(default)]
    pub strict_groups: bool,
}

/// Options for [`DrawService::promote_to_knockout`].
#[derive(Clone, Debug, Deserialize)]
pub struct PromotionSettings {
    #[serde(default = "default_qualifiers_per_group")]
    pub qualifiers_per_group: usize,
    /// Replace an existing knockout stage.
    #[serde(default)]
    pub force: bool,
}

fn default_qualifiers_per_group() -> usize {
    DEFAULT_QUALIFIERS_PER_GROUP
}

impl Default for PromotionSettings {
    fn default() -> Self {
        Self {
            qualifiers_per_group: DEFAULT_QUALIFIERS_PER_GROUP,
            force: false,
        }
    }
}

/// What a draw or promotion did.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DrawOutcome {
    pub message: String,
    pub matches_created: usize,
}

/// A result submission for one match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
pub struct ResultUpdate {
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: MatchStatus,
}

/// Entry point for admin draw actions and result writes over an [`EntityStore`].
///
/// Writes to one tournament are serialized; reads (standings, bracket) are not.
pub struct DrawService<S> {
    store: S,
    locks: TournamentLocks,
}

impl<S: EntityStore> DrawService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: TournamentLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Tournament, TournamentError> {
        self.store
            .tournament(tournament_id)?
            .ok_or(TournamentError::TournamentNotFound(tournament_id))
    }

    /// Generate a bracket or group draw for the tournament's eligible teams.
    ///
    /// Existing matches make this a conflict unless `settings.force` is set, in which case all
    /// matches, their attachments and the group assignments are deleted first. Every check runs
    /// before anything is deleted.
    pub fn generate_draw<R: Rng + ?Sized>(
        &self,
        tournament_id: TournamentId,
        draw_type: DrawType,
        settings: &DrawSettings,
        rng: &mut R,
    ) -> Result<DrawOutcome, TournamentError> {
        let lock = self.locks.handle(tournament_id)?;
        let _guard = lock.lock().map_err(|_| TournamentError::LockPoisoned)?;

        let mut tournament = self.load_tournament(tournament_id)?;
        let entrants = self.store.eligible_entrants(tournament_id)?;
        if entrants.len() < 2 {
            return Err(TournamentError::NotEnoughEntrants {
                found: entrants.len(),
            });
        }

        let groups = match draw_type {
            DrawType::Groups => {
                let count = settings
                    .groups_count
                    .ok_or(TournamentError::MissingGroupCount)?;
                Some(assign_groups(
                    &entrants,
                    count,
                    settings.groups.as_ref(),
                    settings.strict_groups,
                    rng,
                )?)
            }
            DrawType::Bracket => None,
        };

        let existing = self.store.matches(tournament_id)?;
        if !existing.is_empty() {
            if !settings.force {
                return Err(TournamentError::DrawAlreadyExists {
                    matches: existing.len(),
                });
            }
            let deleted = self.store.delete_matches(tournament_id)?;
            self.store.purge_match_attachments(&deleted)?;
            info!(
                "Forced regeneration for tournament {}: deleted {} matches",
                tournament_id,
                deleted.len()
            );
        }
        let cleared = self.store.delete_group_assignments(tournament_id)?;
        if cleared > 0 {
            info!("Cleared {} group assignments for tournament {}", cleared, tournament_id);
        }

        let (created, message) = match groups {
            Some(groups) => {
                let created = create_group_fixtures(&self.store, tournament_id, &groups)?;
                let message = format!(
                    "{} groups generated with {} matches",
                    groups.len(),
                    created.len()
                );
                tournament.groups_count = Some(groups.len());
                (created, message)
            }
            None => {
                let created = generate_bracket(&self.store, tournament_id, &entrants, false, rng)?;
                let message = format!(
                    "Bracket generated for {} teams with {} matches",
                    entrants.len(),
                    created.len()
                );
                tournament.groups_count = None;
                (created, message)
            }
        };

        tournament.draw_type = Some(draw_type);
        self.store.update_tournament(&tournament)?;
        info!("Tournament {}: {}", tournament_id, message);
        Ok(DrawOutcome {
            message,
            matches_created: created.len(),
        })
    }

    /// Seed the top finishers of every group into a fresh knockout bracket.
    ///
    /// Qualifiers are concatenated group by group in label order, each group in rank order, and
    /// the bracket keeps that order. Group matches are never touched; an existing knockout stage
    /// is a conflict unless `settings.force` is set. Unfinished group matches only log a warning:
    /// qualifiers come from the tables as they stand.
    pub fn promote_to_knockout<R: Rng + ?Sized>(
        &self,
        tournament_id: TournamentId,
        settings: &PromotionSettings,
        rng: &mut R,
    ) -> Result<DrawOutcome, TournamentError> {
        let lock = self.locks.handle(tournament_id)?;
        let _guard = lock.lock().map_err(|_| TournamentError::LockPoisoned)?;

        self.load_tournament(tournament_id)?;
        let assignments = self.store.group_assignments(tournament_id)?;
        if assignments.is_empty() {
            return Err(TournamentError::NoGroups);
        }
        let entrants = self.store.eligible_entrants(tournament_id)?;
        let matches = self.store.matches(tournament_id)?;

        let unfinished = matches
            .iter()
            .filter(|m| m.phase == Phase::Groups && m.status != MatchStatus::Finished)
            .count();
        if unfinished > 0 {
            warn!(
                "Promoting tournament {} with {} group matches unfinished",
                tournament_id, unfinished
            );
        }

        let tables = compute_standings_by_group(&entrants, &assignments, &matches);
        let qualifiers: Vec<Entrant> = tables
            .iter()
            .flat_map(|t| t.standings.iter().take(settings.qualifiers_per_group))
            .map(|s| Entrant {
                id: s.entrant_id,
                name: s.name.clone(),
            })
            .collect();
        if qualifiers.len() < 2 {
            return Err(TournamentError::NotEnoughQualifiers {
                found: qualifiers.len(),
            });
        }

        let knockout: Vec<MatchId> = matches
            .iter()
            .filter(|m| m.phase.is_knockout())
            .map(|m| m.id)
            .collect();
        if !knockout.is_empty() {
            if !settings.force {
                return Err(TournamentError::KnockoutAlreadyExists {
                    matches: knockout.len(),
                });
            }
            for id in &knockout {
                self.store.delete_match(*id)?;
            }
            self.store.purge_match_attachments(&knockout)?;
            info!(
                "Replacing knockout stage of tournament {}: deleted {} matches",
                tournament_id,
                knockout.len()
            );
        }

        let created = generate_bracket(&self.store, tournament_id, &qualifiers, true, rng)?;
        let message = format!(
            "Knockout stage generated for {} qualifiers with {} matches",
            qualifiers.len(),
            created.len()
        );
        info!("Tournament {}: {}", tournament_id, message);
        Ok(DrawOutcome {
            message,
            matches_created: created.len(),
        })
    }

    /// Record a result and advance the winner of a finished bracket match.
    ///
    /// Finished results need both scores and both sides; knockout matches cannot finish level.
    /// A change that would swap the team in a next match that already started is a conflict.
    /// Leaving FINISHED takes the old winner back out of the next match. The write succeeds
    /// even if advancing or withdrawing the winner fails.
    pub fn submit_result(
        &self,
        match_id: MatchId,
        update: ResultUpdate,
    ) -> Result<GameMatch, TournamentError> {
        let tournament_id = self
            .store
            .get_match(match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))?
            .tournament_id;
        let lock = self.locks.handle(tournament_id)?;
        let _guard = lock.lock().map_err(|_| TournamentError::LockPoisoned)?;

        // Re-read under the lock; a regeneration may have removed it meanwhile.
        let mut game = self
            .store
            .get_match(match_id)?
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        if update.status == MatchStatus::Finished {
            let (Some(home_score), Some(away_score)) = (update.home_score, update.away_score) else {
                return Err(TournamentError::MissingScores);
            };
            if game.home.is_none() || game.away.is_none() {
                return Err(TournamentError::UndeterminedSides(match_id));
            }
            if home_score == away_score && (game.phase.is_knockout() || game.next.is_some()) {
                return Err(TournamentError::DrawnEliminationMatch(match_id));
            }
        }

        let previous_winner = game.winner();
        game.home_score = update.home_score;
        game.away_score = update.away_score;
        game.status = update.status;

        if let (Some(next), Some(previous)) = (game.next, previous_winner) {
            if game.winner() != Some(previous) {
                self.ensure_next_not_started(&game, next, previous)?;
            }
        }
        self.store.update_match(&game)?;
        info!(
            "Result for {} ({}): {:?} {:?}-{:?}",
            game.id, game.key, game.status, game.home_score, game.away_score
        );

        if game.status == MatchStatus::Finished {
            on_match_result_updated(&self.store, &game);
        } else if let Some(previous) = previous_winner {
            on_match_result_withdrawn(&self.store, &game, previous);
        }
        Ok(game)
    }

    /// A winner already written into a next match that is live or finished must stay there.
    fn ensure_next_not_started(
        &self,
        game: &GameMatch,
        next: NextMatch,
        previous: EntrantId,
    ) -> Result<(), TournamentError> {
        let Some(target) = self.store.get_match(next.match_id)? else {
            return Ok(());
        };
        let started = matches!(target.status, MatchStatus::InProgress | MatchStatus::Finished);
        if started && target.entrant(next.slot) == Some(previous) {
            return Err(TournamentError::NextMatchUnderway {
                match_id: game.id,
                next: target.id,
            });
        }
        Ok(())
    }

    /// Overall table over every finished match of the tournament.
    pub fn standings(&self, tournament_id: TournamentId) -> Result<Vec<Standing>, TournamentError> {
        self.load_tournament(tournament_id)?;
        let entrants = self.store.eligible_entrants(tournament_id)?;
        let matches = self.store.matches(tournament_id)?;
        Ok(compute_standings(&entrants, &matches))
    }

    /// One team's row of the overall table; None if the team is not eligible.
    pub fn team_standing(
        &self,
        tournament_id: TournamentId,
        entrant_id: EntrantId,
    ) -> Result<Option<Standing>, TournamentError> {
        Ok(self
            .standings(tournament_id)?
            .into_iter()
            .find(|s| s.entrant_id == entrant_id))
    }

    /// Per-group tables from group-phase matches.
    pub fn group_standings(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<GroupTable>, TournamentError> {
        self.load_tournament(tournament_id)?;
        let entrants = self.store.eligible_entrants(tournament_id)?;
        let assignments = self.store.group_assignments(tournament_id)?;
        let matches = self.store.matches(tournament_id)?;
        Ok(compute_standings_by_group(&entrants, &assignments, &matches))
    }

    /// Knockout rounds, earliest first.
    pub fn bracket(&self, tournament_id: TournamentId) -> Result<Vec<BracketRound>, TournamentError> {
        self.load_tournament(tournament_id)?;
        Ok(bracket_rounds(&self.store.matches(tournament_id)?))
    }
}
