//! Single-elimination bracket: seeding, byes, and the forward-linked match tree.

use crate::logic::propagation::propagate_result;
use crate::models::{
    Entrant, EntrantId, GameMatch, MatchId, MatchStatus, NextMatch, Phase, Slot, TournamentError,
    TournamentId, WALKOVER_SCORE,
};
use crate::store::EntityStore;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// One first-round slot of a bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FirstRoundSlot {
    /// A single entrant advancing on a walkover.
    Bye(EntrantId),
    HeadToHead(EntrantId, EntrantId),
}

/// Smallest power of two that fits `entrants`.
pub fn bracket_size(entrants: usize) -> usize {
    entrants.max(2).next_power_of_two()
}

/// Knockout phases from the first round to the final, e.g. 8 → [QUARTERFINAL, SEMIFINAL, FINAL].
pub fn round_phases(size: usize) -> Vec<Phase> {
    let mut phases = Vec::new();
    let mut teams = size.max(2);
    while teams >= 2 {
        phases.push(Phase::for_round(teams as u32));
        teams /= 2;
    }
    phases
}

/// Lay ordered entrants into first-round slots.
///
/// `bracket_size - n` slots are byes. The bye/head-to-head pattern is shuffled so byes spread
/// across the bracket; entrants then fill the slots in order, one per bye and two per match.
/// Fewer than two entrants make no bracket and yield no slots.
pub fn seed_first_round<R: Rng + ?Sized>(ordered: &[EntrantId], rng: &mut R) -> Vec<FirstRoundSlot> {
    if ordered.len() < 2 {
        return Vec::new();
    }
    let size = bracket_size(ordered.len());
    let byes = size - ordered.len();
    let mut kinds: Vec<bool> = std::iter::repeat(true)
        .take(byes)
        .chain(std::iter::repeat(false).take(size / 2 - byes))
        .collect();
    kinds.shuffle(rng);

    let mut slots = Vec::with_capacity(kinds.len());
    let mut next = 0;
    for is_bye in kinds {
        if is_bye {
            slots.push(FirstRoundSlot::Bye(ordered[next]));
            next += 1;
        } else {
            slots.push(FirstRoundSlot::HeadToHead(ordered[next], ordered[next + 1]));
            next += 2;
        }
    }
    slots
}

/// Build and persist a bracket for `entrants`.
///
/// With `seeded` the input order is kept (promotion from groups); otherwise entrants are
/// shuffled first. Rounds are created from the final backwards, so every match already knows
/// its next match id when inserted. Byes are finished on creation and their entrant written
/// straight into the next match, which resolves chained byes in the same pass.
///
/// Returns the created matches as stored after generation, final first.
pub fn generate_bracket<S, R>(
    store: &S,
    tournament_id: TournamentId,
    entrants: &[Entrant],
    seeded: bool,
    rng: &mut R,
) -> Result<Vec<GameMatch>, TournamentError>
where
    S: EntityStore + ?Sized,
    R: Rng + ?Sized,
{
    if entrants.len() < 2 {
        return Err(TournamentError::NotEnoughEntrants {
            found: entrants.len(),
        });
    }

    let mut order: Vec<EntrantId> = entrants.iter().map(|e| e.id).collect();
    if !seeded {
        order.shuffle(rng);
    }
    let slots = seed_first_round(&order, rng);
    let size = bracket_size(order.len());
    let phases = round_phases(size);

    let mut created: Vec<MatchId> = Vec::with_capacity(size - 1);
    let mut next_round: Vec<MatchId> = Vec::new();
    for (depth, phase) in phases.iter().enumerate().rev() {
        let count = size >> (depth + 1);
        let mut round = Vec::with_capacity(count);
        for j in 0..count {
            let mut game = GameMatch::new(
                tournament_id,
                *phase,
                format!("{}{}", phase.key_prefix(), j + 1),
            );
            game.next = next_round.get(j / 2).map(|&match_id| NextMatch {
                match_id,
                slot: Slot::for_index(j),
            });
            if depth == 0 {
                fill_first_round(&mut game, slots[j]);
            }
            store.insert_match(&game)?;
            if game.is_bye() {
                debug!("Bye in {} advances {:?}", game.key, game.home);
                propagate_result(store, &game)?;
            }
            round.push(game.id);
            created.push(game.id);
        }
        next_round = round;
    }

    info!(
        "Generated bracket for tournament {}: {} entrants, size {}, {} byes",
        tournament_id,
        order.len(),
        size,
        size - order.len()
    );

    created
        .into_iter()
        .map(|id| -> Result<GameMatch, TournamentError> {
            store.get_match(id)?.ok_or(TournamentError::MatchNotFound(id))
        })
        .collect()
}

fn fill_first_round(game: &mut GameMatch, slot: FirstRoundSlot) {
    match slot {
        FirstRoundSlot::Bye(entrant) => {
            game.home = Some(entrant);
            game.status = MatchStatus::Finished;
            game.home_score = Some(WALKOVER_SCORE.0);
            game.away_score = Some(WALKOVER_SCORE.1);
        }
        FirstRoundSlot::HeadToHead(home, away) => {
            game.home = Some(home);
            game.away = Some(away);
        }
    }
}

/// Knockout matches of one phase, for display.
#[derive(Clone, Debug, Serialize)]
pub struct BracketRound {
    pub phase: Phase,
    pub matches: Vec<GameMatch>,
}

/// Group knockout matches by round, earliest round first; matches keep their stored order.
pub fn bracket_rounds(matches: &[GameMatch]) -> Vec<BracketRound> {
    let mut rounds: Vec<BracketRound> = Vec::new();
    for m in matches.iter().filter(|m| m.phase.is_knockout()) {
        match rounds.iter_mut().find(|r| r.phase == m.phase) {
            Some(round) => round.matches.push(m.clone()),
            None => rounds.push(BracketRound {
                phase: m.phase,
                matches: vec![m.clone()],
            }),
        }
    }
    rounds.sort_by_key(|r| std::cmp::Reverse(r.phase.entrants()));
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    #[test]
    fn sizes_round_up_to_powers_of_two() {
        assert_eq!(bracket_size(2), 2);
        assert_eq!(bracket_size(3), 4);
        assert_eq!(bracket_size(5), 8);
        assert_eq!(bracket_size(16), 16);
        assert_eq!(bracket_size(17), 32);
    }

    #[test]
    fn round_phases_by_size() {
        assert_eq!(round_phases(2), vec![Phase::Final]);
        assert_eq!(round_phases(4), vec![Phase::Semifinal, Phase::Final]);
        assert_eq!(
            round_phases(16),
            vec![
                Phase::RoundOf(16),
                Phase::Quarterfinal,
                Phase::Semifinal,
                Phase::Final
            ]
        );
        assert_eq!(round_phases(32)[0], Phase::RoundOf(32));
    }

    #[test]
    fn first_round_consumes_every_entrant_once() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 2..=33 {
            let ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
            let slots = seed_first_round(&ids, &mut rng);
            assert_eq!(slots.len(), bracket_size(n) / 2);

            let byes = slots
                .iter()
                .filter(|s| matches!(s, FirstRoundSlot::Bye(_)))
                .count();
            assert_eq!(byes, bracket_size(n) - n);

            let placed: Vec<Uuid> = slots
                .iter()
                .flat_map(|s| match *s {
                    FirstRoundSlot::Bye(a) => vec![a],
                    FirstRoundSlot::HeadToHead(a, b) => vec![a, b],
                })
                .collect();
            assert_eq!(placed, ids);
        }
    }

    #[test]
    fn too_few_entrants_yield_no_slots() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(seed_first_round(&[], &mut rng).is_empty());
        assert!(seed_first_round(&[Uuid::new_v4()], &mut rng).is_empty());
    }
}
