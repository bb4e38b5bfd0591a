//! Result propagation: a finished bracket match writes its winner into the next match.

use crate::models::{EntrantId, GameMatch, MatchId};
use crate::store::{EntityStore, StoreError};
use log::{debug, info, warn};

/// Write the winner of `game` into its next match's slot.
///
/// Returns the next match id when a slot was written (or already held the winner). No-op for
/// unlinked matches, draws and unfinished matches. A missing next match is logged and skipped.
/// Only the slot changes; the next match is never finished here.
pub fn propagate_result<S: EntityStore + ?Sized>(
    store: &S,
    game: &GameMatch,
) -> Result<Option<MatchId>, StoreError> {
    let Some(next) = game.next else {
        return Ok(None);
    };
    let Some(winner) = game.winner() else {
        debug!("Match {} has no winner; nothing to advance", game.id);
        return Ok(None);
    };
    let Some(mut target) = store.get_match(next.match_id)? else {
        warn!(
            "Match {} links to missing next match {}; winner {} not advanced",
            game.id, next.match_id, winner
        );
        return Ok(None);
    };

    if target.entrant(next.slot) != Some(winner) {
        target.set_entrant(next.slot, winner);
        store.update_match(&target)?;
        info!(
            "Advanced {} from {} into {} ({:?})",
            winner, game.key, target.key, next.slot
        );
    }
    Ok(Some(target.id))
}

/// Take a withdrawn winner back out of the next match's slot.
///
/// Only a slot still holding `winner` is cleared. Returns the next match id when it was.
pub fn retract_winner<S: EntityStore + ?Sized>(
    store: &S,
    game: &GameMatch,
    winner: EntrantId,
) -> Result<Option<MatchId>, StoreError> {
    let Some(next) = game.next else {
        return Ok(None);
    };
    let Some(mut target) = store.get_match(next.match_id)? else {
        return Ok(None);
    };
    if target.entrant(next.slot) != Some(winner) {
        return Ok(None);
    }
    target.clear_entrant(next.slot);
    store.update_match(&target)?;
    info!(
        "Withdrew {} from {} ({:?}) after {} left FINISHED",
        winner, target.key, next.slot, game.key
    );
    Ok(Some(target.id))
}

/// Hook for a result that is no longer finished. Failures are logged, never returned.
pub fn on_match_result_withdrawn<S: EntityStore + ?Sized>(
    store: &S,
    game: &GameMatch,
    winner: EntrantId,
) {
    if let Err(e) = retract_winner(store, game, winner) {
        warn!("Withdrawing winner of match {} failed: {}", game.id, e);
    }
}

/// Hook for every result write. Propagation problems never fail the write that triggered them.
pub fn on_match_result_updated<S: EntityStore + ?Sized>(store: &S, game: &GameMatch) {
    if let Err(e) = propagate_result(store, game) {
        warn!("Propagation after match {} failed: {}", game.id, e);
    }
}
