//! Group stage: partition entrants into labelled groups and emit round-robin fixtures.

use crate::models::{
    Entrant, EntrantId, GameMatch, GroupAssignment, Phase, TournamentError, TournamentId,
};
use crate::store::EntityStore;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Explicit group membership: label → entrant ids.
pub type ManualGroups = BTreeMap<String, Vec<EntrantId>>;

/// A drawn group, entrants in draw order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    pub label: String,
    pub entrants: Vec<Entrant>,
}

/// Label for the group at `index`: A..Z, then AA, AB, ...
pub fn group_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Match key for a group label, e.g. `GA`.
pub fn group_key(label: &str) -> String {
    format!("G{}", label)
}

/// Sort key placing `B` before `AA`.
pub fn label_order(label: &str) -> (usize, &str) {
    (label.len(), label)
}

/// Decide group membership without touching the store.
///
/// Manual groups take precedence entirely: unknown ids and repeated ids are skipped with a
/// warning, and unlisted entrants are left out unless `strict` is set, which makes them an
/// error. Otherwise entrants are shuffled and dealt round-robin into `groups_count` groups.
pub fn assign_groups<R: Rng + ?Sized>(
    entrants: &[Entrant],
    groups_count: usize,
    manual: Option<&ManualGroups>,
    strict: bool,
    rng: &mut R,
) -> Result<Vec<Group>, TournamentError> {
    if let Some(manual) = manual {
        return assign_manual(entrants, manual, strict);
    }
    if groups_count == 0 {
        return Err(TournamentError::InvalidGroupCount(groups_count));
    }

    let mut shuffled = entrants.to_vec();
    shuffled.shuffle(rng);
    let mut groups: Vec<Group> = (0..groups_count)
        .map(|i| Group {
            label: group_label(i),
            entrants: Vec::new(),
        })
        .collect();
    for (i, entrant) in shuffled.into_iter().enumerate() {
        groups[i % groups_count].entrants.push(entrant);
    }
    Ok(groups)
}

fn assign_manual(
    entrants: &[Entrant],
    manual: &ManualGroups,
    strict: bool,
) -> Result<Vec<Group>, TournamentError> {
    let valid: HashMap<EntrantId, &Entrant> = entrants.iter().map(|e| (e.id, e)).collect();
    let mut placed: HashSet<EntrantId> = HashSet::new();

    let mut labels: Vec<&String> = manual.keys().collect();
    labels.sort_by(|a, b| label_order(a).cmp(&label_order(b)));

    let mut groups = Vec::with_capacity(labels.len());
    for label in labels {
        let mut members = Vec::new();
        for id in &manual[label] {
            let Some(entrant) = valid.get(id) else {
                warn!("Group {}: {} is not an eligible team, skipped", label, id);
                continue;
            };
            if !placed.insert(*id) {
                warn!("Group {}: {} is already in another group, skipped", label, id);
                continue;
            }
            members.push((*entrant).clone());
        }
        groups.push(Group {
            label: label.clone(),
            entrants: members,
        });
    }

    let unassigned: Vec<EntrantId> = entrants
        .iter()
        .map(|e| e.id)
        .filter(|id| !placed.contains(id))
        .collect();
    if !unassigned.is_empty() {
        if strict {
            return Err(TournamentError::UnassignedEntrants(unassigned));
        }
        warn!("{} team(s) left out of manual groups", unassigned.len());
    }
    Ok(groups)
}

/// Every unordered pair once, in member order.
pub fn round_robin_pairs<T: Copy>(members: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
    for (i, &home) in members.iter().enumerate() {
        for &away in &members[i + 1..] {
            pairs.push((home, away));
        }
    }
    pairs
}

/// Persist assignments and round-robin fixtures for already drawn groups.
///
/// Groups with fewer than two entrants get assignments but no matches.
pub fn create_group_fixtures<S: EntityStore + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    groups: &[Group],
) -> Result<Vec<GameMatch>, TournamentError> {
    let mut created = Vec::new();
    for group in groups {
        for entrant in &group.entrants {
            store.insert_group_assignment(&GroupAssignment {
                tournament_id,
                entrant_id: entrant.id,
                group: group.label.clone(),
            })?;
        }

        let ids: Vec<EntrantId> = group.entrants.iter().map(|e| e.id).collect();
        for (home, away) in round_robin_pairs(&ids) {
            let mut game = GameMatch::new(tournament_id, Phase::Groups, group_key(&group.label));
            game.home = Some(home);
            game.away = Some(away);
            store.insert_match(&game)?;
            created.push(game);
        }
    }
    info!(
        "Generated {} groups for tournament {} with {} matches",
        groups.len(),
        tournament_id,
        created.len()
    );
    Ok(created)
}

/// Draw groups and persist their fixtures in one step.
pub fn generate_groups<S, R>(
    store: &S,
    tournament_id: TournamentId,
    entrants: &[Entrant],
    groups_count: usize,
    manual: Option<&ManualGroups>,
    strict: bool,
    rng: &mut R,
) -> Result<Vec<GameMatch>, TournamentError>
where
    S: EntityStore + ?Sized,
    R: Rng + ?Sized,
{
    let groups = assign_groups(entrants, groups_count, manual, strict, rng)?;
    create_group_fixtures(store, tournament_id, &groups)
}
