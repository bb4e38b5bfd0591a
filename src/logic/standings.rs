//! Standings: recomputed from the match log on every call, never stored.

use crate::logic::groups::{group_key, label_order};
use crate::models::{Entrant, EntrantId, GameMatch, GroupAssignment, Phase, Standing};
use serde::Serialize;
use std::collections::HashMap;

/// Rank entrants from their finished matches.
///
/// A match counts only when it is finished with both sides and both scores set; byes and
/// unscored matches are skipped entirely. Sides that are not among `entrants` are ignored.
/// Ordered by points, then goal difference, then goals for; remaining ties keep `entrants` order.
pub fn compute_standings(entrants: &[Entrant], matches: &[GameMatch]) -> Vec<Standing> {
    let mut table: Vec<Standing> = entrants.iter().map(Standing::new).collect();
    let index: HashMap<EntrantId, usize> = entrants
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id, i))
        .collect();

    for m in matches {
        let (Some(home), Some(away)) = (m.home, m.away) else {
            continue;
        };
        let Some((home_score, away_score)) = m.final_score() else {
            continue;
        };
        if let Some(&i) = index.get(&home) {
            table[i].record(home_score, away_score);
        }
        if let Some(&i) = index.get(&away) {
            table[i].record(away_score, home_score);
        }
    }

    sort_standings(&mut table);
    table
}

/// Stable sort: points desc, goal difference desc, goals for desc.
pub fn sort_standings(table: &mut [Standing]) {
    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
    });
}

/// Standings of one group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupTable {
    pub group: String,
    pub standings: Vec<Standing>,
}

/// One table per group in label order, each built from that group's own GROUPS-phase
/// matches only. Entrants without an assignment do not appear.
pub fn compute_standings_by_group(
    entrants: &[Entrant],
    assignments: &[GroupAssignment],
    matches: &[GameMatch],
) -> Vec<GroupTable> {
    let group_of: HashMap<EntrantId, &str> = assignments
        .iter()
        .map(|a| (a.entrant_id, a.group.as_str()))
        .collect();
    let mut members: HashMap<&str, Vec<Entrant>> = HashMap::new();
    for e in entrants {
        if let Some(&group) = group_of.get(&e.id) {
            members.entry(group).or_default().push(e.clone());
        }
    }

    let mut tables: Vec<GroupTable> = members
        .into_iter()
        .map(|(label, group_entrants)| {
            let key = group_key(label);
            let group_matches: Vec<GameMatch> = matches
                .iter()
                .filter(|m| m.phase == Phase::Groups && m.key == key)
                .cloned()
                .collect();
            GroupTable {
                group: label.to_string(),
                standings: compute_standings(&group_entrants, &group_matches),
            }
        })
        .collect();
    tables.sort_by(|a, b| label_order(&a.group).cmp(&label_order(&b.group)));
    tables
}

/// Serialize a standings table as CSV with a header row.
pub fn standings_csv(table: &[Standing]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in table {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;
    use uuid::Uuid;

    fn played(t: Uuid, home: &Entrant, away: &Entrant, score: (u32, u32)) -> GameMatch {
        let mut m = GameMatch::new(t, Phase::Groups, "GA");
        m.home = Some(home.id);
        m.away = Some(away.id);
        m.home_score = Some(score.0);
        m.away_score = Some(score.1);
        m.status = MatchStatus::Finished;
        m
    }

    #[test]
    fn ties_fall_back_to_goals_for_then_encounter_order() {
        let t = Uuid::new_v4();
        let a = Entrant::new("A");
        let b = Entrant::new("B");
        let c = Entrant::new("C");
        let d = Entrant::new("D");
        // A and C: 3 pts, +1. C scored more.
        let matches = vec![played(t, &a, &b, (1, 0)), played(t, &c, &d, (3, 2))];
        let table = compute_standings(&[a.clone(), b.clone(), c.clone(), d.clone()], &matches);
        let order: Vec<_> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B", "D"]);

        // Identical records keep input order.
        let table = compute_standings(&[d.clone(), b.clone()], &[]);
        assert_eq!(table[0].entrant_id, d.id);
        assert_eq!(table[1].entrant_id, b.id);
    }

    #[test]
    fn unfinished_and_bye_matches_are_ignored() {
        let t = Uuid::new_v4();
        let a = Entrant::new("A");
        let b = Entrant::new("B");
        let mut scheduled = played(t, &a, &b, (5, 0));
        scheduled.status = MatchStatus::Scheduled;
        let mut bye = played(t, &a, &b, (3, 0));
        bye.away = None;
        let mut unscored = played(t, &a, &b, (0, 0));
        unscored.away_score = None;

        let table = compute_standings(&[a, b], &[scheduled, bye, unscored]);
        assert!(table.iter().all(|s| s.played == 0 && s.points == 0));
    }

    #[test]
    fn csv_has_header_and_one_row_per_entrant() {
        let t = Uuid::new_v4();
        let a = Entrant::new("Aces");
        let b = Entrant::new("Bolts");
        let table = compute_standings(&[a.clone(), b.clone()], &[played(t, &a, &b, (2, 1))]);
        let text = String::from_utf8(standings_csv(&table).unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("entrant_id,name,played"));
        assert!(lines[1].contains("Aces"));
        assert!(lines[1].ends_with(",3"));
    }
}
