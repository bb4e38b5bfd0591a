//! Integration tests for group draws: dealing, manual groups, round-robin fixtures.

mod common;

use common::{entrants, rng, store_with_tournament};
use intramural_draw::logic::assign_groups;
use intramural_draw::{
    compute_standings_by_group, generate_groups, EntityStore, ManualGroups, MatchStatus, Phase,
    TournamentError,
};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn single_group_plays_full_round_robin() {
    for k in 2..=7 {
        let (store, tid) = store_with_tournament();
        let teams = entrants(k);
        let created = generate_groups(&store, tid, &teams, 1, None, false, &mut rng(k as u64)).unwrap();
        assert_eq!(created.len(), k * (k - 1) / 2, "k = {}", k);

        let mut pairs = HashSet::new();
        for m in &created {
            let (h, a) = (m.home.unwrap(), m.away.unwrap());
            assert_ne!(h, a);
            let pair = if h < a { (h, a) } else { (a, h) };
            assert!(pairs.insert(pair), "pair repeated");
            assert_eq!(m.phase, Phase::Groups);
            assert_eq!(m.key, "GA");
            assert_eq!(m.status, MatchStatus::Scheduled);
            assert!(m.home_score.is_none() && m.away_score.is_none());
            assert!(m.next.is_none());
        }
    }
}

#[test]
fn random_deal_spreads_entrants_over_labelled_groups() {
    let (store, tid) = store_with_tournament();
    let teams = entrants(10);
    let created = generate_groups(&store, tid, &teams, 3, None, false, &mut rng(42)).unwrap();

    let assignments = store.group_assignments(tid).unwrap();
    assert_eq!(assignments.len(), 10);
    let unique: HashSet<_> = assignments.iter().map(|a| a.entrant_id).collect();
    assert_eq!(unique.len(), 10);

    let size_of = |label: &str| assignments.iter().filter(|a| a.group == label).count();
    assert_eq!(size_of("A"), 4);
    assert_eq!(size_of("B"), 3);
    assert_eq!(size_of("C"), 3);

    // 6 + 3 + 3
    assert_eq!(created.len(), 12);
    assert_eq!(created.iter().filter(|m| m.key == "GA").count(), 6);
    assert_eq!(created.iter().filter(|m| m.key == "GB").count(), 3);
    assert_eq!(created.iter().filter(|m| m.key == "GC").count(), 3);

    // Fixtures stay inside their group.
    for m in &created {
        let label = &m.key[1..];
        for side in [m.home.unwrap(), m.away.unwrap()] {
            let a = assignments.iter().find(|a| a.entrant_id == side).unwrap();
            assert_eq!(a.group, label);
        }
    }
}

#[test]
fn groups_with_one_entrant_produce_no_matches() {
    let (store, tid) = store_with_tournament();
    let created = generate_groups(&store, tid, &entrants(3), 4, None, false, &mut rng(1)).unwrap();
    assert!(created.is_empty());
    assert_eq!(store.group_assignments(tid).unwrap().len(), 3);
}

#[test]
fn zero_groups_is_invalid() {
    let (store, tid) = store_with_tournament();
    let result = generate_groups(&store, tid, &entrants(4), 0, None, false, &mut rng(1));
    assert!(matches!(result, Err(TournamentError::InvalidGroupCount(0))));
}

#[test]
fn manual_groups_take_precedence_and_skip_unknown_or_repeated_ids() {
    let teams = entrants(5);
    let mut manual = ManualGroups::new();
    manual.insert("A".into(), vec![teams[0].id, teams[1].id, Uuid::new_v4()]);
    manual.insert("B".into(), vec![teams[2].id, teams[0].id, teams[3].id]);

    let groups = assign_groups(&teams, 7, Some(&manual), false, &mut rng(0)).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, "A");
    assert_eq!(groups[0].entrants, vec![teams[0].clone(), teams[1].clone()]);
    assert_eq!(groups[1].label, "B");
    assert_eq!(groups[1].entrants, vec![teams[2].clone(), teams[3].clone()]);
    // teams[4] is not listed anywhere and stays out.
    assert!(groups
        .iter()
        .all(|g| !g.entrants.iter().any(|e| e.id == teams[4].id)));
}

#[test]
fn strict_manual_groups_reject_unlisted_entrants() {
    let teams = entrants(3);
    let mut manual = ManualGroups::new();
    manual.insert("A".into(), vec![teams[0].id, teams[1].id]);

    match assign_groups(&teams, 1, Some(&manual), true, &mut rng(0)) {
        Err(TournamentError::UnassignedEntrants(ids)) => assert_eq!(ids, vec![teams[2].id]),
        other => panic!("expected UnassignedEntrants, got {:?}", other),
    }
}

#[test]
fn two_groups_of_three_end_to_end() {
    let (store, tid) = store_with_tournament();
    let teams = entrants(6);
    let mut manual = ManualGroups::new();
    manual.insert("A".into(), teams[..3].iter().map(|e| e.id).collect());
    manual.insert("B".into(), teams[3..].iter().map(|e| e.id).collect());

    let created = generate_groups(&store, tid, &teams, 2, Some(&manual), false, &mut rng(0)).unwrap();
    assert_eq!(created.len(), 6);

    // Pairs in member order: (T1,T2) (T1,T3) (T2,T3) and (T4,T5) (T4,T6) (T5,T6).
    let scores = [(3, 0), (1, 1), (0, 2), (3, 0), (1, 1), (0, 2)];
    for (m, (h, a)) in created.iter().zip(scores) {
        let mut m = m.clone();
        m.home_score = Some(h);
        m.away_score = Some(a);
        m.status = MatchStatus::Finished;
        store.update_match(&m).unwrap();
    }

    let tables = compute_standings_by_group(
        &teams,
        &store.group_assignments(tid).unwrap(),
        &store.matches(tid).unwrap(),
    );
    assert_eq!(tables.len(), 2);
    for (table, members) in tables.iter().zip([&teams[..3], &teams[3..]]) {
        // T1: W 3-0, D 1-1 → 4 pts, +3.  T3: D 1-1, W 2-0 → 4 pts, +2.  T2: L 0-3, L 0-2 → 0 pts.
        let order: Vec<_> = table.standings.iter().map(|s| s.entrant_id).collect();
        assert_eq!(order, vec![members[0].id, members[2].id, members[1].id]);
        assert_eq!(table.standings[0].points, 4);
        assert_eq!(table.standings[0].goal_difference, 3);
        assert_eq!(table.standings[1].points, 4);
        assert_eq!(table.standings[1].goal_difference, 2);
        assert_eq!(table.standings[2].points, 0);
        assert_eq!(table.standings[2].losses, 2);
    }
}
