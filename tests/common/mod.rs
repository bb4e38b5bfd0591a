//! Shared fixtures for integration tests.
#![allow(dead_code)]

use intramural_draw::{
    DrawService, EntityStore, Entrant, GameMatch, MatchId, MatchStatus, MemoryStore, Phase,
    ResultUpdate, Tournament, TournamentId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A service over a fresh store with one tournament and `n` registered teams.
pub fn service_with_entrants(n: usize) -> (DrawService<MemoryStore>, TournamentId, Vec<Entrant>) {
    let service = DrawService::new(MemoryStore::new());
    let tournament = Tournament::new("Spring Futsal");
    let tid = tournament.id;
    service.store().insert_tournament(tournament).unwrap();
    let entrants = (0..n)
        .map(|i| {
            service
                .store()
                .register_entrant(tid, format!("Team {}", i + 1))
                .unwrap()
        })
        .collect();
    (service, tid, entrants)
}

/// A bare store with one tournament, for calling generators directly.
pub fn store_with_tournament() -> (MemoryStore, TournamentId) {
    let store = MemoryStore::new();
    let tournament = Tournament::new("Intramural Cup");
    let tid = tournament.id;
    store.insert_tournament(tournament).unwrap();
    (store, tid)
}

pub fn entrants(n: usize) -> Vec<Entrant> {
    (0..n).map(|i| Entrant::new(format!("E{}", i + 1))).collect()
}

pub fn finish(
    service: &DrawService<MemoryStore>,
    match_id: MatchId,
    home: u32,
    away: u32,
) -> GameMatch {
    service
        .submit_result(
            match_id,
            ResultUpdate {
                home_score: Some(home),
                away_score: Some(away),
                status: MatchStatus::Finished,
            },
        )
        .unwrap()
}

/// Stored matches of one phase, in creation order.
pub fn matches_in<S: EntityStore>(store: &S, tid: TournamentId, phase: Phase) -> Vec<GameMatch> {
    store
        .matches(tid)
        .unwrap()
        .into_iter()
        .filter(|m| m.phase == phase)
        .collect()
}
