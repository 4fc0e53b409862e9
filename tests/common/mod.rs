//! Shared helpers for the integration tests.

#![allow(dead_code)]

use archetype_ranker::{
    advance_phase_if_round_complete, apply_duel_result, apply_group_result, begin_next_match,
    create_initial_state_with, is_swiss_complete, Enrichment, Phase, Tournament,
    TournamentSettings,
};

pub fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("C{i:02}")).collect()
}

/// Candidates spread over a few richness tiers and themes.
pub fn enriched_state(n: usize, seed: u64) -> Tournament {
    let attrs = ["LIGHT", "DARK", "FIRE"];
    let races = ["Dragon", "Spellcaster"];
    let entries = names(n)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let enrichment = if i % 5 == 4 {
                Enrichment::default()
            } else {
                Enrichment::new((i % 3) as u32, Some(attrs[i % 3]), Some(races[i % 2]))
            };
            (name, enrichment)
        })
        .collect();
    create_initial_state_with(entries, seed, TournamentSettings::default()).unwrap()
}

/// Same state, moved straight into the Swiss phase over its whole pool.
pub fn into_swiss(mut state: Tournament) -> Tournament {
    state.phase = Phase::Swiss;
    state.phase_round = 0;
    state.current_groups.clear();
    state.groups_total = 0;
    state.groups_completed = 0;
    state.current_match = None;
    state
}

/// Alphabetically smallest name in the match.
pub fn favourite(m: &[String]) -> String {
    m.iter().min().cloned().unwrap()
}

/// Check the state invariants that must hold between any two operations.
pub fn assert_invariants(state: &Tournament) {
    assert!(state.groups_completed <= state.groups_total);
    assert_eq!(state.groups_total, state.current_groups.len());
    if let Some(m) = &state.current_match {
        for name in m {
            assert!(state.phase_pool.contains(name), "{name} not in phase pool");
        }
    }
    for name in &state.phase_pool {
        assert!(state.pool.contains(name));
    }
}

/// One step: present the next match and resolve it in favour of the smallest name.
/// Returns `None` once nothing is left to play.
pub fn play_step(state: &Tournament) -> Option<Tournament> {
    let state = begin_next_match(state);
    let m = state.current_match.clone()?;
    let winner = favourite(&m);
    let next = if state.phase == Phase::Swiss {
        let loser = m.iter().find(|n| **n != winner).cloned().unwrap();
        let after = apply_duel_result(&state, &winner, &loser).unwrap();
        if is_swiss_complete(&after) {
            advance_phase_if_round_complete(&after)
        } else {
            after
        }
    } else {
        let losers: Vec<String> = m.iter().filter(|n| **n != winner).cloned().collect();
        apply_group_result(&state, &winner, &losers).unwrap()
    };
    Some(next)
}

/// Play until Finished, checking invariants and forward-only phases on the way.
pub fn play_out(mut state: Tournament) -> Tournament {
    for _ in 0..10_000 {
        assert_invariants(&state);
        let phase_before = state.phase;
        match play_step(&state) {
            Some(next) => {
                assert!(next.phase >= phase_before, "phase regressed without undo");
                state = next;
            }
            None => {
                let presented = begin_next_match(&state);
                assert_eq!(presented.phase, Phase::Finished);
                return presented;
            }
        }
    }
    panic!("tournament did not finish");
}
