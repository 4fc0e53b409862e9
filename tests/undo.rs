//! Integration tests for single-step undo.

mod common;

use archetype_ranker::{
    apply_duel_result, apply_group_result, begin_next_match, create_initial_state, undo_last_result,
    Phase, Tournament, TournamentError, UndoRecord,
};
use common::{assert_invariants, enriched_state, into_swiss, names, play_step};

/// The state a result was applied to, minus the record undo cannot bring back.
fn without_record(state: &Tournament) -> Tournament {
    let mut s = state.clone();
    s.last_result = None;
    s
}

/// Drop the transition snapshot, as in sessions saved by older builds.
fn strip_snapshot(state: &mut Tournament) {
    match state.last_result.as_mut() {
        Some(UndoRecord::Group { snapshot, .. }) | Some(UndoRecord::Duel { snapshot, .. }) => {
            *snapshot = None;
        }
        None => {}
    }
}

#[test]
fn undo_within_a_round_restores_the_group() {
    let state = create_initial_state(&names(8), 6).unwrap();
    assert_eq!(state.groups_total, 2);
    let group = state.current_match.clone().unwrap();
    let next = apply_group_result(&state, &group[0], &group[1..]).unwrap();
    assert_eq!(next.groups_completed, 1);

    let back = undo_last_result(&next).unwrap();
    assert_eq!(back, without_record(&state));
}

#[test]
fn undo_across_a_round_uses_the_snapshot() {
    let state = create_initial_state(&["A", "B", "C", "D"], 42).unwrap();
    let next = apply_group_result(&state, "A", &["B", "C", "D"]).unwrap();
    assert_eq!(next.phase_round, 1);

    let back = undo_last_result(&next).unwrap();
    assert_eq!(back, state);
    assert_eq!(back.rating("A"), 1000);
    assert_eq!(back.phase_round, 0);
}

#[test]
fn every_step_of_a_full_run_can_be_undone_exactly() {
    let mut state = enriched_state(14, 31);
    let mut steps = 0;
    loop {
        let presented = begin_next_match(&state);
        let Some(next) = play_step(&presented) else {
            break;
        };
        let back = undo_last_result(&next).unwrap();
        assert_invariants(&back);
        assert_eq!(back, without_record(&presented), "step {steps} did not undo cleanly");
        state = next;
        steps += 1;
    }
    assert_eq!(begin_next_match(&state).phase, Phase::Finished);
    assert!(steps > 10);
}

#[test]
fn undo_duel_restores_ratings_and_history() {
    let state = begin_next_match(&into_swiss(create_initial_state(&names(6), 2).unwrap()));
    let pair = state.current_match.clone().unwrap();
    let next = apply_duel_result(&state, &pair[1], &pair[0]).unwrap();
    assert_eq!(next.matches_played.len(), 1);

    let back = undo_last_result(&next).unwrap();
    assert!(back.matches_played.is_empty());
    assert_eq!(back.current_match, Some(pair.clone()));
    assert_eq!(back.rating(&pair[0]), 1000);
    assert_eq!(back.rating(&pair[1]), 1000);
    assert_eq!(back.record(&pair[1]).unwrap().wins, 0);
    assert_eq!(back, state);
}

#[test]
fn second_undo_is_rejected() {
    let state = create_initial_state(&["A", "B", "C", "D"], 42).unwrap();
    let next = apply_group_result(&state, "A", &["B", "C", "D"]).unwrap();
    let back = undo_last_result(&next).unwrap();
    assert_eq!(undo_last_result(&back), Err(TournamentError::NothingToUndo));
    assert_eq!(undo_last_result(&state), Err(TournamentError::NothingToUndo));
}

#[test]
fn undo_after_finish_reopens_swiss() {
    let state = begin_next_match(&into_swiss(create_initial_state(&["A", "B"], 1).unwrap()));
    let played = apply_duel_result(&state, "A", "B").unwrap();
    let finished = begin_next_match(&played);
    assert_eq!(finished.phase, Phase::Finished);

    let back = undo_last_result(&finished).unwrap();
    assert_eq!(back.phase, Phase::Swiss);
    assert_eq!(back.current_match, state.current_match);
    assert!(back.matches_played.is_empty());
    assert_eq!(back.rating("A"), 1000);
}

#[test]
fn undo_across_coverage_cut_goes_back_one_step() {
    let mut state = create_initial_state(&names(10), 3).unwrap();
    let mut presented = begin_next_match(&state);
    while presented.phase == Phase::Coverage {
        state = play_step(&presented).unwrap();
        if state.phase == Phase::Refinement {
            break;
        }
        presented = begin_next_match(&state);
    }
    assert_eq!(state.phase, Phase::Refinement);
    assert_eq!(state.pool.len(), 5);

    let back = undo_last_result(&state).unwrap();
    assert_eq!(back.phase, Phase::Coverage);
    assert_eq!(back.phase_round, 1);
    assert_eq!(back.pool.len(), 10);
    assert_eq!(back.groups_completed, back.groups_total - 1);
    assert_eq!(back, without_record(&presented));
}

#[test]
fn legacy_record_without_snapshot_rebuilds_previous_round() {
    let state = create_initial_state(&["A", "B", "C", "D"], 42).unwrap();
    let mut next = apply_group_result(&state, "A", &["B", "C", "D"]).unwrap();
    strip_snapshot(&mut next);

    let back = undo_last_result(&next).unwrap();
    assert_eq!(back.phase, Phase::Coverage);
    assert_eq!(back.phase_round, 0);
    assert_eq!(back.current_match, state.current_match);
    for name in ["A", "B", "C", "D"] {
        assert_eq!(back.rating(name), 1000);
    }
    assert_eq!(back.groups_completed, 0);
    assert_eq!(back.groups_total, 1);
}

#[test]
fn legacy_record_across_phase_cut_returns_to_coverage() {
    let mut state = create_initial_state(&names(10), 3).unwrap();
    while state.phase == Phase::Coverage {
        state = play_step(&state).unwrap();
    }
    let ratings_before: Vec<i32> = {
        let back = undo_last_result(&state).unwrap();
        names(10).iter().map(|n| back.rating(n)).collect()
    };
    strip_snapshot(&mut state);

    let back = undo_last_result(&state).unwrap();
    assert_invariants(&back);
    assert_eq!(back.phase, Phase::Coverage);
    assert_eq!(back.phase_round, 1);
    assert_eq!(back.pool.len(), 10);
    assert_eq!(back.groups_completed, back.groups_total - 1);
    assert_eq!(back.current_match.as_ref(), back.current_groups.last());
    assert_eq!(back.current_groups.iter().map(Vec::len).sum::<usize>(), 10);
    let ratings_after: Vec<i32> = names(10).iter().map(|n| back.rating(n)).collect();
    assert_eq!(ratings_after, ratings_before);
}

#[test]
fn legacy_duel_record_reopens_swiss() {
    let state = begin_next_match(&into_swiss(create_initial_state(&["A", "B"], 1).unwrap()));
    let mut finished = begin_next_match(&apply_duel_result(&state, "B", "A").unwrap());
    assert_eq!(finished.phase, Phase::Finished);
    strip_snapshot(&mut finished);

    let back = undo_last_result(&finished).unwrap();
    assert_eq!(back.phase, Phase::Swiss);
    assert!(back.matches_played.is_empty());
    assert_eq!(back.rating("B"), 1000);
    assert_eq!(back.record("A").unwrap().losses, 0);
}

#[test]
fn legacy_record_across_swiss_cut_returns_to_refinement() {
    let mut state = create_initial_state(&names(12), 8).unwrap();
    while state.phase != Phase::Swiss {
        state = play_step(&state).unwrap();
    }
    let exact = undo_last_result(&state).unwrap();
    strip_snapshot(&mut state);

    let back = undo_last_result(&state).unwrap();
    assert_invariants(&back);
    assert_eq!(back.phase, Phase::Refinement);
    assert_eq!(back.phase_round, 0);
    assert_eq!(back.groups_completed, back.groups_total - 1);
    assert_eq!(back.current_match.as_ref(), back.current_groups.last());
    assert!(back.matches_played.is_empty());

    let mut pool = back.pool.clone();
    let mut exact_pool = exact.pool.clone();
    pool.sort();
    exact_pool.sort();
    assert_eq!(pool, exact_pool);
    for name in names(12) {
        assert_eq!(back.rating(&name), exact.rating(&name));
    }
}
