//! Single-step undo of the most recent result.
//!
//! Rating deltas are always subtracted exactly. If the result also triggered
//! a round or phase transition, the stored snapshot restores the schedule;
//! sessions saved before snapshots existed fall back to a best-effort
//! reconstruction.

use crate::logic::grouping::merge_singletons;
use crate::logic::phase::{groups_for_round, top_by_rating};
use crate::models::{Group, PairKey, Phase, Tournament, TournamentError, TransitionSnapshot, UndoRecord};

/// Revert the pending result. Reports [`TournamentError::NothingToUndo`] when none is pending.
pub fn undo_last_result(state: &Tournament) -> Result<Tournament, TournamentError> {
    let record = state.last_result.clone().ok_or(TournamentError::NothingToUndo)?;
    let mut prev = state.clone();
    prev.last_result = None;

    match &record {
        UndoRecord::Group {
            group,
            winner,
            winner_delta,
            losers,
            snapshot,
        } => {
            prev.record_mut(winner)?.revert_win(*winner_delta);
            for (name, delta) in losers {
                prev.record_mut(name)?.revert_loss(*delta);
            }
            match snapshot {
                Some(snap) => restore_snapshot(&mut prev, snap),
                None if resolved_in_current_round(&prev, group) => prev.groups_completed -= 1,
                None => reconstruct_group_round(&mut prev, group),
            }
        }
        UndoRecord::Duel {
            winner,
            winner_delta,
            loser,
            loser_delta,
            snapshot,
            ..
        } => {
            match snapshot {
                Some(snap) => restore_snapshot(&mut prev, snap),
                None if prev.phase == Phase::Finished => {
                    log::warn!("Undo without snapshot: reopening the Swiss phase");
                    prev.phase = Phase::Swiss;
                }
                None => {}
            }
            prev.record_mut(winner)?.revert_win(*winner_delta);
            prev.record_mut(loser)?.revert_loss(*loser_delta);
            prev.matches_played.remove(&PairKey::new(winner, loser));
        }
    }

    prev.current_match = Some(record.resolved_match());
    prev.round_counter = prev.round_counter.saturating_sub(1);
    log::debug!("Undid result; back in {} round {}", prev.phase, prev.phase_round);
    Ok(prev)
}

fn restore_snapshot(state: &mut Tournament, snap: &TransitionSnapshot) {
    state.restore(snap);
    state.groups_completed = snap.groups_total.saturating_sub(1);
}

fn same_members(a: &Group, b: &Group) -> bool {
    a.len() == b.len() && a.iter().all(|n| b.contains(n))
}

/// The undone group is the last completed group of the round still on screen.
fn resolved_in_current_round(state: &Tournament, group: &Group) -> bool {
    state.phase.is_group_phase()
        && state.groups_completed > 0
        && state
            .current_groups
            .get(state.groups_completed - 1)
            .is_some_and(|g| same_members(g, group))
}

/// Rebuild the round the undone group belonged to, without a snapshot.
///
/// Groups are regenerated from the seed with the reverted ratings, so they
/// can differ from what was originally played. The undone group is placed
/// last and everything before it counts as completed.
fn reconstruct_group_round(state: &mut Tournament, group: &Group) {
    log::warn!("Undo without snapshot in {} phase; reconstructing the previous round", state.phase);
    let settings = state.settings.clone();
    match state.phase {
        Phase::Coverage if state.phase_round > 0 => {
            state.phase_round -= 1;
        }
        Phase::Coverage => {}
        Phase::Refinement => {
            let everyone: Vec<_> = state.candidates.keys().cloned().collect();
            state.phase = Phase::Coverage;
            state.phase_round = settings.coverage_rounds.saturating_sub(1);
            state.pool = everyone.clone();
            state.phase_pool = everyone;
        }
        Phase::Swiss | Phase::Finished => {
            let everyone: Vec<_> = state.candidates.keys().cloned().collect();
            let keep = settings.coverage_cut_size(everyone.len());
            let mut cut = top_by_rating(state, &everyone, keep);
            for name in group {
                if !cut.contains(name) {
                    cut.push(name.clone());
                }
            }
            state.phase = Phase::Refinement;
            state.phase_round = 0;
            state.pool = cut.clone();
            state.phase_pool = cut;
            state.matches_played.clear();
        }
    }

    let rebuilt = groups_for_round(state, state.phase, state.phase_round);
    let others: Vec<Group> = rebuilt
        .into_iter()
        .map(|g| g.into_iter().filter(|n| !group.contains(n)).collect::<Group>())
        .filter(|g| !g.is_empty())
        .collect();
    let mut groups = merge_singletons(others);
    groups.push(group.clone());
    state.groups_total = groups.len();
    state.groups_completed = groups.len() - 1;
    state.current_groups = groups;
}
