//! Swiss pairing for the finalist pool.
//!
//! The next pair is the first unplayed one found under three similarity
//! passes (tier + theme, tier only, anything), each tried with growing
//! score-difference tolerances.

use crate::models::{CandidateName, CandidateRecord, PairKey, RichnessTier, ThemeKey};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

/// Allowed `|score_a - score_b|`, tried in order. `None` means unbounded.
const SCORE_TOLERANCES: [Option<u64>; 6] = [Some(0), Some(1), Some(2), Some(3), Some(10), None];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Similarity {
    TierAndTheme,
    TierOnly,
    Any,
}

const PASSES: [Similarity; 3] = [Similarity::TierAndTheme, Similarity::TierOnly, Similarity::Any];

struct Entry<'a> {
    name: &'a CandidateName,
    richness: u32,
    tier: RichnessTier,
    theme: ThemeKey,
    score: i64,
    rating: i32,
}

impl Entry<'_> {
    fn similar(&self, other: &Self, pass: Similarity) -> bool {
        match pass {
            Similarity::TierAndTheme => self.tier == other.tier && self.theme == other.theme,
            Similarity::TierOnly => self.tier == other.tier,
            Similarity::Any => true,
        }
    }
}

fn ranked<'a>(
    pool: &'a [CandidateName],
    candidates: &BTreeMap<CandidateName, CandidateRecord>,
    tier_cap: u32,
) -> Vec<Entry<'a>> {
    let fallback = CandidateRecord::new(0);
    let mut entries: Vec<Entry<'a>> = pool
        .iter()
        .map(|name| {
            let record = candidates.get(name).unwrap_or(&fallback);
            Entry {
                name,
                richness: record.enrichment.richness,
                tier: record.tier(tier_cap),
                theme: record.theme_key(),
                score: record.score(),
                rating: record.rating,
            }
        })
        .collect();
    entries.sort_by_key(|e| (Reverse(e.richness), Reverse(e.score), Reverse(e.rating)));
    entries
}

/// First unplayed pair under the relaxing passes, or `None` when every pair has been played.
pub fn next_pair(
    pool: &[CandidateName],
    matches_played: &BTreeSet<PairKey>,
    candidates: &BTreeMap<CandidateName, CandidateRecord>,
    tier_cap: u32,
) -> Option<(CandidateName, CandidateName)> {
    if pool.len() < 2 {
        return None;
    }
    let entries = ranked(pool, candidates, tier_cap);
    for pass in PASSES {
        for tolerance in SCORE_TOLERANCES {
            for (i, a) in entries.iter().enumerate() {
                for b in &entries[i + 1..] {
                    let diff = a.score.abs_diff(b.score);
                    if tolerance.is_some_and(|t| diff > t) || !a.similar(b, pass) {
                        continue;
                    }
                    if a.name == b.name || matches_played.contains(&PairKey::new(a.name, b.name)) {
                        continue;
                    }
                    log::debug!(
                        "swiss pair {} vs {} ({:?}, tolerance {:?})",
                        a.name,
                        b.name,
                        pass,
                        tolerance
                    );
                    return Some((a.name.clone(), b.name.clone()));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Enrichment;

    fn rec(rating: i32, wins: u32, losses: u32, e: Enrichment) -> CandidateRecord {
        CandidateRecord {
            rating,
            wins,
            losses,
            enrichment: e,
        }
    }

    fn pool(list: &[&str]) -> Vec<CandidateName> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pairs_top_two_by_score() {
        let recs: BTreeMap<_, _> = [
            ("a", rec(1000, 0, 1, Enrichment::default())),
            ("b", rec(1000, 1, 0, Enrichment::default())),
            ("c", rec(1010, 1, 0, Enrichment::default())),
            ("d", rec(990, 0, 1, Enrichment::default())),
        ]
        .into_iter()
        .map(|(n, r)| (n.to_string(), r))
        .collect();
        let pair = next_pair(&pool(&["a", "b", "c", "d"]), &BTreeSet::new(), &recs, 3);
        assert_eq!(pair, Some(("c".to_string(), "b".to_string())));
    }

    #[test]
    fn skips_rematches() {
        let recs: BTreeMap<_, _> = ["a", "b", "c"]
            .iter()
            .map(|n| (n.to_string(), rec(1000, 0, 0, Enrichment::default())))
            .collect();
        let played: BTreeSet<_> = [PairKey::new("a", "b")].into_iter().collect();
        let pair = next_pair(&pool(&["a", "b", "c"]), &played, &recs, 3);
        assert_eq!(pair, Some(("a".to_string(), "c".to_string())));
    }

    #[test]
    fn prefers_same_theme_over_closer_score() {
        let dragon = Enrichment::new(1, Some("LIGHT"), Some("Dragon"));
        let fiend = Enrichment::new(1, Some("DARK"), Some("Fiend"));
        let recs: BTreeMap<_, _> = [
            ("d1", rec(1000, 2, 0, dragon.clone())),
            ("f1", rec(1000, 2, 0, fiend)),
            ("d2", rec(1000, 0, 0, dragon)),
        ]
        .into_iter()
        .map(|(n, r)| (n.to_string(), r))
        .collect();
        let pair = next_pair(&pool(&["d1", "f1", "d2"]), &BTreeSet::new(), &recs, 3);
        assert_eq!(pair, Some(("d1".to_string(), "d2".to_string())));
    }

    #[test]
    fn same_tier_wins_over_same_theme_in_another_tier() {
        let light = Enrichment::new(1, Some("LIGHT"), Some("Dragon"));
        let dark = Enrichment::new(1, Some("DARK"), Some("Fiend"));
        let rich_light = Enrichment::new(2, Some("LIGHT"), Some("Dragon"));
        let recs: BTreeMap<_, _> = [
            ("a", rec(1000, 0, 0, light)),
            ("b", rec(1000, 0, 0, dark)),
            ("c", rec(1000, 0, 0, rich_light)),
        ]
        .into_iter()
        .map(|(n, r)| (n.to_string(), r))
        .collect();
        let pair = next_pair(&pool(&["a", "b", "c"]), &BTreeSet::new(), &recs, 3);
        assert_eq!(pair, Some(("a".to_string(), "b".to_string())));
    }

    #[test]
    fn exhausted_pool_has_no_pair() {
        let recs: BTreeMap<_, _> = ["a", "b"]
            .iter()
            .map(|n| (n.to_string(), rec(1000, 0, 0, Enrichment::default())))
            .collect();
        let played: BTreeSet<_> = [PairKey::new("b", "a")].into_iter().collect();
        assert_eq!(next_pair(&pool(&["a", "b"]), &played, &recs, 3), None);
        assert_eq!(next_pair(&pool(&["a"]), &BTreeSet::new(), &recs, 3), None);
    }
}
