//! Group building for the coverage and refinement phases.
//!
//! Both builders share one pipeline: split the pool into richness tiers
//! (richest first), cluster each tier by theme key, order the clusters,
//! chunk into fixed-size groups, and fold any singleton into a neighbour.

use crate::logic::rng::{derive_seed, shuffle, shuffle_in_place, SeedIndex, SeedPurpose};
use crate::models::{CandidateName, CandidateRecord, Enrichment, Group, RichnessTier, ThemeKey};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Inputs that, together with pool and ratings, fully determine a round's groups.
#[derive(Clone, Copy, Debug)]
pub struct GroupingParams {
    pub seed: u64,
    /// Round index used to derive per-round seeds.
    pub round: u32,
    pub group_size: usize,
    pub tier_cap: u32,
}

struct Member<'a> {
    name: &'a CandidateName,
    rating: i32,
    tier: RichnessTier,
    theme: ThemeKey,
}

fn members<'a>(
    pool: &'a [CandidateName],
    candidates: &BTreeMap<CandidateName, CandidateRecord>,
    tier_cap: u32,
) -> Vec<Member<'a>> {
    let fallback = Enrichment::default();
    pool.iter()
        .map(|name| {
            let record = candidates.get(name);
            let enrichment = record.map(|r| &r.enrichment).unwrap_or(&fallback);
            Member {
                name,
                rating: record.map(|r| r.rating).unwrap_or_default(),
                tier: RichnessTier::of(enrichment.richness, tier_cap),
                theme: enrichment.theme_key(),
            }
        })
        .collect()
}

/// Tiers richest first, each split into theme clusters. Pool order is kept inside a cluster.
fn tiered_clusters(members: Vec<Member<'_>>) -> Vec<(RichnessTier, Vec<Vec<Member<'_>>>)> {
    let mut tiers: BTreeMap<Reverse<RichnessTier>, BTreeMap<ThemeKey, Vec<Member<'_>>>> =
        BTreeMap::new();
    for m in members {
        tiers
            .entry(Reverse(m.tier))
            .or_default()
            .entry(m.theme.clone())
            .or_default()
            .push(m);
    }
    tiers
        .into_iter()
        .map(|(Reverse(tier), clusters)| (tier, clusters.into_values().collect()))
        .collect()
}

fn chunk(names: Vec<CandidateName>, group_size: usize) -> Vec<Group> {
    names
        .chunks(group_size.max(2))
        .map(<[CandidateName]>::to_vec)
        .collect()
}

/// Merge a trailing one-member group backward into the group before it.
fn merge_tail_singleton(groups: &mut Vec<Group>) {
    if groups.len() >= 2 && groups.last().is_some_and(|g| g.len() == 1) {
        if let Some(single) = groups.pop() {
            if let Some(prev) = groups.last_mut() {
                prev.extend(single);
            }
        }
    }
}

/// Fold every remaining singleton into its neighbour across tier boundaries.
pub(crate) fn merge_singletons(groups: Vec<Group>) -> Vec<Group> {
    let mut out: Vec<Group> = Vec::with_capacity(groups.len());
    for group in groups {
        if group.len() == 1 {
            if let Some(prev) = out.last_mut() {
                prev.extend(group);
                continue;
            }
        }
        out.push(group);
    }
    if out.len() >= 2 && out[0].len() == 1 {
        let single = out.remove(0);
        let mut first = single;
        first.append(&mut out[0]);
        out[0] = first;
    }
    out
}

fn shuffled_cluster_order<T>(clusters: Vec<T>, seed: u64) -> Vec<(u32, T)> {
    let mut indexed: Vec<(u32, T)> = clusters
        .into_iter()
        .enumerate()
        .map(|(i, c)| (i as u32, c))
        .collect();
    shuffle_in_place(&mut indexed, seed);
    indexed
}

/// Groups for the first coverage round: related candidates together, order seeded.
pub fn build_coverage_groups(
    pool: &[CandidateName],
    candidates: &BTreeMap<CandidateName, CandidateRecord>,
    params: GroupingParams,
) -> Vec<Group> {
    let mut groups = Vec::new();
    for (tier, clusters) in tiered_clusters(members(pool, candidates, params.tier_cap)) {
        let order_seed = derive_seed(
            params.seed,
            SeedPurpose::CoverageClusterOrder,
            SeedIndex::new(params.round, tier.0, 0),
        );
        let mut ordered: Vec<CandidateName> = Vec::new();
        for (idx, cluster) in shuffled_cluster_order(clusters, order_seed) {
            let names: Vec<CandidateName> = cluster.iter().map(|m| m.name.clone()).collect();
            let member_seed = derive_seed(
                params.seed,
                SeedPurpose::CoverageClusterMembers,
                SeedIndex::new(params.round, tier.0, idx),
            );
            ordered.extend(shuffle(&names, member_seed));
        }
        let mut tier_groups = chunk(ordered, params.group_size);
        merge_tail_singleton(&mut tier_groups);
        log::debug!(
            "coverage tier {}: {} group(s) from {} candidate(s)",
            tier.0,
            tier_groups.len(),
            tier_groups.iter().map(Vec::len).sum::<usize>()
        );
        groups.extend(tier_groups);
    }
    merge_singletons(groups)
}

/// Groups of similarly rated, thematically related candidates.
///
/// Clusters are sorted by rating (highest first) before chunking; only the
/// display order inside each finished group is shuffled.
pub fn build_elo_proximity_groups(
    pool: &[CandidateName],
    candidates: &BTreeMap<CandidateName, CandidateRecord>,
    params: GroupingParams,
) -> Vec<Group> {
    let mut groups = Vec::new();
    for (tier, clusters) in tiered_clusters(members(pool, candidates, params.tier_cap)) {
        let order_seed = derive_seed(
            params.seed,
            SeedPurpose::ProximityClusterOrder,
            SeedIndex::new(params.round, tier.0, 0),
        );
        let mut ordered: Vec<CandidateName> = Vec::new();
        for (_, mut cluster) in shuffled_cluster_order(clusters, order_seed) {
            cluster.sort_by_key(|m| Reverse(m.rating));
            ordered.extend(cluster.iter().map(|m| m.name.clone()));
        }
        let mut tier_groups = chunk(ordered, params.group_size);
        merge_tail_singleton(&mut tier_groups);
        for (idx, group) in tier_groups.iter_mut().enumerate() {
            let display_seed = derive_seed(
                params.seed,
                SeedPurpose::ProximityGroupOrder,
                SeedIndex::new(params.round, tier.0, idx as u32),
            );
            shuffle_in_place(group, display_seed);
        }
        groups.extend(tier_groups);
    }
    merge_singletons(groups)
}
