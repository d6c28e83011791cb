//! Community statistics and metrics

use std::collections::HashSet;

use serde::Serialize;

use crate::cluster::CommunityPartition;
use crate::graph::CompressedGraph;

/// Size and density of one community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStats {
    pub id: usize,
    pub size: usize,

    /// Distinct directed edges between members / n(n-1)
    pub density: f64,
}

/// Calculate density (actual edges / potential edges).
///
/// Self-loops are not counted. Singletons have density 1 by convention.
pub fn calculate_density(graph: &CompressedGraph, members: &[u32]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 1.0;
    }

    // Potential edges = n * (n - 1) for directed graph
    let potential_edges = n * (n - 1);

    let member_set: HashSet<u32> = members.iter().copied().collect();
    let actual_edges = members
        .iter()
        .map(|&src| {
            graph
                .outgoing_edges(src as usize)
                .iter()
                .filter(|&&dst| dst != src && member_set.contains(&dst))
                .count()
        })
        .sum::<usize>();

    actual_edges as f64 / potential_edges as f64
}

/// Stats for every community, largest first (ties by id)
pub fn community_stats(graph: &CompressedGraph, partition: &CommunityPartition) -> Vec<CommunityStats> {
    let mut members: Vec<Vec<u32>> = vec![Vec::new(); partition.community_count];
    for (node, &community) in partition.assignments.iter().enumerate() {
        members[community].push(node as u32);
    }

    let mut stats: Vec<CommunityStats> = members
        .iter()
        .enumerate()
        .map(|(id, nodes)| CommunityStats {
            id,
            size: nodes.len(),
            density: calculate_density(graph, nodes),
        })
        .collect();

    stats.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));
    stats
}
