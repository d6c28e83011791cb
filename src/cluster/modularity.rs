//! Modularity of a partition

use crate::cluster::CommunityPartition;
use crate::graph::UndirectedGraph;

/// Newman modularity of `partition` over an undirected graph:
///
/// ```text
/// Q = sum over communities c of [ in_c / 2m - (tot_c / 2m)^2 ]
/// ```
///
/// where `in_c` is the summed adjacency inside `c` (each edge counted from
/// both ends) and `tot_c` the summed weighted degree. A graph without edges
/// has modularity 0.
pub fn modularity(graph: &UndirectedGraph, partition: &CommunityPartition) -> f64 {
    let two_m = 2.0 * graph.total_weight();
    if two_m == 0.0 {
        return 0.0;
    }

    let mut internal = vec![0.0; partition.community_count];
    let mut total = vec![0.0; partition.community_count];

    for node in 0..graph.node_count {
        let community = partition.community_of(node);
        for (neighbor, weight) in graph.neighbors_weighted(node) {
            total[community] += weight;
            if partition.community_of(neighbor) == community {
                internal[community] += weight;
            }
        }
    }

    internal
        .iter()
        .zip(&total)
        .map(|(inside, tot)| inside / two_m - (tot / two_m).powi(2))
        .sum()
}
