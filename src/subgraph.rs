//! Core-community extraction and ranking

use serde::Serialize;

use crate::centrality::CentralityScores;
use crate::cluster::CommunityPartition;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::CompressedGraph;

/// One selected member of the core community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMember {
    /// Index of the node in the full graph
    pub node: u32,

    pub id: String,

    /// Score under the ranking measure
    pub score: f64,

    /// Zero-based rank within the community
    pub rank: usize,

    /// Whether the node is among the top-N shown with a label
    pub labeled: bool,
}

/// Induced subgraph over the top-ranked members of the largest community.
///
/// Node `i` of `graph` is `members[i]`; members are in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSubgraph {
    pub community: usize,

    /// Size of the whole community, before truncation to K
    pub community_size: usize,

    pub members: Vec<RankedMember>,

    pub graph: CompressedGraph,
}

impl RankedSubgraph {
    /// Members flagged for labeling
    pub fn labeled(&self) -> impl Iterator<Item = &RankedMember> {
        self.members.iter().filter(|member| member.labeled)
    }
}

/// Extract the induced subgraph over a node subset, in the given order.
///
/// Every original edge whose endpoints are both selected is kept with its
/// weight. Node `i` of the result is `nodes[i]`.
pub fn extract_subgraph(graph: &CompressedGraph, nodes: &[u32]) -> CompressedGraph {
    // Create mapping from original to subgraph indices
    let mut orig_to_sub = vec![u32::MAX; graph.node_count];
    for (sub_idx, &node) in nodes.iter().enumerate() {
        orig_to_sub[node as usize] = sub_idx as u32;
    }

    let mut edges = Vec::new();
    for (sub_src, &node) in nodes.iter().enumerate() {
        for (target, weight) in graph.outgoing_weighted(node as usize) {
            // Only include edges where both endpoints are in the subgraph
            let sub_dst = orig_to_sub[target as usize];
            if sub_dst != u32::MAX {
                edges.push((sub_src as u32, sub_dst, weight));
            }
        }
    }

    let node_ids = nodes
        .iter()
        .map(|&node| graph.node_ids[node as usize].clone())
        .collect();

    CompressedGraph::from_weighted_edges(node_ids, edges)
}

/// Rank the largest community by `scores` and extract its top `top_k` members.
///
/// Ties in score go to the lower node index. The first `label_count` members
/// are flagged `labeled`.
pub fn rank_core_community(
    graph: &CompressedGraph,
    partition: &CommunityPartition,
    scores: &CentralityScores,
    top_k: usize,
    label_count: usize,
) -> AnalysisResult<RankedSubgraph> {
    if graph.node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "core community extraction",
        });
    }
    if top_k == 0 || label_count > top_k {
        return Err(AnalysisError::InvalidConfig(format!(
            "need 0 < top_k and label_count <= top_k, got top_k={} label_count={}",
            top_k, label_count
        )));
    }
    if partition.assignments.len() != graph.node_count || scores.len() != graph.node_count {
        return Err(AnalysisError::InvalidConfig(format!(
            "partition ({}) and scores ({}) must cover all {} nodes",
            partition.assignments.len(),
            scores.len(),
            graph.node_count
        )));
    }

    let (community, community_size) = partition.largest_community().ok_or(
        AnalysisError::EmptyGraph {
            operation: "core community extraction",
        },
    )?;

    let mut ranked = partition.members(community);
    ranked.sort_by(|&a, &b| {
        scores
            .get(b as usize)
            .total_cmp(&scores.get(a as usize))
            .then(a.cmp(&b))
    });
    ranked.truncate(top_k);

    log::info!(
        "Selected {} of {} members of community {}",
        ranked.len(),
        community_size,
        community
    );

    let members = ranked
        .iter()
        .enumerate()
        .map(|(rank, &node)| RankedMember {
            node,
            id: graph.node_ids[node as usize].clone(),
            score: scores.get(node as usize),
            rank,
            labeled: rank < label_count,
        })
        .collect();

    Ok(RankedSubgraph {
        community,
        community_size,
        members,
        graph: extract_subgraph(graph, &ranked),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, RawRecord};

    fn sample() -> CompressedGraph {
        let records = vec![
            RawRecord::new("a", "b"),
            RawRecord::new("b", "c"),
            RawRecord::new("c", "a"),
            RawRecord::new("c", "a"),
            RawRecord::new("d", "e"),
        ];
        build_graph(&records).unwrap()
    }

    #[test]
    fn induced_subgraph_keeps_inner_edges_only() {
        let graph = sample();
        let sub = extract_subgraph(&graph, &[2, 0]);
        assert_eq!(sub.node_ids, vec!["c", "a"]);
        assert_eq!(sub.edge_count(), 1);
        assert_eq!(sub.edge_weight(0, 1), Some(2));
    }

    #[test]
    fn ranking_uses_scores_then_index() {
        let graph = sample();
        let partition = CommunityPartition::from_labels(&[0, 0, 0, 1, 1]);
        let scores = CentralityScores::new(vec![0.2, 0.5, 0.2, 0.9, 0.0]);

        let ranked = rank_core_community(&graph, &partition, &scores, 2, 1).unwrap();
        assert_eq!(ranked.community, 0);
        assert_eq!(ranked.community_size, 3);
        let ids: Vec<&str> = ranked.members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(ranked.labeled().count(), 1);
        assert!(ranked.members[0].labeled);
        // a -> b is the only edge between the two selected nodes
        assert_eq!(ranked.graph.edge_weight(1, 0), Some(1));
        assert_eq!(ranked.graph.edge_count(), 1);
    }

    #[test]
    fn label_count_above_top_k_is_rejected() {
        let graph = sample();
        let partition = CommunityPartition::singletons(5);
        let scores = CentralityScores::new(vec![0.0; 5]);
        assert!(matches!(
            rank_core_community(&graph, &partition, &scores, 2, 3),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_labels_is_allowed_but_zero_top_k_is_not() {
        let graph = sample();
        let partition = CommunityPartition::from_labels(&[0, 0, 0, 1, 1]);
        let scores = CentralityScores::new(vec![0.2, 0.5, 0.2, 0.9, 0.0]);

        let ranked = rank_core_community(&graph, &partition, &scores, 2, 0).unwrap();
        assert_eq!(ranked.members.len(), 2);
        assert_eq!(ranked.labeled().count(), 0);

        match rank_core_community(&graph, &partition, &scores, 0, 0) {
            Err(AnalysisError::InvalidConfig(message)) => {
                assert!(message.contains("0 < top_k and label_count <= top_k"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }
}
