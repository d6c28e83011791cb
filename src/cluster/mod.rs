//! Community detection module

pub mod components;
pub mod louvain;
pub mod metrics;
pub mod modularity;

use serde::{Serialize, Deserialize};

pub use louvain::{detect_communities, LouvainOutcome};
pub use modularity::modularity;

/// Assignment of every node to exactly one community.
///
/// Community ids are dense (`0..community_count`) and numbered in order of
/// each community's lowest member index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPartition {
    /// Community id per node index
    pub assignments: Vec<usize>,

    /// Number of distinct communities
    pub community_count: usize,
}

impl CommunityPartition {
    /// Build a partition from arbitrary labels, renumbering them densely
    /// by first appearance in node order
    pub fn from_labels(labels: &[usize]) -> Self {
        let mut remap: Vec<Option<usize>> = vec![None; labels.iter().max().map_or(0, |m| m + 1)];
        let mut community_count = 0;
        let assignments = labels
            .iter()
            .map(|&label| {
                *remap[label].get_or_insert_with(|| {
                    community_count += 1;
                    community_count - 1
                })
            })
            .collect();

        Self {
            assignments,
            community_count,
        }
    }

    /// Every node in its own community
    pub fn singletons(node_count: usize) -> Self {
        Self {
            assignments: (0..node_count).collect(),
            community_count: node_count,
        }
    }

    /// Community of a node
    pub fn community_of(&self, node: usize) -> usize {
        self.assignments[node]
    }

    /// Number of nodes in each community
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.community_count];
        for &community in &self.assignments {
            sizes[community] += 1;
        }
        sizes
    }

    /// Member node indices of one community, ascending
    pub fn members(&self, community: usize) -> Vec<u32> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == community)
            .map(|(node, _)| node as u32)
            .collect()
    }

    /// Largest community by node count, ties to the lowest id
    pub fn largest_community(&self) -> Option<(usize, usize)> {
        self.sizes()
            .into_iter()
            .enumerate()
            .fold(None, |best, (community, size)| match best {
                Some((_, best_size)) if best_size >= size => best,
                _ => Some((community, size)),
            })
    }
}
