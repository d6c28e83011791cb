//! Memory-efficient weighted directed graph representation

use std::mem;
use serde::{Serialize, Deserialize};

/// Compressed sparse representation of a weighted directed graph.
///
/// Both directions are stored so in and out adjacency can be walked
/// independently. Node `i` is `node_ids[i]`; ids are sorted, so index order
/// and id order agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: out_offsets[i] to out_offsets[i+1] is the edge range for node i
    pub out_offsets: Vec<u32>,

    /// Concatenated outgoing target lists, each sorted ascending
    pub out_targets: Vec<u32>,

    /// Weights parallel to `out_targets`
    pub out_weights: Vec<u32>,

    /// Offset array for the incoming adjacency
    pub in_offsets: Vec<u32>,

    /// Concatenated incoming source lists, each sorted ascending
    pub in_sources: Vec<u32>,

    /// Weights parallel to `in_sources`
    pub in_weights: Vec<u32>,

    /// Mapping from internal node indices to original string IDs
    pub node_ids: Vec<String>,
}

impl CompressedGraph {
    /// Create an empty graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count: 0,
            out_offsets: Vec::with_capacity(node_count + 1),
            out_targets: Vec::with_capacity(edge_count),
            out_weights: Vec::with_capacity(edge_count),
            in_offsets: Vec::with_capacity(node_count + 1),
            in_sources: Vec::with_capacity(edge_count),
            in_weights: Vec::with_capacity(edge_count),
            node_ids: Vec::with_capacity(node_count),
        }
    }

    /// Assemble a graph from sorted node ids and a list of distinct weighted edges.
    ///
    /// Edges may arrive in any order; both adjacency directions come out sorted.
    pub fn from_weighted_edges(node_ids: Vec<String>, mut edges: Vec<(u32, u32, u32)>) -> Self {
        let node_count = node_ids.len();
        let mut graph = Self::with_capacity(node_count, edges.len());
        graph.node_count = node_count;
        graph.node_ids = node_ids;

        edges.sort_unstable_by_key(|&(src, dst, _)| (src, dst));
        graph.out_offsets = offsets_from(node_count, edges.iter().map(|&(src, _, _)| src));
        for &(_, dst, weight) in &edges {
            graph.out_targets.push(dst);
            graph.out_weights.push(weight);
        }

        edges.sort_unstable_by_key(|&(src, dst, _)| (dst, src));
        graph.in_offsets = offsets_from(node_count, edges.iter().map(|&(_, dst, _)| dst));
        for &(src, _, weight) in &edges {
            graph.in_sources.push(src);
            graph.in_weights.push(weight);
        }

        graph
    }

    /// Number of distinct directed edges, self-loops included
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> u64 {
        self.out_weights.iter().map(|&w| w as u64).sum()
    }

    /// Get outgoing edge targets for a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.out_offsets[node] as usize;
        let end = self.out_offsets[node + 1] as usize;
        &self.out_targets[start..end]
    }

    /// Get outgoing edges for a node paired with their weights
    pub fn outgoing_weighted(&self, node: usize) -> impl Iterator<Item = (u32, u32)> + '_ {
        let start = self.out_offsets[node] as usize;
        let end = self.out_offsets[node + 1] as usize;
        self.out_targets[start..end]
            .iter()
            .copied()
            .zip(self.out_weights[start..end].iter().copied())
    }

    /// Get incoming edge sources for a node
    pub fn incoming_edges(&self, node: usize) -> &[u32] {
        let start = self.in_offsets[node] as usize;
        let end = self.in_offsets[node + 1] as usize;
        &self.in_sources[start..end]
    }

    /// Get incoming edges for a node paired with their weights
    pub fn incoming_weighted(&self, node: usize) -> impl Iterator<Item = (u32, u32)> + '_ {
        let start = self.in_offsets[node] as usize;
        let end = self.in_offsets[node + 1] as usize;
        self.in_sources[start..end]
            .iter()
            .copied()
            .zip(self.in_weights[start..end].iter().copied())
    }

    /// Weight of the edge from src to dst, if present
    pub fn edge_weight(&self, src: usize, dst: u32) -> Option<u32> {
        let start = self.out_offsets[src] as usize;
        let edges = self.outgoing_edges(src);
        edges
            .binary_search(&dst)
            .ok()
            .map(|pos| self.out_weights[start + pos])
    }

    /// Get in-degree of a node (distinct sources, self-loop included)
    pub fn in_degree(&self, node: usize) -> usize {
        (self.in_offsets[node + 1] - self.in_offsets[node]) as usize
    }

    /// Look up the index of a node by its string id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_ids
            .binary_search_by(|probe| probe.as_str().cmp(id))
            .ok()
    }

    /// Iterate all edges as (source, destination, weight)
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        (0..self.node_count).flat_map(move |src| {
            self.outgoing_weighted(src)
                .map(move |(dst, weight)| (src as u32, dst, weight))
        })
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = (self.out_offsets.capacity() + self.in_offsets.capacity())
            * mem::size_of::<u32>();
        let edges = (self.out_targets.capacity()
            + self.out_weights.capacity()
            + self.in_sources.capacity()
            + self.in_weights.capacity())
            * mem::size_of::<u32>();
        let ids = self.node_ids.iter().map(|s| s.capacity()).sum::<usize>();

        base + offsets + edges + ids
    }
}

/// Build a CSR offset array from the (sorted) owner index of every edge
fn offsets_from(node_count: usize, owners: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut counts = vec![0u32; node_count];
    for owner in owners {
        counts[owner as usize] += 1;
    }

    let mut offsets = Vec::with_capacity(node_count + 1);
    offsets.push(0);
    let mut current_offset = 0;
    for count in counts {
        current_offset += count;
        offsets.push(current_offset);
    }
    offsets
}
