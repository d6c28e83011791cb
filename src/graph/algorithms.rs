//! Graph transformations shared by the analysis stages

use crate::graph::CompressedGraph;

/// Symmetric weighted graph in compressed sparse form.
///
/// Every undirected edge `{u, v}` is listed from both endpoints. Self-loops
/// are never present.
#[derive(Debug, Clone, PartialEq)]
pub struct UndirectedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// offsets[i] to offsets[i+1] is the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Concatenated neighbor lists, each sorted ascending
    pub neighbors: Vec<u32>,

    /// Weights parallel to `neighbors`
    pub weights: Vec<f64>,
}

impl UndirectedGraph {
    /// Neighbors of a node paired with edge weights
    pub fn neighbors_weighted(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        self.neighbors[start..end]
            .iter()
            .map(|&n| n as usize)
            .zip(self.weights[start..end].iter().copied())
    }

    /// Weighted degree of a node
    pub fn degree(&self, node: usize) -> f64 {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        self.weights[start..end].iter().sum()
    }

    /// Total edge weight `m` (each undirected edge counted once)
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum::<f64>() / 2.0
    }
}

/// Project a directed graph to undirected form.
///
/// The weight of `{u, v}` is `w(u -> v) + w(v -> u)`; self-loops are dropped.
pub fn to_undirected(graph: &CompressedGraph) -> UndirectedGraph {
    log::info!("Projecting graph with {} nodes to undirected form", graph.node_count);

    let node_count = graph.node_count;
    let mut offsets = Vec::with_capacity(node_count + 1);
    offsets.push(0);
    let mut neighbors = Vec::with_capacity(graph.edge_count() * 2);
    let mut weights = Vec::with_capacity(graph.edge_count() * 2);

    for node in 0..node_count {
        // Both lists are sorted, so a merge-join combines reciprocal edges
        let mut outgoing = graph.outgoing_weighted(node).peekable();
        let mut incoming = graph.incoming_weighted(node).peekable();

        loop {
            let (neighbor, weight) = match (outgoing.peek(), incoming.peek()) {
                (Some(&(out_n, out_w)), Some(&(in_n, in_w))) => {
                    if out_n == in_n {
                        outgoing.next();
                        incoming.next();
                        (out_n, out_w as f64 + in_w as f64)
                    } else if out_n < in_n {
                        outgoing.next();
                        (out_n, out_w as f64)
                    } else {
                        incoming.next();
                        (in_n, in_w as f64)
                    }
                }
                (Some(&(n, w)), None) => {
                    outgoing.next();
                    (n, w as f64)
                }
                (None, Some(&(n, w))) => {
                    incoming.next();
                    (n, w as f64)
                }
                (None, None) => break,
            };

            // Skip self-loops
            if neighbor as usize == node {
                continue;
            }
            neighbors.push(neighbor);
            weights.push(weight);
        }

        offsets.push(neighbors.len() as u32);
    }

    let undirected = UndirectedGraph {
        node_count,
        offsets,
        neighbors,
        weights,
    };
    log::debug!(
        "Undirected projection has {} edges and total weight {}",
        undirected.neighbors.len() / 2,
        undirected.total_weight()
    );
    undirected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{build_graph, RawRecord};

    #[test]
    fn reciprocal_edges_sum_their_weights() {
        let records = vec![
            RawRecord::new("a", "b"),
            RawRecord::new("a", "b"),
            RawRecord::new("b", "a"),
            RawRecord::new("b", "c"),
            RawRecord::new("c", "c"),
        ];
        let graph = build_graph(&records).unwrap();
        let undirected = to_undirected(&graph);

        let a: Vec<_> = undirected.neighbors_weighted(0).collect();
        assert_eq!(a, vec![(1, 3.0)]);
        let b: Vec<_> = undirected.neighbors_weighted(1).collect();
        assert_eq!(b, vec![(0, 3.0), (2, 1.0)]);
        let c: Vec<_> = undirected.neighbors_weighted(2).collect();
        assert_eq!(c, vec![(1, 1.0)]);
        assert_eq!(undirected.total_weight(), 4.0);
        assert_eq!(undirected.degree(1), 4.0);
    }
}
