//! Weakly connected components

use crate::graph::CompressedGraph;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Path compression: point every node on the way at the root
        let mut current = x;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        if self.size[root_x as usize] >= self.size[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.size[root_x as usize] += self.size[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.size[root_y as usize] += self.size[root_x as usize];
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.size[root as usize]
    }
}

/// Summary of the weakly connected components of a directed graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSummary {
    /// Number of components, isolated nodes included
    pub count: usize,

    /// Node count of the largest component
    pub largest: usize,
}

/// Count weakly connected components, ignoring edge direction
pub fn weakly_connected_components(graph: &CompressedGraph) -> ComponentSummary {
    log::info!("Finding weakly connected components");

    let mut sets = DisjointSets::new(graph.node_count);
    for (src, dst, _) in graph.edges() {
        sets.union(src, dst);
    }

    let mut count = 0;
    let mut largest = 0;
    for node in 0..graph.node_count as u32 {
        if sets.find(node) == node {
            count += 1;
            largest = largest.max(sets.size(node) as usize);
        }
    }

    log::info!("Found {} weakly connected components (largest has {} nodes)", count, largest);
    ComponentSummary { count, largest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, RawRecord};

    #[test]
    fn direction_is_ignored() {
        let records = vec![
            RawRecord::new("a", "b"),
            RawRecord::new("c", "b"),
            RawRecord::new("d", "e"),
            RawRecord::new("f", "f"),
        ];
        let graph = build_graph(&records).unwrap();
        assert_eq!(
            weakly_connected_components(&graph),
            ComponentSummary { count: 3, largest: 3 }
        );
    }

    #[test]
    fn union_tracks_sizes() {
        let mut sets = DisjointSets::new(4);
        sets.union(0, 1);
        sets.union(2, 1);
        assert_eq!(sets.size(2), 3);
        assert_eq!(sets.size(3), 1);
        assert_eq!(sets.find(0), sets.find(2));
    }
}
