//! Betweenness centrality via Brandes' algorithm.
//!
//! For each source `s` an unweighted BFS counts shortest paths (`sigma`) and
//! records predecessors; dependencies are then accumulated in reverse BFS
//! order. Total cost is O(|V| * |E|).
//!
//! Sources are split into chunks whose boundaries depend only on the node
//! count. Chunks run in parallel, each summing its own sources in order, and
//! the chunk partials are added in chunk order. The result is therefore the
//! same for any thread count.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::centrality::CentralityScores;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::CompressedGraph;

/// Upper bound on the number of partial accumulators kept alive at once
const MAX_CHUNKS: usize = 64;

/// Scratch buffers reused across the sources of one chunk
struct BrandesState {
    stack: Vec<u32>,
    predecessors: Vec<Vec<u32>>,
    sigma: Vec<f64>,
    dist: Vec<i64>,
    delta: Vec<f64>,
    queue: VecDeque<u32>,
}

impl BrandesState {
    fn new(node_count: usize) -> Self {
        Self {
            stack: Vec::with_capacity(node_count),
            predecessors: vec![Vec::new(); node_count],
            sigma: vec![0.0; node_count],
            dist: vec![-1; node_count],
            delta: vec![0.0; node_count],
            queue: VecDeque::with_capacity(node_count),
        }
    }

    /// Add the dependencies of every node on `source` into `acc`
    fn accumulate(&mut self, graph: &CompressedGraph, source: usize, acc: &mut [f64]) {
        // Reset only what the previous BFS touched
        for &v in &self.stack {
            let v = v as usize;
            self.predecessors[v].clear();
            self.sigma[v] = 0.0;
            self.dist[v] = -1;
            self.delta[v] = 0.0;
        }
        self.stack.clear();

        self.sigma[source] = 1.0;
        self.dist[source] = 0;
        self.queue.push_back(source as u32);

        while let Some(v) = self.queue.pop_front() {
            let vi = v as usize;
            self.stack.push(v);

            for &w in graph.outgoing_edges(vi) {
                let wi = w as usize;
                if wi == vi {
                    continue;
                }

                // First visit to w
                if self.dist[wi] < 0 {
                    self.dist[wi] = self.dist[vi] + 1;
                    self.queue.push_back(w);
                }

                // Shortest path to w via v
                if self.dist[wi] == self.dist[vi] + 1 {
                    self.sigma[wi] += self.sigma[vi];
                    self.predecessors[wi].push(v);
                }
            }
        }

        // Farthest nodes first
        for &w in self.stack.iter().rev() {
            let wi = w as usize;
            let coefficient = (1.0 + self.delta[wi]) / self.sigma[wi];
            for &v in &self.predecessors[wi] {
                let vi = v as usize;
                self.delta[vi] += self.sigma[vi] * coefficient;
            }
            if wi != source {
                acc[wi] += self.delta[wi];
            }
        }
    }
}

/// Normalized betweenness centrality of every node.
///
/// Path length ignores edge weight. Scores are divided by `(n-1)(n-2)`;
/// graphs with fewer than three nodes score 0 everywhere.
pub fn betweenness_centrality(graph: &CompressedGraph) -> AnalysisResult<CentralityScores> {
    let node_count = graph.node_count;
    if node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "betweenness centrality",
        });
    }

    log::info!("Calculating betweenness centrality for {} sources", node_count);

    if node_count < 3 {
        return Ok(CentralityScores::new(vec![0.0; node_count]));
    }

    let chunk_size = node_count.div_ceil(MAX_CHUNKS).max(1);
    let num_chunks = node_count.div_ceil(chunk_size);
    log::debug!("Processing {} sources in {} chunks", node_count, num_chunks);

    let partials: Vec<Vec<f64>> = (0..num_chunks)
        .into_par_iter()
        .map(|chunk_idx| {
            let start = chunk_idx * chunk_size;
            let end = std::cmp::min(start + chunk_size, node_count);

            let mut state = BrandesState::new(node_count);
            let mut acc = vec![0.0; node_count];
            for source in start..end {
                state.accumulate(graph, source, &mut acc);
            }
            acc
        })
        .collect();

    let mut totals = vec![0.0; node_count];
    for partial in &partials {
        for (total, value) in totals.iter_mut().zip(partial) {
            *total += value;
        }
    }

    let scale = 1.0 / ((node_count - 1) as f64 * (node_count - 2) as f64);
    let values = totals.into_iter().map(|value| value * scale).collect();

    Ok(CentralityScores::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, RawRecord};

    const EPS: f64 = 1e-12;

    fn graph_of(edges: &[(&str, &str)]) -> CompressedGraph {
        let records: Vec<RawRecord> = edges.iter().map(|(s, d)| RawRecord::new(*s, *d)).collect();
        build_graph(&records).unwrap()
    }

    #[test]
    fn middle_of_a_path_carries_every_pair() {
        // a -> b -> c: only the pair (a, c) routes through b
        let graph = graph_of(&[("a", "b"), ("b", "c")]);
        let scores = betweenness_centrality(&graph).unwrap();
        assert!((scores.get(1) - 0.5).abs() < EPS);
        assert_eq!(scores.get(0), 0.0);
        assert_eq!(scores.get(2), 0.0);
    }

    #[test]
    fn equal_length_paths_split_the_dependency() {
        // Two shortest a -> d paths, one via b and one via c
        let graph = graph_of(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        let scores = betweenness_centrality(&graph).unwrap();
        let expected = 0.5 / 6.0;
        assert!((scores.get(1) - expected).abs() < EPS);
        assert!((scores.get(2) - expected).abs() < EPS);
    }

    #[test]
    fn weights_and_self_loops_do_not_change_paths() {
        let plain = graph_of(&[("a", "b"), ("b", "c"), ("a", "c")]);
        let noisy = graph_of(&[
            ("a", "b"),
            ("a", "b"),
            ("b", "b"),
            ("b", "c"),
            ("a", "c"),
            ("c", "c"),
        ]);
        assert_eq!(
            betweenness_centrality(&plain).unwrap(),
            betweenness_centrality(&noisy).unwrap()
        );
    }

    #[test]
    fn two_nodes_score_zero() {
        let graph = graph_of(&[("a", "b"), ("b", "a")]);
        assert_eq!(betweenness_centrality(&graph).unwrap().values, vec![0.0, 0.0]);
    }

    #[test]
    fn chunked_sum_matches_across_runs() {
        let edges: Vec<(String, String)> = (0..200)
            .map(|i| (format!("n{}", i % 90), format!("n{}", (i * 13 + 5) % 90)))
            .collect();
        let records: Vec<RawRecord> = edges.iter().map(|(s, d)| RawRecord::new(s, d)).collect();
        let graph = build_graph(&records).unwrap();
        let first = betweenness_centrality(&graph).unwrap();
        let second = betweenness_centrality(&graph).unwrap();
        assert_eq!(first, second);
        assert!(first.values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
