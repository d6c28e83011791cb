//! Louvain community detection.
//!
//! Alternates two phases until a level makes no moves:
//!
//! 1. **Local moving**: nodes are visited in ascending index order and each is
//!    moved to the neighboring community with the largest modularity gain.
//!    Staying put wins ties, and among other candidates the lowest community
//!    id wins. Sweeps repeat until one makes no moves.
//! 2. **Aggregation**: every community becomes a super-node. Edges between
//!    communities are summed and internal weight becomes a self-loop on the
//!    super-node.
//!
//! Nothing here iterates a hash map, so the same graph always yields the same
//! partition.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cluster::{modularity, CommunityPartition};
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::{to_undirected, CompressedGraph, UndirectedGraph};

/// A candidate must beat staying by more than this to trigger a move
const MIN_GAIN: f64 = 1e-12;

/// What happened at one level of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelTrace {
    /// Nodes (or super-nodes) at this level
    pub node_count: usize,

    /// Modularity before the first sweep, then after each sweep
    pub sweep_modularity: Vec<f64>,

    /// Total node moves across all sweeps
    pub moves: usize,
}

/// Result of a Louvain run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LouvainOutcome {
    pub partition: CommunityPartition,

    /// Modularity of the final partition on the undirected projection
    pub modularity: f64,

    /// Number of aggregation passes performed
    pub passes: usize,

    pub levels: Vec<LevelTrace>,

    /// False when the pass cap stopped the run early
    pub converged: bool,
}

/// Weighted graph at one level of the hierarchy
struct LevelGraph {
    /// Neighbor lists sorted by neighbor, self excluded
    adjacency: Vec<Vec<(usize, f64)>>,

    /// Internal weight A_ii of each (super-)node, each inner edge counted twice
    self_loops: Vec<f64>,

    /// Weighted degree including the self-loop weight
    degrees: Vec<f64>,

    /// Twice the total edge weight; constant across levels
    two_m: f64,
}

impl LevelGraph {
    fn from_undirected(graph: &UndirectedGraph) -> Self {
        let adjacency: Vec<Vec<(usize, f64)>> = (0..graph.node_count)
            .map(|node| graph.neighbors_weighted(node).collect())
            .collect();
        let degrees: Vec<f64> = (0..graph.node_count).map(|node| graph.degree(node)).collect();
        let two_m = degrees.iter().sum();

        Self {
            adjacency,
            self_loops: vec![0.0; graph.node_count],
            degrees,
            two_m,
        }
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Contract each community into a single super-node
    fn aggregate(&self, partition: &CommunityPartition) -> Self {
        let count = partition.community_count;
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut self_loops = vec![0.0; count];
        let mut degrees = vec![0.0; count];

        for (node, neighbors) in self.adjacency.iter().enumerate() {
            let community = partition.community_of(node);
            self_loops[community] += self.self_loops[node];
            degrees[community] += self.degrees[node];

            for &(neighbor, weight) in neighbors {
                let other = partition.community_of(neighbor);
                if other == community {
                    self_loops[community] += weight;
                } else {
                    *links[community].entry(other).or_insert(0.0) += weight;
                }
            }
        }

        Self {
            adjacency: links.into_iter().map(|m| m.into_iter().collect()).collect(),
            self_loops,
            degrees,
            two_m: self.two_m,
        }
    }
}

/// Running community totals during local moving
struct MovingState {
    community: Vec<usize>,

    /// Summed adjacency inside each community
    internal: Vec<f64>,

    /// Summed degree of each community
    total: Vec<f64>,
}

impl MovingState {
    fn singletons(graph: &LevelGraph) -> Self {
        Self {
            community: (0..graph.node_count()).collect(),
            internal: graph.self_loops.clone(),
            total: graph.degrees.clone(),
        }
    }

    fn modularity(&self, two_m: f64) -> f64 {
        self.internal
            .iter()
            .zip(&self.total)
            .map(|(inside, tot)| inside / two_m - (tot / two_m).powi(2))
            .sum()
    }
}

/// Pick the community a node joins.
///
/// `candidates` must be sorted ascending. The highest gain wins; staying wins
/// ties, and among other candidates the lowest id wins.
fn best_community(current: usize, candidates: &[usize], gain: impl Fn(usize) -> f64) -> usize {
    let mut best = current;
    let mut best_gain = gain(current);
    for &candidate in candidates {
        if candidate == current {
            continue;
        }
        let candidate_gain = gain(candidate);
        if candidate_gain > best_gain + MIN_GAIN {
            best = candidate;
            best_gain = candidate_gain;
        }
    }
    best
}

/// Run local moving to a local optimum.
///
/// Returns the densely renumbered partition of this level and its trace.
fn local_moving(graph: &LevelGraph) -> (CommunityPartition, LevelTrace) {
    let node_count = graph.node_count();
    let two_m = graph.two_m;
    let mut state = MovingState::singletons(graph);

    // Weight from the current node into each touched community
    let mut links = vec![0.0; node_count];
    let mut is_touched = vec![false; node_count];
    let mut touched: Vec<usize> = Vec::new();

    let mut trace = LevelTrace {
        node_count,
        sweep_modularity: vec![state.modularity(two_m)],
        moves: 0,
    };

    loop {
        let mut sweep_moves = 0;

        for node in 0..node_count {
            let current = state.community[node];
            let degree = graph.degrees[node];

            touched.push(current);
            is_touched[current] = true;
            for &(neighbor, weight) in &graph.adjacency[node] {
                let community = state.community[neighbor];
                if !is_touched[community] {
                    is_touched[community] = true;
                    touched.push(community);
                }
                links[community] += weight;
            }
            touched.sort_unstable();

            // Take the node out of its community
            state.total[current] -= degree;
            state.internal[current] -= 2.0 * links[current] + graph.self_loops[node];

            let best = best_community(current, &touched, |community| {
                links[community] - state.total[community] * degree / two_m
            });

            state.total[best] += degree;
            state.internal[best] += 2.0 * links[best] + graph.self_loops[node];
            state.community[node] = best;
            if best != current {
                sweep_moves += 1;
            }

            for &community in &touched {
                links[community] = 0.0;
                is_touched[community] = false;
            }
            touched.clear();
        }

        trace.sweep_modularity.push(state.modularity(two_m));
        trace.moves += sweep_moves;
        log::debug!(
            "Louvain sweep on {} nodes: {} moves, modularity {:.6}",
            node_count,
            sweep_moves,
            trace.sweep_modularity.last().copied().unwrap_or_default()
        );

        if sweep_moves == 0 {
            break;
        }
    }

    (CommunityPartition::from_labels(&state.community), trace)
}

/// Run Louvain on an undirected graph.
///
/// Stops when a level makes no moves or after `max_passes` aggregation
/// passes. A capped run reports `converged = false` only when the last
/// aggregated level still had moves to make.
pub fn louvain(graph: &UndirectedGraph, max_passes: usize) -> LouvainOutcome {
    let node_count = graph.node_count;

    if graph.total_weight() == 0.0 {
        log::info!("Graph has no edges; every node is its own community");
        return LouvainOutcome {
            partition: CommunityPartition::singletons(node_count),
            modularity: 0.0,
            passes: 0,
            levels: Vec::new(),
            converged: true,
        };
    }

    let mut level = LevelGraph::from_undirected(graph);
    let mut membership: Vec<usize> = (0..node_count).collect();
    let mut levels = Vec::new();
    let mut passes = 0;
    let mut converged = false;

    loop {
        let (level_partition, trace) = local_moving(&level);
        let moves = trace.moves;
        levels.push(trace);

        if moves == 0 {
            converged = true;
            break;
        }

        for member in membership.iter_mut() {
            *member = level_partition.community_of(*member);
        }
        level = level.aggregate(&level_partition);
        passes += 1;
        log::debug!("Louvain pass {} produced {} super-nodes", passes, level.node_count());

        if passes >= max_passes {
            // The cap only cuts the run short if the coarse level could still move
            let (_, trace) = local_moving(&level);
            if trace.moves == 0 {
                levels.push(trace);
                converged = true;
            } else {
                log::warn!("Louvain stopped at the pass cap ({}) before converging", max_passes);
            }
            break;
        }
    }

    let partition = CommunityPartition::from_labels(&membership);
    let modularity = modularity(graph, &partition);

    LouvainOutcome {
        partition,
        modularity,
        passes,
        levels,
        converged,
    }
}

/// Detect communities in the undirected projection of a directed graph
pub fn detect_communities(
    graph: &CompressedGraph,
    max_passes: usize,
) -> AnalysisResult<LouvainOutcome> {
    if graph.node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "community detection",
        });
    }

    log::info!("Running Louvain community detection");
    let undirected = to_undirected(graph);
    let outcome = louvain(&undirected, max_passes);

    log::info!(
        "Found {} communities (modularity {:.4}, {} passes)",
        outcome.partition.community_count,
        outcome.modularity,
        outcome.passes
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, RawRecord};

    fn graph_of(edges: &[(&str, &str)]) -> CompressedGraph {
        let records: Vec<RawRecord> = edges.iter().map(|(s, d)| RawRecord::new(*s, *d)).collect();
        build_graph(&records).unwrap()
    }

    #[test]
    fn triangle_collapses_into_one_community() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let outcome = detect_communities(&graph, 100).unwrap();
        assert_eq!(outcome.partition.assignments, vec![0, 0, 0]);
        assert!(outcome.modularity.abs() < 1e-12);
        assert!(outcome.converged);
    }

    #[test]
    fn bridged_cliques_split_at_the_bridge() {
        let mut edges = Vec::new();
        for group in [["a1", "a2", "a3", "a4"], ["b1", "b2", "b3", "b4"]] {
            for (i, src) in group.iter().enumerate() {
                for dst in &group[i + 1..] {
                    edges.push((*src, *dst));
                }
            }
        }
        edges.push(("a1", "b1"));
        let graph = graph_of(&edges);
        let outcome = detect_communities(&graph, 100).unwrap();

        let p = &outcome.partition;
        assert_eq!(p.community_count, 2);
        let a = graph.index_of("a1").unwrap();
        let b = graph.index_of("b1").unwrap();
        assert_ne!(p.community_of(a), p.community_of(b));
        for id in ["a2", "a3", "a4"] {
            assert_eq!(p.community_of(graph.index_of(id).unwrap()), p.community_of(a));
        }
        assert!(outcome.modularity > 0.3);
    }

    #[test]
    fn edgeless_graph_is_all_singletons() {
        let graph = graph_of(&[("a", "a"), ("b", "b")]);
        let outcome = detect_communities(&graph, 100).unwrap();
        assert_eq!(outcome.partition, CommunityPartition::singletons(2));
        assert_eq!(outcome.passes, 0);
    }

    #[test]
    fn pass_cap_returns_partial_result() {
        let edges: Vec<(String, String)> = (0..60)
            .map(|i| (format!("n{:02}", i), format!("n{:02}", (i + 1) % 60)))
            .collect();
        let records: Vec<RawRecord> = edges.iter().map(|(s, d)| RawRecord::new(s, d)).collect();
        let graph = build_graph(&records).unwrap();

        let capped = detect_communities(&graph, 1).unwrap();
        assert_eq!(capped.passes, 1);
        assert!(!capped.converged);
        assert_eq!(capped.partition.assignments.len(), 60);

        let full = detect_communities(&graph, 100).unwrap();
        assert!(full.converged);
        assert!(full.modularity >= capped.modularity - 1e-12);
    }

    #[test]
    fn staying_wins_a_tied_gain() {
        assert_eq!(best_community(1, &[0, 1, 2], |c| [0.1, 0.5, 0.5][c]), 1);
        // Within MIN_GAIN of staying is still a tie
        assert_eq!(best_community(1, &[1, 2], |c| [0.0, 0.5, 0.5 + 1e-13][c]), 1);
        assert_eq!(best_community(1, &[1, 2], |c| [0.0, 0.5, 0.6][c]), 2);
    }

    #[test]
    fn lowest_community_wins_among_equal_candidates() {
        assert_eq!(best_community(3, &[0, 1, 2, 3], |c| [0.2, 0.5, 0.5, 0.0][c]), 1);
        assert_eq!(best_community(0, &[0, 2, 4], |c| [0.0, 0.0, 0.7, 0.0, 0.7][c]), 2);
    }

    #[test]
    fn path_middle_node_stays_on_a_tie() {
        // Sweep 1: a joins b. b then sees 0.5 to stay and 0.5 to join c, so it
        // stays, and c follows into {a, b}. Moving b on the tie would take a
        // third move.
        let graph = graph_of(&[("a", "b"), ("b", "c")]);
        let level = LevelGraph::from_undirected(&to_undirected(&graph));
        let (partition, trace) = local_moving(&level);

        assert_eq!(partition.assignments, vec![0, 0, 0]);
        assert_eq!(trace.moves, 2);
        assert_eq!(trace.sweep_modularity.len(), 3);
    }

    #[test]
    fn pass_cap_on_a_converged_run_still_reports_converged() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let capped = detect_communities(&graph, 1).unwrap();
        let full = detect_communities(&graph, 100).unwrap();

        assert_eq!(capped.passes, 1);
        assert!(capped.converged);
        assert_eq!(capped, full);
    }

    #[test]
    fn aggregation_preserves_total_degree() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a"), ("a", "c")]);
        let level = LevelGraph::from_undirected(&to_undirected(&graph));
        let partition = CommunityPartition::from_labels(&[0, 0, 1, 1]);
        let coarse = level.aggregate(&partition);

        assert_eq!(coarse.node_count(), 2);
        assert_eq!(coarse.degrees.iter().sum::<f64>(), level.two_m);
        // a-b inside the first group, c-d inside the second
        assert_eq!(coarse.self_loops, vec![2.0, 2.0]);
        // b-c, d-a and a-c cross the groups
        assert_eq!(coarse.adjacency[0], vec![(1, 3.0)]);
    }
}
