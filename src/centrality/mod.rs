//! Centrality measures over the communication graph
//!
//! Each measure is a pure function of a [`CompressedGraph`] and returns one
//! normalized score per node index. Self-loops never contribute.

pub mod degree;
pub mod betweenness;
pub mod eigenvector;

use serde::Serialize;

use crate::config::{AnalysisConfig, CentralityKind};
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::CompressedGraph;

pub use betweenness::betweenness_centrality;
pub use degree::in_degree_centrality;
pub use eigenvector::eigenvector_centrality;

/// Per-node scores for one centrality measure, indexed by node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityScores {
    pub values: Vec<f64>,
}

impl CentralityScores {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Score of a node
    pub fn get(&self, node: usize) -> f64 {
        self.values[node]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `n` highest-scoring nodes, ties broken by ascending node index
    pub fn top(&self, n: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.values.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

/// All three centrality measures for one graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityReport {
    pub in_degree: CentralityScores,
    pub betweenness: CentralityScores,
    pub eigenvector: CentralityScores,

    /// False when the eigenvector scores are an accepted unconverged iterate
    pub eigenvector_converged: bool,
}

impl CentralityReport {
    /// Scores for the requested measure
    pub fn scores(&self, kind: CentralityKind) -> &CentralityScores {
        match kind {
            CentralityKind::InDegree => &self.in_degree,
            CentralityKind::Betweenness => &self.betweenness,
            CentralityKind::Eigenvector => &self.eigenvector,
        }
    }
}

/// Compute all three measures concurrently.
///
/// A non-converging eigenvector computation is an error unless
/// `config.accept_unconverged` is set, in which case its last iterate is used.
pub fn compute_all(
    graph: &CompressedGraph,
    config: &AnalysisConfig,
) -> AnalysisResult<CentralityReport> {
    if graph.node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "centrality",
        });
    }

    log::info!("Computing centrality measures for {} nodes", graph.node_count);

    let (in_degree, (betweenness, eigenvector)) = rayon::join(
        || in_degree_centrality(graph),
        || {
            rayon::join(
                || betweenness_centrality(graph),
                || {
                    eigenvector_centrality(
                        graph,
                        config.eigenvector_max_iterations,
                        config.eigenvector_tolerance,
                    )
                },
            )
        },
    );

    let (eigenvector, eigenvector_converged) = match eigenvector {
        Ok(scores) => (scores, true),
        Err(AnalysisError::Convergence {
            iterations,
            delta,
            partial,
        }) if config.accept_unconverged => {
            log::warn!(
                "Eigenvector centrality did not converge after {} iterations (last change {:e}); using last iterate",
                iterations,
                delta
            );
            (CentralityScores::new(partial), false)
        }
        Err(err) => return Err(err),
    };

    Ok(CentralityReport {
        in_degree: in_degree?,
        betweenness: betweenness?,
        eigenvector,
        eigenvector_converged,
    })
}
