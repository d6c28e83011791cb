//! Eigenvector centrality via power iteration.
//!
//! Scores measure influence received: a node is central when central nodes
//! send it messages. Each iteration computes
//!
//! ```text
//! x'[v] = x[v] + sum over u -> v of w(u, v) * x[u]
//! ```
//!
//! i.e. multiplies by `(A + I)^T`, then rescales to unit L2 norm. The identity
//! shift has the same eigenvectors as `A` and stops periodic graphs (a
//! directed cycle, a bipartite pattern) from oscillating forever. Self-loops
//! are excluded from `A`.

use crate::centrality::CentralityScores;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::CompressedGraph;

/// Eigenvector centrality of every node.
///
/// Stops once the largest per-component change falls below `tolerance`.
/// Returns [`AnalysisError::Convergence`] with the last iterate if
/// `max_iterations` is reached first.
pub fn eigenvector_centrality(
    graph: &CompressedGraph,
    max_iterations: usize,
    tolerance: f64,
) -> AnalysisResult<CentralityScores> {
    let node_count = graph.node_count;
    if node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "eigenvector centrality",
        });
    }

    log::info!("Calculating eigenvector centrality (tolerance {:e}, cap {})", tolerance, max_iterations);

    let mut scores = vec![1.0 / (node_count as f64).sqrt(); node_count];
    let mut next = vec![0.0; node_count];
    let mut delta = f64::INFINITY;

    for iteration in 1..=max_iterations {
        for (node, slot) in next.iter_mut().enumerate() {
            let received: f64 = graph
                .incoming_weighted(node)
                .filter(|&(src, _)| src as usize != node)
                .map(|(src, weight)| weight as f64 * scores[src as usize])
                .sum();
            *slot = scores[node] + received;
        }

        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(AnalysisError::Convergence {
                iterations: iteration,
                delta,
                partial: scores,
            });
        }
        for value in next.iter_mut() {
            *value /= norm;
        }

        delta = scores
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .fold(0.0, f64::max);
        std::mem::swap(&mut scores, &mut next);

        if delta < tolerance {
            log::info!("Eigenvector centrality converged after {} iterations", iteration);
            return Ok(CentralityScores::new(scores));
        }
    }

    Err(AnalysisError::Convergence {
        iterations: max_iterations,
        delta,
        partial: scores,
    })
}
