//! In-degree centrality

use crate::centrality::CentralityScores;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::CompressedGraph;

/// Distinct incoming neighbors of each node divided by `|V| - 1`.
///
/// Edge weight is ignored and self-loops do not count. A single-node graph
/// scores 0.
pub fn in_degree_centrality(graph: &CompressedGraph) -> AnalysisResult<CentralityScores> {
    let node_count = graph.node_count;
    if node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "in-degree centrality",
        });
    }

    log::info!("Calculating in-degree centrality");

    if node_count == 1 {
        return Ok(CentralityScores::new(vec![0.0]));
    }

    let scale = 1.0 / (node_count - 1) as f64;
    let values = (0..node_count)
        .map(|node| {
            let self_loop = graph.incoming_edges(node).binary_search(&(node as u32)).is_ok();
            let distinct = graph.in_degree(node) - usize::from(self_loop);
            distinct as f64 * scale
        })
        .collect();

    Ok(CentralityScores::new(values))
}
