//! End-to-end analysis: records -> graph -> {centrality, communities} -> core subgraph

use std::borrow::Borrow;

use crate::centrality::{compute_all, CentralityReport};
use crate::cluster::{detect_communities, LouvainOutcome};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::{build_graph, CompressedGraph, RawRecord};
use crate::subgraph::{rank_core_community, RankedSubgraph};

/// Everything one analysis run produces
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub graph: CompressedGraph,
    pub centrality: CentralityReport,
    pub communities: LouvainOutcome,
    pub core: RankedSubgraph,
}

/// Build the graph from raw records and analyze it
pub fn run_analysis<I>(records: I, config: &AnalysisConfig) -> AnalysisResult<AnalysisReport>
where
    I: IntoIterator,
    I::Item: Borrow<RawRecord>,
{
    config.validate()?;
    let graph = build_graph(records)?;
    analyze_graph(graph, config)
}

/// Analyze an already-built graph.
///
/// Centrality and community detection only read the graph, so they run
/// concurrently.
pub fn analyze_graph(
    graph: CompressedGraph,
    config: &AnalysisConfig,
) -> AnalysisResult<AnalysisReport> {
    config.validate()?;
    if graph.node_count == 0 {
        return Err(AnalysisError::EmptyGraph {
            operation: "analysis",
        });
    }

    let (centrality, communities) = rayon::join(
        || compute_all(&graph, config),
        || detect_communities(&graph, config.louvain_max_passes),
    );
    let centrality = centrality?;
    let communities = communities?;

    log::info!("Ranking core community by {}", config.ranking.name());
    let core = rank_core_community(
        &graph,
        &communities.partition,
        centrality.scores(config.ranking),
        config.top_k,
        config.label_count,
    )?;

    Ok(AnalysisReport {
        graph,
        centrality,
        communities,
        core,
    })
}
