//! Results persistence module

use anyhow::{Context, Result};
use crate::cluster::components::weakly_connected_components;
use crate::cluster::metrics::community_stats;
use crate::data::CleaningReport;
use crate::pipeline::AnalysisReport;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use polars::prelude::*;
use serde_json::{json, to_string_pretty};

/// Number of nodes listed per centrality measure in the summary
const SUMMARY_TOP_NODES: usize = 10;

/// Decimal places kept for scores in `nodes.csv`
const NODE_SCORE_PRECISION: usize = 8;

/// Save analysis results to the specified directory
pub fn save_results(
    report: &AnalysisReport,
    cleaning: Option<&CleaningReport>,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving results to {}", output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_summary(report, cleaning, output_dir)?;
    save_node_attributes(report, output_dir)?;
    save_communities(report, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save summary information
fn save_summary(
    report: &AnalysisReport,
    cleaning: Option<&CleaningReport>,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving summary information");

    let graph = &report.graph;
    let components = weakly_connected_components(graph);
    let communities = &report.communities;
    let sizes = communities.partition.sizes();

    let top = |scores: &crate::centrality::CentralityScores| {
        scores
            .top(SUMMARY_TOP_NODES)
            .into_iter()
            .map(|(node, score)| json!({ "id": graph.node_ids[node], "score": score }))
            .collect::<Vec<_>>()
    };

    let summary = json!({
        "records": cleaning,
        "graph_stats": {
            "node_count": graph.node_count,
            "edge_count": graph.edge_count(),
            "total_weight": graph.total_weight(),
            "avg_out_degree": graph.edge_count() as f64 / graph.node_count as f64,
            "weakly_connected_components": components.count,
            "largest_component_size": components.largest,
        },
        "community_stats": {
            "community_count": communities.partition.community_count,
            "modularity": communities.modularity,
            "louvain_passes": communities.passes,
            "louvain_converged": communities.converged,
            "largest_community_size": sizes.iter().copied().max().unwrap_or(0),
            "singleton_communities": sizes.iter().filter(|&&size| size == 1).count(),
        },
        "centrality": {
            "eigenvector_converged": report.centrality.eigenvector_converged,
            "top_in_degree": top(&report.centrality.in_degree),
            "top_betweenness": top(&report.centrality.betweenness),
            "top_eigenvector": top(&report.centrality.eigenvector),
        },
        "core_community": {
            "id": report.core.community,
            "size": report.core.community_size,
            "selected": report.core.members.len(),
            "labeled": report.core.labeled().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        },
    });

    let path = output_dir.join("summary.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save per-node centrality scores and community ids
fn save_node_attributes(report: &AnalysisReport, output_dir: &Path) -> Result<()> {
    log::info!("Saving node attributes");

    let centrality = &report.centrality;
    let ids: Vec<&str> = report.graph.node_ids.iter().map(String::as_str).collect();
    let communities: Vec<u32> = report
        .communities
        .partition
        .assignments
        .iter()
        .map(|&community| community as u32)
        .collect();

    let mut df = DataFrame::new(vec![
        Column::new("id".into(), ids),
        Column::new("in_degree".into(), centrality.in_degree.values.as_slice()),
        Column::new("betweenness".into(), centrality.betweenness.values.as_slice()),
        Column::new("eigenvector".into(), centrality.eigenvector.values.as_slice()),
        Column::new("community".into(), communities),
    ])?;

    let path = output_dir.join("nodes.csv");
    let mut file = File::create(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_float_precision(Some(NODE_SCORE_PRECISION))
        .finish(&mut df)?;

    Ok(())
}

/// Save community sizes, densities and member ids
fn save_communities(report: &AnalysisReport, output_dir: &Path) -> Result<()> {
    log::info!("Saving community information");

    let graph = &report.graph;
    let partition = &report.communities.partition;
    let mut members: Vec<Vec<&str>> = vec![Vec::new(); partition.community_count];
    for (node, &community) in partition.assignments.iter().enumerate() {
        members[community].push(graph.node_ids[node].as_str());
    }

    let communities_json = json!({
        "communities": community_stats(graph, partition)
            .into_iter()
            .map(|stats| {
                json!({
                    "id": stats.id,
                    "size": stats.size,
                    "density": stats.density,
                    "members": members[stats.id],
                })
            })
            .collect::<Vec<_>>()
    });

    let path = output_dir.join("communities.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&communities_json)?.as_bytes())?;

    Ok(())
}
