//! Graph construction module

use std::borrow::Borrow;
use std::collections::HashMap;

use itertools::Itertools;
use rayon::prelude::*;

use crate::error::{AnalysisError, AnalysisResult, Endpoint};
use crate::graph::CompressedGraph;

/// One raw communication record: a sender and a single receiver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRecord {
    pub source: Option<String>,
    pub destination: Option<String>,
}

impl RawRecord {
    /// Create a record with both endpoints present
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            destination: Some(destination.into()),
        }
    }

    /// Trimmed endpoints, or the first one that is missing or blank
    pub fn endpoints(&self) -> Result<(&str, &str), Endpoint> {
        let source = present(&self.source).ok_or(Endpoint::Source)?;
        let destination = present(&self.destination).ok_or(Endpoint::Destination)?;
        Ok((source, destination))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Builder that aggregates raw records into weighted ordered pairs
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Message count per (source, destination)
    pair_counts: HashMap<(String, String), u32>,

    /// Number of records folded in so far
    record_count: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given pair capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pair_counts: HashMap::with_capacity(capacity),
            record_count: 0,
        }
    }

    /// Add one record, rejecting it if an endpoint is missing.
    ///
    /// `index` is the record's position in the input and is only used for
    /// error reporting.
    pub fn add_record(&mut self, index: usize, record: &RawRecord) -> AnalysisResult<()> {
        let (source, destination) = record
            .endpoints()
            .map_err(|endpoint| AnalysisError::MalformedRecord { index, endpoint })?;
        self.add_edge(source, destination);
        Ok(())
    }

    /// Add a message from one node to another
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str) {
        *self
            .pair_counts
            .entry((src_id.to_string(), dst_id.to_string()))
            .or_insert(0) += 1;
        self.record_count += 1;
    }

    /// Fold another builder's counts into this one
    pub fn merge(mut self, other: GraphBuilder) -> Self {
        if self.pair_counts.len() < other.pair_counts.len() {
            return other.merge(self);
        }
        for (pair, count) in other.pair_counts {
            *self.pair_counts.entry(pair).or_insert(0) += count;
        }
        self.record_count += other.record_count;
        self
    }

    /// Number of records added
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Build the compressed graph
    pub fn build(self) -> CompressedGraph {
        let node_ids: Vec<String> = self
            .pair_counts
            .keys()
            .flat_map(|(src, dst)| [src.as_str(), dst.as_str()])
            .sorted_unstable()
            .dedup()
            .map(str::to_string)
            .collect();

        let id_to_index: HashMap<&str, u32> = node_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx as u32))
            .collect();

        let edges: Vec<(u32, u32, u32)> = self
            .pair_counts
            .iter()
            .map(|((src, dst), &weight)| {
                (id_to_index[src.as_str()], id_to_index[dst.as_str()], weight)
            })
            .collect();

        CompressedGraph::from_weighted_edges(node_ids, edges)
    }
}

/// Build a graph from a sequence of raw records
pub fn build_graph<I>(records: I) -> AnalysisResult<CompressedGraph>
where
    I: IntoIterator,
    I::Item: Borrow<RawRecord>,
{
    log::info!("Building communication graph");

    let records = records.into_iter();
    let mut builder = GraphBuilder::with_capacity(records.size_hint().0);
    for (index, record) in records.enumerate() {
        builder.add_record(index, record.borrow())?;
    }

    let record_count = builder.record_count();
    let graph = builder.build();
    log::info!(
        "Built graph from {} records: {} nodes, {} edges",
        record_count,
        graph.node_count,
        graph.edge_count()
    );
    Ok(graph)
}

/// Build a graph from a slice of records, aggregating in parallel.
///
/// Produces the same graph as [`build_graph`]. If several records are
/// malformed, the one with the lowest index is reported.
pub fn build_graph_parallel(records: &[RawRecord]) -> AnalysisResult<CompressedGraph> {
    log::info!("Building communication graph from {} records in parallel", records.len());

    if let Some((index, endpoint)) = records
        .par_iter()
        .enumerate()
        .filter_map(|(index, record)| record.endpoints().err().map(|e| (index, e)))
        .find_first(|_| true)
    {
        return Err(AnalysisError::MalformedRecord { index, endpoint });
    }

    let builder = records
        .par_iter()
        .fold(GraphBuilder::default, |mut builder, record| {
            if let Ok((source, destination)) = record.endpoints() {
                builder.add_edge(source, destination);
            }
            builder
        })
        .reduce(GraphBuilder::default, GraphBuilder::merge);

    let graph = builder.build();
    log::info!(
        "Built graph: {} nodes, {} edges",
        graph.node_count,
        graph.edge_count()
    );
    Ok(graph)
}
