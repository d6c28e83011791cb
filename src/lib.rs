//! Core library for the email network analyzer
//!
//! Builds a weighted directed graph from sender/receiver records, scores
//! every node with three centrality measures, partitions the graph with
//! Louvain and extracts the top-ranked core of the largest community.

pub mod centrality;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod storage;
pub mod subgraph;
pub mod viz;

pub use anyhow::{Result, anyhow};
pub use config::{AnalysisConfig, CentralityKind};
pub use error::{AnalysisError, AnalysisResult, Endpoint};
pub use graph::{CompressedGraph, RawRecord};
pub use pipeline::{analyze_graph, run_analysis, AnalysisReport};
