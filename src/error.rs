//! Error types for the analysis core

use std::fmt;
use thiserror::Error;

/// Which side of a communication record is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Failures surfaced by graph construction, centrality and community detection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A raw record is missing one of its endpoints
    #[error("record {index} is missing its {endpoint} endpoint")]
    MalformedRecord { index: usize, endpoint: Endpoint },

    /// Power iteration hit its iteration cap before converging.
    ///
    /// `partial` holds the last normalized iterate, indexed by node.
    #[error("power iteration did not converge after {iterations} iterations (last change {delta:e})")]
    Convergence {
        iterations: usize,
        delta: f64,
        partial: Vec<f64>,
    },

    /// A computation was invoked on a graph with zero nodes
    #[error("cannot compute {operation} on an empty graph")]
    EmptyGraph { operation: &'static str },

    /// A configuration value or an input shape was rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for the analysis core
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
