//! Configuration management for the email network analyzer

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};

/// Centrality measure used to rank members of the core community
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CentralityKind {
    InDegree,
    Betweenness,
    Eigenvector,
}

impl CentralityKind {
    /// Human-readable name used in logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            CentralityKind::InDegree => "in-degree centrality",
            CentralityKind::Betweenness => "betweenness centrality",
            CentralityKind::Eigenvector => "eigenvector centrality",
        }
    }
}

/// Default configuration for the email network analyzer
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    /// Number of core-community nodes kept in the ranked subgraph
    pub top_k: usize,

    /// Number of top-ranked nodes flagged for labeling
    pub label_count: usize,

    /// Centrality measure used for ranking
    pub ranking: CentralityKind,

    /// Maximum per-component change at which power iteration stops
    pub eigenvector_tolerance: f64,

    /// Power iteration cap
    pub eigenvector_max_iterations: usize,

    /// Cap on Louvain aggregation passes
    pub louvain_max_passes: usize,

    /// Use the last eigenvector iterate when power iteration does not converge
    pub accept_unconverged: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: 150,
            label_count: 15,
            ranking: CentralityKind::InDegree,
            eigenvector_tolerance: 1e-6,
            eigenvector_max_iterations: 1000,
            louvain_max_passes: 100,
            accept_unconverged: false,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with custom subgraph sizes and ranking
    pub fn new(top_k: usize, label_count: usize, ranking: CentralityKind) -> Self {
        Self {
            top_k,
            label_count,
            ranking,
            ..Self::default()
        }
    }

    /// Reject values the analysis stages cannot work with
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.top_k == 0 {
            return Err(AnalysisError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.label_count > self.top_k {
            return Err(AnalysisError::InvalidConfig(format!(
                "label_count ({}) cannot exceed top_k ({})",
                self.label_count, self.top_k
            )));
        }
        if !(self.eigenvector_tolerance > 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "eigenvector_tolerance must be positive".to_string(),
            ));
        }
        if self.eigenvector_max_iterations == 0 || self.louvain_max_passes == 0 {
            return Err(AnalysisError::InvalidConfig(
                "iteration caps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_k, 150);
        assert_eq!(config.label_count, 15);
        assert_eq!(config.ranking, CentralityKind::InDegree);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn label_count_cannot_exceed_top_k() {
        let config = AnalysisConfig::new(10, 11, CentralityKind::Betweenness);
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_tolerance_is_rejected() {
        let config = AnalysisConfig {
            eigenvector_tolerance: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
