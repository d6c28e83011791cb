//! Data preprocessing module for communication records

use serde::Serialize;

use crate::graph::RawRecord;

/// Counts of what record cleaning kept and dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input: usize,
    pub kept: usize,

    /// Records with a missing or blank endpoint
    pub missing_endpoint: usize,

    /// Records whose sender and receiver are the same after trimming
    pub self_loops: usize,
}

/// Drop malformed records and self-loops, trimming the endpoints of the rest
pub fn clean_records(records: Vec<RawRecord>) -> (Vec<RawRecord>, CleaningReport) {
    let mut report = CleaningReport {
        input: records.len(),
        ..CleaningReport::default()
    };

    let cleaned: Vec<RawRecord> = records
        .iter()
        .filter_map(|record| match record.endpoints() {
            Err(_) => {
                report.missing_endpoint += 1;
                None
            }
            Ok((source, destination)) if source == destination => {
                report.self_loops += 1;
                None
            }
            Ok((source, destination)) => Some(RawRecord::new(source, destination)),
        })
        .collect();

    report.kept = cleaned.len();
    log::info!(
        "Kept {} of {} records ({} missing an endpoint, {} self-loops)",
        report.kept,
        report.input,
        report.missing_endpoint,
        report.self_loops
    );

    (cleaned, report)
}
