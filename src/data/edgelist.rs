//! Edge-list and raw-message file handling

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use rayon::prelude::*;

use crate::data::headers;
use crate::graph::RawRecord;

/// Sender column of a cleaned edge list
pub const SOURCE_COLUMN: &str = "From";

/// Receiver column of a cleaned edge list
pub const DESTINATION_COLUMN: &str = "To";

/// Column holding full RFC 822 messages in a raw dump
pub const MESSAGE_COLUMN: &str = "message";

/// Read a CSV or Parquet file, chosen by extension
fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

    let df = if is_parquet {
        log::info!("Reading parquet file: {}", path.display());
        LazyFrame::scan_parquet(path, Default::default())?.collect()?
    } else {
        log::info!("Reading CSV file: {}", path.display());
        CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?
    };

    log::debug!("File schema: {:?}", df.schema());
    Ok(df)
}

/// Fetch a column as strings, whatever type the reader inferred
fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .with_context(|| format!("missing column '{}'", name))?
        .cast(&DataType::String)?;
    Ok(column.str()?.clone())
}

/// Load a cleaned edge list with `From` and `To` columns.
///
/// Null cells become missing endpoints; filtering them is left to
/// [`crate::data::preprocessing::clean_records`].
pub fn load_edge_list(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let df = read_frame(path.as_ref())?;
    let sources = string_column(&df, SOURCE_COLUMN)?;
    let destinations = string_column(&df, DESTINATION_COLUMN)?;

    let records: Vec<RawRecord> = sources
        .into_iter()
        .zip(destinations.into_iter())
        .map(|(source, destination)| RawRecord {
            source: source.map(str::to_string),
            destination: destination.map(str::to_string),
        })
        .collect();

    log::info!("Loaded {} communication records", records.len());
    Ok(records)
}

/// Load a raw message dump and expand every message into sender/recipient records
pub fn load_message_records(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let df = read_frame(path.as_ref())?;
    let messages = string_column(&df, MESSAGE_COLUMN)?;
    let messages: Vec<&str> = messages.into_iter().flatten().collect();

    log::info!("Parsing {} email messages", messages.len());
    let records: Vec<RawRecord> = messages
        .par_iter()
        .flat_map_iter(|message| headers::message_records(message))
        .collect();

    log::info!("Successfully parsed {} email connections", records.len());
    Ok(records)
}

/// Save records as a `From`,`To` CSV edge list
pub fn write_edge_list(path: impl AsRef<Path>, records: &[RawRecord]) -> Result<()> {
    let path = path.as_ref();
    let sources: Vec<Option<&str>> = records.iter().map(|r| r.source.as_deref()).collect();
    let destinations: Vec<Option<&str>> =
        records.iter().map(|r| r.destination.as_deref()).collect();

    let mut df = DataFrame::new(vec![
        Column::new(SOURCE_COLUMN.into(), sources),
        Column::new(DESTINATION_COLUMN.into(), destinations),
    ])?;

    let mut file = File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;

    log::info!("Cleaned edge list saved to {}", path.display());
    Ok(())
}
