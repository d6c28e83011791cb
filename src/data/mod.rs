//! Input loading and cleaning for communication records

pub mod edgelist;
pub mod headers;
pub mod preprocessing;

pub use edgelist::{load_edge_list, load_message_records, write_edge_list};
pub use preprocessing::{clean_records, CleaningReport};
