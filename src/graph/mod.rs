//! Graph representation and construction module

pub mod compressed;
pub mod builder;
pub mod algorithms;

pub use compressed::CompressedGraph;
pub use builder::{build_graph, build_graph_parallel, GraphBuilder, RawRecord};
pub use algorithms::{to_undirected, UndirectedGraph};
