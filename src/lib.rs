//! # ward
//!
//! Community detection on weighted keyed graphs: multi-level modularity
//! maximization (Louvain) with incremental batch updates via
//! delta-screening.
//!
//! The engine consumes any [`Graph`] implementation; [`AdjacencyGraph`]
//! is the bundled container, and `petgraph` undirected graphs plug in
//! through the [`CommunityDetection`] trait (feature `petgraph`, on by
//! default).

pub mod community;
pub mod error;
pub mod graph;

pub use error::{Error, Result};
pub use graph::{AdjacencyGraph, Graph};

pub use community::{
    affected_vertices, aggregate, community_weights, compact_communities, delta_modularity,
    lookup_communities, modularity, vertex_weights, Louvain, Partition, ScanBuffer,
};

#[cfg(feature = "petgraph")]
pub use community::CommunityDetection;
