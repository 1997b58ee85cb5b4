//! Community detection over `petgraph` graphs.
//!
//! The core engine works on keyed weighted graphs; this seam lets callers
//! who already hold a `petgraph::graph::UnGraph` run it without building
//! an [`AdjacencyGraph`] by hand. Node indices map directly to vertex
//! keys, every edge gets unit weight, and the returned labels are
//! compacted to dense `0..k` ids.

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

use crate::community::louvain::{compact_communities, Louvain};
use crate::error::{Error, Result};
use crate::graph::AdjacencyGraph;

/// Trait for community detection algorithms.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    ///
    /// Returns a mapping from node index to community ID.
    fn detect<N, E>(&self, graph: &UnGraph<N, E>) -> Result<Vec<usize>>;

    /// Get the resolution parameter (if applicable).
    fn resolution(&self) -> f64 {
        1.0
    }
}

/// Keyed adjacency view of a `petgraph` graph, unit edge weights in both
/// directions.
fn adapt<N, E>(graph: &UnGraph<N, E>) -> AdjacencyGraph {
    let mut g = AdjacencyGraph::with_span(graph.node_count());
    for u in graph.node_indices() {
        g.add_vertex(u.index());
    }
    for edge in graph.edge_references() {
        g.add_undirected_edge(edge.source().index(), edge.target().index(), 1.0);
    }
    g
}

impl CommunityDetection for Louvain {
    fn detect<N, E>(&self, graph: &UnGraph<N, E>) -> Result<Vec<usize>> {
        if graph.node_count() == 0 {
            return Err(Error::EmptyInput);
        }
        let part = self.run(&adapt(graph))?;
        Ok(compact_communities(&part.membership))
    }

    fn resolution(&self) -> f64 {
        self.resolution_parameter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_triangle() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let n0 = graph.add_node(());
        let n1 = graph.add_node(());
        let n2 = graph.add_node(());

        let _ = graph.add_edge(n0, n1, ());
        let _ = graph.add_edge(n1, n2, ());
        let _ = graph.add_edge(n0, n2, ());

        let communities = Louvain::new().detect(&graph).unwrap();
        assert_eq!(communities.len(), 3);
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[1], communities[2]);
    }

    #[test]
    fn detect_two_cliques() {
        // Two triangles connected by a single edge
        let mut graph = UnGraph::<(), ()>::new_undirected();

        let a0 = graph.add_node(());
        let a1 = graph.add_node(());
        let a2 = graph.add_node(());
        let _ = graph.add_edge(a0, a1, ());
        let _ = graph.add_edge(a1, a2, ());
        let _ = graph.add_edge(a0, a2, ());

        let b0 = graph.add_node(());
        let b1 = graph.add_node(());
        let b2 = graph.add_node(());
        let _ = graph.add_edge(b0, b1, ());
        let _ = graph.add_edge(b1, b2, ());
        let _ = graph.add_edge(b0, b2, ());

        let _ = graph.add_edge(a2, b0, ());

        let communities = Louvain::new().detect(&graph).unwrap();
        assert_eq!(communities.len(), 6);
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[1], communities[2]);
        assert_eq!(communities[3], communities[4]);
        assert_eq!(communities[4], communities[5]);
        assert_ne!(communities[0], communities[3]);

        // Compacted labels start at 0.
        assert_eq!(communities[0], 0);
    }

    #[test]
    fn detect_empty_graph() {
        let graph = UnGraph::<(), ()>::new_undirected();
        assert!(Louvain::new().detect(&graph).is_err());
    }

    #[test]
    fn detect_single_node() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let _ = graph.add_node(());

        let communities = Louvain::new().detect(&graph).unwrap();
        assert_eq!(communities, vec![0]);
    }

    #[test]
    fn detect_disconnected_nodes() {
        let mut graph = UnGraph::<(), ()>::new_undirected();
        let _ = graph.add_node(());
        let _ = graph.add_node(());

        let communities = Louvain::new().detect(&graph).unwrap();
        assert_eq!(communities.len(), 2);
        assert_ne!(communities[0], communities[1]);
    }

    #[test]
    fn resolution_is_reported() {
        let louvain = Louvain::new().with_resolution(0.5);
        assert_eq!(CommunityDetection::resolution(&louvain), 0.5);
    }
}
