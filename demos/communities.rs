//! Detect communities in a small social graph, then update them after a
//! batch of edge changes.
//!
//! Run with `cargo run --example communities`.

use ward::{compact_communities, modularity, AdjacencyGraph, Louvain};

fn main() {
    // Two friend groups sharing one acquaintance edge.
    let mut g = AdjacencyGraph::new();
    for (u, v) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
        g.add_undirected_edge(u, v, 1.0);
    }
    g.add_undirected_edge(2, 3, 0.5);

    let louvain = Louvain::new();
    let part = louvain.run(&g).expect("valid configuration");
    let labels = compact_communities(&part.membership);

    println!("static run:");
    println!("  membership = {labels:?}");
    println!("  modularity = {:.4}", modularity(&g, &part.membership, 1.0));
    println!("  passes = {}, iterations = {}", part.passes, part.iterations);

    // The groups grow closer: three new strong ties between them.
    let mut inserted = Vec::new();
    for (u, v) in [(0, 3), (1, 4), (2, 5)] {
        g.add_undirected_edge(u, v, 2.0);
        inserted.push((u, v));
        inserted.push((v, u));
    }
    inserted.sort_unstable();

    let updated = louvain
        .run_incremental(&g, &part.membership, &[], &inserted)
        .expect("valid configuration");
    let labels = compact_communities(&updated.membership);

    println!("after {} insertions:", inserted.len() / 2);
    println!("  membership = {labels:?}");
    println!("  modularity = {:.4}", modularity(&g, &updated.membership, 1.0));
}
