//! The graph representations and their capability traits.
//!
//! Three mutable representations ([`DiGraph`], [`UGraph`], [`MixedGraph`])
//! support O(1) removal with handle recycling, append-only ones
//! ([`StaticDiGraph`], [`StaticOutArcDiGraph`], [`StaticUGraph`],
//! [`StaticMixedGraph`]) trade removal for dense sequential handles and
//! vector adjacency, and [`StaticMixedIdGraph`] lets the caller pick the
//! handles outright.

pub mod digraph;
pub mod mixed;
pub mod static_digraph;
pub mod static_mixed;
pub mod static_mixed_id;
pub mod static_out_digraph;
pub mod static_ugraph;
pub mod traits;
pub mod ugraph;

pub use digraph::DiGraph;
pub use mixed::{MixedEdgeMap, MixedGraph};
pub use static_digraph::StaticDiGraph;
pub use static_mixed::StaticMixedGraph;
pub use static_mixed_id::StaticMixedIdGraph;
pub use static_out_digraph::StaticOutArcDiGraph;
pub use static_ugraph::StaticUGraph;
pub use traits::{
    DirectedEdges, EdgeMaps, Graph, MixedEdges, MutableGraph, NodeMaps, UndirectedEdges,
};
pub use ugraph::UGraph;
