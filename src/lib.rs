//! Multigraph storage built from flat slot arenas.
//!
//! The crate provides directed, undirected and mixed multigraphs whose nodes
//! and edges are identified by small integer handles. Handles stay valid
//! across unrelated mutations and are recycled after removal. Adjacency is
//! kept in intrusive doubly-linked lists embedded in the edge arena (the
//! "lacing"), so inserting or removing an edge is O(1) and traversing a
//! node's incidence list allocates nothing.
//!
//! Auxiliary per-node and per-edge data lives in [`EntityMap`]s which are
//! registered with a graph and receive mutation notifications, so a recycled
//! handle never observes a previous occupant's value.
//!
//! ```
//! use lacegraph::DiGraph;
//!
//! let mut graph = DiGraph::new();
//! let n0 = graph.add_node();
//! let n1 = graph.add_node();
//! let a = graph.add_arc(n0, n1);
//!
//! assert!(graph.outgoing(n0).eq([a]));
//! assert!(graph.incoming(n1).eq([a]));
//! assert_eq!(graph.source(a), Some(n0));
//! ```

pub mod entity_map;
pub mod graph;
pub mod lace;
pub mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::entity_map::{EntityMap, HandlerRegistry, MapToken, MutationHandler};
pub use crate::graph::{
    DiGraph, MixedEdgeMap, MixedGraph, StaticDiGraph, StaticMixedGraph, StaticMixedIdGraph,
    StaticOutArcDiGraph, StaticUGraph, UGraph,
};
pub use crate::lace::{ArcLace, ArcRecord, LaceAnchors};
pub use crate::memory::{Arena, EntityIndex, StaticArena};

crate::make_entity! {
    /// Handle of a node within one graph.
    pub struct NodeIndex(u32);

    /// Handle of an edge within one edge arena.
    ///
    /// The handle spaces of nodes and edges are disjoint; a mixed graph
    /// additionally keeps separate spaces for its directed and undirected
    /// edges, distinguished by the tag on [`MixedEdge`].
    pub struct EdgeIndex(u32);
}

/// Direction of an edge at one of its endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The edge leaves the node; the node is the edge's source.
    #[default]
    Outgoing = 0,
    /// The edge enters the node; the node is the edge's target.
    Incoming = 1,
}

impl Direction {
    /// Both directions, outgoing first.
    pub const ALL: [Direction; 2] = [Direction::Outgoing, Direction::Incoming];

    /// Index usable for arrays with one entry per direction.
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The opposite direction.
    #[inline(always)]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
        }
    }
}

/// Edge handle of a mixed graph: an [`EdgeIndex`] tagged with directedness.
///
/// Directed arcs and undirected edges live in separate arenas, so the same
/// integer value may denote both an arc and a uEdge; the tag disambiguates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MixedEdge {
    /// A directed arc.
    Arc(EdgeIndex),
    /// An undirected edge.
    UEdge(EdgeIndex),
}

impl MixedEdge {
    /// The arena-scoped handle without the tag.
    #[inline]
    pub fn index(self) -> EdgeIndex {
        match self {
            MixedEdge::Arc(index) | MixedEdge::UEdge(index) => index,
        }
    }

    /// Whether the edge is a directed arc.
    #[inline]
    pub fn is_directed(self) -> bool {
        matches!(self, MixedEdge::Arc(_))
    }
}

/// Error reported by the mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The representation does not implement the requested mutation, e.g.
    /// removal from an append-only graph.
    #[error("operation is not supported by this graph representation")]
    UnsupportedOperation,
    /// A caller-assigned id already denotes a live entry.
    #[error("id already denotes a live entry")]
    DuplicateKey,
}
