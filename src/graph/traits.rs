//! Capability traits implemented by the graph representations.
//!
//! The traits slice the graph surface by capability rather than by concrete
//! representation: consumers bound on the capabilities they use and accept
//! any graph providing them. Iterator types are associated so each
//! representation hands out its own cursor without boxing.

use std::any::Any;

use crate::entity_map::{EntityMap, HandlerRegistry, MapToken, MutationHandler};
use crate::{EdgeIndex, GraphError, MixedEdge, NodeIndex};

/// The node set every graph representation carries.
pub trait Graph {
    /// Iterator over the live node handles.
    type Nodes<'a>: Iterator<Item = NodeIndex>
    where
        Self: 'a;

    /// Returns the number of live nodes.
    fn node_count(&self) -> usize;

    /// Returns whether `node` is live.
    fn contains_node(&self, node: NodeIndex) -> bool;

    /// Iterates over the live node handles.
    fn nodes(&self) -> Self::Nodes<'_>;
}

/// Node mutation.
///
/// Append-only representations implement this too: they can always add,
/// and removal reports [`GraphError::UnsupportedOperation`].
pub trait MutableGraph: Graph {
    /// Adds an isolated node and returns its handle.
    fn add_node(&mut self) -> NodeIndex;

    /// Removes `node` together with every incident edge.
    ///
    /// Removing a handle that is not live is a no-op. Representations that
    /// do not support removal fail with
    /// [`GraphError::UnsupportedOperation`].
    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError>;
}

/// Directed arcs.
pub trait DirectedEdges: Graph {
    /// Iterator over all live arc handles.
    type Arcs<'a>: Iterator<Item = EdgeIndex>
    where
        Self: 'a;

    /// Iterator over one node's outgoing or incoming arcs.
    type NodeArcs<'a>: Iterator<Item = EdgeIndex>
    where
        Self: 'a;

    /// Iterator over one node's incident arcs of both directions.
    type IncidentArcs<'a>: Iterator<Item = EdgeIndex>
    where
        Self: 'a;

    /// Returns the number of live arcs.
    fn arc_count(&self) -> usize;

    /// Returns whether `arc` is live.
    fn contains_arc(&self, arc: EdgeIndex) -> bool;

    /// Iterates over all live arc handles.
    fn arcs(&self) -> Self::Arcs<'_>;

    /// The node `arc` leaves, or `None` when `arc` is not live.
    fn source(&self, arc: EdgeIndex) -> Option<NodeIndex>;

    /// The node `arc` enters, or `None` when `arc` is not live.
    fn target(&self, arc: EdgeIndex) -> Option<NodeIndex>;

    /// Iterates over the arcs leaving `node`, oldest first.
    fn outgoing(&self, node: NodeIndex) -> Self::NodeArcs<'_>;

    /// Iterates over the arcs entering `node`, oldest first.
    fn incoming(&self, node: NodeIndex) -> Self::NodeArcs<'_>;

    /// Iterates over the arcs incident to `node`, outgoing then incoming.
    ///
    /// A self-loop shows up twice, once per attachment.
    fn incident_arcs(&self, node: NodeIndex) -> Self::IncidentArcs<'_>;

    /// Returns the number of arcs leaving `node`.
    fn out_degree(&self, node: NodeIndex) -> usize {
        self.outgoing(node).count()
    }

    /// Returns the number of arcs entering `node`.
    fn in_degree(&self, node: NodeIndex) -> usize {
        self.incoming(node).count()
    }
}

/// Undirected edges.
pub trait UndirectedEdges: Graph {
    /// Iterator over all live undirected edge handles.
    type UEdges<'a>: Iterator<Item = EdgeIndex>
    where
        Self: 'a;

    /// Iterator over one node's incident undirected edges.
    type NodeUEdges<'a>: Iterator<Item = EdgeIndex>
    where
        Self: 'a;

    /// Returns the number of live undirected edges.
    fn uedge_count(&self) -> usize;

    /// Returns whether `uedge` is live.
    fn contains_uedge(&self, uedge: EdgeIndex) -> bool;

    /// Iterates over all live undirected edge handles.
    fn uedges(&self) -> Self::UEdges<'_>;

    /// The endpoints of `uedge`, in insertion order.
    fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)>;

    /// Iterates over the undirected edges incident to `node`.
    ///
    /// A self-loop shows up twice, once per attachment.
    fn incident_uedges(&self, node: NodeIndex) -> Self::NodeUEdges<'_>;

    /// Returns the degree of `node`, counting self-loops twice.
    fn degree(&self, node: NodeIndex) -> usize {
        self.incident_uedges(node).count()
    }
}

/// The combined edge surface of the mixed representations.
pub trait MixedEdges: DirectedEdges + UndirectedEdges {
    /// Iterator over all live edges, tagged by kind.
    type Edges<'a>: Iterator<Item = MixedEdge>
    where
        Self: 'a;

    /// Iterator over one node's incident edges, tagged by kind.
    type NodeEdges<'a>: Iterator<Item = MixedEdge>
    where
        Self: 'a;

    /// Returns the number of live edges of both kinds.
    fn edge_count(&self) -> usize {
        self.arc_count() + self.uedge_count()
    }

    /// Returns whether `edge` is live.
    fn contains_edge(&self, edge: MixedEdge) -> bool {
        match edge {
            MixedEdge::Arc(arc) => self.contains_arc(arc),
            MixedEdge::UEdge(uedge) => self.contains_uedge(uedge),
        }
    }

    /// Iterates over all live edges, arcs first.
    fn edges(&self) -> Self::Edges<'_>;

    /// The endpoints of `edge`: `(source, target)` for an arc.
    fn edge_ends(&self, edge: MixedEdge) -> Option<(NodeIndex, NodeIndex)> {
        match edge {
            MixedEdge::Arc(arc) => Some((self.source(arc)?, self.target(arc)?)),
            MixedEdge::UEdge(uedge) => self.uedge_ends(uedge),
        }
    }

    /// Iterates over the edges incident to `node`, arcs first.
    fn incident_edges(&self, node: NodeIndex) -> Self::NodeEdges<'_>;
}

/// Synchronized per-node data.
///
/// A map created through [`create_node_map`] is owned by the graph's node
/// registry and receives every node mutation, so removed nodes are cleared
/// from it before their handles can be recycled. Callers address it through
/// the returned token and may [`detach_node_map`] it to take ownership back.
///
/// [`create_node_map`]: NodeMaps::create_node_map
/// [`detach_node_map`]: NodeMaps::detach_node_map
pub trait NodeMaps {
    /// The registry node mutations are broadcast to.
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex>;

    /// Mutable access to the node registry.
    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex>;

    /// Creates an empty synchronized node map.
    fn create_node_map<V: 'static>(&mut self) -> MapToken<NodeIndex, EntityMap<NodeIndex, V>> {
        self.node_registry_mut().attach(EntityMap::new())
    }

    /// Registers a caller-built node handler.
    fn attach_node_map<M>(&mut self, handler: M) -> MapToken<NodeIndex, M>
    where
        M: MutationHandler<NodeIndex> + Any,
    {
        self.node_registry_mut().attach(handler)
    }

    /// Deregisters the handler behind `token` and hands it back.
    fn detach_node_map<M: Any>(&mut self, token: MapToken<NodeIndex, M>) -> Option<M> {
        self.node_registry_mut().detach(token)
    }

    /// Borrows the handler behind `token`.
    fn node_map<M: Any>(&self, token: MapToken<NodeIndex, M>) -> Option<&M> {
        self.node_registry().get(token)
    }

    /// Mutably borrows the handler behind `token`.
    fn node_map_mut<M: Any>(&mut self, token: MapToken<NodeIndex, M>) -> Option<&mut M> {
        self.node_registry_mut().get_mut(token)
    }
}

/// Synchronized per-edge data.
///
/// The key type differs per representation: plain directed and undirected
/// graphs key edge maps by [`EdgeIndex`], the mixed ones by [`MixedEdge`],
/// and the map type follows suit so one map covers both edge kinds.
pub trait EdgeMaps {
    /// Handle type edge maps are keyed by.
    type EdgeKey: Copy + 'static;

    /// Map type produced by [`create_edge_map`](EdgeMaps::create_edge_map).
    type EdgeMap<V: 'static>: MutationHandler<Self::EdgeKey> + Default + 'static;

    /// The registry edge mutations are broadcast to.
    fn edge_registry(&self) -> &HandlerRegistry<Self::EdgeKey>;

    /// Mutable access to the edge registry.
    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<Self::EdgeKey>;

    /// Creates an empty synchronized edge map.
    fn create_edge_map<V: 'static>(&mut self) -> MapToken<Self::EdgeKey, Self::EdgeMap<V>> {
        self.edge_registry_mut()
            .attach(<Self::EdgeMap<V> as Default>::default())
    }

    /// Registers a caller-built edge handler.
    fn attach_edge_map<M>(&mut self, handler: M) -> MapToken<Self::EdgeKey, M>
    where
        M: MutationHandler<Self::EdgeKey> + Any,
    {
        self.edge_registry_mut().attach(handler)
    }

    /// Deregisters the handler behind `token` and hands it back.
    fn detach_edge_map<M: Any>(&mut self, token: MapToken<Self::EdgeKey, M>) -> Option<M> {
        self.edge_registry_mut().detach(token)
    }

    /// Borrows the handler behind `token`.
    fn edge_map<M: Any>(&self, token: MapToken<Self::EdgeKey, M>) -> Option<&M> {
        self.edge_registry().get(token)
    }

    /// Mutably borrows the handler behind `token`.
    fn edge_map_mut<M: Any>(&mut self, token: MapToken<Self::EdgeKey, M>) -> Option<&mut M> {
        self.edge_registry_mut().get_mut(token)
    }
}
