//! The append-only directed multigraph storing only outgoing adjacency.

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::static_digraph::{index_range, AdjacentArcs, IndexRange};
use crate::graph::{EdgeMaps, Graph, MutableGraph, NodeMaps};
use crate::memory::EntityIndex;
use crate::{EdgeIndex, EntityMap, GraphError, NodeIndex};

/// An append-only directed multigraph keeping only the outgoing side.
///
/// Each node stores a single adjacency vector, halving the per-arc memory of
/// [`StaticDiGraph`](crate::StaticDiGraph) for consumers that only ever walk
/// forward. There is no incoming adjacency, so the type provides `outgoing`
/// but no `incoming` or incident traversal and consequently does not
/// implement [`DirectedEdges`](crate::graph::DirectedEdges); endpoints of
/// any arc remain addressable through [`source`]/[`target`]. Removal
/// reports [`GraphError::UnsupportedOperation`].
///
/// [`source`]: StaticOutArcDiGraph::source
/// [`target`]: StaticOutArcDiGraph::target
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaticOutArcDiGraph {
    nodes: Vec<Vec<EdgeIndex>>,
    arcs: Vec<(NodeIndex, NodeIndex)>,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    arc_handlers: HandlerRegistry<EdgeIndex>,
}

impl StaticOutArcDiGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Returns whether `node` has been added.
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        node.index() < self.nodes.len()
    }

    /// Returns whether `arc` has been added.
    pub fn contains_arc(&self, arc: EdgeIndex) -> bool {
        arc.index() < self.arcs.len()
    }

    /// Iterates over the node handles, in insertion order.
    pub fn nodes(&self) -> IndexRange<NodeIndex> {
        index_range(self.nodes.len())
    }

    /// Iterates over the arc handles, in insertion order.
    pub fn arcs(&self) -> IndexRange<EdgeIndex> {
        index_range(self.arcs.len())
    }

    /// Adds an isolated node and returns the next sequential handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = NodeIndex::new(self.nodes.len());
        self.nodes.push(Vec::new());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an arc from `source` to `target` and returns the next
    /// sequential handle.
    ///
    /// Only the source node records the arc.
    ///
    /// # Panics
    ///
    /// Panics when the source has not been added.
    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        let arc = EdgeIndex::new(self.arcs.len());
        self.nodes[source.index()].push(arc);
        self.arcs.push((source, target));
        self.arc_handlers.notify_add(arc);
        arc
    }

    /// Arc removal is not supported.
    pub fn remove_arc(&mut self, _arc: EdgeIndex) -> Result<(), GraphError> {
        Err(GraphError::UnsupportedOperation)
    }

    /// Node removal is not supported.
    pub fn remove_node(&mut self, _node: NodeIndex) -> Result<(), GraphError> {
        Err(GraphError::UnsupportedOperation)
    }

    /// The node `arc` leaves.
    pub fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        Some(self.arcs.get(arc.index())?.0)
    }

    /// The node `arc` enters.
    pub fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        Some(self.arcs.get(arc.index())?.1)
    }

    /// Iterates over the arcs leaving `node`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `node` has not been added.
    pub fn outgoing(&self, node: NodeIndex) -> AdjacentArcs<'_> {
        self.nodes[node.index()].iter().copied()
    }

    /// Returns the number of arcs leaving `node`.
    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.nodes[node.index()].len()
    }
}

impl Graph for StaticOutArcDiGraph {
    type Nodes<'a> = IndexRange<NodeIndex> where Self: 'a;

    fn node_count(&self) -> usize {
        StaticOutArcDiGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        StaticOutArcDiGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        StaticOutArcDiGraph::nodes(self)
    }
}

impl MutableGraph for StaticOutArcDiGraph {
    fn add_node(&mut self) -> NodeIndex {
        StaticOutArcDiGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        StaticOutArcDiGraph::remove_node(self, node)
    }
}

impl NodeMaps for StaticOutArcDiGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for StaticOutArcDiGraph {
    type EdgeKey = EdgeIndex;
    type EdgeMap<V: 'static> = EntityMap<EdgeIndex, V>;

    fn edge_registry(&self) -> &HandlerRegistry<EdgeIndex> {
        &self.arc_handlers
    }

    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<EdgeIndex> {
        &mut self.arc_handlers
    }
}
