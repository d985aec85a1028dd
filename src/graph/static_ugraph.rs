//! The append-only undirected multigraph.

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::static_digraph::{index_range, AdjacentArcs, IndexRange};
use crate::graph::{EdgeMaps, Graph, MutableGraph, NodeMaps, UndirectedEdges};
use crate::memory::EntityIndex;
use crate::{EdgeIndex, EntityMap, GraphError, NodeIndex};

/// An append-only undirected multigraph with dense sequential handles.
///
/// Each node keeps a single incidence vector; a self-loop is appended to it
/// twice, so degrees and incidence traversal agree with the mutable
/// [`UGraph`](crate::UGraph). Removal reports
/// [`GraphError::UnsupportedOperation`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaticUGraph {
    nodes: Vec<Vec<EdgeIndex>>,
    uedges: Vec<(NodeIndex, NodeIndex)>,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    uedge_handlers: HandlerRegistry<EdgeIndex>,
}

impl StaticUGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn uedge_count(&self) -> usize {
        self.uedges.len()
    }

    /// Returns whether `node` has been added.
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        node.index() < self.nodes.len()
    }

    /// Returns whether `uedge` has been added.
    pub fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        uedge.index() < self.uedges.len()
    }

    /// Iterates over the node handles, in insertion order.
    pub fn nodes(&self) -> IndexRange<NodeIndex> {
        index_range(self.nodes.len())
    }

    /// Iterates over the edge handles, in insertion order.
    pub fn uedges(&self) -> IndexRange<EdgeIndex> {
        index_range(self.uedges.len())
    }

    /// Adds an isolated node and returns the next sequential handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = NodeIndex::new(self.nodes.len());
        self.nodes.push(Vec::new());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an edge between `u` and `v` and returns the next sequential
    /// handle.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint has not been added.
    pub fn add_uedge(&mut self, u: NodeIndex, v: NodeIndex) -> EdgeIndex {
        let uedge = EdgeIndex::new(self.uedges.len());
        self.nodes[u.index()].push(uedge);
        self.nodes[v.index()].push(uedge);
        self.uedges.push((u, v));
        self.uedge_handlers.notify_add(uedge);
        uedge
    }

    /// Edge removal is not supported.
    pub fn remove_uedge(&mut self, _uedge: EdgeIndex) -> Result<(), GraphError> {
        Err(GraphError::UnsupportedOperation)
    }

    /// Node removal is not supported.
    pub fn remove_node(&mut self, _node: NodeIndex) -> Result<(), GraphError> {
        Err(GraphError::UnsupportedOperation)
    }

    /// The endpoints of `uedge`, in insertion order.
    pub fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.uedges.get(uedge.index()).copied()
    }

    /// Iterates over the edges incident to `node`, oldest first.
    ///
    /// A self-loop shows up twice.
    ///
    /// # Panics
    ///
    /// Panics when `node` has not been added.
    pub fn incident_uedges(&self, node: NodeIndex) -> AdjacentArcs<'_> {
        self.nodes[node.index()].iter().copied()
    }

    /// Returns the degree of `node`, counting self-loops twice.
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.nodes[node.index()].len()
    }
}

impl Graph for StaticUGraph {
    type Nodes<'a> = IndexRange<NodeIndex> where Self: 'a;

    fn node_count(&self) -> usize {
        StaticUGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        StaticUGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        StaticUGraph::nodes(self)
    }
}

impl MutableGraph for StaticUGraph {
    fn add_node(&mut self) -> NodeIndex {
        StaticUGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        StaticUGraph::remove_node(self, node)
    }
}

impl UndirectedEdges for StaticUGraph {
    type UEdges<'a> = IndexRange<EdgeIndex> where Self: 'a;
    type NodeUEdges<'a> = AdjacentArcs<'a> where Self: 'a;

    fn uedge_count(&self) -> usize {
        StaticUGraph::uedge_count(self)
    }

    fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        StaticUGraph::contains_uedge(self, uedge)
    }

    fn uedges(&self) -> Self::UEdges<'_> {
        StaticUGraph::uedges(self)
    }

    fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        StaticUGraph::uedge_ends(self, uedge)
    }

    fn incident_uedges(&self, node: NodeIndex) -> Self::NodeUEdges<'_> {
        StaticUGraph::incident_uedges(self, node)
    }

    fn degree(&self, node: NodeIndex) -> usize {
        StaticUGraph::degree(self, node)
    }
}

impl NodeMaps for StaticUGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for StaticUGraph {
    type EdgeKey = EdgeIndex;
    type EdgeMap<V: 'static> = EntityMap<EdgeIndex, V>;

    fn edge_registry(&self) -> &HandlerRegistry<EdgeIndex> {
        &self.uedge_handlers
    }

    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<EdgeIndex> {
        &mut self.uedge_handlers
    }
}
