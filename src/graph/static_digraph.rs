//! The append-only directed multigraph.

use std::iter::{Chain, Copied, Map};
use std::ops::Range;
use std::slice;

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::{DirectedEdges, EdgeMaps, Graph, MutableGraph, NodeMaps};
use crate::memory::EntityIndex;
use crate::{EdgeIndex, EntityMap, GraphError, NodeIndex};

/// Cursor over the dense handle range of an append-only graph.
pub type IndexRange<K> = Map<Range<usize>, fn(usize) -> K>;

pub(crate) fn index_range<K: EntityIndex>(len: usize) -> IndexRange<K> {
    (0..len).map(<K as EntityIndex>::new as fn(usize) -> K)
}

/// Cursor over one node's adjacency vector.
pub type AdjacentArcs<'a> = Copied<slice::Iter<'a, EdgeIndex>>;

/// Incidence cursor over one node's arcs, outgoing first.
pub type IncidentArcs<'a> = Chain<AdjacentArcs<'a>, AdjacentArcs<'a>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeRecord {
    out: Vec<EdgeIndex>,
    inc: Vec<EdgeIndex>,
}

/// An append-only directed multigraph with dense sequential handles.
///
/// Handles are handed out in order and never recycled; adjacency is a plain
/// vector per node and direction, so traversal is as cache-friendly as it
/// gets. Removal of nodes or arcs reports
/// [`GraphError::UnsupportedOperation`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaticDiGraph {
    nodes: Vec<NodeRecord>,
    arcs: Vec<(NodeIndex, NodeIndex)>,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    arc_handlers: HandlerRegistry<EdgeIndex>,
}

impl StaticDiGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with capacity for `nodes` nodes and `arcs`
    /// arcs.
    pub fn with_capacity(nodes: usize, arcs: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            arcs: Vec::with_capacity(arcs),
            ..Self::default()
        }
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
        self.nodes.push(NodeRecord::default());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an arc from `source` to `target` and returns the next
    /// sequential handle.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint has not been added.
    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        let arc = EdgeIndex::new(self.arcs.len());
        self.nodes[source.index()].out.push(arc);
        self.nodes[target.index()].inc.push(arc);
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
        self.nodes[node.index()].out.iter().copied()
    }

    /// Iterates over the arcs entering `node`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `node` has not been added.
    pub fn incoming(&self, node: NodeIndex) -> AdjacentArcs<'_> {
        self.nodes[node.index()].inc.iter().copied()
    }

    /// Iterates over the arcs incident to `node`, outgoing then incoming.
    ///
    /// A self-loop shows up twice, once per attachment.
    ///
    /// # Panics
    ///
    /// Panics when `node` has not been added.
    pub fn incident_arcs(&self, node: NodeIndex) -> IncidentArcs<'_> {
        self.outgoing(node).chain(self.incoming(node))
    }

    /// Returns the number of arcs leaving `node`.
    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.nodes[node.index()].out.len()
    }

    /// Returns the number of arcs entering `node`.
    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.nodes[node.index()].inc.len()
    }
}

impl Graph for StaticDiGraph {
    type Nodes<'a> = IndexRange<NodeIndex> where Self: 'a;

    fn node_count(&self) -> usize {
        StaticDiGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        StaticDiGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        StaticDiGraph::nodes(self)
    }
}

impl MutableGraph for StaticDiGraph {
    fn add_node(&mut self) -> NodeIndex {
        StaticDiGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        StaticDiGraph::remove_node(self, node)
    }
}

impl DirectedEdges for StaticDiGraph {
    type Arcs<'a> = IndexRange<EdgeIndex> where Self: 'a;
    type NodeArcs<'a> = AdjacentArcs<'a> where Self: 'a;
    type IncidentArcs<'a> = IncidentArcs<'a> where Self: 'a;

    fn arc_count(&self) -> usize {
        StaticDiGraph::arc_count(self)
    }

    fn contains_arc(&self, arc: EdgeIndex) -> bool {
        StaticDiGraph::contains_arc(self, arc)
    }

    fn arcs(&self) -> Self::Arcs<'_> {
        StaticDiGraph::arcs(self)
    }

    fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        StaticDiGraph::source(self, arc)
    }

    fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        StaticDiGraph::target(self, arc)
    }

    fn outgoing(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        StaticDiGraph::outgoing(self, node)
    }

    fn incoming(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        StaticDiGraph::incoming(self, node)
    }

    fn incident_arcs(&self, node: NodeIndex) -> Self::IncidentArcs<'_> {
        StaticDiGraph::incident_arcs(self, node)
    }

    fn out_degree(&self, node: NodeIndex) -> usize {
        StaticDiGraph::out_degree(self, node)
    }

    fn in_degree(&self, node: NodeIndex) -> usize {
        StaticDiGraph::in_degree(self, node)
    }
}

impl NodeMaps for StaticDiGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for StaticDiGraph {
    type EdgeKey = EdgeIndex;
    type EdgeMap<V: 'static> = EntityMap<EdgeIndex, V>;

    fn edge_registry(&self) -> &HandlerRegistry<EdgeIndex> {
        &self.arc_handlers
    }

    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<EdgeIndex> {
        &mut self.arc_handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_dense_and_sequential() {
        let mut graph = StaticDiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();

        assert_eq!(n0, NodeIndex::new(0));
        assert_eq!(n2, NodeIndex::new(2));

        let a = graph.add_arc(n0, n1);
        let b = graph.add_arc(n0, n2);

        assert_eq!(a, EdgeIndex::new(0));
        assert_eq!(b, EdgeIndex::new(1));
        assert!(graph.nodes().eq([n0, n1, n2]));
        assert!(graph.arcs().eq([a, b]));
    }

    #[test]
    fn adjacency_follows_insertion_order() {
        let mut graph = StaticDiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();

        let a = graph.add_arc(n0, n1);
        let b = graph.add_arc(n0, n1);
        let c = graph.add_arc(n1, n0);

        assert!(graph.outgoing(n0).eq([a, b]));
        assert!(graph.incoming(n1).eq([a, b]));
        assert!(graph.incoming(n0).eq([c]));
        assert!(graph.incident_arcs(n0).eq([a, b, c]));
        assert_eq!(graph.out_degree(n0), 2);
        assert_eq!(graph.in_degree(n0), 1);
    }

    #[test]
    fn removal_is_rejected() {
        let mut graph = StaticDiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let a = graph.add_arc(n0, n1);

        assert_eq!(graph.remove_node(n0), Err(GraphError::UnsupportedOperation));
        assert_eq!(graph.remove_arc(a), Err(GraphError::UnsupportedOperation));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.arc_count(), 1);
    }

    #[test]
    fn maps_see_additions() {
        let mut graph = StaticDiGraph::new();
        let token = graph.create_node_map::<u32>();

        let n0 = graph.add_node();
        graph.node_map_mut(token).unwrap().put(n0, 42);

        assert_eq!(graph.node_map(token).unwrap().get(n0), Some(&42));
    }
}
