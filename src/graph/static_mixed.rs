//! The append-only mixed multigraph.

use std::iter::{Chain, Map};

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::mixed::MixedEdgeMap;
use crate::graph::static_digraph::{index_range, AdjacentArcs, IncidentArcs, IndexRange};
use crate::graph::{
    DirectedEdges, EdgeMaps, Graph, MixedEdges, MutableGraph, NodeMaps, UndirectedEdges,
};
use crate::memory::EntityIndex;
use crate::{EdgeIndex, GraphError, MixedEdge, NodeIndex};

type Tag = fn(EdgeIndex) -> MixedEdge;

/// Cursor over all edges of a [`StaticMixedGraph`], arcs first.
pub type MixedIndexRange = Chain<Map<IndexRange<EdgeIndex>, Tag>, Map<IndexRange<EdgeIndex>, Tag>>;

/// Incidence cursor over one node's edges of both kinds, arcs first.
pub type IncidentEdges<'a> = Chain<
    Chain<Map<AdjacentArcs<'a>, Tag>, Map<AdjacentArcs<'a>, Tag>>,
    Map<AdjacentArcs<'a>, Tag>,
>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeRecord {
    out: Vec<EdgeIndex>,
    inc: Vec<EdgeIndex>,
    ue: Vec<EdgeIndex>,
}

/// An append-only mixed multigraph with dense sequential handles.
///
/// Arcs and undirected edges are numbered independently; handles crossing
/// the combined surface carry the [`MixedEdge`] tag. Removal reports
/// [`GraphError::UnsupportedOperation`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaticMixedGraph {
    nodes: Vec<NodeRecord>,
    arcs: Vec<(NodeIndex, NodeIndex)>,
    uedges: Vec<(NodeIndex, NodeIndex)>,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    edge_handlers: HandlerRegistry<MixedEdge>,
}

impl StaticMixedGraph {
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

    /// Returns the number of undirected edges.
    pub fn uedge_count(&self) -> usize {
        self.uedges.len()
    }

    /// Returns the number of edges of both kinds.
    pub fn edge_count(&self) -> usize {
        self.arcs.len() + self.uedges.len()
    }

    /// Returns whether `node` has been added.
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        node.index() < self.nodes.len()
    }

    /// Returns whether `arc` has been added.
    pub fn contains_arc(&self, arc: EdgeIndex) -> bool {
        arc.index() < self.arcs.len()
    }

    /// Returns whether `uedge` has been added.
    pub fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        uedge.index() < self.uedges.len()
    }

    /// Iterates over the node handles, in insertion order.
    pub fn nodes(&self) -> IndexRange<NodeIndex> {
        index_range(self.nodes.len())
    }

    /// Iterates over the arc handles, in insertion order.
    pub fn arcs(&self) -> IndexRange<EdgeIndex> {
        index_range(self.arcs.len())
    }

    /// Iterates over the undirected edge handles, in insertion order.
    pub fn uedges(&self) -> IndexRange<EdgeIndex> {
        index_range(self.uedges.len())
    }

    /// Iterates over all edge handles, arcs first.
    pub fn edges(&self) -> MixedIndexRange {
        self.arcs()
            .map(MixedEdge::Arc as Tag)
            .chain(self.uedges().map(MixedEdge::UEdge as Tag))
    }

    /// Adds an isolated node and returns the next sequential handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = NodeIndex::new(self.nodes.len());
        self.nodes.push(NodeRecord::default());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an arc from `source` to `target`.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint has not been added.
    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        let arc = EdgeIndex::new(self.arcs.len());
        self.nodes[source.index()].out.push(arc);
        self.nodes[target.index()].inc.push(arc);
        self.arcs.push((source, target));
        self.edge_handlers.notify_add(MixedEdge::Arc(arc));
        arc
    }

    /// Adds an undirected edge between `u` and `v`.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint has not been added.
    pub fn add_uedge(&mut self, u: NodeIndex, v: NodeIndex) -> EdgeIndex {
        let uedge = EdgeIndex::new(self.uedges.len());
        self.nodes[u.index()].ue.push(uedge);
        self.nodes[v.index()].ue.push(uedge);
        self.uedges.push((u, v));
        self.edge_handlers.notify_add(MixedEdge::UEdge(uedge));
        uedge
    }

    /// Edge removal is not supported.
    pub fn remove_edge(&mut self, _edge: MixedEdge) -> Result<(), GraphError> {
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

    /// The endpoints of `uedge`, in insertion order.
    pub fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.uedges.get(uedge.index()).copied()
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

    /// Iterates over the undirected edges incident to `node`.
    ///
    /// # Panics
    ///
    /// Panics when `node` has not been added.
    pub fn incident_uedges(&self, node: NodeIndex) -> AdjacentArcs<'_> {
        self.nodes[node.index()].ue.iter().copied()
    }

    /// Iterates over the edges incident to `node`, arcs first.
    ///
    /// # Panics
    ///
    /// Panics when `node` has not been added.
    pub fn incident_edges(&self, node: NodeIndex) -> IncidentEdges<'_> {
        self.outgoing(node)
            .map(MixedEdge::Arc as Tag)
            .chain(self.incoming(node).map(MixedEdge::Arc as Tag))
            .chain(self.incident_uedges(node).map(MixedEdge::UEdge as Tag))
    }
}

impl Graph for StaticMixedGraph {
    type Nodes<'a> = IndexRange<NodeIndex> where Self: 'a;

    fn node_count(&self) -> usize {
        StaticMixedGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        StaticMixedGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        StaticMixedGraph::nodes(self)
    }
}

impl MutableGraph for StaticMixedGraph {
    fn add_node(&mut self) -> NodeIndex {
        StaticMixedGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        StaticMixedGraph::remove_node(self, node)
    }
}

impl DirectedEdges for StaticMixedGraph {
    type Arcs<'a> = IndexRange<EdgeIndex> where Self: 'a;
    type NodeArcs<'a> = AdjacentArcs<'a> where Self: 'a;
    type IncidentArcs<'a> = IncidentArcs<'a> where Self: 'a;

    fn arc_count(&self) -> usize {
        StaticMixedGraph::arc_count(self)
    }

    fn contains_arc(&self, arc: EdgeIndex) -> bool {
        StaticMixedGraph::contains_arc(self, arc)
    }

    fn arcs(&self) -> Self::Arcs<'_> {
        StaticMixedGraph::arcs(self)
    }

    fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        StaticMixedGraph::source(self, arc)
    }

    fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        StaticMixedGraph::target(self, arc)
    }

    fn outgoing(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        StaticMixedGraph::outgoing(self, node)
    }

    fn incoming(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        StaticMixedGraph::incoming(self, node)
    }

    fn incident_arcs(&self, node: NodeIndex) -> Self::IncidentArcs<'_> {
        StaticMixedGraph::incident_arcs(self, node)
    }
}

impl UndirectedEdges for StaticMixedGraph {
    type UEdges<'a> = IndexRange<EdgeIndex> where Self: 'a;
    type NodeUEdges<'a> = AdjacentArcs<'a> where Self: 'a;

    fn uedge_count(&self) -> usize {
        StaticMixedGraph::uedge_count(self)
    }

    fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        StaticMixedGraph::contains_uedge(self, uedge)
    }

    fn uedges(&self) -> Self::UEdges<'_> {
        StaticMixedGraph::uedges(self)
    }

    fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        StaticMixedGraph::uedge_ends(self, uedge)
    }

    fn incident_uedges(&self, node: NodeIndex) -> Self::NodeUEdges<'_> {
        StaticMixedGraph::incident_uedges(self, node)
    }
}

impl MixedEdges for StaticMixedGraph {
    type Edges<'a> = MixedIndexRange where Self: 'a;
    type NodeEdges<'a> = IncidentEdges<'a> where Self: 'a;

    fn edges(&self) -> Self::Edges<'_> {
        StaticMixedGraph::edges(self)
    }

    fn incident_edges(&self, node: NodeIndex) -> Self::NodeEdges<'_> {
        StaticMixedGraph::incident_edges(self, node)
    }
}

impl NodeMaps for StaticMixedGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for StaticMixedGraph {
    type EdgeKey = MixedEdge;
    type EdgeMap<V: 'static> = MixedEdgeMap<V>;

    fn edge_registry(&self) -> &HandlerRegistry<MixedEdge> {
        &self.edge_handlers
    }

    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<MixedEdge> {
        &mut self.edge_handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_kinds_number_independently() {
        let mut graph = StaticMixedGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();

        let a = graph.add_arc(n0, n1);
        let e = graph.add_uedge(n0, n1);

        assert_eq!(a, EdgeIndex::new(0));
        assert_eq!(e, EdgeIndex::new(0));
        assert_eq!(graph.edge_count(), 2);
        assert!(graph
            .edges()
            .eq([MixedEdge::Arc(a), MixedEdge::UEdge(e)]));
    }

    #[test]
    fn incident_edges_visit_arcs_then_uedges() {
        let mut graph = StaticMixedGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();

        let out = graph.add_arc(n0, n1);
        let inc = graph.add_arc(n1, n0);
        let e = graph.add_uedge(n0, n1);

        assert!(graph.incident_edges(n0).eq([
            MixedEdge::Arc(out),
            MixedEdge::Arc(inc),
            MixedEdge::UEdge(e),
        ]));
        assert!(graph.incident_arcs(n0).eq([out, inc]));
    }

    #[test]
    fn removal_is_rejected() {
        let mut graph = StaticMixedGraph::new();
        let n0 = graph.add_node();
        let a = graph.add_arc(n0, n0);

        assert_eq!(graph.remove_node(n0), Err(GraphError::UnsupportedOperation));
        assert_eq!(
            graph.remove_edge(MixedEdge::Arc(a)),
            Err(GraphError::UnsupportedOperation)
        );
    }
}
