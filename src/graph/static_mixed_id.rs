//! The caller-addressed mixed multigraph.

use std::iter::{Chain, Map};

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::mixed::MixedEdgeMap;
use crate::graph::{
    DirectedEdges, EdgeMaps, Graph, MixedEdges, MutableGraph, NodeMaps, UndirectedEdges,
};
use crate::lace::{ArcLace, ArcRecord, ArcSide, CombinedAnchors, LaceArcs, UEdgeSide};
use crate::memory::static_arena;
use crate::{Direction, EdgeIndex, GraphError, MixedEdge, NodeIndex, StaticArena};

type EdgeStore = StaticArena<EdgeIndex, ArcRecord>;
type Tag = fn(EdgeIndex) -> MixedEdge;

/// Cursor over all edges of a [`StaticMixedIdGraph`], arcs first.
pub type MixedEdgeIndices<'a> = Chain<
    Map<static_arena::Keys<'a, EdgeIndex, ArcRecord>, Tag>,
    Map<static_arena::Keys<'a, EdgeIndex, ArcRecord>, Tag>,
>;

/// Incidence cursor over one node's arcs, outgoing first.
pub type IncidentArcs<'a> = Chain<LaceArcs<'a, EdgeStore>, LaceArcs<'a, EdgeStore>>;

/// Incidence cursor over one node's undirected edges.
pub type IncidentUEdges<'a> = Chain<LaceArcs<'a, EdgeStore>, LaceArcs<'a, EdgeStore>>;

/// Incidence cursor over one node's edges of both kinds, arcs first.
pub type IncidentEdges<'a> = Chain<
    Chain<Map<LaceArcs<'a, EdgeStore>, Tag>, Map<LaceArcs<'a, EdgeStore>, Tag>>,
    Chain<Map<LaceArcs<'a, EdgeStore>, Tag>, Map<LaceArcs<'a, EdgeStore>, Tag>>,
>;

/// A mixed multigraph whose handles are chosen by the caller.
///
/// The `*_with_id` operations store entities under explicit handles, which
/// makes the graph suitable for building an isomorphic copy of a subgraph:
/// copy each node and edge under the handle it has in the original and
/// every cross-reference stays valid. Handles that are already live are
/// rejected with [`GraphError::DuplicateKey`]. The plain `add_*` operations
/// pick the next handle past everything ever stored.
///
/// Unlike the other static graphs this one supports removal; vacated
/// handles are not recycled by the sequential allocator.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaticMixedIdGraph {
    nodes: StaticArena<NodeIndex, CombinedAnchors>,
    arcs: ArcLace<EdgeStore>,
    uedges: ArcLace<EdgeStore>,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    edge_handlers: HandlerRegistry<MixedEdge>,
}

impl StaticMixedIdGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.arc_count()
    }

    /// Returns the number of live undirected edges.
    pub fn uedge_count(&self) -> usize {
        self.uedges.arc_count()
    }

    /// Returns the number of live edges of both kinds.
    pub fn edge_count(&self) -> usize {
        self.arc_count() + self.uedge_count()
    }

    /// Returns whether `node` is live.
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.nodes.contains(node)
    }

    /// Returns whether `arc` is a live directed arc.
    pub fn contains_arc(&self, arc: EdgeIndex) -> bool {
        self.arcs.contains_arc(arc)
    }

    /// Returns whether `uedge` is a live undirected edge.
    pub fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        self.uedges.contains_arc(uedge)
    }

    /// Iterates over the live nodes in the order they most recently became
    /// live.
    pub fn nodes(&self) -> static_arena::Keys<'_, NodeIndex, CombinedAnchors> {
        self.nodes.keys()
    }

    /// Iterates over the live arcs.
    pub fn arcs(&self) -> static_arena::Keys<'_, EdgeIndex, ArcRecord> {
        self.arcs.arc_indices()
    }

    /// Iterates over the live undirected edges.
    pub fn uedges(&self) -> static_arena::Keys<'_, EdgeIndex, ArcRecord> {
        self.uedges.arc_indices()
    }

    /// Iterates over all live edges, arcs first.
    pub fn edges(&self) -> MixedEdgeIndices<'_> {
        self.arcs
            .arc_indices()
            .map(MixedEdge::Arc as Tag)
            .chain(self.uedges.arc_indices().map(MixedEdge::UEdge as Tag))
    }

    /// Adds an isolated node under the caller-chosen handle `node`.
    ///
    /// Fails with [`GraphError::DuplicateKey`] when `node` is already live.
    pub fn add_node_with_id(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        if self.nodes.contains(node) {
            return Err(GraphError::DuplicateKey);
        }
        self.nodes.put(node, CombinedAnchors::default());
        self.node_handlers.notify_add(node);
        Ok(())
    }

    /// Adds an isolated node under the next handle past everything ever
    /// stored.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = self.nodes.upper_bound();
        self.nodes.put(node, CombinedAnchors::default());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an arc from `source` to `target` under the caller-chosen handle
    /// `arc`.
    ///
    /// Fails with [`GraphError::DuplicateKey`] when `arc` is already live.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_arc_with_id(
        &mut self,
        arc: EdgeIndex,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Result<(), GraphError> {
        self.arcs
            .put_arc(&mut ArcSide(&mut self.nodes), arc, source, target)?;
        self.edge_handlers.notify_add(MixedEdge::Arc(arc));
        Ok(())
    }

    /// Adds an arc under the next handle past everything ever stored.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        let arc = self.arcs.arc_upper_bound();
        // Handle past the upper bound, cannot collide.
        self.add_arc_with_id(arc, source, target)
            .expect("handle past the upper bound is free");
        arc
    }

    /// Adds an undirected edge between `u` and `v` under the caller-chosen
    /// handle `uedge`.
    ///
    /// Fails with [`GraphError::DuplicateKey`] when `uedge` is already live.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_uedge_with_id(
        &mut self,
        uedge: EdgeIndex,
        u: NodeIndex,
        v: NodeIndex,
    ) -> Result<(), GraphError> {
        self.uedges
            .put_arc(&mut UEdgeSide(&mut self.nodes), uedge, u, v)?;
        self.edge_handlers.notify_add(MixedEdge::UEdge(uedge));
        Ok(())
    }

    /// Adds an undirected edge under the next handle past everything ever
    /// stored.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_uedge(&mut self, u: NodeIndex, v: NodeIndex) -> EdgeIndex {
        let uedge = self.uedges.arc_upper_bound();
        self.add_uedge_with_id(uedge, u, v)
            .expect("handle past the upper bound is free");
        uedge
    }

    /// Removes `edge` of either kind, notifying edge maps first.
    ///
    /// Removing a handle that is not live is a no-op.
    pub fn remove_edge(&mut self, edge: MixedEdge) -> Result<(), GraphError> {
        match edge {
            MixedEdge::Arc(arc) => {
                if self.arcs.contains_arc(arc) {
                    self.edge_handlers.notify_remove(edge);
                    self.arcs.remove_arc(&mut ArcSide(&mut self.nodes), arc);
                }
            }
            MixedEdge::UEdge(uedge) => {
                if self.uedges.contains_arc(uedge) {
                    self.edge_handlers.notify_remove(edge);
                    self.uedges
                        .remove_arc(&mut UEdgeSide(&mut self.nodes), uedge);
                }
            }
        }
        Ok(())
    }

    /// Removes `node` together with every incident edge of both kinds.
    ///
    /// Removing a handle that is not live is a no-op. The vacated handle is
    /// only reused when the caller stores to it again.
    pub fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        if !self.nodes.contains(node) {
            return Ok(());
        }
        for direction in Direction::ALL {
            while let Some(arc) = self.nodes[node].arc.first(direction) {
                self.remove_edge(MixedEdge::Arc(arc))?;
            }
        }
        for direction in Direction::ALL {
            while let Some(uedge) = self.nodes[node].uedge.first(direction) {
                self.remove_edge(MixedEdge::UEdge(uedge))?;
            }
        }
        self.node_handlers.notify_remove(node);
        self.nodes.remove(node);
        Ok(())
    }

    /// The node `arc` leaves.
    pub fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        self.arcs.source(arc)
    }

    /// The node `arc` enters.
    pub fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        self.arcs.target(arc)
    }

    /// The endpoints of `uedge`, in insertion order.
    pub fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        Some((self.uedges.source(uedge)?, self.uedges.target(uedge)?))
    }

    /// Iterates over the arcs leaving `node`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn outgoing(&self, node: NodeIndex) -> LaceArcs<'_, EdgeStore> {
        self.arcs.arcs(&self.nodes[node].arc, Direction::Outgoing)
    }

    /// Iterates over the arcs entering `node`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn incoming(&self, node: NodeIndex) -> LaceArcs<'_, EdgeStore> {
        self.arcs.arcs(&self.nodes[node].arc, Direction::Incoming)
    }

    /// Iterates over the arcs incident to `node`, outgoing then incoming.
    ///
    /// A self-loop shows up twice, once per attachment.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn incident_arcs(&self, node: NodeIndex) -> IncidentArcs<'_> {
        self.outgoing(node).chain(self.incoming(node))
    }

    /// Iterates over the undirected edges incident to `node`.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn incident_uedges(&self, node: NodeIndex) -> IncidentUEdges<'_> {
        let anchors = &self.nodes[node].uedge;
        self.uedges
            .arcs(anchors, Direction::Outgoing)
            .chain(self.uedges.arcs(anchors, Direction::Incoming))
    }

    /// Iterates over the edges incident to `node`, arcs first.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn incident_edges(&self, node: NodeIndex) -> IncidentEdges<'_> {
        let anchors = &self.nodes[node];
        let arcs = self
            .arcs
            .arcs(&anchors.arc, Direction::Outgoing)
            .map(MixedEdge::Arc as Tag)
            .chain(
                self.arcs
                    .arcs(&anchors.arc, Direction::Incoming)
                    .map(MixedEdge::Arc as Tag),
            );
        let uedges = self
            .uedges
            .arcs(&anchors.uedge, Direction::Outgoing)
            .map(MixedEdge::UEdge as Tag)
            .chain(
                self.uedges
                    .arcs(&anchors.uedge, Direction::Incoming)
                    .map(MixedEdge::UEdge as Tag),
            );
        arcs.chain(uedges)
    }
}

impl Graph for StaticMixedIdGraph {
    type Nodes<'a> = static_arena::Keys<'a, NodeIndex, CombinedAnchors> where Self: 'a;

    fn node_count(&self) -> usize {
        StaticMixedIdGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        StaticMixedIdGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        StaticMixedIdGraph::nodes(self)
    }
}

impl MutableGraph for StaticMixedIdGraph {
    fn add_node(&mut self) -> NodeIndex {
        StaticMixedIdGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        StaticMixedIdGraph::remove_node(self, node)
    }
}

impl DirectedEdges for StaticMixedIdGraph {
    type Arcs<'a> = static_arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;
    type NodeArcs<'a> = LaceArcs<'a, EdgeStore> where Self: 'a;
    type IncidentArcs<'a> = IncidentArcs<'a> where Self: 'a;

    fn arc_count(&self) -> usize {
        StaticMixedIdGraph::arc_count(self)
    }

    fn contains_arc(&self, arc: EdgeIndex) -> bool {
        StaticMixedIdGraph::contains_arc(self, arc)
    }

    fn arcs(&self) -> Self::Arcs<'_> {
        StaticMixedIdGraph::arcs(self)
    }

    fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        StaticMixedIdGraph::source(self, arc)
    }

    fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        StaticMixedIdGraph::target(self, arc)
    }

    fn outgoing(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        StaticMixedIdGraph::outgoing(self, node)
    }

    fn incoming(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        StaticMixedIdGraph::incoming(self, node)
    }

    fn incident_arcs(&self, node: NodeIndex) -> Self::IncidentArcs<'_> {
        StaticMixedIdGraph::incident_arcs(self, node)
    }
}

impl UndirectedEdges for StaticMixedIdGraph {
    type UEdges<'a> = static_arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;
    type NodeUEdges<'a> = IncidentUEdges<'a> where Self: 'a;

    fn uedge_count(&self) -> usize {
        StaticMixedIdGraph::uedge_count(self)
    }

    fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        StaticMixedIdGraph::contains_uedge(self, uedge)
    }

    fn uedges(&self) -> Self::UEdges<'_> {
        StaticMixedIdGraph::uedges(self)
    }

    fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        StaticMixedIdGraph::uedge_ends(self, uedge)
    }

    fn incident_uedges(&self, node: NodeIndex) -> Self::NodeUEdges<'_> {
        StaticMixedIdGraph::incident_uedges(self, node)
    }
}

impl MixedEdges for StaticMixedIdGraph {
    type Edges<'a> = MixedEdgeIndices<'a> where Self: 'a;
    type NodeEdges<'a> = IncidentEdges<'a> where Self: 'a;

    fn edges(&self) -> Self::Edges<'_> {
        StaticMixedIdGraph::edges(self)
    }

    fn incident_edges(&self, node: NodeIndex) -> Self::NodeEdges<'_> {
        StaticMixedIdGraph::incident_edges(self, node)
    }
}

impl NodeMaps for StaticMixedIdGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for StaticMixedIdGraph {
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
    use crate::memory::EntityIndex;

    fn n(index: usize) -> NodeIndex {
        NodeIndex::new(index)
    }

    fn e(index: usize) -> EdgeIndex {
        EdgeIndex::new(index)
    }

    #[test]
    fn entities_live_under_the_handles_the_caller_picked() {
        let mut graph = StaticMixedIdGraph::new();
        graph.add_node_with_id(n(4)).unwrap();
        graph.add_node_with_id(n(9)).unwrap();
        graph.add_arc_with_id(e(2), n(4), n(9)).unwrap();
        graph.add_uedge_with_id(e(2), n(9), n(4)).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.source(e(2)), Some(n(4)));
        assert_eq!(graph.uedge_ends(e(2)), Some((n(9), n(4))));
        assert!(graph.outgoing(n(4)).eq([e(2)]));
        assert!(graph.incident_arcs(n(9)).eq([e(2)]));
    }

    #[test]
    fn live_handles_are_rejected() {
        let mut graph = StaticMixedIdGraph::new();
        graph.add_node_with_id(n(0)).unwrap();
        graph.add_node_with_id(n(1)).unwrap();
        graph.add_arc_with_id(e(0), n(0), n(1)).unwrap();

        assert_eq!(
            graph.add_node_with_id(n(0)),
            Err(GraphError::DuplicateKey)
        );
        assert_eq!(
            graph.add_arc_with_id(e(0), n(1), n(0)),
            Err(GraphError::DuplicateKey)
        );

        // Nothing was disturbed by the rejected inserts.
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.source(e(0)), Some(n(0)));
        assert!(graph.outgoing(n(0)).eq([e(0)]));
    }

    #[test]
    fn sequential_handles_skip_everything_ever_stored() {
        let mut graph = StaticMixedIdGraph::new();
        graph.add_node_with_id(n(5)).unwrap();

        assert_eq!(graph.add_node(), n(6));
        assert_eq!(graph.add_node(), n(7));
    }

    #[test]
    fn vacated_handles_can_be_restored() {
        let mut graph = StaticMixedIdGraph::new();
        graph.add_node_with_id(n(0)).unwrap();
        graph.add_node_with_id(n(1)).unwrap();
        graph.add_arc_with_id(e(0), n(0), n(1)).unwrap();

        graph.remove_edge(MixedEdge::Arc(e(0))).unwrap();
        graph.add_arc_with_id(e(0), n(1), n(0)).unwrap();

        assert_eq!(graph.source(e(0)), Some(n(1)));
    }

    #[test]
    fn node_removal_cascades_over_both_kinds() {
        let mut graph = StaticMixedIdGraph::new();
        for index in 0..3 {
            graph.add_node_with_id(n(index)).unwrap();
        }
        graph.add_arc_with_id(e(0), n(0), n(1)).unwrap();
        graph.add_uedge_with_id(e(0), n(1), n(2)).unwrap();
        graph.add_uedge_with_id(e(1), n(0), n(2)).unwrap();

        graph.remove_node(n(1)).unwrap();

        assert_eq!(graph.arc_count(), 0);
        assert_eq!(graph.uedge_count(), 1);
        assert!(graph.contains_uedge(e(1)));
        assert!(!graph.contains_node(n(1)));
    }

    #[test]
    fn subgraph_copy_preserves_handles() {
        let mut graph = StaticMixedIdGraph::new();
        for index in 0..4 {
            graph.add_node_with_id(n(index)).unwrap();
        }
        graph.add_arc_with_id(e(0), n(0), n(1)).unwrap();
        graph.add_arc_with_id(e(1), n(1), n(2)).unwrap();
        graph.add_arc_with_id(e(2), n(2), n(3)).unwrap();

        // Copy the subgraph induced by nodes 1 and 2.
        let mut copy = StaticMixedIdGraph::new();
        for node in [n(1), n(2)] {
            copy.add_node_with_id(node).unwrap();
        }
        for arc in graph.arcs() {
            let (source, target) = (
                graph.source(arc).unwrap(),
                graph.target(arc).unwrap(),
            );
            if copy.contains_node(source) && copy.contains_node(target) {
                copy.add_arc_with_id(arc, source, target).unwrap();
            }
        }

        assert_eq!(copy.arc_count(), 1);
        assert_eq!(copy.source(e(1)), Some(n(1)));
        assert_eq!(copy.target(e(1)), Some(n(2)));
    }
}
