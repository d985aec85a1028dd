//! The mutable mixed multigraph.

use std::iter::{Chain, Map};

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::{
    DirectedEdges, EdgeMaps, Graph, MixedEdges, MutableGraph, NodeMaps, UndirectedEdges,
};
use crate::lace::{ArcLace, ArcSide, CombinedAnchors, LaceArcs, UEdgeSide};
use crate::memory::arena;
use crate::{
    ArcRecord, Arena, Direction, EdgeIndex, EntityMap, GraphError, MixedEdge, MutationHandler,
    NodeIndex,
};

type EdgeStore = Arena<EdgeIndex, ArcRecord>;
type Tag = fn(EdgeIndex) -> MixedEdge;

/// Cursor over all edges of a [`MixedGraph`], arcs first.
pub type MixedEdgeIndices<'a> = Chain<
    Map<arena::Keys<'a, EdgeIndex, ArcRecord>, Tag>,
    Map<arena::Keys<'a, EdgeIndex, ArcRecord>, Tag>,
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

/// A mixed multigraph: directed arcs and undirected edges over one node set.
///
/// The two edge kinds live in separate arenas with disjoint handle spaces;
/// every edge handle crossing the graph surface is a [`MixedEdge`] tagged
/// with its kind. Each node anchors four incidence lists, two per kind.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MixedGraph {
    nodes: Arena<NodeIndex, CombinedAnchors>,
    arcs: ArcLace,
    uedges: ArcLace,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    edge_handlers: HandlerRegistry<MixedEdge>,
}

impl MixedGraph {
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
    pub fn nodes(&self) -> arena::Keys<'_, NodeIndex, CombinedAnchors> {
        self.nodes.keys()
    }

    /// Iterates over the live arcs.
    pub fn arcs(&self) -> arena::Keys<'_, EdgeIndex, ArcRecord> {
        self.arcs.arc_indices()
    }

    /// Iterates over the live undirected edges.
    pub fn uedges(&self) -> arena::Keys<'_, EdgeIndex, ArcRecord> {
        self.uedges.arc_indices()
    }

    /// Iterates over all live edges, arcs first.
    pub fn edges(&self) -> MixedEdgeIndices<'_> {
        self.arcs
            .arc_indices()
            .map(MixedEdge::Arc as Tag)
            .chain(self.uedges.arc_indices().map(MixedEdge::UEdge as Tag))
    }

    /// Adds an isolated node and returns its handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = self.nodes.insert(CombinedAnchors::default());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an arc from `source` to `target` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        let arc = self
            .arcs
            .add_arc(&mut ArcSide(&mut self.nodes), source, target);
        self.edge_handlers.notify_add(MixedEdge::Arc(arc));
        arc
    }

    /// Adds an undirected edge between `u` and `v` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_uedge(&mut self, u: NodeIndex, v: NodeIndex) -> EdgeIndex {
        let uedge = self.uedges.add_arc(&mut UEdgeSide(&mut self.nodes), u, v);
        self.edge_handlers.notify_add(MixedEdge::UEdge(uedge));
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
    /// Removing a handle that is not live is a no-op.
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

    /// The endpoints of `edge`: `(source, target)` for an arc.
    pub fn edge_ends(&self, edge: MixedEdge) -> Option<(NodeIndex, NodeIndex)> {
        match edge {
            MixedEdge::Arc(arc) => Some((self.source(arc)?, self.target(arc)?)),
            MixedEdge::UEdge(uedge) => self.uedge_ends(uedge),
        }
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

impl Graph for MixedGraph {
    type Nodes<'a> = arena::Keys<'a, NodeIndex, CombinedAnchors> where Self: 'a;

    fn node_count(&self) -> usize {
        MixedGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        MixedGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        MixedGraph::nodes(self)
    }
}

impl MutableGraph for MixedGraph {
    fn add_node(&mut self) -> NodeIndex {
        MixedGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        MixedGraph::remove_node(self, node)
    }
}

impl DirectedEdges for MixedGraph {
    type Arcs<'a> = arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;
    type NodeArcs<'a> = LaceArcs<'a, EdgeStore> where Self: 'a;
    type IncidentArcs<'a> = IncidentArcs<'a> where Self: 'a;

    fn arc_count(&self) -> usize {
        MixedGraph::arc_count(self)
    }

    fn contains_arc(&self, arc: EdgeIndex) -> bool {
        MixedGraph::contains_arc(self, arc)
    }

    fn arcs(&self) -> Self::Arcs<'_> {
        MixedGraph::arcs(self)
    }

    fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        MixedGraph::source(self, arc)
    }

    fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        MixedGraph::target(self, arc)
    }

    fn outgoing(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        MixedGraph::outgoing(self, node)
    }

    fn incoming(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        MixedGraph::incoming(self, node)
    }

    fn incident_arcs(&self, node: NodeIndex) -> Self::IncidentArcs<'_> {
        MixedGraph::incident_arcs(self, node)
    }
}

impl UndirectedEdges for MixedGraph {
    type UEdges<'a> = arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;
    type NodeUEdges<'a> = IncidentUEdges<'a> where Self: 'a;

    fn uedge_count(&self) -> usize {
        MixedGraph::uedge_count(self)
    }

    fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        MixedGraph::contains_uedge(self, uedge)
    }

    fn uedges(&self) -> Self::UEdges<'_> {
        MixedGraph::uedges(self)
    }

    fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        MixedGraph::uedge_ends(self, uedge)
    }

    fn incident_uedges(&self, node: NodeIndex) -> Self::NodeUEdges<'_> {
        MixedGraph::incident_uedges(self, node)
    }
}

impl MixedEdges for MixedGraph {
    type Edges<'a> = MixedEdgeIndices<'a> where Self: 'a;
    type NodeEdges<'a> = IncidentEdges<'a> where Self: 'a;

    fn edges(&self) -> Self::Edges<'_> {
        MixedGraph::edges(self)
    }

    fn incident_edges(&self, node: NodeIndex) -> Self::NodeEdges<'_> {
        MixedGraph::incident_edges(self, node)
    }
}

impl NodeMaps for MixedGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for MixedGraph {
    type EdgeKey = MixedEdge;
    type EdgeMap<V: 'static> = MixedEdgeMap<V>;

    fn edge_registry(&self) -> &HandlerRegistry<MixedEdge> {
        &self.edge_handlers
    }

    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<MixedEdge> {
        &mut self.edge_handlers
    }
}

/// A synchronized map keyed by [`MixedEdge`].
///
/// Arcs and undirected edges have overlapping [`EdgeIndex`] values, so the
/// map keeps one flat store per kind and routes on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedEdgeMap<V> {
    arcs: EntityMap<EdgeIndex, V>,
    uedges: EntityMap<EdgeIndex, V>,
}

impl<V> MixedEdgeMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            arcs: EntityMap::new(),
            uedges: EntityMap::new(),
        }
    }

    /// Associates `value` with `edge`, returning the value it replaces.
    pub fn put(&mut self, edge: MixedEdge, value: V) -> Option<V> {
        match edge {
            MixedEdge::Arc(arc) => self.arcs.put(arc, value),
            MixedEdge::UEdge(uedge) => self.uedges.put(uedge, value),
        }
    }

    /// Borrows the value associated with `edge`.
    pub fn get(&self, edge: MixedEdge) -> Option<&V> {
        match edge {
            MixedEdge::Arc(arc) => self.arcs.get(arc),
            MixedEdge::UEdge(uedge) => self.uedges.get(uedge),
        }
    }

    /// Mutably borrows the value associated with `edge`.
    pub fn get_mut(&mut self, edge: MixedEdge) -> Option<&mut V> {
        match edge {
            MixedEdge::Arc(arc) => self.arcs.get_mut(arc),
            MixedEdge::UEdge(uedge) => self.uedges.get_mut(uedge),
        }
    }

    /// Removes and returns the value associated with `edge`.
    pub fn take(&mut self, edge: MixedEdge) -> Option<V> {
        match edge {
            MixedEdge::Arc(arc) => self.arcs.take(arc),
            MixedEdge::UEdge(uedge) => self.uedges.take(uedge),
        }
    }

    /// Returns whether `edge` has an associated value.
    pub fn contains(&self, edge: MixedEdge) -> bool {
        self.get(edge).is_some()
    }
}

impl<V> Default for MixedEdgeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MutationHandler<MixedEdge> for MixedEdgeMap<V> {
    fn on_remove(&mut self, edge: MixedEdge) {
        self.take(edge);
    }
}
