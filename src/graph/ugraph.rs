//! The mutable undirected multigraph.

use std::iter::Chain;

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::{EdgeMaps, Graph, MutableGraph, NodeMaps, UndirectedEdges};
use crate::lace::{ArcLace, LaceAnchors, LaceArcs};
use crate::memory::arena;
use crate::{ArcRecord, Arena, Direction, EdgeIndex, EntityMap, GraphError, NodeIndex};

type EdgeStore = Arena<EdgeIndex, ArcRecord>;

/// Incidence cursor of [`UGraph`]: one attachment list after the other.
pub type IncidentUEdges<'a> = Chain<LaceArcs<'a, EdgeStore>, LaceArcs<'a, EdgeStore>>;

/// An undirected multigraph with O(1) mutation and recycled handles.
///
/// Edges are stored like arcs, laced into per-node attachment lists by the
/// order of their two endpoints; the undirected surface exposes the union
/// of both lists and never distinguishes the ends. Parallel edges and
/// self-loops are allowed, and a self-loop contributes two to the degree of
/// its node.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UGraph {
    nodes: Arena<NodeIndex, LaceAnchors>,
    uedges: ArcLace,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    uedge_handlers: HandlerRegistry<EdgeIndex>,
}

impl UGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with capacity for `nodes` nodes and `uedges`
    /// edges.
    pub fn with_capacity(nodes: usize, uedges: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(nodes),
            uedges: ArcLace::with_capacity(uedges),
            ..Self::default()
        }
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live edges.
    pub fn uedge_count(&self) -> usize {
        self.uedges.arc_count()
    }

    /// Returns whether `node` is live.
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.nodes.contains(node)
    }

    /// Returns whether `uedge` is live.
    pub fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        self.uedges.contains_arc(uedge)
    }

    /// Iterates over the live nodes in the order they most recently became
    /// live.
    pub fn nodes(&self) -> arena::Keys<'_, NodeIndex, LaceAnchors> {
        self.nodes.keys()
    }

    /// Iterates over the live edges.
    pub fn uedges(&self) -> arena::Keys<'_, EdgeIndex, ArcRecord> {
        self.uedges.arc_indices()
    }

    /// Adds an isolated node and returns its handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = self.nodes.insert(LaceAnchors::default());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an edge between `u` and `v` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_uedge(&mut self, u: NodeIndex, v: NodeIndex) -> EdgeIndex {
        let uedge = self.uedges.add_arc(&mut self.nodes, u, v);
        self.uedge_handlers.notify_add(uedge);
        uedge
    }

    /// Removes `uedge`, notifying edge maps first.
    ///
    /// Removing a handle that is not live is a no-op.
    pub fn remove_uedge(&mut self, uedge: EdgeIndex) -> Result<(), GraphError> {
        if self.uedges.contains_arc(uedge) {
            self.uedge_handlers.notify_remove(uedge);
            self.uedges.remove_arc(&mut self.nodes, uedge);
        }
        Ok(())
    }

    /// Removes `node` together with every incident edge.
    ///
    /// Removing a handle that is not live is a no-op.
    pub fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        if !self.nodes.contains(node) {
            return Ok(());
        }
        for direction in Direction::ALL {
            while let Some(uedge) = self.nodes[node].first(direction) {
                self.remove_uedge(uedge)?;
            }
        }
        self.node_handlers.notify_remove(node);
        self.nodes.remove(node);
        Ok(())
    }

    /// The endpoints of `uedge`, in insertion order.
    pub fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        Some((self.uedges.source(uedge)?, self.uedges.target(uedge)?))
    }

    /// The endpoint of `uedge` that is not `node`, or the node itself for a
    /// self-loop. Returns `None` when `uedge` does not touch `node`.
    pub fn opposite(&self, uedge: EdgeIndex, node: NodeIndex) -> Option<NodeIndex> {
        let (u, v) = self.uedge_ends(uedge)?;
        if node == u {
            Some(v)
        } else if node == v {
            Some(u)
        } else {
            None
        }
    }

    /// Iterates over the edges incident to `node`.
    ///
    /// A self-loop shows up twice, once per attachment.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn incident_uedges(&self, node: NodeIndex) -> IncidentUEdges<'_> {
        let anchors = &self.nodes[node];
        self.uedges
            .arcs(anchors, Direction::Outgoing)
            .chain(self.uedges.arcs(anchors, Direction::Incoming))
    }

    /// Returns the degree of `node`, counting self-loops twice.
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.incident_uedges(node).count()
    }
}

impl Graph for UGraph {
    type Nodes<'a> = arena::Keys<'a, NodeIndex, LaceAnchors> where Self: 'a;

    fn node_count(&self) -> usize {
        UGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        UGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        UGraph::nodes(self)
    }
}

impl MutableGraph for UGraph {
    fn add_node(&mut self) -> NodeIndex {
        UGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        UGraph::remove_node(self, node)
    }
}

impl UndirectedEdges for UGraph {
    type UEdges<'a> = arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;
    type NodeUEdges<'a> = IncidentUEdges<'a> where Self: 'a;

    fn uedge_count(&self) -> usize {
        UGraph::uedge_count(self)
    }

    fn contains_uedge(&self, uedge: EdgeIndex) -> bool {
        UGraph::contains_uedge(self, uedge)
    }

    fn uedges(&self) -> Self::UEdges<'_> {
        UGraph::uedges(self)
    }

    fn uedge_ends(&self, uedge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        UGraph::uedge_ends(self, uedge)
    }

    fn incident_uedges(&self, node: NodeIndex) -> Self::NodeUEdges<'_> {
        UGraph::incident_uedges(self, node)
    }
}

impl NodeMaps for UGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for UGraph {
    type EdgeKey = EdgeIndex;
    type EdgeMap<V: 'static> = EntityMap<EdgeIndex, V>;

    fn edge_registry(&self) -> &HandlerRegistry<EdgeIndex> {
        &self.uedge_handlers
    }

    fn edge_registry_mut(&mut self) -> &mut HandlerRegistry<EdgeIndex> {
        &mut self.uedge_handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_have_no_direction() {
        let mut graph = UGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();

        let e = graph.add_uedge(n0, n1);
        let f = graph.add_uedge(n2, n0);

        assert_eq!(graph.uedge_ends(e), Some((n0, n1)));
        assert!(graph.incident_uedges(n0).eq([e, f]));
        assert!(graph.incident_uedges(n1).eq([e]));
        assert_eq!(graph.opposite(e, n1), Some(n0));
        assert_eq!(graph.opposite(e, n2), None);
        assert_eq!(graph.degree(n0), 2);
    }

    #[test]
    fn self_loops_count_twice() {
        let mut graph = UGraph::new();
        let n0 = graph.add_node();
        let e = graph.add_uedge(n0, n0);

        assert!(graph.incident_uedges(n0).eq([e, e]));
        assert_eq!(graph.degree(n0), 2);
        assert_eq!(graph.opposite(e, n0), Some(n0));
    }

    #[test]
    fn removing_a_node_cascades_to_incident_edges() {
        let mut graph = UGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();

        graph.add_uedge(n0, n1);
        graph.add_uedge(n1, n2);
        graph.add_uedge(n1, n1);
        let keep = graph.add_uedge(n2, n0);

        graph.remove_node(n1).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.uedge_count(), 1);
        assert!(graph.contains_uedge(keep));
        assert_eq!(graph.degree(n0), 1);
    }

    #[test]
    fn edge_maps_are_cleared_on_removal() {
        let mut graph = UGraph::new();
        let token = graph.create_edge_map::<&str>();

        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let e = graph.add_uedge(n0, n1);
        graph.edge_map_mut(token).unwrap().put(e, "weight");

        graph.remove_uedge(e).unwrap();
        let f = graph.add_uedge(n0, n1);

        assert_eq!(f, e);
        assert_eq!(graph.edge_map(token).unwrap().get(f), None);
    }
}
