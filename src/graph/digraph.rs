//! The mutable directed multigraph.

use std::iter::Chain;

use serde::{Deserialize, Serialize};

use crate::entity_map::HandlerRegistry;
use crate::graph::{DirectedEdges, EdgeMaps, Graph, MutableGraph, NodeMaps};
use crate::lace::{ArcLace, LaceAnchors, LaceArcs};
use crate::memory::arena;
use crate::{Arena, ArcRecord, Direction, EdgeIndex, EntityMap, GraphError, NodeIndex};

type ArcStore = Arena<EdgeIndex, ArcRecord>;

/// Incidence cursor over one node's arcs, outgoing first.
pub type IncidentArcs<'a> = Chain<LaceArcs<'a, ArcStore>, LaceArcs<'a, ArcStore>>;

/// A directed multigraph with O(1) mutation and recycled handles.
///
/// Nodes carry the anchors of their adjacency lists; arcs live in a laced
/// arena. Parallel arcs and self-loops are allowed. Removing a node removes
/// its incident arcs first.
///
/// Per-entity data goes into synchronized maps created through
/// [`NodeMaps`]/[`EdgeMaps`]; the registries holding them are not part of
/// the serialized state, so maps must be re-attached after deserialization.
///
/// ```
/// use lacegraph::DiGraph;
///
/// let mut graph = DiGraph::new();
/// let n0 = graph.add_node();
/// let n1 = graph.add_node();
/// let a = graph.add_arc(n0, n1);
/// let b = graph.add_arc(n0, n1);
///
/// assert!(graph.outgoing(n0).eq([a, b]));
/// graph.remove_node(n1).unwrap();
/// assert_eq!(graph.arc_count(), 0);
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DiGraph {
    nodes: Arena<NodeIndex, LaceAnchors>,
    arcs: ArcLace,
    #[serde(skip)]
    node_handlers: HandlerRegistry<NodeIndex>,
    #[serde(skip)]
    arc_handlers: HandlerRegistry<EdgeIndex>,
}

impl DiGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with capacity for `nodes` nodes and `arcs`
    /// arcs.
    pub fn with_capacity(nodes: usize, arcs: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(nodes),
            arcs: ArcLace::with_capacity(arcs),
            ..Self::default()
        }
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.arc_count()
    }

    /// Returns whether `node` is live.
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.nodes.contains(node)
    }

    /// Returns whether `arc` is live.
    pub fn contains_arc(&self, arc: EdgeIndex) -> bool {
        self.arcs.contains_arc(arc)
    }

    /// Iterates over the live nodes in the order they most recently became
    /// live.
    pub fn nodes(&self) -> arena::Keys<'_, NodeIndex, LaceAnchors> {
        self.nodes.keys()
    }

    /// Iterates over the live arcs.
    pub fn arcs(&self) -> arena::Keys<'_, EdgeIndex, ArcRecord> {
        self.arcs.arc_indices()
    }

    /// Adds an isolated node and returns its handle.
    pub fn add_node(&mut self) -> NodeIndex {
        let node = self.nodes.insert(LaceAnchors::default());
        self.node_handlers.notify_add(node);
        node
    }

    /// Adds an arc from `source` to `target` and returns its handle.
    ///
    /// The arc becomes the newest entry of both incidence lists.
    ///
    /// # Panics
    ///
    /// Panics when either endpoint is not live.
    pub fn add_arc(&mut self, source: NodeIndex, target: NodeIndex) -> EdgeIndex {
        let arc = self.arcs.add_arc(&mut self.nodes, source, target);
        self.arc_handlers.notify_add(arc);
        arc
    }

    /// Removes `arc`, notifying arc maps first.
    ///
    /// Removing a handle that is not live is a no-op.
    pub fn remove_arc(&mut self, arc: EdgeIndex) -> Result<(), GraphError> {
        if self.arcs.contains_arc(arc) {
            self.arc_handlers.notify_remove(arc);
            self.arcs.remove_arc(&mut self.nodes, arc);
        }
        Ok(())
    }

    /// Removes `node` together with every incident arc.
    ///
    /// Incident arcs go first, each with its own removal notification; the
    /// node notification fires afterwards, while the handle is still live.
    /// Removing a handle that is not live is a no-op.
    pub fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        if !self.nodes.contains(node) {
            return Ok(());
        }
        for direction in Direction::ALL {
            while let Some(arc) = self.nodes[node].first(direction) {
                self.remove_arc(arc)?;
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

    /// The endpoint of `arc` in `direction`.
    pub fn endpoint(&self, arc: EdgeIndex, direction: Direction) -> Option<NodeIndex> {
        self.arcs.endpoint(arc, direction)
    }

    /// Iterates over the arcs leaving `node`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn outgoing(&self, node: NodeIndex) -> LaceArcs<'_, ArcStore> {
        self.arcs.arcs(&self.nodes[node], Direction::Outgoing)
    }

    /// Iterates over the arcs entering `node`, oldest first.
    ///
    /// # Panics
    ///
    /// Panics when `node` is not live.
    pub fn incoming(&self, node: NodeIndex) -> LaceArcs<'_, ArcStore> {
        self.arcs.arcs(&self.nodes[node], Direction::Incoming)
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

    /// Returns the number of arcs leaving `node`.
    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.outgoing(node).count()
    }

    /// Returns the number of arcs entering `node`.
    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.incoming(node).count()
    }
}

impl Graph for DiGraph {
    type Nodes<'a> = arena::Keys<'a, NodeIndex, LaceAnchors> where Self: 'a;

    fn node_count(&self) -> usize {
        DiGraph::node_count(self)
    }

    fn contains_node(&self, node: NodeIndex) -> bool {
        DiGraph::contains_node(self, node)
    }

    fn nodes(&self) -> Self::Nodes<'_> {
        DiGraph::nodes(self)
    }
}

impl MutableGraph for DiGraph {
    fn add_node(&mut self) -> NodeIndex {
        DiGraph::add_node(self)
    }

    fn remove_node(&mut self, node: NodeIndex) -> Result<(), GraphError> {
        DiGraph::remove_node(self, node)
    }
}

impl DirectedEdges for DiGraph {
    type Arcs<'a> = arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;
    type NodeArcs<'a> = LaceArcs<'a, ArcStore> where Self: 'a;
    type IncidentArcs<'a> = IncidentArcs<'a> where Self: 'a;

    fn arc_count(&self) -> usize {
        DiGraph::arc_count(self)
    }

    fn contains_arc(&self, arc: EdgeIndex) -> bool {
        DiGraph::contains_arc(self, arc)
    }

    fn arcs(&self) -> Self::Arcs<'_> {
        DiGraph::arcs(self)
    }

    fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        DiGraph::source(self, arc)
    }

    fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        DiGraph::target(self, arc)
    }

    fn outgoing(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        DiGraph::outgoing(self, node)
    }

    fn incoming(&self, node: NodeIndex) -> Self::NodeArcs<'_> {
        DiGraph::incoming(self, node)
    }

    fn incident_arcs(&self, node: NodeIndex) -> Self::IncidentArcs<'_> {
        DiGraph::incident_arcs(self, node)
    }
}

impl NodeMaps for DiGraph {
    fn node_registry(&self) -> &HandlerRegistry<NodeIndex> {
        &self.node_handlers
    }

    fn node_registry_mut(&mut self) -> &mut HandlerRegistry<NodeIndex> {
        &mut self.node_handlers
    }
}

impl EdgeMaps for DiGraph {
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
    fn arcs_connect_in_both_directions() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();

        let a = graph.add_arc(n0, n1);
        let b = graph.add_arc(n0, n2);
        let c = graph.add_arc(n2, n1);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.arc_count(), 3);
        assert!(graph.outgoing(n0).eq([a, b]));
        assert!(graph.incoming(n1).eq([a, c]));
        assert_eq!(graph.out_degree(n0), 2);
        assert_eq!(graph.in_degree(n0), 0);
        assert_eq!(graph.source(c), Some(n2));
        assert_eq!(graph.target(c), Some(n1));
    }

    #[test]
    fn parallel_arcs_are_distinct() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();

        let a = graph.add_arc(n0, n1);
        let b = graph.add_arc(n0, n1);

        assert_ne!(a, b);
        assert_eq!(graph.arc_count(), 2);
        assert!(graph.outgoing(n0).eq([a, b]));
    }

    #[test]
    fn incident_arcs_visit_outgoing_then_incoming() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();

        let out = graph.add_arc(n1, n0);
        let inc = graph.add_arc(n2, n1);
        let loop_arc = graph.add_arc(n1, n1);

        // The self-loop shows up on both sides.
        assert!(graph.incident_arcs(n1).eq([out, loop_arc, inc, loop_arc]));
        assert!(graph.incident_arcs(n0).eq([out]));
    }

    #[test]
    fn removing_a_node_cascades_to_incident_arcs() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();

        graph.add_arc(n0, n1);
        graph.add_arc(n1, n2);
        graph.add_arc(n1, n1);
        let keep = graph.add_arc(n0, n2);

        graph.remove_node(n1).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.arc_count(), 1);
        assert!(graph.contains_arc(keep));
        assert!(!graph.contains_node(n1));
        assert!(graph.outgoing(n0).eq([keep]));
    }

    #[test]
    fn handles_survive_unrelated_removals() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let n2 = graph.add_node();
        let a = graph.add_arc(n0, n2);

        graph.remove_node(n1).unwrap();

        assert!(graph.contains_node(n0));
        assert!(graph.contains_node(n2));
        assert_eq!(graph.source(a), Some(n0));
        assert_eq!(graph.target(a), Some(n2));
    }

    #[test]
    fn removed_node_handles_are_recycled() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let _n1 = graph.add_node();

        graph.remove_node(n0).unwrap();
        let n2 = graph.add_node();

        assert_eq!(n2, n0);
        assert_eq!(graph.out_degree(n2), 0);
        assert_eq!(graph.in_degree(n2), 0);
    }

    #[test]
    fn node_maps_are_cleared_on_removal() {
        let mut graph = DiGraph::new();
        let token = graph.create_node_map::<&str>();

        let n0 = graph.add_node();
        let n1 = graph.add_node();
        graph.node_map_mut(token).unwrap().put(n0, "zero");
        graph.node_map_mut(token).unwrap().put(n1, "one");

        graph.remove_node(n0).unwrap();
        let n2 = graph.add_node();

        assert_eq!(n2, n0);
        let map = graph.node_map(token).unwrap();
        assert_eq!(map.get(n2), None);
        assert_eq!(map.get(n1), Some(&"one"));
    }

    #[test]
    fn arc_maps_see_cascaded_removals() {
        let mut graph = DiGraph::new();
        let token = graph.create_edge_map::<i32>();

        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let a = graph.add_arc(n0, n1);
        let b = graph.add_arc(n1, n0);
        graph.edge_map_mut(token).unwrap().put(a, 1);
        graph.edge_map_mut(token).unwrap().put(b, 2);

        graph.remove_node(n1).unwrap();

        let map = graph.edge_map(token).unwrap();
        assert_eq!(map.get(a), None);
        assert_eq!(map.get(b), None);
    }

    #[test]
    fn detached_maps_keep_their_contents() {
        let mut graph = DiGraph::new();
        let token = graph.create_node_map::<i32>();
        let n0 = graph.add_node();
        graph.node_map_mut(token).unwrap().put(n0, 7);

        let map = graph.detach_node_map(token).unwrap();
        graph.remove_node(n0).unwrap();

        assert_eq!(map.get(n0), Some(&7));
        assert!(graph.node_map::<EntityMap<NodeIndex, i32>>(token).is_none());
    }

    #[test]
    fn removing_a_dead_arc_is_a_noop() {
        let mut graph = DiGraph::new();
        let n0 = graph.add_node();
        let n1 = graph.add_node();
        let a = graph.add_arc(n0, n1);

        graph.remove_arc(a).unwrap();
        graph.remove_arc(a).unwrap();

        assert_eq!(graph.arc_count(), 0);
        assert!(graph.outgoing(n0).next().is_none());
    }
}
