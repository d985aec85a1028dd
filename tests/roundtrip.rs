//! Persistence round trips.
//!
//! The structural state of a graph serializes, including the arena
//! bookkeeping, so handle allocation behaves identically after a reload.
//! Handler registries are not part of the serialized state; maps are
//! serialized by whoever owns them and must be re-attached.

use lacegraph::graph::NodeMaps;
use lacegraph::{
    DiGraph, EntityIndex, EntityMap, MixedEdge, MixedGraph, NodeIndex, StaticDiGraph,
    StaticMixedGraph, StaticMixedIdGraph, StaticOutArcDiGraph, StaticUGraph, UGraph,
};

#[test]
fn digraph_structure_survives_a_round_trip() {
    let mut graph = DiGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let n2 = graph.add_node();
    let a0 = graph.add_arc(n0, n1);
    let a1 = graph.add_arc(n1, n2);
    graph.remove_arc(a0).unwrap();
    graph.remove_node(n2).unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let restored: DiGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.arc_count(), graph.arc_count());
    assert!(restored.nodes().eq(graph.nodes()));
    assert!(restored.arcs().eq(graph.arcs()));
    assert_eq!(restored.source(a1), Some(n1));
    assert!(!restored.contains_arc(a0));
    assert!(!restored.contains_node(n2));
}

#[test]
fn handle_allocation_is_identical_after_a_reload() {
    let mut graph = DiGraph::new();
    let n0 = graph.add_node();
    let _n1 = graph.add_node();
    graph.remove_node(n0).unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let mut restored: DiGraph = serde_json::from_str(&json).unwrap();

    // The free list travels with the graph, so both allocate alike.
    assert_eq!(restored.add_node(), graph.add_node());
}

#[test]
fn mixed_graph_survives_a_round_trip() {
    let mut graph = MixedGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let a = graph.add_arc(n0, n1);
    let u = graph.add_uedge(n1, n0);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: MixedGraph = serde_json::from_str(&json).unwrap();

    assert!(restored
        .edges()
        .eq([MixedEdge::Arc(a), MixedEdge::UEdge(u)]));
    assert_eq!(restored.source(a), Some(n0));
    assert_eq!(restored.uedge_ends(u), Some((n1, n0)));
    assert!(restored.incident_edges(n0).eq(graph.incident_edges(n0)));
}

#[test]
fn ugraph_structure_survives_a_round_trip() {
    let mut graph = UGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let n2 = graph.add_node();
    let e0 = graph.add_uedge(n0, n1);
    let e1 = graph.add_uedge(n1, n2);
    let e2 = graph.add_uedge(n1, n1);
    graph.remove_uedge(e0).unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let restored: UGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.uedge_count(), 2);
    assert!(restored.nodes().eq(graph.nodes()));
    assert!(restored.uedges().eq(graph.uedges()));
    assert!(restored.incident_uedges(n1).eq(graph.incident_uedges(n1)));
    assert_eq!(restored.uedge_ends(e1), Some((n1, n2)));
    assert_eq!(restored.degree(n1), 3);
    assert!(!restored.contains_uedge(e0));
    assert!(restored.contains_uedge(e2));
}

#[test]
fn static_digraph_survives_a_round_trip() {
    let mut graph = StaticDiGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let a0 = graph.add_arc(n0, n1);
    let a1 = graph.add_arc(n0, n1);
    let a2 = graph.add_arc(n1, n0);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: StaticDiGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.node_count(), 2);
    assert_eq!(restored.arc_count(), 3);
    assert!(restored.outgoing(n0).eq([a0, a1]));
    assert!(restored.incoming(n0).eq([a2]));
    assert!(restored.incident_arcs(n0).eq([a0, a1, a2]));
    assert_eq!(restored.source(a2), Some(n1));
}

#[test]
fn static_ugraph_survives_a_round_trip() {
    let mut graph = StaticUGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let e0 = graph.add_uedge(n0, n1);
    let e1 = graph.add_uedge(n1, n1);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: StaticUGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.uedge_count(), 2);
    assert!(restored.incident_uedges(n0).eq([e0]));
    assert!(restored.incident_uedges(n1).eq([e0, e1, e1]));
    assert_eq!(restored.uedge_ends(e0), Some((n0, n1)));
    assert_eq!(restored.degree(n1), 3);
}

#[test]
fn static_mixed_graph_survives_a_round_trip() {
    let mut graph = StaticMixedGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let a = graph.add_arc(n0, n1);
    let u = graph.add_uedge(n1, n0);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: StaticMixedGraph = serde_json::from_str(&json).unwrap();

    assert!(restored
        .edges()
        .eq([MixedEdge::Arc(a), MixedEdge::UEdge(u)]));
    assert!(restored.incident_edges(n0).eq(graph.incident_edges(n0)));
    assert_eq!(restored.source(a), Some(n0));
    assert_eq!(restored.uedge_ends(u), Some((n1, n0)));
}

#[test]
fn out_arc_digraph_survives_a_round_trip() {
    let mut graph = StaticOutArcDiGraph::new();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    let a0 = graph.add_arc(n0, n1);
    let a1 = graph.add_arc(n0, n0);

    let json = serde_json::to_string(&graph).unwrap();
    let restored: StaticOutArcDiGraph = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.arc_count(), 2);
    assert!(restored.outgoing(n0).eq([a0, a1]));
    assert_eq!(restored.target(a0), Some(n1));
    assert_eq!(restored.out_degree(n1), 0);
}

#[test]
fn caller_addressed_graph_survives_a_round_trip() {
    let mut graph = StaticMixedIdGraph::new();
    graph.add_node_with_id(NodeIndex::new(3)).unwrap();
    graph.add_node_with_id(NodeIndex::new(7)).unwrap();
    graph
        .add_arc_with_id(
            lacegraph::EdgeIndex::new(5),
            NodeIndex::new(3),
            NodeIndex::new(7),
        )
        .unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let restored: StaticMixedIdGraph = serde_json::from_str(&json).unwrap();

    assert!(restored.nodes().eq(graph.nodes()));
    assert_eq!(
        restored.source(lacegraph::EdgeIndex::new(5)),
        Some(NodeIndex::new(3))
    );
}

#[test]
fn reattached_maps_resume_synchronization() {
    let mut graph = DiGraph::new();
    let token = graph.create_node_map::<String>();
    let n0 = graph.add_node();
    let n1 = graph.add_node();
    graph
        .node_map_mut(token)
        .unwrap()
        .put(n0, "zero".to_owned());
    graph.node_map_mut(token).unwrap().put(n1, "one".to_owned());

    // The map is serialized by its owner, separately from the graph.
    let map = graph.detach_node_map::<EntityMap<NodeIndex, String>>(token).unwrap();
    let graph_json = serde_json::to_string(&graph).unwrap();
    let map_json = serde_json::to_string(&map).unwrap();

    let mut restored: DiGraph = serde_json::from_str(&graph_json).unwrap();
    let restored_map: EntityMap<NodeIndex, String> = serde_json::from_str(&map_json).unwrap();
    let token = restored.attach_node_map(restored_map);

    assert_eq!(
        restored.node_map(token).unwrap().get(n0),
        Some(&"zero".to_owned())
    );

    // Synchronization picks up where it left off.
    restored.remove_node(n0).unwrap();
    assert_eq!(restored.node_map(token).unwrap().get(n0), None);
    assert_eq!(
        restored.node_map(token).unwrap().get(n1),
        Some(&"one".to_owned())
    );
}

#[test]
fn a_map_that_is_not_reattached_goes_stale_silently() {
    let mut graph = DiGraph::new();
    let token = graph.create_node_map::<i32>();
    let n0 = graph.add_node();
    graph.node_map_mut(token).unwrap().put(n0, 7);

    let map = graph.detach_node_map::<EntityMap<NodeIndex, i32>>(token).unwrap();
    let json = serde_json::to_string(&graph).unwrap();
    let mut restored: DiGraph = serde_json::from_str(&json).unwrap();

    // Forgotten re-attachment: the reloaded graph notifies nobody.
    restored.remove_node(n0).unwrap();
    let n1 = restored.add_node();

    assert_eq!(n1, n0);
    assert_eq!(map.get(n1), Some(&7));
}

#[test]
fn entity_maps_round_trip_on_their_own() {
    let mut map: EntityMap<NodeIndex, i32> = EntityMap::new();
    map.put(NodeIndex::new(2), 20);
    map.put(NodeIndex::new(5), 50);
    map.take(NodeIndex::new(2));

    let json = serde_json::to_string(&map).unwrap();
    let restored: EntityMap<NodeIndex, i32> = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, map);
    assert_eq!(restored.get(NodeIndex::new(5)), Some(&50));
    assert_eq!(restored.get(NodeIndex::new(2)), None);
}
