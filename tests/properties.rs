//! Model-based property tests for the arena and the mutable graphs.

use proptest::prelude::*;

use lacegraph::graph::EdgeMaps;
use lacegraph::{Arena, DiGraph, EdgeIndex, EntityIndex, NodeIndex};

#[derive(Debug, Clone)]
enum ArenaOp {
    Insert(u32),
    Remove(usize),
}

fn arena_ops() -> impl Strategy<Value = Vec<ArenaOp>> {
    prop::collection::vec(
        prop_oneof![
            any::<u32>().prop_map(ArenaOp::Insert),
            (0usize..32).prop_map(ArenaOp::Remove),
        ],
        0..64,
    )
}

proptest! {
    /// The arena agrees with a plain list model: handles are reused LIFO,
    /// live handles keep their value until removed, and traversal follows
    /// the order in which slots most recently became live.
    #[test]
    fn arena_matches_a_list_model(ops in arena_ops()) {
        let mut arena: Arena<NodeIndex, u32> = Arena::new();
        let mut order: Vec<(NodeIndex, u32)> = Vec::new();
        let mut free: Vec<NodeIndex> = Vec::new();
        let mut grown = 0usize;

        for op in ops {
            match op {
                ArenaOp::Insert(value) => {
                    let expected = free.pop().unwrap_or_else(|| {
                        let fresh = NodeIndex::new(grown);
                        grown += 1;
                        fresh
                    });
                    let key = arena.insert(value);
                    prop_assert_eq!(key, expected);
                    order.push((key, value));
                }
                ArenaOp::Remove(pick) => {
                    if order.is_empty() {
                        continue;
                    }
                    let (key, value) = order.remove(pick % order.len());
                    prop_assert_eq!(arena.remove(key), Some(value));
                    free.push(key);
                }
            }

            for &(key, value) in &order {
                prop_assert_eq!(arena.get(key), Some(&value));
            }
        }

        prop_assert_eq!(arena.len(), order.len());
        prop_assert!(arena.iter().map(|(key, value)| (key, *value)).eq(order.iter().copied()));
        prop_assert!(arena.free_keys().eq(free.iter().rev().copied()));
    }
}

#[derive(Debug, Clone)]
enum GraphOp {
    AddNode,
    AddArc(usize, usize),
    RemoveArc(usize),
    RemoveNode(usize),
}

fn graph_ops() -> impl Strategy<Value = Vec<GraphOp>> {
    prop::collection::vec(
        prop_oneof![
            2 => Just(GraphOp::AddNode),
            4 => ((0usize..32), (0usize..32)).prop_map(|(s, t)| GraphOp::AddArc(s, t)),
            2 => (0usize..32).prop_map(GraphOp::RemoveArc),
            1 => (0usize..32).prop_map(GraphOp::RemoveNode),
        ],
        0..96,
    )
}

proptest! {
    /// Random mutation interleavings keep the graph, its adjacency lists
    /// and a synchronized edge map in agreement with a flat model.
    #[test]
    fn digraph_matches_a_flat_model(ops in graph_ops()) {
        let mut graph = DiGraph::new();
        let token = graph.create_edge_map::<u64>();

        let mut nodes: Vec<NodeIndex> = Vec::new();
        let mut arcs: Vec<(EdgeIndex, NodeIndex, NodeIndex)> = Vec::new();
        let mut removed: Vec<EdgeIndex> = Vec::new();
        let mut stamp = 0u64;

        for op in ops {
            match op {
                GraphOp::AddNode => {
                    nodes.push(graph.add_node());
                }
                GraphOp::AddArc(s, t) => {
                    if nodes.is_empty() {
                        continue;
                    }
                    let source = nodes[s % nodes.len()];
                    let target = nodes[t % nodes.len()];
                    let arc = graph.add_arc(source, target);
                    graph.edge_map_mut(token).unwrap().put(arc, stamp);
                    arcs.push((arc, source, target));
                    removed.retain(|&old| old != arc);
                    stamp += 1;
                }
                GraphOp::RemoveArc(pick) => {
                    if arcs.is_empty() {
                        continue;
                    }
                    let (arc, _, _) = arcs.remove(pick % arcs.len());
                    graph.remove_arc(arc).unwrap();
                    removed.push(arc);
                }
                GraphOp::RemoveNode(pick) => {
                    if nodes.is_empty() {
                        continue;
                    }
                    let node = nodes.remove(pick % nodes.len());
                    graph.remove_node(node).unwrap();
                    arcs.retain(|&(arc, source, target)| {
                        if source == node || target == node {
                            removed.push(arc);
                            false
                        } else {
                            true
                        }
                    });
                }
            }
        }

        prop_assert_eq!(graph.node_count(), nodes.len());
        prop_assert_eq!(graph.arc_count(), arcs.len());

        for &(arc, source, target) in &arcs {
            prop_assert_eq!(graph.source(arc), Some(source));
            prop_assert_eq!(graph.target(arc), Some(target));
            prop_assert!(graph.edge_map(token).unwrap().get(arc).is_some());
        }

        // Per-node adjacency keeps the insertion order of the survivors.
        for &node in &nodes {
            let out: Vec<_> = arcs
                .iter()
                .filter(|&&(_, source, _)| source == node)
                .map(|&(arc, _, _)| arc)
                .collect();
            let inc: Vec<_> = arcs
                .iter()
                .filter(|&&(_, _, target)| target == node)
                .map(|&(arc, _, _)| arc)
                .collect();
            prop_assert!(graph.outgoing(node).eq(out.iter().copied()));
            prop_assert!(graph.incoming(node).eq(inc.iter().copied()));
        }

        // Removed arcs are gone from the graph and from the map, even when
        // their handle has not been recycled yet.
        for &arc in &removed {
            if !graph.contains_arc(arc) {
                prop_assert_eq!(graph.edge_map(token).unwrap().get(arc), None);
            }
        }
    }
}
