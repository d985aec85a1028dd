//! Intrusive adjacency lacing.
//!
//! Every arc record embeds the links of two doubly-linked lists, one per
//! [`Direction`]: the out-list of its source and the in-list of its target.
//! Each node keeps the first/last anchors of both of its lists. Splicing an
//! arc in or out is O(1) and touches only the record, its neighbours and the
//! endpoint anchors; traversing a node's incidence allocates nothing.
//!
//! [`ArcLace`] is generic over the arc store so the same splice logic backs
//! both allocator-addressed and caller-addressed graphs, and anchors are
//! reached through [`AnchorMut`] so one lace also serves nodes that carry
//! several anchor sets (the mixed graphs keep one per edge kind).

use std::iter::FusedIterator;
use std::ops::IndexMut;

use serde::{Deserialize, Serialize};

use crate::{Arena, Direction, EdgeIndex, GraphError, NodeIndex, StaticArena};

/// Per-node anchors of the two incidence lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaceAnchors {
    pub(crate) first: [Option<EdgeIndex>; 2],
    pub(crate) last: [Option<EdgeIndex>; 2],
}

impl LaceAnchors {
    /// First arc of the node's list in `direction`.
    #[inline]
    pub fn first(&self, direction: Direction) -> Option<EdgeIndex> {
        self.first[direction.index()]
    }

    /// Last arc of the node's list in `direction`.
    #[inline]
    pub fn last(&self, direction: Direction) -> Option<EdgeIndex> {
        self.last[direction.index()]
    }

    /// Whether both incidence lists are empty.
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.first == [None, None]
    }
}

/// An arc's endpoints together with its links in both incidence lists.
///
/// `ends`, `prev` and `next` are indexed by [`Direction`]: the
/// [`Outgoing`](Direction::Outgoing) entries name the source and the
/// neighbours in the source's out-list, the
/// [`Incoming`](Direction::Incoming) entries the target and the neighbours
/// in the target's in-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRecord {
    pub(crate) ends: [NodeIndex; 2],
    pub(crate) prev: [Option<EdgeIndex>; 2],
    pub(crate) next: [Option<EdgeIndex>; 2],
}

impl ArcRecord {
    fn new(source: NodeIndex, target: NodeIndex) -> Self {
        Self {
            ends: [source, target],
            prev: [None; 2],
            next: [None; 2],
        }
    }

    /// The node the arc leaves.
    #[inline]
    pub fn source(&self) -> NodeIndex {
        self.ends[Direction::Outgoing.index()]
    }

    /// The node the arc enters.
    #[inline]
    pub fn target(&self) -> NodeIndex {
        self.ends[Direction::Incoming.index()]
    }

    /// The endpoint in `direction`: source for outgoing, target for incoming.
    #[inline]
    pub fn endpoint(&self, direction: Direction) -> NodeIndex {
        self.ends[direction.index()]
    }
}

/// Storage of arc records, addressed by [`EdgeIndex`].
///
/// Implemented by both arena flavors; the lace never allocates handles
/// itself, so the two flavors differ only in who picks them.
pub trait ArcStore {
    /// Iterator over the live arc handles.
    type Keys<'a>: Iterator<Item = EdgeIndex>
    where
        Self: 'a;

    fn get(&self, arc: EdgeIndex) -> Option<&ArcRecord>;
    fn get_mut(&mut self, arc: EdgeIndex) -> Option<&mut ArcRecord>;
    fn remove(&mut self, arc: EdgeIndex) -> Option<ArcRecord>;
    fn keys(&self) -> Self::Keys<'_>;
    fn len(&self) -> usize;
    fn contains(&self, arc: EdgeIndex) -> bool;
    fn upper_bound(&self) -> EdgeIndex;
}

impl ArcStore for Arena<EdgeIndex, ArcRecord> {
    type Keys<'a> = crate::memory::arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;

    fn get(&self, arc: EdgeIndex) -> Option<&ArcRecord> {
        Arena::get(self, arc)
    }

    fn get_mut(&mut self, arc: EdgeIndex) -> Option<&mut ArcRecord> {
        Arena::get_mut(self, arc)
    }

    fn remove(&mut self, arc: EdgeIndex) -> Option<ArcRecord> {
        Arena::remove(self, arc)
    }

    fn keys(&self) -> Self::Keys<'_> {
        Arena::keys(self)
    }

    fn len(&self) -> usize {
        Arena::len(self)
    }

    fn contains(&self, arc: EdgeIndex) -> bool {
        Arena::contains(self, arc)
    }

    fn upper_bound(&self) -> EdgeIndex {
        Arena::upper_bound(self)
    }
}

impl ArcStore for StaticArena<EdgeIndex, ArcRecord> {
    type Keys<'a> = crate::memory::static_arena::Keys<'a, EdgeIndex, ArcRecord> where Self: 'a;

    fn get(&self, arc: EdgeIndex) -> Option<&ArcRecord> {
        StaticArena::get(self, arc)
    }

    fn get_mut(&mut self, arc: EdgeIndex) -> Option<&mut ArcRecord> {
        StaticArena::get_mut(self, arc)
    }

    fn remove(&mut self, arc: EdgeIndex) -> Option<ArcRecord> {
        StaticArena::remove(self, arc)
    }

    fn keys(&self) -> Self::Keys<'_> {
        StaticArena::keys(self)
    }

    fn len(&self) -> usize {
        StaticArena::len(self)
    }

    fn contains(&self, arc: EdgeIndex) -> bool {
        StaticArena::contains(self, arc)
    }

    fn upper_bound(&self) -> EdgeIndex {
        StaticArena::upper_bound(self)
    }
}

/// Mutable access to the anchors of a node.
///
/// Graphs whose nodes carry a single anchor set implement this on the node
/// arena directly; the mixed graphs wrap their node storage in
/// [`ArcSide`]/[`UEdgeSide`] to expose one anchor set at a time.
pub trait AnchorMut {
    fn anchors_mut(&mut self, node: NodeIndex) -> &mut LaceAnchors;
}

impl AnchorMut for Arena<NodeIndex, LaceAnchors> {
    fn anchors_mut(&mut self, node: NodeIndex) -> &mut LaceAnchors {
        &mut self[node]
    }
}

/// Anchors of nodes that take part in two laces at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedAnchors {
    pub(crate) arc: LaceAnchors,
    pub(crate) uedge: LaceAnchors,
}

impl CombinedAnchors {
    /// Whether all four incidence lists are empty.
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.arc.is_clear() && self.uedge.is_clear()
    }
}

/// View of combined node storage exposing the directed-arc anchors.
pub struct ArcSide<'a, S>(pub(crate) &'a mut S);

impl<'a, S> AnchorMut for ArcSide<'a, S>
where
    S: IndexMut<NodeIndex, Output = CombinedAnchors>,
{
    fn anchors_mut(&mut self, node: NodeIndex) -> &mut LaceAnchors {
        &mut self.0[node].arc
    }
}

/// View of combined node storage exposing the undirected-edge anchors.
pub struct UEdgeSide<'a, S>(pub(crate) &'a mut S);

impl<'a, S> AnchorMut for UEdgeSide<'a, S>
where
    S: IndexMut<NodeIndex, Output = CombinedAnchors>,
{
    fn anchors_mut(&mut self, node: NodeIndex) -> &mut LaceAnchors {
        &mut self.0[node].uedge
    }
}

/// The arc store together with the splice logic that keeps every record
/// linked into the incidence lists of its endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcLace<S = Arena<EdgeIndex, ArcRecord>> {
    arcs: S,
}

impl<S> ArcLace<S>
where
    S: ArcStore,
{
    /// Returns the number of arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Returns whether `arc` is live.
    pub fn contains_arc(&self, arc: EdgeIndex) -> bool {
        self.arcs.contains(arc)
    }

    /// Iterates over all live arc handles.
    pub fn arc_indices(&self) -> S::Keys<'_> {
        self.arcs.keys()
    }

    /// An exclusive upper bound on the arc handles ever stored.
    pub fn arc_upper_bound(&self) -> EdgeIndex {
        self.arcs.upper_bound()
    }

    /// The source of `arc`.
    pub fn source(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        self.arcs.get(arc).map(ArcRecord::source)
    }

    /// The target of `arc`.
    pub fn target(&self, arc: EdgeIndex) -> Option<NodeIndex> {
        self.arcs.get(arc).map(ArcRecord::target)
    }

    /// The endpoint of `arc` in `direction`.
    pub fn endpoint(&self, arc: EdgeIndex, direction: Direction) -> Option<NodeIndex> {
        self.arcs.get(arc).map(|record| record.endpoint(direction))
    }

    /// Walks a node's incidence list in `direction`, starting at its first
    /// anchor.
    pub fn arcs(&self, anchors: &LaceAnchors, direction: Direction) -> LaceArcs<'_, S> {
        self.arcs_from(anchors.first(direction), direction)
    }

    /// Walks an incidence list in `direction` from an explicit head.
    pub fn arcs_from(&self, first: Option<EdgeIndex>, direction: Direction) -> LaceArcs<'_, S> {
        LaceArcs {
            arcs: &self.arcs,
            direction,
            next: first,
        }
    }

    /// Unsplices `arc` from both incidence lists and frees its record.
    ///
    /// Returns `None` when `arc` is not live. `anchors` must cover both
    /// endpoints of the arc.
    pub fn remove_arc(
        &mut self,
        anchors: &mut impl AnchorMut,
        arc: EdgeIndex,
    ) -> Option<ArcRecord> {
        let record = self.arcs.get(arc)?.clone();

        for direction in Direction::ALL {
            let d = direction.index();
            match record.prev[d] {
                Some(prev) => self.record_mut(prev).next[d] = record.next[d],
                None => anchors.anchors_mut(record.ends[d]).first[d] = record.next[d],
            }
            match record.next[d] {
                Some(next) => self.record_mut(next).prev[d] = record.prev[d],
                None => anchors.anchors_mut(record.ends[d]).last[d] = record.prev[d],
            }
        }

        self.arcs.remove(arc)
    }

    /// Splices a freshly stored record at the tail of both endpoint lists.
    fn lace(&mut self, anchors: &mut impl AnchorMut, arc: EdgeIndex) {
        for direction in Direction::ALL {
            let d = direction.index();
            let node = self.record_mut(arc).ends[d];

            let slot = anchors.anchors_mut(node);
            let last = slot.last[d];
            slot.last[d] = Some(arc);
            match last {
                Some(prev) => self.record_mut(prev).next[d] = Some(arc),
                None => anchors.anchors_mut(node).first[d] = Some(arc),
            }
            self.record_mut(arc).prev[d] = last;
        }
    }

    fn record_mut(&mut self, arc: EdgeIndex) -> &mut ArcRecord {
        self.arcs.get_mut(arc).expect("unlaced arc handle")
    }
}

impl ArcLace<Arena<EdgeIndex, ArcRecord>> {
    /// Creates an empty lace with an allocator-addressed store.
    pub fn new() -> Self {
        Self { arcs: Arena::new() }
    }

    /// Creates an empty lace with space for `capacity` arcs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arcs: Arena::with_capacity(capacity),
        }
    }

    /// Stores a new arc from `source` to `target` and splices it at the tail
    /// of both incidence lists.
    pub fn add_arc(
        &mut self,
        anchors: &mut impl AnchorMut,
        source: NodeIndex,
        target: NodeIndex,
    ) -> EdgeIndex {
        let arc = self.arcs.insert(ArcRecord::new(source, target));
        self.lace(anchors, arc);
        arc
    }
}

impl ArcLace<StaticArena<EdgeIndex, ArcRecord>> {
    /// Creates an empty lace with a caller-addressed store.
    pub fn new_static() -> Self {
        Self {
            arcs: StaticArena::new(),
        }
    }

    /// Stores an arc under the caller-chosen handle `arc` and splices it at
    /// the tail of both incidence lists.
    ///
    /// Fails with [`GraphError::DuplicateKey`] when `arc` is already live;
    /// relacing a live record would corrupt the lists it sits in.
    pub fn put_arc(
        &mut self,
        anchors: &mut impl AnchorMut,
        arc: EdgeIndex,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Result<(), GraphError> {
        if self.arcs.contains(arc) {
            return Err(GraphError::DuplicateKey);
        }
        self.arcs.put(arc, ArcRecord::new(source, target));
        self.lace(anchors, arc);
        Ok(())
    }
}

/// Iterator over one node's incidence list, created by [`ArcLace::arcs`].
pub struct LaceArcs<'a, S> {
    arcs: &'a S,
    direction: Direction,
    next: Option<EdgeIndex>,
}

impl<'a, S> Clone for LaceArcs<'a, S> {
    fn clone(&self) -> Self {
        Self {
            arcs: self.arcs,
            direction: self.direction,
            next: self.next,
        }
    }
}

impl<'a, S> Iterator for LaceArcs<'a, S>
where
    S: ArcStore,
{
    type Item = EdgeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let arc = self.next?;
        self.next = self
            .arcs
            .get(arc)
            .expect("unlaced arc handle")
            .next[self.direction.index()];
        Some(arc)
    }
}

impl<'a, S> FusedIterator for LaceArcs<'a, S> where S: ArcStore {}
