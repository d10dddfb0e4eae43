//! Minimum spanning forests: Kruskal, Prim and Borůvka.
//!
//! The graph is read as undirected; callers insert both directions of every
//! edge (see [`Graph::set_undirected_edge`]). Disconnected graphs yield a
//! forest with one tree per component.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::engine::{in_range, Engine};
use crate::error::Result;
use crate::event::{Algorithm, Outcome, StepEvent};
use crate::graph::{edge_list, Graph, Mark, VertexId, Weight, WeightedEdge};
use crate::observer::StepSink;
use crate::union_find::DisjointSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MstResult {
    pub total_weight: Weight,
    /// Accepted edges in acceptance order.
    pub edges: Vec<WeightedEdge>,
    /// Trees in the resulting forest; `1` for a connected graph.
    pub components: usize,
}

impl MstResult {
    pub fn is_spanning_tree(&self) -> bool {
        self.components == 1
    }
}

impl Engine {
    /// Kruskal: edges in ascending weight order, kept when they join two
    /// components.
    ///
    /// The sort is stable on weight over the `(source, dest)` enumeration
    /// order, so ties resolve deterministically.
    pub fn kruskal<S: StepSink + ?Sized>(&self, sink: &mut S) -> Result<MstResult> {
        self.begin(sink, Algorithm::Kruskal, None, None)?;

        let n = sink.graph().vertex_count();
        let mut edges = edge_list(sink.graph(), true);
        edges.sort_by_key(|e| e.weight);

        let mut sets = DisjointSet::new(n);
        let mut result = MstResult::default();
        for edge in edges {
            if result.edges.len() >= n.saturating_sub(1) {
                break;
            }
            self.step(sink, StepEvent::EdgeConsidered { edge })?;
            if sets.union(edge.source, edge.dest) {
                self.accept(sink, edge, &mut result)?;
            } else {
                self.step(sink, StepEvent::EdgeRejected { edge })?;
            }
        }
        result.components = sets.set_count();

        self.finish(sink, Algorithm::Kruskal, Outcome::TotalWeight(result.total_weight));
        Ok(result)
    }

    /// Prim from `start`, with a binary-heap frontier keyed by
    /// `(weight, source, dest)`.
    ///
    /// Stale frontier entries (destination already in the tree) are skipped
    /// lazily and reported as rejections. When the frontier runs dry while
    /// vertices remain outside, a new tree is grown from the smallest of them.
    pub fn prim<S: StepSink + ?Sized>(&self, sink: &mut S, start: VertexId) -> Result<MstResult> {
        if !in_range(sink.graph(), Algorithm::Prim, start) {
            return Ok(MstResult::default());
        }
        self.begin(sink, Algorithm::Prim, Some(start), None)?;

        let n = sink.graph().vertex_count();
        let mut in_tree = vec![false; n];
        let mut frontier: BinaryHeap<Reverse<(Weight, VertexId, VertexId)>> = BinaryHeap::new();
        let mut result = MstResult::default();

        let mut seed = Some(start);
        while let Some(root) = seed {
            in_tree[root] = true;
            result.components += 1;
            sink.graph_mut().set_mark(root, Mark::Done);
            self.step(sink, StepEvent::TreeSeeded { vertex: root })?;
            push_frontier(sink.graph(), root, &in_tree, &mut frontier);

            while let Some(Reverse((weight, source, dest))) = frontier.pop() {
                let edge = WeightedEdge::new(source, dest, weight);
                if in_tree[dest] {
                    tracing::trace!(%edge, "stale frontier entry");
                    self.step(sink, StepEvent::EdgeRejected { edge })?;
                    continue;
                }
                self.step(sink, StepEvent::EdgeConsidered { edge })?;
                in_tree[dest] = true;
                self.accept(sink, edge, &mut result)?;
                push_frontier(sink.graph(), dest, &in_tree, &mut frontier);
            }

            seed = in_tree.iter().position(|&inside| !inside);
        }

        self.finish(sink, Algorithm::Prim, Outcome::TotalWeight(result.total_weight));
        Ok(result)
    }

    /// Borůvka: every round picks the cheapest outgoing edge of each
    /// component and merges along all of them.
    ///
    /// Cheapest means smallest `(weight, source, dest)`, which keeps rounds
    /// cycle-free under weight ties. A round that merges nothing means the
    /// graph is disconnected; the run stops with a warning.
    pub fn boruvka<S: StepSink + ?Sized>(&self, sink: &mut S) -> Result<MstResult> {
        self.begin(sink, Algorithm::Boruvka, None, None)?;

        let n = sink.graph().vertex_count();
        let edges = edge_list(sink.graph(), true);
        let mut sets = DisjointSet::new(n);
        let mut result = MstResult::default();

        while sets.set_count() > 1 {
            let mut cheapest: Vec<Option<WeightedEdge>> = vec![None; n];
            for &edge in &edges {
                let a = sets.find(edge.source);
                let b = sets.find(edge.dest);
                if a == b {
                    continue;
                }
                for root in [a, b] {
                    let slot = &mut cheapest[root];
                    if slot.map_or(true, |best| edge.key() < best.key()) {
                        *slot = Some(edge);
                    }
                }
            }

            let mut merged = false;
            for (component, edge) in cheapest.into_iter().enumerate() {
                let Some(edge) = edge else { continue };
                self.step(sink, StepEvent::CheapestEdge { component, edge })?;
                if sets.union(edge.source, edge.dest) {
                    merged = true;
                    self.accept(sink, edge, &mut result)?;
                } else {
                    self.step(sink, StepEvent::EdgeRejected { edge })?;
                }
            }

            if !merged {
                let components = sets.set_count();
                tracing::warn!(components, "boruvka: graph is disconnected");
                self.narrate(sink, StepEvent::Disconnected { components });
                break;
            }
        }
        result.components = sets.set_count();

        self.finish(sink, Algorithm::Boruvka, Outcome::TotalWeight(result.total_weight));
        Ok(result)
    }

    fn accept<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        edge: WeightedEdge,
        result: &mut MstResult,
    ) -> Result<()> {
        result.total_weight += edge.weight;
        result.edges.push(edge);
        let graph = sink.graph_mut();
        graph.set_mark(edge.source, Mark::Done);
        graph.set_mark(edge.dest, Mark::Done);
        self.highlight(sink, edge.source, edge.dest, true);
        self.step(
            sink,
            StepEvent::EdgeAccepted {
                edge,
                total_weight: result.total_weight,
            },
        )
    }
}

fn push_frontier<G: Graph + ?Sized>(
    graph: &G,
    from: VertexId,
    in_tree: &[bool],
    frontier: &mut BinaryHeap<Reverse<(Weight, VertexId, VertexId)>>,
) {
    let n = graph.vertex_count();
    let mut to = graph.first_neighbor(from);
    while to < n {
        if !in_tree[to] {
            frontier.push(Reverse((graph.weight(from, to), from, to)));
        }
        to = graph.next_neighbor(from, to);
    }
}
