//! Single-source shortest paths: Dijkstra and Bellman-Ford.
//!
//! Both record a snapshot of the whole distance array on every strict
//! improvement so a run can be replayed afterwards.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use serde::Serialize;

use crate::engine::{in_range, Engine};
use crate::error::Result;
use crate::event::{Algorithm, Outcome, StepEvent};
use crate::graph::{edge_list, Graph, Mark, VertexId, Weight};
use crate::observer::StepSink;

/// Distance of a vertex that has not been reached.
pub const INFINITE_DISTANCE: Weight = Weight::MAX;

/// Distance reported when a negative cycle is reachable from the start.
pub const NEGATIVE_CYCLE: Weight = Weight::MIN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPathResult {
    /// Distance to the destination, or one of the sentinels.
    pub final_distance: Weight,
    /// Full distance array after each improving relaxation, oldest first.
    pub snapshots: Vec<Vec<Weight>>,
    /// `start..=end`; empty when unreachable or on a negative cycle.
    pub path: Vec<VertexId>,
}

impl ShortestPathResult {
    /// Result for a rejected request: infinite distance, nothing recorded.
    pub fn out_of_range() -> Self {
        Self {
            final_distance: INFINITE_DISTANCE,
            snapshots: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.final_distance != INFINITE_DISTANCE && self.final_distance != NEGATIVE_CYCLE
    }

    pub fn has_negative_cycle(&self) -> bool {
        self.final_distance == NEGATIVE_CYCLE
    }
}

/// Tentative distances, parent pointers and the snapshot log of one run.
struct Relaxation {
    dist: Vec<Weight>,
    parent: Vec<Option<VertexId>>,
    snapshots: Vec<Vec<Weight>>,
    record_snapshots: bool,
}

impl Relaxation {
    fn new(n: usize, start: VertexId, record_snapshots: bool) -> Self {
        let mut dist = vec![INFINITE_DISTANCE; n];
        dist[start] = 0;
        Self {
            dist,
            parent: vec![None; n],
            snapshots: Vec::new(),
            record_snapshots,
        }
    }

    /// Candidate distance to `to` through `from`, if `from` is reached.
    ///
    /// Real distances stay strictly between the two sentinels.
    fn candidate(&self, from: VertexId, weight: Weight) -> Option<Weight> {
        let base = self.dist[from];
        (base != INFINITE_DISTANCE).then(|| {
            base.saturating_add(weight)
                .clamp(NEGATIVE_CYCLE + 1, INFINITE_DISTANCE - 1)
        })
    }

    fn improves(&self, from: VertexId, to: VertexId, weight: Weight) -> Option<Weight> {
        self.candidate(from, weight).filter(|&d| d < self.dist[to])
    }

    fn improve(&mut self, vertex: VertexId, via: VertexId, distance: Weight) {
        self.dist[vertex] = distance;
        self.parent[vertex] = Some(via);
        if self.record_snapshots {
            self.snapshots.push(self.dist.clone());
        }
    }

    /// Follow parent pointers back from `end`. Empty if the chain does not
    /// lead to `start`.
    fn trace(&self, start: VertexId, end: VertexId) -> Vec<VertexId> {
        let mut path = vec![end];
        let mut at = end;
        while at != start {
            match self.parent[at] {
                Some(prev) if path.len() <= self.parent.len() => {
                    path.push(prev);
                    at = prev;
                }
                _ => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

impl Engine {
    /// Dijkstra from `start` until `end` is settled.
    ///
    /// Uses a binary heap with lazy deletion. Negative edges are skipped with
    /// a warning; distances are then only correct over the non-negative
    /// subgraph. Out-of-range endpoints return
    /// [`ShortestPathResult::out_of_range`] without emitting anything.
    pub fn dijkstra<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        start: VertexId,
        end: VertexId,
    ) -> Result<ShortestPathResult> {
        self.run_dijkstra(sink, start, end, true)
    }

    /// Bellman-Ford from `start`: up to `V-1` rounds over every directed
    /// edge, then one more pass to detect a reachable negative cycle.
    ///
    /// A negative cycle yields [`NEGATIVE_CYCLE`] with the snapshots taken so
    /// far and no path.
    pub fn bellman_ford<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        start: VertexId,
        end: VertexId,
    ) -> Result<ShortestPathResult> {
        self.run_bellman_ford(sink, start, end, true)
    }

    /// [`Engine::dijkstra`] without recording snapshots.
    pub fn dijkstra_distance<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        start: VertexId,
        end: VertexId,
    ) -> Result<Weight> {
        Ok(self.run_dijkstra(sink, start, end, false)?.final_distance)
    }

    /// [`Engine::bellman_ford`] without recording snapshots.
    pub fn bellman_ford_distance<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        start: VertexId,
        end: VertexId,
    ) -> Result<Weight> {
        Ok(self.run_bellman_ford(sink, start, end, false)?.final_distance)
    }

    fn run_dijkstra<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        start: VertexId,
        end: VertexId,
        record_snapshots: bool,
    ) -> Result<ShortestPathResult> {
        let algorithm = Algorithm::Dijkstra;
        if !in_range(sink.graph(), algorithm, start) || !in_range(sink.graph(), algorithm, end) {
            return Ok(ShortestPathResult::out_of_range());
        }
        self.begin(sink, algorithm, Some(start), Some(end))?;

        let n = sink.graph().vertex_count();
        let mut state = Relaxation::new(n, start, record_snapshots);
        let mut settled = vec![false; n];
        let mut heap: BinaryHeap<Reverse<(Weight, VertexId)>> = BinaryHeap::new();
        heap.push(Reverse((0, start)));

        while let Some(Reverse((distance, u))) = heap.pop() {
            if settled[u] || distance > state.dist[u] {
                continue;
            }
            settled[u] = true;
            sink.graph_mut().set_mark(u, Mark::Done);
            self.step(sink, StepEvent::VertexSettled { vertex: u, distance })?;
            if u == end {
                break;
            }

            let mut v = sink.graph().first_neighbor(u);
            while v < n {
                let weight = sink.graph().weight(u, v);
                if weight < 0 {
                    tracing::warn!(source = u, dest = v, weight, "dijkstra: negative edge skipped");
                    self.step(
                        sink,
                        StepEvent::NegativeEdgeSkipped {
                            source: u,
                            dest: v,
                            weight,
                        },
                    )?;
                } else {
                    self.narrate(
                        sink,
                        StepEvent::NeighborEvaluated {
                            source: u,
                            dest: v,
                            weight,
                        },
                    );
                    if let Some(better) = state.improves(u, v, weight).filter(|_| !settled[v]) {
                        state.improve(v, u, better);
                        heap.push(Reverse((better, v)));
                        self.relaxed(sink, u, v, better)?;
                    }
                }
                v = sink.graph().next_neighbor(u, v);
            }
        }

        self.conclude(sink, algorithm, start, end, state)
    }

    fn run_bellman_ford<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        start: VertexId,
        end: VertexId,
        record_snapshots: bool,
    ) -> Result<ShortestPathResult> {
        let algorithm = Algorithm::BellmanFord;
        if !in_range(sink.graph(), algorithm, start) || !in_range(sink.graph(), algorithm, end) {
            return Ok(ShortestPathResult::out_of_range());
        }
        self.begin(sink, algorithm, Some(start), Some(end))?;

        let n = sink.graph().vertex_count();
        let edges = edge_list(sink.graph(), false);
        let mut state = Relaxation::new(n, start, record_snapshots);

        for round in 1..n {
            self.step(sink, StepEvent::RelaxationRound { round })?;
            let mut changed = false;
            for edge in &edges {
                if let Some(better) = state.improves(edge.source, edge.dest, edge.weight) {
                    changed = true;
                    state.improve(edge.dest, edge.source, better);
                    sink.graph_mut().set_mark(edge.source, Mark::InProgress);
                    self.relaxed(sink, edge.source, edge.dest, better)?;
                }
            }
            if !changed {
                self.narrate(sink, StepEvent::Converged { round });
                break;
            }
        }

        let cycle_edge = edges
            .iter()
            .find(|e| state.improves(e.source, e.dest, e.weight).is_some());
        if let Some(edge) = cycle_edge {
            tracing::warn!(source = edge.source, dest = edge.dest, "bellman-ford: negative cycle");
            self.narrate(
                sink,
                StepEvent::NegativeCycle {
                    source: edge.source,
                    dest: edge.dest,
                },
            );
            self.finish(sink, algorithm, Outcome::NegativeCycle);
            return Ok(ShortestPathResult {
                final_distance: NEGATIVE_CYCLE,
                snapshots: state.snapshots,
                path: Vec::new(),
            });
        }

        self.conclude(sink, algorithm, start, end, state)
    }

    fn relaxed<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        via: VertexId,
        vertex: VertexId,
        distance: Weight,
    ) -> Result<()> {
        sink.graph_mut().set_mark(vertex, Mark::InProgress);
        self.highlight(sink, via, vertex, true);
        self.step(
            sink,
            StepEvent::DistanceImproved {
                vertex,
                via,
                distance,
            },
        )
    }

    /// Reconstruct and re-highlight the path, then report the outcome.
    fn conclude<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        algorithm: Algorithm,
        start: VertexId,
        end: VertexId,
        state: Relaxation,
    ) -> Result<ShortestPathResult> {
        let final_distance = state.dist[end];
        let path = if final_distance == INFINITE_DISTANCE {
            Vec::new()
        } else {
            state.trace(start, end)
        };

        let outcome = if path.is_empty() {
            Outcome::Unreachable
        } else {
            sink.emit(StepEvent::VisualsReset, Duration::ZERO);
            for pair in path.windows(2) {
                self.highlight(sink, pair[0], pair[1], true);
            }
            for &v in &path {
                sink.graph_mut().set_mark(v, Mark::Done);
            }
            self.step(
                sink,
                StepEvent::PathTraced {
                    path: path.clone(),
                    distance: final_distance,
                },
            )?;
            Outcome::Distance(final_distance)
        };

        self.finish(sink, algorithm, outcome);
        Ok(ShortestPathResult {
            final_distance,
            snapshots: state.snapshots,
            path,
        })
    }
}
