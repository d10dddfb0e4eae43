use std::collections::VecDeque;

use serde::Serialize;

use crate::engine::{in_range, Engine};
use crate::error::Result;
use crate::event::{Algorithm, Outcome, StepEvent};
use crate::graph::{Graph, Mark, VertexId};
use crate::observer::StepSink;

/// Result of a DFS or BFS run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalResult {
    /// Vertices in the order they were first marked in-progress.
    pub discovered: Vec<VertexId>,
    /// Vertices in the order they were marked done.
    pub finished: Vec<VertexId>,
    /// Edges followed to discover a vertex; a spanning tree of the reached
    /// component.
    pub tree_edges: Vec<(VertexId, VertexId)>,
}

impl TraversalResult {
    pub fn reached(&self) -> usize {
        self.discovered.len()
    }
}

/// First out-neighbor of `v` after `cursor` (or from the start when `None`)
/// that is still unvisited.
fn next_unvisited<G: Graph + ?Sized>(
    graph: &G,
    v: VertexId,
    cursor: Option<VertexId>,
) -> Option<VertexId> {
    let n = graph.vertex_count();
    let mut w = match cursor {
        None => graph.first_neighbor(v),
        Some(after) => graph.next_neighbor(v, after),
    };
    while w < n {
        if graph.mark(w) == Mark::Unvisited {
            return Some(w);
        }
        w = graph.next_neighbor(v, w);
    }
    None
}

impl Engine {
    /// Depth-first search from `start`.
    ///
    /// Neighbors are visited in ascending order. Every discovery, tree edge,
    /// and finish is narrated and followed by a pause checkpoint. An
    /// out-of-range `start` yields an empty result.
    pub fn dfs<S: StepSink + ?Sized>(&self, sink: &mut S, start: VertexId) -> Result<TraversalResult> {
        let mut result = TraversalResult::default();
        if !in_range(sink.graph(), Algorithm::Dfs, start) {
            return Ok(result);
        }
        self.begin(sink, Algorithm::Dfs, Some(start), None)?;

        if sink.graph().mark(start) == Mark::Unvisited {
            self.discover(sink, start, &mut result)?;

            // Explicit stack of (vertex, last neighbor tried) frames; emits the
            // same event sequence as the recursive formulation.
            let mut stack: Vec<(VertexId, Option<VertexId>)> = vec![(start, None)];
            while let Some(frame) = stack.last_mut() {
                let (v, cursor) = *frame;
                match next_unvisited(sink.graph(), v, cursor) {
                    Some(w) => {
                        frame.1 = Some(w);
                        result.tree_edges.push((v, w));
                        self.highlight(sink, v, w, true);
                        self.step(sink, StepEvent::TreeEdge { source: v, dest: w })?;
                        self.discover(sink, w, &mut result)?;
                        stack.push((w, None));
                    }
                    None => {
                        stack.pop();
                        self.complete(sink, v, &mut result)?;
                    }
                }
            }
        }

        self.finish(sink, Algorithm::Dfs, Outcome::Reached(result.reached()));
        Ok(result)
    }

    /// Breadth-first search from `start`.
    ///
    /// Neighbors are enqueued in ascending order; a vertex is marked done
    /// once all of its neighbors have been examined.
    pub fn bfs<S: StepSink + ?Sized>(&self, sink: &mut S, start: VertexId) -> Result<TraversalResult> {
        let mut result = TraversalResult::default();
        if !in_range(sink.graph(), Algorithm::Bfs, start) {
            return Ok(result);
        }
        self.begin(sink, Algorithm::Bfs, Some(start), None)?;

        let n = sink.graph().vertex_count();
        let mut queue: VecDeque<VertexId> = VecDeque::new();

        self.discover(sink, start, &mut result)?;
        queue.push_back(start);

        while let Some(v) = queue.pop_front() {
            let mut w = sink.graph().first_neighbor(v);
            while w < n {
                if sink.graph().mark(w) == Mark::Unvisited {
                    sink.graph_mut().set_mark(w, Mark::InProgress);
                    result.discovered.push(w);
                    result.tree_edges.push((v, w));
                    self.highlight(sink, v, w, true);
                    self.step(sink, StepEvent::TreeEdge { source: v, dest: w })?;
                    queue.push_back(w);
                }
                w = sink.graph().next_neighbor(v, w);
            }
            self.complete(sink, v, &mut result)?;
        }

        self.finish(sink, Algorithm::Bfs, Outcome::Reached(result.reached()));
        Ok(result)
    }

    fn discover<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        vertex: VertexId,
        result: &mut TraversalResult,
    ) -> Result<()> {
        sink.graph_mut().set_mark(vertex, Mark::InProgress);
        result.discovered.push(vertex);
        self.step(sink, StepEvent::Discovered { vertex })
    }

    fn complete<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        vertex: VertexId,
        result: &mut TraversalResult,
    ) -> Result<()> {
        sink.graph_mut().set_mark(vertex, Mark::Done);
        result.finished.push(vertex);
        self.step(sink, StepEvent::Finished { vertex })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ListGraph, MatrixGraph};
    use crate::observer::Recorder;

    fn load<G: Graph>(mut g: G, edges: &[(VertexId, VertexId)]) -> G {
        for &(from, to) in edges {
            g.set_edge(from, to, 10).unwrap();
        }
        g
    }

    fn make_chain(n: usize) -> ListGraph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        load(ListGraph::new(n).unwrap(), &edges)
    }

    fn make_star(leaves: usize) -> ListGraph {
        let edges: Vec<_> = (1..=leaves).map(|i| (0, i)).collect();
        load(ListGraph::new(leaves + 1).unwrap(), &edges)
    }

    fn make_cycle(n: usize) -> ListGraph {
        let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        load(ListGraph::new(n).unwrap(), &edges)
    }

    const SCENARIO: [(VertexId, VertexId); 6] = [(0, 1), (0, 2), (1, 3), (2, 4), (4, 1), (3, 0)];

    fn all_done<G: Graph>(g: &G) -> bool {
        (0..g.vertex_count()).all(|v| g.mark(v) == Mark::Done)
    }

    // --- DFS tests ---

    #[test]
    fn test_dfs_discovery_order_matrix() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(load(MatrixGraph::new(5).unwrap(), &SCENARIO));
        let result = engine.dfs(&mut rec, 0).unwrap();
        assert_eq!(result.discovered, vec![0, 1, 3, 2, 4]);
        assert_eq!(result.finished, vec![3, 1, 4, 2, 0]);
        assert!(all_done(rec.graph()));
    }

    #[test]
    fn test_dfs_discovery_order_list() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(load(ListGraph::new(5).unwrap(), &SCENARIO));
        let result = engine.dfs(&mut rec, 0).unwrap();
        assert_eq!(result.discovered, vec![0, 1, 3, 2, 4]);
        assert!(all_done(rec.graph()));
    }

    #[test]
    fn test_dfs_event_sequence() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(2));
        engine.dfs(&mut rec, 0).unwrap();
        assert_eq!(
            rec.messages(),
            vec![
                "Starting DFS from 0",
                "Discovered: 0",
                "Edge: 0 -> 1",
                "Discovered: 1",
                "Finished: 1",
                "Finished: 0",
                "DFS finished: 2 vertices reached",
            ]
        );
    }

    #[test]
    fn test_dfs_unreachable_stay_unvisited() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(5));
        let result = engine.dfs(&mut rec, 2).unwrap();
        assert_eq!(result.discovered, vec![2, 3, 4]);
        assert_eq!(rec.graph().mark(0), Mark::Unvisited);
        assert_eq!(rec.graph().mark(1), Mark::Unvisited);
        assert_eq!(rec.graph().mark(4), Mark::Done);
    }

    #[test]
    fn test_dfs_tree_edges_span_component() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_cycle(6));
        let result = engine.dfs(&mut rec, 3).unwrap();
        assert_eq!(result.reached(), 6);
        assert_eq!(result.tree_edges.len(), result.reached() - 1);
        assert_eq!(rec.highlighted_edges().len(), 5);
    }

    #[test]
    fn test_dfs_self_loop() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(load(ListGraph::new(2).unwrap(), &[(0, 0), (0, 1)]));
        let result = engine.dfs(&mut rec, 0).unwrap();
        assert_eq!(result.discovered, vec![0, 1]);
        assert_eq!(result.tree_edges, vec![(0, 1)]);
    }

    #[test]
    fn test_dfs_deep_chain_no_recursion_limit() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(50_000));
        let result = engine.dfs(&mut rec, 0).unwrap();
        assert_eq!(result.reached(), 50_000);
        assert_eq!(result.finished[0], 49_999);
    }

    #[test]
    fn test_dfs_start_out_of_range() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(3));
        let result = engine.dfs(&mut rec, 3).unwrap();
        assert_eq!(result, TraversalResult::default());
        assert!(rec.events().is_empty());
    }

    #[test]
    fn test_dfs_rerun_resets_marks() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(4));
        engine.dfs(&mut rec, 0).unwrap();
        let result = engine.dfs(&mut rec, 2).unwrap();
        assert_eq!(result.discovered, vec![2, 3]);
        assert_eq!(rec.graph().mark(0), Mark::Unvisited);
        // the reset before the second run dropped the first run's highlights
        assert_eq!(rec.highlighted_edges(), vec![(2, 3)]);
    }

    // --- BFS tests ---

    #[test]
    fn test_bfs_scenario_order() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(load(ListGraph::new(5).unwrap(), &SCENARIO));
        let result = engine.bfs(&mut rec, 0).unwrap();
        assert_eq!(result.discovered, vec![0, 1, 2, 3, 4]);
        assert_eq!(result.finished, vec![0, 1, 2, 3, 4]);
        assert!(all_done(rec.graph()));
    }

    #[test]
    fn test_bfs_star() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_star(50));
        let result = engine.bfs(&mut rec, 0).unwrap();
        assert_eq!(result.reached(), 51);
        assert!(result.tree_edges.iter().all(|&(from, _)| from == 0));

        // leaves have no outgoing edges
        let result = engine.bfs(&mut rec, 7).unwrap();
        assert_eq!(result.discovered, vec![7]);
        assert_eq!(rec.graph().mark(0), Mark::Unvisited);
    }

    #[test]
    fn test_bfs_cycle_no_infinite_loop() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_cycle(5));
        let result = engine.bfs(&mut rec, 0).unwrap();
        assert_eq!(result.reached(), 5);
        assert_eq!(result.tree_edges.len(), 4);
    }

    #[test]
    fn test_bfs_event_sequence() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_star(2));
        engine.bfs(&mut rec, 0).unwrap();
        assert_eq!(
            rec.messages(),
            vec![
                "Starting BFS from 0",
                "Discovered: 0",
                "Edge: 0 -> 1",
                "Edge: 0 -> 2",
                "Finished: 0",
                "Finished: 1",
                "Finished: 2",
                "BFS finished: 3 vertices reached",
            ]
        );
    }

    #[test]
    fn test_bfs_highlights_tree_edges() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(load(MatrixGraph::new(4).unwrap(), &[(0, 1), (1, 2), (0, 2), (2, 3)]));
        let result = engine.bfs(&mut rec, 0).unwrap();
        assert_eq!(result.tree_edges, vec![(0, 1), (0, 2), (2, 3)]);
        assert_eq!(rec.highlighted_edges(), result.tree_edges);
    }

    #[test]
    fn test_bfs_start_out_of_range() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(2));
        assert_eq!(engine.bfs(&mut rec, 9).unwrap().reached(), 0);
    }

    #[test]
    fn test_dfs_bfs_reach_same_set() {
        let engine = Engine::headless();
        let edges = [(0, 3), (3, 5), (5, 1), (1, 3), (2, 4), (4, 6)];
        let mut rec = Recorder::new(load(ListGraph::new(7).unwrap(), &edges));
        let mut dfs = engine.dfs(&mut rec, 0).unwrap().discovered;
        let mut bfs = engine.bfs(&mut rec, 0).unwrap().discovered;
        dfs.sort_unstable();
        bfs.sort_unstable();
        assert_eq!(dfs, vec![0, 1, 3, 5]);
        assert_eq!(dfs, bfs);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let engine = Engine::headless();
        let mut rec = Recorder::new(make_chain(3));
        let result = engine.dfs(&mut rec, 0).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["discovered"], serde_json::json!([0, 1, 2]));
        assert_eq!(json["finished"], serde_json::json!([2, 1, 0]));
        assert_eq!(json["tree_edges"], serde_json::json!([[0, 1], [1, 2]]));
    }
}
