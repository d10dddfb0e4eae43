use std::fmt;
use std::mem::size_of;

use serde::Serialize;

use crate::error::{Error, Result};

/// Dense vertex index in `0..vertex_count()`.
pub type VertexId = usize;

/// Edge weight and path distance. `0` means "no edge".
pub type Weight = i64;

/// Per-vertex visitation state shared by every algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mark {
    #[default]
    Unvisited,
    /// Discovered but not finished.
    InProgress,
    /// Fully processed.
    Done,
}

/// Weighted directed graph with a fixed vertex count and a mark per vertex.
///
/// Neighbors are enumerated with a cursor protocol rather than a collection:
/// `first_neighbor(v)` yields the smallest out-neighbor of `v` and
/// `next_neighbor(v, after)` the next one strictly greater than `after`.
/// Both return `vertex_count()` when the enumeration is exhausted. Algorithms
/// only use this protocol, so they work with any representation.
///
/// Cursor and mark accessors panic if `v >= vertex_count()`. Edge queries
/// with out-of-range endpoints report "no edge".
pub trait Graph {
    /// Reset to `n` isolated, unmarked vertices.
    fn init(&mut self, n: usize) -> Result<()>;

    fn vertex_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn first_neighbor(&self, v: VertexId) -> VertexId;

    fn next_neighbor(&self, v: VertexId, after: VertexId) -> VertexId;

    /// Insert or update the edge `i → j`. A weight of `0` is ignored; use
    /// [`Graph::delete_edge`] to remove an edge.
    fn set_edge(&mut self, i: VertexId, j: VertexId, weight: Weight) -> Result<()>;

    /// Remove the edge `i → j` if present.
    fn delete_edge(&mut self, i: VertexId, j: VertexId) -> Result<()>;

    fn is_edge(&self, i: VertexId, j: VertexId) -> bool;

    /// Weight of `i → j`, or `0` when absent.
    fn weight(&self, i: VertexId, j: VertexId) -> Weight;

    fn set_mark(&mut self, v: VertexId, mark: Mark);

    fn mark(&self, v: VertexId) -> Mark;

    /// Approximate memory usage in bytes.
    fn memory_usage(&self) -> usize;

    fn reset_marks(&mut self) {
        for v in 0..self.vertex_count() {
            self.set_mark(v, Mark::Unvisited);
        }
    }

    /// Insert `i → j` and `j → i` with the same weight.
    fn set_undirected_edge(&mut self, i: VertexId, j: VertexId, weight: Weight) -> Result<()> {
        self.set_edge(i, j, weight)?;
        self.set_edge(j, i, weight)
    }
}

fn check_vertex(vertex: VertexId, vertex_count: usize) -> Result<()> {
    if vertex < vertex_count {
        Ok(())
    } else {
        Err(Error::VertexOutOfRange {
            vertex,
            vertex_count,
        })
    }
}

/// Iterator over the out-neighbors of a vertex, driven by the cursor protocol.
pub struct Neighbors<'a, G: Graph + ?Sized> {
    graph: &'a G,
    vertex: VertexId,
    cursor: Option<VertexId>,
    exhausted: bool,
}

impl<G: Graph + ?Sized> Iterator for Neighbors<'_, G> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        if self.exhausted {
            return None;
        }
        let next = match self.cursor {
            None => self.graph.first_neighbor(self.vertex),
            Some(after) => self.graph.next_neighbor(self.vertex, after),
        };
        if next >= self.graph.vertex_count() {
            self.exhausted = true;
            return None;
        }
        self.cursor = Some(next);
        Some(next)
    }
}

/// Ascending out-neighbors of `v`.
pub fn neighbors<G: Graph + ?Sized>(graph: &G, v: VertexId) -> Neighbors<'_, G> {
    Neighbors {
        graph,
        vertex: v,
        cursor: None,
        exhausted: false,
    }
}

/// Immutable edge record used by the MST and shortest-path algorithms.
///
/// No natural ordering is implemented; callers order by [`WeightedEdge::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeightedEdge {
    pub source: VertexId,
    pub dest: VertexId,
    pub weight: Weight,
}

impl WeightedEdge {
    pub fn new(source: VertexId, dest: VertexId, weight: Weight) -> Self {
        Self {
            source,
            dest,
            weight,
        }
    }

    /// Strict total order: weight first, then endpoints.
    pub fn key(&self) -> (Weight, VertexId, VertexId) {
        (self.weight, self.source, self.dest)
    }
}

impl fmt::Display for WeightedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} - {} : {})", self.source, self.dest, self.weight)
    }
}

/// Collect every edge in `(source, dest)` enumeration order.
///
/// With `undirected`, only `source < dest` is kept so each symmetric pair
/// appears once.
pub fn edge_list<G: Graph + ?Sized>(graph: &G, undirected: bool) -> Vec<WeightedEdge> {
    let mut edges = Vec::with_capacity(graph.edge_count());
    for u in 0..graph.vertex_count() {
        for v in neighbors(graph, u) {
            if !undirected || u < v {
                edges.push(WeightedEdge::new(u, v, graph.weight(u, v)));
            }
        }
    }
    edges
}

/// Adjacency-matrix graph: O(1) edge queries, O(V) neighbor scans.
///
/// Suited to dense graphs; use [`ListGraph`] for sparse ones.
#[derive(Debug, Clone)]
pub struct MatrixGraph {
    weights: Vec<Weight>,
    marks: Vec<Mark>,
    edge_count: usize,
}

impl MatrixGraph {
    pub fn new(n: usize) -> Result<Self> {
        let mut graph = Self {
            weights: Vec::new(),
            marks: Vec::new(),
            edge_count: 0,
        };
        graph.init(n)?;
        Ok(graph)
    }

    fn row(&self, v: VertexId) -> &[Weight] {
        let n = self.marks.len();
        &self.weights[v * n..(v + 1) * n]
    }

    fn index(&self, i: VertexId, j: VertexId) -> usize {
        i * self.marks.len() + j
    }
}

impl Graph for MatrixGraph {
    fn init(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::EmptyGraph);
        }
        self.weights = vec![0; n * n];
        self.marks = vec![Mark::Unvisited; n];
        self.edge_count = 0;
        Ok(())
    }

    fn vertex_count(&self) -> usize {
        self.marks.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn first_neighbor(&self, v: VertexId) -> VertexId {
        self.row(v)
            .iter()
            .position(|&w| w != 0)
            .unwrap_or(self.marks.len())
    }

    fn next_neighbor(&self, v: VertexId, after: VertexId) -> VertexId {
        let n = self.marks.len();
        let from = after.saturating_add(1);
        if from >= n {
            return n;
        }
        self.row(v)[from..]
            .iter()
            .position(|&w| w != 0)
            .map_or(n, |offset| from + offset)
    }

    fn set_edge(&mut self, i: VertexId, j: VertexId, weight: Weight) -> Result<()> {
        check_vertex(i, self.marks.len())?;
        check_vertex(j, self.marks.len())?;
        if weight == 0 {
            return Ok(());
        }
        let idx = self.index(i, j);
        if self.weights[idx] == 0 {
            self.edge_count += 1;
        }
        self.weights[idx] = weight;
        Ok(())
    }

    fn delete_edge(&mut self, i: VertexId, j: VertexId) -> Result<()> {
        check_vertex(i, self.marks.len())?;
        check_vertex(j, self.marks.len())?;
        let idx = self.index(i, j);
        if self.weights[idx] != 0 {
            self.weights[idx] = 0;
            self.edge_count -= 1;
        }
        Ok(())
    }

    fn is_edge(&self, i: VertexId, j: VertexId) -> bool {
        self.weight(i, j) != 0
    }

    fn weight(&self, i: VertexId, j: VertexId) -> Weight {
        let n = self.marks.len();
        if i >= n || j >= n {
            return 0;
        }
        self.weights[self.index(i, j)]
    }

    fn set_mark(&mut self, v: VertexId, mark: Mark) {
        self.marks[v] = mark;
    }

    fn mark(&self, v: VertexId) -> Mark {
        self.marks[v]
    }

    fn memory_usage(&self) -> usize {
        self.weights.len() * size_of::<Weight>() + self.marks.len() * size_of::<Mark>()
    }
}

/// An outgoing edge in a [`ListGraph`] adjacency list.
#[derive(Debug, Clone, Copy)]
struct Edge {
    target: VertexId,
    weight: Weight,
}

/// Adjacency-list graph: O(degree) memory per vertex.
///
/// Each list is kept sorted by target, so the cursor protocol and edge
/// queries are binary searches.
#[derive(Debug, Clone)]
pub struct ListGraph {
    outgoing: Vec<Vec<Edge>>,
    marks: Vec<Mark>,
    edge_count: usize,
}

impl ListGraph {
    pub fn new(n: usize) -> Result<Self> {
        let mut graph = Self {
            outgoing: Vec::new(),
            marks: Vec::new(),
            edge_count: 0,
        };
        graph.init(n)?;
        Ok(graph)
    }

    fn find(&self, i: VertexId, j: VertexId) -> std::result::Result<usize, usize> {
        self.outgoing[i].binary_search_by_key(&j, |e| e.target)
    }
}

impl Graph for ListGraph {
    fn init(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::EmptyGraph);
        }
        self.outgoing = vec![Vec::new(); n];
        self.marks = vec![Mark::Unvisited; n];
        self.edge_count = 0;
        Ok(())
    }

    fn vertex_count(&self) -> usize {
        self.marks.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn first_neighbor(&self, v: VertexId) -> VertexId {
        self.outgoing[v]
            .first()
            .map_or(self.marks.len(), |e| e.target)
    }

    fn next_neighbor(&self, v: VertexId, after: VertexId) -> VertexId {
        let edges = &self.outgoing[v];
        let idx = edges.partition_point(|e| e.target <= after);
        edges.get(idx).map_or(self.marks.len(), |e| e.target)
    }

    fn set_edge(&mut self, i: VertexId, j: VertexId, weight: Weight) -> Result<()> {
        check_vertex(i, self.marks.len())?;
        check_vertex(j, self.marks.len())?;
        if weight == 0 {
            return Ok(());
        }
        match self.find(i, j) {
            Ok(idx) => self.outgoing[i][idx].weight = weight,
            Err(idx) => {
                self.outgoing[i].insert(idx, Edge { target: j, weight });
                self.edge_count += 1;
            }
        }
        Ok(())
    }

    fn delete_edge(&mut self, i: VertexId, j: VertexId) -> Result<()> {
        check_vertex(i, self.marks.len())?;
        check_vertex(j, self.marks.len())?;
        if let Ok(idx) = self.find(i, j) {
            self.outgoing[i].remove(idx);
            self.edge_count -= 1;
        }
        Ok(())
    }

    fn is_edge(&self, i: VertexId, j: VertexId) -> bool {
        self.weight(i, j) != 0
    }

    fn weight(&self, i: VertexId, j: VertexId) -> Weight {
        if i >= self.marks.len() || j >= self.marks.len() {
            return 0;
        }
        self.find(i, j)
            .map_or(0, |idx| self.outgoing[i][idx].weight)
    }

    fn set_mark(&mut self, v: VertexId, mark: Mark) {
        self.marks[v] = mark;
    }

    fn mark(&self, v: VertexId) -> Mark {
        self.marks[v]
    }

    fn memory_usage(&self) -> usize {
        let lists: usize = self
            .outgoing
            .iter()
            .map(|l| l.capacity() * size_of::<Edge>() + size_of::<Vec<Edge>>())
            .sum();
        lists + self.marks.len() * size_of::<Mark>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(n: usize) -> (MatrixGraph, ListGraph) {
        (MatrixGraph::new(n).unwrap(), ListGraph::new(n).unwrap())
    }

    fn check_cursor<G: Graph>(g: &mut G) {
        g.set_edge(2, 4, 7).unwrap();
        g.set_edge(2, 0, 3).unwrap();
        g.set_edge(2, 3, 1).unwrap();
        assert_eq!(g.first_neighbor(2), 0);
        assert_eq!(g.next_neighbor(2, 0), 3);
        assert_eq!(g.next_neighbor(2, 3), 4);
        assert_eq!(g.next_neighbor(2, 4), g.vertex_count());
        assert_eq!(g.first_neighbor(1), g.vertex_count());
        assert_eq!(neighbors(g, 2).collect::<Vec<_>>(), vec![0, 3, 4]);
    }

    #[test]
    fn test_cursor_protocol_ascending() {
        let (mut m, mut l) = both(5);
        check_cursor(&mut m);
        check_cursor(&mut l);
    }

    #[test]
    fn test_next_neighbor_after_non_neighbor() {
        let (mut m, mut l) = both(6);
        for g in [&mut m as &mut dyn Graph, &mut l] {
            g.set_edge(0, 1, 1).unwrap();
            g.set_edge(0, 5, 1).unwrap();
            assert_eq!(g.next_neighbor(0, 2), 5);
            assert_eq!(g.next_neighbor(0, 5), 6);
        }
    }

    #[test]
    fn test_zero_weight_is_noop() {
        let (mut m, mut l) = both(3);
        for g in [&mut m as &mut dyn Graph, &mut l] {
            g.set_edge(0, 1, 4).unwrap();
            g.set_edge(0, 1, 0).unwrap();
            g.set_edge(1, 2, 0).unwrap();
            assert_eq!(g.weight(0, 1), 4);
            assert!(!g.is_edge(1, 2));
            assert_eq!(g.edge_count(), 1);
        }
    }

    #[test]
    fn test_set_edge_upserts() {
        let (mut m, mut l) = both(3);
        for g in [&mut m as &mut dyn Graph, &mut l] {
            g.set_edge(0, 2, 4).unwrap();
            g.set_edge(0, 2, -6).unwrap();
            assert_eq!(g.weight(0, 2), -6);
            assert_eq!(g.edge_count(), 1);
        }
    }

    #[test]
    fn test_delete_edge() {
        let (mut m, mut l) = both(3);
        for g in [&mut m as &mut dyn Graph, &mut l] {
            g.set_edge(0, 1, 2).unwrap();
            g.delete_edge(0, 1).unwrap();
            g.delete_edge(0, 1).unwrap();
            assert!(!g.is_edge(0, 1));
            assert_eq!(g.weight(0, 1), 0);
            assert_eq!(g.edge_count(), 0);
        }
    }

    #[test]
    fn test_out_of_range_mutation_rejected() {
        let (mut m, mut l) = both(2);
        for g in [&mut m as &mut dyn Graph, &mut l] {
            let err = g.set_edge(0, 2, 1).unwrap_err();
            assert!(matches!(
                err,
                Error::VertexOutOfRange {
                    vertex: 2,
                    vertex_count: 2
                }
            ));
            assert!(g.delete_edge(5, 0).is_err());
            assert!(!g.is_edge(9, 9));
            assert_eq!(g.weight(0, 9), 0);
        }
    }

    #[test]
    fn test_empty_graph_rejected() {
        assert!(matches!(MatrixGraph::new(0), Err(Error::EmptyGraph)));
        assert!(matches!(ListGraph::new(0), Err(Error::EmptyGraph)));
    }

    #[test]
    fn test_init_resets_edges_and_marks() {
        let (mut m, mut l) = both(3);
        for g in [&mut m as &mut dyn Graph, &mut l] {
            g.set_undirected_edge(0, 1, 3).unwrap();
            g.set_mark(1, Mark::Done);
            g.init(4).unwrap();
            assert_eq!(g.vertex_count(), 4);
            assert_eq!(g.edge_count(), 0);
            assert_eq!(g.mark(1), Mark::Unvisited);
        }
    }

    #[test]
    fn test_reset_marks() {
        let mut g = ListGraph::new(3).unwrap();
        g.set_mark(0, Mark::InProgress);
        g.set_mark(2, Mark::Done);
        g.reset_marks();
        assert!((0..3).all(|v| g.mark(v) == Mark::Unvisited));
    }

    #[test]
    fn test_edge_list_undirected_once() {
        let mut g = MatrixGraph::new(3).unwrap();
        g.set_undirected_edge(0, 1, 5).unwrap();
        g.set_undirected_edge(1, 2, 2).unwrap();
        let edges = edge_list(&g, true);
        assert_eq!(
            edges,
            vec![WeightedEdge::new(0, 1, 5), WeightedEdge::new(1, 2, 2)]
        );
        assert_eq!(edge_list(&g, false).len(), 4);
    }

    #[test]
    fn test_memory_usage_nonzero() {
        let (m, l) = both(10);
        assert!(m.memory_usage() > 0);
        assert!(l.memory_usage() > 0);
    }
}
