//! graph-stepper-core: step-by-step graph algorithm engine.
//!
//! Traversal (DFS, BFS), minimum spanning forests (Kruskal, Prim, Borůvka)
//! and single-source shortest paths (Dijkstra, Bellman-Ford) over a
//! representation-agnostic [`Graph`] trait. Every run narrates its progress as
//! [`StepEvent`]s to a [`StepSink`] and stops at a cooperative pause
//! checkpoint between steps, so a UI can animate, pause and abort a run that
//! executes on a background thread.
//!
//! No rendering or I/O lives here. Headless callers use [`Recorder`].

mod config;
mod engine;
mod error;
mod event;
mod graph;
mod mst;
mod observer;
mod pause;
mod shortest_path;
mod traversal;
mod union_find;

pub use config::{EngineConfig, Pacing, PacingClass, MAX_SCALE};
pub use engine::Engine;
pub use error::{Error, Result};
pub use event::{Algorithm, Outcome, StepEvent};
pub use graph::{
    edge_list, neighbors, Graph, ListGraph, Mark, MatrixGraph, Neighbors, VertexId, Weight,
    WeightedEdge,
};
pub use mst::MstResult;
pub use observer::{Observer, ObserverSink, Recorder, StepSink};
pub use pause::PauseController;
pub use shortest_path::{ShortestPathResult, INFINITE_DISTANCE, NEGATIVE_CYCLE};
pub use traversal::TraversalResult;
pub use union_find::DisjointSet;
