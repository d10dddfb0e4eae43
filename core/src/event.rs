//! Structured step events emitted by every algorithm.
//!
//! Each event renders its own narration through `Display` and maps to a
//! [`PacingClass`] so sinks that animate can decide how long to dwell on it.

use std::fmt;

use crate::config::PacingClass;
use crate::graph::{VertexId, Weight, WeightedEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Dfs,
    Bfs,
    Kruskal,
    Prim,
    Boruvka,
    Dijkstra,
    BellmanFord,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Dfs => "DFS",
            Algorithm::Bfs => "BFS",
            Algorithm::Kruskal => "Kruskal",
            Algorithm::Prim => "Prim",
            Algorithm::Boruvka => "Boruvka",
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::BellmanFord => "Bellman-Ford",
        };
        f.write_str(name)
    }
}

/// Final outcome reported in [`StepEvent::RunFinished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reached(usize),
    TotalWeight(Weight),
    Distance(Weight),
    Unreachable,
    NegativeCycle,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reached(n) => write!(f, "{n} vertices reached"),
            Outcome::TotalWeight(w) => write!(f, "total weight {w}"),
            Outcome::Distance(d) => write!(f, "distance {d}"),
            Outcome::Unreachable => f.write_str("destination unreachable"),
            Outcome::NegativeCycle => f.write_str("negative cycle, no valid solution"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    RunStarted {
        algorithm: Algorithm,
        start: Option<VertexId>,
        end: Option<VertexId>,
    },
    /// Observers should forget all highlight/animation state.
    VisualsReset,
    EdgeHighlighted {
        source: VertexId,
        dest: VertexId,
        visited: bool,
    },
    Discovered {
        vertex: VertexId,
    },
    TreeEdge {
        source: VertexId,
        dest: VertexId,
    },
    Finished {
        vertex: VertexId,
    },
    EdgeConsidered {
        edge: WeightedEdge,
    },
    EdgeAccepted {
        edge: WeightedEdge,
        total_weight: Weight,
    },
    EdgeRejected {
        edge: WeightedEdge,
    },
    /// Prim started a (new) tree at `vertex`.
    TreeSeeded {
        vertex: VertexId,
    },
    /// Borůvka's cheapest outgoing edge for a component this round.
    CheapestEdge {
        component: VertexId,
        edge: WeightedEdge,
    },
    Disconnected {
        components: usize,
    },
    VertexSettled {
        vertex: VertexId,
        distance: Weight,
    },
    NeighborEvaluated {
        source: VertexId,
        dest: VertexId,
        weight: Weight,
    },
    NegativeEdgeSkipped {
        source: VertexId,
        dest: VertexId,
        weight: Weight,
    },
    DistanceImproved {
        vertex: VertexId,
        via: VertexId,
        distance: Weight,
    },
    RelaxationRound {
        round: usize,
    },
    Converged {
        round: usize,
    },
    NegativeCycle {
        source: VertexId,
        dest: VertexId,
    },
    PathTraced {
        path: Vec<VertexId>,
        distance: Weight,
    },
    RunFinished {
        algorithm: Algorithm,
        outcome: Outcome,
    },
}

impl StepEvent {
    pub fn pacing_class(&self) -> PacingClass {
        match self {
            StepEvent::RunStarted { .. } => PacingClass::Intro,
            StepEvent::VisualsReset | StepEvent::EdgeHighlighted { .. } => PacingClass::Silent,
            StepEvent::Discovered { .. }
            | StepEvent::TreeSeeded { .. }
            | StepEvent::VertexSettled { .. } => PacingClass::Discover,
            StepEvent::TreeEdge { .. } => PacingClass::Edge,
            StepEvent::Finished { .. } => PacingClass::Finish,
            StepEvent::EdgeConsidered { .. } | StepEvent::CheapestEdge { .. } => {
                PacingClass::Consider
            }
            StepEvent::EdgeAccepted { .. } | StepEvent::PathTraced { .. } => PacingClass::Accept,
            StepEvent::EdgeRejected { .. } => PacingClass::Reject,
            StepEvent::NeighborEvaluated { .. } | StepEvent::DistanceImproved { .. } => {
                PacingClass::Inspect
            }
            StepEvent::RelaxationRound { .. } | StepEvent::Converged { .. } => PacingClass::Round,
            StepEvent::Disconnected { .. }
            | StepEvent::NegativeEdgeSkipped { .. }
            | StepEvent::NegativeCycle { .. } => PacingClass::Warning,
            StepEvent::RunFinished { .. } => PacingClass::Summary,
        }
    }

    /// Whether the event only updates visual state and carries no narration.
    pub fn is_visual(&self) -> bool {
        matches!(
            self,
            StepEvent::VisualsReset | StepEvent::EdgeHighlighted { .. }
        )
    }
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepEvent::RunStarted {
                algorithm,
                start,
                end,
            } => {
                write!(f, "Starting {algorithm}")?;
                if let Some(s) = start {
                    write!(f, " from {s}")?;
                }
                if let Some(e) = end {
                    write!(f, " to {e}")?;
                }
                Ok(())
            }
            StepEvent::VisualsReset => f.write_str("Visuals reset"),
            StepEvent::EdgeHighlighted {
                source,
                dest,
                visited,
            } => write!(f, "Edge {source} -> {dest} highlighted={visited}"),
            StepEvent::Discovered { vertex } => write!(f, "Discovered: {vertex}"),
            StepEvent::TreeEdge { source, dest } => write!(f, "Edge: {source} -> {dest}"),
            StepEvent::Finished { vertex } => write!(f, "Finished: {vertex}"),
            StepEvent::EdgeConsidered { edge } => write!(f, "Considering edge {edge}"),
            StepEvent::EdgeAccepted { edge, total_weight } => {
                write!(f, "Edge {edge} accepted (total weight: {total_weight})")
            }
            StepEvent::EdgeRejected { edge } => {
                write!(f, "Edge {edge} rejected (would create a cycle)")
            }
            StepEvent::TreeSeeded { vertex } => write!(f, "Growing tree from {vertex}"),
            StepEvent::CheapestEdge { component, edge } => {
                write!(f, "Cheapest edge for component {component}: {edge}")
            }
            StepEvent::Disconnected { components } => write!(
                f,
                "No more components can be merged; graph is disconnected ({components} components)"
            ),
            StepEvent::VertexSettled { vertex, distance } => {
                write!(f, "Processing vertex {vertex} (distance {distance})")
            }
            StepEvent::NeighborEvaluated {
                source,
                dest,
                weight,
            } => write!(f, "Evaluating neighbor {dest} of {source} (weight {weight})"),
            StepEvent::NegativeEdgeSkipped {
                source,
                dest,
                weight,
            } => write!(
                f,
                "Skipping negative edge {source} -> {dest} (weight {weight}); distances may be wrong"
            ),
            StepEvent::DistanceImproved {
                vertex,
                via,
                distance,
            } => write!(f, "Distance to {vertex} improved via {via}: {distance}"),
            StepEvent::RelaxationRound { round } => write!(f, "Relaxation round {round}"),
            StepEvent::Converged { round } => {
                write!(f, "No distance changed in round {round}; stopping early")
            }
            StepEvent::NegativeCycle { source, dest } => {
                write!(f, "Negative cycle detected at edge {source} -> {dest}")
            }
            StepEvent::PathTraced { path, distance } => {
                f.write_str("Path: ")?;
                for (i, v) in path.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" -> ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, " (distance {distance})")
            }
            StepEvent::RunFinished { algorithm, outcome } => {
                write!(f, "{algorithm} finished: {outcome}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_started_message() {
        let event = StepEvent::RunStarted {
            algorithm: Algorithm::Dijkstra,
            start: Some(0),
            end: Some(3),
        };
        assert_eq!(event.to_string(), "Starting Dijkstra from 0 to 3");
        assert_eq!(event.pacing_class(), PacingClass::Intro);
    }

    #[test]
    fn test_path_message() {
        let event = StepEvent::PathTraced {
            path: vec![0, 2, 5],
            distance: 9,
        };
        assert_eq!(event.to_string(), "Path: 0 -> 2 -> 5 (distance 9)");
    }

    #[test]
    fn test_visual_events_silent() {
        let events = [
            StepEvent::VisualsReset,
            StepEvent::EdgeHighlighted {
                source: 0,
                dest: 1,
                visited: true,
            },
        ];
        for event in events {
            assert!(event.is_visual());
            assert_eq!(event.pacing_class(), PacingClass::Silent);
        }
        assert!(!StepEvent::Discovered { vertex: 0 }.is_visual());
    }

    #[test]
    fn test_edge_accepted_message() {
        let event = StepEvent::EdgeAccepted {
            edge: WeightedEdge::new(1, 2, 4),
            total_weight: 7,
        };
        assert_eq!(event.to_string(), "Edge (1 - 2 : 4) accepted (total weight: 7)");
    }
}
