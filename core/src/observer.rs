//! The boundary between algorithms and whoever watches them.
//!
//! Algorithms talk to a [`StepSink`]: they borrow the graph through it and
//! emit [`StepEvent`]s. A UI implements the narrower [`Observer`] port and is
//! plugged in through [`ObserverSink`]. [`Recorder`] is a headless sink that
//! keeps every event, used by tests and benchmarks.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::event::StepEvent;
use crate::graph::{Graph, VertexId};

/// Receives step events and owns (or borrows) the graph under the run.
pub trait StepSink {
    type Graph: Graph + ?Sized;

    fn graph(&self) -> &Self::Graph;

    fn graph_mut(&mut self) -> &mut Self::Graph;

    /// Handle one event. Animating sinks block for roughly `pacing`.
    fn emit(&mut self, event: StepEvent, pacing: Duration);
}

/// UI-shaped observer port.
pub trait Observer {
    type Graph: Graph + ?Sized;

    fn graph(&self) -> &Self::Graph;

    fn graph_mut(&mut self) -> &mut Self::Graph;

    /// Forget all edge-highlight and animation state.
    fn reset_visuals(&mut self);

    fn mark_edge(&mut self, source: VertexId, dest: VertexId, visited: bool);

    /// Show `message`, redraw, then block for about `pacing`. A zero
    /// duration still redraws but must not block.
    fn pause_and_redraw(&mut self, message: &str, pacing: Duration);
}

/// Adapts an [`Observer`] to the [`StepSink`] interface.
pub struct ObserverSink<O> {
    observer: O,
}

impl<O: Observer> ObserverSink<O> {
    pub fn new(observer: O) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_inner(self) -> O {
        self.observer
    }
}

impl<O: Observer> StepSink for ObserverSink<O> {
    type Graph = O::Graph;

    fn graph(&self) -> &Self::Graph {
        self.observer.graph()
    }

    fn graph_mut(&mut self) -> &mut Self::Graph {
        self.observer.graph_mut()
    }

    fn emit(&mut self, event: StepEvent, pacing: Duration) {
        match event {
            StepEvent::VisualsReset => self.observer.reset_visuals(),
            StepEvent::EdgeHighlighted {
                source,
                dest,
                visited,
            } => self.observer.mark_edge(source, dest, visited),
            other => self.observer.pause_and_redraw(&other.to_string(), pacing),
        }
    }
}

/// Headless sink: owns the graph, records events, never sleeps.
#[derive(Debug)]
pub struct Recorder<G> {
    graph: G,
    events: Vec<StepEvent>,
    total_pacing: Duration,
}

impl<G: Graph> Recorder<G> {
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            events: Vec::new(),
            total_pacing: Duration::ZERO,
        }
    }

    pub fn events(&self) -> &[StepEvent] {
        &self.events
    }

    /// Narration lines, skipping purely visual events.
    pub fn messages(&self) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| !e.is_visual())
            .map(|e| e.to_string())
            .collect()
    }

    /// Sum of the pacing an animating sink would have slept for.
    pub fn total_pacing(&self) -> Duration {
        self.total_pacing
    }

    /// Edges whose latest highlight since the last reset is `visited`,
    /// sorted by `(source, dest)`.
    pub fn highlighted_edges(&self) -> Vec<(VertexId, VertexId)> {
        let mut state: BTreeMap<(VertexId, VertexId), bool> = BTreeMap::new();
        for event in &self.events {
            match *event {
                StepEvent::VisualsReset => state.clear(),
                StepEvent::EdgeHighlighted {
                    source,
                    dest,
                    visited,
                } => {
                    state.insert((source, dest), visited);
                }
                _ => {}
            }
        }
        state
            .into_iter()
            .filter_map(|(edge, visited)| visited.then_some(edge))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.total_pacing = Duration::ZERO;
    }
}

impl<G: Graph> StepSink for Recorder<G> {
    type Graph = G;

    fn graph(&self) -> &G {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    fn emit(&mut self, event: StepEvent, pacing: Duration) {
        self.total_pacing += pacing;
        self.events.push(event);
    }
}
