use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::event::{Algorithm, Outcome, StepEvent};
use crate::graph::{Graph, VertexId};
use crate::observer::StepSink;
use crate::pause::PauseController;

/// Runs algorithms against a [`StepSink`], pacing each step and stopping at
/// the pause checkpoint in between.
///
/// The algorithm entry points live next to their implementations
/// (`traversal`, `mst`, `shortest_path`). Cloning an engine shares its pause
/// controller, so a clone can be moved onto the run thread while the original
/// stays with the caller.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    pause: PauseController,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pause: PauseController::new(),
        }
    }

    /// Use an existing controller, e.g. one owned by a UI.
    pub fn with_pause(config: EngineConfig, pause: PauseController) -> Self {
        Self { config, pause }
    }

    pub fn headless() -> Self {
        Self::new(EngineConfig::headless())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pause_controller(&self) -> &PauseController {
        &self.pause
    }

    /// Common run prologue: clear stale pause state, reset marks and
    /// visuals, announce the run.
    pub(crate) fn begin<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        algorithm: Algorithm,
        start: Option<VertexId>,
        end: Option<VertexId>,
    ) -> Result<()> {
        self.pause.force_resume();
        tracing::debug!(%algorithm, ?start, ?end, "run started");
        sink.graph_mut().reset_marks();
        sink.emit(StepEvent::VisualsReset, Duration::ZERO);
        self.step(
            sink,
            StepEvent::RunStarted {
                algorithm,
                start,
                end,
            },
        )
    }

    /// Emit a narrated event, then honor the pause checkpoint.
    pub(crate) fn step<S: StepSink + ?Sized>(&self, sink: &mut S, event: StepEvent) -> Result<()> {
        self.narrate(sink, event);
        self.pause.checkpoint()
    }

    /// Emit a narrated event without a checkpoint.
    pub(crate) fn narrate<S: StepSink + ?Sized>(&self, sink: &mut S, event: StepEvent) {
        let pacing = self.config.pacing.duration(event.pacing_class());
        sink.emit(event, pacing);
    }

    pub(crate) fn highlight<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        source: VertexId,
        dest: VertexId,
        visited: bool,
    ) {
        sink.emit(
            StepEvent::EdgeHighlighted {
                source,
                dest,
                visited,
            },
            Duration::ZERO,
        );
    }

    pub(crate) fn finish<S: StepSink + ?Sized>(
        &self,
        sink: &mut S,
        algorithm: Algorithm,
        outcome: Outcome,
    ) {
        tracing::debug!(%algorithm, %outcome, "run finished");
        self.narrate(sink, StepEvent::RunFinished { algorithm, outcome });
    }
}

/// `true` when `vertex` is a valid index, logging a warning otherwise.
pub(crate) fn in_range<G: Graph + ?Sized>(
    graph: &G,
    algorithm: Algorithm,
    vertex: VertexId,
) -> bool {
    let vertex_count = graph.vertex_count();
    if vertex < vertex_count {
        return true;
    }
    tracing::warn!(%algorithm, vertex, vertex_count, "vertex out of range, run rejected");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::{ListGraph, Mark};
    use crate::observer::Recorder;
    use std::sync::mpsc;
    use std::thread;

    fn make_chain(n: usize) -> ListGraph {
        let mut g = ListGraph::new(n).unwrap();
        for i in 0..n - 1 {
            g.set_edge(i, i + 1, 1).unwrap();
        }
        g
    }

    /// Pauses (or interrupts) the engine's controller right after the tree
    /// edge into vertex 1 is reported.
    struct Tripwire {
        inner: Recorder<ListGraph>,
        pause: PauseController,
        interrupt: bool,
        tripped: Option<mpsc::Sender<()>>,
    }

    impl StepSink for Tripwire {
        type Graph = ListGraph;

        fn graph(&self) -> &ListGraph {
            self.inner.graph()
        }

        fn graph_mut(&mut self) -> &mut ListGraph {
            self.inner.graph_mut()
        }

        fn emit(&mut self, event: StepEvent, pacing: Duration) {
            let trip = matches!(event, StepEvent::TreeEdge { dest: 1, .. });
            self.inner.emit(event, pacing);
            if trip {
                if self.interrupt {
                    self.pause.interrupt();
                } else {
                    self.pause.pause();
                }
                if let Some(tx) = self.tripped.take() {
                    tx.send(()).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_begin_clears_stale_pause() {
        let engine = Engine::headless();
        engine.pause_controller().pause();
        let mut rec = Recorder::new(make_chain(3));
        let result = engine.bfs(&mut rec, 0).unwrap();
        assert_eq!(result.discovered, vec![0, 1, 2]);
        assert!(!engine.pause_controller().is_paused());
    }

    #[test]
    fn test_with_pause_shares_controller() {
        let pause = PauseController::new();
        let engine = Engine::with_pause(EngineConfig::headless(), pause.clone());
        pause.pause();
        assert!(engine.pause_controller().is_paused());
        engine.pause_controller().resume();
        assert!(!pause.is_paused());
    }

    #[test]
    fn test_begin_resets_marks_and_visuals() {
        let engine = Engine::headless();
        let mut g = make_chain(3);
        g.set_mark(2, Mark::Done);
        let mut rec = Recorder::new(g);
        engine
            .begin(&mut rec, Algorithm::Bfs, Some(0), None)
            .unwrap();
        assert_eq!(rec.graph().mark(2), Mark::Unvisited);
        assert_eq!(rec.events()[0], StepEvent::VisualsReset);
        assert!(matches!(rec.events()[1], StepEvent::RunStarted { .. }));
    }

    #[test]
    fn test_interrupt_aborts_run() {
        let engine = Engine::headless();
        let mut sink = Tripwire {
            inner: Recorder::new(make_chain(5)),
            pause: engine.pause_controller().clone(),
            interrupt: true,
            tripped: None,
        };
        let err = engine.dfs(&mut sink, 0).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert!(!engine.pause_controller().is_paused());
        // vertex 2 was never reached
        assert_eq!(sink.graph().mark(2), Mark::Unvisited);
    }

    #[test]
    fn test_pause_blocks_run_until_resume() {
        let engine = Engine::headless();
        let (tripped_tx, tripped_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let sink = Tripwire {
            inner: Recorder::new(make_chain(4)),
            pause: engine.pause_controller().clone(),
            interrupt: false,
            tripped: Some(tripped_tx),
        };

        let worker = {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut sink = sink;
                let result = engine.dfs(&mut sink, 0);
                done_tx.send(()).unwrap();
                result
            })
        };

        tripped_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(engine.pause_controller().is_paused());
        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

        engine.pause_controller().resume();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let result = worker.join().unwrap().unwrap();
        assert_eq!(result.discovered, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_interrupt_while_paused() {
        let engine = Engine::headless();
        let (tripped_tx, tripped_rx) = mpsc::channel();

        let sink = Tripwire {
            inner: Recorder::new(make_chain(4)),
            pause: engine.pause_controller().clone(),
            interrupt: false,
            tripped: Some(tripped_tx),
        };

        let worker = {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut sink = sink;
                engine.bfs(&mut sink, 0)
            })
        };

        tripped_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        engine.pause_controller().interrupt();
        let result = worker.join().unwrap();
        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(!engine.pause_controller().is_paused());
    }

    #[test]
    fn test_pacing_follows_config() {
        let engine = Engine::new(EngineConfig::default());
        let mut rec = Recorder::new(make_chain(2));
        engine.narrate(&mut rec, StepEvent::Discovered { vertex: 0 });
        engine.highlight(&mut rec, 0, 1, true);
        assert_eq!(rec.total_pacing(), Duration::from_millis(800));
    }
}
