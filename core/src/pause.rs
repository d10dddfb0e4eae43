//! Cooperative pause/resume for a run executing on a background thread.
//!
//! The controller is shared by cloning: the caller keeps one handle to flip
//! the state, the engine keeps another and calls [`PauseController::checkpoint`]
//! between steps. There is no preemption; a paused run stops at its next
//! checkpoint and stays there until resumed or interrupted.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct PauseState {
    paused: bool,
    interrupted: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<PauseState>,
    wake: Condvar,
}

#[derive(Debug, Clone, Default)]
pub struct PauseController {
    inner: Arc<Inner>,
}

impl PauseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.inner.state.lock().paused = true;
    }

    /// Clear the pause and wake every waiting checkpoint.
    pub fn resume(&self) {
        let mut state = self.inner.state.lock();
        state.paused = false;
        self.inner.wake.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.lock().paused
    }

    /// Ask the running algorithm to abandon its run at the next checkpoint.
    pub fn interrupt(&self) {
        let mut state = self.inner.state.lock();
        state.interrupted = true;
        self.inner.wake.notify_all();
    }

    /// Drop any pause or interrupt left over from an earlier run.
    pub fn force_resume(&self) {
        let mut state = self.inner.state.lock();
        if state.paused || state.interrupted {
            tracing::debug!(
                paused = state.paused,
                interrupted = state.interrupted,
                "clearing stale pause state"
            );
        }
        state.paused = false;
        state.interrupted = false;
        self.inner.wake.notify_all();
    }

    /// Block while paused.
    ///
    /// A pending interrupt clears both flags and returns
    /// [`Error::Interrupted`] so the run unwinds instead of waiting forever.
    pub fn checkpoint(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        loop {
            if state.interrupted {
                state.interrupted = false;
                state.paused = false;
                self.inner.wake.notify_all();
                tracing::debug!("run interrupted at checkpoint");
                return Err(Error::Interrupted);
            }
            if !state.paused {
                return Ok(());
            }
            tracing::trace!("run paused at checkpoint");
            self.inner.wake.wait(&mut state);
        }
    }
}
