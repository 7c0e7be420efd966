//! Background execution of matching runs.

use std::fmt::Debug;
use std::sync::Arc;
use std::thread::JoinHandle;

use recipeforge_config::MatchConfig;
use recipeforge_core::{CapabilityModel, MatchError, MatchOutcome, RequirementModel, Result};
use tokio::sync::mpsc;
use tracing::debug;

use crate::driver::MatchDriver;
use crate::event::MatchEventListener;
use crate::realtime::{ChannelEventListener, MatchEvent, MatchHandle};

/// Starts matching runs on worker threads.
///
/// # Example
///
/// ```
/// use recipeforge_config::MatchConfig;
/// use recipeforge_solver::manager::MatchManager;
/// use recipeforge_test::mix_heat::{mix_heat_capabilities, mix_heat_requirements};
///
/// let manager = MatchManager::new(MatchConfig::default());
/// let job = manager
///     .spawn(mix_heat_requirements(), mix_heat_capabilities())
///     .unwrap();
///
/// let outcome = job.wait().unwrap();
/// assert_eq!(outcome.solutions().map(|s| s.len()), Some(1));
/// ```
#[derive(Default)]
pub struct MatchManager {
    config: MatchConfig,
    listeners: Vec<Arc<dyn MatchEventListener>>,
}

impl MatchManager {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    /// Adds a listener attached to every run started afterwards.
    pub fn with_listener(mut self, listener: Arc<dyn MatchEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Starts a run on a new thread.
    ///
    /// The models are moved into the worker; each run has its own
    /// constraint system and backend.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Internal`] if the thread cannot be spawned.
    pub fn spawn(
        &self,
        requirements: RequirementModel,
        capabilities: CapabilityModel,
    ) -> Result<MatchJob> {
        let handle = MatchHandle::new();
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut driver = MatchDriver::new(self.config.clone())
            .with_cancel_flag(handle.cancel_flag())
            .with_listener(Arc::new(ChannelEventListener::new(sender.clone())));
        for listener in &self.listeners {
            driver = driver.with_listener(Arc::clone(listener));
        }

        let worker = handle.clone();
        worker.set_running(true);
        let thread = std::thread::Builder::new()
            .name("recipeforge-match".to_string())
            .spawn(move || {
                let result = driver.run(&requirements, &capabilities);
                worker.set_running(false);
                let _ = sender.send(MatchEvent::Finished(result));
            })
            .map_err(|err| {
                handle.set_running(false);
                MatchError::Internal(format!("cannot spawn match worker: {err}"))
            })?;
        debug!(event = "match_spawned");

        Ok(MatchJob {
            handle,
            events: receiver,
            thread: Some(thread),
        })
    }
}

impl Debug for MatchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchManager")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A run executing in the background.
///
/// Events arrive in order; [`MatchEvent::Finished`] is always last.
#[derive(Debug)]
pub struct MatchJob {
    handle: MatchHandle,
    events: mpsc::UnboundedReceiver<MatchEvent>,
    thread: Option<JoinHandle<()>>,
}

impl MatchJob {
    pub fn handle(&self) -> &MatchHandle {
        &self.handle
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self) {
        self.handle.request_cancel();
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Receives the next event, or `None` once the run has ended and all
    /// events were consumed.
    pub async fn next_event(&mut self) -> Option<MatchEvent> {
        self.events.recv().await
    }

    /// Blocking variant of [`next_event`](Self::next_event).
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_next_event(&mut self) -> Option<MatchEvent> {
        self.events.blocking_recv()
    }

    /// Returns an already queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<MatchEvent> {
        self.events.try_recv().ok()
    }

    /// Blocks until the run ends and returns its result.
    ///
    /// Events not yet consumed are discarded.
    pub fn wait(mut self) -> Result<MatchOutcome> {
        while let Some(event) = self.events.blocking_recv() {
            if let MatchEvent::Finished(result) = event {
                self.join()?;
                return result;
            }
        }
        self.join()?;
        Err(MatchError::Internal(
            "match worker ended without a result".to_string(),
        ))
    }

    fn join(&mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| MatchError::Internal("match worker panicked".to_string()))?;
        }
        Ok(())
    }
}
