//! Tests for background runs.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use recipeforge_config::MatchConfig;
use recipeforge_core::{MatchMode, MatchOutcome};
use recipeforge_test::grid::Grid;
use recipeforge_test::mix_heat::{mix_heat_capabilities, mix_heat_requirements};

use crate::event::{CountingEventListener, MatchEventListener};
use crate::manager::MatchManager;
use crate::realtime::MatchEvent;

/// Holds the run at its start until the test releases it.
#[derive(Debug)]
struct Gate(Mutex<mpsc::Receiver<()>>);

impl MatchEventListener for Gate {
    fn on_match_started(&self, _steps: usize, _resources: usize, _mode: MatchMode) {
        let rx = self.0.lock().unwrap();
        let _ = rx.recv();
    }
}

#[test]
fn test_wait_returns_outcome() {
    let counter = Arc::new(CountingEventListener::new());
    let manager = MatchManager::new(MatchConfig::default()).with_listener(counter.clone());

    let job = manager
        .spawn(mix_heat_requirements(), mix_heat_capabilities())
        .unwrap();
    let handle = job.handle().clone();
    let outcome = job.wait().unwrap();

    let set = outcome.solutions().unwrap();
    assert_eq!(set.len(), 1);
    assert!(!handle.is_running());
    assert_eq!(counter.ended_count(), 1);
}

#[test]
fn test_events_arrive_in_order() {
    let grid = Grid::new(2, 2);
    let manager = MatchManager::new(MatchConfig::default());
    let mut job = manager
        .spawn(grid.requirements(), grid.capabilities())
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = job.blocking_next_event() {
        events.push(event);
    }

    assert!(matches!(
        events.first(),
        Some(MatchEvent::Started { steps: 2, resources: 4, .. })
    ));
    let found = events
        .iter()
        .filter(|e| matches!(e, MatchEvent::SolutionFound(_)))
        .count();
    assert_eq!(found, 4);
    assert!(matches!(
        events.iter().rev().nth(1),
        Some(MatchEvent::Progress { found: 4, estimate_percent: 100 })
    ));
    match events.last() {
        Some(MatchEvent::Finished(Ok(outcome))) => {
            assert_eq!(outcome.solutions().map(|s| s.len()), Some(4));
        }
        other => panic!("expected a finished event, got {:?}", other),
    }
}

#[test]
fn test_cancel_running_job() {
    let (release, gate) = mpsc::channel();
    let manager =
        MatchManager::new(MatchConfig::default()).with_listener(Arc::new(Gate(Mutex::new(gate))));

    let job = manager
        .spawn(mix_heat_requirements(), mix_heat_capabilities())
        .unwrap();
    assert!(job.is_running());

    job.cancel();
    release.send(()).unwrap();

    assert_eq!(job.wait().unwrap(), MatchOutcome::Cancelled);
}

#[test]
fn test_failed_run_is_reported() {
    let manager = MatchManager::new(MatchConfig::default().with_weights(-1.0, 1.0, 1.0));
    let job = manager
        .spawn(mix_heat_requirements(), mix_heat_capabilities())
        .unwrap();
    assert!(job.wait().is_err());
}

#[tokio::test]
async fn test_async_event_stream() {
    let manager = MatchManager::new(MatchConfig::default().with_mode(MatchMode::Fast));
    let mut job = manager
        .spawn(mix_heat_requirements(), mix_heat_capabilities())
        .unwrap();

    let mut solutions = 0;
    let mut finished = false;
    while let Some(event) = job.next_event().await {
        match event {
            MatchEvent::SolutionFound(assignment) => {
                assert_eq!(assignment.resource_for("A"), Some("R1"));
                solutions += 1;
            }
            MatchEvent::Finished(result) => {
                assert!(result.unwrap().is_solved());
                finished = true;
            }
            _ => {}
        }
    }

    assert_eq!(solutions, 1);
    assert!(finished);
}
