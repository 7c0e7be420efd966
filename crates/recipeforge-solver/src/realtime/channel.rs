//! Channel-based event streaming.

use recipeforge_core::{Assignment, MatchMode, MatchOutcome, Result};
use tokio::sync::mpsc;

use crate::event::MatchEventListener;

/// An event of a run, as delivered over a channel.
#[derive(Debug)]
pub enum MatchEvent {
    Started {
        steps: usize,
        resources: usize,
        mode: MatchMode,
    },
    /// An assignment, in discovery order.
    SolutionFound(Assignment),
    Progress {
        found: u64,
        estimate_percent: u8,
    },
    /// The final result. Always the last event of a run.
    Finished(Result<MatchOutcome>),
}

/// A listener that forwards events into an unbounded channel.
///
/// Send errors are ignored: a caller that dropped its receiver is no longer
/// interested in the run.
#[derive(Debug, Clone)]
pub struct ChannelEventListener {
    sender: mpsc::UnboundedSender<MatchEvent>,
}

impl ChannelEventListener {
    pub fn new(sender: mpsc::UnboundedSender<MatchEvent>) -> Self {
        Self { sender }
    }
}

impl MatchEventListener for ChannelEventListener {
    fn on_match_started(&self, steps: usize, resources: usize, mode: MatchMode) {
        let _ = self.sender.send(MatchEvent::Started {
            steps,
            resources,
            mode,
        });
    }

    fn on_solution_found(&self, assignment: &Assignment) {
        let _ = self
            .sender
            .send(MatchEvent::SolutionFound(assignment.clone()));
    }

    fn on_progress(&self, found: u64, estimate_percent: u8) {
        let _ = self.sender.send(MatchEvent::Progress {
            found,
            estimate_percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipeforge_test::assignment;

    #[test]
    fn test_forwards_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = ChannelEventListener::new(tx);

        listener.on_match_started(2, 4, MatchMode::Fast);
        listener.on_solution_found(&assignment(1, &[("A", "R1")]));
        listener.on_progress(1, 100);

        assert!(matches!(
            rx.try_recv(),
            Ok(MatchEvent::Started { steps: 2, resources: 4, mode: MatchMode::Fast })
        ));
        match rx.try_recv() {
            Ok(MatchEvent::SolutionFound(a)) => assert_eq!(a.resource_for("A"), Some("R1")),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            rx.try_recv(),
            Ok(MatchEvent::Progress { found: 1, estimate_percent: 100 })
        ));
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let listener = ChannelEventListener::new(tx);
        listener.on_progress(3, 50);
    }
}
