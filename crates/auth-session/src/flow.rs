//! Fallback-sequencing state machine using rust-fsm.
//!
//! Login and token acquisition share one shape: try the least-intrusive step
//! first, fall through on failure, stop at the first success. The machine
//! makes each fall-through an explicit, named transition so tests can tell a
//! routine silent failure from a terminal one.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────┐  AttemptSilent   ┌─────────┐  SilentSucceeded   ┌──────┐
//! │  Start  │ ───────────────► │ Silent  │ ─────────────────► │ Done │
//! └────┬────┘                  └────┬────┘                    └──────┘
//!      │                            │
//!      │ SkipSilent                 │ SilentFailed
//!      ▼                            ▼
//! ┌─────────────────────────────────────────┐
//! │               Interactive               │
//! └────┬───────────────┬───────────────┬────┘
//!      │ Interactive-  │ Interactive-  │ NavigationIssued
//!      │ Succeeded     │ Failed        ▼
//!      ▼               ▼        AwaitingRedirect
//!     Done           Failed
//! ```

use rust_fsm::*;
use tracing::debug;

use crate::{AuthError, AuthResult};

// Generates a module `fallback_flow` with State, Input and StateMachine types.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub fallback_flow(Start)

    Start => {
        AttemptSilent => Silent,
        SkipSilent => Interactive
    },
    Silent => {
        SilentSucceeded => Done,
        // Routine fall-through, not a terminal failure
        SilentFailed => Interactive
    },
    Interactive => {
        InteractiveSucceeded => Done,
        InteractiveFailed => Failed,
        NavigationIssued => AwaitingRedirect
    }
}

// Re-export the generated types with clearer names
pub use fallback_flow::Input as FlowInput;
pub use fallback_flow::State as FlowState;
pub use fallback_flow::StateMachine as FlowMachine;

/// One fallback machine per in-flight operation, with transition logging.
pub struct FlowTracker {
    operation: &'static str,
    machine: FlowMachine,
}

impl FlowTracker {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            machine: FlowMachine::new(),
        }
    }

    /// Apply a transition, surfacing illegal ones as orchestrator bugs.
    pub fn advance(&mut self, input: FlowInput) -> AuthResult<()> {
        self.machine.consume(&input).map_err(|_| {
            AuthError::InvalidFlowTransition(format!(
                "cannot apply {:?} in state {:?} during {}",
                input,
                self.machine.state(),
                self.operation
            ))
        })?;

        debug!(
            operation = self.operation,
            state = ?self.machine.state(),
            "fallback transition"
        );
        Ok(())
    }

    pub fn state(&self) -> &FlowState {
        self.machine.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_start() {
        let tracker = FlowTracker::new("test");
        assert_eq!(*tracker.state(), FlowState::Start);
    }

    #[test]
    fn silent_success_path() {
        let mut tracker = FlowTracker::new("login");

        tracker.advance(FlowInput::AttemptSilent).unwrap();
        assert_eq!(*tracker.state(), FlowState::Silent);

        tracker.advance(FlowInput::SilentSucceeded).unwrap();
        assert_eq!(*tracker.state(), FlowState::Done);
    }

    #[test]
    fn silent_failure_falls_through_to_interactive() {
        let mut tracker = FlowTracker::new("login");

        tracker.advance(FlowInput::AttemptSilent).unwrap();
        tracker.advance(FlowInput::SilentFailed).unwrap();
        assert_eq!(*tracker.state(), FlowState::Interactive);

        tracker.advance(FlowInput::InteractiveSucceeded).unwrap();
        assert_eq!(*tracker.state(), FlowState::Done);
    }

    #[test]
    fn skip_silent_goes_straight_to_interactive() {
        let mut tracker = FlowTracker::new("login");

        tracker.advance(FlowInput::SkipSilent).unwrap();
        assert_eq!(*tracker.state(), FlowState::Interactive);
    }

    #[test]
    fn navigation_parks_the_flow() {
        let mut tracker = FlowTracker::new("login");

        tracker.advance(FlowInput::AttemptSilent).unwrap();
        tracker.advance(FlowInput::SilentFailed).unwrap();
        tracker.advance(FlowInput::NavigationIssued).unwrap();
        assert_eq!(*tracker.state(), FlowState::AwaitingRedirect);
    }

    #[test]
    fn interactive_failure_is_terminal() {
        let mut tracker = FlowTracker::new("acquire_token");

        tracker.advance(FlowInput::AttemptSilent).unwrap();
        tracker.advance(FlowInput::SilentFailed).unwrap();
        tracker.advance(FlowInput::InteractiveFailed).unwrap();
        assert_eq!(*tracker.state(), FlowState::Failed);
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut tracker = FlowTracker::new("login");

        // Cannot succeed silently before attempting the silent step
        let result = tracker.advance(FlowInput::SilentSucceeded);
        assert!(matches!(result, Err(AuthError::InvalidFlowTransition(_))));

        // Cannot issue a navigation from Start
        let result = tracker.advance(FlowInput::NavigationIssued);
        assert!(matches!(result, Err(AuthError::InvalidFlowTransition(_))));

        // A failed advance leaves the machine where it was
        assert_eq!(*tracker.state(), FlowState::Start);
    }

    #[test]
    fn raw_machine_rejects_double_completion() {
        let mut machine = FlowMachine::new();

        machine.consume(&FlowInput::AttemptSilent).unwrap();
        machine.consume(&FlowInput::SilentSucceeded).unwrap();
        assert_eq!(*machine.state(), FlowState::Done);

        // Done is terminal
        assert!(machine.consume(&FlowInput::InteractiveSucceeded).is_err());
    }
}
