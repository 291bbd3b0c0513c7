//! Guards the `JobState` transitions declared in `domain_cost_model::job`:
//! this module is where an attempted illegal transition actually fails
//! loudly, rather than the enum itself (which only reports whether a
//! transition is legal).

use domain_cost_model::JobState;

use crate::error::{OrchestratorError, OrchestratorResult};

pub fn guard_transition(from: JobState, to: JobState) -> OrchestratorResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(OrchestratorError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transition_is_allowed() {
        assert!(guard_transition(JobState::Uploaded, JobState::Planning).is_ok());
    }

    #[test]
    fn skipping_a_stage_fails_loudly() {
        let err = guard_transition(JobState::Uploaded, JobState::Parsing).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_state_rejects_any_transition() {
        assert!(guard_transition(JobState::Completed, JobState::Failed).is_err());
    }
}
