use serde::{Deserialize, Serialize};

/// States of the upload/analysis workflow. Transitions only move forward
/// except for failure and explicit restart.
#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Uploading,
    Extracting,
    /// Extraction finished; the profile is available and the user picks the
    /// next action.
    Review,
    /// Interview-question generation (also the combined fork-join run).
    Analyzing,
    /// Career-recommendation generation.
    Generating,
    Complete,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Complete | WorkflowState::Failed)
    }

    /// A request chain is in flight; the controller rejects re-entry.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            WorkflowState::Uploading
                | WorkflowState::Extracting
                | WorkflowState::Analyzing
                | WorkflowState::Generating
        )
    }

    pub fn can_transition_to(self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        match (self, next) {
            (Idle, Uploading) => true,
            (Uploading, Extracting) => true,
            (Extracting, Review) => true,
            (Review, Analyzing) | (Review, Generating) => true,
            (Analyzing, Complete) | (Generating, Complete) => true,
            // Generation steps stay available after a completed run.
            (Complete, Analyzing) | (Complete, Generating) => true,
            // Any non-terminal state may fail.
            (s, Failed) if !s.is_terminal() => true,
            // Retry re-enters the step that failed.
            (Failed, Uploading) | (Failed, Extracting) => true,
            (Failed, Analyzing) | (Failed, Generating) => true,
            // Explicit start-over.
            (Complete, Idle) | (Failed, Idle) => true,
            _ => false,
        }
    }
}

/// Display-only stage progress. Non-decreasing within a stage; reset on
/// failure or when a new stage begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageProgress {
    pct: u8,
}

impl StageProgress {
    pub fn set(&mut self, pct: u8) {
        let pct = pct.min(100);
        if pct > self.pct {
            self.pct = pct;
        }
    }

    pub fn reset(&mut self) {
        self.pct = 0;
    }

    pub fn get(self) -> u8 {
        self.pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkflowState::*;

    #[test]
    fn test_forward_transitions() {
        assert!(Idle.can_transition_to(Uploading));
        assert!(Uploading.can_transition_to(Extracting));
        assert!(Extracting.can_transition_to(Review));
        assert!(Review.can_transition_to(Analyzing));
        assert!(Review.can_transition_to(Generating));
        assert!(Analyzing.can_transition_to(Complete));
        assert!(Generating.can_transition_to(Complete));
    }

    #[test]
    fn test_no_skipping_or_rewinding() {
        assert!(!Idle.can_transition_to(Extracting));
        assert!(!Idle.can_transition_to(Review));
        assert!(!Uploading.can_transition_to(Review));
        assert!(!Review.can_transition_to(Uploading));
        assert!(!Extracting.can_transition_to(Idle));
    }

    #[test]
    fn test_failure_from_any_non_terminal_state() {
        for state in [Idle, Uploading, Extracting, Review, Analyzing, Generating] {
            assert!(state.can_transition_to(Failed), "{:?} should be failable", state);
        }
        assert!(!Complete.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn test_restart_only_from_terminal_states() {
        assert!(Complete.can_transition_to(Idle));
        assert!(Failed.can_transition_to(Idle));
        assert!(!Review.can_transition_to(Idle));
    }

    #[test]
    fn test_progress_is_monotone() {
        let mut progress = StageProgress::default();
        progress.set(30);
        progress.set(10);
        assert_eq!(progress.get(), 30);
        progress.set(90);
        assert_eq!(progress.get(), 90);
        progress.set(200);
        assert_eq!(progress.get(), 100);
        progress.reset();
        assert_eq!(progress.get(), 0);
    }
}
