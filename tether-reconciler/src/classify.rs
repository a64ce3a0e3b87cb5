//! Status classification
//!
//! Maps observed remote status strings onto poll outcomes. Each operation
//! family reserves one success and one failure sentinel; every other value
//! means the remote is still converging.

use tether_core::domain::pipeline::{Deployment, status};

use crate::poller::PollOutcome;

/// Terminal sentinels for one operation family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub success: &'static str,
    pub failure: &'static str,
    /// Treat an empty status (not yet observed) as success
    pub accept_empty: bool,
    /// Treat a missing record as success
    pub accept_absent: bool,
}

impl Readiness {
    /// Pipeline deployment after a create
    pub const PIPELINE_CREATE: Self = Self {
        success: status::DEPLOYED,
        failure: status::ERROR,
        accept_empty: true,
        accept_absent: true,
    };

    /// Pipeline teardown after a destroy
    pub const PIPELINE_DESTROY: Self = Self {
        success: status::DESTROYED,
        failure: status::DESTROY_ERROR,
        accept_empty: false,
        accept_absent: true,
    };

    /// A single deployment of a pipeline
    pub const DEPLOYMENT: Self = Self {
        success: status::RUNNING,
        failure: status::ERROR,
        accept_empty: false,
        accept_absent: false,
    };

    /// Classifies an observed status; `None` means the record is absent
    pub fn classify(&self, observed: Option<&str>) -> PollOutcome {
        match observed {
            None if self.accept_absent => PollOutcome::TerminalSuccess,
            None => PollOutcome::Retryable("no record yet".to_string()),
            Some(s) if s == self.failure => PollOutcome::TerminalFailure(format!("status '{}'", s)),
            Some(s) if s == self.success => PollOutcome::TerminalSuccess,
            Some("") if self.accept_empty => PollOutcome::TerminalSuccess,
            Some(s) => PollOutcome::Retryable(format!("status '{}'", s)),
        }
    }
}

/// Classifies a full set of deployments observed in one snapshot
///
/// Succeeds only when every deployment is running in this same observation.
/// An empty set succeeds.
///
/// Errors take priority over pending entries: a deployment in `error` fails
/// the whole set even when a pending deployment comes before it in the list.
pub fn classify_deployments(deployments: &[Deployment]) -> PollOutcome {
    let rule = Readiness::DEPLOYMENT;
    let mut pending = Vec::new();

    for deployment in deployments {
        match rule.classify(Some(&deployment.status)) {
            PollOutcome::TerminalFailure(reason) => {
                return PollOutcome::TerminalFailure(format!(
                    "deployment '{}' {}",
                    deployment.name, reason
                ));
            }
            PollOutcome::Retryable(reason) => {
                pending.push(format!("'{}' {}", deployment.name, reason));
            }
            _ => {}
        }
    }

    if pending.is_empty() {
        PollOutcome::TerminalSuccess
    } else {
        PollOutcome::Retryable(format!("deployments not running: {}", pending.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn deployment(name: &str, status: &str) -> Deployment {
        Deployment {
            name: name.to_string(),
            status: status.to_string(),
            endpoints: BTreeSet::new(),
        }
    }

    fn is_success(outcome: &PollOutcome) -> bool {
        matches!(outcome, PollOutcome::TerminalSuccess)
    }

    fn is_failure(outcome: &PollOutcome) -> bool {
        matches!(outcome, PollOutcome::TerminalFailure(_))
    }

    fn is_retryable(outcome: &PollOutcome) -> bool {
        matches!(outcome, PollOutcome::Retryable(_))
    }

    #[test]
    fn test_create_classification() {
        let rule = Readiness::PIPELINE_CREATE;
        assert!(is_success(&rule.classify(Some("deployed"))));
        assert!(is_success(&rule.classify(Some(""))));
        assert!(is_success(&rule.classify(None)));
        assert!(is_failure(&rule.classify(Some("error"))));

        for other in ["progressing", "queued", "Deployed", "destroyed", "running"] {
            assert!(is_retryable(&rule.classify(Some(other))), "{}", other);
        }
    }

    #[test]
    fn test_destroy_classification() {
        let rule = Readiness::PIPELINE_DESTROY;
        assert!(is_success(&rule.classify(Some("destroyed"))));
        assert!(is_success(&rule.classify(None)));
        assert!(is_failure(&rule.classify(Some("destroy-error"))));

        for other in ["destroying", "", "error", "deployed"] {
            assert!(is_retryable(&rule.classify(Some(other))), "{:?}", other);
        }
    }

    #[test]
    fn test_failure_reason_carries_status() {
        match Readiness::PIPELINE_CREATE.classify(Some("error")) {
            PollOutcome::TerminalFailure(reason) => assert_eq!(reason, "status 'error'"),
            other => panic!("Expected terminal failure, got {:?}", other),
        }
    }

    #[test]
    fn test_deployments_all_running() {
        let deployments = vec![deployment("web", "running"), deployment("db", "running")];
        assert!(is_success(&classify_deployments(&deployments)));
    }

    #[test]
    fn test_deployments_empty_is_success() {
        assert!(is_success(&classify_deployments(&[])));
    }

    #[test]
    fn test_deployments_one_pending() {
        let deployments = vec![deployment("web", "running"), deployment("db", "starting")];
        match classify_deployments(&deployments) {
            PollOutcome::Retryable(reason) => {
                assert!(reason.contains("db"));
                assert!(!reason.contains("web"));
            }
            other => panic!("Expected retryable, got {:?}", other),
        }
    }

    #[test]
    fn test_deployments_failure_wins_over_pending() {
        let deployments = vec![deployment("web", "starting"), deployment("db", "error")];
        match classify_deployments(&deployments) {
            PollOutcome::TerminalFailure(reason) => {
                assert_eq!(reason, "deployment 'db' status 'error'");
            }
            other => panic!("Expected terminal failure, got {:?}", other),
        }
    }
}
