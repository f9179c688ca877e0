use serde::{Deserialize, Serialize};

use crate::domain::ExtrinsicOutcome;
use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionPhase {
    Idle,
    Preparing,
    AwaitingSignature,
    Submitting,
    /// First status observed; the staged payload and busy flag have been reset.
    Broadcast,
    Ready,
    InBlock,
    Finalized(ExtrinsicOutcome),
    Cancelled,
    Error,
}

impl SubmissionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionPhase::Finalized(_) | SubmissionPhase::Cancelled | SubmissionPhase::Error
        )
    }

    /// Following the chain subscription of a submitted extrinsic.
    pub fn is_watching(self) -> bool {
        matches!(
            self,
            SubmissionPhase::Broadcast | SubmissionPhase::Ready | SubmissionPhase::InBlock
        )
    }

    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            SubmissionPhase::AwaitingSignature | SubmissionPhase::Submitting
        ) || self.is_watching()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionAction {
    Prepare,
    RequestSignature,
    Submit,
    FirstStatus,
    Ready,
    InBlock,
    Finalize(ExtrinsicOutcome),
    Abandon,
    Cancel,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SubmissionPhase,
    pub to: SubmissionPhase,
    pub reason: &'static str,
}

pub fn submission_transition(
    from: SubmissionPhase,
    action: SubmissionAction,
) -> Result<(SubmissionPhase, StateTransition), PortError> {
    use SubmissionAction as A;
    use SubmissionPhase as P;

    let (to, reason) = match (from, action) {
        (P::Idle | P::Preparing, A::Prepare) => (P::Preparing, "call_changed"),
        (p, A::Prepare) if p.is_terminal() => (P::Preparing, "call_changed"),
        (P::Preparing, A::RequestSignature) => (P::AwaitingSignature, "submit_requested"),
        (p, A::RequestSignature) if p.is_terminal() => (P::AwaitingSignature, "resubmit_requested"),
        (P::AwaitingSignature, A::Submit) => (P::Submitting, "signer_ready"),
        (P::Submitting, A::FirstStatus) => (P::Broadcast, "first_status"),
        (P::Broadcast, A::Ready) => (P::Ready, "ready"),
        (P::Broadcast | P::Ready, A::InBlock) => (P::InBlock, "in_block"),
        (P::Broadcast | P::Ready | P::InBlock, A::Finalize(outcome)) => {
            (P::Finalized(outcome), "finalized")
        }
        (P::Broadcast | P::Ready | P::InBlock, A::Abandon) => (P::Error, "abandoned"),
        (P::AwaitingSignature | P::Submitting, A::Cancel) => (P::Cancelled, "cancelled"),
        (P::AwaitingSignature | P::Submitting, A::Fail) => (P::Error, "failed"),
        _ => {
            return Err(PortError::Conflict(format!(
                "illegal submission transition: {from:?} --{action:?}-->"
            )))
        }
    };
    Ok((to, StateTransition { from, to, reason }))
}
