//! Presentation-facing wizard state. Strictly linear; the only way back is `restart`.

use std::fmt;

use serde::Serialize;

use super::domain::{ApplicationRequest, DecisionOutcome, DecisionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "outcome", rename_all = "snake_case")]
pub enum SessionStage {
    Intake,
    Verifying,
    Decided(DecisionOutcome),
    Finalizing,
    Closed,
}

impl SessionStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Verifying => "verifying",
            Self::Decided(_) => "decided",
            Self::Finalizing => "finalizing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decided(outcome) => write!(f, "decided ({outcome})"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    BeginVerification,
    RecordDecision,
    Finalize,
    Close,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BeginVerification => "begin verification",
            Self::RecordDecision => "record decision",
            Self::Finalize => "finalize",
            Self::Close => "close",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while session is {from}")]
    InvalidTransition {
        from: SessionStage,
        action: SessionAction,
    },
}

/// One applicant's walk through the wizard. Holds at most one application.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSession {
    stage: SessionStage,
    request: Option<ApplicationRequest>,
    decision: Option<DecisionRecord>,
}

impl Default for ApplicationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationSession {
    pub fn new() -> Self {
        Self {
            stage: SessionStage::Intake,
            request: None,
            decision: None,
        }
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn request(&self) -> Option<&ApplicationRequest> {
        self.request.as_ref()
    }

    pub fn decision(&self) -> Option<&DecisionRecord> {
        self.decision.as_ref()
    }

    pub fn begin_verification(&mut self, request: ApplicationRequest) -> Result<(), SessionError> {
        self.expect(SessionStage::Intake, SessionAction::BeginVerification)?;
        self.request = Some(request);
        self.stage = SessionStage::Verifying;
        Ok(())
    }

    pub fn record_decision(&mut self, decision: DecisionRecord) -> Result<(), SessionError> {
        self.expect(SessionStage::Verifying, SessionAction::RecordDecision)?;
        self.stage = SessionStage::Decided(decision.outcome);
        self.decision = Some(decision);
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), SessionError> {
        if !matches!(self.stage, SessionStage::Decided(_)) {
            return Err(SessionError::InvalidTransition {
                from: self.stage,
                action: SessionAction::Finalize,
            });
        }
        self.stage = SessionStage::Finalizing;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), SessionError> {
        self.expect(SessionStage::Finalizing, SessionAction::Close)?;
        self.stage = SessionStage::Closed;
        Ok(())
    }

    /// "Start a new application": discard everything and return to intake.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    fn expect(&self, stage: SessionStage, action: SessionAction) -> Result<(), SessionError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.stage,
                action,
            })
        }
    }
}
