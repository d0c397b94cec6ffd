/// Failure policy for the steps of a crawl run
///
/// Every fallible interaction with the page backend is one [`Step`]. The
/// policy table in [`Step::policy`] decides whether a failure degrades the
/// current page (continue with empty data) or ends the whole run.
use crate::DriverError;
use std::fmt;
use thiserror::Error;

/// A fallible step of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Starting the page backend
    Launch,
    /// Loading a page
    Navigate,
    /// Clicking a cookie-consent acceptor
    DismissConsent,
    /// Scrolling to the bottom to trigger lazy content
    Scroll,
    /// Reading calls-to-action
    ExtractElements,
    /// Reading forms
    ExtractForms,
    /// Capturing a clipped screenshot
    Screenshot,
    /// Reading outbound links
    QueryLinks,
    /// Releasing the page backend
    Close,
}

/// What a failed step does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep going with empty data for this step
    Continue,
    /// Stop the run and surface the error in the status record
    Abort,
}

impl Step {
    /// Returns the failure policy of this step
    pub fn policy(&self) -> FailurePolicy {
        match self {
            Self::Launch => FailurePolicy::Abort,
            Self::Navigate
            | Self::DismissConsent
            | Self::Scroll
            | Self::ExtractElements
            | Self::ExtractForms
            | Self::Screenshot
            | Self::QueryLinks
            | Self::Close => FailurePolicy::Continue,
        }
    }

    /// Returns true if failures of this step are expected and not worth a warning
    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::DismissConsent | Self::Scroll)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Navigate => "navigate",
            Self::DismissConsent => "dismiss_consent",
            Self::Scroll => "scroll",
            Self::ExtractElements => "extract_elements",
            Self::ExtractForms => "extract_forms",
            Self::Screenshot => "screenshot",
            Self::QueryLinks => "query_links",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A step failure that ends the run
///
/// Only [`StepOutcome::recover`] builds one, so the policy table is the
/// single place that can stop a crawl. Plain page errors do not convert.
#[derive(Debug, Error)]
#[error("{step} failed: {error}")]
pub struct RunAborted {
    pub step: Step,
    #[source]
    pub error: DriverError,
}

/// Result of one step after applying the failure policy
#[derive(Debug)]
pub enum StepOutcome<T> {
    /// The step succeeded
    Ok(T),
    /// The step failed; the page continues without its data
    Degraded { step: Step, error: DriverError },
    /// The step failed; the run must stop
    Fatal { step: Step, error: DriverError },
}

impl<T> StepOutcome<T> {
    /// Classifies a step result through the policy table
    pub fn assess(step: Step, result: Result<T, DriverError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(error) => match step.policy() {
                FailurePolicy::Continue => Self::Degraded { step, error },
                FailurePolicy::Abort => Self::Fatal { step, error },
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Logs a degraded outcome and returns the value if there is one
    ///
    /// Fatal outcomes are returned as errors for the caller to surface.
    pub fn recover(self, page: &str) -> Result<Option<T>, RunAborted> {
        match self {
            Self::Ok(value) => Ok(Some(value)),
            Self::Degraded { step, error } => {
                if step.is_quiet() {
                    tracing::debug!("{} skipped on {}: {}", step, page, error);
                } else {
                    tracing::warn!("{} failed on {} (continuing): {}", step, page, error);
                }
                Ok(None)
            }
            Self::Fatal { step, error } => {
                tracing::error!("{} failed, stopping run: {}", step, error);
                Err(RunAborted { step, error })
            }
        }
    }
}

impl<T: Default> StepOutcome<T> {
    /// Like [`StepOutcome::recover`], substituting empty data for degraded steps
    pub fn recover_or_default(self, page: &str) -> Result<T, RunAborted> {
        self.recover(page).map(Option::unwrap_or_default)
    }
}
