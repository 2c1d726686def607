use log::{info, warn};
use thiserror::Error;

use shared::{ReviewRequest, SubmissionDetail, SubmissionStatus, VolunteerDashboardResponse};

use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::session::Session;

/// A volunteer's decision on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl ReviewDecision {
    fn as_status(self) -> SubmissionStatus {
        match self {
            ReviewDecision::Accept => SubmissionStatus::Accepted,
            ReviewDecision::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// Where the review surface currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewPhase {
    /// Browsing the pending list, nothing selected.
    #[default]
    Selecting,
    /// A submission is selected and a decision is being entered. A failed
    /// confirm returns here with inputs intact.
    Deciding,
    /// The decision request is outstanding.
    Submitting,
    /// The decision was recorded; the surface has been reset.
    Resolved,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Only volunteers can review submissions.")]
    NotPermitted,
    #[error("Only pending submissions can be reviewed.")]
    NotPending,
    #[error("Select a submission to review first.")]
    NothingSelected,
    #[error("Choose accept or reject before submitting the review.")]
    NoDecision,
    #[error("Feedback is required when rejecting a submission.")]
    FeedbackRequired,
    #[error("A review is already being submitted.")]
    RequestOutstanding,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a recorded decision: the acknowledgement plus the re-fetched
/// volunteer dashboard, absent only if the refresh itself failed.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub message: String,
    pub dashboard: Option<VolunteerDashboardResponse>,
}

/// Volunteer-side review state machine.
///
/// Terminal submissions are immutable: selecting one is rejected, so the
/// surface never offers review actions for them.
pub struct ReviewWorkflow {
    api: ApiClient,
    session: Session,
    selected: Option<SubmissionDetail>,
    decision: Option<ReviewDecision>,
    feedback: String,
    phase: ReviewPhase,
    error: Option<String>,
}

impl ReviewWorkflow {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            selected: None,
            decision: None,
            feedback: String::new(),
            phase: ReviewPhase::Selecting,
            error: None,
        }
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<&SubmissionDetail> {
        self.selected.as_ref()
    }

    /// Select a pending submission for review.
    pub fn select(&mut self, submission: SubmissionDetail) -> Result<(), ReviewError> {
        if submission.status != SubmissionStatus::Pending {
            return Err(ReviewError::NotPending);
        }
        self.selected = Some(submission);
        self.decision = None;
        self.feedback.clear();
        self.error = None;
        self.phase = ReviewPhase::Deciding;
        Ok(())
    }

    pub fn set_decision(&mut self, decision: ReviewDecision) {
        self.decision = Some(decision);
    }

    pub fn set_feedback(&mut self, text: &str) {
        self.feedback = text.to_string();
    }

    /// Close the review surface without deciding.
    pub fn cancel(&mut self) {
        self.selected = None;
        self.decision = None;
        self.feedback.clear();
        self.error = None;
        self.phase = ReviewPhase::Selecting;
    }

    /// Validate the entered decision and build the request to send.
    ///
    /// Rejections require non-empty feedback after trimming; an accept with
    /// empty feedback sends null.
    fn validated_request(&self) -> Result<(String, ReviewRequest), ReviewError> {
        if !self.session.is_volunteer() {
            return Err(ReviewError::NotPermitted);
        }
        let submission = self.selected.as_ref().ok_or(ReviewError::NothingSelected)?;
        let decision = self.decision.ok_or(ReviewError::NoDecision)?;
        let feedback = self.feedback.trim();
        if decision == ReviewDecision::Reject && feedback.is_empty() {
            return Err(ReviewError::FeedbackRequired);
        }
        let request = ReviewRequest {
            status: decision.as_status(),
            feedback: if feedback.is_empty() { None } else { Some(feedback.to_string()) },
            volunteer_id: self.session.user_id.clone(),
        };
        Ok((submission.id.clone(), request))
    }

    /// Send the decision. Validation failures block the request locally; a
    /// transport failure returns the surface to `Deciding` with the entered
    /// decision and feedback intact.
    pub async fn confirm(&mut self) -> Result<ReviewOutcome, ReviewError> {
        if self.phase == ReviewPhase::Submitting {
            return Err(ReviewError::RequestOutstanding);
        }
        let (submission_id, request) = self.validated_request()?;
        self.phase = ReviewPhase::Submitting;
        self.error = None;

        match self.api.review_submission(&submission_id, &request).await {
            Ok(ack) => {
                info!("Submission {} marked {}", submission_id, request.status);
                self.selected = None;
                self.decision = None;
                self.feedback.clear();
                self.phase = ReviewPhase::Resolved;
                let dashboard = match self.api.volunteer_dashboard().await {
                    Ok(dashboard) => Some(dashboard),
                    Err(error) => {
                        warn!("Dashboard refresh after review failed: {}", error);
                        None
                    }
                };
                Ok(ReviewOutcome { message: ack.message, dashboard })
            }
            Err(error) => {
                warn!("Review of {} failed: {}", submission_id, error);
                self.phase = ReviewPhase::Deciding;
                self.error = Some(error.to_string());
                Err(error.into())
            }
        }
    }
}
