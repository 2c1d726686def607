use bytes::Bytes;
use log::{info, warn};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedSender};

use shared::{
    FileMetadata, MilestoneEntry, ParentDashboardResponse, SubmitMilestoneRequest,
};

use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::media::{self, MediaError, MediaKind};
use crate::session::Session;

/// Where a submission attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    /// Submit surface open, no request in flight. Media may be staged.
    #[default]
    Idle,
    /// A candidate file is being validated. Settles back to `Idle`.
    Validating,
    /// File-mode request outstanding, progress events flowing.
    Uploading,
    /// URL-mode request outstanding.
    Posting,
    /// The submission was accepted by the backend; the surface closes.
    Succeeded,
    /// The last attempt failed; staged input is preserved for a retry.
    Failed,
}

/// Media staged for submission.
///
/// At most one medium is staged at a time; staging a file replaces a URL and
/// vice versa, so the invalid "both present" state is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedMedia {
    Url(String),
    File { metadata: FileMetadata, data: Bytes },
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Attach a file or enter a media link before submitting.")]
    NothingStaged,
    #[error("This milestone already has a submission.")]
    AlreadySubmitted,
    #[error("A submission is already in progress.")]
    RequestOutstanding,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a successful submit: the acknowledgement message plus the
/// re-fetched dashboard, absent only if the refresh itself failed.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub message: String,
    pub dashboard: Option<ParentDashboardResponse>,
}

/// Parent-side submission state machine for one (child, milestone) pair.
///
/// Progress for file uploads is delivered on the channel passed to
/// [`submit`](Self::submit); each invocation produces a fresh sequence of
/// zero or more percentages followed by the call's single terminal result,
/// so a retry restarts the displayed progress from zero.
pub struct SubmissionWorkflow {
    api: ApiClient,
    session: Session,
    child_id: String,
    milestone_id: String,
    staged: Option<StagedMedia>,
    phase: SubmitPhase,
    error: Option<String>,
}

impl SubmissionWorkflow {
    /// Open the submit surface for a milestone that has no submission yet.
    ///
    /// Pending and terminal submissions cannot be re-submitted.
    pub fn open(
        api: ApiClient,
        session: Session,
        child_id: &str,
        entry: &MilestoneEntry,
    ) -> Result<Self, SubmissionError> {
        if !entry.submission.is_unsubmitted() {
            return Err(SubmissionError::AlreadySubmitted);
        }
        Ok(Self {
            api,
            session,
            child_id: child_id.to_string(),
            milestone_id: entry.milestone.id.clone(),
            staged: None,
            phase: SubmitPhase::Idle,
            error: None,
        })
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn staged(&self) -> Option<&StagedMedia> {
        self.staged.as_ref()
    }

    /// Attach a candidate file. On acceptance the file is staged and any
    /// previously entered URL is cleared; on rejection the previous staging
    /// is left untouched and the reason is surfaced.
    pub fn stage_file(
        &mut self,
        metadata: FileMetadata,
        data: Bytes,
    ) -> Result<MediaKind, SubmissionError> {
        self.phase = SubmitPhase::Validating;
        match media::validate(&metadata) {
            Ok(kind) => {
                info!("Staged {} {} ({} bytes)", kind, metadata.file_name, metadata.size_bytes);
                self.staged = Some(StagedMedia::File { metadata, data });
                self.error = None;
                self.phase = SubmitPhase::Idle;
                Ok(kind)
            }
            Err(error) => {
                warn!("Rejected candidate file: {}", error);
                self.error = Some(error.to_string());
                self.phase = SubmitPhase::Idle;
                Err(error.into())
            }
        }
    }

    /// Record the media link input. Non-empty text replaces any staged file;
    /// clearing the input un-stages a previously entered URL.
    pub fn stage_url(&mut self, url: &str) {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            if matches!(self.staged, Some(StagedMedia::Url(_))) {
                self.staged = None;
            }
        } else {
            self.staged = Some(StagedMedia::Url(trimmed.to_string()));
        }
    }

    /// Remove whatever is staged ("Remove file" / cancel).
    pub fn clear_staged(&mut self) {
        self.staged = None;
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.staged.is_some() && !self.is_request_outstanding()
    }

    fn is_request_outstanding(&self) -> bool {
        matches!(self.phase, SubmitPhase::Uploading | SubmitPhase::Posting)
    }

    /// Submit the staged medium.
    ///
    /// File mode uploads with progress on `progress`; URL mode posts a
    /// single JSON request. On success the staged media is cleared, the
    /// owning parent's dashboard is re-fetched and the surface closes. On
    /// failure the staged input is preserved so the user can retry.
    pub async fn submit(
        &mut self,
        progress: Option<UnboundedSender<u8>>,
    ) -> Result<SubmitOutcome, SubmissionError> {
        if self.is_request_outstanding() {
            return Err(SubmissionError::RequestOutstanding);
        }
        let staged = self.staged.clone().ok_or(SubmissionError::NothingStaged)?;
        self.error = None;

        let result = match staged {
            StagedMedia::Url(url) => {
                self.phase = SubmitPhase::Posting;
                let request = SubmitMilestoneRequest {
                    child_id: self.child_id.clone(),
                    milestone_id: self.milestone_id.clone(),
                    media_url: Some(url),
                };
                self.api.submit_milestone(&request).await
            }
            StagedMedia::File { metadata, data } => {
                self.phase = SubmitPhase::Uploading;
                let progress = progress.unwrap_or_else(|| {
                    // No consumer; events are dropped.
                    let (tx, _rx) = mpsc::unbounded_channel();
                    tx
                });
                self.api
                    .submit_milestone_with_file(
                        &self.child_id,
                        &self.milestone_id,
                        &metadata,
                        data,
                        progress,
                    )
                    .await
            }
        };

        match result {
            Ok(ack) => {
                info!(
                    "Milestone {} submitted for child {}",
                    self.milestone_id, self.child_id
                );
                self.staged = None;
                self.phase = SubmitPhase::Succeeded;
                let dashboard = match self.api.parent_dashboard(&self.session.user_id).await {
                    Ok(dashboard) => Some(dashboard),
                    Err(error) => {
                        warn!("Dashboard refresh after submit failed: {}", error);
                        None
                    }
                };
                Ok(SubmitOutcome { message: ack.message, dashboard })
            }
            Err(error) => {
                warn!("Submission failed: {}", error);
                self.phase = SubmitPhase::Failed;
                self.error = Some(error.to_string());
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AgeGroup, Milestone, SubmissionState, SubmissionStatus};

    fn entry(state: SubmissionState) -> MilestoneEntry {
        MilestoneEntry {
            milestone: Milestone {
                id: "m1".to_string(),
                title: "First Words".to_string(),
                description: "Says first recognizable words".to_string(),
                age_group: AgeGroup::ZeroToThree,
                category: "Language".to_string(),
            },
            submission: state,
        }
    }

    fn workflow() -> SubmissionWorkflow {
        SubmissionWorkflow::open(
            ApiClient::new(),
            Session::parent("p1", "Priya"),
            "c1",
            &entry(SubmissionState::Unsubmitted),
        )
        .unwrap()
    }

    fn jpeg(size_bytes: u64) -> FileMetadata {
        FileMetadata {
            file_name: "crawling.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes,
        }
    }

    #[test]
    fn test_open_requires_unsubmitted_milestone() {
        let pending = entry(SubmissionState::Submitted {
            status: SubmissionStatus::Pending,
            media_url: None,
            file_name: None,
            file_type: None,
            feedback: None,
            submitted_at: None,
        });
        let result = SubmissionWorkflow::open(
            ApiClient::new(),
            Session::parent("p1", "Priya"),
            "c1",
            &pending,
        );
        assert!(matches!(result, Err(SubmissionError::AlreadySubmitted)));
    }

    #[test]
    fn test_staging_a_file_clears_the_url() {
        let mut workflow = workflow();
        workflow.stage_url("https://example.com/clip.mp4");
        workflow.stage_file(jpeg(1024), Bytes::from_static(b"jpeg")).unwrap();

        match workflow.staged() {
            Some(StagedMedia::File { metadata, .. }) => {
                assert_eq!(metadata.file_name, "crawling.jpg");
            }
            other => panic!("expected staged file, got {:?}", other),
        }
    }

    #[test]
    fn test_staging_a_url_clears_the_file() {
        let mut workflow = workflow();
        workflow.stage_file(jpeg(1024), Bytes::from_static(b"jpeg")).unwrap();
        workflow.stage_url("  https://example.com/photo.jpg  ");

        assert_eq!(
            workflow.staged(),
            Some(&StagedMedia::Url("https://example.com/photo.jpg".to_string()))
        );
    }

    #[test]
    fn test_rejected_file_leaves_prior_staging_untouched() {
        let mut workflow = workflow();
        workflow.stage_url("https://example.com/photo.jpg");

        let oversized = jpeg(crate::services::media::MAX_IMAGE_BYTES + 1);
        let result = workflow.stage_file(oversized, Bytes::new());

        assert!(matches!(result, Err(SubmissionError::Media(_))));
        assert_eq!(
            workflow.staged(),
            Some(&StagedMedia::Url("https://example.com/photo.jpg".to_string()))
        );
        assert!(workflow.error().unwrap().contains("File too large"));
        assert_eq!(workflow.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn test_clearing_the_url_input_unstages_only_a_url() {
        let mut workflow = workflow();
        workflow.stage_url("https://example.com/photo.jpg");
        workflow.stage_url("   ");
        assert_eq!(workflow.staged(), None);

        workflow.stage_file(jpeg(1024), Bytes::from_static(b"jpeg")).unwrap();
        workflow.stage_url("");
        assert!(matches!(workflow.staged(), Some(StagedMedia::File { .. })));
    }

    #[test]
    fn test_submit_disabled_without_staged_media() {
        let workflow = workflow();
        assert!(!workflow.can_submit());
    }

    #[tokio::test]
    async fn test_submit_with_nothing_staged_is_blocked_locally() {
        let mut workflow = workflow();
        let result = workflow.submit(None).await;
        assert!(matches!(result, Err(SubmissionError::NothingStaged)));
        assert_eq!(workflow.phase(), SubmitPhase::Idle);
    }
}
