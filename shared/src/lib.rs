use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Age bucket used to decide which milestones apply to a child.
///
/// A milestone is shown for a child only when the two buckets match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "0-3")]
    ZeroToThree,
    #[serde(rename = "4-6")]
    FourToSix,
    #[serde(rename = "7-8")]
    SevenToEight,
    #[serde(rename = "9-12")]
    NineToTwelve,
    #[serde(rename = "13+")]
    ThirteenPlus,
}

impl AgeGroup {
    /// Classify a date of birth against a reference date.
    ///
    /// Age is whole calendar years: one year is subtracted when the birth
    /// month/day has not yet occurred in the reference year. Ages outside
    /// the named buckets fall through to `13+`; a future-dated birthdate is
    /// prevented upstream by input constraints, not here.
    pub fn classify(dob: NaiveDate, today: NaiveDate) -> AgeGroup {
        match age_in_years(dob, today) {
            0..=3 => AgeGroup::ZeroToThree,
            4..=6 => AgeGroup::FourToSix,
            7..=8 => AgeGroup::SevenToEight,
            9..=12 => AgeGroup::NineToTwelve,
            _ => AgeGroup::ThirteenPlus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::ZeroToThree => "0-3",
            AgeGroup::FourToSix => "4-6",
            AgeGroup::SevenToEight => "7-8",
            AgeGroup::NineToTwelve => "9-12",
            AgeGroup::ThirteenPlus => "13+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age in whole calendar years at a reference date.
pub fn age_in_years(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// A registered child.
///
/// `age_group` is a snapshot computed from `dob` at registration time and is
/// not recomputed as the child ages. The owning parent is immutable once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub name: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
    pub age_group: AgeGroup,
    pub parent_id: String,
}

/// Read-only milestone reference data from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub description: String,
    pub age_group: AgeGroup,
    pub category: String,
}

impl Milestone {
    /// A milestone applies to a child only on an exact age-group match.
    pub fn applies_to(&self, child: &Child) -> bool {
        self.age_group == child.age_group
    }
}

/// Lifecycle status of a submission.
///
/// The only permitted transitions are
/// `not_started -> pending -> {accepted | rejected}`; the terminal states are
/// set exclusively by the review workflow and are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    NotStarted,
    Pending,
    Accepted,
    Rejected,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Accepted | SubmissionStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::NotStarted => "not_started",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Parent-facing display label.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::NotStarted => "Not Started",
            SubmissionStatus::Pending => "Under Review",
            SubmissionStatus::Accepted => "Completed",
            SubmissionStatus::Rejected => "Needs Review",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission state for one (child, milestone) pair.
///
/// "Not started" is the absence of a submission, represented explicitly as
/// `Unsubmitted` rather than as a missing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionState {
    Unsubmitted,
    #[serde(rename_all = "camelCase")]
    Submitted {
        status: SubmissionStatus,
        media_url: Option<String>,
        file_name: Option<String>,
        file_type: Option<String>,
        feedback: Option<String>,
        submitted_at: Option<DateTime<Utc>>,
    },
}

impl SubmissionState {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            SubmissionState::Unsubmitted => SubmissionStatus::NotStarted,
            SubmissionState::Submitted { status, .. } => *status,
        }
    }

    pub fn is_unsubmitted(&self) -> bool {
        matches!(self, SubmissionState::Unsubmitted)
    }

    pub fn media_url(&self) -> Option<&str> {
        match self {
            SubmissionState::Unsubmitted => None,
            SubmissionState::Submitted { media_url, .. } => media_url.as_deref(),
        }
    }
}

/// Milestone joined with its submission state for one child (dashboard row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneEntry {
    pub milestone: Milestone,
    pub submission: SubmissionState,
}

/// Per-child progress counts shown on the parent dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed: u32,
    pub pending: u32,
    pub rejected: u32,
    pub total: u32,
}

impl ProgressSummary {
    /// Completion percentage, rounded to the nearest whole number.
    pub fn percent_complete(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// One child's section of the parent dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOverview {
    pub child: Child,
    /// Age in whole years at the time the dashboard was assembled.
    pub age: i32,
    pub progress: ProgressSummary,
    pub milestones: Vec<MilestoneEntry>,
}

/// Volunteer-side view of a submission awaiting or past review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    pub id: String,
    pub milestone_title: String,
    pub milestone_description: String,
    pub milestone_category: String,
    pub child_name: String,
    pub child_age: i32,
    pub parent_name: String,
    pub media_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub status: SubmissionStatus,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Review totals for the volunteer dashboard cards and filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistics {
    pub total_pending: u32,
    pub total_accepted: u32,
    pub total_rejected: u32,
    pub total_submissions: u32,
}

/// Support ticket status. A ticket closes when a volunteer replies; the reply
/// and the `closed` status are set together by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// A free-text support message from a parent to the volunteers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub parent_id: String,
    pub parent_name: Option<String>,
    pub message: String,
    pub status: TicketStatus,
    pub volunteer_id: Option<String>,
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether this ticket carries a volunteer reply.
    pub fn has_volunteer_reply(&self) -> bool {
        self.status == TicketStatus::Closed && self.volunteer_id.is_some()
    }
}

/// Declared metadata of a candidate upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Request to register a new child. `age_group` is computed client-side from
/// `dob` before the request is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterChildRequest {
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
    pub parent_id: String,
    pub age_group: AgeGroup,
}

/// URL-mode submission payload. `media_url` is nullable; the file mode sends
/// multipart form data instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMilestoneRequest {
    pub child_id: String,
    pub milestone_id: String,
    pub media_url: Option<String>,
}

/// Volunteer decision payload. `feedback` is null when none was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub status: SubmissionStatus,
    pub feedback: Option<String>,
    pub volunteer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub parent_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReplyRequest {
    pub reply: String,
    pub volunteer_id: String,
}

/// Payload of `GET /api/parents/dashboard/{parentId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDashboardResponse {
    pub children: Vec<ChildOverview>,
}

/// Payload of `GET /api/volunteers/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerDashboardResponse {
    pub pending_submissions: Vec<SubmissionDetail>,
    pub stats: ReviewStatistics,
}

/// Generic success acknowledgement body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned by the backend on a non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
