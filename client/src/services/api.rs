use bytes::Bytes;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::UnboundedSender;

use shared::{
    CreateTicketRequest, ErrorBody, FileMetadata, MessageResponse, ParentDashboardResponse,
    RegisterChildRequest, ReviewRequest, SubmissionDetail, SubmitMilestoneRequest, Ticket,
    TicketReplyRequest, VolunteerDashboardResponse,
};

use super::error::ApiError;
use super::upload::progress_stream;

/// Volunteer-side submission list filter, one per dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionFilter {
    #[default]
    Pending,
    Accepted,
    Rejected,
    All,
}

impl SubmissionFilter {
    pub fn as_query(&self) -> &'static str {
        match self {
            SubmissionFilter::Pending => "pending",
            SubmissionFilter::Accepted => "accepted",
            SubmissionFilter::Rejected => "rejected",
            SubmissionFilter::All => "all",
        }
    }
}

/// API client for the milestone tracker backend.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client with the default base URL.
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:3000".to_string())
    }

    /// Create a new API client with a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Register a new child for the signed-in parent. The request carries the
    /// age group already computed from the date of birth.
    pub async fn register_child(
        &self,
        request: &RegisterChildRequest,
    ) -> Result<MessageResponse, ApiError> {
        info!("Registering child: name={}, age group={}", request.name, request.age_group);
        let url = format!("{}/api/parents/child/register", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;
        parse_response(response).await
    }

    /// Fetch the parent dashboard: children with nested milestones and
    /// progress counts.
    pub async fn parent_dashboard(
        &self,
        parent_id: &str,
    ) -> Result<ParentDashboardResponse, ApiError> {
        debug!("Fetching dashboard for parent {}", parent_id);
        let url = format!("{}/api/parents/dashboard/{}", self.base_url, parent_id);
        let response = self.http.get(&url).send().await?;
        parse_response(response).await
    }

    /// URL-mode submission: a single JSON request, no progress signal.
    pub async fn submit_milestone(
        &self,
        request: &SubmitMilestoneRequest,
    ) -> Result<MessageResponse, ApiError> {
        info!(
            "Submitting milestone {} for child {} via media link",
            request.milestone_id, request.child_id
        );
        let url = format!("{}/api/parents/milestone/submit", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;
        parse_response(response).await
    }

    /// File-mode submission: multipart upload reporting percentage progress
    /// on `progress` while the transfer is in flight.
    ///
    /// Zero or more progress events precede exactly one terminal outcome,
    /// which is this call's return value.
    pub async fn submit_milestone_with_file(
        &self,
        child_id: &str,
        milestone_id: &str,
        metadata: &FileMetadata,
        data: Bytes,
        progress: UnboundedSender<u8>,
    ) -> Result<MessageResponse, ApiError> {
        info!(
            "Uploading {} ({} bytes, {}) for child {} milestone {}",
            metadata.file_name, data.len(), metadata.mime_type, child_id, milestone_id
        );
        let url = format!("{}/api/parents/milestone/submit-with-file", self.base_url);
        let length = data.len() as u64;
        let body = Body::wrap_stream(progress_stream(data, progress));
        let part = Part::stream_with_length(body, length)
            .file_name(metadata.file_name.clone())
            .mime_str(&metadata.mime_type)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let form = Form::new()
            .text("childId", child_id.to_string())
            .text("milestoneId", milestone_id.to_string())
            .part("media", part);
        let response = self.http.post(&url).multipart(form).send().await?;
        parse_response(response).await
    }

    /// Fetch the volunteer dashboard: pending submissions plus review totals.
    pub async fn volunteer_dashboard(&self) -> Result<VolunteerDashboardResponse, ApiError> {
        debug!("Fetching volunteer dashboard");
        let url = format!("{}/api/volunteers/dashboard", self.base_url);
        let response = self.http.get(&url).send().await?;
        parse_response(response).await
    }

    /// List submissions for a volunteer filter tab.
    pub async fn list_submissions(
        &self,
        filter: SubmissionFilter,
    ) -> Result<Vec<SubmissionDetail>, ApiError> {
        debug!("Fetching submissions with filter {}", filter.as_query());
        let url = format!(
            "{}/api/volunteers/submissions?status={}",
            self.base_url,
            filter.as_query()
        );
        let response = self.http.get(&url).send().await?;
        parse_response(response).await
    }

    /// Post a volunteer's accept/reject decision for a pending submission.
    pub async fn review_submission(
        &self,
        submission_id: &str,
        request: &ReviewRequest,
    ) -> Result<MessageResponse, ApiError> {
        info!("Reviewing submission {}: {}", submission_id, request.status);
        let url = format!(
            "{}/api/volunteers/submission/{}/review",
            self.base_url, submission_id
        );
        let response = self.http.post(&url).json(request).send().await?;
        parse_response(response).await
    }

    /// List the tickets raised by one parent.
    pub async fn tickets_for_parent(&self, parent_id: &str) -> Result<Vec<Ticket>, ApiError> {
        debug!("Fetching tickets for parent {}", parent_id);
        let url = format!("{}/api/parents/tickets?parentId={}", self.base_url, parent_id);
        let response = self.http.get(&url).send().await?;
        parse_response(response).await
    }

    /// List every ticket (volunteer view).
    pub async fn all_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        debug!("Fetching all tickets");
        let url = format!("{}/api/parents/tickets", self.base_url);
        let response = self.http.get(&url).send().await?;
        parse_response(response).await
    }

    /// Raise a new support ticket.
    pub async fn create_ticket(
        &self,
        request: &CreateTicketRequest,
    ) -> Result<MessageResponse, ApiError> {
        info!("Creating ticket for parent {}", request.parent_id);
        let url = format!("{}/api/parents/ticket", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;
        parse_response(response).await
    }

    /// Reply to a ticket as a volunteer; the backend closes the ticket and
    /// records the reply together.
    pub async fn reply_to_ticket(
        &self,
        ticket_id: &str,
        request: &TicketReplyRequest,
    ) -> Result<MessageResponse, ApiError> {
        info!("Replying to ticket {}", ticket_id);
        let url = format!("{}/api/parents/tickets/{}/reply", self.base_url, ticket_id);
        let response = self.http.post(&url).json(request).send().await?;
        parse_response(response).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a response into the expected body, mapping non-2xx statuses to
/// `ApiError::Server` with the backend's `{error}` message when one can be
/// parsed and a generic fallback otherwise.
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(|_| ApiError::Server {
            status: status.as_u16(),
            message: "Invalid response from server".to_string(),
        })
    } else {
        let code = status.as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("Request failed with status {}", code),
        };
        Err(ApiError::Server { status: code, message })
    }
}
