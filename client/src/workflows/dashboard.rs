use log::{debug, warn};

use shared::{ChildOverview, ReviewStatistics, SubmissionDetail};

use crate::services::api::{ApiClient, SubmissionFilter};
use crate::services::error::ApiError;
use crate::session::Session;

/// Parent dashboard state: the signed-in parent's children with nested
/// milestones and progress counts.
pub struct ParentDashboard {
    api: ApiClient,
    session: Session,
    pub children: Vec<ChildOverview>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ParentDashboard {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            children: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Re-fetch the dashboard. Called on entry and after every successful
    /// submission.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        debug!("Refreshing parent dashboard for {}", self.session.user_id);
        self.loading = true;
        self.error = None;
        let result = self.api.parent_dashboard(&self.session.user_id).await;
        self.loading = false;
        match result {
            Ok(response) => {
                self.children = response.children;
                Ok(())
            }
            Err(error) => {
                warn!("Dashboard fetch failed: {}", error);
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Volunteer dashboard state: pending submissions, review totals and the
/// filter tabs over the full submission list.
pub struct VolunteerDashboard {
    api: ApiClient,
    pub pending_submissions: Vec<SubmissionDetail>,
    pub stats: ReviewStatistics,
    pub filter: SubmissionFilter,
    filtered_submissions: Vec<SubmissionDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

impl VolunteerDashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            pending_submissions: Vec::new(),
            stats: ReviewStatistics::default(),
            filter: SubmissionFilter::default(),
            filtered_submissions: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Re-fetch pending submissions and totals; the active non-pending
    /// filter list is refreshed too so recorded decisions appear in it.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        debug!("Refreshing volunteer dashboard");
        self.loading = true;
        self.error = None;
        let result = self.api.volunteer_dashboard().await;
        self.loading = false;
        match result {
            Ok(response) => {
                self.pending_submissions = response.pending_submissions;
                self.stats = response.stats;
                if self.filter != SubmissionFilter::Pending {
                    let filter = self.filter;
                    self.fetch_filtered(filter).await?;
                }
                Ok(())
            }
            Err(error) => {
                warn!("Volunteer dashboard fetch failed: {}", error);
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Switch filter tabs. The pending tab reuses the dashboard payload;
    /// every other tab queries the submission list endpoint.
    pub async fn set_filter(&mut self, filter: SubmissionFilter) -> Result<(), ApiError> {
        self.filter = filter;
        if filter == SubmissionFilter::Pending {
            self.filtered_submissions.clear();
            return Ok(());
        }
        self.fetch_filtered(filter).await
    }

    async fn fetch_filtered(&mut self, filter: SubmissionFilter) -> Result<(), ApiError> {
        match self.api.list_submissions(filter).await {
            Ok(submissions) => {
                self.filtered_submissions = submissions;
                Ok(())
            }
            Err(error) => {
                warn!("Submission list fetch failed: {}", error);
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// The rows shown for the active tab.
    pub fn current_submissions(&self) -> &[SubmissionDetail] {
        match self.filter {
            SubmissionFilter::Pending => &self.pending_submissions,
            _ => &self.filtered_submissions,
        }
    }

    /// Count shown on a filter tab.
    pub fn tab_count(&self, filter: SubmissionFilter) -> u32 {
        match filter {
            SubmissionFilter::Pending => self.stats.total_pending,
            SubmissionFilter::Accepted => self.stats.total_accepted,
            SubmissionFilter::Rejected => self.stats.total_rejected,
            SubmissionFilter::All => self.stats.total_submissions,
        }
    }
}
