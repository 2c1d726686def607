//! Client-side workflow engine for the milestone tracker.
//!
//! Parents register children and submit photo/video evidence that a
//! developmental milestone was reached; volunteers review submissions and
//! answer support tickets. This crate holds the submission and review state
//! machines, the upload transport with progress reporting, media validation,
//! age-group classification glue, and unread-reply tracking. It renders
//! nothing: a UI layer drives the workflows and displays their state.

pub mod services;
pub mod session;
pub mod storage;
pub mod workflows;

pub use services::api::{ApiClient, SubmissionFilter};
pub use services::error::ApiError;
pub use services::media::{MediaError, MediaKind};
pub use session::{Role, Session};
