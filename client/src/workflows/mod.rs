pub mod dashboard;
pub mod notifications;
pub mod registration;
pub mod review;
pub mod submission;
pub mod tickets;
