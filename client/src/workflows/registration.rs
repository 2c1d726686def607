use chrono::{Local, NaiveDate};
use log::{info, warn};
use thiserror::Error;

use shared::{AgeGroup, MessageResponse, RegisterChildRequest};

use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::session::Session;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Only parents can register children.")]
    NotPermitted,
    #[error("Child name cannot be empty.")]
    EmptyName,
    #[error("Child name cannot exceed 100 characters.")]
    NameTooLong,
    #[error("Enter the child's date of birth.")]
    MissingDob,
    #[error("Date of birth cannot be in the future.")]
    DobInFuture,
    #[error("A registration is already in progress.")]
    RequestOutstanding,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Child registration form state.
///
/// The age group is a snapshot: it is computed from the date of birth when
/// the form is submitted and never recomputed afterwards.
pub struct RegistrationWorkflow {
    api: ApiClient,
    session: Session,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
    pub submitting: bool,
    pub error: Option<String>,
}

impl RegistrationWorkflow {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            name: String::new(),
            dob: None,
            gender: None,
            medical_conditions: None,
            allergies: None,
            submitting: false,
            error: None,
        }
    }

    /// Validate the form and build the registration request, classifying the
    /// age group against `today`.
    pub fn build_request(&self, today: NaiveDate) -> Result<RegisterChildRequest, RegistrationError> {
        if !self.session.is_parent() {
            return Err(RegistrationError::NotPermitted);
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if name.len() > 100 {
            return Err(RegistrationError::NameTooLong);
        }
        let dob = self.dob.ok_or(RegistrationError::MissingDob)?;
        if dob > today {
            return Err(RegistrationError::DobInFuture);
        }

        Ok(RegisterChildRequest {
            name: name.to_string(),
            dob,
            gender: none_if_blank(&self.gender),
            medical_conditions: none_if_blank(&self.medical_conditions),
            allergies: none_if_blank(&self.allergies),
            parent_id: self.session.user_id.clone(),
            age_group: AgeGroup::classify(dob, today),
        })
    }

    /// Submit the registration. Local validation failures block the request;
    /// a transport failure keeps the form open with its input intact.
    pub async fn submit(&mut self) -> Result<MessageResponse, RegistrationError> {
        if self.submitting {
            return Err(RegistrationError::RequestOutstanding);
        }
        let request = self.build_request(Local::now().date_naive())?;
        info!("Registering {} in age group {}", request.name, request.age_group);

        self.submitting = true;
        self.error = None;
        let result = self.api.register_child(&request).await;
        self.submitting = false;

        match result {
            Ok(ack) => Ok(ack),
            Err(error) => {
                warn!("Child registration failed: {}", error);
                self.error = Some(error.to_string());
                Err(error.into())
            }
        }
    }
}

fn none_if_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationWorkflow {
        RegistrationWorkflow::new(ApiClient::new(), Session::parent("p1", "Priya"))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_request_carries_computed_age_group() {
        let mut form = form();
        form.name = "  Isha Verma ".to_string();
        form.dob = Some(date(2020, 4, 1));

        let request = form.build_request(date(2025, 6, 15)).unwrap();
        assert_eq!(request.name, "Isha Verma");
        assert_eq!(request.age_group, AgeGroup::FourToSix);
        assert_eq!(request.parent_id, "p1");
    }

    #[test]
    fn test_name_validation() {
        let mut form = form();
        form.dob = Some(date(2020, 4, 1));

        form.name = "   ".to_string();
        assert!(matches!(form.build_request(date(2025, 6, 15)), Err(RegistrationError::EmptyName)));

        form.name = "a".repeat(101);
        assert!(matches!(form.build_request(date(2025, 6, 15)), Err(RegistrationError::NameTooLong)));
    }

    #[test]
    fn test_dob_validation() {
        let mut form = form();
        form.name = "Isha".to_string();

        assert!(matches!(form.build_request(date(2025, 6, 15)), Err(RegistrationError::MissingDob)));

        form.dob = Some(date(2025, 6, 16));
        assert!(matches!(form.build_request(date(2025, 6, 15)), Err(RegistrationError::DobInFuture)));
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let mut form = form();
        form.name = "Isha".to_string();
        form.dob = Some(date(2020, 4, 1));
        form.gender = Some("  ".to_string());
        form.allergies = Some(" peanuts ".to_string());

        let request = form.build_request(date(2025, 6, 15)).unwrap();
        assert_eq!(request.gender, None);
        assert_eq!(request.allergies.as_deref(), Some("peanuts"));
    }

    #[test]
    fn test_volunteers_cannot_register_children() {
        let mut form = RegistrationWorkflow::new(ApiClient::new(), Session::volunteer("v1", "Ravi"));
        form.name = "Isha".to_string();
        form.dob = Some(date(2020, 4, 1));
        assert!(matches!(form.build_request(date(2025, 6, 15)), Err(RegistrationError::NotPermitted)));
    }
}
