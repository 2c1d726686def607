/// Role of the signed-in user, decided at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Parent,
    Volunteer,
}

/// Authenticated user context.
///
/// Workflows receive a `Session` at construction instead of reading ambient
/// global state; authentication itself is owned by the login layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn parent(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            role: Role::Parent,
        }
    }

    pub fn volunteer(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            role: Role::Volunteer,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.role == Role::Parent
    }

    pub fn is_volunteer(&self) -> bool {
        self.role == Role::Volunteer
    }
}
