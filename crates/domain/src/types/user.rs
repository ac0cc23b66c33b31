//! User profile and session identity
//!
//! Profiles are loaded from the backend after sign-in. Idle tracking only
//! applies to signed-in users with a loaded profile whose role is not exempt.

use serde::{Deserialize, Serialize};

/// Portal role of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    Admin,
    Supervisor,
    Employee,
    /// Roles this build does not know about; kept verbatim.
    Other(String),
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Supervisor => "supervisor",
            Self::Employee => "employee",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "supervisor" => Self::Supervisor,
            "employee" => Self::Employee,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<UserRole> for String {
    fn from(value: UserRole) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile row for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// What the host knows about the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: Option<String>,
    pub profile: Option<UserProfile>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>, role: UserRole) -> Self {
        let user_id = user_id.into();
        Self {
            profile: Some(UserProfile { id: user_id.clone(), full_name: None, role }),
            user_id: Some(user_id),
        }
    }

    pub fn role(&self) -> Option<&UserRole> {
        self.profile.as_ref().map(|profile| &profile.role)
    }

    /// User id when the session should be idle-tracked, `None` otherwise.
    pub fn trackable_user(&self, is_exempt: impl Fn(&UserRole) -> bool) -> Option<&str> {
        let user_id = self.user_id.as_deref()?;
        let profile = self.profile.as_ref()?;
        if is_exempt(&profile.role) {
            return None;
        }
        Some(user_id)
    }
}
