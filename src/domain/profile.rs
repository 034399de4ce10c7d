use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Self-service profile fields. `None` leaves a field untouched, an empty
/// string clears it. `role` is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 200, message = "Full name must be at most 200 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 32, message = "Phone number must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
}

impl UpdateProfileRequest {
    /// Returns the stored value for one field after applying the update.
    pub fn merge_field(update: &Option<String>, existing: &Option<String>) -> Option<String> {
        match update {
            None => existing.clone(),
            Some(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub search: Option<String>,
}

impl ProfileFilter {
    pub fn from_query(search: Option<&str>) -> Self {
        Self {
            search: search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let Some(needle) = &self.search else {
            return true;
        };
        let lowered = needle.to_lowercase();

        profile.email.to_lowercase().contains(&lowered)
            || profile
                .full_name
                .as_ref()
                .map(|n| n.to_lowercase().contains(&lowered))
                .unwrap_or(false)
            // phone numbers are matched verbatim
            || profile
                .phone
                .as_ref()
                .map(|p| p.contains(needle.as_str()))
                .unwrap_or(false)
    }

    pub fn apply(&self, profiles: Vec<Profile>) -> Vec<Profile> {
        profiles.into_iter().filter(|p| self.matches(p)).collect()
    }
}
