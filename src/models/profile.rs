use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    RegularUser,
    ServiceProvider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::RegularUser => "regular_user",
            Role::ServiceProvider => "service_provider",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Editable contact fields of the profile page.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProfileContact {
    #[serde(default)]
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}
