use serde::Serialize;

use crate::models::{Profile, Role};

/// Where a signed-in user is sent next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    RoleSelection,
    Interests,
    ServiceDetails,
    UserHome,
    ProviderDashboard,
}

impl Landing {
    pub fn path(&self) -> &'static str {
        match self {
            Landing::RoleSelection | Landing::Interests => "/user/onboarding",
            Landing::ServiceDetails => "/provider/onboarding",
            Landing::UserHome => "/user/home",
            Landing::ProviderDashboard => "/provider/dashboard",
        }
    }
}

pub fn landing_for(profile: Option<&Profile>) -> Landing {
    let Some(profile) = profile else {
        return Landing::RoleSelection;
    };
    match (profile.role, profile.onboarding_completed) {
        (Some(Role::RegularUser), true) if !profile.interests.is_empty() => Landing::UserHome,
        (Some(Role::RegularUser), _) => Landing::Interests,
        (Some(Role::ServiceProvider), true) => Landing::ProviderDashboard,
        (Some(Role::ServiceProvider), false) => Landing::ServiceDetails,
        (None, _) => Landing::RoleSelection,
    }
}
