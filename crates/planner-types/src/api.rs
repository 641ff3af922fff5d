use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Mission, Platoon, PublicUser};

// -- Token claims --

/// Claims carried by every session token. Authorization decisions are made
/// from these after signature and expiry have been checked, never from
/// platoon or role fields sent in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub username: String,
    pub platoon: Platoon,
    pub is_lieutenant: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_lieutenant_of(&self, platoon: Platoon) -> bool {
        self.is_lieutenant && self.platoon == platoon
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
            platoon: self.platoon,
            is_lieutenant: self.is_lieutenant,
        }
    }
}

// -- Errors --

/// Stable discriminant sent with every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "validation_error")]
    Validation,
    #[serde(rename = "conflict_error")]
    Conflict,
    #[serde(rename = "authentication_error")]
    Authentication,
    #[serde(rename = "forbidden_error")]
    Forbidden,
    #[serde(rename = "not_found_error")]
    NotFound,
    #[serde(rename = "internal_error")]
    Internal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: ErrorKind,
}

// -- Auth --

/// Missing fields deserialize to empty values so the service can report them
/// as a validation error instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// `"Red"`, `"Green"`, `"Blue"` or the legacy `"<Base>_Lieutenant"` form.
    #[serde(default)]
    pub platoon: String,
    #[serde(default)]
    pub is_lieutenant: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Claims,
}

// -- Missions --

#[derive(Debug, Default, Deserialize)]
pub struct MissionQuery {
    pub platoon: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMissionRequest {
    /// Defaults to the caller's own platoon.
    #[serde(default)]
    pub platoon: Option<String>,
    #[serde(default)]
    pub mission_type: String,
    #[serde(default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`; absent or empty means today.
    #[serde(default)]
    pub date: Option<String>,
}

/// Merge-update: only the fields present are applied.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMissionRequest {
    #[serde(default)]
    pub platoon: Option<String>,
    #[serde(default)]
    pub mission_type: Option<String>,
    #[serde(default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MissionResponse {
    pub success: bool,
    pub mission: Mission,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MissionListResponse {
    pub missions: Vec<Mission>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}
