use std::sync::{Arc, OnceLock};

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use planner_db::CredentialStore;
use planner_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, VerifyResponse};
use planner_types::{Platoon, PublicUser, User};

use crate::AppState;
use crate::error::{ServiceError, ServiceResult, blocking};
use crate::extract::ApiJson;
use crate::password::CredentialHasher;
use crate::token::TokenSigner;

/// A freshly issued token and the redacted view of its owner.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: TokenSigner,
    /// Verified against on unknown usernames so both login failures cost the same.
    dummy_hash: OnceLock<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            dummy_hash: OnceLock::new(),
        }
    }

    /// `platoon` is a base name or the legacy `"<Base>_Lieutenant"` form; the
    /// latter implies `is_lieutenant`.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        platoon: &str,
        is_lieutenant: bool,
    ) -> ServiceResult<Session> {
        if username.trim().is_empty() || password.is_empty() || platoon.trim().is_empty() {
            return Err(ServiceError::Validation("Missing required fields".into()));
        }

        let (platoon, qualified) = Platoon::parse_qualified(platoon)
            .ok_or_else(|| ServiceError::Validation("Invalid platoon type".into()))?;

        if self.users.get_user_by_username(username)?.is_some() {
            return Err(username_taken());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            platoon,
            is_lieutenant: is_lieutenant || qualified,
            created_at: Utc::now(),
        };

        // A concurrent registration may have won the name since the lookup.
        if !self.users.insert_user(&user)? {
            return Err(username_taken());
        }

        info!(
            "Registered user '{}' ({} platoon{})",
            user.username,
            user.platoon,
            if user.is_lieutenant { ", lieutenant" } else { "" }
        );
        self.session_for(&user)
    }

    pub fn login(&self, username: &str, password: &str) -> ServiceResult<Session> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation("Username and password required".into()));
        }

        let Some(user) = self.users.get_user_by_username(username)? else {
            self.burn_dummy_verify(password)?;
            warn!("Login failed for unknown user '{}'", username);
            return Err(ServiceError::invalid_credentials());
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!("Login failed for '{}': wrong password", username);
            return Err(ServiceError::invalid_credentials());
        }

        self.session_for(&user)
    }

    /// Signature and expiry check. Every failure is an authentication error.
    pub fn verify(&self, token: &str) -> ServiceResult<Claims> {
        if token.is_empty() {
            return Err(ServiceError::Authentication("No token provided".into()));
        }

        self.tokens
            .decode(token)
            .map_err(|_| ServiceError::Authentication("Invalid token".into()))
    }

    fn session_for(&self, user: &User) -> ServiceResult<Session> {
        let token = self
            .tokens
            .issue(user)
            .map_err(|e| anyhow::anyhow!("token signing failed: {}", e))?;
        Ok(Session {
            token,
            user: user.public(),
        })
    }

    fn burn_dummy_verify(&self, password: &str) -> ServiceResult<()> {
        let digest = match self.dummy_hash.get() {
            Some(digest) => digest,
            None => {
                let digest = self.hasher.hash("planner-dummy-password")?;
                self.dummy_hash.get_or_init(|| digest)
            }
        };
        self.hasher.verify(password, digest)?;
        Ok(())
    }
}

fn username_taken() -> ServiceError {
    ServiceError::Conflict("Username already exists".into())
}

// -- Handlers --

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ServiceResult<impl IntoResponse> {
    let session = blocking(move || {
        state
            .auth
            .register(&req.username, &req.password, &req.platoon, req.is_lieutenant)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token: session.token,
            user: session.user,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ServiceResult<Json<AuthResponse>> {
    let session = blocking(move || state.auth.login(&req.username, &req.password)).await?;

    Ok(Json(AuthResponse {
        success: true,
        token: session.token,
        user: session.user,
    }))
}

/// The bearer token was already checked by `require_auth`.
pub async fn verify(Extension(claims): Extension<Claims>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: claims,
    })
}
