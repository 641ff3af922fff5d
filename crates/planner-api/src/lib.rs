//! Authentication and mission services for the platoon planner, plus the
//! axum handlers and router that expose them under `/api`.

pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod missions;
pub mod password;
pub mod routes;
pub mod token;

use std::sync::Arc;

use planner_db::{CredentialStore, MissionStore};

use crate::auth::AuthService;
use crate::missions::MissionService;
use crate::password::CredentialHasher;
use crate::token::TokenSigner;

pub use error::{ServiceError, ServiceResult};
pub use routes::router;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub auth: AuthService,
    pub missions: MissionService,
}

impl AppStateInner {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        missions: Arc<dyn MissionStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            auth: AuthService::new(users, hasher, tokens),
            missions: MissionService::new(missions),
        }
    }
}
