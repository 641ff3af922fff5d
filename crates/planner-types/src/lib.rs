//! Shared types for the platoon planner: domain models, token claims and the
//! JSON shapes exchanged over `/api`.

pub mod api;
pub mod models;

pub use models::{Mission, Platoon, PublicUser, User};
