use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::AppState;
use crate::error::ServiceError;

/// Extract and validate the bearer token, then expose its `Claims` to the
/// handler as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| ServiceError::Authentication("No token provided".into()))?;

    let claims = state.auth.verify(bearer.token())?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
