use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{AuthenticatedUser, JwtService};
use crate::error::AppError;

/// Token gate: rejects the request unless it carries a valid bearer token,
/// otherwise injects the `AuthenticatedUser` into request extensions.
pub async fn auth_middleware(
    State(jwt_service): State<JwtService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let claims = jwt_service.verify_token(token).map_err(|e| {
        debug!(reason = %e, "rejected bearer token");
        AppError::Unauthorized
    })?;

    let user = AuthenticatedUser::from(claims);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
