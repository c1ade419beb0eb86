use crate::auth::jwt::JwtVerifier;
use crate::auth::models::CallerIdentity;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use vidloft_core::AppError;

/// Resolve `Authorization: Bearer <jwt>` into a `CallerIdentity` extension, or reject with 401.
pub async fn auth_middleware(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match verifier.validate_token(token.trim()) {
        Ok(claims) => {
            let caller = CallerIdentity::from(claims);
            tracing::debug!(user_id = %caller.user_id, "Caller authenticated");
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
