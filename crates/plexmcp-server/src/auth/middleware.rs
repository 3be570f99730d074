//! Axum middleware enforcing bearer authentication on MCP routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use super::{BearerValidator, Claims};

/// Shared state for the auth layer.
#[derive(Clone)]
pub struct AuthState {
    validator: Arc<BearerValidator>,
    resource_metadata_url: String,
}

impl AuthState {
    pub fn new(validator: Arc<BearerValidator>, resource: &str) -> Self {
        Self {
            validator,
            resource_metadata_url: format!("{resource}/.well-known/oauth-protected-resource"),
        }
    }
}

/// Extractor for validated claims, for handlers that want the caller
/// identity. The middleware inserts them into request extensions.
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Missing authentication context"))
    }
}

/// Validate the bearer token and inject claims into the request, or answer
/// with a 401 carrying RFC 9728 discovery pointers.
pub async fn bearer_auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // CORS preflights carry no credentials.
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(auth) if auth.starts_with("Bearer ") => {
            let token = &auth[7..];
            match state.validator.validate(token).await {
                Ok(claims) => {
                    debug!("[Auth] Valid token for subject: {}", claims.sub);
                    request.extensions_mut().insert(claims);
                    next.run(request).await
                }
                Err(err) => {
                    warn!("[Auth] Rejected bearer token: {err}");
                    unauthorized_response(&state, err.oauth_error_code(), &err.to_string())
                }
            }
        }
        Some(_) => {
            warn!("[Auth] Invalid Authorization header format");
            unauthorized_response(
                &state,
                "invalid_request",
                "Invalid Authorization header format",
            )
        }
        None => {
            info!("[Auth] No Authorization header - returning 401 with OAuth discovery info");
            unauthorized_response(&state, "invalid_token", "Missing access token")
        }
    }
}

/// 401 response with OAuth metadata. Per RFC 9728 the WWW-Authenticate header
/// carries a `resource_metadata` parameter pointing at the Protected Resource
/// Metadata endpoint.
fn unauthorized_response(state: &AuthState, error: &str, description: &str) -> Response {
    let www_authenticate = format!(
        r#"Bearer realm="PlexMCP", error="{}", error_description="{}", resource_metadata="{}""#,
        error, description, state.resource_metadata_url
    );

    let body = serde_json::json!({
        "error": error,
        "error_description": description,
        "resource_metadata": state.resource_metadata_url,
    });

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, www_authenticate)],
        axum::Json(body),
    )
        .into_response()
}
