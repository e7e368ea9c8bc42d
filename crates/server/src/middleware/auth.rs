//! Authorization gate extractors.
//!
//! The authenticated caller is stored in the session as a [`CurrentUser`]
//! by the authentication service. These extractors only read it.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in caller of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireCustomer(user): RequireCustomer) -> impl IntoResponse {
///     format!("Hola, {}", user.name)
/// }
/// ```
pub struct RequireCustomer(pub CurrentUser);

/// Extractor that requires a caller with role `staff` or `admin`.
pub struct RequireStaff(pub CurrentUser);

/// Rejection from the auth extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No session identity.
    Unauthorized,
    /// Signed in, but the role is not allowed.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Staff access required"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn current_user(parts: &Parts) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)?;

    set_sentry_user(&user.customer_id);
    Ok(user)
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await?;
        if !user.role.is_staff() {
            tracing::warn!(customer_id = %user.customer_id, "Non-staff caller on back-office route");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}
