//! Route guard mapping access decisions to HTTP status codes.

use axum::http::{HeaderMap, StatusCode};
use tracing::{debug, error};

use crate::auth::{Access, AuthorizationManager, Tier};

/// Admit the request if it meets `required`.
///
/// No usable credential is 401, a session with too low a tier is 403 and a
/// backend failure is 500. A backend failure never admits the request.
///
/// # Errors
/// Returns the status code to answer with when the request is not admitted.
pub async fn require_tier(
    manager: &AuthorizationManager,
    headers: &HeaderMap,
    required: Tier,
) -> Result<(), StatusCode> {
    match manager.access(headers, required).await {
        Ok(Access::Granted) => Ok(()),
        Ok(Access::Forbidden) => {
            debug!("session tier below {required:?}");
            Err(StatusCode::FORBIDDEN)
        }
        Ok(Access::Unauthorized) => Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            error!("Failed to check authorization: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
