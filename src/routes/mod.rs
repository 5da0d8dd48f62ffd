// Route exports
pub mod groups;
pub mod wishlists;

use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};
use crate::models::{AuthUser, ErrorResponse};
use crate::services::{AuthError, ExchangeError, ExchangeService, SessionVerifier, SupabaseClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub sessions: Arc<SessionVerifier>,
    pub exchange: ExchangeService,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(groups::configure)
            .configure(wishlists::configure),
    );
}

/// Resolve the caller from the `Authorization` header
pub(crate) async fn authenticate(state: &AppState, req: &HttpRequest) -> Result<AuthUser, HttpResponse> {
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    let result = match SessionVerifier::bearer_token(header) {
        Ok(token) => state.sessions.verify(token).await,
        Err(e) => Err(e),
    };

    result.map_err(|e| {
        let (status_code, label) = match e {
            AuthError::LookupFailed(_) => (502, "backend_error"),
            _ => (401, "unauthorized"),
        };
        tracing::info!("Rejected session on {}: {}", req.path(), e);
        error_json(status_code, label, e.to_string())
    })
}

pub(crate) fn error_json(status_code: u16, error: &str, message: String) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status_code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code,
    })
}

pub(crate) fn exchange_error(err: ExchangeError) -> HttpResponse {
    let status_code = err.status_code();
    if status_code >= 500 {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::info!("Request rejected: {}", err);
    }
    error_json(status_code, err.label(), err.to_string())
}

pub(crate) fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    error_json(400, "validation_failed", errors.to_string())
}
