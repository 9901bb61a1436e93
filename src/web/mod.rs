pub mod handlers;
pub mod page;
pub mod session;

use crate::core::dataset::{Dataset, DEFAULT_SAMPLE_END, DEFAULT_SAMPLE_START};
use crate::core::pipeline::AnalysisOptions;
use crate::domain::model::{MissingPolicy, YearGroups};
use crate::utils::error::{ErrorCategory, EtlError, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use session::{SessionData, SessionStore, MAX_SESSIONS, SESSION_COOKIE, SESSION_TTL};

/// Server-wide settings; everything per-user lives in [`SessionStore`].
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub sample_start: i64,
    pub sample_end: i64,
    pub missing: MissingPolicy,
    pub year_groups: YearGroups,
    /// Idle time after which an uploaded dataset is forgotten.
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            sample_start: DEFAULT_SAMPLE_START,
            sample_end: DEFAULT_SAMPLE_END,
            missing: MissingPolicy::default(),
            year_groups: YearGroups::default(),
            session_ttl: SESSION_TTL,
            max_sessions: MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub config: WebConfig,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: WebConfig) -> Self {
        let sessions = SessionStore::with_limits(config.session_ttl, config.max_sessions);
        Self { config, sessions }
    }

    /// The dataset the request's session works on, with a label for display.
    pub fn dataset_for(&self, jar: &CookieJar) -> (Dataset, String) {
        session::session_id(jar)
            .and_then(|id| self.sessions.get(&id))
            .map(|data| (data.dataset, data.source))
            .unwrap_or_else(|| {
                (
                    Dataset::sample(self.config.sample_start, self.config.sample_end),
                    format!(
                        "sample {}..={}",
                        self.config.sample_start, self.config.sample_end
                    ),
                )
            })
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            missing: self.config.missing,
            year_groups: self.config.year_groups.clone(),
            ..AnalysisOptions::default()
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/check", get(handlers::check))
        .route("/upload", post(handlers::upload))
        .route("/reset", post(handlers::reset))
        .route("/api/check", get(handlers::api_check))
        .route("/api/records", get(handlers::records))
        .route("/api/groups", get(handlers::groups))
        .route("/api/summary", get(handlers::summary))
        .route("/charts/:kind", get(handlers::chart))
        .with_state(state)
}

pub async fn run(addr: SocketAddr, config: WebConfig) -> Result<()> {
    let state = Arc::new(AppState::new(config));
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    suggestion: &'static str,
}

pub fn status_for(error: &EtlError) -> StatusCode {
    match error.category() {
        ErrorCategory::Input | ErrorCategory::Data => StatusCode::BAD_REQUEST,
        ErrorCategory::Domain => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::Io | ErrorCategory::Rendering | ErrorCategory::Configuration => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for EtlError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(category = ?self.category(), "Request failed: {}", self);
        } else {
            tracing::debug!(category = ?self.category(), "Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.user_friendly_message(),
            suggestion: self.recovery_suggestion(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let input = EtlError::InvalidYearInput {
            input: "abc".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(status_for(&input), StatusCode::BAD_REQUEST);

        let domain = EtlError::DomainError {
            min_year: 2000,
            max_year: 2000,
        };
        assert_eq!(status_for(&domain), StatusCode::UNPROCESSABLE_ENTITY);

        let chart = EtlError::ChartError {
            message: "backend".to_string(),
        };
        assert_eq!(status_for(&chart), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_dataset_for_falls_back_to_sample() {
        let state = AppState::default();
        let (dataset, source) = state.dataset_for(&CookieJar::new());
        assert_eq!(dataset.len(), 151);
        assert_eq!(source, "sample 1900..=2050");
    }
}
