use super::page;
use super::session::{self, SessionData};
use super::AppState;
use crate::core::analysis;
use crate::core::charts::{self, ChartKind, ChartOptions};
use crate::core::dataset::Dataset;
use crate::core::pipeline::analyze;
use crate::domain::classifier::{classify, normalize};
use crate::domain::model::{
    CleaningReport, ColumnStats, GroupBy, GroupSummary, LeapFilter, LeapReason, ReasonCode,
    YearRange, YearRecord,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{parse_year_input, validate_file_extensions};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const UPLOAD_FIELD: &str = "file";

#[derive(Deserialize)]
pub struct CheckQuery {
    year: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordsQuery {
    filter: Option<String>,
    start: Option<usize>,
    end: Option<usize>,
}

#[derive(Deserialize)]
pub struct GroupsQuery {
    by: Option<String>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    year: i64,
    is_leap: bool,
    reason: LeapReason,
    reason_label: &'static str,
    normalized: Option<f64>,
    message: Option<String>,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    filter: String,
    total: usize,
    start: usize,
    end: usize,
    records: Vec<YearRecord>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    source: String,
    total_years: usize,
    leap_years: usize,
    year_range: Option<YearRange>,
    mean_year: Option<f64>,
    above_mean: usize,
    leap_after_2000: usize,
    cleaning: CleaningReport,
    mismatches: Vec<i64>,
    statistics: Vec<ColumnStats>,
    reason_codes: Vec<ReasonCode>,
    reason_counts: Vec<(LeapReason, usize)>,
}

pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let (dataset, source) = state.dataset_for(&jar);
    match analyze(&dataset, &state.analysis_options()) {
        Ok(result) => Html(page::index(&source, Ok(&result))),
        Err(e) => {
            tracing::debug!("Dataset overview unavailable: {}", e);
            Html(page::index(&source, Err(e.user_friendly_message())))
        }
    }
}

pub async fn check(Query(query): Query<CheckQuery>) -> Response {
    let input = query.year.unwrap_or_default();
    match parse_year_input(&input) {
        Ok(year) => Html(page::check_result(year, classify(year))).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Html(page::error(
                &e.user_friendly_message(),
                e.recovery_suggestion(),
                &input,
            )),
        )
            .into_response(),
    }
}

/// Classifies `year` and normalizes it against the session dataset's range.
pub async fn api_check(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>> {
    let year = parse_year_input(query.year.as_deref().unwrap_or_default())?;
    let result = classify(year);

    let (dataset, _) = state.dataset_for(&jar);
    let (cleaned, _) = dataset.clean(state.config.missing);
    let (normalized, message) = match cleaned.augment() {
        Ok(augmented) => match augmented.range {
            Some(range) => (Some(normalize(year, range.min(), range.max())?), None),
            None => (None, Some("The dataset contains no years".to_string())),
        },
        Err(e @ EtlError::DomainError { .. }) => (None, Some(e.user_friendly_message())),
        Err(e) => return Err(e),
    };

    Ok(Json(CheckResponse {
        year,
        is_leap: result.is_leap,
        reason: result.reason,
        reason_label: result.reason.label(),
        normalized,
        message,
    }))
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, data));
        break;
    }

    let Some((file_name, data)) = upload else {
        return Err(EtlError::ValidationError {
            message: format!("Missing multipart field '{}'", UPLOAD_FIELD),
        });
    };

    validate_file_extensions("file", std::slice::from_ref(&file_name), &["csv"]).map_err(|e| {
        EtlError::ValidationError {
            message: e.to_string(),
        }
    })?;

    let dataset = Dataset::from_csv_bytes(&data)?;
    tracing::info!(
        file = %file_name,
        rows = dataset.len(),
        missing = dataset.missing_years(),
        "Dataset uploaded"
    );

    let id = state.sessions.store(
        session::session_id(&jar).as_deref(),
        SessionData {
            dataset,
            source: file_name,
        },
    );

    Ok((jar.add(session::session_cookie(id)), Redirect::to("/")).into_response())
}

pub async fn reset(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(id) = session::session_id(&jar) {
        if state.sessions.remove(&id) {
            tracing::debug!("Session dataset dropped");
        }
    }
    (jar.remove(session::expired_session_cookie()), Redirect::to("/"))
}

pub async fn records(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<RecordsResponse>> {
    let filter = match query.filter.as_deref() {
        Some(raw) => raw.parse::<LeapFilter>()?,
        None => LeapFilter::All,
    };

    let (dataset, _) = state.dataset_for(&jar);
    let mut options = state.analysis_options();
    options.filter = filter;
    let result = analyze(&dataset, &options)?;

    let total = result.filtered.len();
    let start = query.start.unwrap_or(0).min(total);
    let end = query.end.unwrap_or(total).min(total);
    let records = analysis::slice(&result.filtered, start, end).to_vec();

    Ok(Json(RecordsResponse {
        filter: filter.to_string(),
        total,
        start,
        end: start + records.len(),
        records,
    }))
}

pub async fn groups(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<GroupsQuery>,
) -> Result<Json<Vec<GroupSummary>>> {
    let by = match query.by.as_deref() {
        Some(raw) => raw.parse::<GroupBy>()?,
        None => GroupBy::Reason,
    };

    let (dataset, _) = state.dataset_for(&jar);
    let result = analyze(&dataset, &state.analysis_options())?;
    let summary = match by {
        GroupBy::Reason => result.groups_by_reason,
        GroupBy::YearGroup => result.groups_by_year,
    };
    Ok(Json(summary))
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<SummaryResponse>> {
    let (dataset, source) = state.dataset_for(&jar);
    let result = analyze(&dataset, &state.analysis_options())?;

    let (_, above) = analysis::above_mean(&result.records);
    Ok(Json(SummaryResponse {
        source,
        total_years: result.records.len(),
        leap_years: result.records.iter().filter(|r| r.is_leap).count(),
        year_range: result.range,
        mean_year: result.mean_year,
        above_mean: above.len(),
        leap_after_2000: analysis::leap_after(&result.records, 2000).len(),
        reason_counts: analysis::reason_counts(&result.records),
        cleaning: result.cleaning,
        mismatches: result.mismatches,
        statistics: result.statistics,
        reason_codes: result.reason_codes,
    }))
}

pub async fn chart(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(kind): Path<String>,
) -> Result<Response> {
    let kind: ChartKind = kind.parse()?;
    let (dataset, _) = state.dataset_for(&jar);
    let result = analyze(&dataset, &state.analysis_options())?;
    let svg = charts::render(kind, &result.records, &ChartOptions::default())?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> EtlError {
    EtlError::ValidationError {
        message: format!("Invalid upload: {}", e),
    }
}
