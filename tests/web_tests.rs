#![cfg(feature = "web")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use leap_year_etl::web::{self, AppState, WebConfig};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "leap-test-boundary";

fn app() -> Router {
    web::router(Arc::new(AppState::new(WebConfig::default())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn upload_request(file_name: &str, csv: &str, cookie: Option<&str>) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = csv
    );
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Uploads `csv` and returns the `name=value` pair of the session cookie.
async fn upload(app: &Router, csv: &str) -> String {
    let (status, headers, _) = send(app, upload_request("years.csv", csv, None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("leap_session="));
    set_cookie.split(';').next().unwrap().to_string()
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_index_renders_sample_overview() {
    let app = app();
    let (status, _, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Leap Year Checker"));
    assert!(body.contains("sample 1900..=2050"));
    assert!(body.contains("Rows: 151 (37 leap years)"));
    assert!(body.contains("/charts/scatter"));
}

#[tokio::test]
async fn test_check_page_reports_leap_status() {
    let app = app();

    let (status, _, body) = send(&app, get("/check?year=2000", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("2000 is a LEAP YEAR. (Divisible by 400)"));

    let (status, _, body) = send(&app, get("/check?year=1900", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("1900 is NOT a leap year. (Divisible by 100 but not 400)"));
}

#[tokio::test]
async fn test_check_rejects_non_integer_input() {
    let app = app();

    let (status, _, body) = send(&app, get("/check?year=20.5", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("&#39;20.5&#39; is not a valid year"));

    let (status, _, _) = send(&app, get("/check", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, get("/api/check?year=abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "'abc' is not a valid year");
}

#[tokio::test]
async fn test_api_check_normalizes_against_dataset() {
    let app = app();
    let (status, _, body) = send(&app, get("/api/check?year=1975", None)).await;
    assert_eq!(status, StatusCode::OK);

    let value = json(&body);
    assert_eq!(value["year"], 1975);
    assert_eq!(value["is_leap"], false);
    assert_eq!(value["reason"], "not_divisible");
    assert_eq!(value["normalized"], 0.5);
    assert!(value["message"].is_null());

    let (_, _, body) = send(&app, get("/api/check?year=-4", None)).await;
    let value = json(&body);
    assert_eq!(value["is_leap"], true);
    assert_eq!(value["reason"], "divisible_by_4");
}

#[tokio::test]
async fn test_api_check_with_single_year_dataset_has_no_normalization() {
    let app = app();
    let cookie = upload(&app, "Year\n2000\n2000\n").await;

    let (status, _, body) = send(&app, get("/api/check?year=2004", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let value = json(&body);
    assert_eq!(value["is_leap"], true);
    assert!(value["normalized"].is_null());
    assert!(value["message"].as_str().unwrap().contains("at least two distinct years"));

    let (status, _, _) = send(&app, get("/api/summary", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_is_scoped_to_session() {
    let app = app();
    let cookie = upload(&app, "Year,Is_Leap_Year\n1896,true\n1900,true\n,\n2000,true\n").await;

    let (status, _, body) = send(&app, get("/api/summary", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let summary = json(&body);
    assert_eq!(summary["source"], "years.csv");
    assert_eq!(summary["total_years"], 3);
    assert_eq!(summary["cleaning"]["dropped_missing"], 1);
    assert_eq!(summary["mismatches"], serde_json::json!([1900]));

    let (_, _, body) = send(&app, get("/api/summary", None)).await;
    assert_eq!(json(&body)["total_years"], 151);

    let reset = Request::builder()
        .method("POST")
        .uri("/reset")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, reset).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, _, body) = send(&app, get("/api/summary", Some(&cookie))).await;
    assert_eq!(json(&body)["total_years"], 151);
}

#[tokio::test]
async fn test_upload_rejects_missing_year_column() {
    let app = app();
    let (status, _, body) = send(&app, upload_request("data.csv", "Name\nfoo\n", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("Year"));

    let (status, _, _) = send(&app, upload_request("data.txt", "Year\n2000\n", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_records_filter_and_slice() {
    let app = app();

    let (status, _, body) = send(&app, get("/api/records?filter=leap&start=0&end=5", None)).await;
    assert_eq!(status, StatusCode::OK);
    let value = json(&body);
    assert_eq!(value["filter"], "leap");
    assert_eq!(value["total"], 37);
    let years: Vec<i64> = value["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![1904, 1908, 1912, 1916, 1920]);

    let (_, _, body) = send(&app, get("/api/records?filter=after:2040", None)).await;
    assert_eq!(json(&body)["total"], 10);

    let (status, _, _) = send(&app, get("/api/records?filter=sometimes", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_groups_by_year_group() {
    let app = app();
    let (status, _, body) = send(&app, get("/api/groups?by=year_group", None)).await;
    assert_eq!(status, StatusCode::OK);

    let groups = json(&body);
    let keys: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["Before 1950", "1950–1999", "2000 and later"]);
    assert_eq!(groups[2]["total_years"], 51);
    assert_eq!(groups[2]["total_leap_years"], 13);

    let (_, _, body) = send(&app, get("/api/groups", None)).await;
    assert_eq!(json(&body).as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_chart_endpoint_serves_svg() {
    let app = app();
    let (status, headers, body) = send(&app, get("/charts/histogram", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
    assert!(body.starts_with("<svg"));

    let (status, _, _) = send(&app, get("/charts/pie", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_mints_server_side_session_id() {
    let app = app();
    let request = upload_request(
        "years.csv",
        "Year\n2000\n2004\n",
        Some("leap_session=client-chosen"),
    );
    let (status, headers, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    let pair = set_cookie.split(';').next().unwrap();
    assert!(pair.starts_with("leap_session="));
    assert_ne!(pair, "leap_session=client-chosen");

    let (_, _, body) = send(&app, get("/api/summary", Some("leap_session=client-chosen"))).await;
    assert_eq!(json(&body)["total_years"], 151);

    let (_, _, body) = send(&app, get("/api/summary", Some(pair))).await;
    assert_eq!(json(&body)["total_years"], 2);
}

#[tokio::test]
async fn test_repeated_upload_keeps_one_session() {
    let app = app();
    let cookie = upload(&app, "Year\n2000\n2004\n").await;

    let request = upload_request("years.csv", "Year\n1900\n1950\n2000\n", Some(&cookie));
    let (_, headers, _) = send(&app, request).await;
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert_eq!(set_cookie.split(';').next(), Some(cookie.as_str()));

    let (_, _, body) = send(&app, get("/api/summary", Some(&cookie))).await;
    assert_eq!(json(&body)["total_years"], 3);
}

#[tokio::test]
async fn test_session_store_stays_bounded() {
    let state = Arc::new(AppState::new(WebConfig {
        max_sessions: 16,
        ..WebConfig::default()
    }));
    let app = web::router(state.clone());

    for _ in 0..200 {
        upload(&app, "Year\n2000\n2004\n").await;
    }
    assert_eq!(state.sessions.len(), 16);
}

#[tokio::test]
async fn test_reset_clears_session_cookie() {
    let app = app();
    let cookie = upload(&app, "Year\n2000\n2004\n").await;

    let reset = Request::builder()
        .method("POST")
        .uri("/reset")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, reset).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("leap_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}
