//! API integration tests
//!
//! These tests drive the router end to end over an in-memory SQLite range
//! table, covering status codes, response shapes and error bodies.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ipdata::api;
use ipdata::config::{DatabaseBackend, DatabaseConfig};
use ipdata::storage::{RangeStorage, SqliteStorage};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn test_database_config() -> DatabaseConfig {
    DatabaseConfig {
        backend: DatabaseBackend::Sqlite,
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        table: "ip2location".to_string(),
        acquire_timeout_secs: 5,
        query_timeout_secs: 5,
    }
}

/// (ip_from, ip_to, country_code, country_name, isp)
const FIXTURE: &[(u32, u32, &str, &str, &str)] = &[
    (16777216, 16777471, "AU", "Australia", "Research Prefix for APNIC Labs"),
    (2130706432, 2147483647, "US", "United States of America", "Loopback Inc"),
    (1000, 1009, "IE", "Ireland", "eir"),
    (1100, 1131, "IE", "Ireland", "Virgin Media"),
    (3000, 3999, "AR", "Argentina", "mainIsp"),
    (5000, 5233, "AR", "Argentina", "mainIsp"),
    (6000, 6099, "AR", "Argentina", "secondIsp"),
];

/// Helper to create test storage with the fixture table loaded
async fn create_test_storage() -> Arc<dyn RangeStorage> {
    let storage = SqliteStorage::new(&test_database_config()).await.unwrap();
    sqlx::query(
        r#"
        CREATE TABLE ip2location (
            ip_from INTEGER NOT NULL,
            ip_to INTEGER NOT NULL,
            proxy_type TEXT,
            country_code TEXT,
            country_name TEXT,
            region_name TEXT,
            city_name TEXT,
            isp TEXT
        )
        "#,
    )
    .execute(storage.pool())
    .await
    .unwrap();
    storage.init().await.unwrap();

    for (ip_from, ip_to, code, name, isp) in FIXTURE {
        insert_range(&storage, *ip_from, *ip_to, code, name, isp).await;
    }

    // Twelve Swiss ISPs with distinct sizes, one pair tied
    for i in 0..12u32 {
        let size = if i == 11 { 10 } else { i + 1 };
        let from = 100_000 + i * 1000;
        insert_range(
            &storage,
            from,
            from + size - 1,
            "CH",
            "Switzerland",
            &format!("swiss{i:02}"),
        )
        .await;
    }

    Arc::new(storage)
}

async fn insert_range(
    storage: &SqliteStorage,
    ip_from: u32,
    ip_to: u32,
    country_code: &str,
    country_name: &str,
    isp: &str,
) {
    sqlx::query(
        r#"
        INSERT INTO ip2location (ip_from, ip_to, proxy_type, country_code, country_name,
                                 region_name, city_name, isp)
        VALUES (?, ?, 'PUB', ?, ?, 'Region', 'City', ?)
        "#,
    )
    .bind(i64::from(ip_from))
    .bind(i64::from(ip_to))
    .bind(country_code)
    .bind(country_name)
    .bind(isp)
    .execute(storage.pool())
    .await
    .unwrap();
}

async fn create_test_app() -> Router {
    api::create_api_router(create_test_storage().await)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_get_ip_data() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/127.0.0.1").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ip_string"], "127.0.0.1");
    assert_eq!(json["ip_from"], 2130706432u64);
    assert_eq!(json["ip_to"], 2147483647u64);
    assert_eq!(json["country_code"], "US");
    assert_eq!(json["isp"], "Loopback Inc");
    assert_eq!(json["ip_from_string"], "127.0.0.0");
}

#[tokio::test]
async fn test_get_ip_data_bad_ip() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/badIP").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.ends_with('\n'));
    assert_eq!(body.lines().count(), 1);
}

#[tokio::test]
async fn test_undecodable_path_segment_is_plain_bad_request() {
    for uri in [
        "/ipdata/%FF",
        "/ipdata/count/ip/%FF",
        "/ipdata/topISP/%FF",
    ] {
        let (status, body) = get(create_test_app().await, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.ends_with('\n'), "{uri}: {body:?}");
        assert_eq!(body.lines().count(), 1, "{uri}: {body:?}");
    }
}

#[tokio::test]
async fn test_get_ip_data_missing_ip() {
    let app = create_test_app().await;

    let (status, _) = get(app, "/ipdata/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_ip_data_not_covered() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/200.0.0.1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.ends_with('\n'));
}

#[tokio::test]
async fn test_count_by_country_name() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/count/ip/Ireland").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["country_name"], "Ireland");
    assert_eq!(json["ip_count"], 42);
    assert!(json["elapsed_time_in_millis"].is_u64());
}

#[tokio::test]
async fn test_count_by_country_name_with_spaces() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/count/ip/United%20States%20of%20America").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ip_count"], 16777216u64);
}

#[tokio::test]
async fn test_count_known_country_without_rows_is_zero() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/count/ip/France").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ip_count"], 0);
}

#[tokio::test]
async fn test_count_unknown_country() {
    let app = create_test_app().await;

    let (status, _) = get(app, "/ipdata/count/ip/Atlantis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_top_isp_by_country_code() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/topISP/AR").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"isp": "mainIsp", "ip_count": 1234},
            {"isp": "secondIsp", "ip_count": 100},
        ])
    );
}

#[tokio::test]
async fn test_top_isp_lowercase_code() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/topISP/ar").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_top_isp_invalid_code() {
    let app = create_test_app().await;

    let (status, _) = get(app, "/ipdata/topISP/ZZ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_top10_switzerland() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/ipdata/top10/switzerland").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 10);

    let counts: Vec<u64> = entries
        .iter()
        .map(|e| e["ip_count"].as_u64().unwrap())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]), "{counts:?}");
    assert_eq!(counts[0], 11);

    // swiss09 and swiss11 both hold 10 addresses; the name breaks the tie
    assert_eq!(entries[1]["isp"], "swiss09");
    assert_eq!(entries[2]["isp"], "swiss11");
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "OK");
}

#[tokio::test]
async fn test_concurrent_lookups() {
    let app = create_test_app().await;

    let mut handles = vec![];
    for _ in 0..20 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            get(app, "/ipdata/1.0.0.1").await
        }));
    }

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["country_code"], "AU");
    }
}
