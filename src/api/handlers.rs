use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::ApiError;
use crate::models::{CountryIpCount, IpData, IspIpCount};
use crate::service::LookupService;

/// Result size of `/ipdata/topISP/{country_code}`
pub const TOP_ISP_LIMIT: u32 = 100;

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

pub struct AppState {
    pub service: LookupService,
}

/// Range data for a single address
pub async fn get_ip_data(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<IpData>, ApiError> {
    let Path(ip) = path?;
    let data = state.service.get_data_from_ip(&ip).await?;
    Ok(Json(data))
}

/// Number of addresses allocated to a country
pub async fn get_ip_count_by_country_name(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<CountryIpCount>, ApiError> {
    let Path(country_name) = path?;
    let timer = Instant::now();
    let ip_count = state.service.get_ip_count_by_country(&country_name).await?;

    Ok(Json(CountryIpCount {
        country_name,
        ip_count,
        elapsed_time_in_millis: saturating_millis(timer.elapsed()),
    }))
}

/// ISPs of a country ranked by allocated addresses
pub async fn get_top_isp_by_country_code(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<IspIpCount>>, ApiError> {
    let Path(country_code) = path?;
    let top = state
        .service
        .get_top_isp_by_country_code(&country_code, TOP_ISP_LIMIT)
        .await?;
    Ok(Json(top))
}

pub async fn get_top_isp_switzerland(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<IspIpCount>>, ApiError> {
    let top = state.service.get_top_isp_for_switzerland().await?;
    Ok(Json(top))
}

pub async fn missing_ip() -> ApiError {
    ApiError::missing_param("ip")
}

pub async fn missing_country_name() -> ApiError {
    ApiError::missing_param("country_name")
}

pub async fn missing_country_code() -> ApiError {
    ApiError::missing_param("country_code")
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    match state.service.storage().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "UNAVAILABLE".to_string(),
                }),
            )
        }
    }
}
