use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::LookupService;
use crate::storage::RangeStorage;

use super::handlers::{
    get_ip_count_by_country_name, get_ip_data, get_top_isp_by_country_code,
    get_top_isp_switzerland, health_check, missing_country_code, missing_country_name,
    missing_ip, AppState,
};

pub fn create_api_router(storage: Arc<dyn RangeStorage>) -> Router {
    let state = Arc::new(AppState {
        service: LookupService::new(storage),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/ipdata/count/ip/{country_name}", get(get_ip_count_by_country_name))
        .route("/ipdata/count/ip/", get(missing_country_name))
        .route("/ipdata/topISP/{country_code}", get(get_top_isp_by_country_code))
        .route("/ipdata/topISP/", get(missing_country_code))
        .route("/ipdata/top10/switzerland", get(get_top_isp_switzerland))
        .route("/ipdata/{ip}", get(get_ip_data))
        .route("/ipdata/", get(missing_ip))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
