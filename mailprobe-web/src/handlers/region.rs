//! `/api/ip` endpoints over the shared region classifier.

use actix_web::{web, HttpResponse};
use mailprobe_region::{RegionClassifier, RegionStatistics};
use mailprobe_toolbox::ProbeResponse;
use tracing::info;

use super::respond;
use crate::dto::{BatchClassification, IpBatchRequest};
use crate::state::AppState;

const CLASSIFIER_UNAVAILABLE: &str = "IP region classification is unavailable";

fn unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ProbeResponse::<()>::failure(CLASSIFIER_UNAVAILABLE))
}

fn classifier(state: &AppState) -> Result<&RegionClassifier, HttpResponse> {
    state.classifier.as_ref().ok_or_else(unavailable)
}

/// Classify a batch; `stats: true` adds statistics over the same results.
pub async fn check_ips(
    state: web::Data<AppState>,
    body: web::Json<IpBatchRequest>,
) -> HttpResponse {
    let classifier = match classifier(&state) {
        Ok(classifier) => classifier,
        Err(response) => return response,
    };
    let results = classifier
        .classify_batch(&body.ips, body.max_workers, body.use_cache)
        .await;
    let statistics = body
        .stats
        .then(|| RegionStatistics::from_results(&results));
    respond(&ProbeResponse::success(BatchClassification {
        results,
        statistics,
    }))
}

pub async fn ip_statistics(
    state: web::Data<AppState>,
    body: web::Json<IpBatchRequest>,
) -> HttpResponse {
    let classifier = match classifier(&state) {
        Ok(classifier) => classifier,
        Err(response) => return response,
    };
    let statistics = classifier.statistics(&body.ips, body.use_cache).await;
    respond(&ProbeResponse::success(statistics))
}

pub async fn cache_info(state: web::Data<AppState>) -> HttpResponse {
    match classifier(&state) {
        Ok(classifier) => respond(&ProbeResponse::success(classifier.cache_info())),
        Err(response) => response,
    }
}

pub async fn clear_cache(state: web::Data<AppState>) -> HttpResponse {
    match classifier(&state) {
        Ok(classifier) => {
            classifier.clear_cache();
            info!("Region cache cleared on request");
            respond(&ProbeResponse::success(classifier.cache_info()))
        }
        Err(response) => response,
    }
}
