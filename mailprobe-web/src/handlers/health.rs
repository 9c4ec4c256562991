use actix_web::{web, HttpResponse};
use mailprobe_toolbox::ProbeResponse;

use super::respond;
use crate::dto::HealthStatus;
use crate::state::AppState;

pub async fn healthz(state: web::Data<AppState>) -> HttpResponse {
    respond(&ProbeResponse::success(HealthStatus {
        status: "ok",
        region_detection: state.classifier.is_some(),
    }))
}
