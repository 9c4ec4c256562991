//! Mail diagnostic endpoints. Missing input is answered in the client's
//! language; probe errors are passed through as-is.

use actix_web::{web, HttpResponse};
use mailprobe_toolbox::ProbeResponse;

use super::{fail, respond};
use crate::dto::{DkimRequest, PortsRequest, TargetRequest};
use crate::i18n::Lang;
use crate::state::AppState;

pub async fn mx(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<TargetRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    respond(&ProbeResponse::from(state.probes.mx(target).await))
}

pub async fn spf(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<TargetRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    let response = match state.probes.spf(target).await {
        Ok(analysis) => {
            let issues = lang.spf_issues(&analysis);
            ProbeResponse::success(analysis.record).with_issues(issues)
        }
        Err(e) => ProbeResponse::failure(e.to_string()),
    };
    respond(&response)
}

pub async fn dkim(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<DkimRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    respond(&ProbeResponse::from(state.probes.dkim(target, body.selectors.as_deref()).await))
}

pub async fn dmarc(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<TargetRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    respond(&ProbeResponse::from(state.probes.dmarc(target).await))
}

pub async fn ports(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<PortsRequest>,
) -> HttpResponse {
    let Some(host) = body.host() else {
        return fail(lang.missing_host());
    };
    respond(&ProbeResponse::from(state.probes.ports(host).await))
}

pub async fn tls(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<TargetRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    respond(&ProbeResponse::from(state.probes.tls(target).await))
}

pub async fn dnsbl(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<TargetRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    respond(&ProbeResponse::from(state.probes.dnsbl(target).await))
}

pub async fn ptr(
    state: web::Data<AppState>,
    lang: Lang,
    body: web::Json<TargetRequest>,
) -> HttpResponse {
    let Some(target) = body.target() else {
        return fail(lang.missing_target());
    };
    respond(&ProbeResponse::from(state.probes.ptr(target).await))
}
