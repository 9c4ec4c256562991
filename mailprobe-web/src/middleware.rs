//! Per-request client context and response headers.

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{
        HeaderMap, HeaderName, HeaderValue, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
        X_FRAME_OPTIONS, X_XSS_PROTECTION,
    },
    middleware::Next,
    web, Error, HttpMessage,
};
use tracing::info;

use crate::client::ClientAddrs;
use crate::i18n::Lang;
use crate::state::AppState;

pub const X_CLIENT_IP: &str = "x-client-ip";
pub const X_ALL_IPS: &str = "x-all-ips";

/// Resolve the client address, pick the response language from its region,
/// and stamp security and client-IP headers on the response.
///
/// Mount with `actix_web::middleware::from_fn(client_context)`.
pub async fn client_context(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let addrs = ClientAddrs::from_request(req.request());
    let in_target_region = req
        .app_data::<web::Data<AppState>>()
        .is_some_and(|state| {
            state
                .client_regions
                .is_target_region(&addrs.client_ip, state.classifier.as_ref())
        });
    let lang = Lang::for_region(in_target_region);
    info!(
        client_ip = %addrs.client_ip,
        in_target_region,
        lang = %lang,
        "{} {}",
        req.method(),
        req.path()
    );
    req.extensions_mut().insert(lang);

    let mut res = next.call(req).await?;
    let headers = res.headers_mut();
    insert_security_headers(headers);
    insert_client_headers(headers, &addrs);
    Ok(res)
}

fn insert_security_headers(headers: &mut HeaderMap) {
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
}

/// Values that are not valid header text are skipped.
fn insert_client_headers(headers: &mut HeaderMap, addrs: &ClientAddrs) {
    if let Ok(value) = HeaderValue::from_str(&addrs.client_ip) {
        headers.insert(HeaderName::from_static(X_CLIENT_IP), value);
    }
    if let Ok(value) = HeaderValue::from_str(&addrs.all_ips.join(",")) {
        headers.insert(HeaderName::from_static(X_ALL_IPS), value);
    }
}
