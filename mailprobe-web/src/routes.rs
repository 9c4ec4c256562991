use actix_web::{error::InternalError, web, HttpResponse};
use mailprobe_toolbox::ProbeResponse;

use crate::handlers;

/// Request body limit for JSON endpoints.
pub const MAX_JSON_BYTES: usize = 16 * 1024 * 1024;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BYTES)
        .error_handler(|err, _req| {
            let body = ProbeResponse::<()>::failure(err.to_string());
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}

/// Register every API route. Expects `web::Data<AppState>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/healthz", web::get().to(handlers::healthz))
        .service(
            web::scope("/api")
                .route("/mx", web::post().to(handlers::mx))
                .route("/spf", web::post().to(handlers::spf))
                .route("/dkim", web::post().to(handlers::dkim))
                .route("/dmarc", web::post().to(handlers::dmarc))
                .route("/ports", web::post().to(handlers::ports))
                .route("/tls", web::post().to(handlers::tls))
                .route("/dnsbl", web::post().to(handlers::dnsbl))
                .route("/ptr", web::post().to(handlers::ptr))
                .route("/ip/check", web::post().to(handlers::check_ips))
                .route("/ip/statistics", web::post().to(handlers::ip_statistics))
                .route("/ip/cache", web::get().to(handlers::cache_info))
                .route("/ip/cache", web::delete().to(handlers::clear_cache)),
        );
}
