mod health;
mod probes;
mod region;

pub use health::healthz;
pub use probes::{dkim, dmarc, dnsbl, mx, ports, ptr, spf, tls};
pub use region::{cache_info, check_ips, clear_cache, ip_statistics};

use actix_web::HttpResponse;
use mailprobe_toolbox::ProbeResponse;
use serde::Serialize;

/// Every envelope, success or failure, goes out as 200 with its `ok` flag.
fn respond<T: Serialize>(response: &ProbeResponse<T>) -> HttpResponse {
    HttpResponse::Ok().json(response)
}

fn fail(message: impl Into<String>) -> HttpResponse {
    respond(&ProbeResponse::<()>::failure(message))
}
