//! HTTP middleware: per-IP rate limiting, CORS, security headers,
//! request IDs, and request logging.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics;

type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Entries older than this are dropped when the cache hits capacity.
const RATE_LIMITER_TTL: Duration = Duration::from_secs(3600);
const MAX_RATE_LIMITER_ENTRIES: usize = 10_000;

/// Per-IP token bucket cache for the `/api` routes.
///
/// One governor limiter per client address, lazily created. The map is
/// bounded: at capacity, stale entries are evicted before inserting.
pub struct RateLimiterCache {
    limiters: RwLock<HashMap<IpAddr, (Arc<IpRateLimiter>, Instant)>>,
    quota: Quota,
}

impl RateLimiterCache {
    pub fn new(rps: u32, burst: u32) -> Self {
        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(rps);
        Self {
            limiters: RwLock::new(HashMap::new()),
            quota: Quota::per_second(rps).allow_burst(burst),
        }
    }

    /// Whether `ip` is currently within its quota.
    pub fn check(&self, ip: IpAddr) -> bool {
        if let Ok(map) = self.limiters.read() {
            if let Some((limiter, _)) = map.get(&ip) {
                return limiter.check().is_ok();
            }
        }

        // Fail open if the lock is poisoned; limiting is best effort.
        let Ok(mut map) = self.limiters.write() else {
            return true;
        };

        if let Some(entry) = map.get_mut(&ip) {
            entry.1 = Instant::now();
            return entry.0.check().is_ok();
        }

        if map.len() >= MAX_RATE_LIMITER_ENTRIES {
            let now = Instant::now();
            map.retain(|_, (_, last_seen)| now.duration_since(*last_seen) < RATE_LIMITER_TTL);
        }

        let limiter = Arc::new(RateLimiter::direct(self.quota));
        let allowed = limiter.check().is_ok();
        map.insert(ip, (limiter, Instant::now()));
        allowed
    }
}

pub async fn rate_limit_middleware(
    State(cache): State<Arc<RateLimiterCache>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request);

    if cache.check(ip) {
        return next.run(request).await;
    }

    debug!("Rate limit exceeded for {}", ip);
    metrics::record_rate_limit_hit(request.uri().path());
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("Retry-After", "1")],
        Json(serde_json::json!({ "detail": "Too many requests" })),
    )
        .into_response()
}

/// Client address for rate limiting: proxy headers first, then the
/// socket peer, then loopback.
fn extract_client_ip(request: &Request) -> IpAddr {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next().and_then(|s| s.trim().parse().ok()) {
            return ip;
        }
    }

    if let Some(ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
    {
        return ip;
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
            .max_age(Duration::from_secs(600))
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_credentials(true)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .expose_headers([HeaderName::from_static("x-request-id")])
            .max_age(Duration::from_secs(600))
    }
}

pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    response
}

/// Request ID, taken from `X-Request-ID` or generated, carried as an
/// extension and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    response
}

pub async fn request_logging(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    // Probe endpoints are polled constantly; keep them out of the logs.
    if matches!(path.as_str(), "/health" | "/healthz" | "/ready") {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        request_id = %request_id,
        "Request completed"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_burst_exhaustion_blocks_further_requests() {
        let cache = RateLimiterCache::new(1, 2);
        let ip: IpAddr = "10.1.2.3".parse().unwrap();
        assert!(cache.check(ip));
        assert!(cache.check(ip));
        assert!(!cache.check(ip));
    }

    #[test]
    fn test_addresses_are_limited_independently() {
        let cache = RateLimiterCache::new(1, 1);
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();
        assert!(cache.check(first));
        assert!(!cache.check(first));
        assert!(cache.check(second));
    }

    #[test]
    fn test_zero_rps_still_builds_a_limiter() {
        let cache = RateLimiterCache::new(0, 0);
        let ip: IpAddr = "10.0.0.9".parse().unwrap();
        assert!(cache.check(ip));
        assert!(!cache.check(ip));
    }

    #[test]
    fn test_forwarded_for_wins_over_peer() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_client_ip(&request),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_unroutable_request_falls_back_to_loopback() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(
            extract_client_ip(&request),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }
}
