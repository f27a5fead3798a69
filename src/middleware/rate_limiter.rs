// Per-client rate limiting with governor

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::clock::{Clock, DefaultClock, Reference};
use governor::nanos::Nanos;
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const WINDOW: Duration = Duration::from_secs(60);

/// Tracked clients above which idle entries are pruned
const PRUNE_THRESHOLD: usize = 10_000;

/// Rolling one-minute window per client IP: a request is admitted when
/// fewer than `per_minute` admitted requests from the same IP fall inside
/// the last 60 seconds. Time comes from a governor [`Clock`].
#[derive(Clone)]
pub struct ClientRateLimiter<C: Clock = DefaultClock> {
    clock: C,
    per_minute: NonZeroU32,
    hits: Arc<Mutex<HashMap<IpAddr, VecDeque<C::Instant>>>>,
}

impl ClientRateLimiter {
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        Self::with_clock(per_minute, DefaultClock::default())
    }
}

impl<C: Clock> ClientRateLimiter<C> {
    pub fn with_clock(per_minute: NonZeroU32, clock: C) -> Self {
        Self {
            clock,
            per_minute,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record one request from `ip`; false when its window is full
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = self.clock.now();
        let window = Nanos::from(WINDOW);
        let expired = |at: &C::Instant| now.duration_since(*at) >= window;

        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if hits.len() > PRUNE_THRESHOLD {
            hits.retain(|_, stamps| stamps.back().is_some_and(|last| !expired(last)));
        }

        let stamps = hits.entry(ip).or_default();
        while stamps.front().is_some_and(|first| expired(first)) {
            stamps.pop_front();
        }

        if stamps.len() >= self.per_minute.get() as usize {
            return false;
        }
        stamps.push_back(now);
        true
    }

    pub fn limit_message(&self) -> String {
        format!("Rate limit exceeded: {} per 1 minute", self.per_minute)
    }
}

/// Peer address from the connection, then the first `X-Forwarded-For`
/// entry, then the unspecified address.
pub fn client_ip(req: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limiter_middleware(
    State(limiter): State<ClientRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    if !limiter.check(ip) {
        warn!(client = %ip, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({ "error": limiter.limit_message() })),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, middleware, routing::post, Router};
    use governor::clock::FakeRelativeClock;
    use tower::ServiceExt;

    fn limit(n: u32) -> ClientRateLimiter {
        ClientRateLimiter::per_minute(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn test_quota_is_per_client() {
        let limiter = limit(2);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
        assert_eq!(limiter.limit_message(), "Rate limit exceeded: 2 per 1 minute");
    }

    #[test]
    fn test_window_rolls_over_a_full_minute() {
        let clock = FakeRelativeClock::default();
        let limiter = ClientRateLimiter::with_clock(NonZeroU32::new(5).unwrap(), clock.clone());
        let ip: IpAddr = "10.0.0.7".parse().unwrap();

        // One call, then five more 12.1 s later: the sixth inside a minute is refused
        assert!(limiter.check(ip));
        clock.advance(Duration::from_millis(12_100));
        for _ in 0..4 {
            assert!(limiter.check(ip));
        }
        assert!(!limiter.check(ip));

        // At 60 s only the first call has left the window
        clock.advance(Duration::from_millis(47_900));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));

        // At 72.1 s the four calls from 12.1 s have left too
        clock.advance(Duration::from_millis(12_100));
        for _ in 0..4 {
            assert!(limiter.check(ip));
        }
        assert!(!limiter.check(ip));
    }

    #[test]
    fn test_refused_calls_do_not_extend_the_window() {
        let clock = FakeRelativeClock::default();
        let limiter = ClientRateLimiter::with_clock(NonZeroU32::new(1).unwrap(), clock.clone());
        let ip: IpAddr = "10.0.0.8".parse().unwrap();

        assert!(limiter.check(ip));
        clock.advance(Duration::from_secs(30));
        assert!(!limiter.check(ip));
        clock.advance(Duration::from_secs(30));
        assert!(limiter.check(ip));
    }

    #[test]
    fn test_client_ip_sources() {
        let mut req = http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.7".parse::<IpAddr>().unwrap());

        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 9], 40000))));
        assert_eq!(client_ip(&req), "192.168.1.9".parse::<IpAddr>().unwrap());

        let bare = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&bare), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[tokio::test]
    async fn test_middleware_returns_429_json() {
        let app = Router::new()
            .route("/chat", post(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limit(1), rate_limiter_middleware));

        let request = || {
            http::Request::builder()
                .method("POST")
                .uri("/chat")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = axum::body::to_bytes(second.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Rate limit exceeded: 1 per 1 minute");
    }
}
