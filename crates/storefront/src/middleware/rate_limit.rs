//! Per-IP rate limits using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: login and sign-up (~10/min)
//! - `form_rate_limiter`: contact form and order placement (~30/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client address, most trusted first.
const CLIENT_IP_HEADERS: &[&str] = &[
    "fly-client-ip",
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
];

/// Key requests by the client address reported by the Fly.io or
/// Cloudflare proxy, falling back to the peer address when no proxy header
/// is present.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();
        CLIENT_IP_HEADERS
            .iter()
            .filter_map(|name| headers.get(*name)?.to_str().ok())
            // x-forwarded-for is a list; the client is first.
            .filter_map(|value| value.split(',').next()?.trim().parse::<IpAddr>().ok())
            .next()
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(seconds_per_token: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(seconds_per_token)
        .burst_size(burst)
        .finish()
        .expect("rate limiter period and burst are non-zero");
    GovernorLayer::new(Arc::new(config))
}

/// One token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never; the period and burst are non-zero constants.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// One token every 2 seconds, burst of 10.
///
/// # Panics
///
/// Never; the period and burst are non-zero constants.
#[must_use]
pub fn form_rate_limiter() -> RateLimiterLayer {
    limiter(2, 10)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_fly_header_preferred() {
        let req = request(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("fly-client-ip", "198.51.100.4"),
        ]);
        let ip = ProxyIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let req = request(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(ProxyIpKeyExtractor.extract(&req).unwrap().to_string(), "203.0.113.9");
    }

    #[test]
    fn test_unparseable_headers_skipped() {
        let req = request(&[("fly-client-ip", "unknown"), ("x-real-ip", "192.0.2.7")]);
        assert_eq!(ProxyIpKeyExtractor.extract(&req).unwrap().to_string(), "192.0.2.7");
        assert!(ProxyIpKeyExtractor.extract(&request(&[])).is_err());
    }

    #[test]
    fn test_peer_address_fallback() {
        let mut req = request(&[]);
        let peer: SocketAddr = "192.0.2.50:41000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(ProxyIpKeyExtractor.extract(&req).unwrap().to_string(), "192.0.2.50");
    }
}
