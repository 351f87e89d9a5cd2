use std::net::{IpAddr, SocketAddr};
use std::task::{Context, Poll};

use axum::extract::connect_info::ConnectInfo;
use axum::http::{Extensions, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower::{Layer, Service};

use crate::config::AllowedIps;

/// Restricts a route (the MoMo IPN callback) to the gateway's source addresses.
#[derive(Clone, Debug)]
pub struct IpFilterLayer {
    allowed_ips: AllowedIps,
    trusted_proxy_depth: usize,
}

impl IpFilterLayer {
    pub fn new(allowed_ips: AllowedIps, trusted_proxy_depth: usize) -> Self {
        Self {
            allowed_ips,
            trusted_proxy_depth,
        }
    }
}

impl<S> Layer<S> for IpFilterLayer {
    type Service = IpFilterService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IpFilterService {
            inner,
            allowed_ips: self.allowed_ips.clone(),
            trusted_proxy_depth: self.trusted_proxy_depth,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IpFilterService<S> {
    inner: S,
    allowed_ips: AllowedIps,
    trusted_proxy_depth: usize,
}

impl<S, B> Service<Request<B>> for IpFilterService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = futures_util::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if let AllowedIps::Cidrs(_) = self.allowed_ips {
            let client_ip = client_ip(req.headers(), req.extensions(), self.trusted_proxy_depth);
            let allowed = client_ip.is_some_and(|ip| self.allowed_ips.contains(ip));

            if !allowed {
                tracing::warn!(client_ip = ?client_ip, path = %req.uri().path(), "Blocked IPN from address outside allowlist");
                let response = (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "error": "Forbidden", "status": 403 })),
                )
                    .into_response();
                return Box::pin(async move { Ok(response) });
            }
        }

        // Swap in the clone that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

fn client_ip(headers: &HeaderMap, extensions: &Extensions, trusted_proxy_depth: usize) -> Option<IpAddr> {
    if trusted_proxy_depth > 0 {
        if let Some(ip) = forwarded_client_ip(headers, trusted_proxy_depth) {
            return Some(ip);
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Picks the entry `depth` hops from the right of `x-forwarded-for`, skipping
/// the addresses appended by our own proxies.
fn forwarded_client_ip(headers: &HeaderMap, depth: usize) -> Option<IpAddr> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;

    let chain: Vec<IpAddr> = raw
        .split(',')
        .map(str::trim)
        .filter_map(|entry| {
            entry
                .parse::<IpAddr>()
                .ok()
                .or_else(|| entry.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
        })
        .collect();

    if depth >= chain.len() {
        return None;
    }

    chain.get(chain.len() - 1 - depth).copied()
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use ipnet::IpNet;
    use tower::{service_fn, ServiceExt};

    fn momo_only() -> AllowedIps {
        AllowedIps::Cidrs(vec!["118.69.210.0/24".parse::<IpNet>().unwrap()])
    }

    async fn call(layer: IpFilterLayer, xff: Option<&'static str>, peer: Option<[u8; 4]>) -> StatusCode {
        let service = layer.layer(service_fn(|_req: Request<Body>| async move {
            Ok::<Response, Infallible>(StatusCode::OK.into_response())
        }));

        let mut req = Request::builder()
            .method("POST")
            .uri("/payment/momo/ipn")
            .body(Body::empty())
            .unwrap();
        if let Some(value) = xff {
            req.headers_mut()
                .insert("x-forwarded-for", HeaderValue::from_static(value));
        }
        if let Some(octets) = peer {
            req.extensions_mut()
                .insert(ConnectInfo(SocketAddr::from((octets, 443))));
        }

        service.oneshot(req).await.unwrap().status()
    }

    #[test]
    fn forwarded_ip_skips_trusted_proxies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("118.69.210.244, 10.0.0.2"),
        );

        assert_eq!(
            forwarded_client_ip(&headers, 1),
            Some(IpAddr::from([118, 69, 210, 244]))
        );
        assert_eq!(forwarded_client_ip(&headers, 2), None);
    }

    #[tokio::test]
    async fn allowlisted_gateway_passes() {
        let layer = IpFilterLayer::new(momo_only(), 1);
        let status = call(layer, Some("118.69.210.244, 10.0.0.2"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn other_addresses_are_forbidden() {
        let layer = IpFilterLayer::new(momo_only(), 1);
        let status = call(layer, Some("203.0.113.9, 10.0.0.2"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn forwarded_header_ignored_without_trusted_proxy() {
        // A client could forge x-forwarded-for when nothing in front rewrites it.
        let layer = IpFilterLayer::new(momo_only(), 0);
        let status = call(layer, Some("118.69.210.244"), Some([203, 0, 113, 9])).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn peer_address_used_when_no_proxy() {
        let layer = IpFilterLayer::new(momo_only(), 0);
        let status = call(layer, None, Some([118, 69, 210, 10])).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn wildcard_allows_unknown_peer() {
        let layer = IpFilterLayer::new(AllowedIps::Any, 0);
        assert_eq!(call(layer, None, None).await, StatusCode::OK);
    }
}
