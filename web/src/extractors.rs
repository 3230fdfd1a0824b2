//! Custom Axum extractors.
//!
//! - [`ClientIp`]: originating address for the per-source rate ceiling
//! - [`ApiJson`]: JSON body whose rejection is the uniform error envelope

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::ApiError;

/// Client IP address.
///
/// Extracts the client IP from the `X-Forwarded-For` header (first IP),
/// falling back to `X-Real-IP`, then to the connection address supplied by
/// `ConnectInfo`, and finally to localhost. Used as the key for the
/// per-source rate ceiling, so a proxy deployment must forward the real
/// address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_client_ip(
            &parts.headers,
            parts.extensions.get(),
        )))
    }
}

/// Extract the client IP from headers or connection info.
fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&axum::extract::connect_info::ConnectInfo<std::net::SocketAddr>>,
) -> IpAddr {
    // X-Forwarded-For carries a comma-separated chain; the first entry is
    // the originating client.
    if let Some(forwarded) = headers.get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            if let Ok(ip) = ip_str.parse::<IpAddr>() {
                return ip;
            }
        }
    }

    connect_info.map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |info| info.0.ip())
}

/// JSON body extractor whose rejection is a 400 with the uniform envelope
/// instead of Axum's plain-text default.
#[derive(Debug, Clone, Copy)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: serde::de::DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}
