//! Obtaining connection descriptors.
//!
//! Every exchange needs a fresh [`ConnectionDescriptor`]: the auth code in
//! it is single-use. [`HttpConnectionResolver`] asks the account's
//! connection endpoint for one; [`StaticResolver`] hands out a fixed value
//! for tests and for callers that resolved the descriptor themselves.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::connection::ConnectionDescriptor;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Endpoint that issues socket descriptors for a location.
pub const DEFAULT_CONNECTIONS_URL: &str = "https://app.ring.com/api/v1/rs/connections";

/// Produces a descriptor for the next exchange.
pub trait ConnectionResolver: Send + Sync {
    fn resolve(&self) -> impl Future<Output = Result<ConnectionDescriptor, Error>> + Send;
}

// ── StaticResolver ───────────────────────────────────────────────────

/// Resolver that always returns the same server and auth code.
///
/// Only useful where the server accepts a code more than once (local test
/// servers), or for a single exchange.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    server: String,
    auth_code: SecretString,
}

impl StaticResolver {
    pub fn new(server: impl Into<String>, auth_code: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            auth_code: SecretString::from(auth_code.into()),
        }
    }
}

impl ConnectionResolver for StaticResolver {
    async fn resolve(&self) -> Result<ConnectionDescriptor, Error> {
        Ok(ConnectionDescriptor::new(
            self.server.clone(),
            self.auth_code.expose_secret(),
        ))
    }
}

// ── HttpConnectionResolver ───────────────────────────────────────────

/// Requests descriptors from the account's connection endpoint.
///
/// `POST <connections_url>` with a bearer token and the form body
/// `accountId=<location_id>`; the endpoint answers `{server, authCode}`.
pub struct HttpConnectionResolver {
    http: reqwest::Client,
    connections_url: Url,
    location_id: String,
    access_token: SecretString,
}

impl std::fmt::Debug for HttpConnectionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnectionResolver")
            .field("connections_url", &self.connections_url.as_str())
            .field("location_id", &self.location_id)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct EndpointError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpConnectionResolver {
    /// Create a resolver from a `TransportConfig`.
    pub fn new(
        connections_url: Url,
        location_id: impl Into<String>,
        access_token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, connections_url, location_id, access_token))
    }

    /// Create a resolver with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        connections_url: Url,
        location_id: impl Into<String>,
        access_token: SecretString,
    ) -> Self {
        Self {
            http,
            connections_url,
            location_id: location_id.into(),
            access_token,
        }
    }

    pub fn connections_url(&self) -> &Url {
        &self.connections_url
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }
}

impl ConnectionResolver for HttpConnectionResolver {
    async fn resolve(&self) -> Result<ConnectionDescriptor, Error> {
        debug!(url = %self.connections_url, location = %self.location_id, "Requesting socket descriptor");

        let resp = self
            .http
            .post(self.connections_url.clone())
            .bearer_auth(self.access_token.expose_secret())
            .form(&[("accountId", self.location_id.as_str())])
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "access token rejected by the connection endpoint".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Resolver {
                status: status.as_u16(),
                message: endpoint_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned()),
            });
        }

        let descriptor: ConnectionDescriptor =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        debug!(server = %descriptor.server, "Socket descriptor issued");
        Ok(descriptor)
    }
}

fn endpoint_message(body: &str) -> Option<String> {
    let parsed: EndpointError = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_resolver_hands_out_its_descriptor() {
        let resolver = StaticResolver::new("127.0.0.1:1", "code");
        let descriptor = resolver.resolve().await.unwrap();
        assert_eq!(descriptor.server, "127.0.0.1:1");
        assert_eq!(descriptor.auth_code.expose_secret(), "code");
    }

    #[test]
    fn endpoint_messages() {
        assert_eq!(
            endpoint_message(r#"{"error":"boom"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(
            endpoint_message(r#"{"error":"e","message":"m"}"#).as_deref(),
            Some("m")
        );
        assert_eq!(endpoint_message("<html>"), None);
    }

    #[test]
    fn debug_hides_token() {
        let resolver = HttpConnectionResolver::with_client(
            reqwest::Client::new(),
            Url::parse(DEFAULT_CONNECTIONS_URL).unwrap(),
            "loc-1",
            SecretString::from("tok-secret"),
        );
        assert!(!format!("{resolver:?}").contains("tok-secret"));
    }
}
