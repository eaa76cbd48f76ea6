// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for Shelly devices.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ProtocolError;
use crate::field::{Snapshot, parse_snapshot, parse_top_level};
use crate::protocol::template::resolve_url;

// ============================================================================
// HttpConfig - Connection settings for one device
// ============================================================================

/// Configuration for an HTTP Shelly device.
///
/// Besides building the client, the configuration provides the named
/// placeholders (`{provider_host}`, `{provider_port}`) that endpoint templates
/// are resolved against.
///
/// # Examples
///
/// ```
/// use shelly_bridge::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = HttpConfig::new("192.168.1.100");
///
/// // With all options
/// let config = HttpConfig::new("192.168.1.100")
///     .with_port(8080)
///     .with_credentials("admin", "password")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.placeholders()["provider_host"], "192.168.1.100:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Placeholder name for the device address.
    pub const HOST_PLACEHOLDER: &'static str = "provider_host";
    /// Placeholder name for the device port.
    pub const PORT_PLACEHOLDER: &'static str = "provider_port";

    /// Creates a new HTTP configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the device, optionally with
    ///   a `:port` suffix
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets credentials for the device's restricted login.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the named values endpoint templates are resolved against.
    ///
    /// `provider_host` includes the port only when it differs from 80.
    #[must_use]
    pub fn placeholders(&self) -> HashMap<String, String> {
        let authority = if self.port == Self::DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        };
        HashMap::from([
            (Self::HOST_PLACEHOLDER.to_string(), authority),
            (Self::PORT_PLACEHOLDER.to_string(), self.port.to_string()),
        ])
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        let placeholders = self.placeholders();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        let credentials = self
            .credentials
            .map(|(username, password)| Credentials { username, password });

        Ok(HttpClient {
            client,
            credentials,
            placeholders,
        })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client bound to one device configuration.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    credentials: Option<Credentials>,
    placeholders: HashMap<String, String>,
}

/// HTTP authentication credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl HttpClient {
    /// Resolves an endpoint template against this client's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the result is not a URL.
    pub fn resolve(&self, template: &str) -> Result<Url, ProtocolError> {
        resolve_url(template, &self.placeholders)
    }

    /// Fetches an endpoint and flattens its JSON body below `prefix`.
    ///
    /// Returns `None` if the device answered with a non-success status.
    /// Bodies that are not a JSON object yield an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the template does not resolve or the
    /// request fails at the transport level.
    pub async fn fetch_snapshot(
        &self,
        template: &str,
        prefix: &str,
    ) -> Result<Option<Snapshot>, ProtocolError> {
        let body = self.fetch_body(template).await?;
        Ok(body.map(|body| parse_snapshot(prefix, &body)))
    }

    /// Fetches an endpoint and keeps its top-level values under their
    /// original keys.
    ///
    /// Returns `None` if the device answered with a non-success status.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the template does not resolve or the
    /// request fails at the transport level.
    pub async fn fetch_top_level(&self, template: &str) -> Result<Option<Snapshot>, ProtocolError> {
        let body = self.fetch_body(template).await?;
        Ok(body.map(|body| parse_top_level(&body)))
    }

    async fn fetch_body(&self, template: &str) -> Result<Option<String>, ProtocolError> {
        let url = self.resolve(template)?;

        tracing::debug!(url = %url, "Fetching snapshot");

        let response = self.request(url.clone()).send().await.map_err(ProtocolError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(ProtocolError::Http)?;

        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "Snapshot endpoint answered with an error status"
            );
            return Ok(None);
        }

        tracing::debug!(body = %body, "Received snapshot");

        Ok(Some(body))
    }

    /// Issues a GET and discards whatever the device answers.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the template does not resolve or the
    /// request fails at the transport level. HTTP statuses are not checked.
    pub async fn send(&self, template: &str) -> Result<(), ProtocolError> {
        let url = self.resolve(template)?;

        tracing::debug!(url = %url, "Sending action");

        let response = self.request(url).send().await.map_err(ProtocolError::Http)?;

        tracing::debug!(status = response.status().as_u16(), "Action sent");

        Ok(())
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.get(url);
        match &self.credentials {
            Some(creds) => builder.basic_auth(&creds.username, Some(&creds.password)),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new("192.168.1.100");
        assert_eq!(config.host(), "192.168.1.100");
        assert_eq!(config.port(), 80);
        assert!(config.credentials().is_none());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn http_config_default_is_localhost() {
        let config = HttpConfig::default();
        assert_eq!(config.host(), "localhost");
        assert_eq!(config.port(), 80);
    }

    #[test]
    fn http_config_with_credentials() {
        let config = HttpConfig::new("192.168.1.100").with_credentials("admin", "secret");
        let creds = config.credentials().unwrap();
        assert_eq!(creds.0, "admin");
        assert_eq!(creds.1, "secret");
    }

    #[test]
    fn http_config_with_timeout() {
        let config = HttpConfig::new("192.168.1.100").with_timeout(Duration::from_secs(30));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn placeholders_default_port() {
        let placeholders = HttpConfig::new("192.168.1.100").placeholders();
        assert_eq!(placeholders["provider_host"], "192.168.1.100");
        assert_eq!(placeholders["provider_port"], "80");
    }

    #[test]
    fn placeholders_custom_port() {
        let placeholders = HttpConfig::new("192.168.1.100").with_port(8080).placeholders();
        assert_eq!(placeholders["provider_host"], "192.168.1.100:8080");
        assert_eq!(placeholders["provider_port"], "8080");
    }

    #[test]
    fn client_resolves_templates() {
        let client = HttpConfig::new("192.168.1.100").into_client().unwrap();
        let url = client.resolve("http://{provider_host}/rpc/Switch.Toggle?id=0").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.100/rpc/Switch.Toggle?id=0");
    }

    #[test]
    fn into_client_keeps_credentials() {
        let client = HttpConfig::new("192.168.1.100")
            .with_credentials("user", "pass")
            .into_client()
            .unwrap();
        assert!(client.credentials.is_some());
    }
}
