// Device42 HTTP client
//
// Wraps `reqwest::Client` with Device42 URL construction, basic auth,
// a session cookie jar and form-encoded write bodies. Responses are decoded
// into `ApiResponse` as-is: no status translation, no retries.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::ApiResponse;
use crate::path::{self, ApiVersion};
use crate::transport::TransportConfig;

/// Raw HTTP client for a Device42 appliance.
///
/// Stateless per call except for cookies: every `Set-Cookie` the appliance
/// sends lands in the client's jar, keyed by name, and the jar's cookies go
/// out on every later request for the lifetime of the client.
#[derive(Debug)]
pub struct Device42Client {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    no_trailing_slash: Vec<String>,
    cookie_jar: Option<Arc<Jar>>,
}

impl Device42Client {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the appliance root, e.g. `https://d42.example.com:443`.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            no_trailing_slash: config.no_trailing_slash,
            cookie_jar: config.cookie_jar,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`, with the
    /// default trailing-slash exception table. Cookie handling is whatever
    /// the supplied client was built with; `session_cookie` reports `None`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            no_trailing_slash: TransportConfig::default().no_trailing_slash,
            cookie_jar: None,
        }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The user requests are authenticated as.
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// The `Cookie` header the jar would send to the appliance, if any.
    pub fn session_cookie(&self) -> Option<String> {
        use reqwest::cookie::CookieStore;
        let jar = self.cookie_jar.as_ref()?;
        jar.cookies(&self.base_url)?.to_str().ok().map(String::from)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the full read URL for a resource path: `{base}/api[/1.0]/{path}`,
    /// with the trailing-slash rule and its exception table applied to `path`.
    pub fn url_for(&self, version: ApiVersion, resource: &str) -> Result<Url, Error> {
        self.build_url(version, resource, &self.no_trailing_slash)
    }

    /// Write URLs always end in `/`; the exception table covers reads only.
    fn write_url(&self, version: ApiVersion, resource: &str) -> Result<Url, Error> {
        self.build_url(version, resource, &[])
    }

    fn build_url(
        &self,
        version: ApiVersion,
        resource: &str,
        no_trailing_slash: &[String],
    ) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let resource = path::normalize(resource, no_trailing_slash);
        let full = format!("{base}/{}{resource}", version.prefix());
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `GET /api/1.0/{path}` and decode the body.
    pub async fn get(&self, resource: &str) -> Result<ApiResponse, Error> {
        let url = self.url_for(ApiVersion::V1, resource)?;
        debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    /// `POST` a form-encoded body and decode the response.
    pub async fn post(
        &self,
        version: ApiVersion,
        resource: &str,
        form: &(impl Serialize + Sync),
    ) -> Result<ApiResponse, Error> {
        let url = self.write_url(version, resource)?;
        debug!("POST {}", url);
        self.send(self.http.post(url).form(form)).await
    }

    /// `PUT` a form-encoded body and decode the response.
    pub async fn put(
        &self,
        version: ApiVersion,
        resource: &str,
        form: &(impl Serialize + Sync),
    ) -> Result<ApiResponse, Error> {
        let url = self.write_url(version, resource)?;
        debug!("PUT {}", url);
        self.send(self.http.put(url).form(form)).await
    }

    /// Attach auth and accept headers, send, and decode the body. The
    /// cookie jar (when present) reads and records cookies on its own.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<ApiResponse, Error> {
        let resp = builder
            .header(ACCEPT, "application/json")
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose_secret()),
            )
            .send()
            .await?;
        trace!(status = %resp.status(), "response received");

        let body = resp.text().await?;
        Ok(ApiResponse::decode(body))
    }
}
