// Hand-crafted async HTTP client for the Ardoq REST API.
//
// Base path: <host>/api/
// Auth: `Authorization: Token token=<token>` header, `org=<org>` query on
// every request. Every request first takes a slot from the rate limiter.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::rate_limit::RateLimiter;
use crate::transport::TransportConfig;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one Ardoq organization.
///
/// Cheap to share by reference; all endpoint methods take `&self` and may
/// be awaited concurrently.
#[derive(Debug, Clone)]
pub struct ArdoqClient {
    http: reqwest::Client,
    base_url: Url,
    org: String,
    limiter: RateLimiter,
}

impl ArdoqClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects the `Authorization` header as a sensitive default header.
    pub fn from_token(
        base_url: &str,
        org: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token token={}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        let limiter = transport
            .rate_limit
            .map_or_else(RateLimiter::unlimited, RateLimiter::new);

        Self::from_reqwest(base_url, org, http, limiter)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &str,
        org: &str,
        http: reqwest::Client,
        limiter: RateLimiter,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            org: org.to_owned(),
            limiter,
        })
    }

    /// Ensure the base URL ends with `/api/`.
    ///
    /// `https://acme.ardoq.com` and `https://acme.ardoq.com/api` both become
    /// `https://acme.ardoq.com/api/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"model/abc"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        let resp = self.send(Method::GET, path, params, None).await?;
        resp.json()
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = serde_json::to_string(body)?;
        let resp = self.send(Method::POST, path, &[], Some(body)).await?;
        resp.json()
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = serde_json::to_string(body)?;
        let resp = self.send(Method::PUT, path, &[], Some(body)).await?;
        resp.json()
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    pub(crate) async fn delete_with_body<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let body = serde_json::to_string(body)?;
        let resp = self.send(Method::DELETE, path, &[], Some(body)).await?;
        resp.json()
    }

    /// Issue one request and classify the response.
    ///
    /// The serialized request body is kept so a failure can report it.
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<Success, Error> {
        let url = self.url(path)?;
        let verb = method.to_string();
        self.limiter.acquire().await;
        debug!("{verb} {url}");

        let mut req = self
            .http
            .request(method, url.clone())
            .query(&[("org", self.org.as_str())])
            .query(params);
        if let Some(body) = &body {
            req = req
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status.is_success() {
            return Ok(Success {
                no_content: status == reqwest::StatusCode::NO_CONTENT || text.trim().is_empty(),
                body: text,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("{verb} {url} rejected the API token"),
            });
        }

        Err(Error::Api {
            method: verb,
            url: url.to_string(),
            status: status.as_u16(),
            request_body: body,
            response_body: text,
        })
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Body of a 2xx response.
struct Success {
    body: String,
    no_content: bool,
}

impl Success {
    /// Decode the body. An empty (204) body decodes as JSON `{}` so callers
    /// expecting an object with defaulted fields still get a value.
    fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        let body = if self.no_content {
            "{}".to_owned()
        } else {
            self.body
        };
        serde_json::from_str(&body).map_err(|e| {
            let mut end = body.len().min(200);
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            let preview = &body[..end];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}
