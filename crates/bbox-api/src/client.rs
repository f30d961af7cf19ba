// Router API HTTP client
//
// Wraps `reqwest::Client` with Bbox URL construction and status
// mapping. Endpoint groups (auth, commands) are implemented as inherent
// methods in separate files to keep this module focused on transport
// mechanics.

use std::sync::Arc;

use reqwest::Method;
use reqwest::cookie::Jar;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v1";

/// Raw HTTP client for the router's management API.
///
/// Read calls return the decoded JSON body untouched. The router answers
/// with a list of object fragments, but checking that shape is the
/// caller's job, not the transport's.
#[derive(Clone)]
pub struct BboxClient {
    http: reqwest::Client,
    base_url: Url,
    /// Kept so the session cookie outlives clones of the HTTP client.
    #[allow(dead_code)]
    cookie_jar: Option<Arc<Jar>>,
}

impl BboxClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is added when the config doesn't carry one, since the
    /// session established by [`login`](Self::login) lives in a cookie.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// Build the router base URL from a bare host (`mabbox.bytel.fr`,
    /// `192.168.1.254`, `127.0.0.1:8080`).
    pub fn url_for_host(host: &str, use_tls: bool) -> Result<Url, Error> {
        let scheme = if use_tls { "https" } else { "http" };
        let host = host.trim().trim_end_matches('/');
        Ok(Url::parse(&format!("{scheme}://{host}"))?)
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/v1/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{API_PREFIX}/{path}"))?)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch one read endpoint and return its raw JSON body.
    pub async fn fetch(&self, endpoint: Endpoint) -> Result<Value, Error> {
        let url = self.api_url(endpoint.path())?;
        debug!(%endpoint, "fetching");
        self.get(url).await
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get(&self, url: Url) -> Result<Value, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        let body = resp.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Send a form-encoded request. Write endpoints answer with an empty
    /// body, so only the status is checked.
    pub(crate) async fn send_form(
        &self,
        method: Method,
        url: Url,
        form: &[(&str, &str)],
    ) -> Result<(), Error> {
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if !form.is_empty() {
            builder = builder.form(form);
        }
        let resp = builder.send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Map HTTP failure statuses onto [`Error`] variants.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "session expired or invalid password".into(),
        });
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Forbidden {
            message: "operation refused by the router (HTTP 403)".into(),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    Ok(resp)
}

/// Encode a boolean the way the router's forms expect.
pub(crate) fn flag(enable: bool) -> &'static str {
    if enable { "1" } else { "0" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_host_picks_scheme() {
        let url = BboxClient::url_for_host("mabbox.bytel.fr", true).expect("valid host");
        assert_eq!(url.as_str(), "https://mabbox.bytel.fr/");

        let url = BboxClient::url_for_host("192.168.1.254/", false).expect("valid host");
        assert_eq!(url.as_str(), "http://192.168.1.254/");
    }

    #[test]
    fn api_url_appends_prefix() {
        let base = Url::parse("http://127.0.0.1:8080").expect("valid url");
        let client = BboxClient::with_client(reqwest::Client::new(), base);
        let url = client.api_url("wan/ip/stats").expect("valid path");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/v1/wan/ip/stats");
    }

    #[test]
    fn flag_encoding() {
        assert_eq!(flag(true), "1");
        assert_eq!(flag(false), "0");
    }
}
