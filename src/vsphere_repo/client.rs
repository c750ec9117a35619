// vSphere Automation REST client with session-based authentication.
// Talks to vCenter via `{origin}/api/...`.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::source::{SourceError, SourceResult};

const SESSION_HEADER: &str = "vmware-api-session-id";

pub(crate) struct VsphereClient {
    http: Client,
    base: Url,
    session_id: Option<String>,
}

impl VsphereClient {
    /// Builds the HTTP client; no session yet.
    pub(crate) fn new(base: Url, insecure: bool, timeout_secs: u64) -> SourceResult<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::connection(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base,
            session_id: None,
        })
    }

    /// POST /api/session with basic auth; the session id comes back as a JSON string.
    pub(crate) async fn login(&mut self, username: &str, password: &str) -> SourceResult<()> {
        let resp = self
            .http
            .post(self.url("/api/session")?)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(SourceError::auth("Invalid credentials"));
        }
        let resp = Self::check_status(resp).await?;
        let session_id: String = resp
            .json()
            .await
            .map_err(|e| SourceError::parse(format!("Failed to parse session response: {e}")))?;

        self.session_id = Some(session_id);
        Ok(())
    }

    /// DELETE /api/session; failures are ignored.
    pub(crate) async fn logout(&self) {
        let Some(sid) = self.session_id.as_deref() else {
            return;
        };
        let Ok(url) = self.url("/api/session") else {
            return;
        };
        if let Err(e) = self.http.delete(url).header(SESSION_HEADER, sid).send().await {
            tracing::debug!(error = %e, "vSphere logout failed");
        }
    }

    /// GET a JSON response with query parameters.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SourceResult<T> {
        let sid = self
            .session_id
            .as_deref()
            .ok_or_else(|| SourceError::auth("Not logged in, no active session"))?;
        let resp = self
            .http
            .get(self.url(path)?)
            .header(SESSION_HEADER, sid)
            .query(query)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::parse(format!("GET {path}: {e}")))
    }

    /// Absolute `path` replaces whatever path the configured address had (e.g. /sdk).
    fn url(&self, path: &str) -> SourceResult<Url> {
        Ok(self.base.join(path)?)
    }

    async fn check_status(resp: Response) -> SourceResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => SourceError::auth(format!("Session rejected: {body}")),
            _ => SourceError::api(status.as_u16(), format!("{status}: {body}")),
        })
    }
}
