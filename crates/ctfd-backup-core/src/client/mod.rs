//! CTFd API client.
//!
//! Holds the base URL, session cookie, User-Agent and timeouts, set once before
//! any worker starts. It is `Sync` and shared by reference across all worker
//! threads; every request builds its own curl easy handle from it, so no
//! locking is needed.

mod error;
mod title;

pub use error::FetchError;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::config::BackupConfig;
use crate::download::CHUNK_SIZE;

const FALLBACK_CTF_NAME: &str = "ctf";

/// Buffered response of an API request.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u32,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Which timeout profile a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    /// Small JSON request; hard wall-clock timeout.
    Api,
    /// Streamed attachment; abort only when the transfer stalls.
    File,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    session: Option<String>,
    user_agent: String,
    api_timeout: Duration,
    file_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &BackupConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: config.session.clone(),
            user_agent: config.user_agent.clone(),
            api_timeout: config.timeouts.api,
            file_timeout: config.timeouts.file,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/api/v1/teams`.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Build a configured easy handle for `url`.
    pub(crate) fn handle(&self, url: &str, kind: RequestKind) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        if let Some(session) = &self.session {
            easy.cookie(&format!("session={}", session))?;
        }
        match kind {
            RequestKind::Api => {
                easy.connect_timeout(self.api_timeout)?;
                easy.timeout(self.api_timeout)?;
            }
            RequestKind::File => {
                easy.connect_timeout(self.file_timeout)?;
                // No wall-clock limit: large attachments are fine as long as bytes keep flowing.
                easy.low_speed_limit(1)?;
                easy.low_speed_time(self.file_timeout)?;
                easy.buffer_size(CHUNK_SIZE)?;
                easy.fail_on_error(true)?;
            }
        }
        Ok(easy)
    }

    /// GET `url` and buffer the whole body. Only used for small API responses.
    pub fn get(&self, url: &str) -> Result<Response, FetchError> {
        let mut body = Vec::new();
        let mut easy = self.handle(url, RequestKind::Api)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let status = easy.response_code()?;
        let content_type = easy.content_type()?.map(str::to_string);
        tracing::debug!(url, status, bytes = body.len(), "GET");
        Ok(Response {
            status,
            content_type,
            body,
        })
    }

    /// GET an endpoint and unwrap the `{"data": ...}` envelope.
    ///
    /// Anything other than a 200 JSON response with a non-null `data` member is
    /// an error; callers decide whether that means "none" or "skip".
    pub fn fetch_data(&self, endpoint: &str) -> Result<Value, FetchError> {
        let resp = self.get(&self.url_for(endpoint))?;
        if resp.status != 200 {
            return Err(FetchError::Http(resp.status));
        }
        let is_json = resp
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            return Err(FetchError::NotJson(resp.content_type));
        }
        let mut envelope: Value = serde_json::from_slice(&resp.body)?;
        match envelope.get_mut("data").map(Value::take) {
            None | Some(Value::Null) => Err(FetchError::MissingData),
            Some(data) => Ok(data),
        }
    }

    /// Like [`fetch_data`](Self::fetch_data), decoding `data` into `T`.
    pub fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let data = self.fetch_data(endpoint)?;
        Ok(serde_json::from_value(data)?)
    }

    /// CTF name from the home page `<title>`, or `"ctf"` when it cannot be read.
    pub fn ctf_name(&self) -> String {
        tracing::info!("detecting CTF name from {}", self.base_url);
        let detected = match self.get(&self.base_url) {
            Ok(resp) if resp.status == 200 => {
                title::ctf_name_from_html(&String::from_utf8_lossy(&resp.body))
            }
            Ok(resp) => {
                tracing::warn!("home page returned HTTP {}", resp.status);
                None
            }
            Err(e) => {
                tracing::warn!("could not fetch home page: {}", e);
                None
            }
        };
        match detected {
            Some(name) => {
                tracing::info!("CTF name: {}", name);
                name
            }
            None => {
                tracing::info!("using default CTF name: {}", FALLBACK_CTF_NAME);
                FALLBACK_CTF_NAME.to_string()
            }
        }
    }
}
