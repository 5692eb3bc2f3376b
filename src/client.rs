use log::{debug, error, info};
use reqwest::blocking::{Client as ReqwestClient, RequestBuilder, Response as ReqwestResponse};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::configuration::{ClientOptions, DEFAULT_API_BASE_URL};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::payload::Payload;

/// Build the blocking HTTP client shared by both transports
pub(crate) fn build_http_client(options: &ClientOptions) -> ReqwestClient {
    ReqwestClient::builder()
        .timeout(Duration::from_secs(options.timeout))
        .user_agent(options.user_agent.clone())
        .build()
        .unwrap_or_else(|_| ReqwestClient::new())
}

/// Turn a non-2xx status into an API error, otherwise hand back the body
pub(crate) fn read_body(response: ReqwestResponse) -> Result<String> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        error!("HTTP error status {}: {}", status.as_u16(), body);

        return Err(Error::api(format!(
            "HTTP error (status {}): {}",
            status.as_u16(),
            body
        )));
    }

    Ok(response.text()?)
}

/// Per-request options for [`SlackClient`] calls
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    token: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extra header
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticate this request alone with a different token
    pub fn token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// The envelope every Web API method responds with.
///
/// ```json
/// { "ok": true, "channel": "C123", "ts": "1503435956.000247" }
/// ```
///
/// ```json
/// { "ok": false, "error": "invalid_auth" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Whether the request was successful
    pub ok: bool,
    /// Error code when `ok` is false
    pub error: Option<String>,
    /// Non-fatal warnings
    pub warning: Option<String>,
    /// Every other key of the response
    #[serde(flatten)]
    pub data: Payload,
}

/// Client for Slack's token-authenticated Web API
pub struct SlackClient {
    client: ReqwestClient,
    base_url: String,
    token: String,
    token_override: Option<String>,
}

impl SlackClient {
    /// Create a client authenticating with `token`
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self::with_options(token, &ClientOptions::default())
    }

    /// Create a client with explicit HTTP options
    pub fn with_options<S: Into<String>>(token: S, options: &ClientOptions) -> Self {
        SlackClient {
            client: build_http_client(options),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: token.into(),
            token_override: None,
        }
    }

    /// Point the client at another API base URL
    pub fn with_base_url<S: AsRef<str>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Use `token` instead of the default until [`use_default_token`](Self::use_default_token)
    pub fn with_token<S: Into<String>>(&mut self, token: S) -> &mut Self {
        self.token_override = Some(token.into());
        self
    }

    /// Go back to the token the client was created with
    pub fn use_default_token(&mut self) -> &mut Self {
        self.token_override = None;
        self
    }

    /// Call a Web API method with GET and a query string
    pub fn get(&self, method: &str, query: &[(&str, &str)], options: &RequestOptions) -> Result<Value> {
        let request = self.request(reqwest::Method::GET, method, options).query(query);
        self.execute(request)
    }

    /// Call a Web API method with POST and a JSON body
    pub fn post<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<Value> {
        let request = self.request(reqwest::Method::POST, method, options).json(body);
        self.execute(request)
    }

    /// Post a message with `chat.postMessage`, failing on an `ok: false` response.
    pub fn post_message(&self, message: &Message) -> Result<ApiResponse> {
        let value = self.post("chat.postMessage", message, &RequestOptions::default())?;
        let response: ApiResponse = serde_json::from_value(value)?;

        if !response.ok {
            let description = response
                .error
                .unwrap_or_else(|| "Unknown API error".to_string());

            error!("Slack API returned error: {}", description);
            return Err(Error::api(description));
        }

        if let Some(warning) = &response.warning {
            debug!("Slack API warning: {}", warning);
        }

        info!("Message posted to {}", message.channel());
        Ok(response)
    }

    fn request(&self, verb: reqwest::Method, method: &str, options: &RequestOptions) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, method.trim_start_matches('/'));
        debug!("{} {}", verb, url);

        let token = options
            .token
            .as_deref()
            .or(self.token_override.as_deref())
            .unwrap_or(&self.token);

        options.headers.iter().fold(
            self.client
                .request(verb, url)
                .header(AUTHORIZATION, format!("Bearer {}", token)),
            |request, (name, value)| request.header(name.as_str(), value.as_str()),
        )
    }

    fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().map_err(|e| {
            error!("HTTP request failed: {}", e);
            Error::Http(e)
        })?;

        let body = read_body(response)?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {}", e);
            Error::Json(e)
        })
    }
}
