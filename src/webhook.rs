//! Delivery through an incoming webhook.
//!
//! Webhooks need no credentials: the URL itself selects the workspace and
//! channel. Slack answers with a short plain-text body (`ok` on success).

use log::{debug, error, info};
use reqwest::blocking::Client as ReqwestClient;
use serde::Serialize;

use crate::client::{build_http_client, read_body};
use crate::configuration::ClientOptions;
use crate::error::{Error, Result};
use crate::message::Message;

/// Sends JSON payloads to incoming webhook URLs
pub struct WebhookClient {
    client: ReqwestClient,
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookClient {
    pub fn new() -> Self {
        Self::with_options(&ClientOptions::default())
    }

    pub fn with_options(options: &ClientOptions) -> Self {
        WebhookClient {
            client: build_http_client(options),
        }
    }

    /// POST `payload` as JSON to `url` and return the raw response body.
    ///
    /// `payload` can be any serializable value: a [`Message`], an
    /// [`Attachment`](crate::Attachment), or a plain JSON map.
    pub fn send<P: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &P,
        headers: &[(&str, &str)],
    ) -> Result<String> {
        debug!("POST {}", url);

        let request = headers
            .iter()
            .fold(self.client.post(url).json(payload), |request, (name, value)| {
                request.header(*name, *value)
            });

        let response = request.send().map_err(|e| {
            error!("HTTP request failed: {}", e);
            Error::Http(e)
        })?;

        let body = read_body(response)?;
        info!("Webhook delivered: {}", body);
        Ok(body)
    }

    /// Send a message with no extra headers
    pub fn send_message(&self, url: &str, message: &Message) -> Result<String> {
        self.send(url, message, &[])
    }
}
