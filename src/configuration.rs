use crate::error::Error;
use log::warn;
use once_cell::sync::Lazy;
use reqwest::Url;
use std::env;
use std::sync::{Arc, Mutex};

/// Base URL of Slack's Web API
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

static CONFIGURATION: Lazy<Arc<Mutex<Configuration>>> =
    Lazy::new(|| Arc::new(Mutex::new(Configuration::default())));

/// HTTP client options for API requests
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds
    pub timeout: u64,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Configuration for the Slack clients
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Bearer token for the Web API (`xoxb-...`)
    token: Option<String>,
    /// Incoming webhook URL
    webhook_url: Option<String>,
    /// Base URL the Web API methods are appended to
    api_base_url: String,
    /// HTTP client options
    client_options: ClientOptions,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            token: None,
            webhook_url: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            client_options: ClientOptions::default(),
        }
    }
}

impl Configuration {
    /// Read `SLACK_TOKEN`, `SLACK_WEBHOOK_URL` and `SLACK_API_BASE_URL`,
    /// leaving defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Configuration::default();

        if let Ok(token) = env::var("SLACK_TOKEN") {
            config.set_token(token);
        }
        if let Ok(url) = env::var("SLACK_WEBHOOK_URL") {
            config.set_webhook_url(url);
        }
        if let Ok(url) = env::var("SLACK_API_BASE_URL") {
            config.set_api_base_url(url);
        }

        config
    }

    /// Get a shared reference to the global configuration instance
    pub fn get_instance() -> Arc<Mutex<Configuration>> {
        Arc::clone(&*CONFIGURATION)
    }

    /// Get a clone of the current global configuration
    pub fn get_cloned_instance() -> Result<Configuration, Error> {
        Self::get_instance()
            .lock()
            .map(|config| config.clone())
            .map_err(|_| Error::configuration("Configuration lock poisoned"))
    }

    /// Modify the global configuration instance
    pub fn get_instance_mut<F>(config_fn: F)
    where
        F: FnOnce(&mut Configuration),
    {
        let instance = Self::get_instance();

        let mut config = match instance.lock() {
            Ok(config) => config,
            Err(poisoned) => {
                warn!("Recovering poisoned configuration lock");
                poisoned.into_inner()
            }
        };
        config_fn(&mut config);
    }

    /// Set the Web API bearer token
    pub fn set_token<S: AsRef<str>>(&mut self, token: S) {
        self.token = non_empty(token);
    }

    /// Get the Web API bearer token
    pub fn token(&self) -> Result<&str, Error> {
        self.token
            .as_deref()
            .ok_or_else(|| Error::configuration("Slack token not configured"))
    }

    /// Set the incoming webhook URL
    pub fn set_webhook_url<S: AsRef<str>>(&mut self, url: S) {
        self.webhook_url = non_empty(url);
    }

    /// Get the incoming webhook URL
    pub fn webhook_url(&self) -> Result<&str, Error> {
        self.webhook_url
            .as_deref()
            .ok_or_else(|| Error::configuration("Webhook URL not configured"))
    }

    /// Set the Web API base URL
    pub fn set_api_base_url<S: AsRef<str>>(&mut self, url: S) {
        self.api_base_url = url.as_ref().trim_end_matches('/').to_string();
    }

    /// Get the Web API base URL
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Set client options
    pub fn set_client_options(&mut self, options: ClientOptions) {
        self.client_options = options;
    }

    /// Get client options
    pub fn client_options(&self) -> &ClientOptions {
        &self.client_options
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.token.is_none() && self.webhook_url.is_none() {
            return Err(Error::configuration(
                "Either a Slack token or a webhook URL must be configured",
            ));
        }

        if let Some(url) = &self.webhook_url {
            check_url("webhook URL", url)?;
        }
        check_url("API base URL", &self.api_base_url)?;

        Ok(())
    }
}

fn non_empty<S: AsRef<str>>(value: S) -> Option<String> {
    let value = value.as_ref();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn check_url(name: &str, url: &str) -> Result<(), Error> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| Error::configuration(format!("Invalid {} '{}': {}", name, url, e)))
}
