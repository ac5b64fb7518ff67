//! HTTP liveness probe.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

use crate::domain::link_health::{LinkHealth, LinkProbe};

/// Probes a URL with `HEAD`, retrying with `GET` when the server answers
/// `405 Method Not Allowed`.
///
/// Redirects are not followed: a 3xx answer already shows the target is
/// served.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Builds a probe whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(Policy::none())
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("linkpulse-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    async fn send(&self, method: Method, url: &str) -> Result<StatusCode, reqwest::Error> {
        let response = self.client.request(method, url).send().await?;
        Ok(response.status())
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &str) -> LinkHealth {
        let status = match self.send(Method::HEAD, url).await {
            Ok(StatusCode::METHOD_NOT_ALLOWED) => self.send(Method::GET, url).await,
            other => other,
        };

        match status {
            Ok(status) => LinkHealth::from_status(status.as_u16()),
            Err(e) => LinkHealth::error(describe(&e)),
        }
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else if e.is_builder() {
        format!("unusable url: {e}")
    } else {
        e.to_string()
    }
}
