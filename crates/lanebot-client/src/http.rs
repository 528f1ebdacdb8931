use std::time::Duration;

use async_trait::async_trait;
use lanebot_types::{config::ClientConfig, Result};
use tracing::debug;

use crate::{client_error, AllGameData, LiveStateClient};

/// Client for the in-game live-data server. The endpoint serves a
/// self-signed certificate, so verification is disabled for it.
pub struct HttpLiveClient {
    http: reqwest::Client,
    url: String,
}

impl HttpLiveClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| client_error(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            url: config.live_data_url.clone(),
        })
    }
}

#[async_trait]
impl LiveStateClient for HttpLiveClient {
    async fn fetch(&self) -> Result<AllGameData> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| client_error(format!("live data request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "live data endpoint returned non-success");
            return Err(client_error(format!(
                "live data endpoint returned {status}"
            )));
        }

        response
            .json::<AllGameData>()
            .await
            .map_err(|err| client_error(format!("malformed live data payload: {err}")))
    }
}
