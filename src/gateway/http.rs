//! HTTP gateway that posts JSON requests to the game server.

use super::{
    FetchStateRequest, GatewayError, GatewayErrorKind, ServerGateway, StateResponse,
    SubmitResponse,
};
use crate::moves::PlayerMove;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, instrument, warn};

/// Game server client over HTTP.
///
/// Both request types are `POST`ed as JSON to the same play endpoint; the
/// server tells them apart by their shape.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// Full URL of the play endpoint.
    url: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl HttpGateway {
    /// Creates a gateway for `base_url` + `endpoint`.
    #[instrument(skip_all, fields(base_url = %base_url.as_ref(), endpoint = %endpoint.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, endpoint: impl AsRef<str>) -> Self {
        let url = format!(
            "{}/{}",
            base_url.as_ref().trim_end_matches('/'),
            endpoint.as_ref().trim_start_matches('/')
        );
        debug!(url = %url, "Created HTTP gateway");
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Returns the play endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts `body` and decodes the JSON reply.
    async fn post_json<Req, Resp>(&self, body: &Req) -> Result<Resp, GatewayError>
    where
        Req: Serialize + std::fmt::Debug + Sync,
        Resp: DeserializeOwned,
    {
        debug!(url = %self.url, request = ?body, "Sending request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %self.url, "Failed to send request");
                GatewayError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Server rejected request");
            return Err(GatewayError::new(GatewayErrorKind::Status(status.as_u16())));
        }

        let text = response.text().await?;
        debug!(response = %text, "Response body");

        serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, response = %text, "Failed to parse JSON response");
            GatewayError::new(GatewayErrorKind::Decode(e.to_string()))
        })
    }
}

#[async_trait::async_trait]
impl ServerGateway for HttpGateway {
    #[instrument(skip(self), fields(player = ?request.player))]
    async fn fetch_state(&self, request: FetchStateRequest) -> Result<StateResponse, GatewayError> {
        self.post_json(&request).await
    }

    #[instrument(skip(self), fields(player = ?request.player, mv = %request.mv))]
    async fn submit_move(&self, request: PlayerMove) -> Result<SubmitResponse, GatewayError> {
        self.post_json(&request).await
    }
}
