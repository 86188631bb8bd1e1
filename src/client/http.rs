use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{ChangeHandler, RecordStore, Subscription};
use crate::changes::ChangeEvent;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{CrewMember, CrewMemberPayload};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: Option<T>,
    error: Option<String>,
}

/// Record store reached over the service's HTTP API, with the change channel
/// carried on a WebSocket.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.server_url)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn changes_url(&self) -> Result<String> {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(Error::Config(format!(
                "server URL must start with http:// or https://: {}",
                self.base_url
            )));
        };
        Ok(format!("{ws_base}/api/v1/changes"))
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        if resp.status().is_success() {
            let api_resp: ApiResponse<T> = resp.json().await?;
            api_resp
                .data
                .ok_or_else(|| Error::Store("Server returned an empty response".into()))
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn error_from(resp: reqwest::Response) -> Error {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Error::NotFound;
        }
        match resp.json::<ApiResponse<()>>().await {
            Ok(api_resp) => Error::Store(
                api_resp
                    .error
                    .unwrap_or_else(|| "Server error (no details provided)".into()),
            ),
            Err(_) => Error::Store(format!("Server responded with {status}")),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_all(&self) -> Result<Vec<CrewMember>> {
        let resp = self.client.get(self.url("/crewmates")).send().await?;
        Self::handle_response(resp).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CrewMember>> {
        let resp = self
            .client
            .get(self.url(&format!("/crewmates/{id}")))
            .send()
            .await?;
        match Self::handle_response(resp).await {
            Ok(member) => Ok(Some(member)),
            Err(Error::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert(&self, payload: &CrewMemberPayload) -> Result<CrewMember> {
        let resp = self
            .client
            .post(self.url("/crewmates"))
            .json(payload)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn update(&self, id: &str, payload: &CrewMemberPayload) -> Result<CrewMember> {
        let resp = self
            .client
            .put(self.url(&format!("/crewmates/{id}")))
            .json(payload)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/crewmates/{id}")))
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn subscribe_to_changes(&self, handler: ChangeHandler) -> Result<Subscription> {
        let url = self.changes_url()?;
        let (mut ws_stream, _) = connect_async(url.as_str()).await?;
        tracing::debug!(url = %url, "Change channel connected");

        let task = tokio::spawn(async move {
            while let Some(msg) = ws_stream.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ChangeEvent>(&text) {
                        Ok(event) => handler(event),
                        Err(e) => {
                            tracing::warn!(error = %e, raw = %text, "Malformed change event");
                            handler(ChangeEvent::resync());
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        tracing::info!(?frame, "Change channel closed by server");
                        break;
                    }
                    Ok(_) => {
                        // Ping/pong are answered by tungstenite; binary frames are ignored.
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Change channel receive error");
                        break;
                    }
                }
            }
        });

        Ok(Subscription::new(task))
    }
}
