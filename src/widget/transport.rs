use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use thiserror::Error;
use url::Url;

use crate::models::chat::{ ConversationReply, ConversationRequest };

pub const DEFAULT_RELAY_BASE_URL: &str = "http://127.0.0.1:4000";
pub const RELAY_PATH: &str = "/api/chat";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("invalid relay base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay answered with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
    },
    #[error("relay reported an error: {0}")]
    Relay(String),
    #[error("relay response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Carries one turn to the relay and returns the reply text.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &ConversationRequest) -> Result<String, WidgetError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    endpoint: Url,
}

impl HttpTransport {
    /// `base_url` is the host's override; `None` targets the default relay.
    pub fn new(base_url: Option<&str>) -> Result<Self, WidgetError> {
        let base = base_url
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_RELAY_BASE_URL);
        let endpoint = Self::endpoint_for(base)?;

        Ok(Self { http: HttpClient::new(), endpoint })
    }

    pub fn endpoint_for(base: &str) -> Result<Url, WidgetError> {
        let joined = format!("{}{}", base.trim_end_matches('/'), RELAY_PATH);
        Url::parse(&joined).map_err(|source| WidgetError::InvalidBaseUrl {
            url: base.to_string(),
            source,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpTransport {
    async fn send(&self, request: &ConversationRequest) -> Result<String, WidgetError> {
        debug!("Posting {} message(s) to {}", request.messages.len(), self.endpoint);

        let resp = self.http.post(self.endpoint.clone()).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            // Proxies in front of the relay may answer with non-JSON bodies.
            let message = match serde_json::from_str::<ConversationReply>(&body) {
                Ok(ConversationReply::Error { error }) => error,
                _ => status.canonical_reason().unwrap_or("unexpected status").to_string(),
            };
            return Err(WidgetError::Status { status: status.as_u16(), message });
        }

        match serde_json::from_str::<ConversationReply>(&body)? {
            ConversationReply::Reply { reply } => Ok(reply),
            ConversationReply::Error { error } => Err(WidgetError::Relay(error)),
        }
    }
}
