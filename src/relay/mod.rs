//! Transport-agnostic relay logic behind `POST /api/chat`.
//!
//! Hosting adapters translate their native request into a [`RelayRequest`],
//! call [`Relay::handle`], and write the [`RelayResponse`] back out. All
//! method guarding, body parsing, prompt assembly, model invocation and CORS
//! decoration happens here so every adapter behaves identically.

use crate::config::prompt::get_relay_prompt;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ConversationReply, ConversationRequest };

use axum::http::{ Method, StatusCode };
use log::{ debug, error, info };
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Failed to generate response";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("unreadable request body: {0}")]
    UnreadableBody(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the caller gets to see. Provider details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed(_) => METHOD_NOT_ALLOWED,
            _ => GENERIC_FAILURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayBody {
    Empty,
    /// The adapter could not produce a usable body (too large, cut off,
    /// not UTF-8).
    Unreadable(String),
    Text(String),
    Json(JsonValue),
}

impl RelayBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            RelayBody::Empty
        } else {
            match String::from_utf8(bytes.to_vec()) {
                Ok(text) => RelayBody::Text(text),
                Err(e) => RelayBody::Unreadable(e.to_string()),
            }
        }
    }

    /// Accepts an object, a serialized object, or a JSON string literal that
    /// itself wraps a serialized object.
    pub fn parse(&self) -> Result<ConversationRequest, RelayError> {
        match self {
            RelayBody::Empty => Ok(ConversationRequest::default()),
            RelayBody::Unreadable(reason) => Err(RelayError::UnreadableBody(reason.clone())),
            RelayBody::Text(text) => {
                let value: JsonValue = serde_json::from_str(text)?;
                RelayBody::Json(value).parse()
            }
            RelayBody::Json(JsonValue::String(inner)) => {
                Ok(serde_json::from_str::<ConversationRequest>(inner)?)
            }
            RelayBody::Json(JsonValue::Null) => Ok(ConversationRequest::default()),
            RelayBody::Json(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    pub origin: Option<String>,
    pub body: RelayBody,
}

impl RelayRequest {
    pub fn new(method: Method, origin: Option<String>, body: RelayBody) -> Self {
        Self { method, origin, body }
    }
}

#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<ConversationReply>,
}

impl RelayResponse {
    fn new(origin: Option<&str>, status: StatusCode, body: Option<ConversationReply>) -> Self {
        Self { status, headers: cors_headers(origin), body }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn cors_headers(origin: Option<&str>) -> Vec<(&'static str, String)> {
    let origin = origin.map(str::trim).filter(|o| !o.is_empty());
    let mut headers = vec![
        ("Access-Control-Allow-Origin", origin.unwrap_or("*").to_string()),
        ("Access-Control-Allow-Methods", ALLOW_METHODS.to_string()),
        ("Access-Control-Allow-Headers", ALLOW_HEADERS.to_string())
    ];
    if origin.is_some() {
        headers.push(("Vary", "Origin".to_string()));
    }
    headers
}

#[derive(Clone)]
pub struct Relay {
    chat_client: Arc<dyn ChatClient>,
    timeout: Option<Duration>,
}

impl Relay {
    pub fn new(chat_client: Arc<dyn ChatClient>, timeout: Option<Duration>) -> Self {
        Self { chat_client, timeout }
    }

    pub async fn handle(&self, request: RelayRequest) -> RelayResponse {
        let origin = request.origin.as_deref();

        if request.method == Method::OPTIONS {
            return RelayResponse::new(origin, StatusCode::NO_CONTENT, None);
        }

        match self.generate_reply(&request).await {
            Ok(reply) => {
                RelayResponse::new(origin, StatusCode::OK, Some(ConversationReply::reply(reply)))
            }
            Err(e) => {
                match &e {
                    RelayError::MethodNotAllowed(m) => info!("Rejected {} request to relay", m),
                    other => error!("Relay failed: {}", other),
                }
                RelayResponse::new(
                    origin,
                    e.status(),
                    Some(ConversationReply::error(e.public_message()))
                )
            }
        }
    }

    pub async fn generate_reply(&self, request: &RelayRequest) -> Result<String, RelayError> {
        if request.method != Method::POST {
            return Err(RelayError::MethodNotAllowed(request.method.clone()));
        }

        let conversation = request.body.parse()?;
        let prompt = get_relay_prompt(&conversation);
        debug!(
            "Relaying {} message(s) to model={} lang={:?}",
            conversation.messages.len(),
            self.chat_client.get_model(),
            conversation.lang
        );

        let call = self.chat_client.complete(&prompt);
        let result = match self.timeout {
            Some(limit) =>
                tokio::time::timeout(limit, call).await.map_err(|_| RelayError::Timeout(limit))?,
            None => call.await,
        };

        result
            .map(|resp| resp.response)
            .map_err(|e| RelayError::Provider(e.to_string()))
    }
}
