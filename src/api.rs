//! HTTP client for the chat backend API.
//!
//! Three calls: image upload (multipart), chat submission (JSON), and the
//! one-shot history fetch. Any non-success status or undecodable body is
//! an error; the caller decides whether that is alert-worthy or silent.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::conversation::Sender;
use crate::error::{ClientError, Result};

/// Chat submission request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Composed message text (may be empty when an image is attached).
    pub message: String,
    /// Session correlation key, as supplied by the host.
    pub session_id: String,
    /// Pending uploaded image, if any.
    pub image_filename: Option<String>,
    /// Selected response language.
    pub language: String,
}

/// Chat response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// Assistant reply text.
    pub response: String,
    /// Spoken rendition of the reply, if the backend produced one.
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Upload response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    /// Filename the backend stored the image under.
    pub image_filename: String,
}

/// One record in the stored history for a session.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    /// Message author.
    pub sender: Sender,
    /// Message text.
    pub text: String,
    /// Image attached to this record, if any.
    #[serde(default)]
    pub image_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    messages: Vec<HistoryMessage>,
}

/// Client for the chat backend HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    uploads_prefix: String,
}

impl ApiClient {
    /// Create a client for the configured backend.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            uploads_prefix: config.uploads_prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Upload an image as a multipart form; returns the stored filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend replies with a
    /// non-success status, or the body cannot be decoded.
    pub async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<ImageUpload> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new().part("image", part);
        let url = format!("{}/api/upload_image", self.base_url);
        debug!("uploading image: {filename}");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        decode_json(response).await
    }

    /// Submit a chat message and wait for the assistant reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend replies with a
    /// non-success status, or the body cannot be decoded.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("submitting chat message for session {}", request.session_id);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode_json(response).await
    }

    /// Fetch the stored message list for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend replies with a
    /// non-success status, or the body cannot be decoded.
    pub async fn chat_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>> {
        let url = format!(
            "{}/api/chat_history/{}",
            self.base_url,
            urlencoding::encode(session_id)
        );
        debug!("fetching chat history for session {session_id}");

        let response = self.http.get(&url).send().await.map_err(transport)?;
        let envelope: HistoryEnvelope = decode_json(response).await?;
        Ok(envelope.messages)
    }

    /// Static path where an uploaded image is retrievable.
    #[must_use]
    pub fn upload_src(&self, image_filename: &str) -> String {
        format!("{}/{image_filename}", self.uploads_prefix)
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
