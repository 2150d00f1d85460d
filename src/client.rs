//! [`BitmeshClient`]: one synchronous, stateless call per method.
//!
//! Each call runs payload building, signing, the transport and response
//! decoding in that order. Nothing is shared between calls except the
//! immutable credentials and settings, so a client can be used from several
//! threads at once. Failed calls are never retried.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::builder::ClientBuilder;
use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};
use crate::oauth1::{percent_encode, Signer};
use crate::payload::{
    chat_payload, image_payload, video_payload, ImageOptions, JsonObject, MessageInput, Payload,
    VideoOptions,
};
use crate::response::{self, ApiResponse};
use crate::transport::{HttpRequest, HttpTransport, Method};

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_USER_AGENT: &str = "User-Agent";
pub const HEADER_PAYLOAD_SIGNATURE: &str = "X-Payload-Signature";

const APPLICATION_JSON: &str = "application/json";

pub struct BitmeshClient {
    credentials: Credentials,
    base_url: String,
    user_agent: String,
    transport: Arc<dyn HttpTransport>,
}

impl BitmeshClient {
    /// Client for the production API using the default `reqwest` transport.
    #[cfg(feature = "reqwest")]
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(consumer_key, consumer_secret))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(ClientConfig::new(consumer_key, consumer_secret))
    }

    pub(crate) fn from_parts(
        credentials: Credentials,
        base_url: String,
        user_agent: String,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        BitmeshClient {
            credentials,
            base_url,
            user_agent,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn consumer_key(&self) -> &str {
        self.credentials.consumer_key()
    }

    /// `POST /chat`.
    ///
    /// `messages` is either a bare prompt, sent as one `user` message, or a
    /// full conversation. `model` is only sent when given; some keys are
    /// bound to a fixed model and reject an explicit one.
    pub fn chat<M: Into<MessageInput>>(
        &self,
        messages: M,
        model: Option<&str>,
        extra: &JsonObject,
    ) -> Result<ApiResponse> {
        let payload = chat_payload(messages.into(), model, extra)?;
        self.post("chat", payload)
    }

    /// `POST /image`.
    pub fn image(
        &self,
        prompt: &str,
        model: Option<&str>,
        options: &ImageOptions,
        extra: &JsonObject,
    ) -> Result<ApiResponse> {
        let payload = image_payload(prompt, model, options, extra)?;
        self.post("image", payload)
    }

    /// `POST /video`. Starts a generation job; poll it with
    /// [`video_status`](Self::video_status).
    pub fn video(
        &self,
        prompt: &str,
        model: Option<&str>,
        options: &VideoOptions,
        extra: &JsonObject,
    ) -> Result<ApiResponse> {
        let payload = video_payload(prompt, model, options, extra)?;
        self.post("video", payload)
    }

    /// `GET /video/{id}`, with `id` percent-encoded as one path segment.
    pub fn video_status(&self, id: &str) -> Result<ApiResponse> {
        let url = format!("{}/video/{}", self.base_url, percent_encode(id));
        self.send(Method::Get, url, None)
    }

    fn post(&self, endpoint: &str, payload: Payload) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        self.send(Method::Post, url, Some(payload))
    }

    fn send(&self, method: Method, url: String, payload: Option<Payload>) -> Result<ApiResponse> {
        let request = self.signed_request(method, url, payload)?;
        debug!("{} {}", request.method, request.url);
        let response = self.transport.send(&request).map_err(Error::Transport)?;
        debug!("{} {} -> HTTP {}", request.method, request.url, response.status);
        response::decode(response.status, &response.body)
    }

    /// Sign and assemble a request. The payload signature covers exactly the
    /// bytes that go on the wire (empty for GET).
    fn signed_request(
        &self,
        method: Method,
        url: String,
        payload: Option<Payload>,
    ) -> Result<HttpRequest> {
        let signed = Signer::new(self.credentials.consumer_key(), url.as_str(), method.as_str())
            .sign(self.credentials.consumer_secret())?;
        let body = payload.map(Payload::into_bytes);
        let payload_signature = signed.payload_signature(
            body.as_deref().unwrap_or_default(),
            self.credentials.consumer_key(),
        );

        let mut headers = vec![
            (HEADER_AUTHORIZATION, signed.authorization_header()),
            (HEADER_ACCEPT, APPLICATION_JSON.to_string()),
        ];
        if body.is_some() {
            headers.push((HEADER_CONTENT_TYPE, APPLICATION_JSON.to_string()));
        }
        headers.push((HEADER_USER_AGENT, self.user_agent.clone()));
        headers.push((HEADER_PAYLOAD_SIGNATURE, payload_signature));

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

impl fmt::Debug for BitmeshClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmeshClient")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
