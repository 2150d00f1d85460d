//! Client for the Bitmesh AI proxy (`chat`, `image` and `video` endpoints).
//!
//! Every request is authenticated with OAuth 1.0 HMAC-SHA1 using only the
//! consumer key and secret, and carries an `X-Payload-Signature` header:
//! the hex SHA-256 of the JSON body, the consumer key and the OAuth
//! signature.
//!
//! ```no_run
//! use bitmesh::{BitmeshClient, ImageOptions, JsonObject};
//!
//! let client = BitmeshClient::new("consumer-key", "consumer-secret")?;
//!
//! let reply = client.chat("What are some fun things to do with AI?", None, &JsonObject::new())?;
//! println!("{:?}", reply.get("choices"));
//!
//! let options = ImageOptions {
//!     width: Some(1024),
//!     height: Some(1024),
//!     ..ImageOptions::default()
//! };
//! let image = client.image("A sunset", None, &options, &JsonObject::new())?;
//! println!("{:?}", image.get("data"));
//! # Ok::<(), bitmesh::Error>(())
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod oauth1;
pub mod payload;
pub mod response;
pub mod transport;
pub mod util;

pub use builder::ClientBuilder;
pub use client::BitmeshClient;
pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result, TransportError};
pub use payload::{
    FrameImage, FramePosition, ImageOptions, JsonObject, Message, MessageInput, OutputFormat,
    Payload, PayloadBuilder, VideoOptions,
};
pub use response::ApiResponse;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
