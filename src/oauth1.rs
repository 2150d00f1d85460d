//! OAuth 1.0 HMAC-SHA1 request signing (RFC 5849), one-legged flow.
//!
//! Only the consumer key and secret take part: there is no token and the
//! token-secret half of the signing key is empty. Next to the OAuth signature
//! each request carries a payload-integrity signature, see
//! [`payload_signature`].
//!
//! ```
//! use bitmesh::oauth1::Signer;
//!
//! let signed = Signer::new("consumer-key", "https://api.bitmesh.ai/chat", "POST")
//!     .sign("consumer-secret")
//!     .unwrap();
//! assert!(signed.authorization_header().starts_with("OAuth "));
//! ```

mod signer;
mod values;

pub use signer::*;
pub use values::{
    percent_decode, percent_encode, OAuthVersion, SignatureMethod, OAUTH_VALUE_SIGMETHOD_HMACSHA1,
    OAUTH_VALUE_VERSION,
};
