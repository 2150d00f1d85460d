use crate::error::Result;
use crate::oauth1::values::*;
use crate::util;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::trace;
use rand::RngExt;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

const NONCE_BYTES: usize = 8;

/// OAuth protocol parameters of one request, sorted by key.
///
/// Includes `oauth_signature` once signing is done.
pub type OAuthParameters = BTreeMap<String, String>;

/// Result of signing one request. Built fresh per call and never reused.
#[derive(Clone, Debug)]
pub struct SignedContent {
    signature: String,
    parameters: OAuthParameters,
}

impl SignedContent {
    /// The base64 HMAC-SHA1 signature (not percent-encoded).
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn nonce(&self) -> &str {
        self.parameters
            .get(OAUTH_PARAM_KEY_NONCE)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn timestamp(&self) -> &str {
        self.parameters
            .get(OAUTH_PARAM_KEY_TIMESTAMP)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn parameters(&self) -> &OAuthParameters {
        &self.parameters
    }

    pub fn into_parameters(self) -> OAuthParameters {
        self.parameters
    }

    /// `Authorization` header value: every `oauth_*` parameter in key order,
    /// values percent-encoded and quoted.
    pub fn authorization_header(&self) -> String {
        let fields = self
            .parameters
            .iter()
            .filter(|(k, _)| k.starts_with(OAUTH_PARAM_PREFIX))
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<String>>()
            .join(", ");
        format!("{} {}", OAUTH_HEADER, fields)
    }

    /// `X-Payload-Signature` value for `body`, see [`payload_signature`].
    pub fn payload_signature(&self, body: &[u8], consumer_key: &str) -> String {
        payload_signature(body, consumer_key, &self.signature)
    }
}

/// OAuth 1.0 request signer for the one-legged flow (consumer credentials only).
pub struct Signer<'a> {
    consumer_key: Cow<'a, str>,
    endpoint: Cow<'a, str>,
    http_method: Cow<'a, str>,
    nonce: Option<Cow<'a, str>>,
    signature_method: SignatureMethod,
    timestamp: Option<i64>,
    version: OAuthVersion,
}

impl<'a> Signer<'a> {
    pub fn new<TConsumerKey, TEndpoint, THttpMethod>(
        consumer_key: TConsumerKey,
        endpoint: TEndpoint,
        http_method: THttpMethod,
    ) -> Self
    where
        TConsumerKey: Into<Cow<'a, str>>,
        TEndpoint: Into<Cow<'a, str>>,
        THttpMethod: Into<Cow<'a, str>>,
    {
        Signer {
            consumer_key: consumer_key.into(),
            endpoint: endpoint.into(),
            http_method: http_method.into(),
            nonce: None,
            signature_method: SignatureMethod::HmacSha1,
            timestamp: None,
            version: OAuthVersion::Default,
        }
    }

    /// Fix the nonce instead of generating one. Meant for reproducible tests.
    pub fn nonce<T: Into<Cow<'a, str>>>(mut self, nonce: T) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Fix the timestamp (Unix seconds) instead of reading the clock.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn version(mut self, version: OAuthVersion) -> Self {
        self.version = version;
        self
    }

    pub fn sign(self, consumer_secret: &str) -> Result<SignedContent> {
        let timestamp = self.timestamp.unwrap_or_else(|| Utc::now().timestamp());
        let nonce = self
            .nonce
            .unwrap_or_else(|| Cow::Owned(generate_nonce()));

        let mut parameters = build_basic_params(
            &self.consumer_key,
            self.signature_method,
            &nonce,
            timestamp,
            self.version.into(),
        );
        let base_str = signature_base_string(&self.http_method, &self.endpoint, &parameters)?;
        trace!("signature base string: {}", base_str);

        let signature = match self.signature_method {
            SignatureMethod::HmacSha1 => generate_signature_hmacsha1(consumer_secret, &base_str),
        };
        parameters.insert(OAUTH_PARAM_KEY_SIGNATURE.to_string(), signature.clone());
        Ok(SignedContent {
            signature,
            parameters,
        })
    }
}

/// Sign `method url` with fresh nonce and timestamp.
pub fn sign(
    http_method: &str,
    url: &str,
    consumer_key: &str,
    consumer_secret: &str,
) -> Result<SignedContent> {
    Signer::new(consumer_key, url, http_method).sign(consumer_secret)
}

/// 8 bytes from the thread-local CSPRNG, hex-encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// `UPPER(method)&enc(normalized url)&enc(parameter string)`.
///
/// Query parameters of `url` are merged over `oauth_params`; on a key
/// collision the query value wins. `oauth_signature` is never part of the
/// input.
pub fn signature_base_string(
    http_method: &str,
    url: &str,
    oauth_params: &OAuthParameters,
) -> Result<String> {
    let url = util::parse_url(url)?;
    let (endpoint, query) = util::url_to_endpoint_and_queries(&url);

    let mut params = oauth_params.clone();
    params.extend(query);
    params.remove(OAUTH_PARAM_KEY_SIGNATURE);

    let param_str = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<String>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        percent_encode(&http_method.to_ascii_uppercase()),
        percent_encode(&endpoint),
        percent_encode(&param_str)
    ))
}

/// Hex SHA-256 over `body ++ consumer_key ++ oauth_signature`.
pub fn payload_signature(body: &[u8], consumer_key: &str, oauth_signature: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hasher.update(consumer_key.as_bytes());
    hasher.update(oauth_signature.as_bytes());
    hex::encode(hasher.finalize())
}

fn build_basic_params(
    consumer_key: &str,
    signature_method: SignatureMethod,
    nonce: &str,
    timestamp: i64,
    version: Option<&str>,
) -> OAuthParameters {
    let method: &'static str = signature_method.into();
    let params = vec![
        (OAUTH_PARAM_KEY_CONSUMER_KEY, Some(Cow::Borrowed(consumer_key))),
        (OAUTH_PARAM_KEY_SIGNATURE_METHOD, Some(Cow::Borrowed(method))),
        (
            OAUTH_PARAM_KEY_TIMESTAMP,
            Some(Cow::Owned(timestamp.to_string())),
        ),
        (OAUTH_PARAM_KEY_NONCE, Some(Cow::Borrowed(nonce))),
        (OAUTH_PARAM_KEY_VERSION, version.map(Cow::Borrowed)),
    ];

    params
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.into_owned())))
        .collect()
}

fn generate_signature_hmacsha1(consumer_secret: &str, base_str: &str) -> String {
    // one-legged flow: the token secret half of the key is empty
    let sign_key = format!("{}&", percent_encode(consumer_secret));

    let mut mac = HmacSha1::new_from_slice(sign_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base_str.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rfc5849() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        // the callback rides in the query so it joins the signed parameters
        let url = "https://photos.example.net/initiate?oauth_callback=http%3A%2F%2Fprinter.example.com%2Fready";
        let sign = Signer::new("dpf43f3p2l4k3l03", url, "post")
            .nonce("wIjqoS")
            .timestamp(137_131_200)
            .version(OAuthVersion::None)
            .sign("kd94hf93k423kf44")
            .unwrap();
        assert_eq!(sign.signature(), "74KNZJeDHnMBp0EMJ9ZHt/XKycU=");
    }

    #[test]
    fn base_string_layout() {
        let mut params = OAuthParameters::new();
        params.insert("oauth_consumer_key".into(), "ck".into());
        params.insert("oauth_nonce".into(), "0011223344556677".into());
        params.insert("oauth_signature".into(), "ignored".into());
        let base = signature_base_string(
            "post",
            "https://API.example.com:443/a b?z=x y&a=~",
            &params,
        )
        .unwrap();
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.example.com%2Fa%20b&a%3D~%26oauth_consumer_key%3Dck%26oauth_nonce%3D0011223344556677%26z%3Dx%2520y"
        );
    }

    #[test]
    fn path_characters_are_encoded_once() {
        let params = OAuthParameters::new();
        let base = signature_base_string("GET", "https://h.com/a b", &params).unwrap();
        assert_eq!(base, "GET&https%3A%2F%2Fh.com%2Fa%20b&");
        let base = signature_base_string("GET", "https://h.com/caf\u{e9}", &params).unwrap();
        assert_eq!(base, "GET&https%3A%2F%2Fh.com%2Fcaf%C3%A9&");
        let base = signature_base_string("GET", "https://h.com/video/a%2Fb", &params).unwrap();
        assert_eq!(base, "GET&https%3A%2F%2Fh.com%2Fvideo%2Fa%252Fb&");
    }

    #[test]
    fn query_parameter_overrides_oauth_parameter() {
        let mut params = OAuthParameters::new();
        params.insert("oauth_version".into(), "1.0".into());
        let base = signature_base_string("GET", "http://h/p?oauth_version=2.0", &params).unwrap();
        assert_eq!(base, "GET&http%3A%2F%2Fh%2Fp&oauth_version%3D2.0");
    }

    #[test]
    fn fixed_inputs_sign_identically() {
        let sign = || {
            Signer::new("key", "https://api.bitmesh.ai/chat", "POST")
                .nonce("a1b2c3d4e5f60718")
                .timestamp(1_700_000_000)
                .sign("secret")
                .unwrap()
        };
        let (a, b) = (sign(), sign());
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.authorization_header(), b.authorization_header());
    }

    #[test]
    fn signature_depends_on_method() {
        let sign = |method: &str| {
            Signer::new("key", "https://api.bitmesh.ai/video/1", method)
                .nonce("n")
                .timestamp(1)
                .sign("secret")
                .unwrap()
                .signature()
                .to_string()
        };
        assert_ne!(sign("GET"), sign("POST"));
        assert_eq!(sign("get"), sign("GET"));
    }

    #[test]
    fn authorization_header_is_sorted_and_quoted() {
        let signed = Signer::new("my key", "https://api.bitmesh.ai/chat", "POST")
            .nonce("0123456789abcdef")
            .timestamp(1_700_000_000)
            .sign("secret")
            .unwrap();
        let header = signed.authorization_header();
        let expected = format!(
            "OAuth oauth_consumer_key=\"my%20key\", oauth_nonce=\"0123456789abcdef\", oauth_signature=\"{}\", oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1700000000\", oauth_version=\"1.0\"",
            percent_encode(signed.signature())
        );
        assert_eq!(header, expected);
        assert_eq!(signed.nonce(), "0123456789abcdef");
        assert_eq!(signed.timestamp(), "1700000000");
    }

    #[test]
    fn fresh_parameters_per_call() {
        let a = sign("POST", "https://api.bitmesh.ai/chat", "k", "s").unwrap();
        let b = sign("POST", "https://api.bitmesh.ai/chat", "k", "s").unwrap();
        assert_eq!(a.nonce().len(), 16);
        assert!(a.nonce().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.nonce(), b.nonce());
        assert!(a.timestamp().parse::<i64>().unwrap() > 1_600_000_000);
        assert_eq!(a.parameters().len(), 6);
    }

    #[test]
    fn payload_signature_is_hex_sha256() {
        // sha256("abc")
        assert_eq!(
            payload_signature(b"a", "b", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(payload_signature(b"", "", "").len(), 64);
    }
}
