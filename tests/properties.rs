//! Property tests for signing, URL normalization and the payload signature.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use bitmesh::oauth1::{payload_signature, percent_decode, percent_encode, Signer};
use bitmesh::util::{normalize_url, parse_url};
use bitmesh::{
    BitmeshClient, HttpRequest, HttpResponse, HttpTransport, ImageOptions, JsonObject,
    TransportError,
};

/// Answers `{}` to everything and keeps the last request.
#[derive(Clone, Default)]
struct Recorder {
    last: Arc<Mutex<Option<HttpRequest>>>,
}

impl Recorder {
    fn last(&self) -> HttpRequest {
        self.last.lock().unwrap().clone().expect("no request was sent")
    }
}

impl HttpTransport for Recorder {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(HttpResponse {
            status: 200,
            body: b"{}".to_vec(),
        })
    }
}

fn oauth_signature(header: &str) -> String {
    let marker = "oauth_signature=\"";
    let start = header.find(marker).unwrap() + marker.len();
    let end = start + header[start..].find('"').unwrap();
    percent_decode(&header[start..end]).into_owned()
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~".contains(c)
}

#[test]
fn space_and_tilde() {
    assert_eq!(percent_encode(" "), "%20");
    assert_eq!(percent_encode("~"), "~");
}

proptest! {
    #[test]
    fn port_kept_only_when_explicit_and_not_default(
        https in any::<bool>(),
        host in "[a-z]{1,12}\\.(com|ai|net)",
        port in proptest::option::of(1u16..=u16::MAX),
        path in "(/[a-z0-9]{1,8}){0,3}",
    ) {
        let scheme = if https { "https" } else { "http" };
        let default_port = if https { 443 } else { 80 };
        let url = match port {
            Some(port) => format!("{}://{}:{}{}", scheme, host, port, path),
            None => format!("{}://{}{}", scheme, host, path),
        };
        let normalized = normalize_url(&parse_url(&url).unwrap());
        let authority = normalized
            .trim_start_matches(&format!("{}://", scheme))
            .split('/')
            .next()
            .unwrap()
            .to_string();
        match port {
            Some(port) if port != default_port => {
                prop_assert_eq!(authority, format!("{}:{}", host, port));
            }
            _ => {
                prop_assert_eq!(authority, host.clone());
            }
        }
    }

    #[test]
    fn fixed_nonce_and_timestamp_sign_identically(
        key in "\\PC{0,20}",
        secret in "\\PC{0,20}",
        path in "[a-zA-Z0-9/ ~._-]{0,20}",
        query in "[a-z]{1,5}=[a-zA-Z0-9 ]{0,8}",
        timestamp in 0i64..4_000_000_000,
    ) {
        let url = format!("https://api.bitmesh.ai/{}?{}", path, query);
        let sign = || {
            Signer::new(key.as_str(), url.as_str(), "POST")
                .nonce("00112233aabbccdd")
                .timestamp(timestamp)
                .sign(&secret)
                .unwrap()
        };
        let (a, b) = (sign(), sign());
        prop_assert_eq!(a.signature(), b.signature());
        prop_assert_eq!(a.authorization_header(), b.authorization_header());
    }

    #[test]
    fn percent_encoding_round_trips(input in any::<String>()) {
        let encoded = percent_encode(&input);
        prop_assert!(encoded.chars().all(|c| is_unreserved(c) || c == '%' || c.is_ascii_hexdigit()));
        prop_assert!(!encoded.contains('+'));
        prop_assert_eq!(percent_decode(&encoded), input.as_str());
    }

    #[test]
    fn payload_signature_matches_header(
        prompt in "\\PC{1,60}",
        width in 1u32..4096,
        seed in any::<i64>(),
    ) {
        let recorder = Recorder::default();
        let client = BitmeshClient::builder("prop-key", "prop-secret")
            .base_url("https://api.bitmesh.ai")
            .transport(recorder.clone())
            .build()
            .unwrap();
        let options = ImageOptions {
            width: Some(width),
            seed: Some(seed),
            ..ImageOptions::default()
        };
        client.image(&prompt, None, &options, &JsonObject::new()).unwrap();

        let request = recorder.last();
        let body = request.body.clone().unwrap();
        let auth = request.header("Authorization").unwrap();
        let expected = payload_signature(&body, "prop-key", &oauth_signature(auth));
        prop_assert_eq!(request.header("X-Payload-Signature"), Some(expected.as_str()));

        let decoded: serde_json::Value = serde_json::from_slice(&body).unwrap();
        prop_assert_eq!(decoded["prompt"].as_str(), Some(prompt.as_str()));
    }
}
