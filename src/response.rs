//! Turning `(status, body)` into a decoded object or a typed error.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::payload::JsonObject;

const SUCCESS_STATUS: u16 = 200;

/// A successful (HTTP 200) response. The body is always a JSON object: a
/// non-object reply is wrapped as `{"data": <value>}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    status: u16,
    body: JsonObject,
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &JsonObject {
        &self.body
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn into_body(self) -> JsonObject {
        self.body
    }

    /// Deserialize the body into a caller-defined type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.body.clone())).map_err(|source| {
            Error::ResponseDecode {
                raw_body: Value::Object(self.body.clone()).to_string(),
                source,
            }
        })
    }
}

/// Decode a raw response.
///
/// Malformed JSON fails first, whatever the status; then any status other
/// than 200 becomes [`Error::Api`], carrying the body's `error` field when
/// there is one.
pub fn decode(status: u16, body: &[u8]) -> Result<ApiResponse> {
    let decoded: Value = serde_json::from_slice(body).map_err(|source| Error::ResponseDecode {
        raw_body: String::from_utf8_lossy(body).into_owned(),
        source,
    })?;

    if status != SUCCESS_STATUS {
        let error = match &decoded {
            Value::Object(map) => map.get("error").filter(|e| !e.is_null()).cloned(),
            _ => None,
        };
        let mut message = format!("Bitmesh API returned HTTP {}", status);
        if let Some(error) = &error {
            message.push_str(" - ");
            message.push_str(&error.to_string());
        }
        warn!("{}", message);
        return Err(Error::Api {
            status,
            message,
            error,
        });
    }

    let body = match decoded {
        Value::Object(map) => map,
        other => {
            let mut wrapped = JsonObject::new();
            wrapped.insert("data".to_string(), other);
            wrapped
        }
    };
    Ok(ApiResponse { status, body })
}
