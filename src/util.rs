use std::collections::BTreeMap;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";

/// A request URL together with its path exactly as the caller wrote it.
///
/// `Url` re-encodes characters such as spaces in the path; the signature
/// input needs the path untouched so that nothing is encoded twice.
#[derive(Clone, Debug)]
pub struct RequestUrl {
    url: Url,
    path: String,
}

impl RequestUrl {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Parse a request URL, filling in `http://localhost` when the scheme or the
/// host is missing.
pub fn parse_url(url: &str) -> Result<RequestUrl> {
    let invalid = |source| Error::InvalidUrl {
        url: url.to_string(),
        source,
    };
    let input = url.trim();
    let (parsed, relative) = match Url::parse(input) {
        Ok(parsed) => (parsed, false),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(&format!("{}://{}/", DEFAULT_SCHEME, DEFAULT_HOST))
                .map_err(invalid)?;
            (base.join(input).map_err(invalid)?, true)
        }
        Err(source) => return Err(invalid(source)),
    };
    let path = raw_path(input, relative).unwrap_or_else(|| parsed.path().to_string());
    Ok(RequestUrl { url: parsed, path })
}

// Path component of `input` as written: query and fragment cut off, and for
// an absolute URL the scheme and authority too.
fn raw_path(input: &str, relative: bool) -> Option<String> {
    let end = input.find(|c: char| c == '?' || c == '#').unwrap_or(input.len());
    let without_query = &input[..end];
    let after_scheme = if relative {
        match without_query.strip_prefix("//") {
            Some(authority_and_path) => authority_and_path,
            None => return Some(without_query.to_string()),
        }
    } else {
        &without_query[without_query.find("://")? + 3..]
    };
    let path = after_scheme
        .find('/')
        .map(|start| &after_scheme[start..])
        .unwrap_or("");
    Some(path.to_string())
}

/// Normalized form of the URL used in the signature base string.
///
/// The port is kept only when it is explicit and not the scheme's default;
/// query and fragment are dropped. The path is used as written, with
/// leading slashes collapsed to one.
pub fn normalize_url(url: &RequestUrl) -> String {
    let parsed = url.url();
    let host = parsed.host_str().unwrap_or(DEFAULT_HOST);
    let mut normalized = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }
    normalized.push('/');
    normalized.push_str(url.path().trim_start_matches('/'));
    normalized
}

/// Query parameters, form-decoded. A repeated key keeps its last value.
pub fn query_parameters(url: &RequestUrl) -> BTreeMap<String, String> {
    url.url().query_pairs().into_owned().collect()
}

pub fn url_to_endpoint_and_queries(url: &RequestUrl) -> (String, BTreeMap<String, String>) {
    (normalize_url(url), query_parameters(url))
}
