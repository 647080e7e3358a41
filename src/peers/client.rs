//! Peer Client Module
//!
//! Fetches values from a remote node over the peer protocol.

use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::PeerGetter;

/// Everything except unreserved characters is escaped in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// == Escaping ==
/// Percent-encodes one path segment of a peer request.
pub fn escape_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Decodes one percent-encoded path segment.
pub fn unescape_segment(segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|err| CacheError::BadRequest(format!("invalid path segment {segment}: {err}")))
}

// == HTTP Getter ==
/// Client for one remote peer, addressed by `<peer address><base path>`.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    // == Constructor ==
    /// Creates a getter for `base_url`, which must end with the base path.
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Builds the request URL for a group and key.
    pub fn url_for(&self, group: &str, key: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            escape_segment(group),
            escape_segment(key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key);
        debug!(url = %url, "requesting value from peer");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| CacheError::PeerTransport(err.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CacheError::PeerTransport(format!(
                "server returned: {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| CacheError::PeerTransport(format!("read response body: {err}")))?;

        Ok(body.to_vec())
    }

    fn addr(&self) -> &str {
        &self.base_url
    }
}
