//! Decoding and validation of the proxied target URL.
//!
//! # Responsibilities
//! - Strictly percent-decode the extracted segment
//! - Accept only absolute `http://` / `https://` URLs
//! - Keep the decoded text verbatim alongside the parsed URL
//!
//! # Design Decisions
//! - Any `%` not followed by two hex digits is a decode error, as is
//!   non-UTF-8 output; `+` is left alone
//! - Scheme check is a case-sensitive prefix test on the decoded text
//! - No normalization, DNS checks or address filtering here

use std::fmt;

use url::Url;

use crate::error::{ProxyError, Result};

/// A validated absolute `http(s)` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    raw: String,
    url: Url,
}

impl TargetUrl {
    /// Validate an already-decoded target string.
    pub fn parse(decoded: &str) -> Result<Self> {
        if decoded.is_empty() {
            return Err(ProxyError::invalid_target("target is empty"));
        }
        if !(decoded.starts_with("http://") || decoded.starts_with("https://")) {
            return Err(ProxyError::invalid_target("scheme must be http or https"));
        }
        let url = Url::parse(decoded).map_err(|e| ProxyError::invalid_target(e.to_string()))?;
        if url.host_str().is_none() {
            return Err(ProxyError::invalid_target("target has no host"));
        }
        Ok(Self {
            raw: decoded.to_string(),
            url,
        })
    }

    /// Decode an extracted segment and validate the result.
    pub fn from_encoded(segment: &str) -> Result<Self> {
        let decoded = decode_segment(segment)?;
        Self::parse(&decoded)
    }

    /// The decoded target exactly as the caller supplied it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form used for the outbound fetch.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Percent-decode with `decodeURIComponent` strictness.
pub fn decode_segment(segment: &str) -> Result<String> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return Err(ProxyError::Decode);
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ProxyError::Decode)
}
