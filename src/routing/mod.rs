//! Routing subsystem: from inbound URI to proxied target.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, raw query)
//!     → extractor.rs (find the encoded target segment)
//!         → None: caller serves the fallback page
//!     → append raw query, if any
//!     → target.rs (strict percent-decode, scheme validation)
//!     → Return: TargetUrl or ProxyError
//! ```
//!
//! # Design Decisions
//! - Extractor chosen once at startup, immutable at runtime
//! - "No target" is not an error; it is the absence of a segment
//! - Deterministic: same URI always yields the same target

pub mod extractor;
pub mod target;

use axum::http::Uri;

pub use extractor::{from_config, BarePath, PathExtractor, PrefixMarker};
pub use target::{decode_segment, TargetUrl};

use crate::error::Result;

/// Resolve the target of an inbound URI.
///
/// `Ok(None)` means the path carries no target slot at all.
pub fn resolve_target(extractor: &dyn PathExtractor, uri: &Uri) -> Result<Option<TargetUrl>> {
    let Some(segment) = extractor.extract(uri.path()) else {
        return Ok(None);
    };

    let target = match uri.query() {
        Some(query) if !segment.is_empty() => TargetUrl::from_encoded(&format!("{}?{}", segment, query))?,
        _ => TargetUrl::from_encoded(segment)?,
    };
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_prefix_target() {
        let extractor = PrefixMarker::new("proxx");
        let target = resolve_target(&extractor, &uri("/proxx/https%3A%2F%2Fexample.com%2Fpath%3Fq%3D1"))
            .unwrap()
            .unwrap();
        assert_eq!(target.as_str(), "https://example.com/path?q=1");
    }

    #[test]
    fn test_resolve_keeps_raw_query() {
        let extractor = PrefixMarker::new("proxx");
        let target = resolve_target(&extractor, &uri("/proxx/https://example.com/search?q=rust&page=2"))
            .unwrap()
            .unwrap();
        assert_eq!(target.as_str(), "https://example.com/search?q=rust&page=2");
    }

    #[test]
    fn test_resolve_no_target() {
        let extractor = PrefixMarker::new("proxx");
        assert!(resolve_target(&extractor, &uri("/")).unwrap().is_none());
        assert!(resolve_target(&extractor, &uri("/about?x=1")).unwrap().is_none());

        assert!(resolve_target(&BarePath, &uri("/")).unwrap().is_none());
        assert!(resolve_target(&BarePath, &uri("/?utm=1")).unwrap().is_none());
    }

    #[test]
    fn test_resolve_empty_target_is_invalid() {
        let extractor = PrefixMarker::new("proxx");
        let err = resolve_target(&extractor, &uri("/proxx/?q=1")).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidTarget { .. }));
    }

    #[test]
    fn test_resolve_bare_errors() {
        assert!(matches!(
            resolve_target(&BarePath, &uri("/%zz")),
            Err(ProxyError::Decode)
        ));
        assert!(matches!(
            resolve_target(&BarePath, &uri("/ftp%3A%2F%2Fexample.com")),
            Err(ProxyError::InvalidTarget { .. })
        ));
    }
}
