//! Target segment extraction from the request path.
//!
//! # Responsibilities
//! - Locate the still-encoded target inside the inbound path
//! - Report "no target" distinctly from "empty target"
//!
//! # Design Decisions
//! - One trait, two strategies; the deployment picks one at startup
//! - Extraction never decodes; that is target.rs's job
//! - Marker lookup is a plain substring scan, first occurrence wins

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::{ExtractionConfig, ExtractionMode};

/// Strategy for recovering the encoded target from a request path.
pub trait PathExtractor: Send + Sync + Debug {
    /// Returns the encoded target segment, or `None` when the path carries
    /// no target at all. `Some("")` means a target slot exists but is empty.
    fn extract<'a>(&self, path: &'a str) -> Option<&'a str>;

    /// Which deployment mode this extractor implements.
    fn mode(&self) -> ExtractionMode;

    /// Routing marker, if the mode has one.
    fn marker(&self) -> Option<&str> {
        None
    }
}

/// Extracts everything after `/<marker>/`.
#[derive(Debug, Clone)]
pub struct PrefixMarker {
    marker: String,
    /// `/<marker>/`
    segment: String,
    /// `/<marker>`, for paths that stop right at the marker.
    tail: String,
}

impl PrefixMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        let marker = marker.trim_matches('/').to_string();
        Self {
            segment: format!("/{}/", marker),
            tail: format!("/{}", marker),
            marker,
        }
    }
}

impl PathExtractor for PrefixMarker {
    fn extract<'a>(&self, path: &'a str) -> Option<&'a str> {
        if let Some(idx) = path.find(&self.segment) {
            return Some(&path[idx + self.segment.len()..]);
        }
        if path.ends_with(&self.tail) {
            return Some("");
        }
        None
    }

    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Prefix
    }

    fn marker(&self) -> Option<&str> {
        Some(&self.marker)
    }
}

/// Treats the whole path after the leading `/` as the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarePath;

impl PathExtractor for BarePath {
    fn extract<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix('/').unwrap_or(path);
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Bare
    }
}

/// Build the extractor a deployment is configured for.
pub fn from_config(config: &ExtractionConfig) -> Arc<dyn PathExtractor> {
    match config.mode {
        ExtractionMode::Prefix => Arc::new(PrefixMarker::new(config.marker.clone())),
        ExtractionMode::Bare => Arc::new(BarePath),
    }
}
