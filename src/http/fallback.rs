//! Informational page for requests that carry no target.

use axum::http::{header, Request};
use axum::response::{Html, IntoResponse, Response};

use crate::routing::PathExtractor;

/// Host the client addressed, from `Host` or the URI authority (HTTP/2).
pub fn request_host<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .filter(|h| !h.is_empty())
}

/// Render the fallback page. Always 200.
pub fn render(extractor: &dyn PathExtractor, host: Option<&str>) -> Response {
    Html(page(extractor, host)).into_response()
}

fn page(extractor: &dyn PathExtractor, host: Option<&str>) -> String {
    let (usage, home) = match (extractor.marker(), host) {
        (Some(marker), Some(host)) => {
            let host = escape_html(host);
            let marker = escape_html(marker);
            (
                format!("https://{host}/{marker}/&lt;percent-encoded-url&gt;"),
                format!(r#"<p><a href="https://{host}/">Return home</a></p>"#),
            )
        }
        (Some(marker), None) => (
            format!("/{}/&lt;percent-encoded-url&gt;", escape_html(marker)),
            String::new(),
        ),
        (None, _) => (
            "/&lt;percent-encoded-url&gt;".to_string(),
            "<p>Open this proxy from the application that linked you here.</p>".to_string(),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Proxy</title>
</head>
<body>
<h1>No target URL</h1>
<p>This proxy forwards requests to the URL encoded in the request path.</p>
<p>Usage: <code>{usage}</code></p>
<p>Example: <code>https%3A%2F%2Fexample.com%2Fpath%3Fq%3D1</code></p>
{home}
</body>
</html>
"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
