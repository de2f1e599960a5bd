//! Outbound host filtering.
//!
//! # Responsibilities
//! - Enforce the configured host allow-list
//! - Optionally refuse loopback, private and link-local destinations
//!
//! # Design Decisions
//! - Disabled unless configured; an empty allow-list admits every host
//! - Only literal IPs and `localhost` are classified; no DNS lookups, so a
//!   public name resolving to a private address is not caught here
//! - Host comparison is case-insensitive

use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

use crate::config::SecurityConfig;
use crate::error::{ProxyError, Result};
use crate::routing::TargetUrl;

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostPattern {
    Exact(String),
    /// `*.example.com` stored as `example.com`; matches subdomains only.
    Suffix(String),
}

impl HostPattern {
    fn parse(entry: &str) -> Self {
        let entry = entry.trim().to_ascii_lowercase();
        match entry.strip_prefix("*.") {
            Some(domain) => HostPattern::Suffix(domain.to_string()),
            None => HostPattern::Exact(entry),
        }
    }

    fn matches(&self, host: &str) -> bool {
        match self {
            HostPattern::Exact(expected) => host == expected,
            HostPattern::Suffix(domain) => host
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.')),
        }
    }
}

/// Decides whether a target may be fetched.
#[derive(Debug, Clone, Default)]
pub struct EgressFilter {
    allowed: Vec<HostPattern>,
    block_private: bool,
}

impl EgressFilter {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            allowed: config.allowed_hosts.iter().map(|h| HostPattern::parse(h)).collect(),
            block_private: config.block_private_addresses,
        }
    }

    /// A filter that admits everything.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.block_private || !self.allowed.is_empty()
    }

    /// Check a target against the filter.
    pub fn check(&self, target: &TargetUrl) -> Result<()> {
        self.check_url(target.url())
    }

    /// Check any outbound URL, including redirect hops, against the filter.
    pub fn check_url(&self, url: &Url) -> Result<()> {
        let Some(host) = url.host() else {
            return Err(ProxyError::invalid_target("target has no host"));
        };

        if self.block_private && is_private_host(&host) {
            return Err(denied(url));
        }

        if !self.allowed.is_empty() {
            let name = url
                .host_str()
                .unwrap_or_default()
                .trim_matches(['[', ']'])
                .to_ascii_lowercase();
            if !self.allowed.iter().any(|pattern| pattern.matches(&name)) {
                return Err(denied(url));
            }
        }

        Ok(())
    }
}

fn denied(url: &Url) -> ProxyError {
    ProxyError::TargetDenied {
        host: url.host_str().unwrap_or_default().to_string(),
    }
}

fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_v4(ip),
        Host::Ipv6(ip) => is_private_v6(ip),
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 carrier-grade NAT
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64)
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(&mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> TargetUrl {
        TargetUrl::parse(url).unwrap()
    }

    fn filter(allowed: &[&str], block_private: bool) -> EgressFilter {
        EgressFilter::new(&SecurityConfig {
            allowed_hosts: allowed.iter().map(|s| s.to_string()).collect(),
            block_private_addresses: block_private,
        })
    }

    #[test]
    fn test_allow_all() {
        let filter = EgressFilter::allow_all();
        assert!(!filter.is_enabled());
        assert!(filter.check(&target("http://127.0.0.1:1/")).is_ok());
        assert!(filter.check(&target("https://anything.example")).is_ok());
    }

    #[test]
    fn test_allow_list() {
        let filter = filter(&["example.com", "*.Trusted.org"], false);
        assert!(filter.check(&target("https://example.com/a")).is_ok());
        assert!(filter.check(&target("https://EXAMPLE.com/a")).is_ok());
        assert!(filter.check(&target("https://api.trusted.org")).is_ok());
        assert!(filter.check(&target("https://a.b.trusted.org")).is_ok());

        assert!(filter.check(&target("https://trusted.org")).is_err());
        assert!(filter.check(&target("https://eviltrusted.org")).is_err());
        assert!(filter.check(&target("https://sub.example.com")).is_err());

        let err = filter.check(&target("https://other.net/x")).unwrap_err();
        assert_eq!(err.to_string(), "Target host is not allowed: other.net");
    }

    #[test]
    fn test_block_private() {
        let filter = filter(&[], true);
        for url in [
            "http://localhost:8080/",
            "http://app.localhost/",
            "http://127.0.0.1/",
            "http://10.1.2.3/",
            "http://172.16.0.1/",
            "http://192.168.1.1/",
            "http://169.254.169.254/latest/meta-data/",
            "http://0.0.0.0/",
            "http://100.64.0.1/",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://[fe80::1]/",
            "http://[::ffff:127.0.0.1]/",
        ] {
            assert!(
                matches!(filter.check(&target(url)), Err(ProxyError::TargetDenied { .. })),
                "expected {} to be denied",
                url
            );
        }

        assert!(filter.check(&target("https://example.com/")).is_ok());
        assert!(filter.check(&target("http://93.184.216.34/")).is_ok());
        assert!(filter.check(&target("http://[2606:4700::1111]/")).is_ok());
    }

    #[test]
    fn test_check_url_matches_redirect_hops() {
        let filter = filter(&["localhost"], false);
        let hop = Url::parse("http://127.0.0.1:8080/echo").unwrap();
        let err = filter.check_url(&hop).unwrap_err();
        assert_eq!(err.to_string(), "Target host is not allowed: 127.0.0.1");
        assert!(filter
            .check_url(&Url::parse("http://LOCALHOST:8080/next").unwrap())
            .is_ok());
    }
}
