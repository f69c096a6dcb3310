//! SSRF guard
//!
//! Every URL the connector is about to request, including redirect targets,
//! goes through [`SsrfGuard::validate`]. A URL passes only if it uses HTTP(S),
//! names a host, and every address that host resolves to is publicly
//! routable.

use ipnet::IpNet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;
use thiserror::Error;
use url::{Host, Url};

/// Reasons a URL is refused before any request is made
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Invalid URL {url}: {reason}")]
    UrlValidation { url: String, reason: String },

    #[error("Unable to resolve hostname {host}: {source}")]
    DnsResolution {
        host: String,
        #[source]
        source: io::Error,
    },
}

impl GuardError {
    fn invalid(url: &str, reason: impl Into<String>) -> Self {
        Self::UrlValidation {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Stateless URL validator guarding against server-side request forgery
#[derive(Debug, Clone, Copy)]
pub struct SsrfGuard {
    enabled: bool,
}

impl SsrfGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A guard that accepts everything; for trusted or offline deployments
    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Validates scheme, hostname and every resolved address of `url`
    pub async fn validate(&self, url: &str) -> Result<(), GuardError> {
        if !self.enabled {
            return Ok(());
        }

        let parsed =
            Url::parse(url).map_err(|e| GuardError::invalid(url, format!("malformed URL: {}", e)))?;
        check_literal(url, &parsed)?;

        if let Some(Host::Domain(domain)) = parsed.host() {
            let port = parsed.port_or_known_default().unwrap_or(80);
            for ip in resolve(domain, port).await? {
                check_address(url, &ip)?;
            }
        }

        Ok(())
    }

    /// Validates `url` without resolving its hostname
    ///
    /// Scheme and IP-literal hosts are checked; a domain passes. Used on
    /// redirect hops, where no lookup can run.
    pub fn validate_literal(&self, url: &Url) -> Result<(), GuardError> {
        if !self.enabled {
            return Ok(());
        }
        check_literal(url.as_str(), url)
    }
}

fn check_literal(raw: &str, url: &Url) -> Result<(), GuardError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(GuardError::invalid(
            raw,
            format!("scheme '{}' is not allowed", url.scheme()),
        ));
    }

    match url.host() {
        Some(Host::Ipv4(ip)) => check_address(raw, &IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => check_address(raw, &IpAddr::V6(ip)),
        Some(Host::Domain(domain)) if !domain.is_empty() => Ok(()),
        _ => Err(GuardError::invalid(raw, "hostname is empty")),
    }
}

fn check_address(url: &str, ip: &IpAddr) -> Result<(), GuardError> {
    if is_globally_routable(ip) {
        Ok(())
    } else {
        Err(GuardError::invalid(
            url,
            format!("address {} is not publicly routable", ip),
        ))
    }
}

async fn resolve(host: &str, port: u16) -> Result<Vec<IpAddr>, GuardError> {
    let addresses: Vec<IpAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| GuardError::DnsResolution {
            host: host.to_string(),
            source,
        })?
        .map(|addr| addr.ip())
        .collect();

    if addresses.is_empty() {
        return Err(GuardError::DnsResolution {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
        });
    }

    tracing::trace!("Resolved {} to {:?}", host, addresses);
    Ok(addresses)
}

/// Returns true if `ip` is reachable on the public internet
pub fn is_globally_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_global_v4(v4),
        IpAddr::V6(v6) => is_global_v6(v6),
    }
}

/// Reserved ranges the std predicates below do not cover
const BLOCKED_CIDRS: &[&str] = &[
    "0.0.0.0/8",     // "this network"
    "100.64.0.0/10", // carrier-grade NAT
    "192.0.0.0/24",  // IETF protocol assignments
    "198.18.0.0/15", // benchmarking
    "240.0.0.0/4",   // reserved
    "fc00::/7",      // unique local
    "fe80::/10",     // link-local
    "fec0::/10",     // site-local (deprecated)
    "2001:db8::/32", // documentation
    "100::/64",      // discard-only
];

fn blocked_networks() -> &'static [IpNet] {
    static NETWORKS: OnceLock<Vec<IpNet>> = OnceLock::new();
    NETWORKS.get_or_init(|| {
        BLOCKED_CIDRS
            .iter()
            .filter_map(|cidr| cidr.parse().ok())
            .collect()
    })
}

fn in_blocked_network(ip: IpAddr) -> bool {
    blocked_networks().iter().any(|net| net.contains(&ip))
}

fn is_global_v4(ip: &Ipv4Addr) -> bool {
    let reserved = ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
        || in_blocked_network(IpAddr::V4(*ip));

    !reserved
}

fn is_global_v6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_global_v4(&v4);
    }

    let reserved = ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_multicast()
        || in_blocked_network(IpAddr::V6(*ip));

    !reserved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_public_addresses_are_global() {
        assert!(is_globally_routable(&ip("93.184.216.34")));
        assert!(is_globally_routable(&ip("8.8.8.8")));
        assert!(is_globally_routable(&ip("2606:4700:4700::1111")));
    }

    #[test]
    fn test_non_global_v4() {
        for addr in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "0.0.0.0",
            "0.1.2.3",
            "255.255.255.255",
            "224.0.0.1",
            "100.64.0.1",
            "192.0.0.8",
            "192.0.2.1",
            "198.18.0.1",
            "240.0.0.1",
        ] {
            assert!(!is_globally_routable(&ip(addr)), "{} should be rejected", addr);
        }
    }

    #[test]
    fn test_non_global_v6() {
        for addr in [
            "::",
            "::1",
            "ff02::1",
            "fd00::1",
            "fe80::1",
            "fec0::1",
            "2001:db8::1",
            "100::1",
            "::ffff:127.0.0.1",
            "::ffff:10.0.0.1",
        ] {
            assert!(!is_globally_routable(&ip(addr)), "{} should be rejected", addr);
        }
    }

    #[test]
    fn test_blocklist_entries_all_parse() {
        assert_eq!(blocked_networks().len(), BLOCKED_CIDRS.len());
    }

    #[test]
    fn test_cidr_boundaries() {
        assert!(!is_globally_routable(&ip("100.127.255.255")));
        assert!(is_globally_routable(&ip("100.128.0.1")));
        assert!(!is_globally_routable(&ip("198.19.255.255")));
        assert!(is_globally_routable(&ip("198.20.0.1")));
        assert!(!is_globally_routable(&ip("fdff:ffff::1")));
        assert!(is_globally_routable(&ip("2001:db9::1")));
    }

    #[test]
    fn test_literal_check_skips_dns() {
        let guard = SsrfGuard::new(true);
        let url = |s: &str| Url::parse(s).unwrap();

        assert!(guard.validate_literal(&url("https://does-not-exist.invalid/")).is_ok());
        assert!(guard.validate_literal(&url("http://93.184.216.34/")).is_ok());
        assert!(guard.validate_literal(&url("http://169.254.169.254/latest")).is_err());
        assert!(guard.validate_literal(&url("http://[fd00::1]/")).is_err());
        assert!(guard.validate_literal(&url("file:///etc/passwd")).is_err());
        assert!(SsrfGuard::disabled()
            .validate_literal(&url("http://127.0.0.1/"))
            .is_ok());
    }

    #[test]
    fn test_mapped_public_v4_is_global() {
        assert!(is_globally_routable(&ip("::ffff:93.184.216.34")));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let guard = SsrfGuard::new(true);
        let result = guard.validate("ftp://example.com/file").await;
        assert!(matches!(result, Err(GuardError::UrlValidation { .. })));
    }

    #[tokio::test]
    async fn test_rejects_malformed_url() {
        let guard = SsrfGuard::new(true);
        let result = guard.validate("not a url").await;
        assert!(matches!(result, Err(GuardError::UrlValidation { .. })));
    }

    #[tokio::test]
    async fn test_rejects_loopback_literal() {
        let guard = SsrfGuard::new(true);
        assert!(guard.validate("http://127.0.0.1:8080/admin").await.is_err());
        assert!(guard.validate("http://[::1]/").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_cloud_metadata_endpoint() {
        let guard = SsrfGuard::new(true);
        let result = guard.validate("http://169.254.169.254/latest/meta-data").await;
        assert!(matches!(result, Err(GuardError::UrlValidation { .. })));
    }

    #[tokio::test]
    async fn test_rejects_localhost_name() {
        let guard = SsrfGuard::new(true);
        assert!(guard.validate("http://localhost/").await.is_err());
    }

    #[tokio::test]
    async fn test_accepts_public_literal() {
        let guard = SsrfGuard::new(true);
        assert!(guard.validate("https://93.184.216.34/index.html").await.is_ok());
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let guard = SsrfGuard::new(true);
        let result = guard.validate("https://does-not-exist.invalid/").await;
        assert!(matches!(result, Err(GuardError::DnsResolution { .. })));
    }

    #[tokio::test]
    async fn test_disabled_guard_accepts_everything() {
        let guard = SsrfGuard::disabled();
        assert!(!guard.is_enabled());
        assert!(guard.validate("http://127.0.0.1/").await.is_ok());
        assert!(guard.validate("ftp://10.0.0.1/").await.is_ok());
    }
}
