// mcpgate-artifact/src/ssrf.rs
// ============================================================================
// Module: SSRF Hardening
// Description: Scheme and DNS-resolution checks gating tarball downloads.
// Purpose: spec.md §4.5's tarball downloader hardening and §8 invariant 6.
// Dependencies: tokio (net), url
// ============================================================================

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;

use url::Url;

use crate::error::ArtifactError;

/// Validates `url`'s scheme: HTTPS is always accepted; HTTP is accepted
/// only when the host is an explicit loopback literal or `localhost`.
///
/// # Errors
///
/// Returns [`ArtifactError::NetworkDenied`] when the scheme is neither
/// `https` nor an HTTP-to-loopback exception.
pub fn validate_scheme(url: &Url) -> Result<(), ArtifactError> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback_host(url.host_str().unwrap_or("")) => Ok(()),
        other => Err(ArtifactError::NetworkDenied(format!(
            "scheme {other:?} is not permitted (https required, http only to loopback)"
        ))),
    }
}

/// Returns `true` when `host` is a loopback literal or `localhost`.
fn is_loopback_host(host: &str) -> bool {
    host == "localhost" || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

/// Resolves `host` and checks that every returned address is globally
/// routable, unless `allow_private` lifts the restriction (spec.md §4.5,
/// `--unsafe-allow-private-tarball-hosts`).
///
/// # Errors
///
/// Returns [`ArtifactError::NetworkDenied`] when DNS resolution fails or
/// any resolved address is private/loopback/link-local/unique-local/CGNAT
/// and `allow_private` is `false`.
pub async fn check_resolved_addresses(host: &str, port: u16, allow_private: bool) -> Result<(), ArtifactError> {
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|err| ArtifactError::NetworkDenied(format!("DNS resolution failed for {host:?}: {err}")))?;

    let mut resolved_any = false;
    for socket_addr in addrs {
        resolved_any = true;
        let ip = socket_addr.ip();
        if !is_globally_routable(ip) {
            if allow_private {
                tracing::warn!(
                    host,
                    %ip,
                    "tarball host resolved to non-global address; proceeding because \
                     --unsafe-allow-private-tarball-hosts is set"
                );
            } else {
                return Err(ArtifactError::NetworkDenied(format!(
                    "host {host:?} resolved to non-global address {ip}"
                )));
            }
        }
    }
    if !resolved_any {
        return Err(ArtifactError::NetworkDenied(format!("host {host:?} resolved to no addresses")));
    }
    Ok(())
}

/// Returns `true` when `ip` is globally routable: not private, loopback,
/// link-local, unique-local IPv6, or CGNAT (spec.md §4.5).
#[must_use]
pub fn is_globally_routable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => !(v4.is_private()
            || v4.is_loopback()
            || v4.is_link_local()
            || v4.is_unspecified()
            || v4.is_broadcast()
            || v4.is_documentation()
            || is_cgnat(v4)),
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified() || is_unique_local(v6) || is_unicast_link_local(v6)),
    }
}

/// `100.64.0.0/10`, the carrier-grade NAT range.
fn is_cgnat(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    octets[0] == 100 && (64..=127).contains(&octets[1])
}

/// `fc00::/7`, IPv6 unique local addresses.
fn is_unique_local(ip: Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

/// `fe80::/10`, IPv6 link-local addresses.
fn is_unicast_link_local(ip: Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::net::Ipv6Addr;

    #[test]
    fn private_v4_ranges_are_rejected() {
        assert!(!is_globally_routable(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))));
        assert!(!is_globally_routable(IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1))));
        assert!(!is_globally_routable(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
        assert!(!is_globally_routable(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))));
        assert!(!is_globally_routable(IpAddr::V4(Ipv4Addr::new(169, 254, 1, 1))));
        assert!(!is_globally_routable(IpAddr::V4(Ipv4Addr::new(100, 64, 0, 1))));
    }

    #[test]
    fn public_v4_is_routable() {
        assert!(is_globally_routable(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
    }

    #[test]
    fn v6_unique_local_and_link_local_are_rejected() {
        assert!(!is_globally_routable(IpAddr::V6(Ipv6Addr::new(
            0xfc00, 0, 0, 0, 0, 0, 0, 1
        ))));
        assert!(!is_globally_routable(IpAddr::V6(Ipv6Addr::new(
            0xfe80, 0, 0, 0, 0, 0, 0, 1
        ))));
        assert!(!is_globally_routable(IpAddr::V6(Ipv6Addr::LOOPBACK)));
    }

    #[test]
    fn v6_global_is_routable() {
        assert!(is_globally_routable(IpAddr::V6(Ipv6Addr::new(
            0x2606, 0x4700, 0, 0, 0, 0, 0, 1
        ))));
    }

    #[test]
    fn loopback_http_host_is_allowed() {
        let url = Url::parse("http://127.0.0.1:8080/x.tgz").unwrap();
        assert!(validate_scheme(&url).is_ok());
    }

    #[test]
    fn non_loopback_http_is_denied() {
        let url = Url::parse("http://example.com/x.tgz").unwrap();
        assert!(validate_scheme(&url).is_err());
    }
}
