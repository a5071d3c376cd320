//! Client IP extraction with X-Forwarded-For validation.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract the client IP, preferring X-Forwarded-For when behind
/// `trusted_proxy_count` proxies, then X-Real-IP, then the socket address.
/// Returns "unknown" when nothing validates.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&std::net::SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(header_value) = forwarded_for.to_str() {
            let ip = extract_from_forwarded_for(header_value, trusted_proxy_count);
            if ip != "unknown" {
                return ip;
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(header_value) = real_ip.to_str() {
            let trimmed = header_value.trim();
            if is_valid_ip(trimmed) {
                return trimmed.to_string();
            }
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// X-Forwarded-For holds `client, proxy1, proxy2, ...`. With N trusted proxies
/// at the end of the chain, the client is the entry just before them.
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> String {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if ips.is_empty() {
        return "unknown".to_string();
    }

    // A shorter chain than the proxy count means the header is spoofed or the
    // topology changed; fall back to the entry closest to us.
    let candidate = if ips.len() <= trusted_proxy_count {
        ips.last().copied().unwrap_or("")
    } else {
        let client_ip_pos = ips.len().saturating_sub(trusted_proxy_count + 1);
        ips.get(client_ip_pos).copied().unwrap_or("")
    };

    if is_valid_ip(candidate) {
        candidate.to_string()
    } else {
        "unknown".to_string()
    }
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
