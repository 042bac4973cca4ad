//! URI Resolver
//!
//! Lexical splitting of a proxy request target into host, service and path.
//! No name resolution happens here; the pieces go straight into the
//! upstream connect call and the rewritten request line.

use crate::error::{ProxyError, Result};

// == Target ==
/// Host, service and path extracted from a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Origin host name or address literal
    pub host: String,
    /// Numeric port string, `"80"` when the target names none
    pub service: String,
    /// Absolute path, `"/"` when the target names none
    pub path: String,
}

impl Target {
    /// The `host:service` form used to open the upstream connection.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.service)
    }
}

// == Parsing ==
/// Splits a request target into its host, service and path parts.
///
/// Accepts `scheme://host[:port][/path]` as well as the bare
/// `host[:port][/path]` form; the scheme itself is discarded. The port is
/// taken as the run of digits after the first colon in the authority chunk
/// (the part before the first `/`); a non-digit cuts the run short,
/// possibly down to an empty string, which later fails the upstream
/// connect. Nothing is normalized or validated beyond the split.
///
/// # Errors
/// `ProxyError::InvalidTarget` if the host is empty after stripping the
/// scheme.
pub fn parse_target(target: &str) -> Result<Target> {
    let rest = match target.find("://") {
        Some(idx) => &target[idx + 3..],
        None => target,
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };

    let (host, service) = match authority.find(':') {
        Some(idx) => {
            let port = &authority[idx + 1..];
            let digits = port
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(port.len());
            (&authority[..idx], &port[..digits])
        }
        None => (authority, "80"),
    };

    if host.is_empty() {
        return Err(ProxyError::InvalidTarget(target.to_string()));
    }

    Ok(Target {
        host: host.to_string(),
        service: service.to_string(),
        path: path.to_string(),
    })
}
