//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The process was invoked with bad arguments
    #[error("usage: {0} <port>")]
    Usage(String),

    /// The request target could not be split into host, service and path
    #[error("invalid request target: {0}")]
    InvalidTarget(String),

    /// A response too large for the cache was offered to it
    #[error("object of {0} bytes exceeds the cacheable size limit")]
    ObjectTooLarge(usize),

    /// Underlying transport failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_message_names_program() {
        let err = ProxyError::Usage("mini_proxy".to_string());
        assert_eq!(err.to_string(), "usage: mini_proxy <port>");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer gone");
        let err: ProxyError = io.into();
        assert!(matches!(err, ProxyError::Io(_)));
        assert!(err.to_string().contains("peer gone"));
    }

    #[test]
    fn test_object_too_large_names_size() {
        let err = ProxyError::ObjectTooLarge(204800);
        assert!(err.to_string().contains("204800"));
    }
}
