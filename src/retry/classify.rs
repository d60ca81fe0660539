//! Default classification of transient errors.

use std::any::type_name;
use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Network failures that usually clear up on their own
    static ref TRANSIENT_MESSAGE: Regex = Regex::new(
        r"(?i)econnreset|econnrefused|etimedout|enotfound|eai_again|socket hang up|connection (reset|refused|closed)|timed? ?out|dns error|getaddrinfo|name resolution"
    )
    .expect("transient message pattern is valid");

    /// HTTP statuses worth retrying: rate limiting and gateway errors
    static ref TRANSIENT_STATUS: Regex =
        Regex::new(r"\b(429|502|503|504)\b").expect("transient status pattern is valid");

    /// Whole-message shapes of the breaker's own errors; the name is free text
    static ref BREAKER_OPEN: Regex =
        Regex::new(r"(?s)^circuit breaker '.*' is open$").expect("breaker open pattern is valid");
    static ref BREAKER_TIMEOUT: Regex = Regex::new(r"(?s)^circuit breaker '.*' timed out after \d+ms$")
        .expect("breaker timeout pattern is valid");
}

/// Error type names treated as transient whatever their message.
const TRANSIENT_KINDS: &[&str] = &[
    "Elapsed",
    "TimeoutError",
    "TimedOut",
    "NetworkError",
    "ConnectionError",
];

/// Returns true if `err` looks like a temporary network or upstream failure.
///
/// Matches on the error message (connection reset/refused, timeouts, DNS
/// failures, HTTP 429/502/503/504) or on the error's type name.
///
/// A [`BreakerError`](crate::error::BreakerError) is judged by variant
/// instead: `Open` never retries and `Timeout` always does, whatever the
/// breaker is called. `Inner` falls through to the message checks.
pub fn is_transient_error<E: Display + ?Sized>(err: &E) -> bool {
    let message = err.to_string();
    let kind = short_type_name(type_name::<E>());

    if kind == "BreakerError" {
        if BREAKER_OPEN.is_match(&message) {
            return false;
        }
        if BREAKER_TIMEOUT.is_match(&message) {
            return true;
        }
    }

    TRANSIENT_MESSAGE.is_match(&message)
        || TRANSIENT_STATUS.is_match(&message)
        || TRANSIENT_KINDS.contains(&kind)
}

/// Last path segment of a type name, without generics.
fn short_type_name(full_name: &str) -> &str {
    let without_generics = full_name.split('<').next().unwrap_or(full_name);
    without_generics.rsplit("::").next().unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BreakerError;
    use std::fmt;
    use std::io;

    #[test]
    fn test_network_messages() {
        assert!(is_transient_error("read ECONNRESET"));
        assert!(is_transient_error("connect ECONNREFUSED 10.0.0.4:5432"));
        assert!(is_transient_error("getaddrinfo ENOTFOUND vendor.example.com"));
        assert!(is_transient_error("request timeout"));
        assert!(is_transient_error("operation timed out"));
        assert!(is_transient_error(&io::Error::from(io::ErrorKind::ConnectionReset)));
    }

    #[test]
    fn test_http_statuses() {
        assert!(is_transient_error("upstream returned HTTP 503"));
        assert!(is_transient_error("status 429 Too Many Requests"));
        assert!(!is_transient_error("status 500 Internal Server Error"));
        assert!(!is_transient_error("listening on port 5030"));
    }

    #[test]
    fn test_business_errors_are_permanent() {
        assert!(!is_transient_error("control CTL-7 not found"));
        assert!(!is_transient_error("permission denied"));
        assert!(!is_transient_error("circuit breaker 'vendor-api' is open"));
    }

    #[test]
    fn test_transient_type_name() {
        #[derive(Debug)]
        struct TimeoutError;

        impl fmt::Display for TimeoutError {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("deadline exceeded")
            }
        }

        assert!(is_transient_error(&TimeoutError));
        assert_eq!(short_type_name("tokio::time::error::Elapsed"), "Elapsed");
        assert_eq!(
            short_type_name("resilience_kit::error::BreakerError<alloc::string::String>"),
            "BreakerError"
        );
    }

    #[test]
    fn test_breaker_errors_ignore_breaker_name() {
        for name in ["gateway-timeout", "payments-503", "dns error relay"] {
            let open: BreakerError<String> = BreakerError::Open {
                name: name.to_string(),
            };
            assert!(!is_transient_error(&open), "open breaker '{name}'");

            let timeout: BreakerError<String> = BreakerError::Timeout {
                name: name.to_string(),
                timeout_ms: 250,
            };
            assert!(is_transient_error(&timeout), "timed out breaker '{name}'");
        }

        let inner: BreakerError<String> = BreakerError::Inner("HTTP 503".to_string());
        assert!(is_transient_error(&inner));
        let permanent: BreakerError<String> = BreakerError::Inner("control CTL-7 not found".into());
        assert!(!is_transient_error(&permanent));
    }
}
