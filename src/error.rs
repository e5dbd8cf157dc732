//! Error types for route registration and navigation.
//!
//! Unmatched paths are not errors: they produce an unmatched
//! [`RouteResult`](crate::RouteResult). Errors come from two places only:
//!
//! - registering a malformed template ([`RouterError::InvalidPattern`])
//! - a failing hook or action ([`HookError`]), returned unchanged from the
//!   [`Navigation`](crate::Navigation) that ran it

use thiserror::Error;

/// Failure raised by a hook or an action.
///
/// The router never wraps, logs, or retries it.
pub type HookError = Box<dyn std::error::Error + 'static>;

/// Errors produced by the router API.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route template could not be compiled
    #[error("invalid route pattern '{template}': {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: PatternError,
    },

    /// An event name other than `before-route` or `route`
    #[error("unknown route event: '{0}'")]
    UnknownEvent(String),

    /// A scroll restoration mode other than `auto` or `manual`
    #[error("unknown scroll restoration mode: '{0}'")]
    UnknownScrollRestoration(String),
}

/// Reasons a path template is rejected.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A `:` with no name after it
    #[error("parameter at byte {position} has an empty name")]
    EmptyParameterName { position: usize },

    /// A parameter name containing another `:`
    #[error("parameter name '{name}' must not contain ':'")]
    InvalidParameterName { name: String },

    /// The same parameter name declared twice
    #[error("duplicate parameter name '{name}'")]
    DuplicateParameter { name: String },

    /// The generated matcher failed to compile
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_pattern_display() {
        let error = RouterError::InvalidPattern {
            template: "/user/:".to_string(),
            source: PatternError::EmptyParameterName { position: 6 },
        };
        assert_eq!(
            error.to_string(),
            "invalid route pattern '/user/:': parameter at byte 6 has an empty name"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_unknown_event_display() {
        let error = RouterError::UnknownEvent("after-route".to_string());
        assert_eq!(error.to_string(), "unknown route event: 'after-route'");
    }

    #[test]
    fn test_hook_error_from_str() {
        let error: HookError = "boom".into();
        assert_eq!(error.to_string(), "boom");
    }
}
