//! Typed error handling for the rule engine
//!
//! Every failure the engine can observe is a [`RuleError`]. Errors are
//! `Clone + PartialEq` because they travel inside live values: a filter clause
//! that fails emits its error as a stream item, and the orchestrator records it
//! in the per-clause `filter_errors` slot of the result.
//!
//! # Error Categories
//!
//! - [`RuleError::UnsupportedProvider`]: no provider registered for a key
//! - [`RuleError::UnsupportedMethod`]: a provider does not know the clause method
//! - [`RuleError::InvalidValue`]: the clause operand cannot be decoded
//! - [`RuleError::UnknownProperty`]: a `property` clause references a property
//!   missing from the workspace schema
//! - [`RuleError::Closed`]: a result stream ended before producing a value
//!
//! # Example
//!
//! ```rust,ignore
//! match service.watch(options) {
//!     Ok(stream) => consume(stream).await,
//!     Err(RuleError::UnsupportedProvider { family, key }) => {
//!         eprintln!("no {} provider for {}", family, key);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use std::fmt;

/// The provider family a key was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    Filter,
    GroupBy,
    OrderBy,
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFamily::Filter => write!(f, "filter"),
            ProviderFamily::GroupBy => write!(f, "group-by"),
            ProviderFamily::OrderBy => write!(f, "order-by"),
        }
    }
}

/// The main error type for the rule engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// No provider is registered under the requested key
    #[error("Unsupported {family} provider: {key}")]
    UnsupportedProvider { family: ProviderFamily, key: String },

    /// The provider exists but does not implement the clause method
    #[error("Unsupported method '{method}' for {provider}")]
    UnsupportedMethod { provider: String, method: String },

    /// The clause operand could not be decoded by the provider
    #[error("Invalid value {value:?} for {provider}: {reason}")]
    InvalidValue {
        provider: String,
        value: Option<String>,
        reason: String,
    },

    /// A `property` clause references a property the workspace does not define
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// The result stream ended before emitting anything
    #[error("Rule stream closed before producing a result")]
    Closed,
}

impl RuleError {
    /// Shorthand for an unsupported provider lookup
    pub fn unsupported(family: ProviderFamily, key: impl Into<String>) -> Self {
        RuleError::UnsupportedProvider {
            family,
            key: key.into(),
        }
    }

    /// Shorthand for an unknown clause method
    pub fn unsupported_method(provider: impl Into<String>, method: impl Into<String>) -> Self {
        RuleError::UnsupportedMethod {
            provider: provider.into(),
            method: method.into(),
        }
    }

    /// Shorthand for an operand that failed to decode
    pub fn invalid_value(
        provider: impl Into<String>,
        value: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        RuleError::InvalidValue {
            provider: provider.into(),
            value: value.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RuleError::UnsupportedProvider { .. } => "UNSUPPORTED_PROVIDER",
            RuleError::UnsupportedMethod { .. } => "UNSUPPORTED_METHOD",
            RuleError::InvalidValue { .. } => "INVALID_VALUE",
            RuleError::UnknownProperty(_) => "UNKNOWN_PROPERTY",
            RuleError::Closed => "STREAM_CLOSED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_message() {
        let err = RuleError::unsupported(ProviderFamily::GroupBy, "system:nope");
        assert_eq!(err.to_string(), "Unsupported group-by provider: system:nope");
        assert_eq!(err.error_code(), "UNSUPPORTED_PROVIDER");
    }

    #[test]
    fn test_invalid_value_message() {
        let err = RuleError::invalid_value("system:trash", Some("maybe"), "expected true or false");
        assert_eq!(
            err.to_string(),
            "Invalid value Some(\"maybe\") for system:trash: expected true or false"
        );
    }

    #[test]
    fn test_errors_compare_structurally() {
        let a = RuleError::unsupported_method("property:text", "between");
        let b = RuleError::unsupported_method("property:text", "between");
        assert_eq!(a, b);
        assert_ne!(a, RuleError::UnknownProperty("p1".to_string()));
    }
}
