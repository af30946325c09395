//! Error types for the mixin-interface engine.
//!
//! Only four failure kinds are ever raised; every other misuse of the
//! declaration and composition surface (stale handles, empty inputs) is
//! swallowed as a logged no-op. None of the raised kinds are retried or
//! recovered internally — they signal contract violations in caller code.

use thiserror::Error;

/// Errors raised by the type registry, composition engine, and singleton guard.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MixinError {
    /// A declared (abstract) capability member was invoked without an
    /// implementation override.
    #[error("capability '{interface}.{method}' is not implemented on '{instance}'")]
    CapabilityNotImplemented {
        /// Name of the interface (or type) that declared the member.
        interface: String,
        /// Name of the missing member.
        method: String,
        /// Generated name of the offending instance.
        instance: String,
    },

    /// Composition was requested over an undefined base type.
    #[error("composition requires a defined base implementation: {detail}")]
    SuperImplementationUndefined {
        /// What was actually passed as the base.
        detail: String,
    },

    /// A guarded constructor ran while the instance count for the type
    /// already exceeded one.
    #[error("singleton '{type_name}' has already been constructed")]
    SingletonAlreadyConstructed {
        /// Name of the guarded type.
        type_name: String,
    },

    /// A guarded constructor ran outside an open authorization window.
    #[error("constructor of singleton '{type_name}' is private; construct through the singleton accessor")]
    SingletonPrivateConstructor {
        /// Name of the guarded type.
        type_name: String,
    },
}

impl MixinError {
    /// Build a [`MixinError::CapabilityNotImplemented`] from its parts.
    pub fn not_implemented(
        interface: impl Into<String>,
        method: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self::CapabilityNotImplemented {
            interface: interface.into(),
            method: method.into(),
            instance: instance.into(),
        }
    }

    /// Build a [`MixinError::SuperImplementationUndefined`] from a detail string.
    pub fn undefined_base(detail: impl Into<String>) -> Self {
        Self::SuperImplementationUndefined {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_payload() {
        let err = MixinError::not_implemented("ILogSink", "log", "console_sink_0");
        assert_eq!(
            err.to_string(),
            "capability 'ILogSink.log' is not implemented on 'console_sink_0'"
        );

        let err = MixinError::SingletonPrivateConstructor {
            type_name: "Service".to_string(),
        };
        assert!(err.to_string().contains("Service"));
    }
}
