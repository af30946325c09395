//! # mixin-interface
//!
//! Runtime interface declaration, mixin-style capability composition, and
//! nominal conformance checking.
//!
//! The engine keeps every piece of type metadata in an explicit
//! [`TypeRegistry`](registry::TypeRegistry) context: interfaces form a forest
//! rooted at a well-known base interface, implementations record their native
//! parent and the interfaces they claim, and
//! [`compose`](registry::TypeRegistry::compose) merges capability tables while
//! accumulating claims on the original base type. Conformance is nominal
//! (identity-based, never duck-typed) and answered by
//! [`is_instance_of`](registry::TypeRegistry::is_instance_of) /
//! [`implements_interface`](registry::TypeRegistry::implements_interface)
//! through native descent or the declared-interface walk.
//!
//! On top of the engine sit the built-in capabilities: the singleton guard,
//! the null object, and the pluggable log sinks in [`logging`].

pub mod errors;
pub mod logging;
pub mod naming;
pub mod object;
pub mod registry;

pub use errors::MixinError;
pub use logging::{ConsoleSink, FileSink, LogSink, LoggingConfig, SinkRegistry};
pub use object::{MxInstance, MxObject};
pub use registry::{MemberHandler, MemberKind, TypeId, TypeRegistry};

/// Library version.
pub const VERSION: &str = "0.3.1";
