//! Arena entry and handle types for the type registry.
//!
//! Types are referenced by a stable integer handle ([`TypeId`]) into the
//! registry's arena rather than by live object identity. Handle comparison is
//! the engine's notion of nominal identity; conformance never inspects
//! member signatures.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::MixinError;
use crate::object::MxObject;

// ---------------------------------------------------------------------------
// TypeId
// ---------------------------------------------------------------------------

/// Identity of a registered type (interface or implementation).
///
/// Minted by a [`TypeRegistry`](crate::registry::TypeRegistry); a handle is
/// only meaningful against the registry that created it. Stale or foreign
/// handles are treated as "undefined type" everywhere: declarations become
/// no-ops and conformance queries answer `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Arena index of this handle.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Member table
// ---------------------------------------------------------------------------

/// A callable member body bound to a capability slot.
///
/// Receives the instance's base record and the call arguments; returns an
/// opaque value or a [`MixinError`].
pub type MemberHandler =
    Arc<dyn Fn(&MxObject, &[Value]) -> Result<Value, MixinError> + Send + Sync>;

/// Body of a capability member slot.
#[derive(Clone)]
pub enum MemberKind {
    /// Declared by an interface with no body; invoking it raises
    /// [`MixinError::CapabilityNotImplemented`].
    Required,
    /// Bound to a concrete handler.
    Provided(MemberHandler),
}

impl fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::Provided(_) => write!(f, "Provided(..)"),
        }
    }
}

/// One named slot in a capability table.
#[derive(Debug, Clone)]
pub struct MemberEntry {
    /// Member name.
    pub name: String,
    /// Type that contributed this slot (interface or base implementation).
    pub origin: TypeId,
    /// Slot body.
    pub kind: MemberKind,
}

/// Ordered capability table: an insertion-ordered, last-writer-wins list of
/// member slots. Overwriting an existing name keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    entries: Vec<MemberEntry>,
}

impl MemberTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the slot with the given name.
    pub fn set(&mut self, entry: MemberEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == entry.name) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// Look up a slot by name.
    pub fn get(&self, name: &str) -> Option<&MemberEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Overlay every slot of `other` onto this table (other wins collisions).
    pub fn overlay(&mut self, other: &MemberTable) {
        for entry in &other.entries {
            self.set(entry.clone());
        }
    }

    /// Slots in table order.
    pub fn entries(&self) -> &[MemberEntry] {
        &self.entries
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TypeInfo
// ---------------------------------------------------------------------------

/// Per-type metadata held in the registry arena.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Nominal name, used for instance naming and diagnostics.
    pub name: String,
    /// Whether this type is an interface (capability contract) rather than an
    /// implementation.
    pub is_interface: bool,
    /// Declared super-interface. Interfaces only; `None` means the type is
    /// implicitly a child of the root base interface for conformance walks.
    pub super_interface: Option<TypeId>,
    /// Native parent type. Implementations only; `None` means the type is
    /// implicitly a child of the root object type.
    pub native_parent: Option<TypeId>,
    /// Interfaces this implementation claims to satisfy.
    ///
    /// `None` = never declared; `Some` = declared (insertion-ordered,
    /// deduplicated). Populated by explicit declaration or accumulated by
    /// composition.
    pub implemented: Option<Vec<TypeId>>,
    /// For composition artifacts: the original (unwrapped) base type the
    /// artifact was merged over. Interface claims are recorded on that base
    /// and resolved against it, never against the artifact itself.
    pub composed_base: Option<TypeId>,
    /// Capability member slots carried by the type.
    pub members: MemberTable,
}

impl TypeInfo {
    /// Fresh interface entry.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_interface: true,
            super_interface: None,
            native_parent: None,
            implemented: None,
            composed_base: None,
            members: MemberTable::new(),
        }
    }

    /// Fresh implementation entry.
    pub fn implementation(name: impl Into<String>, native_parent: Option<TypeId>) -> Self {
        Self {
            name: name.into(),
            is_interface: false,
            super_interface: None,
            native_parent,
            implemented: None,
            composed_base: None,
            members: MemberTable::new(),
        }
    }
}
