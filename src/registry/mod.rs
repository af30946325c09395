//! Type registry — arena-backed bookkeeping for interfaces and implementations.
//!
//! The registry turns ordinary Rust values into a lattice of nominal types:
//! interface declarations form a forest rooted at a well-known base interface,
//! implementations point at their native parent and at the interfaces they
//! claim to satisfy, and composition overlays capability tables while
//! accumulating claims on the base type.
//!
//! All type metadata lives in one explicit context object so tests can build
//! and discard isolated registries; a process-wide default is reachable via
//! [`TypeRegistry::global`]. Interior state is lock-guarded, so the whole API
//! works through shared references.

pub mod compose;
pub mod conformance;
pub mod null_object;
pub mod singleton;
pub mod type_info;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::naming;
use crate::object::MxObject;

pub use type_info::{MemberEntry, MemberHandler, MemberKind, MemberTable, TypeId, TypeInfo};

// ---------------------------------------------------------------------------
// Global singleton
// ---------------------------------------------------------------------------

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

// ---------------------------------------------------------------------------
// Well-known arena slots
// ---------------------------------------------------------------------------

const OBJECT_IDX: u32 = 0;
const BASE_INTERFACE_IDX: u32 = 1;
const INULL_IDX: u32 = 2;
const NULL_OBJECT_IDX: u32 = 3;
const ISINGLETON_IDX: u32 = 4;
const ILOG_SINK_IDX: u32 = 5;

// ---------------------------------------------------------------------------
// TypeRegistry
// ---------------------------------------------------------------------------

/// Explicit registry context owning every piece of process-wide mutable state
/// the engine needs: the type arena, per-class instance counters, the
/// singleton authorization windows and caches, and the null-object instance.
///
/// Construct one per process (or per test) and discard it at teardown.
pub struct TypeRegistry {
    /// Type arena, indexed by [`TypeId`].
    types: RwLock<Vec<TypeInfo>>,

    /// Per-class construction counters, keyed by the original (pre-normalization)
    /// type name. Monotonic, never reset within the registry's lifetime.
    instance_counts: DashMap<String, u64>,

    /// Types registered for guarded (exactly-one) construction.
    guarded: Mutex<HashSet<TypeId>>,

    /// Currently open construction-authorization windows.
    windows: Mutex<HashSet<TypeId>>,

    /// Cached singleton instances.
    singletons: Mutex<HashMap<TypeId, Arc<MxObject>>>,

    /// Cached null-object instance.
    null_instance: OnceLock<Arc<MxObject>>,
}

impl TypeRegistry {
    /// Create a registry with the well-known types pre-registered: the root
    /// object type, the root base interface, the null-object pair, the
    /// singleton capability, and the log-sink capability.
    pub fn new() -> Self {
        let registry = Self {
            types: RwLock::new(Vec::new()),
            instance_counts: DashMap::new(),
            guarded: Mutex::new(HashSet::new()),
            windows: Mutex::new(HashSet::new()),
            singletons: Mutex::new(HashMap::new()),
            null_instance: OnceLock::new(),
        };

        {
            let mut types = registry.types.write();
            types.push(TypeInfo::implementation("Object", None)); // OBJECT_IDX
            types.push(TypeInfo::interface("IBaseInterface")); // BASE_INTERFACE_IDX
            types.push(TypeInfo::interface("INull")); // INULL_IDX
            types.push(TypeInfo::implementation("NullObject", None)); // NULL_OBJECT_IDX
            types.push(TypeInfo::interface("ISingleton")); // ISINGLETON_IDX
            types.push(TypeInfo::interface("ILogSink")); // ILOG_SINK_IDX
        }

        registry.declare_implementation(registry.null_type(), &[registry.inull()]);
        registry
    }

    /// Process-wide default registry, built on first use.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL_REGISTRY.get_or_init(TypeRegistry::new)
    }

    // -----------------------------------------------------------------------
    // Well-known handles
    // -----------------------------------------------------------------------

    /// Root implementation type; every implementation with no declared native
    /// parent is implicitly its child.
    pub fn object_type(&self) -> TypeId {
        TypeId::new(OBJECT_IDX)
    }

    /// Root interface; every interface with no declared parent is implicitly
    /// treated as its child for conformance walks.
    pub fn base_interface(&self) -> TypeId {
        TypeId::new(BASE_INTERFACE_IDX)
    }

    /// Capability interface marking the null object.
    pub fn inull(&self) -> TypeId {
        TypeId::new(INULL_IDX)
    }

    /// The null-object sentinel type.
    pub fn null_type(&self) -> TypeId {
        TypeId::new(NULL_OBJECT_IDX)
    }

    /// Capability interface marking singleton-guarded types.
    pub fn isingleton(&self) -> TypeId {
        TypeId::new(ISINGLETON_IDX)
    }

    /// Capability contract satisfied by log sinks.
    pub fn ilog_sink(&self) -> TypeId {
        TypeId::new(ILOG_SINK_IDX)
    }

    // -----------------------------------------------------------------------
    // Type definition
    // -----------------------------------------------------------------------

    /// Register a new interface type.
    pub fn define_interface(&self, name: impl Into<String>) -> TypeId {
        let mut types = self.types.write();
        types.push(TypeInfo::interface(name));
        TypeId::new((types.len() - 1) as u32)
    }

    /// Register a new interface type under a parent interface.
    pub fn define_interface_as_child_of(
        &self,
        name: impl Into<String>,
        parent: TypeId,
    ) -> TypeId {
        let ty = self.define_interface(name);
        self.declare_interface(ty, Some(parent));
        ty
    }

    /// Register a new implementation type. A stale `native_parent` handle is
    /// dropped (the type falls back to the implicit object root).
    pub fn define_implementation(
        &self,
        name: impl Into<String>,
        native_parent: Option<TypeId>,
    ) -> TypeId {
        let mut types = self.types.write();
        let parent = match native_parent {
            Some(p) if (p.index() as usize) < types.len() => Some(p),
            Some(p) => {
                log::warn!("dropping unknown native parent {p} for new implementation");
                None
            }
            None => None,
        };
        types.push(TypeInfo::implementation(name, parent));
        TypeId::new((types.len() - 1) as u32)
    }

    /// Look up the implementation with the given name, registering it if
    /// missing. Used by client types that register themselves on first touch.
    pub fn ensure_implementation(
        &self,
        name: &str,
        native_parent: Option<TypeId>,
    ) -> TypeId {
        if let Some(existing) = self.lookup_type(name) {
            return existing;
        }
        self.define_implementation(name, native_parent)
    }

    // -----------------------------------------------------------------------
    // Declaration API
    // -----------------------------------------------------------------------

    /// Mark `ty` as an interface and attach it under `parent` (the root base
    /// interface when `None`).
    ///
    /// Calling this twice simply overwrites the parent link — last write wins.
    /// A stale handle (either argument) makes the whole call a silent no-op,
    /// as does a parent assignment that would close a cycle.
    pub fn declare_interface(&self, ty: TypeId, parent: Option<TypeId>) {
        let mut types = self.types.write();
        if (ty.index() as usize) >= types.len() {
            log::debug!("declare_interface on unknown {ty}: ignored");
            return;
        }
        let parent = match parent {
            Some(p) if (p.index() as usize) < types.len() => p,
            Some(p) => {
                log::debug!("declare_interface with unknown parent {p}: ignored");
                return;
            }
            None => self.base_interface(),
        };

        // Refuse a parent link that would make `ty` its own ancestor.
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == ty {
                log::warn!(
                    "declare_interface would create a cycle through '{}': ignored",
                    types[ty.index() as usize].name
                );
                return;
            }
            cursor = types[current.index() as usize].super_interface;
        }

        let info = &mut types[ty.index() as usize];
        info.is_interface = true;
        info.super_interface = Some(parent);
    }

    /// Mark `ty` as an implementation of exactly the given interfaces.
    ///
    /// This is a full replace of the implemented list, not a merge. Stale
    /// handles in the list are skipped; a stale `ty` makes the call a silent
    /// no-op.
    pub fn declare_implementation(&self, ty: TypeId, interfaces: &[TypeId]) {
        let mut types = self.types.write();
        if (ty.index() as usize) >= types.len() {
            log::debug!("declare_implementation on unknown {ty}: ignored");
            return;
        }

        let mut list = Vec::with_capacity(interfaces.len());
        for &itf in interfaces {
            if (itf.index() as usize) >= types.len() {
                log::warn!("skipping unknown interface {itf} in declaration");
                continue;
            }
            if !list.contains(&itf) {
                list.push(itf);
            }
        }

        let info = &mut types[ty.index() as usize];
        info.is_interface = false;
        info.implemented = Some(list);
    }

    // -----------------------------------------------------------------------
    // Member declaration
    // -----------------------------------------------------------------------

    /// Declare an abstract member slot on `ty` (no body). Invoking the slot
    /// without a later override raises `CapabilityNotImplemented`.
    pub fn require_member(&self, ty: TypeId, name: impl Into<String>) {
        let mut types = self.types.write();
        if (ty.index() as usize) >= types.len() {
            log::debug!("require_member on unknown {ty}: ignored");
            return;
        }
        types[ty.index() as usize].members.set(MemberEntry {
            name: name.into(),
            origin: ty,
            kind: MemberKind::Required,
        });
    }

    /// Bind a concrete member body on `ty`, overriding any slot with the
    /// same name.
    pub fn provide_member(&self, ty: TypeId, name: impl Into<String>, handler: MemberHandler) {
        let mut types = self.types.write();
        if (ty.index() as usize) >= types.len() {
            log::debug!("provide_member on unknown {ty}: ignored");
            return;
        }
        types[ty.index() as usize].members.set(MemberEntry {
            name: name.into(),
            origin: ty,
            kind: MemberKind::Provided(handler),
        });
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Resolve a type by its registered name.
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        let types = self.types.read();
        types
            .iter()
            .position(|info| info.name == name)
            .map(|idx| TypeId::new(idx as u32))
    }

    /// Interfaces declared on or accumulated onto the type, in insertion
    /// order. Empty when the type was never declared an implementation of
    /// anything.
    pub fn implemented_interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let types = self.types.read();
        types
            .get(ty.index() as usize)
            .and_then(|info| info.implemented.clone())
            .unwrap_or_default()
    }

    /// Name of a registered type.
    pub fn type_name(&self, ty: TypeId) -> Option<String> {
        let types = self.types.read();
        types.get(ty.index() as usize).map(|info| info.name.clone())
    }

    /// Whether the handle refers to a type in this registry.
    pub fn contains(&self, ty: TypeId) -> bool {
        (ty.index() as usize) < self.types.read().len()
    }

    /// Number of registered types (well-known types included).
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Whether the registry holds no types. Never true: the well-known types
    /// are registered at construction.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    // -----------------------------------------------------------------------
    // Instance naming & counting
    // -----------------------------------------------------------------------

    /// Generate the next instance name for the given type.
    ///
    /// The counter is keyed by the original type name and post-incremented:
    /// the first instance of a type gets suffix `0`. Counters are monotonic
    /// for the registry's lifetime, independent of instance reachability.
    pub fn generate_instance_name(&self, ty: TypeId) -> String {
        let original = self
            .type_name(ty)
            .unwrap_or_else(|| "UnknownType".to_string());
        let count = {
            let mut entry = self.instance_counts.entry(original.clone()).or_insert(0);
            let current = *entry;
            *entry += 1;
            current
        };
        naming::instance_name(&original, count)
    }

    /// Number of constructions recorded for the given original type name.
    pub fn instance_count(&self, type_name: &str) -> u64 {
        self.instance_counts
            .get(type_name)
            .map(|entry| *entry)
            .unwrap_or(0)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.read().len())
            .field("guarded", &self.guarded.lock().len())
            .finish()
    }
}
