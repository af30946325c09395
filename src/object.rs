//! Base instance record and the instance seam trait.
//!
//! Every live object the engine reasons about carries an [`MxObject`]: the
//! concrete constructing type's handle, the generated instance name, and the
//! idempotent `init` state. Client types embed one and expose it through
//! [`MxInstance`]; the conformance oracle, the singleton guard, and the log
//! sinks all work against that seam.

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::errors::MixinError;
use crate::registry::{TypeId, TypeRegistry};

/// Seam between the engine and client types: anything holding an [`MxObject`]
/// participates in conformance checks, naming, and sink dispatch.
pub trait MxInstance: Send + Sync {
    /// The instance's base record.
    fn mx_object(&self) -> &MxObject;

    /// Handle of the concrete constructing type.
    fn type_id(&self) -> TypeId {
        self.mx_object().type_id()
    }

    /// Generated instance name.
    fn instance_name(&self) -> &str {
        self.mx_object().name()
    }
}

/// Base instance record.
///
/// The name is assigned at construction from the registry's per-type counter;
/// `init` records its arguments exactly once and is a no-op afterwards.
#[derive(Debug)]
pub struct MxObject {
    type_id: TypeId,
    name: OnceCell<String>,
    initialized: bool,
    init_args: Vec<Value>,
}

impl MxObject {
    /// Construct an instance of the given type.
    ///
    /// Bumps the registry's per-type construction counter and generates the
    /// instance name. For singleton-guarded types the construction guard runs
    /// after the counter bump (the count includes this construction) and can
    /// fail with [`MixinError::SingletonAlreadyConstructed`] or
    /// [`MixinError::SingletonPrivateConstructor`].
    pub fn new(registry: &TypeRegistry, ty: TypeId) -> Result<Self, MixinError> {
        let object = Self::new_unchecked(registry, ty);
        registry.construction_guard(ty)?;
        Ok(object)
    }

    /// Construction without the singleton guard. Still counted and named.
    pub(crate) fn new_unchecked(registry: &TypeRegistry, ty: TypeId) -> Self {
        let name = registry.generate_instance_name(ty);
        let cell = OnceCell::new();
        let _ = cell.set(name);
        Self {
            type_id: ty,
            name: cell,
            initialized: false,
            init_args: Vec::new(),
        }
    }

    /// Handle of the concrete constructing type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The generated instance name.
    pub fn name(&self) -> &str {
        self.name.get().map(String::as_str).unwrap_or("")
    }

    /// The generated instance name, regenerating it once if absent.
    pub fn name_or_generate(&self, registry: &TypeRegistry) -> &str {
        self.name
            .get_or_init(|| registry.generate_instance_name(self.type_id))
    }

    /// Record initialization arguments.
    ///
    /// Idempotent: the first call sets the flag and stores the arguments;
    /// every later call is a no-op and leaves the stored arguments untouched.
    pub fn init(&mut self, args: &[Value]) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.init_args = args.to_vec();
    }

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Arguments stored by the first `init` call.
    pub fn init_args(&self) -> &[Value] {
        &self.init_args
    }
}

impl MxInstance for MxObject {
    fn mx_object(&self) -> &MxObject {
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_names_are_sequential_per_type() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);
        let cat = reg.define_implementation("Cat", Some(animal));

        let a0 = MxObject::new(&reg, animal).unwrap();
        let a1 = MxObject::new(&reg, animal).unwrap();
        let c0 = MxObject::new(&reg, cat).unwrap();
        let a2 = MxObject::new(&reg, animal).unwrap();

        assert_eq!(a0.name(), "animal_0");
        assert_eq!(a1.name(), "animal_1");
        assert_eq!(a2.name(), "animal_2");
        // Counters are independent per type.
        assert_eq!(c0.name(), "cat_0");
        assert_eq!(reg.instance_count("Animal"), 3);
        assert_eq!(reg.instance_count("Cat"), 1);
    }

    #[test]
    fn test_init_is_idempotent() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);
        let mut instance = MxObject::new(&reg, animal).unwrap();

        assert!(!instance.is_initialized());
        instance.init(&[json!("first"), json!(1)]);
        assert!(instance.is_initialized());
        assert_eq!(instance.init_args(), &[json!("first"), json!(1)]);

        // A second call with different arguments changes nothing.
        instance.init(&[json!("second")]);
        assert!(instance.is_initialized());
        assert_eq!(instance.init_args(), &[json!("first"), json!(1)]);
    }

    #[test]
    fn test_instance_trait_accessors() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);
        let instance = MxObject::new(&reg, animal).unwrap();

        let as_dyn: &dyn MxInstance = &instance;
        assert_eq!(as_dyn.type_id(), animal);
        assert_eq!(as_dyn.instance_name(), "animal_0");
    }

    #[test]
    fn test_counters_never_recycle() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);

        {
            let _dropped = MxObject::new(&reg, animal).unwrap();
        }
        let next = MxObject::new(&reg, animal).unwrap();
        assert_eq!(next.name(), "animal_1");
    }
}
