//! Singleton guard — exactly-one construction through an accessor.
//!
//! A type opts in via [`TypeRegistry::mark_singleton`], which also declares
//! conformance to the `ISingleton` capability. From then on the only
//! sanctioned construction path is [`TypeRegistry::singleton_of`]: it opens a
//! construction-authorization window, builds the one permitted instance,
//! closes the window, and caches the result. Construction outside the window,
//! or after the cache is populated, fails with a taxonomy error.

use std::sync::Arc;

use super::type_info::TypeId;
use super::TypeRegistry;
use crate::errors::MixinError;
use crate::object::MxObject;

impl TypeRegistry {
    /// Register `ty` for guarded construction and declare its conformance to
    /// the singleton capability. A stale handle is a silent no-op.
    pub fn mark_singleton(&self, ty: TypeId) {
        if !self.contains(ty) {
            log::debug!("mark_singleton on unknown {ty}: ignored");
            return;
        }
        self.guarded.lock().insert(ty);

        let mut claimed = self.implemented_interfaces(ty);
        if !claimed.contains(&self.isingleton()) {
            claimed.push(self.isingleton());
        }
        self.declare_implementation(ty, &claimed);
    }

    /// Whether the type was registered for guarded construction.
    pub fn is_singleton_guarded(&self, ty: TypeId) -> bool {
        self.guarded.lock().contains(&ty)
    }

    /// The sanctioned accessor: returns the cached instance, constructing it
    /// inside an authorization window on first use.
    ///
    /// Every later call returns the identical `Arc` without re-running the
    /// constructor.
    pub fn singleton_of(&self, ty: TypeId) -> Result<Arc<MxObject>, MixinError> {
        if let Some(existing) = self.singletons.lock().get(&ty) {
            return Ok(existing.clone());
        }

        self.windows.lock().insert(ty);
        let constructed = MxObject::new(self, ty);
        self.windows.lock().remove(&ty);

        let instance = Arc::new(constructed?);
        self.singletons.lock().insert(ty, instance.clone());
        Ok(instance)
    }

    /// Construction-time check, run by every [`MxObject::new`] after the
    /// instance counter has been bumped. A no-op for unguarded types.
    pub(crate) fn construction_guard(&self, ty: TypeId) -> Result<(), MixinError> {
        if !self.is_singleton_guarded(ty) {
            return Ok(());
        }
        let type_name = self
            .type_name(ty)
            .unwrap_or_else(|| "UnknownType".to_string());
        if self.instance_count(&type_name) > 1 {
            return Err(MixinError::SingletonAlreadyConstructed { type_name });
        }
        if !self.windows.lock().contains(&ty) {
            return Err(MixinError::SingletonPrivateConstructor { type_name });
        }
        Ok(())
    }
}
