//! Null-object support.
//!
//! One designated instance stands in for "no object". It conforms to the
//! `INull` capability, so callers test for it with a conformance query
//! instead of threading `Option` through every seam.

use std::sync::Arc;

use super::TypeRegistry;
use crate::object::{MxInstance, MxObject};

impl TypeRegistry {
    /// The registry's null-object instance, built on first use and shared
    /// thereafter.
    pub fn null_object(&self) -> Arc<MxObject> {
        self.null_instance
            .get_or_init(|| Arc::new(MxObject::new_unchecked(self, self.null_type())))
            .clone()
    }

    /// Whether the instance is the "no object" stand-in.
    pub fn is_null(&self, instance: &dyn MxInstance) -> bool {
        self.is_instance_of(self.inull(), instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_object_is_null() {
        let reg = TypeRegistry::new();
        let null = reg.null_object();
        assert!(reg.is_null(null.as_ref()));
        assert_eq!(null.name(), "null_object_0");
    }

    #[test]
    fn test_null_object_is_shared() {
        let reg = TypeRegistry::new();
        assert!(Arc::ptr_eq(&reg.null_object(), &reg.null_object()));
    }

    #[test]
    fn test_ordinary_instances_are_not_null() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);
        let instance = MxObject::new(&reg, animal).unwrap();
        assert!(!reg.is_null(&instance));
    }
}
