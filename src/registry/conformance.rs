//! Conformance oracle — "does this satisfy that" over the type lattice.
//!
//! Conformance is nominal: a candidate satisfies a target either through
//! native descent (implementation-of-implementation ancestry) or through its
//! own declared-interface list, walking each declared interface's
//! super-interface chain. Interface declarations are NOT inherited through
//! native descent: a subclass only answers for interfaces declared or
//! composed onto itself.

use super::type_info::{TypeId, TypeInfo};
use super::TypeRegistry;
use crate::object::MxInstance;

impl TypeRegistry {
    /// Does the instance satisfy `target`, directly or transitively?
    ///
    /// Short-circuit order, reproduced deliberately:
    /// 1. unknown `target` → `false`;
    /// 2. native descent of the instance's concrete type;
    /// 3. the concrete type's own declared-interface list (`false` when it
    ///    was never declared);
    /// 4. each declared interface and its super-interface chain, in
    ///    insertion order.
    pub fn is_instance_of(&self, target: TypeId, instance: &dyn MxInstance) -> bool {
        self.conforms(instance.mx_object().type_id(), target)
    }

    /// Does the candidate type satisfy `target`? Same walk as
    /// [`is_instance_of`](Self::is_instance_of), applied to a type instead of
    /// an instance.
    pub fn implements_interface(&self, candidate: TypeId, target: TypeId) -> bool {
        self.conforms(candidate, target)
    }

    /// Whether the type is flagged as an interface. `false` for unknown
    /// handles.
    pub fn is_interface(&self, ty: TypeId) -> bool {
        let types = self.types.read();
        types
            .get(ty.index() as usize)
            .map(|info| info.is_interface)
            .unwrap_or(false)
    }

    /// Super type accessor with no failure path.
    ///
    /// Interfaces yield their declared super-interface; implementations their
    /// native parent (the root object type when none was declared). Unknown
    /// handles, the root object type, and undeclared interface parents all
    /// yield the null-object sentinel type.
    pub fn superclass_of(&self, ty: TypeId) -> TypeId {
        let types = self.types.read();
        let Some(info) = types.get(ty.index() as usize) else {
            return self.null_type();
        };
        if info.is_interface {
            info.super_interface.unwrap_or_else(|| self.null_type())
        } else if ty == self.object_type() {
            self.null_type()
        } else {
            info.native_parent.unwrap_or_else(|| self.object_type())
        }
    }

    fn conforms(&self, candidate: TypeId, target: TypeId) -> bool {
        let types = self.types.read();
        if types.get(target.index() as usize).is_none()
            || types.get(candidate.index() as usize).is_none()
        {
            return false;
        }

        // Native descent: walk the candidate's implementation ancestry,
        // candidate included. Implementations with no declared parent are
        // implicit children of the root object type.
        let mut cursor = Some(candidate);
        while let Some(current) = cursor {
            if current == target {
                return true;
            }
            let info = &types[current.index() as usize];
            cursor = match info.native_parent {
                Some(parent) => Some(parent),
                None if !info.is_interface && current != self.object_type() => {
                    Some(self.object_type())
                }
                None => None,
            };
        }

        // Declared-interface walk over the candidate's own list. Composition
        // artifacts delegate to the original base they were merged over.
        let holder = {
            let info = &types[candidate.index() as usize];
            match info.composed_base {
                Some(original) if info.implemented.is_none() => original,
                _ => candidate,
            }
        };
        let Some(declared) = types
            .get(holder.index() as usize)
            .and_then(|info| info.implemented.as_ref())
        else {
            return false;
        };

        for &interface in declared {
            if interface == target {
                return true;
            }
            let mut parent = super_interface_of(&types, self.base_interface(), interface);
            while let Some(ancestor) = parent {
                if ancestor == target {
                    return true;
                }
                parent = super_interface_of(&types, self.base_interface(), ancestor);
            }
        }

        false
    }
}

/// Next hop up an interface chain. Interfaces with no declared parent are
/// implicitly children of the root base interface; the root itself (and
/// anything that is not a live interface) terminates the walk.
fn super_interface_of(types: &[TypeInfo], root: TypeId, interface: TypeId) -> Option<TypeId> {
    let info = types.get(interface.index() as usize)?;
    match info.super_interface {
        Some(parent) => Some(parent),
        None if info.is_interface && interface != root => Some(root),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::MxObject;

    #[test]
    fn test_life_form_scenario() {
        let reg = TypeRegistry::new();
        let ilife = reg.define_interface("ILifeForm");
        reg.declare_interface(ilife, None);
        let ianimal = reg.define_interface_as_child_of("IAnimal", ilife);
        let animal = reg.define_implementation("Animal", None);
        reg.compose(animal, &[ianimal]).unwrap();

        let an_animal = MxObject::new(&reg, animal).unwrap();
        assert!(reg.is_instance_of(reg.object_type(), &an_animal));
        assert!(reg.is_instance_of(animal, &an_animal));
        assert!(reg.is_instance_of(ianimal, &an_animal));
        // Two hops up the interface chain.
        assert!(reg.is_instance_of(ilife, &an_animal));

        let imammal = reg.define_interface_as_child_of("IMammal", ianimal);
        assert!(!reg.is_instance_of(imammal, &an_animal));

        let cat = reg.define_implementation("Cat", Some(animal));
        reg.compose(cat, &[imammal]).unwrap();

        let a_cat = MxObject::new(&reg, cat).unwrap();
        assert!(reg.is_instance_of(cat, &a_cat));
        // Native descent.
        assert!(reg.is_instance_of(animal, &a_cat));
        // Direct declaration.
        assert!(reg.is_instance_of(imammal, &a_cat));
        // Three hops: IMammal -> IAnimal -> ILifeForm.
        assert!(reg.is_instance_of(ilife, &a_cat));
    }

    #[test]
    fn test_interfaces_not_inherited_through_native_descent() {
        let reg = TypeRegistry::new();
        let ilife = reg.define_interface("ILifeForm");
        let animal = reg.define_implementation("Animal", None);
        reg.compose(animal, &[ilife]).unwrap();

        // Dog never declares anything of its own.
        let dog = reg.define_implementation("Dog", Some(animal));
        let a_dog = MxObject::new(&reg, dog).unwrap();

        assert!(reg.is_instance_of(animal, &a_dog));
        assert!(!reg.is_instance_of(ilife, &a_dog));
    }

    #[test]
    fn test_transitivity_through_interface_hierarchy() {
        let reg = TypeRegistry::new();
        let parent = reg.define_interface("IParent");
        let child = reg.define_interface_as_child_of("IChild", parent);
        let imp = reg.define_implementation("Imp", None);
        reg.declare_implementation(imp, &[child]);

        // IParent was never directly declared on Imp.
        assert!(reg.implements_interface(imp, parent));
        assert!(reg.implements_interface(imp, child));
    }

    #[test]
    fn test_stale_target_is_false() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);
        let an_animal = MxObject::new(&reg, animal).unwrap();
        assert!(!reg.is_instance_of(TypeId::new(9999), &an_animal));
    }

    #[test]
    fn test_is_interface_flags() {
        let reg = TypeRegistry::new();
        let iface = reg.define_interface("IFace");
        let imp = reg.define_implementation("Imp", None);

        assert!(reg.is_interface(iface));
        assert!(reg.is_interface(reg.base_interface()));
        assert!(!reg.is_interface(imp));
        assert!(!reg.is_interface(reg.object_type()));
        assert!(!reg.is_interface(TypeId::new(9999)));
    }

    #[test]
    fn test_superclass_of_never_fails() {
        let reg = TypeRegistry::new();
        let parent = reg.define_interface("IParent");
        let child = reg.define_interface_as_child_of("IChild", parent);
        let animal = reg.define_implementation("Animal", None);
        let cat = reg.define_implementation("Cat", Some(animal));

        assert_eq!(reg.superclass_of(child), parent);
        assert_eq!(reg.superclass_of(cat), animal);
        assert_eq!(reg.superclass_of(animal), reg.object_type());
        assert_eq!(reg.superclass_of(reg.object_type()), reg.null_type());
        assert_eq!(reg.superclass_of(TypeId::new(9999)), reg.null_type());
    }

    #[test]
    fn test_root_interface_conformance() {
        let reg = TypeRegistry::new();
        let iface = reg.define_interface("IFace");
        let imp = reg.define_implementation("Imp", None);
        reg.declare_implementation(imp, &[iface]);

        // IFace has no declared parent: implicitly a child of the root.
        assert!(reg.implements_interface(imp, reg.base_interface()));
    }
}
