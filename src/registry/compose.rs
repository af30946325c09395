//! Mixin composition — capability-table merge over a base implementation.
//!
//! `compose` folds a list of interfaces over a base type left-to-right,
//! producing a fresh composed type whose member table carries the base's
//! slots overlaid by each interface's slots (later interfaces win name
//! collisions; there is no ambiguity error). As a deliberate side effect,
//! every merged interface is recorded on the ORIGINAL base type's implemented
//! list — a cumulative union across all compositions over that base, never
//! reset and never scoped to one composed result.

use serde_json::Value;

use super::type_info::{MemberKind, TypeId, TypeInfo};
use super::TypeRegistry;
use crate::errors::MixinError;
use crate::object::MxInstance;

impl TypeRegistry {
    /// Merge `interfaces` over `base`, left to right.
    ///
    /// An empty list returns `base` unchanged — no composition artifact is
    /// created. An unknown `base` fails with
    /// [`MixinError::SuperImplementationUndefined`]. Entries in the list that
    /// are unknown or not interfaces are skipped with a warning.
    ///
    /// The returned type is a fresh implementation whose native parent is
    /// `base`; chaining compositions through it still records interfaces on
    /// the original base, so chained and single-call composition leave
    /// identical claimed-interface sets.
    pub fn compose(&self, base: TypeId, interfaces: &[TypeId]) -> Result<TypeId, MixinError> {
        if !self.contains(base) {
            return Err(MixinError::undefined_base(base.to_string()));
        }
        if interfaces.is_empty() {
            return Ok(base);
        }

        let mut types = self.types.write();

        // Claims accumulate on the original base, chasing through artifacts.
        let original = types[base.index() as usize].composed_base.unwrap_or(base);

        let mut table = types[base.index() as usize].members.clone();
        let mut name = types[base.index() as usize].name.clone();

        for &interface in interfaces {
            let is_interface = types
                .get(interface.index() as usize)
                .map(|info| info.is_interface)
                .unwrap_or(false);
            if !is_interface {
                log::warn!("skipping {interface} in composition: not a registered interface");
                continue;
            }

            let (interface_name, interface_members) = {
                let info = &types[interface.index() as usize];
                (info.name.clone(), info.members.clone())
            };
            table.overlay(&interface_members);
            name.push('+');
            name.push_str(&interface_name);

            let claimed = types[original.index() as usize]
                .implemented
                .get_or_insert_with(Vec::new);
            if !claimed.contains(&interface) {
                claimed.push(interface);
            }
        }

        types.push(TypeInfo {
            name,
            is_interface: false,
            super_interface: None,
            native_parent: Some(base),
            implemented: None,
            composed_base: Some(original),
            members: table,
        });
        Ok(TypeId::new((types.len() - 1) as u32))
    }

    /// Invoke a capability member through `ty`'s table.
    ///
    /// A slot that was declared but never bound, and a member name the table
    /// does not carry at all, both fail with
    /// [`MixinError::CapabilityNotImplemented`] naming the declaring
    /// interface, the member, and the instance's generated name.
    pub fn invoke(
        &self,
        ty: TypeId,
        instance: &dyn MxInstance,
        member: &str,
        args: &[Value],
    ) -> Result<Value, MixinError> {
        let handler = {
            let types = self.types.read();
            let Some(info) = types.get(ty.index() as usize) else {
                return Err(MixinError::not_implemented(
                    ty.to_string(),
                    member,
                    instance.mx_object().name(),
                ));
            };
            match info.members.get(member) {
                None => {
                    return Err(MixinError::not_implemented(
                        info.name.clone(),
                        member,
                        instance.mx_object().name(),
                    ))
                }
                Some(entry) => match &entry.kind {
                    MemberKind::Required => {
                        let origin = types
                            .get(entry.origin.index() as usize)
                            .map(|info| info.name.clone())
                            .unwrap_or_else(|| entry.origin.to_string());
                        return Err(MixinError::not_implemented(
                            origin,
                            member,
                            instance.mx_object().name(),
                        ));
                    }
                    MemberKind::Provided(handler) => handler.clone(),
                },
            }
        };
        // Run the body outside the registry lock so members can re-enter the
        // registry (conformance checks, logging, nested dispatch).
        handler(instance.mx_object(), args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::object::MxObject;

    #[test]
    fn test_empty_list_is_identity() {
        let reg = TypeRegistry::new();
        let animal = reg.define_implementation("Animal", None);
        let before = reg.len();

        let composed = reg.compose(animal, &[]).unwrap();
        assert_eq!(composed, animal);
        assert_eq!(reg.len(), before);
    }

    #[test]
    fn test_unknown_base_fails() {
        let reg = TypeRegistry::new();
        let err = reg.compose(TypeId::new(9999), &[]).unwrap_err();
        assert!(matches!(
            err,
            MixinError::SuperImplementationUndefined { .. }
        ));
    }

    #[test]
    fn test_cumulative_union_on_base() {
        let reg = TypeRegistry::new();
        let i1 = reg.define_interface("I1");
        let i2 = reg.define_interface("I2");
        let i3 = reg.define_interface("I3");
        let base = reg.define_implementation("Base", None);

        reg.compose(base, &[i1, i2]).unwrap();
        assert!(reg.implements_interface(base, i1));
        assert!(reg.implements_interface(base, i2));

        // A later unrelated composition extends the union, never resets it.
        reg.compose(base, &[i3]).unwrap();
        assert!(reg.implements_interface(base, i1));
        assert!(reg.implements_interface(base, i2));
        assert!(reg.implements_interface(base, i3));

        // Repeated composition with the same interface does not duplicate.
        reg.compose(base, &[i1]).unwrap();
        assert_eq!(reg.implemented_interfaces(base), vec![i1, i2, i3]);
    }

    #[test]
    fn test_chained_equals_single_call_for_claims() {
        let reg = TypeRegistry::new();
        let i1 = reg.define_interface("I1");
        let i2 = reg.define_interface("I2");

        let single = reg.define_implementation("Single", None);
        reg.compose(single, &[i1, i2]).unwrap();

        let chained = reg.define_implementation("Chained", None);
        let step = reg.compose(chained, &[i1]).unwrap();
        reg.compose(step, &[i2]).unwrap();

        for base in [single, chained] {
            assert!(reg.implements_interface(base, i1));
            assert!(reg.implements_interface(base, i2));
        }
    }

    #[test]
    fn test_artifact_instances_answer_for_base_claims() {
        let reg = TypeRegistry::new();
        let i1 = reg.define_interface("I1");
        let base = reg.define_implementation("Base", None);
        let composed = reg.compose(base, &[i1]).unwrap();

        let instance = MxObject::new(&reg, composed).unwrap();
        assert!(reg.is_instance_of(base, &instance));
        assert!(reg.is_instance_of(i1, &instance));
    }

    #[test]
    fn test_member_merge_last_writer_wins() {
        let reg = TypeRegistry::new();
        let i1 = reg.define_interface("I1");
        let i2 = reg.define_interface("I2");
        let base = reg.define_implementation("Base", None);

        reg.provide_member(
            i1,
            "speak",
            Arc::new(|_, _| Ok(Value::String("from i1".into()))),
        );
        reg.provide_member(
            i2,
            "speak",
            Arc::new(|_, _| Ok(Value::String("from i2".into()))),
        );

        let composed = reg.compose(base, &[i1, i2]).unwrap();
        let instance = MxObject::new(&reg, base).unwrap();
        let result = reg.invoke(composed, &instance, "speak", &[]).unwrap();
        assert_eq!(result, Value::String("from i2".into()));
    }

    #[test]
    fn test_required_member_raises_not_implemented() {
        let reg = TypeRegistry::new();
        let iface = reg.define_interface("IRunner");
        reg.require_member(iface, "run");
        let base = reg.define_implementation("Base", None);
        let composed = reg.compose(base, &[iface]).unwrap();

        let instance = MxObject::new(&reg, base).unwrap();
        let err = reg.invoke(composed, &instance, "run", &[]).unwrap_err();
        assert_eq!(
            err,
            MixinError::CapabilityNotImplemented {
                interface: "IRunner".to_string(),
                method: "run".to_string(),
                instance: instance.name().to_string(),
            }
        );
    }

    #[test]
    fn test_base_override_fills_required_slot() {
        let reg = TypeRegistry::new();
        let iface = reg.define_interface("IRunner");
        reg.require_member(iface, "run");
        let base = reg.define_implementation("Base", None);
        reg.provide_member(base, "run", Arc::new(|_, _| Ok(json!("running"))));

        // Interface slots override base slots: the interface's Required body
        // shadows the base's Provided one in the composed table.
        let composed = reg.compose(base, &[iface]).unwrap();
        let instance = MxObject::new(&reg, base).unwrap();
        assert!(reg.invoke(composed, &instance, "run", &[]).is_err());

        // Re-providing on the composed type restores a body.
        reg.provide_member(composed, "run", Arc::new(|_, _| Ok(json!("running"))));
        let result = reg.invoke(composed, &instance, "run", &[]).unwrap();
        assert_eq!(result, json!("running"));
    }

    #[test]
    fn test_member_receives_instance_and_args() {
        let reg = TypeRegistry::new();
        let base = reg.define_implementation("Echo", None);
        reg.provide_member(
            base,
            "echo",
            Arc::new(|object: &MxObject, args: &[Value]| {
                Ok(json!({ "who": object.name(), "args": args }))
            }),
        );

        let instance = MxObject::new(&reg, base).unwrap();
        let result = reg
            .invoke(base, &instance, "echo", &[json!(1), json!("two")])
            .unwrap();
        assert_eq!(result["who"], json!("echo_0"));
        assert_eq!(result["args"], json!([1, "two"]));
    }

    #[test]
    fn test_non_interface_entries_skipped() {
        let reg = TypeRegistry::new();
        let iface = reg.define_interface("IFace");
        let other_impl = reg.define_implementation("Other", None);
        let base = reg.define_implementation("Base", None);

        reg.compose(base, &[other_impl, TypeId::new(9999), iface])
            .unwrap();
        assert!(reg.implements_interface(base, iface));
        assert!(!reg.implements_interface(base, other_impl));
    }
}
