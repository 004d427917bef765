// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural type equivalence.
//!
//! Two declared types are equivalent when their shapes line up:
//!
//! | outer kind | rule |
//! |------------|------|
//! | pointer    | targets are equivalent |
//! | sequence   | elements are equivalent |
//! | array      | elements are equivalent and lengths are equal |
//! | map        | keys and values are pairwise equivalent |
//! | struct     | package and name match exactly (nominal, one level) |
//! | otherwise  | outer kinds match |
//!
//! The struct row stops the recursion, so the walk always terminates on
//! the finite descriptor tree.

use crate::kind::{TypeDescriptor, TypeKind};

/// Check whether values of `a` may be copied into slots of `b`.
pub fn structurally_equivalent(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    match (&a.kind, &b.kind) {
        (TypeKind::Primitive(x), TypeKind::Primitive(y)) => x == y,
        (TypeKind::Pointer(x), TypeKind::Pointer(y)) => structurally_equivalent(x, y),
        (TypeKind::Sequence(x), TypeKind::Sequence(y)) => structurally_equivalent(x, y),
        (TypeKind::Array(x), TypeKind::Array(y)) => {
            x.length == y.length && structurally_equivalent(&x.element_type, &y.element_type)
        }
        (TypeKind::Map(x), TypeKind::Map(y)) => {
            structurally_equivalent(&x.value_type, &y.value_type)
                && structurally_equivalent(&x.key_type, &y.key_type)
        }
        (TypeKind::Struct(_), TypeKind::Struct(_)) => a.package == b.package && a.name == b.name,
        (TypeKind::Interface, TypeKind::Interface) => true,
        _ => false,
    }
}

/// Check whether a value of type `found` can be stored in a slot declared
/// as `slot`.
///
/// Stricter than [`structurally_equivalent`] for anonymous records, which
/// all share an empty name: their field lists must match by name and
/// recursively by type.
pub(crate) fn storable(slot: &TypeDescriptor, found: &TypeDescriptor) -> bool {
    match (&slot.kind, &found.kind) {
        (TypeKind::Pointer(x), TypeKind::Pointer(y)) => storable(x, y),
        (TypeKind::Sequence(x), TypeKind::Sequence(y)) => storable(x, y),
        (TypeKind::Array(x), TypeKind::Array(y)) => {
            x.length == y.length && storable(&x.element_type, &y.element_type)
        }
        (TypeKind::Map(x), TypeKind::Map(y)) => {
            storable(&x.key_type, &y.key_type) && storable(&x.value_type, &y.value_type)
        }
        (TypeKind::Struct(x), TypeKind::Struct(y)) if slot.name.is_empty() && found.name.is_empty() => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y)
                    .all(|(a, b)| a.name == b.name && storable(&a.type_desc, &b.type_desc))
        }
        _ => structurally_equivalent(slot, found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{FieldDescriptor, PrimitiveKind};

    fn named_struct(package: &str, name: &str, fields: Vec<FieldDescriptor>) -> TypeDescriptor {
        TypeDescriptor::named(package, name, TypeKind::Struct(fields))
    }

    #[test]
    fn test_primitives_compare_by_kind() {
        let a = TypeDescriptor::primitive(PrimitiveKind::I32);
        let b = TypeDescriptor::primitive(PrimitiveKind::I32);
        let c = TypeDescriptor::primitive(PrimitiveKind::I64);
        assert!(structurally_equivalent(&a, &b));
        assert!(!structurally_equivalent(&a, &c));
        assert!(!structurally_equivalent(
            &a,
            &TypeDescriptor::primitive(PrimitiveKind::String)
        ));
    }

    #[test]
    fn test_pointer_recursion() {
        let a = TypeDescriptor::pointer(PrimitiveKind::F64);
        let b = TypeDescriptor::pointer(PrimitiveKind::F64);
        let c = TypeDescriptor::pointer(PrimitiveKind::F32);
        assert!(structurally_equivalent(&a, &b));
        assert!(!structurally_equivalent(&a, &c));
        // Pointer never matches its target
        assert!(!structurally_equivalent(
            &a,
            &TypeDescriptor::primitive(PrimitiveKind::F64)
        ));
    }

    #[test]
    fn test_struct_is_nominal() {
        let user_a = named_struct(
            "app",
            "User",
            vec![FieldDescriptor::new("id", PrimitiveKind::I64)],
        );
        // Same name and package, different shape: still equivalent
        let user_b = named_struct(
            "app",
            "User",
            vec![FieldDescriptor::new("name", PrimitiveKind::String)],
        );
        // Same shape, different name: not equivalent
        let account = named_struct(
            "app",
            "Account",
            vec![FieldDescriptor::new("id", PrimitiveKind::I64)],
        );
        let other_pkg = named_struct(
            "billing",
            "User",
            vec![FieldDescriptor::new("id", PrimitiveKind::I64)],
        );

        assert!(structurally_equivalent(&user_a, &user_b));
        assert!(!structurally_equivalent(&user_a, &account));
        assert!(!structurally_equivalent(&user_a, &other_pkg));
    }

    #[test]
    fn test_anonymous_structs_match_each_other() {
        let a = TypeDescriptor::struct_type(vec![FieldDescriptor::new("x", PrimitiveKind::U8)]);
        let b = TypeDescriptor::struct_type(vec![]);
        assert!(structurally_equivalent(&a, &b));
    }

    #[test]
    fn test_containers() {
        let seq_a = TypeDescriptor::sequence(TypeDescriptor::pointer(PrimitiveKind::I32));
        let seq_b = TypeDescriptor::sequence(TypeDescriptor::pointer(PrimitiveKind::I32));
        let seq_c = TypeDescriptor::sequence(PrimitiveKind::I32);
        assert!(structurally_equivalent(&seq_a, &seq_b));
        assert!(!structurally_equivalent(&seq_a, &seq_c));

        let map_a = TypeDescriptor::map(PrimitiveKind::String, PrimitiveKind::I32);
        let map_b = TypeDescriptor::map(PrimitiveKind::String, PrimitiveKind::I32);
        let map_key = TypeDescriptor::map(PrimitiveKind::I64, PrimitiveKind::I32);
        let map_val = TypeDescriptor::map(PrimitiveKind::String, PrimitiveKind::U32);
        assert!(structurally_equivalent(&map_a, &map_b));
        assert!(!structurally_equivalent(&map_a, &map_key));
        assert!(!structurally_equivalent(&map_a, &map_val));

        let arr_3 = TypeDescriptor::array(PrimitiveKind::U8, 3);
        let arr_4 = TypeDescriptor::array(PrimitiveKind::U8, 4);
        assert!(structurally_equivalent(&arr_3, &arr_3.clone()));
        assert!(!structurally_equivalent(&arr_3, &arr_4));
        assert!(!structurally_equivalent(
            &arr_3,
            &TypeDescriptor::sequence(PrimitiveKind::U8)
        ));
    }

    #[test]
    fn test_storable_checks_anonymous_layout() {
        let xy = TypeDescriptor::struct_type(vec![
            FieldDescriptor::new("x", PrimitiveKind::I32),
            FieldDescriptor::new("y", PrimitiveKind::I32),
        ]);
        let renamed = TypeDescriptor::struct_type(vec![
            FieldDescriptor::new("x", PrimitiveKind::I32),
            FieldDescriptor::new("z", PrimitiveKind::I32),
        ]);
        let retyped = TypeDescriptor::struct_type(vec![
            FieldDescriptor::new("x", PrimitiveKind::I32),
            FieldDescriptor::new("y", PrimitiveKind::String),
        ]);
        let short = TypeDescriptor::struct_type(vec![FieldDescriptor::new("x", PrimitiveKind::I32)]);

        // Equivalent for bulk-copy filtering, but not storable
        assert!(structurally_equivalent(&xy, &renamed));
        assert!(storable(&xy, &xy.clone()));
        assert!(!storable(&xy, &renamed));
        assert!(!storable(&xy, &retyped));
        assert!(!storable(&xy, &short));

        // Layout is checked through containers too
        assert!(!storable(
            &TypeDescriptor::sequence(xy.clone()),
            &TypeDescriptor::sequence(renamed)
        ));
        assert!(storable(
            &TypeDescriptor::pointer(xy.clone()),
            &TypeDescriptor::pointer(xy)
        ));
    }

    #[test]
    fn test_storable_keeps_nominal_structs() {
        let a = named_struct("app", "User", vec![FieldDescriptor::new("id", PrimitiveKind::I64)]);
        let b = named_struct("app", "User", vec![]);
        assert!(storable(&a, &b));
        assert!(!storable(&a, &TypeDescriptor::struct_type(vec![])));
    }

    #[test]
    fn test_interface() {
        let any = TypeDescriptor::interface();
        assert!(structurally_equivalent(&any, &TypeDescriptor::interface()));
        assert!(!structurally_equivalent(
            &any,
            &TypeDescriptor::primitive(PrimitiveKind::I32)
        ));
    }
}
