// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record instances: runtime-built [`DynamicData`] and the [`record!`] macro
//! for declared structs.

use std::fmt;
use std::sync::Arc;

use crate::error::{AccessError, Result};
use crate::kind::{FieldDescriptor, TypeDescriptor};
use crate::reflect::Typed;
use crate::value::{coerce, DynamicValue};

/// Record instance with runtime type checking.
///
/// Slots are stored in field declaration order, so records with duplicate
/// field names keep every slot. Name lookups resolve to the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicData {
    /// Type descriptor.
    descriptor: Arc<TypeDescriptor>,
    /// One value per declared field.
    slots: Vec<DynamicValue>,
}

impl DynamicData {
    /// Create a record with every field at its zero value.
    ///
    /// A non-struct descriptor yields a record with no fields.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        let slots = descriptor
            .fields()
            .unwrap_or_default()
            .iter()
            .map(|f| DynamicValue::zero(&f.type_desc))
            .collect();
        Self {
            descriptor: descriptor.clone(),
            slots,
        }
    }

    /// Create from one value per field, in declaration order.
    pub fn from_values(descriptor: &Arc<TypeDescriptor>, values: Vec<DynamicValue>) -> Result<Self> {
        let fields = descriptor
            .fields()
            .ok_or_else(|| AccessError::NotAStruct(descriptor.to_string()))?;
        if fields.len() != values.len() {
            return Err(AccessError::mismatch(
                format!("{} field values", fields.len()),
                values.len(),
            ));
        }
        let slots = fields
            .iter()
            .zip(values)
            .map(|(field, value)| coerce(&field.type_desc, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            descriptor: descriptor.clone(),
            slots,
        })
    }

    /// Like [`DynamicData::from_values`], falling back to a zeroed record
    /// with a warning when the values do not fit.
    #[doc(hidden)]
    pub fn from_declared(descriptor: &Arc<TypeDescriptor>, values: Vec<DynamicValue>) -> Self {
        match Self::from_values(descriptor, values) {
            Ok(data) => data,
            Err(err) => {
                warn!("{}: field values do not fit, using zero values: {}", descriptor, err);
                Self::new(descriptor)
            }
        }
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Get the type name. Empty for runtime-built records.
    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    fn field_descriptors(&self) -> &[FieldDescriptor] {
        self.descriptor.fields().unwrap_or_default()
    }

    /// Get a field value by name.
    pub fn get<T: Typed>(&self, name: &str) -> Result<T> {
        let field_value = self.get_field(name)?;
        T::from_dynamic(field_value.clone())
    }

    /// Set a field value by name.
    pub fn set(&mut self, name: &str, value: impl Into<DynamicValue>) -> Result<()> {
        let index = self
            .descriptor
            .field_index(name)
            .ok_or_else(|| AccessError::FieldNotFound(name.to_string()))?;
        let declared = &self.field_descriptors()[index].type_desc;
        let value = coerce(declared, value.into())?;
        self.slots[index] = value;
        Ok(())
    }

    /// Get field by name.
    pub fn get_field(&self, name: &str) -> Result<&DynamicValue> {
        self.descriptor
            .field_index(name)
            .and_then(|i| self.slots.get(i))
            .ok_or_else(|| AccessError::FieldNotFound(name.to_string()))
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        self.field_descriptors()
            .iter()
            .zip(&self.slots)
            .map(|(f, v)| (f.name.as_str(), v))
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&DynamicValue> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut DynamicValue> {
        self.slots.get_mut(index)
    }
}

impl fmt::Display for DynamicData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{name}: {value:?}")?;
        }
        if self.slots.is_empty() {
            f.write_str("}")
        } else {
            f.write_str(" }")
        }
    }
}

/// Declare a struct whose fields are visible to the accessor.
///
/// ```
/// dynrecord::record! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Account in "billing" {
///         pub id: i64 = "json:\"id\"",
///         pub owner: String,
///         pub limit: Option<f64>,
///         balance: i64,
///     }
/// }
///
/// use dynrecord::{Accessor, FieldRead};
///
/// let account = Account { id: 7, ..Default::default() };
/// let accessor = Accessor::new(&account);
/// assert_eq!(accessor.field("id").map(|f| f.int64()), Some(7));
/// assert_eq!(accessor.field("id").map(|f| f.tag().to_string()), Some("json:\"id\"".into()));
/// ```
///
/// The string after `in` is the declaring package. Together with the struct
/// name it is the nominal identity compared by
/// [`structurally_equivalent`](crate::structurally_equivalent). Fields
/// without `pub` are recorded as unexported and are never written by
/// `to_struct`. An optional string literal after `=` becomes the field tag.
/// Every field type must implement [`Typed`](crate::Typed).
#[macro_export]
macro_rules! record {
    (@tag) => { "" };
    (@tag $tag:literal) => { $tag };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $package:literal {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(= $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Typed for $name {
            fn static_type() -> ::std::sync::Arc<$crate::TypeDescriptor> {
                static TYPE: ::std::sync::OnceLock<::std::sync::Arc<$crate::TypeDescriptor>> =
                    ::std::sync::OnceLock::new();
                TYPE.get_or_init(|| {
                    let fields: ::std::vec::Vec<$crate::FieldDescriptor> = ::std::vec![
                        $(
                            {
                                let field = $crate::FieldDescriptor::new(
                                    stringify!($field),
                                    <$fty as $crate::Typed>::static_type(),
                                )
                                .with_tag($crate::record!(@tag $($tag)?));
                                if stringify!($fvis).is_empty() {
                                    field.with_package($package)
                                } else {
                                    field
                                }
                            }
                        ),*
                    ];
                    ::std::sync::Arc::new($crate::TypeDescriptor::named(
                        $package,
                        stringify!($name),
                        $crate::TypeKind::Struct(fields),
                    ))
                })
                .clone()
            }

            fn from_dynamic(value: $crate::DynamicValue) -> $crate::Result<Self> {
                let ty = <Self as $crate::Typed>::static_type();
                let data = match value {
                    $crate::DynamicValue::Struct(data)
                        if $crate::structurally_equivalent(&ty, data.descriptor()) => data,
                    other => return Err($crate::AccessError::mismatch(&ty, other.type_descriptor())),
                };
                Ok(Self {
                    $(
                        $field: match data.get_field(stringify!($field)) {
                            Ok(v) => <$fty as $crate::Typed>::from_dynamic(v.clone())?,
                            Err(_) => <$fty as $crate::Typed>::from_dynamic($crate::DynamicValue::zero(
                                &<$fty as $crate::Typed>::static_type(),
                            ))?,
                        },
                    )*
                })
            }
        }

        impl $crate::Reflect for $name {
            fn type_descriptor(&self) -> ::std::sync::Arc<$crate::TypeDescriptor> {
                <Self as $crate::Typed>::static_type()
            }

            fn as_dynamic(&self) -> ::std::borrow::Cow<'_, $crate::DynamicValue> {
                let values: ::std::vec::Vec<$crate::DynamicValue> = ::std::vec![
                    $($crate::Reflect::as_dynamic(&self.$field).into_owned()),*
                ];
                let data = $crate::DynamicData::from_declared(&<Self as $crate::Typed>::static_type(), values);
                ::std::borrow::Cow::Owned($crate::DynamicValue::Struct(data))
            }

            fn assign(&mut self, value: $crate::DynamicValue) -> $crate::Result<()> {
                *self = <Self as $crate::Typed>::from_dynamic(value)?;
                Ok(())
            }

            fn as_record(&self) -> Option<&dyn $crate::Record> {
                Some(self)
            }

            fn as_record_mut(&mut self) -> Option<&mut dyn $crate::Record> {
                Some(self)
            }
        }

        impl $crate::Record for $name {
            fn record_type(&self) -> ::std::sync::Arc<$crate::TypeDescriptor> {
                <Self as $crate::Typed>::static_type()
            }

            #[allow(unused_variables)]
            fn field(&self, index: usize) -> Option<&dyn $crate::Reflect> {
                let slots: ::std::vec::Vec<&dyn $crate::Reflect> = ::std::vec![
                    $(&self.$field as &dyn $crate::Reflect),*
                ];
                slots.into_iter().nth(index)
            }

            #[allow(unused_variables)]
            fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::Reflect> {
                let slots: ::std::vec::Vec<&mut dyn $crate::Reflect> = ::std::vec![
                    $(&mut self.$field as &mut dyn $crate::Reflect),*
                ];
                slots.into_iter().nth(index)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PrimitiveKind;
    use crate::reflect::{Record, Reflect};

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Point in "geometry" {
            pub x: i32 = "json:\"x\"",
            pub y: i32,
            label: String,
        }
    }

    fn anon(fields: Vec<FieldDescriptor>) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::struct_type(fields))
    }

    #[test]
    fn test_new_zeroes_fields() {
        let ty = anon(vec![
            FieldDescriptor::new("n", PrimitiveKind::U32),
            FieldDescriptor::new("s", PrimitiveKind::String),
        ]);
        let data = DynamicData::new(&ty);
        assert_eq!(data.field_count(), 2);
        assert_eq!(data.get::<u32>("n"), Ok(0));
        assert_eq!(data.get::<String>("s"), Ok(String::new()));
        assert_eq!(data.type_name(), "");
    }

    #[test]
    fn test_set_checks_declared_type() {
        let ty = anon(vec![FieldDescriptor::new("n", PrimitiveKind::U32)]);
        let mut data = DynamicData::new(&ty);
        data.set("n", 5u32).expect("same kind");
        assert_eq!(data.get::<u32>("n"), Ok(5));
        assert!(matches!(
            data.set("n", 5i64),
            Err(AccessError::TypeMismatch { .. })
        ));
        assert_eq!(
            data.set("missing", 1u32),
            Err(AccessError::FieldNotFound("missing".into()))
        );
    }

    #[test]
    fn test_duplicate_names_keep_every_slot() {
        let ty = anon(vec![
            FieldDescriptor::new("a", PrimitiveKind::I32),
            FieldDescriptor::new("a", PrimitiveKind::String),
        ]);
        let mut data = DynamicData::new(&ty);
        assert_eq!(data.field_count(), 2);
        data.set("a", "last").expect("last declaration wins");
        let names: Vec<_> = data.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "a"]);
        assert_eq!(data.slot(0), Some(&DynamicValue::I32(0)));
    }

    #[test]
    fn test_from_values_validates() {
        let ty = anon(vec![FieldDescriptor::new("flag", PrimitiveKind::Bool)]);
        assert!(DynamicData::from_values(&ty, vec![DynamicValue::Bool(true)]).is_ok());
        assert!(DynamicData::from_values(&ty, vec![DynamicValue::I8(1)]).is_err());
        assert!(DynamicData::from_values(&ty, vec![]).is_err());
    }

    #[test]
    fn test_from_declared_falls_back_to_zero() {
        let ty = Point::static_type();
        let values = vec![
            DynamicValue::I32(3),
            DynamicValue::I32(4),
            DynamicValue::String("p".into()),
        ];
        let data = DynamicData::from_declared(&ty, values);
        assert_eq!(data.get::<i32>("y"), Ok(4));

        let wrong = vec![
            DynamicValue::String("x".into()),
            DynamicValue::I32(4),
            DynamicValue::String("p".into()),
        ];
        let data = DynamicData::from_declared(&ty, wrong);
        assert!(Arc::ptr_eq(data.descriptor(), &ty));
        assert_eq!(data.get::<i32>("y"), Ok(0));
        assert_eq!(data.get::<String>("label"), Ok(String::new()));

        let data = DynamicData::from_declared(&ty, vec![]);
        assert_eq!(data.field_count(), 3);
    }

    #[test]
    fn test_record_macro_type() {
        let ty = Point::static_type();
        assert_eq!(ty.to_string(), "geometry::Point");
        let fields = ty.fields().expect("struct");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].tag, "json:\"x\"");
        assert!(fields[1].is_exported());
        assert!(!fields[2].is_exported());
        assert_eq!(fields[2].package, "geometry");
        // Cached
        assert!(Arc::ptr_eq(&ty, &Point::static_type()));
    }

    #[test]
    fn test_record_macro_round_trip() {
        let p = Point {
            x: 1,
            y: -2,
            label: "origin".into(),
        };
        let value = p.as_dynamic().into_owned();
        assert_eq!(value.get_field("y"), Some(&DynamicValue::I32(-2)));
        assert_eq!(Point::from_dynamic(value), Ok(p.clone()));

        let mut q = Point::default();
        let slot = q.field_mut(0).expect("x");
        slot.assign(DynamicValue::I32(9)).expect("assign");
        assert_eq!(q.x, 9);
        assert!(q.field(3).is_none());
    }
}
