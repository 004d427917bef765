// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime reflection over declared and runtime-built values.
//!
//! [`Reflect`] is the object-safe view the accessor works against. Declared
//! Rust types also implement [`Typed`], which adds a static descriptor and
//! a fallible conversion back from [`DynamicValue`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use crate::equivalence::structurally_equivalent;
use crate::error::{AccessError, Result};
use crate::kind::{PrimitiveKind, TypeDescriptor};
use crate::record::DynamicData;
use crate::value::{coerce, DynamicMap, DynamicPointer, DynamicSequence, DynamicValue, MapKey};

/// A value whose type is known at runtime.
///
/// Only `type_descriptor`, `as_dynamic` and `assign` are required. The
/// remaining hooks expose the structure of composite values and default to
/// `None`.
pub trait Reflect: fmt::Debug {
    /// Declared type of the value.
    fn type_descriptor(&self) -> Arc<TypeDescriptor>;

    /// The value as a [`DynamicValue`], borrowed when already dynamic.
    fn as_dynamic(&self) -> Cow<'_, DynamicValue>;

    /// Replace the value. Fails unless `value` is equivalent to the declared
    /// type.
    fn assign(&mut self, value: DynamicValue) -> Result<()>;

    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }

    /// Target of a non-nil pointer or of a filled interface.
    fn pointee(&self) -> Option<&dyn Reflect> {
        None
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    /// Elements of a sequence or array.
    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        None
    }

    fn elements_mut(&mut self) -> Option<Vec<&mut dyn Reflect>> {
        None
    }

    /// Entries of a map.
    fn entries(&self) -> Option<Vec<(MapKey, &dyn Reflect)>> {
        None
    }

    fn entries_mut(&mut self) -> Option<Vec<(MapKey, &mut dyn Reflect)>> {
        None
    }
}

/// Rust types with a descriptor known at compile time.
pub trait Typed: Reflect + Sized {
    /// Descriptor shared by every value of the type.
    fn static_type() -> Arc<TypeDescriptor>;

    /// Convert back from a dynamic value of an equivalent type.
    fn from_dynamic(value: DynamicValue) -> Result<Self>;
}

/// Types usable as `HashMap` keys.
pub trait KeyType: Typed + Eq + Hash {
    fn to_key(&self) -> MapKey;
    fn from_key(key: MapKey) -> Result<Self>;
}

/// Records: values with ordered, indexable fields.
pub trait Record: fmt::Debug {
    fn record_type(&self) -> Arc<TypeDescriptor>;

    /// Field at declaration position `index`.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Descriptor of `T`.
pub fn type_of<T: Typed>() -> Arc<TypeDescriptor> {
    T::static_type()
}

macro_rules! impl_reflect_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_descriptor(&self) -> Arc<TypeDescriptor> {
                    <$ty as Typed>::static_type()
                }

                fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
                    Cow::Owned(DynamicValue::$variant(self.clone()))
                }

                fn assign(&mut self, value: DynamicValue) -> Result<()> {
                    *self = <$ty as Typed>::from_dynamic(value)?;
                    Ok(())
                }
            }

            impl Typed for $ty {
                fn static_type() -> Arc<TypeDescriptor> {
                    static TYPE: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
                    TYPE.get_or_init(|| PrimitiveKind::$variant.into()).clone()
                }

                fn from_dynamic(value: DynamicValue) -> Result<Self> {
                    match value {
                        DynamicValue::$variant(v) => Ok(v),
                        other => Err(AccessError::mismatch(
                            PrimitiveKind::$variant,
                            other.type_descriptor(),
                        )),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_key_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl KeyType for $ty {
                fn to_key(&self) -> MapKey {
                    MapKey::$variant(self.clone())
                }

                fn from_key(key: MapKey) -> Result<Self> {
                    match key {
                        MapKey::$variant(v) => Ok(v),
                        other => Err(AccessError::InvalidKey(format!(
                            "{} for map keyed by {}",
                            other.kind(),
                            PrimitiveKind::$variant
                        ))),
                    }
                }
            }
        )*
    };
}

impl_reflect_primitive! {
    bool => Bool,
    isize => Int,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    usize => Uint,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    DateTime<Utc> => Time,
}

impl_key_type! {
    bool => Bool,
    isize => Int,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    usize => Uint,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    String => String,
    DateTime<Utc> => Time,
}

// Option<T> is the nullable pointer
impl<T: Typed> Reflect for Option<T> {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Self::static_type()
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        let value = self.as_ref().map(|v| v.as_dynamic().into_owned());
        Cow::Owned(DynamicValue::Pointer(DynamicPointer::from_parts(
            T::static_type(),
            value,
        )))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        *self = Self::from_dynamic(value)?;
        Ok(())
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }
}

impl<T: Typed> Typed for Option<T> {
    fn static_type() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::pointer(T::static_type()))
    }

    fn from_dynamic(value: DynamicValue) -> Result<Self> {
        let target = T::static_type();
        match value {
            DynamicValue::Pointer(p) if structurally_equivalent(&target, p.target()) => {
                match p.into_inner().1 {
                    Some(v) => Ok(Some(T::from_dynamic(v)?)),
                    None => Ok(None),
                }
            }
            other => Err(AccessError::mismatch(
                TypeDescriptor::pointer(target),
                other.type_descriptor(),
            )),
        }
    }
}

impl<T: Typed> Reflect for Vec<T> {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Self::static_type()
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        let items = self.iter().map(|v| v.as_dynamic().into_owned()).collect();
        Cow::Owned(DynamicValue::Sequence(DynamicSequence::from_parts(
            T::static_type(),
            None,
            items,
        )))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        *self = Self::from_dynamic(value)?;
        Ok(())
    }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        Some(self.iter().map(|v| v as &dyn Reflect).collect())
    }

    fn elements_mut(&mut self) -> Option<Vec<&mut dyn Reflect>> {
        Some(self.iter_mut().map(|v| v as &mut dyn Reflect).collect())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn static_type() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::sequence(T::static_type()))
    }

    fn from_dynamic(value: DynamicValue) -> Result<Self> {
        let expected = Self::static_type();
        match value {
            DynamicValue::Sequence(s) if structurally_equivalent(&expected, &s.type_descriptor()) => {
                s.into_items().into_iter().map(T::from_dynamic).collect()
            }
            other => Err(AccessError::mismatch(expected, other.type_descriptor())),
        }
    }
}

impl<T: Typed, const N: usize> Reflect for [T; N] {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Self::static_type()
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        let items = self.iter().map(|v| v.as_dynamic().into_owned()).collect();
        Cow::Owned(DynamicValue::Sequence(DynamicSequence::from_parts(
            T::static_type(),
            Some(N),
            items,
        )))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        *self = Self::from_dynamic(value)?;
        Ok(())
    }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        Some(self.iter().map(|v| v as &dyn Reflect).collect())
    }

    fn elements_mut(&mut self) -> Option<Vec<&mut dyn Reflect>> {
        Some(self.iter_mut().map(|v| v as &mut dyn Reflect).collect())
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn static_type() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::array(T::static_type(), N))
    }

    fn from_dynamic(value: DynamicValue) -> Result<Self> {
        let expected = Self::static_type();
        match value {
            DynamicValue::Sequence(s) if structurally_equivalent(&expected, &s.type_descriptor()) => {
                let found = s.type_descriptor();
                let items = s
                    .into_items()
                    .into_iter()
                    .map(T::from_dynamic)
                    .collect::<Result<Vec<T>>>()?;
                items
                    .try_into()
                    .map_err(|_| AccessError::mismatch(&expected, found))
            }
            other => Err(AccessError::mismatch(expected, other.type_descriptor())),
        }
    }
}

impl<K: KeyType, V: Typed> Reflect for HashMap<K, V> {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Self::static_type()
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        let entries = self
            .iter()
            .map(|(k, v)| (k.to_key(), v.as_dynamic().into_owned()))
            .collect();
        Cow::Owned(DynamicValue::Map(DynamicMap::from_parts(
            K::static_type(),
            V::static_type(),
            entries,
        )))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        *self = Self::from_dynamic(value)?;
        Ok(())
    }

    fn entries(&self) -> Option<Vec<(MapKey, &dyn Reflect)>> {
        Some(
            self.iter()
                .map(|(k, v)| (k.to_key(), v as &dyn Reflect))
                .collect(),
        )
    }

    fn entries_mut(&mut self) -> Option<Vec<(MapKey, &mut dyn Reflect)>> {
        Some(
            self.iter_mut()
                .map(|(k, v)| (k.to_key(), v as &mut dyn Reflect))
                .collect(),
        )
    }
}

impl<K: KeyType, V: Typed> Typed for HashMap<K, V> {
    fn static_type() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::map(K::static_type(), V::static_type()))
    }

    fn from_dynamic(value: DynamicValue) -> Result<Self> {
        let expected = Self::static_type();
        match value {
            DynamicValue::Map(m) if structurally_equivalent(&expected, &m.type_descriptor()) => m
                .into_entries()
                .into_iter()
                .map(|(k, v)| -> Result<(K, V)> { Ok((K::from_key(k)?, V::from_dynamic(v)?)) })
                .collect(),
            other => Err(AccessError::mismatch(expected, other.type_descriptor())),
        }
    }
}

// Runtime values describe themselves.

impl Reflect for DynamicValue {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        DynamicValue::type_descriptor(self)
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        Cow::Borrowed(self)
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        DynamicValue::assign(self, value)
    }

    fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Self::Struct(data) => Some(data),
            _ => None,
        }
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        match self {
            Self::Struct(data) => Some(data),
            _ => None,
        }
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        match self {
            Self::Pointer(p) => p.get().map(|v| v as &dyn Reflect),
            Self::Interface(inner) => inner.as_deref().map(|v| v as &dyn Reflect),
            _ => None,
        }
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        match self {
            Self::Pointer(p) => p.get_mut().map(|v| v as &mut dyn Reflect),
            Self::Interface(inner) => inner.as_deref_mut().map(|v| v as &mut dyn Reflect),
            _ => None,
        }
    }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        match self {
            Self::Sequence(s) => s.elements(),
            _ => None,
        }
    }

    fn elements_mut(&mut self) -> Option<Vec<&mut dyn Reflect>> {
        match self {
            Self::Sequence(s) => s.elements_mut(),
            _ => None,
        }
    }

    fn entries(&self) -> Option<Vec<(MapKey, &dyn Reflect)>> {
        match self {
            Self::Map(m) => m.entries(),
            _ => None,
        }
    }

    fn entries_mut(&mut self) -> Option<Vec<(MapKey, &mut dyn Reflect)>> {
        match self {
            Self::Map(m) => m.entries_mut(),
            _ => None,
        }
    }
}

impl Reflect for DynamicData {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        self.descriptor().clone()
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        Cow::Owned(DynamicValue::Struct(self.clone()))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        match coerce(self.descriptor(), value)? {
            DynamicValue::Struct(data) => {
                *self = data;
                Ok(())
            }
            other => Err(AccessError::mismatch(
                self.descriptor(),
                other.type_descriptor(),
            )),
        }
    }

    fn as_record(&self) -> Option<&dyn Record> {
        Some(self)
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        Some(self)
    }
}

impl Record for DynamicData {
    fn record_type(&self) -> Arc<TypeDescriptor> {
        self.descriptor().clone()
    }

    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        self.slot(index).map(|v| v as &dyn Reflect)
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.slot_mut(index).map(|v| v as &mut dyn Reflect)
    }
}

impl Reflect for DynamicSequence {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        DynamicSequence::type_descriptor(self)
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        Cow::Owned(DynamicValue::Sequence(self.clone()))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        match coerce(&DynamicSequence::type_descriptor(self), value)? {
            DynamicValue::Sequence(seq) => {
                *self = seq;
                Ok(())
            }
            other => Err(AccessError::mismatch(
                DynamicSequence::type_descriptor(self),
                other.type_descriptor(),
            )),
        }
    }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        Some(self.items().iter().map(|v| v as &dyn Reflect).collect())
    }

    fn elements_mut(&mut self) -> Option<Vec<&mut dyn Reflect>> {
        Some(
            self.items_mut()
                .iter_mut()
                .map(|v| v as &mut dyn Reflect)
                .collect(),
        )
    }
}

impl Reflect for DynamicMap {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        DynamicMap::type_descriptor(self)
    }

    fn as_dynamic(&self) -> Cow<'_, DynamicValue> {
        Cow::Owned(DynamicValue::Map(self.clone()))
    }

    fn assign(&mut self, value: DynamicValue) -> Result<()> {
        match coerce(&DynamicMap::type_descriptor(self), value)? {
            DynamicValue::Map(map) => {
                *self = map;
                Ok(())
            }
            other => Err(AccessError::mismatch(
                DynamicMap::type_descriptor(self),
                other.type_descriptor(),
            )),
        }
    }

    fn entries(&self) -> Option<Vec<(MapKey, &dyn Reflect)>> {
        Some(
            self.iter()
                .map(|(k, v)| (k.clone(), v as &dyn Reflect))
                .collect(),
        )
    }

    fn entries_mut(&mut self) -> Option<Vec<(MapKey, &mut dyn Reflect)>> {
        Some(
            self.iter_mut()
                .map(|(k, v)| (k.clone(), v as &mut dyn Reflect))
                .collect(),
        )
    }
}
