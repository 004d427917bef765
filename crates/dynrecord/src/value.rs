// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value types.
//!
//! Every [`DynamicValue`] carries enough information to recover its declared
//! type: containers remember their element/key/value descriptors even when
//! empty, pointers remember their target even when nil.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::equivalence::storable;
use crate::error::{AccessError, Result};
use crate::kind::{PrimitiveKind, TypeDescriptor, TypeKind};
use crate::record::DynamicData;

/// A dynamic value of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    // Primitives
    Bool(bool),
    Int(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Uint(usize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Time(DateTime<Utc>),

    // Composites
    Pointer(DynamicPointer),
    /// Growable sequence or fixed-length array.
    Sequence(DynamicSequence),
    Map(DynamicMap),
    Struct(DynamicData),

    /// Dynamically typed slot: some value of any type, or nothing.
    Interface(Option<Box<DynamicValue>>),
}

/// Zero value of a primitive kind.
fn zero_primitive(kind: PrimitiveKind) -> DynamicValue {
    match kind {
        PrimitiveKind::Bool => DynamicValue::Bool(false),
        PrimitiveKind::Int => DynamicValue::Int(0),
        PrimitiveKind::I8 => DynamicValue::I8(0),
        PrimitiveKind::I16 => DynamicValue::I16(0),
        PrimitiveKind::I32 => DynamicValue::I32(0),
        PrimitiveKind::I64 => DynamicValue::I64(0),
        PrimitiveKind::Uint => DynamicValue::Uint(0),
        PrimitiveKind::U8 => DynamicValue::U8(0),
        PrimitiveKind::U16 => DynamicValue::U16(0),
        PrimitiveKind::U32 => DynamicValue::U32(0),
        PrimitiveKind::U64 => DynamicValue::U64(0),
        PrimitiveKind::F32 => DynamicValue::F32(0.0),
        PrimitiveKind::F64 => DynamicValue::F64(0.0),
        PrimitiveKind::String => DynamicValue::String(String::new()),
        PrimitiveKind::Time => DynamicValue::Time(DateTime::<Utc>::default()),
    }
}

/// Fit `value` into a slot declared as `slot`.
///
/// Interface slots accept anything and wrap it. Every other slot requires a
/// structurally equivalent value, and anonymous records must also match the
/// slot's field layout.
pub(crate) fn coerce(slot: &TypeDescriptor, value: DynamicValue) -> Result<DynamicValue> {
    if slot.is_interface() {
        return Ok(match value {
            DynamicValue::Interface(_) => value,
            other => DynamicValue::Interface(Some(Box::new(other))),
        });
    }
    let found = value.type_descriptor();
    if storable(slot, &found) {
        Ok(value)
    } else {
        Err(AccessError::mismatch(slot, found))
    }
}

impl DynamicValue {
    /// Zero value of a declared type.
    ///
    /// Pointers are nil, containers are empty (arrays hold `length` zero
    /// elements), records hold zeroed fields, interfaces hold nothing.
    pub fn zero(ty: &Arc<TypeDescriptor>) -> Self {
        match &ty.kind {
            TypeKind::Primitive(kind) => zero_primitive(*kind),
            TypeKind::Pointer(target) => Self::Pointer(DynamicPointer::null(target.clone())),
            TypeKind::Sequence(element) => Self::Sequence(DynamicSequence::new(element.clone())),
            TypeKind::Array(array) => {
                Self::Sequence(DynamicSequence::array(array.element_type.clone(), array.length))
            }
            TypeKind::Map(map) => {
                Self::Map(DynamicMap::new(map.key_type.clone(), map.value_type.clone()))
            }
            TypeKind::Struct(_) => Self::Struct(DynamicData::new(ty)),
            TypeKind::Interface => Self::Interface(None),
        }
    }

    /// Declared type of this value.
    pub fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        if let Some(kind) = self.primitive_kind() {
            return Arc::new(TypeDescriptor::primitive(kind));
        }
        match self {
            Self::Pointer(p) => Arc::new(TypeDescriptor::pointer(p.target.clone())),
            Self::Sequence(s) => s.type_descriptor(),
            Self::Map(m) => m.type_descriptor(),
            Self::Struct(d) => d.descriptor().clone(),
            _ => Arc::new(TypeDescriptor::interface()),
        }
    }

    /// Primitive kind, if this is a primitive value.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Int(_) => PrimitiveKind::Int,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::Uint(_) => PrimitiveKind::Uint,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::String(_) => PrimitiveKind::String,
            Self::Time(_) => PrimitiveKind::Time,
            _ => return None,
        };
        Some(kind)
    }

    /// Nil pointer or empty interface.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Pointer(p) => p.is_null(),
            Self::Interface(inner) => inner.is_none(),
            _ => false,
        }
    }

    /// Look through one pointer or interface wrapper.
    ///
    /// Returns `None` when the wrapper is empty.
    pub fn indirect(&self) -> Option<&DynamicValue> {
        match self {
            Self::Pointer(p) => p.get(),
            Self::Interface(inner) => inner.as_deref(),
            other => Some(other),
        }
    }

    /// Owned variant of [`DynamicValue::indirect`].
    pub fn into_indirect(self) -> Option<DynamicValue> {
        match self {
            Self::Pointer(p) => p.value.map(|v| *v),
            Self::Interface(inner) => inner.map(|v| *v),
            other => Some(other),
        }
    }

    /// Replace this value, keeping its declared type.
    pub fn assign(&mut self, value: DynamicValue) -> Result<()> {
        let slot = self.type_descriptor();
        *self = coerce(&slot, value)?;
        Ok(())
    }

    /// Widen any signed integer to `i64`.
    pub fn as_signed(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v as i64),
            Self::I8(v) => Some(*v as i64),
            Self::I16(v) => Some(*v as i64),
            Self::I32(v) => Some(*v as i64),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any unsigned integer to `u64`.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v as u64),
            Self::U8(v) => Some(*v as u64),
            Self::U16(v) => Some(*v as u64),
            Self::U32(v) => Some(*v as u64),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any float to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(*v as f64),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Build a signed value of `kind`, truncating to its width.
    pub fn from_signed(kind: PrimitiveKind, v: i64) -> Option<Self> {
        let value = match kind {
            PrimitiveKind::Int => Self::Int(v as isize),
            PrimitiveKind::I8 => Self::I8(v as i8),
            PrimitiveKind::I16 => Self::I16(v as i16),
            PrimitiveKind::I32 => Self::I32(v as i32),
            PrimitiveKind::I64 => Self::I64(v),
            _ => return None,
        };
        Some(value)
    }

    /// Build an unsigned value of `kind`, truncating to its width.
    pub fn from_unsigned(kind: PrimitiveKind, v: u64) -> Option<Self> {
        let value = match kind {
            PrimitiveKind::Uint => Self::Uint(v as usize),
            PrimitiveKind::U8 => Self::U8(v as u8),
            PrimitiveKind::U16 => Self::U16(v as u16),
            PrimitiveKind::U32 => Self::U32(v as u32),
            PrimitiveKind::U64 => Self::U64(v),
            _ => return None,
        };
        Some(value)
    }

    /// Build a float value of `kind`.
    pub fn from_float(kind: PrimitiveKind, v: f64) -> Option<Self> {
        match kind {
            PrimitiveKind::F32 => Some(Self::F32(v as f32)),
            PrimitiveKind::F64 => Some(Self::F64(v)),
            _ => None,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as timestamp.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&DynamicData> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&DynamicSequence> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&DynamicMap> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get struct field.
    pub fn get_field(&self, name: &str) -> Option<&DynamicValue> {
        self.as_struct()?.get_field(name).ok()
    }
}

/// Nullable indirection that remembers its target type.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPointer {
    target: Arc<TypeDescriptor>,
    value: Option<Box<DynamicValue>>,
}

impl DynamicPointer {
    /// Nil pointer to `target`.
    pub fn null(target: Arc<TypeDescriptor>) -> Self {
        Self {
            target,
            value: None,
        }
    }

    /// Pointer to `value`, typed by the value itself.
    pub fn to(value: impl Into<DynamicValue>) -> Self {
        let value = value.into();
        Self {
            target: value.type_descriptor(),
            value: Some(Box::new(value)),
        }
    }

    /// Pointer to `target` holding `value`, checked for equivalence.
    pub fn new(target: Arc<TypeDescriptor>, value: Option<DynamicValue>) -> Result<Self> {
        let value = match value {
            Some(v) => Some(Box::new(coerce(&target, v)?)),
            None => None,
        };
        Ok(Self { target, value })
    }

    pub(crate) fn from_parts(target: Arc<TypeDescriptor>, value: Option<DynamicValue>) -> Self {
        Self {
            target,
            value: value.map(Box::new),
        }
    }

    pub(crate) fn into_inner(self) -> (Arc<TypeDescriptor>, Option<DynamicValue>) {
        (self.target, self.value.map(|v| *v))
    }

    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Pointee, or `None` when nil.
    pub fn get(&self) -> Option<&DynamicValue> {
        self.value.as_deref()
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut DynamicValue> {
        self.value.as_deref_mut()
    }
}

/// Ordered elements of one declared type.
///
/// Arrays are sequences with a fixed length: they start with `length` zero
/// elements and refuse to grow.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicSequence {
    element_type: Arc<TypeDescriptor>,
    length: Option<usize>,
    items: Vec<DynamicValue>,
}

impl DynamicSequence {
    /// Empty growable sequence of `element_type`.
    pub fn new(element_type: Arc<TypeDescriptor>) -> Self {
        Self {
            element_type,
            length: None,
            items: Vec::new(),
        }
    }

    /// Fixed-length array of zero elements.
    pub fn array(element_type: Arc<TypeDescriptor>, length: usize) -> Self {
        let items = (0..length)
            .map(|_| DynamicValue::zero(&element_type))
            .collect();
        Self {
            element_type,
            length: Some(length),
            items,
        }
    }

    pub(crate) fn from_parts(
        element_type: Arc<TypeDescriptor>,
        length: Option<usize>,
        items: Vec<DynamicValue>,
    ) -> Self {
        Self {
            element_type,
            length,
            items,
        }
    }

    pub(crate) fn into_items(self) -> Vec<DynamicValue> {
        self.items
    }

    pub fn element_type(&self) -> &Arc<TypeDescriptor> {
        &self.element_type
    }

    pub fn is_array(&self) -> bool {
        self.length.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DynamicValue] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [DynamicValue] {
        &mut self.items
    }

    pub fn get(&self, index: usize) -> Option<&DynamicValue> {
        self.items.get(index)
    }

    /// Append an element. Fails on arrays and on non-equivalent values.
    pub fn push(&mut self, value: impl Into<DynamicValue>) -> Result<()> {
        if let Some(length) = self.length {
            return Err(AccessError::FixedLength { length });
        }
        let value = coerce(&self.element_type, value.into())?;
        self.items.push(value);
        Ok(())
    }

    /// Replace the element at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<DynamicValue>) -> Result<()> {
        let length = self.items.len();
        let value = coerce(&self.element_type, value.into())?;
        let slot = self
            .items
            .get_mut(index)
            .ok_or(AccessError::IndexOutOfBounds { index, length })?;
        *slot = value;
        Ok(())
    }

    /// Declared type: `Vec<T>` or `[T; N]`.
    pub fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        let ty = match self.length {
            Some(length) => TypeDescriptor::array(self.element_type.clone(), length),
            None => TypeDescriptor::sequence(self.element_type.clone()),
        };
        Arc::new(ty)
    }
}

/// Hashable map key.
///
/// Floats are not representable: maps keyed by them are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Bool(bool),
    Int(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Uint(usize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    String(String),
    Time(DateTime<Utc>),
}

impl MapKey {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Int(_) => PrimitiveKind::Int,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::Uint(_) => PrimitiveKind::Uint,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::String(_) => PrimitiveKind::String,
            Self::Time(_) => PrimitiveKind::Time,
        }
    }

    pub fn into_value(self) -> DynamicValue {
        match self {
            Self::Bool(v) => DynamicValue::Bool(v),
            Self::Int(v) => DynamicValue::Int(v),
            Self::I8(v) => DynamicValue::I8(v),
            Self::I16(v) => DynamicValue::I16(v),
            Self::I32(v) => DynamicValue::I32(v),
            Self::I64(v) => DynamicValue::I64(v),
            Self::Uint(v) => DynamicValue::Uint(v),
            Self::U8(v) => DynamicValue::U8(v),
            Self::U16(v) => DynamicValue::U16(v),
            Self::U32(v) => DynamicValue::U32(v),
            Self::U64(v) => DynamicValue::U64(v),
            Self::String(v) => DynamicValue::String(v),
            Self::Time(v) => DynamicValue::Time(v),
        }
    }
}

impl TryFrom<DynamicValue> for MapKey {
    type Error = AccessError;

    fn try_from(value: DynamicValue) -> Result<Self> {
        let key = match value {
            DynamicValue::Bool(v) => Self::Bool(v),
            DynamicValue::Int(v) => Self::Int(v),
            DynamicValue::I8(v) => Self::I8(v),
            DynamicValue::I16(v) => Self::I16(v),
            DynamicValue::I32(v) => Self::I32(v),
            DynamicValue::I64(v) => Self::I64(v),
            DynamicValue::Uint(v) => Self::Uint(v),
            DynamicValue::U8(v) => Self::U8(v),
            DynamicValue::U16(v) => Self::U16(v),
            DynamicValue::U32(v) => Self::U32(v),
            DynamicValue::U64(v) => Self::U64(v),
            DynamicValue::String(v) => Self::String(v),
            DynamicValue::Time(v) => Self::Time(v),
            other => return Err(AccessError::InvalidKey(other.type_descriptor().to_string())),
        };
        Ok(key)
    }
}

/// Key to value mapping that remembers both declared types.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMap {
    key_type: Arc<TypeDescriptor>,
    value_type: Arc<TypeDescriptor>,
    entries: HashMap<MapKey, DynamicValue>,
}

impl DynamicMap {
    /// Empty map from `key_type` to `value_type`.
    pub fn new(key_type: Arc<TypeDescriptor>, value_type: Arc<TypeDescriptor>) -> Self {
        Self {
            key_type,
            value_type,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(
        key_type: Arc<TypeDescriptor>,
        value_type: Arc<TypeDescriptor>,
        entries: HashMap<MapKey, DynamicValue>,
    ) -> Self {
        Self {
            key_type,
            value_type,
            entries,
        }
    }

    pub(crate) fn into_entries(self) -> HashMap<MapKey, DynamicValue> {
        self.entries
    }

    pub fn key_type(&self) -> &Arc<TypeDescriptor> {
        &self.key_type
    }

    pub fn value_type(&self) -> &Arc<TypeDescriptor> {
        &self.value_type
    }

    /// Insert an entry, returning the previous value for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<MapKey>,
        value: impl Into<DynamicValue>,
    ) -> Result<Option<DynamicValue>> {
        let key = key.into();
        if self.key_type.primitive_kind() != Some(key.kind()) {
            return Err(AccessError::InvalidKey(format!(
                "{} for map keyed by {}",
                key.kind(),
                self.key_type
            )));
        }
        let value = coerce(&self.value_type, value.into())?;
        Ok(self.entries.insert(key, value))
    }

    pub fn get(&self, key: &MapKey) -> Option<&DynamicValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &MapKey) -> Option<DynamicValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &DynamicValue)> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&MapKey, &mut DynamicValue)> {
        self.entries.iter_mut()
    }

    /// Declared type: `HashMap<K, V>`.
    pub fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::map(
            self.key_type.clone(),
            self.value_type.clone(),
        ))
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

macro_rules! impl_key_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MapKey {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_scalar_from! {
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
    DynamicPointer => Pointer,
    DynamicSequence => Sequence,
    DynamicMap => Map,
    DynamicData => Struct,
}

impl_key_from! {
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

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}
