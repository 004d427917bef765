// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name-based field access over any [`Reflect`] value.
//!
//! [`Accessor`] reads, [`AccessorMut`] reads and writes. Both look through
//! one level of pointer (`Option<T>`) or interface and index the top-level
//! fields of the record behind it. Non-record values get an accessor with no fields that
//! can still fan out over sequences and maps.
//!
//! Typed readers (`int32()`, `string()`, ...) treat a kind mismatch as a
//! programming error and panic with the field name. Everything else reports
//! an [`AccessError`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::equivalence::structurally_equivalent;
use crate::error::{AccessError, Result};
use crate::kind::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::reflect::{Record, Reflect, Typed};
use crate::value::{DynamicPointer, DynamicValue, MapKey};

fn is_wrapper(ty: &TypeDescriptor) -> bool {
    ty.is_pointer() || ty.is_interface()
}

/// Look through one pointer or interface level. `None` when it is empty.
fn indirect(value: &dyn Reflect) -> Option<&dyn Reflect> {
    if is_wrapper(&value.type_descriptor()) {
        value.pointee()
    } else {
        Some(value)
    }
}

fn indirect_mut(value: &mut dyn Reflect) -> Option<&mut dyn Reflect> {
    if is_wrapper(&value.type_descriptor()) {
        value.pointee_mut()
    } else {
        Some(value)
    }
}

/// Map each field name to its position. Later duplicates shadow earlier ones.
fn index_fields(ty: &TypeDescriptor) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, field) in ty.fields().unwrap_or_default().iter().enumerate() {
        if let Some(shadowed) = index.insert(field.name.clone(), i) {
            trace!("field {:?} at {} shadows position {}", field.name, i, shadowed);
        }
    }
    index
}

/// Record type and field index of the value behind one wrapper level.
fn inspect(value: &dyn Reflect) -> (Option<Arc<TypeDescriptor>>, HashMap<String, usize>) {
    match indirect(value).and_then(|target| target.as_record()) {
        Some(record) => {
            let ty = record.record_type();
            let index = index_fields(&ty);
            (Some(ty), index)
        }
        None => (None, HashMap::new()),
    }
}

fn lookup<'r>(
    record_type: &'r Option<Arc<TypeDescriptor>>,
    index: &HashMap<String, usize>,
    name: &str,
) -> Option<(usize, &'r FieldDescriptor)> {
    let position = *index.get(name)?;
    let descriptor = record_type.as_ref()?.fields()?.get(position)?;
    Some((position, descriptor))
}

/// Visible fields in declaration order: shadowed duplicates are skipped.
fn visible_fields<'r>(
    record_type: &'r Option<Arc<TypeDescriptor>>,
    index: &'r HashMap<String, usize>,
) -> impl Iterator<Item = (usize, &'r FieldDescriptor)> + 'r {
    record_type
        .as_ref()
        .and_then(|ty| ty.fields())
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter(move |(i, field)| index.get(&field.name) == Some(i))
}

/// Copy exported, same-name, equivalent fields from `source` into `dest`.
fn copy_fields(
    source: Option<&dyn Record>,
    index: &HashMap<String, usize>,
    dest: &mut dyn Reflect,
) -> Result<()> {
    let dest_type = dest.type_descriptor();
    let record = if is_wrapper(&dest_type) {
        match dest.pointee_mut() {
            Some(target) => target.as_record_mut(),
            None => return Err(AccessError::NilDestination),
        }
    } else {
        dest.as_record_mut()
    };
    let record = record.ok_or_else(|| AccessError::NotAStruct(dest_type.to_string()))?;

    let Some(source) = source else {
        return Ok(());
    };
    let source_type = source.record_type();
    let source_fields = source_type.fields().unwrap_or_default();
    let record_type = record.record_type();

    for (i, field) in record_type.fields().unwrap_or_default().iter().enumerate() {
        let Some(&j) = index.get(&field.name) else {
            continue;
        };
        if !field.is_exported() {
            trace!("to_struct: skipping unexported field {:?}", field.name);
            continue;
        }
        let Some(source_field) = source_fields.get(j) else {
            continue;
        };
        if !structurally_equivalent(&source_field.type_desc, &field.type_desc) {
            trace!(
                "to_struct: skipping field {:?}: {} is not {}",
                field.name,
                source_field.type_desc,
                field.type_desc
            );
            continue;
        }
        let (Some(from), Some(to)) = (source.field(j), record.field_mut(i)) else {
            continue;
        };
        if let Err(err) = to.assign(from.as_dynamic().into_owned()) {
            trace!("to_struct: skipping field {:?}: {}", field.name, err);
        }
    }
    Ok(())
}

/// Read-only accessor.
#[derive(Debug)]
pub struct Accessor<'a> {
    value: &'a dyn Reflect,
    record: Option<&'a dyn Record>,
    record_type: Option<Arc<TypeDescriptor>>,
    index: HashMap<String, usize>,
}

impl<'a> Accessor<'a> {
    /// Wrap `value`, indexing its fields when it is a record, or a non-nil
    /// pointer or filled interface holding one.
    pub fn new(value: &'a dyn Reflect) -> Self {
        let record = indirect(value).and_then(|target| target.as_record());
        let (record_type, index) = inspect(value);
        Self {
            value,
            record,
            record_type,
            index,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Field named `name`, or `None` when absent.
    pub fn field(&self, name: &str) -> Option<Field<'_>> {
        let (position, descriptor) = lookup(&self.record_type, &self.index, name)?;
        let slot = self.record?.field(position)?;
        Some(Field { descriptor, slot })
    }

    /// All visible fields in declaration order.
    pub fn fields(&self) -> Vec<Field<'_>> {
        let Some(record) = self.record else {
            return Vec::new();
        };
        visible_fields(&self.record_type, &self.index)
            .filter_map(|(i, descriptor)| {
                record.field(i).map(|slot| Field { descriptor, slot })
            })
            .collect()
    }

    /// The wrapped value, as passed to [`Accessor::new`].
    pub fn value(&self) -> &'a dyn Reflect {
        self.value
    }

    /// Copy matching fields into the record behind `dest`.
    ///
    /// A field is copied when `dest` declares it with the same name, as
    /// exported, and with an equivalent type. Other fields are left alone.
    pub fn to_struct(&self, dest: &mut dyn Reflect) -> Result<()> {
        copy_fields(self.record, &self.index, dest)
    }

    /// One accessor per element, or `None` unless the value is a sequence
    /// or array.
    pub fn to_sequence_of_accessors(&self) -> Option<Vec<Accessor<'a>>> {
        let elements = indirect(self.value)?.elements()?;
        Some(elements.into_iter().map(Accessor::new).collect())
    }

    /// One accessor per entry, or `None` unless the value is a map.
    pub fn to_map_of_accessors(&self) -> Option<HashMap<MapKey, Accessor<'a>>> {
        let entries = indirect(self.value)?.entries()?;
        Some(
            entries
                .into_iter()
                .map(|(key, value)| (key, Accessor::new(value)))
                .collect(),
        )
    }
}

/// Read-write accessor.
#[derive(Debug)]
pub struct AccessorMut<'a> {
    value: &'a mut dyn Reflect,
    record_type: Option<Arc<TypeDescriptor>>,
    index: HashMap<String, usize>,
}

impl<'a> AccessorMut<'a> {
    pub fn new(value: &'a mut dyn Reflect) -> Self {
        let (record_type, index) = inspect(&*value);
        Self {
            value,
            record_type,
            index,
        }
    }

    fn record(&self) -> Option<&dyn Record> {
        indirect(&*self.value)?.as_record()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<Field<'_>> {
        let (position, descriptor) = lookup(&self.record_type, &self.index, name)?;
        let slot = self.record()?.field(position)?;
        Some(Field { descriptor, slot })
    }

    /// Writable field named `name`, or `None` when absent.
    pub fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        let (position, descriptor) = lookup(&self.record_type, &self.index, name)?;
        let slot = indirect_mut(&mut *self.value)?
            .as_record_mut()?
            .field_mut(position)?;
        Some(FieldMut { descriptor, slot })
    }

    pub fn fields(&self) -> Vec<Field<'_>> {
        let Some(record) = self.record() else {
            return Vec::new();
        };
        visible_fields(&self.record_type, &self.index)
            .filter_map(|(i, descriptor)| {
                record.field(i).map(|slot| Field { descriptor, slot })
            })
            .collect()
    }

    pub fn value(&self) -> &dyn Reflect {
        &*self.value
    }

    pub fn value_mut(&mut self) -> &mut dyn Reflect {
        &mut *self.value
    }

    pub fn to_struct(&self, dest: &mut dyn Reflect) -> Result<()> {
        copy_fields(self.record(), &self.index, dest)
    }

    pub fn to_sequence_of_accessors(&self) -> Option<Vec<Accessor<'_>>> {
        let elements = indirect(&*self.value)?.elements()?;
        Some(elements.into_iter().map(Accessor::new).collect())
    }

    pub fn to_map_of_accessors(&self) -> Option<HashMap<MapKey, Accessor<'_>>> {
        let entries = indirect(&*self.value)?.entries()?;
        Some(
            entries
                .into_iter()
                .map(|(key, value)| (key, Accessor::new(value)))
                .collect(),
        )
    }

    /// One writable accessor per element.
    pub fn to_sequence_of_accessors_mut(&mut self) -> Option<Vec<AccessorMut<'_>>> {
        let elements = indirect_mut(&mut *self.value)?.elements_mut()?;
        Some(elements.into_iter().map(AccessorMut::new).collect())
    }

    /// One writable accessor per entry.
    pub fn to_map_of_accessors_mut(&mut self) -> Option<HashMap<MapKey, AccessorMut<'_>>> {
        let entries = indirect_mut(&mut *self.value)?.entries_mut()?;
        Some(
            entries
                .into_iter()
                .map(|(key, value)| (key, AccessorMut::new(value)))
                .collect(),
        )
    }
}

/// Resolve one pointer or interface wrapper, keeping borrowed values
/// borrowed.
fn resolve(value: Cow<'_, DynamicValue>) -> Option<Cow<'_, DynamicValue>> {
    match value {
        Cow::Borrowed(v) => v.indirect().map(Cow::Borrowed),
        Cow::Owned(v) => v.into_indirect().map(Cow::Owned),
    }
}

#[cold]
#[track_caller]
fn kind_mismatch(field: &FieldDescriptor, expected: &str, found: &DynamicValue) -> ! {
    panic!(
        "field \"{}\" is not {} (found {})",
        field.name,
        expected,
        found.type_descriptor()
    )
}

#[track_caller]
fn read_signed(field: &FieldDescriptor, slot: &dyn Reflect) -> i64 {
    match resolve(slot.as_dynamic()) {
        None => 0,
        Some(v) => v
            .as_signed()
            .unwrap_or_else(|| kind_mismatch(field, "a signed integer", &v)),
    }
}

#[track_caller]
fn read_unsigned(field: &FieldDescriptor, slot: &dyn Reflect) -> u64 {
    match resolve(slot.as_dynamic()) {
        None => 0,
        Some(v) => v
            .as_unsigned()
            .unwrap_or_else(|| kind_mismatch(field, "an unsigned integer", &v)),
    }
}

#[track_caller]
fn read_float(field: &FieldDescriptor, slot: &dyn Reflect) -> f64 {
    match resolve(slot.as_dynamic()) {
        None => 0.0,
        Some(v) => v
            .as_float()
            .unwrap_or_else(|| kind_mismatch(field, "a float", &v)),
    }
}

macro_rules! numeric_readers {
    ($($(#[$doc:meta])* $get:ident, $get_ptr:ident => $ty:ty, $read:ident;)*) => {
        $(
            $(#[$doc])*
            #[track_caller]
            fn $get(&self) -> $ty {
                $read(self.descriptor(), self.slot()) as $ty
            }

            #[track_caller]
            fn $get_ptr(&self) -> Option<$ty> {
                if self.is_nil() {
                    None
                } else {
                    Some(self.$get())
                }
            }
        )*
    };
}

/// Read access shared by [`Field`] and [`FieldMut`].
///
/// Every typed reader looks through one pointer or interface wrapper. A nil
/// pointer reads as the zero value through `K()` and as `None` through
/// `pointer_K()`. Numeric readers accept any width of the same family and
/// convert with `as`.
pub trait FieldRead {
    fn descriptor(&self) -> &FieldDescriptor;

    /// The underlying slot.
    fn slot(&self) -> &dyn Reflect;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn tag(&self) -> &str {
        &self.descriptor().tag
    }

    /// Nil pointer or empty interface.
    fn is_nil(&self) -> bool {
        let slot = self.slot();
        match slot.type_descriptor().kind {
            TypeKind::Pointer(_) => slot.pointee().is_none(),
            TypeKind::Interface => slot.as_dynamic().is_null(),
            _ => false,
        }
    }

    /// Type-erased copy of the value.
    fn interface(&self) -> DynamicValue {
        self.slot().as_dynamic().into_owned()
    }

    /// Convert the value to `T`.
    fn get<T: Typed>(&self) -> Result<T> {
        T::from_dynamic(self.interface())
    }

    numeric_readers! {
        /// Panics unless the field holds a signed integer.
        int, pointer_int => isize, read_signed;
        int8, pointer_int8 => i8, read_signed;
        int16, pointer_int16 => i16, read_signed;
        int32, pointer_int32 => i32, read_signed;
        int64, pointer_int64 => i64, read_signed;
        /// Panics unless the field holds an unsigned integer.
        uint, pointer_uint => usize, read_unsigned;
        uint8, pointer_uint8 => u8, read_unsigned;
        uint16, pointer_uint16 => u16, read_unsigned;
        uint32, pointer_uint32 => u32, read_unsigned;
        uint64, pointer_uint64 => u64, read_unsigned;
        /// Panics unless the field holds a float.
        float32, pointer_float32 => f32, read_float;
        float64, pointer_float64 => f64, read_float;
    }

    #[track_caller]
    fn bool(&self) -> bool {
        match resolve(self.slot().as_dynamic()) {
            None => false,
            Some(v) => v
                .as_bool()
                .unwrap_or_else(|| kind_mismatch(self.descriptor(), "a bool", &v)),
        }
    }

    #[track_caller]
    fn pointer_bool(&self) -> Option<bool> {
        (!self.is_nil()).then(|| self.bool())
    }

    #[track_caller]
    fn string(&self) -> String {
        match resolve(self.slot().as_dynamic()) {
            None => String::new(),
            Some(v) => match v.as_str() {
                Some(s) => s.to_string(),
                None => kind_mismatch(self.descriptor(), "a string", &v),
            },
        }
    }

    #[track_caller]
    fn pointer_string(&self) -> Option<String> {
        (!self.is_nil()).then(|| self.string())
    }

    /// Panics unless the field holds a timestamp.
    #[track_caller]
    fn time(&self) -> DateTime<Utc> {
        match resolve(self.slot().as_dynamic()) {
            None => DateTime::<Utc>::default(),
            Some(v) => v
                .as_time()
                .unwrap_or_else(|| kind_mismatch(self.descriptor(), "a timestamp", &v)),
        }
    }

    #[track_caller]
    fn pointer_time(&self) -> Option<DateTime<Utc>> {
        (!self.is_nil()).then(|| self.time())
    }
}

/// Read-only view of one field.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    descriptor: &'a FieldDescriptor,
    slot: &'a dyn Reflect,
}

impl FieldRead for Field<'_> {
    fn descriptor(&self) -> &FieldDescriptor {
        self.descriptor
    }

    fn slot(&self) -> &dyn Reflect {
        self.slot
    }
}

/// Writable view of one field.
#[derive(Debug)]
pub struct FieldMut<'a> {
    descriptor: &'a FieldDescriptor,
    slot: &'a mut dyn Reflect,
}

impl FieldRead for FieldMut<'_> {
    fn descriptor(&self) -> &FieldDescriptor {
        self.descriptor
    }

    fn slot(&self) -> &dyn Reflect {
        &*self.slot
    }
}

/// Convert `native` into the primitive kind declared by `ty`.
fn convert_into(
    ty: &TypeDescriptor,
    native: &DynamicValue,
    convert: &impl Fn(PrimitiveKind) -> Option<DynamicValue>,
) -> Result<DynamicValue> {
    ty.primitive_kind()
        .and_then(convert)
        .ok_or_else(|| AccessError::mismatch(ty, native.type_descriptor()))
}

/// Converter accepting exactly `kind`.
fn exact(kind: PrimitiveKind, value: DynamicValue) -> impl Fn(PrimitiveKind) -> Option<DynamicValue> {
    move |declared| (declared == kind).then(|| value.clone())
}

macro_rules! numeric_writers {
    ($($set:ident, $set_ptr:ident => $ty:ty, $variant:ident, $wide:ty, $from:ident;)*) => {
        $(
            pub fn $set(&mut self, value: $ty) -> Result<()> {
                self.store(DynamicValue::$variant(value), |kind| {
                    DynamicValue::$from(kind, value as $wide)
                })
            }

            pub fn $set_ptr(&mut self, value: Option<$ty>) -> Result<()> {
                match value {
                    Some(v) => self.$set(v),
                    None => self.clear(),
                }
            }
        )*
    };
}

impl FieldMut<'_> {
    /// The underlying slot, for nested access through [`AccessorMut::new`].
    pub fn slot_mut(&mut self) -> &mut dyn Reflect {
        &mut *self.slot
    }

    /// Write a primitive into the slot, wrapping it for pointer and
    /// interface slots.
    fn store(
        &mut self,
        native: DynamicValue,
        convert: impl Fn(PrimitiveKind) -> Option<DynamicValue>,
    ) -> Result<()> {
        let declared = self.slot.type_descriptor();
        let value = match &declared.kind {
            TypeKind::Interface => DynamicValue::Interface(Some(Box::new(native))),
            TypeKind::Pointer(target) => {
                let inner = convert_into(target, &native, &convert)?;
                DynamicValue::Pointer(DynamicPointer::from_parts(target.clone(), Some(inner)))
            }
            _ => convert_into(&declared, &native, &convert)?,
        };
        self.slot.assign(value)
    }

    numeric_writers! {
        set_int, set_pointer_int => isize, Int, i64, from_signed;
        set_int8, set_pointer_int8 => i8, I8, i64, from_signed;
        set_int16, set_pointer_int16 => i16, I16, i64, from_signed;
        set_int32, set_pointer_int32 => i32, I32, i64, from_signed;
        set_int64, set_pointer_int64 => i64, I64, i64, from_signed;
        set_uint, set_pointer_uint => usize, Uint, u64, from_unsigned;
        set_uint8, set_pointer_uint8 => u8, U8, u64, from_unsigned;
        set_uint16, set_pointer_uint16 => u16, U16, u64, from_unsigned;
        set_uint32, set_pointer_uint32 => u32, U32, u64, from_unsigned;
        set_uint64, set_pointer_uint64 => u64, U64, u64, from_unsigned;
        set_float32, set_pointer_float32 => f32, F32, f64, from_float;
        set_float64, set_pointer_float64 => f64, F64, f64, from_float;
    }

    pub fn set_bool(&mut self, value: bool) -> Result<()> {
        let native = DynamicValue::Bool(value);
        self.store(native.clone(), exact(PrimitiveKind::Bool, native))
    }

    pub fn set_pointer_bool(&mut self, value: Option<bool>) -> Result<()> {
        match value {
            Some(v) => self.set_bool(v),
            None => self.clear(),
        }
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> Result<()> {
        let native = DynamicValue::String(value.into());
        self.store(native.clone(), exact(PrimitiveKind::String, native))
    }

    pub fn set_pointer_string(&mut self, value: Option<String>) -> Result<()> {
        match value {
            Some(v) => self.set_string(v),
            None => self.clear(),
        }
    }

    pub fn set_time(&mut self, value: DateTime<Utc>) -> Result<()> {
        let native = DynamicValue::Time(value);
        self.store(native.clone(), exact(PrimitiveKind::Time, native))
    }

    pub fn set_pointer_time(&mut self, value: Option<DateTime<Utc>>) -> Result<()> {
        match value {
            Some(v) => self.set_time(v),
            None => self.clear(),
        }
    }

    /// Assign a type-erased value. Fails unless it fits the declared type.
    pub fn set_interface(&mut self, value: DynamicValue) -> Result<()> {
        self.slot.assign(value)
    }

    /// Assign a statically typed value.
    pub fn set<T: Typed>(&mut self, value: T) -> Result<()> {
        self.slot.assign(value.as_dynamic().into_owned())
    }

    /// Reset to the zero value of the declared type.
    pub fn clear(&mut self) -> Result<()> {
        let zero = DynamicValue::zero(&self.slot.type_descriptor());
        self.slot.assign(zero)
    }
}
