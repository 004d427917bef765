// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dynrecord - runtime record types and name-based field access
//!
//! Build record types at runtime, instantiate them, and read or write the
//! fields of any record (runtime-built or declared) by name.
//!
//! ## Quick Start
//!
//! ```rust
//! use dynrecord::{new_struct, type_of, Accessor, AccessorMut, FieldRead};
//!
//! // Build a record type at runtime
//! let sensor = new_struct()
//!     .add_field("Id", type_of::<u32>(), "json:\"id\"")
//!     .add_field("Temperature", type_of::<f64>(), "")
//!     .add_field("Label", type_of::<Option<String>>(), "")
//!     .build();
//!
//! // Instantiate and write by name
//! let mut reading = sensor.new_instance();
//! let mut writer = AccessorMut::new(&mut reading);
//! if let Some(mut id) = writer.field_mut("Id") {
//!     id.set_uint32(42).unwrap();
//! }
//!
//! // Read back with narrowing within the same family
//! let reader = Accessor::new(&reading);
//! assert_eq!(reader.field("Id").map(|f| f.uint64()), Some(42));
//! assert_eq!(reader.field("Label").and_then(|f| f.pointer_string()), None);
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StructBuilder`] | Mutable list of field definitions, compiled by `build()` |
//! | [`DynamicStruct`] | Compiled record type, factory for instances, sequences and maps |
//! | [`DynamicData`] | Instance of a runtime-built record |
//! | [`Accessor`] / [`AccessorMut`] | Name-indexed view over any [`Reflect`] value |
//! | [`FieldRead`] | Typed readers shared by [`Field`] and [`FieldMut`] |
//! | [`record!`] | Declares a Rust struct visible to the accessor |
//!
//! ## Features
//!
//! - `logging` (default): forward internal diagnostics to the `log` facade
//!   under the `dynrecord` target.

/// Compile-time configurable logging (zero-cost when disabled).
#[macro_use]
mod logging;

mod accessor;
mod builder;
mod equivalence;
mod error;
mod kind;
mod record;
mod reflect;
mod value;

pub use accessor::{Accessor, AccessorMut, Field, FieldMut, FieldRead};
pub use builder::{extend_struct, merge_structs, new_struct, DynamicStruct, FieldConfig, StructBuilder};
pub use equivalence::structurally_equivalent;
pub use error::{AccessError, Result};
pub use kind::{
    ArrayDescriptor, FieldDescriptor, MapDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
};
pub use record::DynamicData;
pub use reflect::{type_of, KeyType, Record, Reflect, Typed};
pub use value::{DynamicMap, DynamicPointer, DynamicSequence, DynamicValue, MapKey};

#[cfg(test)]
mod tests;
