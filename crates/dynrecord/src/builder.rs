// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder for runtime record types.
//!
//! ```
//! use dynrecord::{new_struct, type_of, FieldRead, AccessorMut};
//!
//! let ty = new_struct()
//!     .add_field("Name", type_of::<String>(), "json:\"name\"")
//!     .add_field("Age", type_of::<Option<i32>>(), "")
//!     .build();
//!
//! let mut person = ty.new_instance();
//! let mut accessor = AccessorMut::new(&mut person);
//! if let Some(mut field) = accessor.field_mut("Age") {
//!     field.set_int32(42).unwrap();
//! }
//! assert_eq!(accessor.field("Age").and_then(|f| f.pointer_int32()), Some(42));
//! ```

use std::sync::Arc;

use crate::kind::{FieldDescriptor, TypeDescriptor};
use crate::record::DynamicData;
use crate::reflect::Record;
use crate::value::{DynamicMap, DynamicSequence, MapKey};

/// Pending field of a [`StructBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    name: String,
    package: String,
    type_desc: Arc<TypeDescriptor>,
    tag: String,
    embedded: bool,
}

impl FieldConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning package; empty for exported fields.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn type_desc(&self) -> &Arc<TypeDescriptor> {
        &self.type_desc
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Replace the declared type.
    pub fn set_type(&mut self, ty: impl Into<Arc<TypeDescriptor>>) -> &mut Self {
        self.type_desc = ty.into();
        self
    }

    /// Replace the tag.
    pub fn set_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = tag.into();
        self
    }

    fn to_descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            package: self.package.clone(),
            type_desc: self.type_desc.clone(),
            tag: self.tag.clone(),
            embedded: self.embedded,
        }
    }
}

impl From<&FieldDescriptor> for FieldConfig {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            package: field.package.clone(),
            type_desc: field.type_desc.clone(),
            tag: field.tag.clone(),
            embedded: field.embedded,
        }
    }
}

/// Builder for record types.
#[derive(Debug, Default, Clone)]
pub struct StructBuilder {
    fields: Vec<FieldConfig>,
}

impl StructBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    ///
    /// An empty `name` adds an embedded field named after its type. Adding
    /// a name that already exists appends a second field of that name.
    pub fn add_field(mut self, name: &str, ty: impl Into<Arc<TypeDescriptor>>, tag: &str) -> Self {
        let ty = ty.into();
        if name.is_empty() {
            return self.add_embedded(ty, tag);
        }
        if self.has_field(name) {
            warn!("add_field: duplicate field name {:?}", name);
        }
        self.fields.push(FieldConfig {
            name: name.to_string(),
            package: String::new(),
            type_desc: ty,
            tag: tag.to_string(),
            embedded: false,
        });
        self
    }

    /// Add an embedded field.
    ///
    /// The field takes the name and package of `ty`, so it is unexported
    /// whenever `ty` is a declared type.
    pub fn add_embedded(mut self, ty: impl Into<Arc<TypeDescriptor>>, tag: &str) -> Self {
        let ty = ty.into();
        if ty.name.is_empty() {
            warn!("add_embedded: embedding anonymous type {}", ty);
        }
        self.fields.push(FieldConfig {
            name: ty.name.clone(),
            package: ty.package.clone(),
            type_desc: ty,
            tag: tag.to_string(),
            embedded: true,
        });
        self
    }

    /// Remove the first field named `name`. Missing names are ignored.
    pub fn remove_field(mut self, name: &str) -> Self {
        if let Some(pos) = self.fields.iter().position(|f| f.name == name) {
            self.fields.remove(pos);
        }
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Configuration of the first field named `name`.
    pub fn field(&mut self, name: &str) -> Option<&mut FieldConfig> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Pending fields in insertion order.
    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    /// Compile the current fields into a new anonymous record type.
    ///
    /// Every call yields a distinct descriptor; the builder stays usable.
    pub fn build(&self) -> DynamicStruct {
        let fields: Vec<FieldDescriptor> = self.fields.iter().map(FieldConfig::to_descriptor).collect();
        debug!("build: compiled record type with {} fields", fields.len());
        DynamicStruct {
            descriptor: Arc::new(TypeDescriptor::struct_type(fields)),
        }
    }
}

/// Start an empty builder.
pub fn new_struct() -> StructBuilder {
    StructBuilder::new()
}

/// Start a builder seeded with the fields of `example`.
pub fn extend_struct(example: &dyn Record) -> StructBuilder {
    merge_structs(&[example])
}

/// Start a builder with the fields of every example, in order.
///
/// Name collisions are kept as duplicates.
pub fn merge_structs(examples: &[&dyn Record]) -> StructBuilder {
    let mut builder = StructBuilder::new();
    for example in examples {
        let ty = example.record_type();
        for field in ty.fields().unwrap_or_default() {
            if builder.has_field(&field.name) {
                debug!("merge_structs: keeping duplicate field {:?}", field.name);
            }
            builder.fields.push(FieldConfig::from(field));
        }
    }
    builder
}

/// A compiled runtime record type.
#[derive(Debug, Clone)]
pub struct DynamicStruct {
    descriptor: Arc<TypeDescriptor>,
}

impl DynamicStruct {
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.descriptor.fields().unwrap_or_default()
    }

    /// New zeroed instance.
    pub fn new_instance(&self) -> DynamicData {
        DynamicData::new(&self.descriptor)
    }

    /// New empty sequence of this record type.
    pub fn new_sequence(&self) -> DynamicSequence {
        DynamicSequence::new(self.descriptor.clone())
    }

    /// New empty map to this record type, keyed by the kind of
    /// `example_key`.
    pub fn new_map(&self, example_key: impl Into<MapKey>) -> DynamicMap {
        let key_kind = example_key.into().kind();
        DynamicMap::new(key_kind.into(), self.descriptor.clone())
    }
}
