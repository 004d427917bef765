// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use std::fmt;
use std::sync::Arc;

/// Primitive field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    /// Platform-width signed integer (`isize`).
    Int,
    I8,
    I16,
    I32,
    I64,
    /// Platform-width unsigned integer (`usize`).
    Uint,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// UTC timestamp (`chrono::DateTime<Utc>`).
    Time,
}

impl PrimitiveKind {
    /// Rust spelling of the kind, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "isize",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Uint => "usize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "String",
            Self::Time => "DateTime<Utc>",
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Int | Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::Uint | Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether values of this kind can key a map.
    pub fn is_hashable(&self) -> bool {
        !self.is_float()
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-length array descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Fixed length.
    pub length: usize,
}

/// Key/value mapping descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDescriptor {
    pub key_type: Arc<TypeDescriptor>,
    pub value_type: Arc<TypeDescriptor>,
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Primitive value.
    Primitive(PrimitiveKind),
    /// Nullable indirection to the target type.
    Pointer(Arc<TypeDescriptor>),
    /// Growable, ordered sequence.
    Sequence(Arc<TypeDescriptor>),
    /// Fixed-length array.
    Array(ArrayDescriptor),
    /// Key to value mapping.
    Map(MapDescriptor),
    /// Record with ordered, named fields.
    Struct(Vec<FieldDescriptor>),
    /// Holds a value of any type, or nothing.
    Interface,
}

/// A complete type descriptor.
///
/// `package` and `name` carry the nominal identity of declared record types.
/// Both are empty for records assembled at runtime and for every non-struct
/// type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Declaring package (module path) of a named type.
    pub package: String,
    /// Type name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create an anonymous type descriptor.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            package: String::new(),
            name: String::new(),
            kind,
        }
    }

    /// Create a named type descriptor.
    pub fn named(package: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            kind,
        }
    }

    /// Create a primitive type descriptor.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(TypeKind::Primitive(kind))
    }

    /// Nullable pointer to `target`.
    pub fn pointer(target: impl Into<Arc<TypeDescriptor>>) -> Self {
        Self::new(TypeKind::Pointer(target.into()))
    }

    /// Growable sequence of `element`.
    pub fn sequence(element: impl Into<Arc<TypeDescriptor>>) -> Self {
        Self::new(TypeKind::Sequence(element.into()))
    }

    /// Fixed-length array of `element`.
    pub fn array(element: impl Into<Arc<TypeDescriptor>>, length: usize) -> Self {
        Self::new(TypeKind::Array(ArrayDescriptor {
            element_type: element.into(),
            length,
        }))
    }

    /// Mapping from `key` to `value`.
    pub fn map(key: impl Into<Arc<TypeDescriptor>>, value: impl Into<Arc<TypeDescriptor>>) -> Self {
        Self::new(TypeKind::Map(MapDescriptor {
            key_type: key.into(),
            value_type: value.into(),
        }))
    }

    /// Dynamically typed slot.
    pub fn interface() -> Self {
        Self::new(TypeKind::Interface)
    }

    /// Anonymous record type.
    pub fn struct_type(fields: Vec<FieldDescriptor>) -> Self {
        Self::new(TypeKind::Struct(fields))
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    /// Check if this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    /// Primitive kind, if this is a primitive type.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// The pointer target for pointer types, `self` otherwise.
    pub fn indirect(&self) -> &TypeDescriptor {
        match &self.kind {
            TypeKind::Pointer(target) => target.as_ref(),
            _ => self,
        }
    }

    /// Get fields if this is a struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by name. With duplicate names the last declaration wins.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().rev().find(|f| f.name == name)
    }

    /// Get field index by name. With duplicate names the last declaration wins.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().rposition(|f| f.name == name)
    }

    /// Short name of the outermost kind ("pointer", "struct", ...).
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Primitive(p) => p.name(),
            TypeKind::Pointer(_) => "pointer",
            TypeKind::Sequence(_) => "sequence",
            TypeKind::Array(_) => "array",
            TypeKind::Map(_) => "map",
            TypeKind::Struct(_) => "struct",
            TypeKind::Interface => "interface",
        }
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        Self::primitive(kind)
    }
}

impl From<PrimitiveKind> for Arc<TypeDescriptor> {
    fn from(kind: PrimitiveKind) -> Self {
        Arc::new(TypeDescriptor::primitive(kind))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Primitive(p) => write!(f, "{p}"),
            TypeKind::Pointer(target) => write!(f, "Option<{target}>"),
            TypeKind::Sequence(element) => write!(f, "Vec<{element}>"),
            TypeKind::Array(arr) => write!(f, "[{}; {}]", arr.element_type, arr.length),
            TypeKind::Map(map) => write!(f, "HashMap<{}, {}>", map.key_type, map.value_type),
            TypeKind::Interface => f.write_str("any"),
            TypeKind::Struct(_) if !self.name.is_empty() => {
                if self.package.is_empty() {
                    f.write_str(&self.name)
                } else {
                    write!(f, "{}::{}", self.package, self.name)
                }
            }
            TypeKind::Struct(fields) => {
                f.write_str("struct {")?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{}: {}", field.name, field.type_desc)?;
                }
                if fields.is_empty() {
                    f.write_str("}")
                } else {
                    f.write_str(" }")
                }
            }
        }
    }
}

/// Field descriptor for struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Origin package. Non-empty for unexported and embedded fields.
    pub package: String,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
    /// Opaque metadata for external consumers.
    pub tag: String,
    /// Field contributes its members to the owner by composition.
    pub embedded: bool,
}

impl FieldDescriptor {
    /// Create a new exported field descriptor.
    pub fn new(name: impl Into<String>, type_desc: impl Into<Arc<TypeDescriptor>>) -> Self {
        Self {
            name: name.into(),
            package: String::new(),
            type_desc: type_desc.into(),
            tag: String::new(),
            embedded: false,
        }
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Mark as unexported, owned by `package`.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Mark as embedded.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Exported fields can be written by bulk copy.
    pub fn is_exported(&self) -> bool {
        self.package.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_families() {
        assert!(PrimitiveKind::Int.is_signed());
        assert!(PrimitiveKind::I8.is_signed());
        assert!(!PrimitiveKind::U8.is_signed());
        assert!(PrimitiveKind::Uint.is_unsigned());
        assert!(PrimitiveKind::F32.is_float());
        assert!(!PrimitiveKind::F64.is_hashable());
        assert!(PrimitiveKind::Time.is_hashable());
    }

    #[test]
    fn test_type_descriptor_struct() {
        let fields = vec![
            FieldDescriptor::new("x", PrimitiveKind::U32),
            FieldDescriptor::new("y", PrimitiveKind::F64).with_tag("json:\"y\""),
        ];

        let desc = TypeDescriptor::struct_type(fields);
        assert!(desc.is_struct());
        assert_eq!(desc.fields().map(|f| f.len()), Some(2));
        assert!(desc.field("x").is_some());
        assert_eq!(desc.field("y").map(|f| f.tag.as_str()), Some("json:\"y\""));
        assert!(desc.field("z").is_none());
        assert_eq!(desc.field_index("y"), Some(1));
    }

    #[test]
    fn test_duplicate_field_lookup_prefers_last() {
        let desc = TypeDescriptor::struct_type(vec![
            FieldDescriptor::new("a", PrimitiveKind::I32),
            FieldDescriptor::new("a", PrimitiveKind::String),
        ]);
        assert_eq!(desc.field_index("a"), Some(1));
        assert_eq!(
            desc.field("a").and_then(|f| f.type_desc.primitive_kind()),
            Some(PrimitiveKind::String)
        );
    }

    #[test]
    fn test_indirect() {
        let ptr = TypeDescriptor::pointer(PrimitiveKind::I64);
        assert!(ptr.is_pointer());
        assert_eq!(ptr.indirect().primitive_kind(), Some(PrimitiveKind::I64));

        let plain = TypeDescriptor::primitive(PrimitiveKind::Bool);
        assert_eq!(plain.indirect(), &plain);
    }

    #[test]
    fn test_display() {
        let map = TypeDescriptor::map(
            PrimitiveKind::String,
            TypeDescriptor::sequence(TypeDescriptor::pointer(PrimitiveKind::I32)),
        );
        assert_eq!(map.to_string(), "HashMap<String, Vec<Option<i32>>>");
        assert_eq!(TypeDescriptor::array(PrimitiveKind::U8, 4).to_string(), "[u8; 4]");

        let anon = TypeDescriptor::struct_type(vec![FieldDescriptor::new("a", PrimitiveKind::Bool)]);
        assert_eq!(anon.to_string(), "struct { a: bool }");

        let named = TypeDescriptor::named("app::model", "User", TypeKind::Struct(vec![]));
        assert_eq!(named.to_string(), "app::model::User");
    }
}
