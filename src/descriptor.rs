//! Runtime type descriptors: the input side of schema generation.
//!
//! A `TypeDescriptor` is the handle an application's type-introspection layer
//! hands to the generator. Identity is the type's full name, not its
//! structural shape; the deduplication cache and the `TypeRegistry` both key
//! on it. Cyclic type graphs are expressed with `TypeKind::Ref`, resolved
//! through the registry at walk time, so descriptors themselves stay acyclic
//! and immutable.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SchemaError};

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
}

impl PrimitiveKind {
    /// Whether the integral kind fits a 32-bit signed schema slot. Unsigned
    /// 32-bit values do not: their upper half needs a 64-bit slot.
    pub fn fits_int(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::U8 | Self::U16)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::U8 | Self::U16 | Self::U32 | Self::U64
        )
    }
}

/// Temporal value kinds that map onto logical-typed integral schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    /// Days since the epoch.
    Date,
    /// Milliseconds since midnight.
    TimeMillis,
    /// Milliseconds since the epoch.
    TimestampMillis,
}

/// Structural kind of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// Struct with named, ordered fields.
    Struct(Vec<FieldDescriptor>),
    /// Dynamic-length sequence.
    Sequence(SequenceDescriptor),
    /// Fixed-length array.
    Array(ArrayDescriptor),
    /// String-keyed map.
    Map(MapDescriptor),
    /// Enumeration with declared symbol order.
    Enum(EnumDescriptor),
    /// Temporal value, integral on the wire.
    Temporal(TemporalKind),
    /// UUID value type.
    Uuid,
    /// The unit/absent type.
    Null,
    /// An unconstrained value whose shape cannot be determined.
    Any,
    /// Reference to another named type, resolved through the `TypeRegistry`.
    Ref(String),
}

/// A complete type descriptor. Equality and cache identity are by `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Full type name (namespace dot-joined by the producer, if any).
    pub name: String,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self { name: name.into(), kind }
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    pub fn struct_type(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(fields))
    }

    /// Reference to a named type; resolution is deferred to the registry.
    pub fn reference(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { kind: TypeKind::Ref(name.clone()), name }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Field of a struct descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_desc: Arc<TypeDescriptor>,
    /// Optional fields generate a `[null, T]` union schema.
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self { name: name.into(), type_desc, optional: false }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Dynamic-length sequence descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    pub element: Arc<TypeDescriptor>,
}

/// Fixed-length array descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    pub element: Arc<TypeDescriptor>,
    pub length: usize,
}

/// String-keyed map descriptor; only the value type is described.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDescriptor {
    pub value: Arc<TypeDescriptor>,
}

/// Enumeration descriptor. Symbol order is declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub symbols: Vec<String>,
}

// ------------------------------ Registry ---------------------------------- //

/// Resolves `TypeKind::Ref` descriptors by name. This is the stand-in for the
/// external introspection subsystem's type lookup; the generator threads it
/// through every builder as part of the session context.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name. Last registration wins;
    /// identity is the name, so re-registering the same name is redefinition.
    pub fn insert(&mut self, desc: Arc<TypeDescriptor>) {
        self.types.insert(desc.name.clone(), desc);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    /// Follow `Ref` links until a structural descriptor is reached. Fails on
    /// a name the registry does not know, and on an alias chain that loops:
    /// more hops than registered types means some name repeated.
    pub fn resolve(&self, desc: &Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>> {
        let mut current = desc.clone();
        let mut hops = 0usize;
        while let TypeKind::Ref(target) = &current.kind {
            if hops > self.types.len() {
                return Err(SchemaError::CyclicAlias { name: target.clone() });
            }
            current = self
                .types
                .get(target)
                .cloned()
                .ok_or_else(|| SchemaError::UnknownType { name: target.clone() })?;
            hops += 1;
        }
        Ok(current)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_references() {
        let mut reg = TypeRegistry::new();
        let point = Arc::new(TypeDescriptor::struct_type(
            "Point",
            vec![
                FieldDescriptor::new("x", Arc::new(TypeDescriptor::primitive("double", PrimitiveKind::F64))),
            ],
        ));
        reg.insert(point.clone());

        let r = Arc::new(TypeDescriptor::reference("Point"));
        let resolved = reg.resolve(&r).unwrap();
        assert_eq!(resolved.name, "Point");
        assert!(resolved.fields().is_some());
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let reg = TypeRegistry::new();
        let r = Arc::new(TypeDescriptor::reference("Missing"));
        let err = reg.resolve(&r).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { name } if name == "Missing"));
    }

    #[test]
    fn self_aliasing_reference_terminates() {
        let mut reg = TypeRegistry::new();
        // "Loop" is an alias pointing at itself; resolution must fail, not
        // spin, and must not blame the name for being unknown.
        reg.insert(Arc::new(TypeDescriptor::reference("Loop")));
        let r = Arc::new(TypeDescriptor::reference("Loop"));
        let err = reg.resolve(&r).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicAlias { name } if name == "Loop"));
    }

    #[test]
    fn integral_width_classification() {
        assert!(PrimitiveKind::I16.fits_int());
        assert!(PrimitiveKind::U16.fits_int());
        assert!(!PrimitiveKind::U32.fits_int());
        assert!(!PrimitiveKind::I64.fits_int());
        assert!(PrimitiveKind::U64.is_integral());
        assert!(!PrimitiveKind::F32.is_integral());
    }
}
