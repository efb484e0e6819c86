//! JSON type-definition documents: the CLI's way of feeding a type model to
//! the generator without a host application attached.
//!
//! A document declares named types (records, enums, containers, aliases) and
//! optionally a root. Records and enums are named types and must be declared
//! top-level; fields and container elements reference them by name. Container
//! shapes may also be written inline, except fixed byte arrays, which are
//! named types and must be declared top-level like records and enums.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Color", "kind": "enum", "symbols": ["RED", "GREEN"] },
//!     { "name": "Node", "kind": "record", "fields": [
//!       { "name": "value", "type": "long" },
//!       { "name": "next", "type": "Node", "optional": true }
//!     ] }
//!   ],
//!   "root": "Node"
//! }
//! ```

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::descriptor::{
    ArrayDescriptor, EnumDescriptor, FieldDescriptor, MapDescriptor, PrimitiveKind,
    SequenceDescriptor, TemporalKind, TypeDescriptor, TypeKind, TypeRegistry,
};

// ------------------------------- Model ------------------------------------ //

#[derive(Debug, Deserialize)]
pub struct Document {
    pub types: Vec<NamedDef>,
    #[serde(default)]
    pub root: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NamedDef {
    pub name: String,
    #[serde(flatten)]
    pub shape: Shape,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Record { fields: Vec<FieldDef> },
    Enum { symbols: Vec<String> },
    Sequence { items: TypeRef },
    Array { items: TypeRef, length: usize },
    Map { values: TypeRef },
}

#[derive(Debug, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub optional: bool,
}

/// Either a name (primitive keyword or declared type) or an inline container.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Name(String),
    Inline(Box<Shape>),
}

// ----------------------------- Conversion ---------------------------------- //

/// Build a registry from one or more parsed documents.
pub fn build_registry(docs: &[Document]) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    for doc in docs {
        for def in &doc.types {
            let desc = named_descriptor(&def.name, &def.shape)
                .with_context(|| format!("in type `{}`", def.name))?;
            registry.insert(desc);
        }
    }
    Ok(registry)
}

/// The root descriptor: `--root` wins, else the last document naming one.
pub fn root_descriptor(docs: &[Document], cli_root: Option<&str>) -> Result<Arc<TypeDescriptor>> {
    let name = cli_root
        .map(str::to_string)
        .or_else(|| docs.iter().rev().find_map(|d| d.root.clone()))
        .context("no root type: pass --root or set \"root\" in a document")?;
    Ok(Arc::new(TypeDescriptor::reference(name)))
}

fn named_descriptor(name: &str, shape: &Shape) -> Result<Arc<TypeDescriptor>> {
    let kind = match shape {
        Shape::Record { fields } => {
            let fields = fields
                .iter()
                .map(|f| {
                    let ty = type_ref(&f.ty)
                        .with_context(|| format!("in field `{}`", f.name))?;
                    let fd = FieldDescriptor::new(&f.name, ty);
                    Ok(if f.optional { fd.optional() } else { fd })
                })
                .collect::<Result<Vec<_>>>()?;
            TypeKind::Struct(fields)
        }
        Shape::Enum { symbols } => TypeKind::Enum(EnumDescriptor { symbols: symbols.clone() }),
        Shape::Sequence { items } => {
            TypeKind::Sequence(SequenceDescriptor { element: type_ref(items)? })
        }
        Shape::Array { items, length } => TypeKind::Array(ArrayDescriptor {
            element: type_ref(items)?,
            length: *length,
        }),
        Shape::Map { values } => TypeKind::Map(MapDescriptor { value: type_ref(values)? }),
    };
    Ok(Arc::new(TypeDescriptor::new(name, kind)))
}

fn type_ref(r: &TypeRef) -> Result<Arc<TypeDescriptor>> {
    match r {
        TypeRef::Name(name) => Ok(keyword_descriptor(name)
            .unwrap_or_else(|| Arc::new(TypeDescriptor::reference(name)))),
        TypeRef::Inline(shape) => match &**shape {
            Shape::Record { .. } | Shape::Enum { .. } => {
                bail!("records and enums are named types: declare them top-level and reference by name")
            }
            // Synthetic names; containers are not named types so the name is
            // cosmetic. Fixed byte arrays are the exception: they generate a
            // named fixed schema, so an inline one would collide with every
            // other inline one under the synthetic name.
            Shape::Sequence { items } => Ok(Arc::new(TypeDescriptor::new(
                "sequence",
                TypeKind::Sequence(SequenceDescriptor { element: type_ref(items)? }),
            ))),
            Shape::Array { items, length } => {
                let element = type_ref(items)?;
                if element.kind == TypeKind::Primitive(PrimitiveKind::U8) {
                    bail!(
                        "fixed byte arrays are named types: declare them top-level and reference by name"
                    )
                }
                Ok(Arc::new(TypeDescriptor::new(
                    "array",
                    TypeKind::Array(ArrayDescriptor { element, length: *length }),
                )))
            }
            Shape::Map { values } => Ok(Arc::new(TypeDescriptor::new(
                "map",
                TypeKind::Map(MapDescriptor { value: type_ref(values)? }),
            ))),
        },
    }
}

/// Primitive and logical keywords. Anything else is a named reference.
fn keyword_descriptor(name: &str) -> Option<Arc<TypeDescriptor>> {
    let kind = match name {
        "boolean" => TypeKind::Primitive(PrimitiveKind::Bool),
        "int" => TypeKind::Primitive(PrimitiveKind::I32),
        "long" => TypeKind::Primitive(PrimitiveKind::I64),
        "float" => TypeKind::Primitive(PrimitiveKind::F32),
        "double" => TypeKind::Primitive(PrimitiveKind::F64),
        "string" => TypeKind::Primitive(PrimitiveKind::Str),
        "u8" => TypeKind::Primitive(PrimitiveKind::U8),
        "bytes" => TypeKind::Sequence(SequenceDescriptor {
            element: Arc::new(TypeDescriptor::primitive("u8", PrimitiveKind::U8)),
        }),
        "null" => TypeKind::Null,
        "uuid" => TypeKind::Uuid,
        "date" => TypeKind::Temporal(TemporalKind::Date),
        "time-millis" => TypeKind::Temporal(TemporalKind::TimeMillis),
        "timestamp-millis" => TypeKind::Temporal(TemporalKind::TimestampMillis),
        "any" => TypeKind::Any,
        _ => return None,
    };
    Some(Arc::new(TypeDescriptor::new(name, kind)))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate;
    use crate::visitor::GeneratorConfig;
    use serde_json::json;
    use std::rc::Rc;

    fn parse(v: serde_json::Value) -> Document {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn document_round_trips_to_schema() {
        let doc = parse(json!({
            "types": [
                { "name": "Color", "kind": "enum", "symbols": ["RED", "GREEN"] },
                { "name": "User", "kind": "record", "fields": [
                    { "name": "id", "type": "uuid" },
                    { "name": "color", "type": "Color" },
                    { "name": "tags", "type": { "kind": "sequence", "items": "string" } },
                    { "name": "bio", "type": "string", "optional": true }
                ] }
            ],
            "root": "User"
        }));
        let registry = build_registry(std::slice::from_ref(&doc)).unwrap();
        let root = root_descriptor(std::slice::from_ref(&doc), None).unwrap();

        let schema = generate(Rc::new(registry), &root, GeneratorConfig::default()).unwrap();
        let v = schema.to_json();
        assert_eq!(v["name"], json!("User"));
        assert_eq!(v["fields"][0]["type"], json!("string"));
        assert_eq!(v["fields"][1]["type"]["symbols"], json!(["RED", "GREEN"]));
        assert_eq!(v["fields"][2]["type"], json!({ "type": "array", "items": "string" }));
        assert_eq!(v["fields"][3]["type"], json!(["null", "string"]));
    }

    #[test]
    fn cli_root_overrides_document_root() {
        let doc = parse(json!({
            "types": [
                { "name": "A", "kind": "enum", "symbols": ["X"] },
                { "name": "B", "kind": "enum", "symbols": ["Y"] }
            ],
            "root": "A"
        }));
        let root = root_descriptor(std::slice::from_ref(&doc), Some("B")).unwrap();
        assert_eq!(root.name, "B");
    }

    #[test]
    fn missing_root_is_an_error() {
        let doc = parse(json!({ "types": [] }));
        assert!(root_descriptor(std::slice::from_ref(&doc), None).is_err());
    }

    #[test]
    fn inline_record_is_rejected() {
        let doc = parse(json!({
            "types": [
                { "name": "Outer", "kind": "record", "fields": [
                    { "name": "bad", "type": { "kind": "record", "fields": [] } }
                ] }
            ]
        }));
        let err = build_registry(std::slice::from_ref(&doc)).unwrap_err();
        assert!(format!("{err:#}").contains("named types"));
    }

    #[test]
    fn inline_fixed_byte_array_is_rejected() {
        // Two inline byte arrays would both claim the synthetic `array`
        // identity, and the second would render as a reference to the first
        // with its own size silently lost.
        let doc = parse(json!({
            "types": [
                { "name": "Digests", "kind": "record", "fields": [
                    { "name": "a", "type": { "kind": "array", "items": "u8", "length": 16 } },
                    { "name": "b", "type": { "kind": "array", "items": "u8", "length": 32 } }
                ] }
            ]
        }));
        let err = build_registry(std::slice::from_ref(&doc)).unwrap_err();
        assert!(format!("{err:#}").contains("fixed byte arrays are named types"));
    }

    #[test]
    fn named_fixed_byte_arrays_keep_their_own_sizes() {
        let doc = parse(json!({
            "types": [
                { "name": "MD5", "kind": "array", "items": "u8", "length": 16 },
                { "name": "Sha256", "kind": "array", "items": "u8", "length": 32 },
                { "name": "Digests", "kind": "record", "fields": [
                    { "name": "a", "type": "MD5" },
                    { "name": "b", "type": "Sha256" }
                ] }
            ],
            "root": "Digests"
        }));
        let registry = build_registry(std::slice::from_ref(&doc)).unwrap();
        let root = root_descriptor(std::slice::from_ref(&doc), None).unwrap();
        let schema = generate(Rc::new(registry), &root, GeneratorConfig::default()).unwrap();
        let v = schema.to_json();
        assert_eq!(v["fields"][0]["type"], json!({ "type": "fixed", "name": "MD5", "size": 16 }));
        assert_eq!(v["fields"][1]["type"], json!({ "type": "fixed", "name": "Sha256", "size": 32 }));
    }

    #[test]
    fn bytes_keyword_is_a_byte_sequence() {
        let doc = parse(json!({
            "types": [
                { "name": "Blob", "kind": "record", "fields": [
                    { "name": "data", "type": "bytes" }
                ] }
            ],
            "root": "Blob"
        }));
        let registry = build_registry(std::slice::from_ref(&doc)).unwrap();
        let root = root_descriptor(std::slice::from_ref(&doc), None).unwrap();
        let schema = generate(Rc::new(registry), &root, GeneratorConfig::default()).unwrap();
        assert_eq!(schema.to_json()["fields"][0]["type"], json!("bytes"));
    }
}
