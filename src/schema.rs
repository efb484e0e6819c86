//! The target schema algebra and its canonical JSON rendering.
//!
//! `Schema` is the immutable output unit of a generation session. Nodes are
//! shared via `Arc`; the deduplication cache guarantees a named type resolves
//! to the same `Arc` every time it is referenced within one session. The
//! `Ref` variant carries a bare name and is how a recursive occurrence of a
//! record (or any already-defined named type) appears inside another node.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{Value, json};

// ------------------------------- Names ------------------------------------ //

/// Name of a named schema (record, enum, fixed). Globally unique within one
/// generation session; the namespace is optional and dot-joined when present.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: None }
    }

    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: Some(namespace.into()) }
    }

    /// Split a dot-joined full name into namespace and simple name.
    pub fn parse(fullname: &str) -> Self {
        match fullname.rsplit_once('.') {
            Some((ns, name)) => Self::namespaced(name, ns),
            None => Self::new(fullname),
        }
    }

    /// Dot-joined full name, the session-unique identity of a named schema.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

// ---------------------------- Logical types -------------------------------- //

/// A tag refining a primitive schema's interpretation without changing its
/// on-the-wire representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalType {
    Date,
    TimeMillis,
    TimestampMillis,
    Uuid,
}

impl LogicalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::TimeMillis => "time-millis",
            Self::TimestampMillis => "timestamp-millis",
            Self::Uuid => "uuid",
        }
    }
}

// ------------------------------- Schema ------------------------------------ //

/// One node of the wire-format schema tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int { logical: Option<LogicalType> },
    Long { logical: Option<LogicalType> },
    Float,
    Double,
    Bytes,
    String { logical: Option<LogicalType> },
    Enum { name: Name, symbols: Vec<String> },
    Fixed { name: Name, size: usize },
    Array { items: Arc<Schema> },
    Map { values: Arc<Schema> },
    Record { name: Name, fields: Vec<RecordField> },
    Union { branches: Vec<Arc<Schema>> },
    /// Reference to a named type defined elsewhere in the same schema tree.
    /// Breaks cyclic record graphs: the recursive occurrence is a name, not
    /// a re-expansion.
    Ref { name: Name },
}

/// One field of a record schema. Order is declaration order and significant.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub schema: Arc<Schema>,
}

/// Shared singletons for the primitive schemas that carry no configuration.
pub static NULL_SCHEMA: Lazy<Arc<Schema>> = Lazy::new(|| Arc::new(Schema::Null));
pub static BOOLEAN_SCHEMA: Lazy<Arc<Schema>> = Lazy::new(|| Arc::new(Schema::Boolean));
pub static BYTES_SCHEMA: Lazy<Arc<Schema>> = Lazy::new(|| Arc::new(Schema::Bytes));
pub static DOUBLE_SCHEMA: Lazy<Arc<Schema>> = Lazy::new(|| Arc::new(Schema::Double));

impl Schema {
    pub fn int() -> Self {
        Schema::Int { logical: None }
    }

    pub fn long() -> Self {
        Schema::Long { logical: None }
    }

    pub fn string() -> Self {
        Schema::String { logical: None }
    }

    /// Full name, for named variants only.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Enum { name, .. }
            | Schema::Fixed { name, .. }
            | Schema::Record { name, .. }
            | Schema::Ref { name } => Some(name),
            _ => None,
        }
    }

    /// Wrap `inner` as the optional union `[null, inner]`. If `inner` is
    /// already a union, null is prepended instead of nesting unions (unions
    /// may not immediately contain unions), and a union that already has a
    /// null branch is returned unchanged (union branches must be distinct).
    pub fn nullable(inner: Arc<Schema>) -> Schema {
        match &*inner {
            Schema::Union { branches } => {
                if branches.iter().any(|b| matches!(&**b, Schema::Null)) {
                    return Schema::Union { branches: branches.clone() };
                }
                let mut out = Vec::with_capacity(branches.len() + 1);
                out.push(NULL_SCHEMA.clone());
                out.extend(branches.iter().cloned());
                Schema::Union { branches: out }
            }
            _ => Schema::Union { branches: vec![NULL_SCHEMA.clone(), inner] },
        }
    }

    /// Render canonical schema JSON. The first occurrence of a named type
    /// emits its full definition; every later occurrence (including `Ref`
    /// placeholders produced by cyclic records) emits the bare full name.
    pub fn to_json(&self) -> Value {
        let mut defined = HashSet::new();
        self.render(&mut defined)
    }

    fn render(&self, defined: &mut HashSet<String>) -> Value {
        match self {
            Schema::Null => json!("null"),
            Schema::Boolean => json!("boolean"),
            Schema::Float => json!("float"),
            Schema::Double => json!("double"),
            Schema::Bytes => json!("bytes"),
            Schema::Int { logical } => primitive_json("int", *logical),
            Schema::Long { logical } => primitive_json("long", *logical),
            Schema::String { logical } => primitive_json("string", *logical),
            Schema::Enum { name, symbols } => {
                if !defined.insert(name.fullname()) {
                    return json!(name.fullname());
                }
                let mut o = json!({ "type": "enum", "name": name.name, "symbols": symbols });
                if let Some(ns) = &name.namespace {
                    o["namespace"] = Value::from(ns.clone());
                }
                reorder_named(o)
            }
            Schema::Fixed { name, size } => {
                if !defined.insert(name.fullname()) {
                    return json!(name.fullname());
                }
                let mut o = json!({ "type": "fixed", "name": name.name, "size": size });
                if let Some(ns) = &name.namespace {
                    o["namespace"] = Value::from(ns.clone());
                }
                reorder_named(o)
            }
            Schema::Array { items } => {
                json!({ "type": "array", "items": items.render(defined) })
            }
            Schema::Map { values } => {
                json!({ "type": "map", "values": values.render(defined) })
            }
            Schema::Record { name, fields } => {
                if !defined.insert(name.fullname()) {
                    return json!(name.fullname());
                }
                let fields = fields
                    .iter()
                    .map(|f| json!({ "name": f.name, "type": f.schema.render(defined) }))
                    .collect::<Vec<_>>();
                let mut o = json!({ "type": "record", "name": name.name, "fields": fields });
                if let Some(ns) = &name.namespace {
                    o["namespace"] = Value::from(ns.clone());
                }
                reorder_named(o)
            }
            Schema::Union { branches } => {
                Value::Array(branches.iter().map(|b| b.render(defined)).collect())
            }
            Schema::Ref { name } => json!(name.fullname()),
        }
    }
}

fn primitive_json(ty: &str, logical: Option<LogicalType>) -> Value {
    match logical {
        None => json!(ty),
        Some(lt) => json!({ "type": ty, "logicalType": lt.as_str() }),
    }
}

// Canonical key order: type, name, namespace, then the rest.
fn reorder_named(v: Value) -> Value {
    let Value::Object(map) = v else { return v };
    let mut out = serde_json::Map::new();
    for key in ["type", "name", "namespace"] {
        if let Some(x) = map.get(key) {
            out.insert(key.into(), x.clone());
        }
    }
    for (k, x) in map {
        if !out.contains_key(&k) {
            out.insert(k, x);
        }
    }
    Value::Object(out)
}

// ------------------------------- Tests ------------------------------------ //
