//! Derive Avro wire-format schemas from a runtime type model.
//!
//! A [`TypeRegistry`] of [`TypeDescriptor`]s goes in; one immutable
//! [`Schema`] tree comes out of a generation session. The dispatcher
//! ([`SchemaVisitor`]) decides the schema shape per type, the shared
//! [`DefinedSchemas`] cache guarantees each named type is emitted exactly
//! once, and a forward-declared placeholder registered before record fields
//! are walked makes generation terminate on cyclic type graphs.

pub mod cache;
pub mod cli;
pub mod descriptor;
pub mod error;
pub mod generate;
pub mod schema;
pub mod typedef;
pub mod visitor;

pub use cache::DefinedSchemas;
pub use descriptor::{TypeDescriptor, TypeKind, TypeRegistry};
pub use error::SchemaError;
pub use generate::{generate, schema_for};
pub use schema::{LogicalType, Name, Schema};
pub use visitor::{GeneratorConfig, SchemaVisitor, SessionContext, ShapeCategory};
