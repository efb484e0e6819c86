//! The schema-generation dispatcher.
//!
//! One `SchemaVisitor` resolves one type description into one schema node.
//! Each shape category has an `expect_*` method; the caller (the traversal in
//! [`crate::generate`], standing in for an external introspection subsystem)
//! picks the method from its own category hint. A dispatch call either
//! resolves the schema directly (cache hit, boolean, null, byte sequences) or
//! installs an active shape builder that the caller feeds before asking for
//! the finished schema.
//!
//! Invariants:
//! - The result slot is single-assignment: resolved value or pending builder,
//!   never both, and a second dispatch after either is set is a defect.
//! - Named types are deduplicated through [`DefinedSchemas`], shared between
//!   a visitor, its builders, and any child visitors, which is also what
//!   terminates recursion over cyclic type graphs.

pub mod container;
pub mod record;
pub mod scalar;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::cache::DefinedSchemas;
use crate::descriptor::{PrimitiveKind, TypeDescriptor, TypeKind, TypeRegistry};
use crate::error::{Result, SchemaError};
use crate::schema::{BOOLEAN_SCHEMA, BYTES_SCHEMA, NULL_SCHEMA, Name, Schema};

use container::{ArrayBuilder, MapBuilder};
use record::RecordBuilder;
use scalar::{DateTimeBuilder, DoubleBuilder, EnumBuilder, IntegerBuilder, StringBuilder, UuidBuilder};

// ------------------------------- Session ----------------------------------- //

/// Session-level configuration, fixed before generation starts.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneratorConfig {
    /// Tag temporal and UUID types with logical types instead of emitting
    /// plain primitives.
    pub logical_types: bool,
    /// Emit enumerated types as plain strings instead of native enum schemas.
    pub write_enum_as_string: bool,
}

/// Everything a dispatch or a builder needs from the surrounding session:
/// the type registry (the introspection provider), the shared schema cache,
/// and the configuration snapshot. Passed explicitly, never ambient.
#[derive(Clone)]
pub struct SessionContext {
    pub types: Rc<TypeRegistry>,
    pub schemas: Rc<RefCell<DefinedSchemas>>,
    pub config: GeneratorConfig,
}

impl SessionContext {
    pub fn new(types: Rc<TypeRegistry>, config: GeneratorConfig) -> Self {
        Self {
            types,
            schemas: Rc::new(RefCell::new(DefinedSchemas::new())),
            config,
        }
    }
}

// ----------------------------- Result slot ---------------------------------- //

/// The dispatcher's cumulative result: nothing yet, a directly resolved
/// schema, or a live builder awaiting finalization.
enum VisitResult {
    Unset,
    Resolved(Arc<Schema>),
    Builder(ActiveBuilder),
}

/// The in-flight shape builder, one variant per schema shape that carries
/// configurable structure.
pub enum ActiveBuilder {
    Record(RecordBuilder),
    Array(ArrayBuilder),
    Map(MapBuilder),
    Enum(EnumBuilder),
    String(StringBuilder),
    Uuid(UuidBuilder),
    Double(DoubleBuilder),
    Integer(IntegerBuilder),
    DateTime(DateTimeBuilder),
}

impl ActiveBuilder {
    fn finish(self) -> Result<Arc<Schema>> {
        match self {
            Self::Record(b) => b.finish(),
            Self::Array(b) => b.finish(),
            Self::Map(b) => b.finish(),
            Self::Enum(b) => b.finish(),
            Self::String(b) => b.finish(),
            Self::Uuid(b) => b.finish(),
            Self::Double(b) => b.finish(),
            Self::Integer(b) => b.finish(),
            Self::DateTime(b) => b.finish(),
        }
    }
}

/// Structural shape category of a type, as reported by the traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeCategory {
    Object,
    Array,
    Map,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Any,
}

// ------------------------------ Dispatcher ---------------------------------- //

pub struct SchemaVisitor {
    ctx: SessionContext,
    result: VisitResult,
}

impl SchemaVisitor {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx, result: VisitResult::Unset }
    }

    /// Derived session: shared cache, registry and configuration, independent
    /// result slot. Used when a nested generation needs its own dispatch
    /// context while still deduplicating against the parent's named types.
    pub fn child(&self) -> SchemaVisitor {
        SchemaVisitor::new(self.ctx.clone())
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Dispatch on an externally supplied category hint. Returns `true` when
    /// an active builder was installed and must be fed before retrieval.
    pub fn dispatch(&mut self, desc: &Arc<TypeDescriptor>, category: ShapeCategory) -> Result<bool> {
        match category {
            ShapeCategory::Object => self.expect_object_format(desc),
            ShapeCategory::Array => self.expect_array_format(desc),
            ShapeCategory::Map => self.expect_map_format(desc),
            ShapeCategory::String => self.expect_string_format(desc),
            ShapeCategory::Number => self.expect_number_format(desc),
            ShapeCategory::Integer => self.expect_integer_format(desc),
            ShapeCategory::Boolean => self.expect_boolean_format(desc),
            ShapeCategory::Null => self.expect_null_format(desc),
            ShapeCategory::Any => self.expect_any_format(desc),
        }
    }

    /// Escape hatch: adopt a pre-built schema, bypassing generation.
    pub fn expect_schema(&mut self, schema: Arc<Schema>) -> Result<()> {
        self.set_resolved(schema)
    }

    pub fn expect_object_format(&mut self, desc: &Arc<TypeDescriptor>) -> Result<bool> {
        let cached = self.ctx.schemas.borrow().find(desc);
        if let Some(s) = cached {
            self.set_resolved(s)?;
            return Ok(false);
        }
        let builder = RecordBuilder::new(self.ctx.clone(), desc);
        self.set_builder(ActiveBuilder::Record(builder))?;
        Ok(true)
    }

    pub fn expect_array_format(&mut self, desc: &Arc<TypeDescriptor>) -> Result<bool> {
        match &desc.kind {
            TypeKind::Sequence(seq) => {
                let elem = self.ctx.types.resolve(&seq.element)?;
                // Raw byte sequences are a recognized special case: Bytes,
                // never an array of 8-bit integers.
                if elem.kind == TypeKind::Primitive(PrimitiveKind::U8) {
                    self.set_resolved(BYTES_SCHEMA.clone())?;
                    return Ok(false);
                }
                let builder = ArrayBuilder::new(self.ctx.clone(), seq.element.clone());
                self.set_builder(ActiveBuilder::Array(builder))?;
                Ok(true)
            }
            TypeKind::Array(arr) => {
                let elem = self.ctx.types.resolve(&arr.element)?;
                // Fixed-length byte arrays map onto the named fixed shape.
                if elem.kind == TypeKind::Primitive(PrimitiveKind::U8) {
                    let cached = self.ctx.schemas.borrow().find(desc);
                    if let Some(s) = cached {
                        self.set_resolved(s)?;
                        return Ok(false);
                    }
                    let fixed = Arc::new(Schema::Fixed {
                        name: Name::parse(&desc.name),
                        size: arr.length,
                    });
                    self.ctx.schemas.borrow_mut().register(desc, fixed.clone());
                    self.set_resolved(fixed)?;
                    return Ok(false);
                }
                let builder = ArrayBuilder::new(self.ctx.clone(), arr.element.clone());
                self.set_builder(ActiveBuilder::Array(builder))?;
                Ok(true)
            }
            _ => Err(SchemaError::InvalidState(
                "array category hint for a non-array-like descriptor",
            )),
        }
    }

    pub fn expect_map_format(&mut self, desc: &Arc<TypeDescriptor>) -> Result<bool> {
        let TypeKind::Map(map) = &desc.kind else {
            return Err(SchemaError::InvalidState(
                "map category hint for a non-map-like descriptor",
            ));
        };
        let builder = MapBuilder::new(self.ctx.clone(), map.value.clone());
        self.set_builder(ActiveBuilder::Map(builder))?;
        Ok(true)
    }

    pub fn expect_string_format(&mut self, desc: &Arc<TypeDescriptor>) -> Result<bool> {
        // May be a re-reference to an already defined enum type.
        let cached = self.ctx.schemas.borrow().find(desc);
        if let Some(s) = cached {
            self.set_resolved(s)?;
            return Ok(false);
        }
        if desc.is_enum() && !self.ctx.config.write_enum_as_string {
            let builder = EnumBuilder::new(self.ctx.clone(), desc)?;
            self.set_builder(ActiveBuilder::Enum(builder))?;
            return Ok(true);
        }
        if desc.kind == TypeKind::Uuid {
            let builder = UuidBuilder::new(self.ctx.config.logical_types);
            self.set_builder(ActiveBuilder::Uuid(builder))?;
            return Ok(true);
        }
        self.set_builder(ActiveBuilder::String(StringBuilder::new()))?;
        Ok(true)
    }

    /// Numbers with a fractional part always target the double-width schema;
    /// the source precision does not matter for this format.
    pub fn expect_number_format(&mut self, _desc: &Arc<TypeDescriptor>) -> Result<bool> {
        self.set_builder(ActiveBuilder::Double(DoubleBuilder::new()))?;
        Ok(true)
    }

    pub fn expect_integer_format(&mut self, desc: &Arc<TypeDescriptor>) -> Result<bool> {
        // May be a re-reference to an enum type represented by ordinal index.
        let cached = self.ctx.schemas.borrow().find(desc);
        if let Some(s) = cached {
            self.set_resolved(s)?;
            return Ok(false);
        }
        if self.ctx.config.logical_types {
            if let TypeKind::Temporal(kind) = desc.kind {
                self.set_builder(ActiveBuilder::DateTime(DateTimeBuilder::new(kind)))?;
                return Ok(true);
            }
        }
        self.set_builder(ActiveBuilder::Integer(IntegerBuilder::new(desc)))?;
        Ok(true)
    }

    /// Booleans carry no structural configuration: no builder, no cache.
    pub fn expect_boolean_format(&mut self, _desc: &Arc<TypeDescriptor>) -> Result<bool> {
        self.set_resolved(BOOLEAN_SCHEMA.clone())?;
        Ok(false)
    }

    pub fn expect_null_format(&mut self, _desc: &Arc<TypeDescriptor>) -> Result<bool> {
        self.set_resolved(NULL_SCHEMA.clone())?;
        Ok(false)
    }

    /// Deliberate restriction: an unconstrained type cannot be mapped onto a
    /// schema whose branches must be statically enumerable.
    pub fn expect_any_format(&mut self, desc: &Arc<TypeDescriptor>) -> Result<bool> {
        Err(SchemaError::UnsupportedShape { type_name: desc.name.clone() })
    }

    // ------------------------- Active builder access ------------------------ //

    pub fn active_record(&mut self) -> Result<&mut RecordBuilder> {
        match &mut self.result {
            VisitResult::Builder(ActiveBuilder::Record(b)) => Ok(b),
            _ => Err(SchemaError::InvalidState("no active record builder")),
        }
    }

    pub fn active_array(&mut self) -> Result<&mut ArrayBuilder> {
        match &mut self.result {
            VisitResult::Builder(ActiveBuilder::Array(b)) => Ok(b),
            _ => Err(SchemaError::InvalidState("no active array builder")),
        }
    }

    pub fn active_map(&mut self) -> Result<&mut MapBuilder> {
        match &mut self.result {
            VisitResult::Builder(ActiveBuilder::Map(b)) => Ok(b),
            _ => Err(SchemaError::InvalidState("no active map builder")),
        }
    }

    // ------------------------------ Retrieval ------------------------------- //

    /// The finished schema. Finalizes a pending builder exactly once and
    /// memoizes the produced node, so repeated calls return the same `Arc`.
    pub fn schema(&mut self) -> Result<Arc<Schema>> {
        match std::mem::replace(&mut self.result, VisitResult::Unset) {
            VisitResult::Resolved(s) => {
                self.result = VisitResult::Resolved(s.clone());
                Ok(s)
            }
            VisitResult::Builder(b) => {
                let s = b.finish()?;
                self.result = VisitResult::Resolved(s.clone());
                Ok(s)
            }
            VisitResult::Unset => Err(SchemaError::NotGenerated),
        }
    }

    // ------------------------------ Internals ------------------------------- //

    fn set_resolved(&mut self, schema: Arc<Schema>) -> Result<()> {
        self.ensure_unset()?;
        self.result = VisitResult::Resolved(schema);
        Ok(())
    }

    fn set_builder(&mut self, builder: ActiveBuilder) -> Result<()> {
        self.ensure_unset()?;
        self.result = VisitResult::Builder(builder);
        Ok(())
    }

    fn ensure_unset(&self) -> Result<()> {
        match self.result {
            VisitResult::Unset => Ok(()),
            _ => Err(SchemaError::InvalidState(
                "dispatch called after a result was already set",
            )),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
