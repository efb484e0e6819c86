//! Traversal driver: walks a type descriptor, produces the category hint for
//! each node, and feeds the dispatcher. This is the in-crate stand-in for an
//! external type-introspection subsystem; builders re-enter it (through
//! [`schema_for`]) for nested types, which keeps the whole generation a
//! single depth-first recursive descent bounded by the schema cache.

use std::rc::Rc;
use std::sync::Arc;

use crate::descriptor::{PrimitiveKind, TypeDescriptor, TypeKind, TypeRegistry};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::visitor::{GeneratorConfig, SchemaVisitor, SessionContext, ShapeCategory};

/// Structural category hint for a descriptor. Meaningful for structurally
/// resolved descriptors; an unresolved `Ref` has no determinable shape and
/// maps to the untyped category.
pub fn category_of(desc: &TypeDescriptor) -> ShapeCategory {
    match &desc.kind {
        TypeKind::Struct(_) => ShapeCategory::Object,
        TypeKind::Sequence(_) | TypeKind::Array(_) => ShapeCategory::Array,
        TypeKind::Map(_) => ShapeCategory::Map,
        TypeKind::Enum(_) | TypeKind::Uuid => ShapeCategory::String,
        TypeKind::Temporal(_) => ShapeCategory::Integer,
        TypeKind::Primitive(p) => match p {
            PrimitiveKind::Bool => ShapeCategory::Boolean,
            PrimitiveKind::Str => ShapeCategory::String,
            PrimitiveKind::F32 | PrimitiveKind::F64 => ShapeCategory::Number,
            _ => ShapeCategory::Integer,
        },
        TypeKind::Null => ShapeCategory::Null,
        TypeKind::Any | TypeKind::Ref(_) => ShapeCategory::Any,
    }
}

/// One full generation session: fresh cache, one schema tree out.
pub fn generate(
    types: Rc<TypeRegistry>,
    root: &Arc<TypeDescriptor>,
    config: GeneratorConfig,
) -> Result<Arc<Schema>> {
    let ctx = SessionContext::new(types, config);
    schema_for(&ctx, root)
}

/// Resolve one descriptor inside an existing session. Spawns a dispatcher
/// with an independent result slot over the shared cache, walks, retrieves.
/// This is the re-entry point the shape builders use for nested types.
pub fn schema_for(ctx: &SessionContext, desc: &Arc<TypeDescriptor>) -> Result<Arc<Schema>> {
    let mut visitor = SchemaVisitor::new(ctx.clone());
    drive(&mut visitor, desc)?;
    visitor.schema()
}

/// Dispatch `desc` into `visitor` and feed whatever builder it installs.
pub fn drive(visitor: &mut SchemaVisitor, desc: &Arc<TypeDescriptor>) -> Result<()> {
    let resolved = visitor.context().types.resolve(desc)?;
    let category = category_of(&resolved);
    let built = visitor.dispatch(&resolved, category)?;
    if !built {
        return Ok(());
    }
    match category {
        ShapeCategory::Object => {
            let fields = resolved
                .fields()
                .ok_or(SchemaError::InvalidState("object category without fields"))?;
            for field in fields {
                visitor
                    .active_record()?
                    .add_field(&field.name, &field.type_desc, field.optional)?;
            }
        }
        ShapeCategory::Array => visitor.active_array()?.resolve_element()?,
        ShapeCategory::Map => visitor.active_map()?.resolve_value()?,
        // Scalar builders are fully configured at dispatch time.
        _ => {}
    }
    Ok(())
}

// ------------------------------- Tests ------------------------------------ //
