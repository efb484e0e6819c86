//! Builders for the scalar shapes: string, enum, UUID, double, integer and
//! date/time. None of these recurse; construction is configuration captured
//! at dispatch time plus a trivial finalize.

use std::sync::Arc;

use crate::descriptor::{TemporalKind, TypeDescriptor, TypeKind};
use crate::error::{Result, SchemaError};
use crate::schema::{DOUBLE_SCHEMA, LogicalType, Name, Schema};
use crate::visitor::SessionContext;

/// Plain string schema.
pub struct StringBuilder;

impl StringBuilder {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        Ok(Arc::new(Schema::string()))
    }
}

/// Native enumerated schema: name plus symbols in declared order. Registers
/// itself in the cache on finalize so later references (by string or by
/// ordinal) deduplicate to the same node.
pub struct EnumBuilder {
    ctx: SessionContext,
    desc: Arc<TypeDescriptor>,
    name: Name,
    symbols: Vec<String>,
}

impl EnumBuilder {
    pub(crate) fn new(ctx: SessionContext, desc: &Arc<TypeDescriptor>) -> Result<Self> {
        let TypeKind::Enum(e) = &desc.kind else {
            return Err(SchemaError::InvalidState(
                "enum builder created for a non-enum descriptor",
            ));
        };
        Ok(Self {
            ctx,
            desc: desc.clone(),
            name: Name::parse(&desc.name),
            symbols: e.symbols.clone(),
        })
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        let schema = Arc::new(Schema::Enum {
            name: self.name,
            symbols: self.symbols,
        });
        self.ctx.schemas.borrow_mut().register(&self.desc, schema.clone());
        Ok(schema)
    }
}

/// UUID value type: plain string, or logical-uuid-tagged string when logical
/// types are enabled.
pub struct UuidBuilder {
    logical_types: bool,
}

impl UuidBuilder {
    pub(crate) fn new(logical_types: bool) -> Self {
        Self { logical_types }
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        let logical = self.logical_types.then_some(LogicalType::Uuid);
        Ok(Arc::new(Schema::String { logical }))
    }
}

/// Numbers with a fractional part. Always double-width: the target format's
/// float/double split is the only precision distinction and this generator
/// always picks double.
pub struct DoubleBuilder;

impl DoubleBuilder {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        Ok(DOUBLE_SCHEMA.clone())
    }
}

/// Integral numbers, 32-bit or 64-bit slot by source width. Temporal types
/// arriving here (logical types disabled) keep their natural width untagged.
pub struct IntegerBuilder {
    target: Schema,
}

impl IntegerBuilder {
    pub(crate) fn new(desc: &Arc<TypeDescriptor>) -> Self {
        let target = match &desc.kind {
            TypeKind::Primitive(p) if p.is_integral() => {
                if p.fits_int() {
                    Schema::int()
                } else {
                    Schema::long()
                }
            }
            TypeKind::Temporal(TemporalKind::TimestampMillis) => Schema::long(),
            TypeKind::Temporal(_) => Schema::int(),
            // Bool and friends never reach the integer category; anything
            // else integral-adjacent defaults to the narrow slot.
            _ => Schema::int(),
        };
        Self { target }
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        Ok(Arc::new(self.target))
    }
}

/// Temporal values with logical-type tagging enabled.
pub struct DateTimeBuilder {
    kind: TemporalKind,
}

impl DateTimeBuilder {
    pub(crate) fn new(kind: TemporalKind) -> Self {
        Self { kind }
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        let schema = match self.kind {
            TemporalKind::Date => Schema::Int { logical: Some(LogicalType::Date) },
            TemporalKind::TimeMillis => Schema::Int { logical: Some(LogicalType::TimeMillis) },
            TemporalKind::TimestampMillis => {
                Schema::Long { logical: Some(LogicalType::TimestampMillis) }
            }
        };
        Ok(Arc::new(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumDescriptor, PrimitiveKind, TypeRegistry};
    use crate::visitor::{GeneratorConfig, SessionContext};
    use std::rc::Rc;

    fn ctx() -> SessionContext {
        SessionContext::new(Rc::new(TypeRegistry::new()), GeneratorConfig::default())
    }

    #[test]
    fn enum_keeps_declared_symbol_order() {
        let desc = Arc::new(TypeDescriptor::new(
            "Priority",
            TypeKind::Enum(EnumDescriptor {
                symbols: vec!["LOW".into(), "HIGH".into(), "CRITICAL".into()],
            }),
        ));
        let b = EnumBuilder::new(ctx(), &desc).unwrap();
        let Schema::Enum { symbols, .. } = &*b.finish().unwrap() else {
            panic!("expected enum");
        };
        assert_eq!(symbols, &["LOW", "HIGH", "CRITICAL"]);
    }

    #[test]
    fn enum_registers_itself_on_finish() {
        let ctx = ctx();
        let desc = Arc::new(TypeDescriptor::new(
            "Color",
            TypeKind::Enum(EnumDescriptor { symbols: vec!["RED".into()] }),
        ));
        let built = EnumBuilder::new(ctx.clone(), &desc).unwrap().finish().unwrap();
        assert!(Arc::ptr_eq(&ctx.schemas.borrow().find(&desc).unwrap(), &built));
    }

    #[test]
    fn uuid_logical_tagging_follows_configuration() {
        assert_eq!(*UuidBuilder::new(false).finish().unwrap(), Schema::string());
        assert_eq!(
            *UuidBuilder::new(true).finish().unwrap(),
            Schema::String { logical: Some(LogicalType::Uuid) }
        );
    }

    #[test]
    fn integer_width_selection() {
        let narrow = Arc::new(TypeDescriptor::primitive("i16", PrimitiveKind::I16));
        assert_eq!(*IntegerBuilder::new(&narrow).finish().unwrap(), Schema::int());

        let wide = Arc::new(TypeDescriptor::primitive("u32", PrimitiveKind::U32));
        assert_eq!(*IntegerBuilder::new(&wide).finish().unwrap(), Schema::long());
    }

    #[test]
    fn temporal_without_logical_types_stays_plain() {
        let ts = Arc::new(TypeDescriptor::new(
            "created_at",
            TypeKind::Temporal(TemporalKind::TimestampMillis),
        ));
        assert_eq!(*IntegerBuilder::new(&ts).finish().unwrap(), Schema::long());
    }

    #[test]
    fn date_time_builder_tags_by_kind() {
        assert_eq!(
            *DateTimeBuilder::new(TemporalKind::Date).finish().unwrap(),
            Schema::Int { logical: Some(LogicalType::Date) }
        );
        assert_eq!(
            *DateTimeBuilder::new(TemporalKind::TimestampMillis).finish().unwrap(),
            Schema::Long { logical: Some(LogicalType::TimestampMillis) }
        );
    }
}
