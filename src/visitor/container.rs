//! Array and map construction. Both hold exactly one nested type, resolved
//! through a nested generation pass when the traversal supplies it.

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{Result, SchemaError};
use crate::generate::schema_for;
use crate::schema::Schema;
use crate::visitor::SessionContext;

pub struct ArrayBuilder {
    ctx: SessionContext,
    element_type: Arc<TypeDescriptor>,
    items: Option<Arc<Schema>>,
}

impl ArrayBuilder {
    pub(crate) fn new(ctx: SessionContext, element_type: Arc<TypeDescriptor>) -> Self {
        Self { ctx, element_type, items: None }
    }

    /// The declared element type, for traversals that want to re-dispatch it
    /// themselves instead of calling [`Self::resolve_element`].
    pub fn element_type(&self) -> &Arc<TypeDescriptor> {
        &self.element_type
    }

    /// Resolve the element schema. Called once per array.
    pub fn resolve_element(&mut self) -> Result<()> {
        if self.items.is_some() {
            return Err(SchemaError::InvalidState("array element resolved twice"));
        }
        self.items = Some(schema_for(&self.ctx, &self.element_type)?);
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        let items = self
            .items
            .ok_or(SchemaError::InvalidState("array element type never resolved"))?;
        Ok(Arc::new(Schema::Array { items }))
    }
}

pub struct MapBuilder {
    ctx: SessionContext,
    value_type: Arc<TypeDescriptor>,
    values: Option<Arc<Schema>>,
}

impl MapBuilder {
    pub(crate) fn new(ctx: SessionContext, value_type: Arc<TypeDescriptor>) -> Self {
        Self { ctx, value_type, values: None }
    }

    pub fn value_type(&self) -> &Arc<TypeDescriptor> {
        &self.value_type
    }

    /// Resolve the value schema. Map keys are strings by construction and
    /// carry no schema of their own.
    pub fn resolve_value(&mut self) -> Result<()> {
        if self.values.is_some() {
            return Err(SchemaError::InvalidState("map value resolved twice"));
        }
        self.values = Some(schema_for(&self.ctx, &self.value_type)?);
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        let values = self
            .values
            .ok_or(SchemaError::InvalidState("map value type never resolved"))?;
        Ok(Arc::new(Schema::Map { values }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PrimitiveKind, TypeRegistry};
    use crate::visitor::{GeneratorConfig, SessionContext};
    use std::rc::Rc;

    fn ctx() -> SessionContext {
        SessionContext::new(Rc::new(TypeRegistry::new()), GeneratorConfig::default())
    }

    #[test]
    fn array_requires_element_before_finish() {
        let long = Arc::new(TypeDescriptor::primitive("i64", PrimitiveKind::I64));
        let b = ArrayBuilder::new(ctx(), long);
        assert!(matches!(b.finish(), Err(SchemaError::InvalidState(_))));
    }

    #[test]
    fn array_of_longs() {
        let long = Arc::new(TypeDescriptor::primitive("i64", PrimitiveKind::I64));
        let mut b = ArrayBuilder::new(ctx(), long);
        b.resolve_element().unwrap();
        let s = b.finish().unwrap();
        assert_eq!(*s, Schema::Array { items: Arc::new(Schema::long()) });
    }

    #[test]
    fn element_cannot_resolve_twice() {
        let s = Arc::new(TypeDescriptor::primitive("string", PrimitiveKind::Str));
        let mut b = ArrayBuilder::new(ctx(), s);
        b.resolve_element().unwrap();
        assert!(matches!(b.resolve_element(), Err(SchemaError::InvalidState(_))));
    }

    #[test]
    fn map_of_strings() {
        let s = Arc::new(TypeDescriptor::primitive("string", PrimitiveKind::Str));
        let mut b = MapBuilder::new(ctx(), s);
        b.resolve_value().unwrap();
        assert_eq!(
            *b.finish().unwrap(),
            Schema::Map { values: Arc::new(Schema::string()) }
        );
    }
}
