//! Record construction, the only builder that can recurse.
//!
//! A `RecordBuilder` registers a `Ref` placeholder under its own type
//! identity *before* the first field is walked. Any field whose type leads
//! back to this record (directly, or through an array/map/other record)
//! resolves to the placeholder via the cache instead of re-entering record
//! construction, which is what terminates generation on cyclic type graphs.
//! On finalize the full record node replaces the placeholder in the cache.

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::generate::schema_for;
use crate::schema::{Name, RecordField, Schema};
use crate::visitor::SessionContext;

pub struct RecordBuilder {
    ctx: SessionContext,
    desc: Arc<TypeDescriptor>,
    name: Name,
    fields: Vec<RecordField>,
}

impl RecordBuilder {
    pub(crate) fn new(ctx: SessionContext, desc: &Arc<TypeDescriptor>) -> Self {
        let name = Name::parse(&desc.name);
        // Forward declaration: self-references must hit the cache.
        ctx.schemas
            .borrow_mut()
            .register(desc, Arc::new(Schema::Ref { name: name.clone() }));
        Self {
            ctx,
            desc: desc.clone(),
            name,
            fields: Vec::new(),
        }
    }

    /// Add one field, resolving its schema through a nested generation pass.
    /// Field order is declaration order. Optional fields become `[null, T]`.
    pub fn add_field(
        &mut self,
        name: &str,
        field_type: &Arc<TypeDescriptor>,
        optional: bool,
    ) -> Result<()> {
        let mut schema = schema_for(&self.ctx, field_type)?;
        if optional {
            schema = Arc::new(Schema::nullable(schema));
        }
        self.fields.push(RecordField { name: name.to_string(), schema });
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Arc<Schema>> {
        let record = Arc::new(Schema::Record {
            name: self.name,
            fields: self.fields,
        });
        // Replace the placeholder so later lookups adopt the full node.
        self.ctx.schemas.borrow_mut().register(&self.desc, record.clone());
        Ok(record)
    }
}
