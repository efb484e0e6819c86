//! Session-scoped deduplication of named schemas.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::TypeDescriptor;
use crate::schema::Schema;

/// Registry mapping a type identity to its already-built named schema node.
///
/// One instance lives for one generation session; builders that can recurse
/// register a placeholder under their own identity *before* walking children,
/// so a cyclic reference resolves to the cache hit instead of re-entering
/// construction. Not thread-safe, and never reused across sessions: stale
/// entries would break the session-unique-names invariant.
#[derive(Debug, Default)]
pub struct DefinedSchemas {
    // IndexMap: registration order is definition order, which keeps session
    // introspection deterministic.
    schemas: IndexMap<String, Arc<Schema>>,
}

impl DefinedSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema for this type identity, if one was registered.
    pub fn find(&self, desc: &TypeDescriptor) -> Option<Arc<Schema>> {
        self.schemas.get(&desc.name).cloned()
    }

    /// Insert or replace. Callable with a not-yet-fully-built placeholder
    /// (`Schema::Ref`) which the owning builder replaces on finalize.
    pub fn register(&mut self, desc: &TypeDescriptor, schema: Arc<Schema>) {
        self.schemas.insert(desc.name.clone(), schema);
    }

    /// Named schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Schema>)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Name;

    fn desc(name: &str) -> TypeDescriptor {
        TypeDescriptor::reference(name)
    }

    #[test]
    fn find_returns_the_registered_arc() {
        let mut cache = DefinedSchemas::new();
        let node = Arc::new(Schema::Enum {
            name: Name::new("Color"),
            symbols: vec!["RED".into()],
        });
        cache.register(&desc("Color"), node.clone());
        let hit = cache.find(&desc("Color")).unwrap();
        assert!(Arc::ptr_eq(&hit, &node));
        assert!(cache.find(&desc("Other")).is_none());
    }

    #[test]
    fn register_replaces_placeholder_with_final_node() {
        let mut cache = DefinedSchemas::new();
        let placeholder = Arc::new(Schema::Ref { name: Name::new("Node") });
        cache.register(&desc("Node"), placeholder);

        let full = Arc::new(Schema::Record { name: Name::new("Node"), fields: vec![] });
        cache.register(&desc("Node"), full.clone());

        assert!(Arc::ptr_eq(&cache.find(&desc("Node")).unwrap(), &full));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut cache = DefinedSchemas::new();
        for name in ["B", "A", "C"] {
            cache.register(&desc(name), Arc::new(Schema::Record { name: Name::new(name), fields: vec![] }));
        }
        let order: Vec<&str> = cache.iter().map(|(k, _)| k).collect();
        assert_eq!(order, ["B", "A", "C"]);
    }
}
