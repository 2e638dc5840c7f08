//! Schema providers hand out flattened field arenas per collection or global.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use crate::arena::{CollectionSchema, FieldArena};
use crate::error::{SchemaError, SchemaResult};

/// Identifies the collection or global being queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTarget {
    /// A collection slug.
    Collection(SmolStr),
    /// A global slug.
    Global(SmolStr),
}

impl QueryTarget {
    /// Target a collection.
    pub fn collection(slug: impl Into<SmolStr>) -> Self {
        Self::Collection(slug.into())
    }

    /// Target a global.
    pub fn global(slug: impl Into<SmolStr>) -> Self {
        Self::Global(slug.into())
    }

    /// Get the slug.
    pub fn slug(&self) -> &str {
        match self {
            Self::Collection(slug) | Self::Global(slug) => slug,
        }
    }

    /// Get the target kind as a string.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Collection(_) => "collection",
            Self::Global(_) => "global",
        }
    }

    /// Check if this targets a collection.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.slug())
    }
}

/// Supplies the flattened fields of a collection or global.
///
/// Implementations must be cheap to call once per compilation; the returned
/// arena is shared read-only.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Get the arena for `target`.
    async fn fields(&self, target: &QueryTarget) -> SchemaResult<Arc<FieldArena>>;
}

/// In-memory provider populated at startup.
///
/// # Example
///
/// ```rust
/// use ferrule_schema::{CollectionSchema, FieldDef, StaticSchemaProvider};
///
/// let provider = StaticSchemaProvider::new();
/// provider
///     .register(&CollectionSchema::collection("posts").fields(vec![FieldDef::text("title")]))
///     .unwrap();
/// assert_eq!(provider.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct StaticSchemaProvider {
    arenas: RwLock<HashMap<QueryTarget, Arc<FieldArena>>>,
}

impl StaticSchemaProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider from several schemas.
    pub fn from_schemas<'a>(schemas: impl IntoIterator<Item = &'a CollectionSchema>) -> SchemaResult<Self> {
        let provider = Self::new();
        for schema in schemas {
            provider.register(schema)?;
        }
        Ok(provider)
    }

    /// Flatten and register a schema, replacing any previous one for the same target.
    pub fn register(&self, schema: &CollectionSchema) -> SchemaResult<Arc<FieldArena>> {
        let arena = Arc::new(schema.flatten()?);
        self.arenas.write().insert(schema.target.clone(), Arc::clone(&arena));
        debug!(target = %schema.target, "Registered schema");
        Ok(arena)
    }

    /// Get an arena without going through the async trait.
    pub fn get(&self, target: &QueryTarget) -> Option<Arc<FieldArena>> {
        self.arenas.read().get(target).cloned()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.arenas.read().len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.arenas.read().is_empty()
    }
}

#[async_trait]
impl SchemaProvider for StaticSchemaProvider {
    async fn fields(&self, target: &QueryTarget) -> SchemaResult<Arc<FieldArena>> {
        self.get(target)
            .ok_or_else(|| SchemaError::unknown_target(target.kind(), target.slug()))
    }
}
