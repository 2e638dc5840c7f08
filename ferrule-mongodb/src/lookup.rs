//! Resolving relationship conditions to the ids of matching documents.

use async_trait::async_trait;
use bson::{Bson, Document};
use ferrule_query::QueryResult;
use mongodb::Database;
use tracing::debug;

use crate::error::MongoError;

/// Finds the ids of related documents matching a compiled filter.
///
/// Used for paths that continue past a relationship field
/// (`author.name`): the remainder is compiled against the related
/// collection, its ids are fetched here, and the outer condition becomes an
/// `$in` on the relationship field.
#[async_trait]
pub trait RelationLookup: Send + Sync {
    /// Ids of the documents in `collection` matching `filter`.
    async fn find_ids(&self, collection: &str, filter: Document) -> QueryResult<Vec<Bson>>;
}

/// [`RelationLookup`] backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoRelationLookup {
    db: Database,
}

impl MongoRelationLookup {
    /// Create a lookup over `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RelationLookup for MongoRelationLookup {
    async fn find_ids(&self, collection: &str, filter: Document) -> QueryResult<Vec<Bson>> {
        debug!(collection, filter = %filter, "Looking up related ids");

        let ids = self
            .db
            .collection::<Document>(collection)
            .distinct("_id", filter, None)
            .await
            .map_err(|e| MongoError::lookup(collection, e))?;

        debug!(collection, count = ids.len(), "Related ids found");
        Ok(ids)
    }
}
