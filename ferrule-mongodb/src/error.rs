//! Error types for MongoDB operations.

use ferrule_query::QueryError;
use thiserror::Error;

/// Result type for MongoDB operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors raised while talking to MongoDB.
#[derive(Error, Debug)]
pub enum MongoError {
    /// A relationship subquery failed.
    #[error("lookup in `{collection}` failed: {source}")]
    Lookup {
        /// Collection that was queried.
        collection: String,
        /// Driver error.
        #[source]
        source: mongodb::error::Error,
    },
}

impl MongoError {
    /// Create a lookup error.
    pub fn lookup(collection: impl Into<String>, source: mongodb::error::Error) -> Self {
        Self::Lookup {
            collection: collection.into(),
            source,
        }
    }
}

impl From<MongoError> for QueryError {
    fn from(err: MongoError) -> Self {
        let MongoError::Lookup { collection, source } = err;
        QueryError::lookup(collection, source.to_string()).with_source(source)
    }
}
