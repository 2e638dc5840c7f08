//! # ferrule-mongodb
//!
//! Compiles Ferrule Where clauses into MongoDB filter documents.
//!
//! This crate provides:
//! - [`WhereCompiler`], the entry point
//! - Logical-to-physical path resolution with localization and `$elemMatch`
//!   scoping ([`PathResolver`])
//! - Per-operator translation ([`OperatorCompiler`]) and value sanitizing
//! - Collision-safe result assembly ([`ResultMerger`])
//! - Relationship subqueries through the MongoDB driver ([`MongoRelationLookup`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use ferrule_mongodb::{MongoRelationLookup, WhereCompiler};
//! use ferrule_schema::{FerruleConfig, QueryTarget, StaticSchemaProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FerruleConfig::from_file("ferrule.toml")?;
//!     let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//!     let db = client.database("app");
//!
//!     let compiler = WhereCompiler::new(Arc::new(StaticSchemaProvider::new()), &config)
//!         .with_relation_lookup(Arc::new(MongoRelationLookup::new(db.clone())));
//!
//!     let filter = compiler
//!         .compile(
//!             &json!({ "author.name": { "equals": "Ada" }, "views": { "greater_than": 10 } }),
//!             &QueryTarget::collection("posts"),
//!             Some("en"),
//!         )
//!         .await?;
//!
//!     let posts = db.collection::<bson::Document>("posts").find(filter, None).await?;
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod group;
pub mod lookup;
pub mod merge;
pub mod operator;
pub mod path;
pub mod types;

pub use bson::oid::ObjectId;
pub use bson::{Bson, Document, doc};
pub use compiler::{Scope, WhereCompiler};
pub use error::{MongoError, MongoResult};
pub use group::ConditionGroupBuilder;
pub use lookup::{MongoRelationLookup, RelationLookup};
pub use merge::{ResultMerger, deep_merge};
pub use operator::{Fragment, OperatorCompiler};
pub use path::{PathResolver, PhysicalPath, RelationshipHop, Resolution, ResolvedPath};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::compiler::WhereCompiler;
    pub use crate::error::{MongoError, MongoResult};
    pub use crate::lookup::{MongoRelationLookup, RelationLookup};
    pub use bson::{Bson, Document, doc};
}
