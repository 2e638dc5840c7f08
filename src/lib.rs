//! # Ferrule
//!
//! Compiles nested Where clauses over localized, deeply nested document
//! schemas into MongoDB filter documents.
//!
//! Ferrule provides:
//! - A schema model with groups, tabs, arrays, blocks, localization and
//!   polymorphic relationships
//! - A JSON Where DSL with `and` / `or` grouping and a closed operator set
//! - A best-effort compiler that drops what it cannot translate instead of
//!   failing the whole query
//! - Relationship traversal through subqueries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use ferrule::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = StaticSchemaProvider::new();
//!     provider.register(&CollectionSchema::collection("posts").fields(vec![
//!         FieldDef::text("title").localized(),
//!         FieldDef::number("views"),
//!     ]))?;
//!
//!     let config = FerruleConfig::from_file("ferrule.toml")?;
//!     let compiler = WhereCompiler::new(Arc::new(provider), &config);
//!
//!     let filter = compiler
//!         .compile(
//!             &json!({ "or": [{ "title": { "like": "rust" } }, { "views": { "greater_than": 100 } }] }),
//!             &QueryTarget::collection("posts"),
//!             Some("en"),
//!         )
//!         .await?;
//!
//!     println!("{filter}");
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema model, configuration and schema providers.
pub mod schema {
    pub use ferrule_schema::*;
}

/// Where DSL, operators and errors.
pub mod query {
    pub use ferrule_query::*;
}

/// The MongoDB compiler.
pub mod mongodb {
    pub use ferrule_mongodb::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::mongodb::{MongoRelationLookup, RelationLookup, WhereCompiler};
    pub use crate::query::{Operator, QueryError, QueryResult, Where};
    pub use crate::schema::{
        CollectionSchema, FerruleConfig, FieldDef, QueryTarget, SchemaProvider, StaticSchemaProvider,
    };
}

// Re-export key types at the crate root
pub use mongodb::WhereCompiler;
pub use query::{QueryError, QueryResult, Where};
pub use schema::{FerruleConfig, SchemaError};
