//! # ferrule-schema
//!
//! Schema model for the Ferrule Where-clause compiler.
//!
//! This crate provides:
//! - Field definitions ([`FieldDef`]) and the closed [`FieldKind`] enumeration
//! - Flattening into a read-only [`FieldArena`] indexed by stable path keys
//! - The [`SchemaProvider`] interface and an in-memory implementation
//! - Configuration parsing for `ferrule.toml`
//!
//! ## Example
//!
//! ```rust
//! use ferrule_schema::{CollectionSchema, FieldDef, FieldKind};
//!
//! let arena = CollectionSchema::collection("posts")
//!     .fields(vec![
//!         FieldDef::text("title").localized(),
//!         FieldDef::polymorphic("owner", ["users", "teams"]),
//!     ])
//!     .flatten()?;
//!
//! let owner = arena.get("owner").unwrap();
//! assert!(matches!(owner.kind, FieldKind::PolymorphicRelationship { .. }));
//! # Ok::<(), ferrule_schema::SchemaError>(())
//! ```

pub mod arena;
pub mod config;
pub mod error;
pub mod field;
pub mod provider;

pub use arena::{CollectionSchema, FieldArena, FieldDescriptor, FieldId};
pub use config::{ALL_LOCALES, DebugConfig, FerruleConfig, LocalizationConfig, QueryConfig};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDef, FieldKind, IdType, ScalarKind};
pub use provider::{QueryTarget, SchemaProvider, StaticSchemaProvider};
