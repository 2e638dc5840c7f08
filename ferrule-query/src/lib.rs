//! # ferrule-query
//!
//! Backend-independent pieces of the Ferrule Where-clause compiler.
//!
//! This crate provides:
//! - The [`Where`] clause and its fluent [`WhereBuilder`]
//! - The closed [`Operator`] set and the [`OperatorRegistry`] validity table
//! - [`QueryError`] with stable error codes
//! - An opt-in `tracing` subscriber bootstrap in [`logging`]
//!
//! ## Building Where clauses
//!
//! ```rust
//! use ferrule_query::{Operator, Where};
//!
//! let clause = Where::builder()
//!     .condition("title", Operator::Like, "rust")
//!     .condition("views", Operator::GreaterThan, 100)
//!     .build();
//!
//! assert!(!clause.is_empty());
//! ```
//!
//! ## Operator validity
//!
//! ```rust
//! use ferrule_query::{OperandKind, Operator, OperatorRegistry};
//!
//! let registry = OperatorRegistry;
//! assert_eq!(registry.lookup("not_in"), Some(Operator::NotIn));
//! assert!(registry.lookup("regex").is_none());
//! assert!(registry.applies(Operator::Exists, OperandKind::Array));
//! ```

pub mod error;
pub mod logging;
pub mod operator;
pub mod where_clause;

pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use operator::{Leaf, OperandKind, Operator, OperatorRegistry};
pub use where_clause::{Relation, Where, WhereBuilder};
