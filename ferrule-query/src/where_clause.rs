//! The Where clause: a nested JSON filter over logical field paths.
//!
//! ```text
//! Where := { [and|or]: Where[] } | { <fieldPath>: { <operator>: <value>, ... }, ... }
//! ```
//!
//! Several keys at one level are AND-combined. Relational keys are matched
//! case-insensitively. Key order is preserved, so compiled output follows the
//! order the caller wrote.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::QueryResult;
use crate::operator::Operator;

/// A logical grouping keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Every condition must hold.
    And,
    /// At least one condition must hold.
    Or,
}

impl Relation {
    /// Match a key case-insensitively against `and` / `or`.
    pub fn from_key(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if key.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// Get the canonical keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Where clause.
///
/// Wraps the raw JSON so callers can build clauses in code or accept them from
/// an API request unchanged. Anything that is not a JSON object means
/// "no filter".
///
/// ```rust
/// use ferrule_query::{Operator, Where};
/// use serde_json::json;
///
/// let filter = Where::builder()
///     .condition("title", Operator::Like, "hello world")
///     .or(vec![
///         Where::field("status", Operator::Equals, "published"),
///         Where::field("featured", Operator::Equals, true),
///     ])
///     .build();
///
/// assert_eq!(
///     filter.as_value(),
///     &json!({
///         "title": { "like": "hello world" },
///         "or": [
///             { "status": { "equals": "published" } },
///             { "featured": { "equals": true } }
///         ]
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Where(Value);

impl Where {
    /// An empty clause that matches everything.
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Start a builder.
    pub fn builder() -> WhereBuilder {
        WhereBuilder::new()
    }

    /// A single condition on one path.
    pub fn field(path: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        WhereBuilder::new().condition(path, op, value).build()
    }

    /// AND-combine several clauses.
    pub fn and(conditions: Vec<Where>) -> Self {
        WhereBuilder::new().and(conditions).build()
    }

    /// OR-combine several clauses.
    pub fn or(conditions: Vec<Where>) -> Self {
        WhereBuilder::new().or(conditions).build()
    }

    /// Parse a clause from JSON text.
    pub fn parse(json: &str) -> QueryResult<Self> {
        Ok(Self(serde_json::from_str(json)?))
    }

    /// Borrow the underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying JSON.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Whether the clause filters nothing.
    pub fn is_empty(&self) -> bool {
        self.0.as_object().is_none_or(Map::is_empty)
    }
}

impl Default for Where {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for Where {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Where> for Value {
    fn from(clause: Where) -> Self {
        clause.0
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fluent builder for [`Where`].
#[derive(Debug, Clone, Default)]
pub struct WhereBuilder {
    entries: Map<String, Value>,
}

impl WhereBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `op: value` to the operators of `path`.
    ///
    /// Repeating a path adds another operator to the same path; repeating the
    /// same operator replaces its value.
    pub fn condition(mut self, path: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        let slot = self
            .entries
            .entry(path.into())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(ops) = slot {
            ops.insert(op.as_str().to_string(), value.into());
        }
        self
    }

    /// Append clauses to the `and` list.
    pub fn and(self, conditions: Vec<Where>) -> Self {
        self.group(Relation::And, conditions)
    }

    /// Append clauses to the `or` list.
    pub fn or(self, conditions: Vec<Where>) -> Self {
        self.group(Relation::Or, conditions)
    }

    fn group(mut self, relation: Relation, conditions: Vec<Where>) -> Self {
        let slot = self
            .entries
            .entry(relation.as_str().to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = slot {
            items.extend(conditions.into_iter().map(Where::into_value));
        }
        self
    }

    /// Finish the clause.
    pub fn build(self) -> Where {
        Where(Value::Object(self.entries))
    }
}
