//! The closed operator set and which operand kinds each operator applies to.

use std::fmt;

use ferrule_schema::{IdType, ScalarKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A comparison operator accepted in a Where clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal to the value.
    Equals,
    /// Not equal to the value.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterThanEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessThanEqual,
    /// Case-insensitive match of every whitespace-separated word.
    Like,
    /// Substring match for text, membership otherwise.
    Contains,
    /// In a list of values.
    In,
    /// Not in a list of values.
    NotIn,
    /// Contains all listed values.
    All,
    /// Field is present (or absent).
    Exists,
    /// Geospatial proximity.
    Near,
    /// Geometry lies within a shape.
    Within,
    /// Geometry intersects a shape.
    Intersects,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 15] = [
        Self::Equals,
        Self::NotEquals,
        Self::GreaterThan,
        Self::GreaterThanEqual,
        Self::LessThan,
        Self::LessThanEqual,
        Self::Like,
        Self::Contains,
        Self::In,
        Self::NotIn,
        Self::All,
        Self::Exists,
        Self::Near,
        Self::Within,
        Self::Intersects,
    ];

    /// Get the name used in Where clauses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanEqual => "greater_than_equal",
            Self::LessThan => "less_than",
            Self::LessThanEqual => "less_than_equal",
            Self::Like => "like",
            Self::Contains => "contains",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::All => "all",
            Self::Exists => "exists",
            Self::Near => "near",
            Self::Within => "within",
            Self::Intersects => "intersects",
        }
    }

    /// Parse an operator name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Whether this is one of the ordering comparisons.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanEqual | Self::LessThan | Self::LessThanEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of stored value a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// The document identifier.
    Id(IdType),
    /// A scalar field.
    Scalar(ScalarKind),
    /// Identifier(s) of documents in one collection.
    Relationship,
    /// `{ relationTo, value }` pair(s).
    PolymorphicRelationship,
    /// An array or blocks field addressed as a whole.
    Array,
}

/// The operand kind plus storage cardinality of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Leaf {
    /// Operand kind.
    pub operand: OperandKind,
    /// Stores a list of values.
    pub has_many: bool,
}

impl Leaf {
    /// A leaf storing a single value.
    pub fn single(operand: OperandKind) -> Self {
        Self {
            operand,
            has_many: false,
        }
    }

    /// A leaf with explicit cardinality.
    pub fn new(operand: OperandKind, has_many: bool) -> Self {
        Self { operand, has_many }
    }

    /// Whether the stored value is a list.
    pub fn is_array_like(&self) -> bool {
        self.has_many || matches!(self.operand, OperandKind::Array)
    }
}

const TEXT_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Like,
    Operator::Contains,
    Operator::In,
    Operator::NotIn,
    Operator::All,
    Operator::Exists,
    Operator::GreaterThan,
    Operator::GreaterThanEqual,
    Operator::LessThan,
    Operator::LessThanEqual,
];
const NUMBER_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::In,
    Operator::NotIn,
    Operator::All,
    Operator::Exists,
    Operator::GreaterThan,
    Operator::GreaterThanEqual,
    Operator::LessThan,
    Operator::LessThanEqual,
];
const CHECKBOX_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Exists,
    Operator::In,
    Operator::NotIn,
];
const DATE_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Exists,
    Operator::In,
    Operator::NotIn,
    Operator::GreaterThan,
    Operator::GreaterThanEqual,
    Operator::LessThan,
    Operator::LessThanEqual,
];
const POINT_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Exists,
    Operator::Near,
    Operator::Within,
    Operator::Intersects,
];
const JSON_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Like,
    Operator::Contains,
    Operator::In,
    Operator::NotIn,
    Operator::Exists,
    Operator::GreaterThan,
    Operator::GreaterThanEqual,
    Operator::LessThan,
    Operator::LessThanEqual,
    Operator::Within,
    Operator::Intersects,
];
const RICH_TEXT_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Like,
    Operator::Contains,
    Operator::Exists,
];
const RELATION_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::In,
    Operator::NotIn,
    Operator::All,
    Operator::Exists,
    Operator::Contains,
];
const ID_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::In,
    Operator::NotIn,
    Operator::Exists,
    Operator::GreaterThan,
    Operator::GreaterThanEqual,
    Operator::LessThan,
    Operator::LessThanEqual,
];
const ARRAY_OPS: &[Operator] = &[Operator::Exists];

/// Recognizes operator names and decides which operators apply to which
/// operand kinds.
///
/// The registry is stateless; it exists so the validity table lives in one
/// place.
///
/// ```rust
/// use ferrule_query::{Operator, OperandKind, OperatorRegistry};
/// use ferrule_schema::ScalarKind;
///
/// let registry = OperatorRegistry;
/// assert!(registry.applies(Operator::Like, OperandKind::Scalar(ScalarKind::Text)));
/// assert!(!registry.applies(Operator::Like, OperandKind::Scalar(ScalarKind::Number)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorRegistry;

impl OperatorRegistry {
    /// Parse an operator name; unknown names yield `None`.
    pub fn lookup(&self, name: &str) -> Option<Operator> {
        Operator::from_name(name)
    }

    /// Operators allowed for an operand kind.
    pub fn operators_for(&self, operand: OperandKind) -> &'static [Operator] {
        match operand {
            OperandKind::Id(_) => ID_OPS,
            OperandKind::Scalar(kind) => match kind {
                ScalarKind::Number => NUMBER_OPS,
                ScalarKind::Checkbox => CHECKBOX_OPS,
                ScalarKind::Date => DATE_OPS,
                ScalarKind::Point => POINT_OPS,
                ScalarKind::Json => JSON_OPS,
                ScalarKind::RichText => RICH_TEXT_OPS,
                ScalarKind::Text
                | ScalarKind::Textarea
                | ScalarKind::Email
                | ScalarKind::Code
                | ScalarKind::Select
                | ScalarKind::Radio => TEXT_OPS,
            },
            OperandKind::Relationship | OperandKind::PolymorphicRelationship => RELATION_OPS,
            OperandKind::Array => ARRAY_OPS,
        }
    }

    /// Whether `op` may be applied to `operand`.
    pub fn applies(&self, op: Operator, operand: OperandKind) -> bool {
        self.operators_for(operand).contains(&op)
    }

    /// Keep the recognized operators of an operator map, in key order.
    ///
    /// Unknown names are dropped here; applicability to the field is checked
    /// later, once the path has been resolved.
    pub fn recognize<'a>(&self, operators: &'a Map<String, Value>) -> Vec<(Operator, &'a Value)> {
        operators
            .iter()
            .filter_map(|(name, value)| match self.lookup(name) {
                Some(op) => Some((op, value)),
                None => {
                    tracing::debug!(operator = %name, "Dropping unknown operator");
                    None
                }
            })
            .collect()
    }
}
