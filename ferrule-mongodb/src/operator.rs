//! Compiling one operator on one resolved path into a MongoDB predicate.

use bson::{Bson, Document, doc};
use ferrule_query::{Leaf, OperandKind, Operator, OperatorRegistry};
use ferrule_schema::ScalarKind;
use serde_json::Value;
use tracing::debug;

use crate::types::{json_to_bson, list_items, number_list, parse_bool, sanitize, sanitize_reference};

/// The native form of one compiled condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A predicate at one physical path: `{ path: value }`.
    Path {
        /// Physical path.
        path: String,
        /// Bare value or operator document.
        value: Bson,
    },
    /// A self-contained condition spanning several paths, always keyed by
    /// `$and` so it can be deep-merged into any accumulator.
    Merge(Document),
}

impl Fragment {
    /// Create a path fragment.
    pub fn path(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Path {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Convert into a standalone filter document.
    pub fn into_document(self) -> Document {
        match self {
            Self::Path { path, value } => {
                let mut doc = Document::new();
                doc.insert(path, value);
                doc
            }
            Self::Merge(doc) => doc,
        }
    }
}

fn with_operator(path: &str, op: &str, value: impl Into<Bson>) -> Fragment {
    let mut inner = Document::new();
    inner.insert(op, value);
    Fragment::path(path, inner)
}

/// Embedded documents are matched through `$eq` so their keys are never read
/// as operators.
fn equality(path: &str, value: Bson) -> Fragment {
    match value {
        Bson::Document(_) => with_operator(path, "$eq", value),
        value => Fragment::path(path, value),
    }
}

fn all_of(conditions: Vec<Document>) -> Fragment {
    Fragment::Merge(doc! { "$and": conditions })
}

fn case_insensitive(pattern: &str) -> Document {
    doc! { "$regex": regex_lite::escape(pattern), "$options": "i" }
}

/// Translates `(path, operator, value)` into a [`Fragment`].
///
/// Returns `None` whenever the operator does not apply to the field or the
/// value cannot be used; the caller drops the condition.
///
/// # Example
///
/// ```rust
/// use bson::doc;
/// use ferrule_mongodb::OperatorCompiler;
/// use ferrule_query::{Leaf, OperandKind, Operator};
/// use ferrule_schema::ScalarKind;
/// use serde_json::json;
///
/// let compiler = OperatorCompiler::new();
/// let leaf = Leaf::single(OperandKind::Scalar(ScalarKind::Number));
///
/// let fragment = compiler.compile(&leaf, "views", Operator::GreaterThan, &json!("100")).unwrap();
/// assert_eq!(fragment.into_document(), doc! { "views": { "$gt": 100_i64 } });
///
/// assert!(compiler.compile(&leaf, "views", Operator::Like, &json!("x")).is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorCompiler {
    registry: OperatorRegistry,
}

impl OperatorCompiler {
    /// Create a compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile one operator against the leaf-relative `path`.
    pub fn compile(&self, leaf: &Leaf, path: &str, op: Operator, value: &Value) -> Option<Fragment> {
        if !self.registry.applies(op, leaf.operand) {
            debug!(path, operator = %op, operand = ?leaf.operand, "Operator does not apply to field");
            return None;
        }
        if leaf.operand == OperandKind::PolymorphicRelationship && op != Operator::Exists {
            return self.polymorphic(leaf, path, op, value);
        }

        match op {
            Operator::Equals => sanitize(value, leaf).map(|v| equality(path, v)),
            Operator::NotEquals => sanitize(value, leaf).map(|v| with_operator(path, "$ne", v)),
            Operator::GreaterThan => self.comparison(leaf, path, "$gt", value),
            Operator::GreaterThanEqual => self.comparison(leaf, path, "$gte", value),
            Operator::LessThan => self.comparison(leaf, path, "$lt", value),
            Operator::LessThanEqual => self.comparison(leaf, path, "$lte", value),
            Operator::Like => self.like(path, value),
            Operator::Contains => self.contains(leaf, path, value),
            Operator::In => self.membership(leaf, path, "$in", value),
            Operator::NotIn => self.membership(leaf, path, "$nin", value),
            Operator::All => self.membership(leaf, path, "$all", value),
            Operator::Exists => self.exists(leaf, path, value),
            Operator::Near => self.near(path, value),
            Operator::Within => self.geometry(path, "$geoWithin", value),
            Operator::Intersects => self.geometry(path, "$geoIntersects", value),
        }
    }

    fn comparison(&self, leaf: &Leaf, path: &str, op: &str, value: &Value) -> Option<Fragment> {
        match value {
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            _ => sanitize(value, leaf).map(|v| with_operator(path, op, v)),
        }
    }

    /// Every whitespace-separated word must appear, case-insensitively.
    fn like(&self, path: &str, value: &Value) -> Option<Fragment> {
        let Value::String(text) = value else {
            return None;
        };
        let mut words: Vec<Document> = text.split_whitespace().map(case_insensitive).collect();
        match words.len() {
            0 => None,
            1 => words.pop().map(|regex| Fragment::path(path, regex)),
            _ => Some(all_of(
                words
                    .into_iter()
                    .map(|regex| Fragment::path(path, regex).into_document())
                    .collect(),
            )),
        }
    }

    fn contains(&self, leaf: &Leaf, path: &str, value: &Value) -> Option<Fragment> {
        let matches_text = match leaf.operand {
            OperandKind::Scalar(kind) => {
                kind.is_textual() || matches!(kind, ScalarKind::Json | ScalarKind::RichText)
            }
            _ => false,
        };
        match value {
            Value::String(text) if matches_text => {
                let regex = case_insensitive(text);
                if leaf.has_many {
                    Some(with_operator(path, "$elemMatch", regex))
                } else {
                    Some(Fragment::path(path, regex))
                }
            }
            _ => self.membership(leaf, path, "$in", value),
        }
    }

    fn membership(&self, leaf: &Leaf, path: &str, op: &str, value: &Value) -> Option<Fragment> {
        let element = Leaf::single(leaf.operand);
        let values: Vec<Bson> = list_items(value)
            .iter()
            .filter_map(|item| sanitize(item, &element))
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(with_operator(path, op, values))
    }

    fn exists(&self, leaf: &Leaf, path: &str, value: &Value) -> Option<Fragment> {
        let exists = parse_bool(value)?;
        let condition = match (exists, leaf.is_array_like()) {
            (true, true) => doc! { "$exists": true, "$ne": [] },
            (false, true) => doc! { "$in": [Bson::Null, Bson::Array(Vec::new())] },
            (exists, false) => doc! { "$exists": exists },
        };
        Some(Fragment::path(path, condition))
    }

    /// `[longitude, latitude, maxDistance?, minDistance?]`.
    fn near(&self, path: &str, value: &Value) -> Option<Fragment> {
        let numbers = number_list(value);
        let (Some(Some(lng)), Some(Some(lat))) = (numbers.first().copied(), numbers.get(1).copied()) else {
            return None;
        };

        let mut near = doc! {
            "$geometry": { "type": "Point", "coordinates": [lng, lat] }
        };
        if let Some(Some(max)) = numbers.get(2).copied() {
            near.insert("$maxDistance", max);
        }
        if let Some(Some(min)) = numbers.get(3).copied() {
            near.insert("$minDistance", min);
        }
        Some(with_operator(path, "$near", near))
    }

    fn geometry(&self, path: &str, op: &str, value: &Value) -> Option<Fragment> {
        match value {
            Value::Object(shape) if shape.get("type").is_some_and(Value::is_string) => {
                Some(with_operator(path, op, doc! { "$geometry": json_to_bson(value) }))
            }
            _ => None,
        }
    }

    fn polymorphic(&self, leaf: &Leaf, path: &str, op: Operator, value: &Value) -> Option<Fragment> {
        let relation_path = format!("{path}.relationTo");
        let value_path = format!("{path}.value");
        match op {
            Operator::Equals => match value {
                Value::Null => Some(Fragment::path(path, Bson::Null)),
                Value::Object(_) => {
                    let (relation_to, id) = reference_pair(value)?;
                    if leaf.has_many {
                        Some(with_operator(path, "$elemMatch", doc! { "relationTo": relation_to, "value": id }))
                    } else {
                        Some(all_of(vec![
                            doc! { relation_path: relation_to },
                            doc! { value_path: id },
                        ]))
                    }
                }
                _ => sanitize_reference(value).map(|id| Fragment::path(value_path, id)),
            },
            Operator::NotEquals => match value {
                Value::Object(_) => {
                    let (relation_to, id) = reference_pair(value)?;
                    if leaf.has_many {
                        Some(with_operator(
                            path,
                            "$not",
                            doc! { "$elemMatch": { "relationTo": relation_to, "value": id } },
                        ))
                    } else {
                        Some(all_of(vec![doc! {
                            "$or": [
                                { relation_path: { "$ne": relation_to } },
                                { value_path: { "$ne": id } },
                            ]
                        }]))
                    }
                }
                _ => sanitize_reference(value).map(|id| with_operator(&value_path, "$ne", id)),
            },
            Operator::In | Operator::Contains | Operator::NotIn | Operator::All => {
                let conditions: Vec<Document> = list_items(value)
                    .iter()
                    .filter_map(|item| reference_condition(leaf, path, item))
                    .collect();
                if conditions.is_empty() {
                    return None;
                }
                Some(match op {
                    Operator::NotIn => all_of(vec![doc! { "$nor": conditions }]),
                    Operator::All => all_of(conditions),
                    _ => all_of(vec![doc! { "$or": conditions }]),
                })
            }
            _ => None,
        }
    }
}

/// Read `{ relationTo, value }`.
fn reference_pair(value: &Value) -> Option<(String, Bson)> {
    let relation_to = value.get("relationTo")?.as_str()?.to_string();
    let id = sanitize_reference(value.get("value")?)?;
    Some((relation_to, id))
}

/// One membership candidate of a polymorphic relationship: a pair or a bare id.
fn reference_condition(leaf: &Leaf, path: &str, item: &Value) -> Option<Document> {
    let value_path = format!("{path}.value");
    if !item.is_object() {
        let id = sanitize_reference(item)?;
        return Some(doc! { value_path: id });
    }
    let (relation_to, id) = reference_pair(item)?;
    Some(if leaf.has_many {
        doc! { path: { "$elemMatch": { "relationTo": relation_to, "value": id } } }
    } else {
        let relation_path = format!("{path}.relationTo");
        doc! { relation_path: relation_to, value_path: id }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use ferrule_schema::{IdType, ScalarKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const OID: &str = "507f1f77bcf86cd799439011";

    fn text() -> Leaf {
        Leaf::single(OperandKind::Scalar(ScalarKind::Text))
    }

    fn compile(leaf: Leaf, op: Operator, value: Value) -> Option<Document> {
        OperatorCompiler::new()
            .compile(&leaf, "f", op, &value)
            .map(Fragment::into_document)
    }

    fn oid() -> ObjectId {
        ObjectId::parse_str(OID).unwrap()
    }

    #[test]
    fn test_equals_and_not_equals() {
        assert_eq!(compile(text(), Operator::Equals, json!("test")), Some(doc! { "f": "test" }));
        assert_eq!(
            compile(text(), Operator::NotEquals, json!("tester")),
            Some(doc! { "f": { "$ne": "tester" } })
        );
        assert_eq!(compile(text(), Operator::Equals, json!(null)), Some(doc! { "f": Bson::Null }));
    }

    #[test]
    fn test_equals_on_json_matches_documents_literally() {
        let json = Leaf::single(OperandKind::Scalar(ScalarKind::Json));
        assert_eq!(
            compile(json, Operator::Equals, json!({ "$ne": null })),
            Some(doc! { "f": { "$eq": { "$ne": Bson::Null } } })
        );
        assert_eq!(
            compile(json, Operator::Equals, json!({ "$regex": ".*" })),
            Some(doc! { "f": { "$eq": { "$regex": ".*" } } })
        );
        assert_eq!(
            compile(json, Operator::Equals, json!({ "a": 1 })),
            Some(doc! { "f": { "$eq": { "a": 1_i64 } } })
        );
        assert_eq!(compile(json, Operator::Equals, json!([1, 2])), Some(doc! { "f": [1_i64, 2_i64] }));
    }

    #[test]
    fn test_comparisons() {
        let number = Leaf::single(OperandKind::Scalar(ScalarKind::Number));
        assert_eq!(
            compile(number, Operator::LessThanEqual, json!(5)),
            Some(doc! { "f": { "$lte": 5_i64 } })
        );
        assert_eq!(compile(number, Operator::GreaterThan, json!([1])), None);
        assert_eq!(compile(number, Operator::GreaterThan, json!("many")), None);

        let date = Leaf::single(OperandKind::Scalar(ScalarKind::Date));
        assert_eq!(
            compile(date, Operator::GreaterThanEqual, json!("2024-01-01")),
            Some(doc! { "f": { "$gte": bson::DateTime::from_millis(1_704_067_200_000) } })
        );
    }

    #[test]
    fn test_like() {
        assert_eq!(
            compile(text(), Operator::Like, json!("test")),
            Some(doc! { "f": { "$regex": "test", "$options": "i" } })
        );
        assert_eq!(
            compile(text(), Operator::Like, json!("a.b  c")),
            Some(doc! { "$and": [
                { "f": { "$regex": "a\\.b", "$options": "i" } },
                { "f": { "$regex": "c", "$options": "i" } },
            ] })
        );
        assert_eq!(compile(text(), Operator::Like, json!("   ")), None);
        assert_eq!(compile(text(), Operator::Like, json!(3)), None);
    }

    #[test]
    fn test_contains() {
        assert_eq!(
            compile(text(), Operator::Contains, json!("(x)")),
            Some(doc! { "f": { "$regex": "\\(x\\)", "$options": "i" } })
        );

        let tags = Leaf::new(OperandKind::Scalar(ScalarKind::Select), true);
        assert_eq!(
            compile(tags, Operator::Contains, json!("ru")),
            Some(doc! { "f": { "$elemMatch": { "$regex": "ru", "$options": "i" } } })
        );

        let rel = Leaf::new(OperandKind::Relationship, true);
        assert_eq!(
            compile(rel, Operator::Contains, json!(OID)),
            Some(doc! { "f": { "$in": [oid()] } })
        );
    }

    #[test]
    fn test_membership() {
        assert_eq!(
            compile(text(), Operator::In, json!("a,b")),
            Some(doc! { "f": { "$in": ["a", "b"] } })
        );
        assert_eq!(
            compile(text(), Operator::NotIn, json!(["a"])),
            Some(doc! { "f": { "$nin": ["a"] } })
        );
        assert_eq!(compile(text(), Operator::In, json!([])), None);
        assert_eq!(compile(text(), Operator::All, json!([])), None);

        let number = Leaf::single(OperandKind::Scalar(ScalarKind::Number));
        assert_eq!(
            compile(number, Operator::In, json!(["1", "x", 2])),
            Some(doc! { "f": { "$in": [1_i64, 2_i64] } })
        );
        assert_eq!(compile(number, Operator::In, json!(["x"])), None);

        let id = Leaf::single(OperandKind::Id(IdType::ObjectId));
        assert_eq!(
            compile(id, Operator::In, json!([OID])),
            Some(doc! { "f": { "$in": [oid()] } })
        );
    }

    #[test]
    fn test_exists() {
        assert_eq!(compile(text(), Operator::Exists, json!("true")), Some(doc! { "f": { "$exists": true } }));
        assert_eq!(compile(text(), Operator::Exists, json!("maybe")), None);

        let array = Leaf::new(OperandKind::Array, true);
        assert_eq!(
            compile(array, Operator::Exists, json!(true)),
            Some(doc! { "f": { "$exists": true, "$ne": [] } })
        );
        assert_eq!(
            compile(array, Operator::Exists, json!(false)),
            Some(doc! { "f": { "$in": [Bson::Null, []] } })
        );
        assert_eq!(compile(array, Operator::Equals, json!([])), None);
    }

    #[test]
    fn test_near() {
        let point = Leaf::single(OperandKind::Scalar(ScalarKind::Point));
        assert_eq!(
            compile(point, Operator::Near, json!("10, 20, 1000")),
            Some(doc! { "f": { "$near": {
                "$geometry": { "type": "Point", "coordinates": [10.0, 20.0] },
                "$maxDistance": 1000.0,
            } } })
        );
        assert_eq!(
            compile(point, Operator::Near, json!([10, 20, null, 5])),
            Some(doc! { "f": { "$near": {
                "$geometry": { "type": "Point", "coordinates": [10.0, 20.0] },
                "$minDistance": 5.0,
            } } })
        );
        assert_eq!(compile(point, Operator::Near, json!([10])), None);
    }

    #[test]
    fn test_geometry() {
        let point = Leaf::single(OperandKind::Scalar(ScalarKind::Point));
        let polygon = json!({ "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] });

        let compiled = compile(point, Operator::Within, polygon).unwrap();
        let inner = compiled.get_document("f").unwrap().get_document("$geoWithin").unwrap();
        assert_eq!(inner.get_document("$geometry").unwrap().get_str("type").unwrap(), "Polygon");

        assert_eq!(compile(point, Operator::Intersects, json!({ "coordinates": [] })), None);
    }

    #[test]
    fn test_polymorphic_equals() {
        let owner = Leaf::single(OperandKind::PolymorphicRelationship);
        assert_eq!(
            compile(owner, Operator::Equals, json!({ "relationTo": "users", "value": OID })),
            Some(doc! { "$and": [ { "f.relationTo": "users" }, { "f.value": oid() } ] })
        );
        assert_eq!(
            compile(owner, Operator::Equals, json!(OID)),
            Some(doc! { "f.value": oid() })
        );
        assert_eq!(compile(owner, Operator::Equals, json!({ "value": OID })), None);

        let owners = Leaf::new(OperandKind::PolymorphicRelationship, true);
        assert_eq!(
            compile(owners, Operator::Equals, json!({ "relationTo": "teams", "value": "t1" })),
            Some(doc! { "f": { "$elemMatch": { "relationTo": "teams", "value": "t1" } } })
        );
    }

    #[test]
    fn test_polymorphic_negation_and_membership() {
        let owner = Leaf::single(OperandKind::PolymorphicRelationship);
        assert_eq!(
            compile(owner, Operator::NotEquals, json!({ "relationTo": "users", "value": "u1" })),
            Some(doc! { "$and": [ { "$or": [
                { "f.relationTo": { "$ne": "users" } },
                { "f.value": { "$ne": "u1" } },
            ] } ] })
        );
        assert_eq!(
            compile(owner, Operator::In, json!([{ "relationTo": "users", "value": "u1" }, "x"])),
            Some(doc! { "$and": [ { "$or": [
                { "f.relationTo": "users", "f.value": "u1" },
                { "f.value": "x" },
            ] } ] })
        );
        assert_eq!(
            compile(owner, Operator::NotIn, json!([{ "relationTo": "teams", "value": "t1" }])),
            Some(doc! { "$and": [ { "$nor": [ { "f.relationTo": "teams", "f.value": "t1" } ] } ] })
        );
        assert_eq!(compile(owner, Operator::In, json!([])), None);
        assert_eq!(
            compile(owner, Operator::Exists, json!(false)),
            Some(doc! { "f": { "$exists": false } })
        );
    }
}
