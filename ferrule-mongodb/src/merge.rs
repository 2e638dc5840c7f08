//! Folding compiled fragments into one filter document.
//!
//! Values are moved out of each fragment into the accumulator. Nothing is
//! cloned, so identifier tokens such as `ObjectId`s end up in the result
//! exactly as the compiler produced them.

use bson::{Bson, Document};
use ferrule_query::Relation;

use crate::operator::Fragment;

/// Native key for a relational keyword.
pub fn relation_key(relation: Relation) -> &'static str {
    match relation {
        Relation::And => "$and",
        Relation::Or => "$or",
    }
}

/// Deep-merge `source` into `target`.
///
/// Documents at the same key merge recursively, two arrays at the same key
/// are concatenated in order, anything else is replaced by the source value.
pub fn deep_merge(target: &mut Document, source: Document) {
    for (key, value) in source {
        match value {
            Bson::Document(incoming) => match target.get_mut(&key) {
                Some(Bson::Document(existing)) => deep_merge(existing, incoming),
                _ => {
                    target.insert(key, incoming);
                }
            },
            Bson::Array(incoming) => match target.get_mut(&key) {
                Some(Bson::Array(existing)) => existing.extend(incoming),
                _ => {
                    target.insert(key, incoming);
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

fn is_operator_doc(value: &Bson) -> Option<&Document> {
    match value {
        Bson::Document(doc) if !doc.is_empty() && doc.keys().all(|k| k.starts_with('$')) => Some(doc),
        _ => None,
    }
}

/// Accumulates the compiled filter for one Where node.
///
/// # Example
///
/// ```rust
/// use bson::{Bson, doc};
/// use ferrule_mongodb::ResultMerger;
///
/// let mut merger = ResultMerger::new();
/// merger.merge_path("price".to_string(), Bson::Document(doc! { "$gt": 10 }));
/// merger.merge_path("price".to_string(), Bson::Document(doc! { "$lt": 20 }));
/// merger.merge_path("price".to_string(), Bson::Document(doc! { "$lt": 15 }));
///
/// assert_eq!(
///     merger.finish(),
///     doc! { "price": { "$gt": 10, "$lt": 20 }, "$and": [ { "price": { "$lt": 15 } } ] }
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResultMerger {
    doc: Document,
}

impl ResultMerger {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merge a whole document.
    pub fn merge(&mut self, source: Document) {
        deep_merge(&mut self.doc, source);
    }

    /// Append one condition to the `$and` list.
    pub fn push_and(&mut self, condition: Document) {
        match self.doc.get_mut("$and") {
            Some(Bson::Array(items)) => items.push(Bson::Document(condition)),
            Some(other) => {
                let previous = std::mem::replace(other, Bson::Null);
                *other = Bson::Array(vec![previous, Bson::Document(condition)]);
            }
            None => {
                self.doc.insert("$and", vec![Bson::Document(condition)]);
            }
        }
    }

    /// Place a value under a physical path without overwriting anything.
    ///
    /// An absent key is inserted. Two operator documents with disjoint
    /// operators are combined (`$gt` next to `$lt`). Any other collision is
    /// appended to `$and`.
    pub fn merge_path(&mut self, path: String, value: Bson) {
        let disjoint = match self.doc.get(&path) {
            None => {
                self.doc.insert(path, value);
                return;
            }
            Some(existing) => match (is_operator_doc(existing), is_operator_doc(&value)) {
                (Some(current), Some(incoming)) => incoming.keys().all(|k| !current.contains_key(k)),
                _ => false,
            },
        };

        if disjoint {
            if let (Some(Bson::Document(current)), Bson::Document(incoming)) = (self.doc.get_mut(&path), value) {
                for (op, operand) in incoming {
                    current.insert(op, operand);
                }
            }
        } else {
            let mut condition = Document::new();
            condition.insert(path, value);
            self.push_and(condition);
        }
    }

    /// Fold in one compiled fragment.
    pub fn add(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Path { path, value } => self.merge_path(path, value),
            Fragment::Merge(doc) => self.merge(doc),
        }
    }

    /// Fold in a fragment that shares its path with sibling operators.
    ///
    /// Path fragments always go to `$and` so operators on one path never
    /// meet at the same key.
    pub fn add_to_and(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Path { .. } => self.push_and(fragment.into_document()),
            Fragment::Merge(doc) => self.merge(doc),
        }
    }

    /// Attach a compiled `and`/`or` group; empty groups attach nothing.
    ///
    /// `$and` lists concatenate. A second `$or` at the same level becomes an
    /// `$and` entry, since concatenating two OR lists would widen the match.
    pub fn attach_group(&mut self, relation: Relation, conditions: Vec<Document>) {
        if conditions.is_empty() {
            return;
        }
        let key = relation_key(relation);
        let list: Vec<Bson> = conditions.into_iter().map(Bson::Document).collect();

        match relation {
            Relation::And => {
                let mut group = Document::new();
                group.insert(key, list);
                self.merge(group);
            }
            Relation::Or if self.doc.contains_key(key) => {
                let mut group = Document::new();
                group.insert(key, list);
                self.push_and(group);
            }
            Relation::Or => {
                self.doc.insert(key, list);
            }
        }
    }

    /// Whether nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Take the accumulated filter.
    pub fn finish(self) -> Document {
        self.doc
    }
}
