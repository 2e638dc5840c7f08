//! JSON to BSON conversion and per-field value sanitizing.
//!
//! Where clauses arrive as JSON, often straight from a query string, so
//! numbers may be strings and identifiers are always strings. Values are
//! coerced to what the field actually stores; a value that cannot be coerced
//! yields `None` and the condition is dropped by the caller.

use bson::{Bson, Document, oid::ObjectId};
use chrono::{DateTime, NaiveDate, Utc};
use ferrule_query::{Leaf, OperandKind};
use ferrule_schema::{IdType, ScalarKind};
use serde_json::{Number, Value};

/// Convert arbitrary JSON to BSON without coercion.
///
/// Integers become `Int64`, other numbers `Double`; object key order is kept.
pub fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_bson(v)))
                .collect::<Document>(),
        ),
    }
}

fn number_to_bson(n: &Number) -> Bson {
    match n.as_i64() {
        Some(i) => Bson::Int64(i),
        None => n.as_f64().map_or(Bson::Null, Bson::Double),
    }
}

/// Parse a string as an ObjectId if it looks like one.
pub fn object_id(s: &str) -> Option<ObjectId> {
    if s.len() == 24 && s.chars().all(|c| c.is_ascii_hexdigit()) {
        ObjectId::parse_str(s).ok()
    } else {
        None
    }
}

/// Coerce a JSON value to what a leaf stores.
///
/// `null` always passes through so `equals: null` and friends keep working.
pub fn sanitize(value: &Value, leaf: &Leaf) -> Option<Bson> {
    if value.is_null() {
        return Some(Bson::Null);
    }
    match leaf.operand {
        OperandKind::Id(id_type) => sanitize_id(value, id_type),
        OperandKind::Relationship | OperandKind::PolymorphicRelationship => sanitize_reference(value),
        OperandKind::Scalar(kind) => sanitize_scalar(value, kind),
        OperandKind::Array => None,
    }
}

fn sanitize_id(value: &Value, id_type: IdType) -> Option<Bson> {
    match (id_type, value) {
        (IdType::ObjectId, Value::String(s)) => {
            Some(object_id(s).map_or_else(|| Bson::String(s.clone()), Bson::ObjectId))
        }
        (IdType::Number, Value::String(s)) => parse_number(s),
        (IdType::Text, Value::String(s)) => Some(Bson::String(s.clone())),
        (IdType::Text, Value::Number(n)) => Some(Bson::String(n.to_string())),
        (_, Value::Number(n)) => Some(number_to_bson(n)),
        _ => None,
    }
}

/// Relationship values are document ids of the target collection.
pub fn sanitize_reference(value: &Value) -> Option<Bson> {
    match value {
        Value::Null => Some(Bson::Null),
        Value::String(s) => Some(object_id(s).map_or_else(|| Bson::String(s.clone()), Bson::ObjectId)),
        Value::Number(n) => Some(number_to_bson(n)),
        _ => None,
    }
}

fn sanitize_scalar(value: &Value, kind: ScalarKind) -> Option<Bson> {
    match kind {
        ScalarKind::Number => match value {
            Value::Number(n) => Some(number_to_bson(n)),
            Value::String(s) => parse_number(s.trim()),
            _ => None,
        },
        ScalarKind::Checkbox => parse_bool(value).map(Bson::Boolean),
        ScalarKind::Date => match value {
            Value::String(s) => parse_date(s.trim()),
            Value::Number(n) => n.as_i64().map(|ms| Bson::DateTime(bson::DateTime::from_millis(ms))),
            _ => None,
        },
        ScalarKind::Point => match value {
            Value::Array(_) | Value::Object(_) => Some(json_to_bson(value)),
            _ => None,
        },
        ScalarKind::Json | ScalarKind::RichText => Some(json_to_bson(value)),
        ScalarKind::Text
        | ScalarKind::Textarea
        | ScalarKind::Email
        | ScalarKind::Code
        | ScalarKind::Select
        | ScalarKind::Radio => match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(json_to_bson(value)),
            _ => None,
        },
    }
}

fn parse_number(s: &str) -> Option<Bson> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Bson::Int64(i));
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite()).map(Bson::Double)
}

/// Accept a boolean or the strings `"true"` / `"false"`.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Parse RFC 3339, `YYYY-MM-DD` (midnight UTC) or epoch milliseconds.
pub fn parse_date(s: &str) -> Option<Bson> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Bson::DateTime(bson::DateTime::from_chrono(dt.with_timezone(&Utc))));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
        return Some(Bson::DateTime(bson::DateTime::from_chrono(midnight)));
    }
    s.parse::<i64>()
        .ok()
        .map(|ms| Bson::DateTime(bson::DateTime::from_millis(ms)))
}

/// Read a list operand: a JSON array, or a comma-separated string.
///
/// A single scalar counts as a one-element list; `null` as an empty one.
pub fn list_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect(),
        other => vec![other.clone()],
    }
}

/// Read numbers from an array or comma-separated string, skipping blanks.
pub fn number_list(value: &Value) -> Vec<Option<f64>> {
    let parse = |v: &Value| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Value::Array(items) => items.iter().map(parse).collect(),
        Value::String(s) => s.split(',').map(|p| p.trim().parse::<f64>().ok()).collect(),
        _ => Vec::new(),
    }
}
