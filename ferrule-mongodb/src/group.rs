//! Compiling the condition lists of `and` / `or` keys.

use bson::Document;
use ferrule_query::QueryResult;
use futures::future::try_join_all;
use serde_json::Value;
use tracing::trace;

use crate::compiler::{Scope, WhereCompiler};

/// Compiles every element of a relational group one level deeper.
///
/// Elements are compiled concurrently; results keep the input order and
/// elements that compile to an empty filter are dropped.
#[derive(Debug, Clone, Copy)]
pub struct ConditionGroupBuilder<'a> {
    compiler: &'a WhereCompiler,
}

impl<'a> ConditionGroupBuilder<'a> {
    /// Create a builder borrowing the compiler.
    pub fn new(compiler: &'a WhereCompiler) -> Self {
        Self { compiler }
    }

    /// Compile the elements of `conditions`.
    ///
    /// Anything other than a non-empty array yields an empty list, which the
    /// caller attaches as nothing.
    pub async fn build(&self, conditions: &'a Value, scope: Scope<'a>) -> QueryResult<Vec<Document>> {
        let items = match conditions {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Ok(Vec::new()),
        };

        let nested = scope.nested();
        let compiled = try_join_all(items.iter().map(|item| self.compiler.compile_node(item, nested))).await?;
        let total = compiled.len();
        let kept: Vec<Document> = compiled.into_iter().filter(|doc| !doc.is_empty()).collect();

        trace!(total, kept = kept.len(), depth = nested.depth(), "Compiled condition group");
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use ferrule_schema::{CollectionSchema, FerruleConfig, FieldArena, FieldDef, StaticSchemaProvider};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn arena() -> FieldArena {
        CollectionSchema::collection("posts")
            .fields(vec![FieldDef::text("title"), FieldDef::number("views")])
            .flatten()
            .unwrap()
    }

    fn compiler() -> WhereCompiler {
        WhereCompiler::new(Arc::new(StaticSchemaProvider::new()), &FerruleConfig::default())
    }

    #[tokio::test]
    async fn test_non_array_and_empty_groups() {
        let compiler = compiler();
        let arena = arena();
        let builder = ConditionGroupBuilder::new(&compiler);

        for conditions in [json!([]), json!({ "title": { "equals": "x" } }), json!("title"), json!(null)] {
            let built = builder.build(&conditions, Scope::root(&arena, None)).await.unwrap();
            assert!(built.is_empty(), "{conditions}");
        }
    }

    #[tokio::test]
    async fn test_build_keeps_order_and_drops_empty() {
        let compiler = compiler();
        let arena = arena();
        let conditions = json!([
            { "views": { "greater_than": 5 } },
            {},
            { "missing": { "equals": 1 } },
            { "title": { "equals": "x" } },
        ]);

        let built = ConditionGroupBuilder::new(&compiler)
            .build(&conditions, Scope::root(&arena, None))
            .await
            .unwrap();

        assert_eq!(built, vec![doc! { "views": { "$gt": 5_i64 } }, doc! { "title": "x" }]);
    }
}
