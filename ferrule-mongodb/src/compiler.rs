//! The Where-clause compiler.
//!
//! [`WhereCompiler`] walks a Where tree and produces one MongoDB filter
//! document. Relational keys recurse through [`ConditionGroupBuilder`]; field
//! paths are resolved by [`PathResolver`], compiled operator by operator with
//! [`OperatorCompiler`] and folded together by [`ResultMerger`].
//!
//! The compiler is best-effort. Unknown operators, unresolvable paths and
//! values that do not fit a field are dropped (logged at `debug`); only the
//! schema provider and relation lookups can fail a compilation.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bson::{Bson, Document, doc};
use ferrule_query::{Operator, OperatorRegistry, QueryResult, Relation, Where};
use ferrule_schema::{FerruleConfig, FieldArena, LocalizationConfig, QueryTarget, SchemaProvider};
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};

use crate::group::ConditionGroupBuilder;
use crate::lookup::RelationLookup;
use crate::merge::ResultMerger;
use crate::operator::{Fragment, OperatorCompiler};
use crate::path::{PathResolver, RelationshipHop, Resolution, ResolvedPath};

/// Where one Where node is compiled: the fields in scope, the active locale
/// and the nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    arena: &'a FieldArena,
    locale: Option<&'a str>,
    depth: usize,
}

impl<'a> Scope<'a> {
    /// Scope of a top-level clause.
    pub fn root(arena: &'a FieldArena, locale: Option<&'a str>) -> Self {
        Self {
            arena,
            locale,
            depth: 0,
        }
    }

    /// The fields paths are resolved against.
    pub fn arena(&self) -> &'a FieldArena {
        self.arena
    }

    /// The active locale, if any.
    pub fn locale(&self) -> Option<&'a str> {
        self.locale
    }

    /// Nesting depth; the top-level clause is at 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The same scope one level deeper.
    pub fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn with_arena(self, arena: &'a FieldArena) -> Self {
        Self { arena, ..self }
    }
}

/// Compiled output of one key of a Where node.
enum Compiled {
    Skip,
    Group(Relation, Vec<Document>),
    Leaf { fragments: Vec<Fragment>, multi: bool },
}

/// Compiles Where clauses into MongoDB filter documents.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use bson::doc;
/// use ferrule_mongodb::WhereCompiler;
/// use ferrule_schema::{CollectionSchema, FerruleConfig, FieldDef, QueryTarget, StaticSchemaProvider};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = StaticSchemaProvider::new();
/// provider.register(&CollectionSchema::collection("posts").fields(vec![FieldDef::text("title")]))?;
///
/// let compiler = WhereCompiler::new(Arc::new(provider), &FerruleConfig::default());
/// let filter = compiler
///     .compile(&json!({ "title": { "equals": "test" } }), &QueryTarget::collection("posts"), None)
///     .await?;
///
/// assert_eq!(filter, doc! { "title": "test" });
/// # Ok(())
/// # }
/// ```
pub struct WhereCompiler {
    schemas: Arc<dyn SchemaProvider>,
    lookup: Option<Arc<dyn RelationLookup>>,
    localization: LocalizationConfig,
    max_depth: usize,
    log_queries: bool,
    registry: OperatorRegistry,
    operators: OperatorCompiler,
}

impl fmt::Debug for WhereCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhereCompiler")
            .field("localization", &self.localization)
            .field("max_depth", &self.max_depth)
            .field("log_queries", &self.log_queries)
            .field("has_lookup", &self.lookup.is_some())
            .finish_non_exhaustive()
    }
}

impl WhereCompiler {
    /// Create a compiler reading schemas from `schemas`.
    pub fn new(schemas: Arc<dyn SchemaProvider>, config: &FerruleConfig) -> Self {
        Self {
            schemas,
            lookup: None,
            localization: config.localization.clone(),
            max_depth: config.query.max_depth,
            log_queries: config.debug.log_queries,
            registry: OperatorRegistry,
            operators: OperatorCompiler::new(),
        }
    }

    /// Enable conditions that traverse relationships (`author.name`).
    ///
    /// Without a lookup such conditions are dropped.
    pub fn with_relation_lookup(mut self, lookup: Arc<dyn RelationLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Get the localization settings.
    pub fn localization(&self) -> &LocalizationConfig {
        &self.localization
    }

    /// Compile a clause against the schema of `target`.
    ///
    /// A clause that is not a JSON object compiles to an empty filter, which
    /// matches every document; the schema provider is not consulted then.
    pub async fn compile(&self, clause: &Value, target: &QueryTarget, locale: Option<&str>) -> QueryResult<Document> {
        if !clause.is_object() {
            debug!(query_target = %target, "Where clause is not an object; compiling to an empty filter");
            return Ok(Document::new());
        }
        let arena = self.schemas.fields(target).await?;
        self.compile_with_fields(clause, &arena, locale).await
    }

    /// Compile a typed [`Where`] clause.
    pub async fn compile_where(&self, clause: &Where, target: &QueryTarget, locale: Option<&str>) -> QueryResult<Document> {
        self.compile(clause.as_value(), target, locale).await
    }

    /// Compile a clause against an arena the caller already holds.
    pub async fn compile_with_fields(&self, clause: &Value, arena: &FieldArena, locale: Option<&str>) -> QueryResult<Document> {
        let start = Instant::now();
        let filter = self.compile_node(clause, Scope::root(arena, locale)).await?;
        let elapsed_us = start.elapsed().as_micros() as u64;

        if self.log_queries {
            info!(query_target = %arena.target(), locale, filter = %filter, elapsed_us, "Compiled where clause");
        } else {
            debug!(query_target = %arena.target(), locale, filter = %filter, elapsed_us, "Compiled where clause");
        }
        Ok(filter)
    }

    /// Compile one Where node.
    ///
    /// Keys are compiled concurrently and assembled in key order.
    pub(crate) fn compile_node<'a>(&'a self, clause: &'a Value, scope: Scope<'a>) -> BoxFuture<'a, QueryResult<Document>> {
        async move {
            let Value::Object(entries) = clause else {
                return Ok(Document::new());
            };
            if scope.depth > self.max_depth {
                warn!(
                    depth = scope.depth,
                    max_depth = self.max_depth,
                    "Where clause nested too deeply; ignoring subtree"
                );
                return Ok(Document::new());
            }

            let compiled =
                try_join_all(entries.iter().map(|(key, value)| self.compile_entry(key, value, scope))).await?;

            let mut merger = ResultMerger::new();
            for entry in compiled {
                match entry {
                    Compiled::Skip => {}
                    Compiled::Group(relation, conditions) => merger.attach_group(relation, conditions),
                    Compiled::Leaf { fragments, multi: true } => {
                        for fragment in fragments {
                            merger.add_to_and(fragment);
                        }
                    }
                    Compiled::Leaf { fragments, multi: false } => {
                        for fragment in fragments {
                            merger.add(fragment);
                        }
                    }
                }
            }
            Ok(merger.finish())
        }
        .boxed()
    }

    async fn compile_entry<'a>(&'a self, key: &'a str, value: &'a Value, scope: Scope<'a>) -> QueryResult<Compiled> {
        if let Some(relation) = Relation::from_key(key) {
            if !value.is_array() {
                debug!(key, "Relational key without a condition list; skipping");
                return Ok(Compiled::Skip);
            }
            let conditions = ConditionGroupBuilder::new(self).build(value, scope).await?;
            return Ok(Compiled::Group(relation, conditions));
        }

        let Value::Object(operators) = value else {
            debug!(path = key, "Field condition is not an operator map; skipping");
            return Ok(Compiled::Skip);
        };
        let recognized = self.registry.recognize(operators);
        if recognized.is_empty() {
            return Ok(Compiled::Skip);
        }

        let resolver = PathResolver::new(scope.arena, &self.localization, scope.locale);
        match resolver.resolve(key) {
            Resolution::Field(resolved) => {
                let multi = recognized.len() > 1;
                let fragments = recognized
                    .into_iter()
                    .filter_map(|(op, operand)| self.compile_field(key, &resolved, op, operand))
                    .collect();
                Ok(Compiled::Leaf { fragments, multi })
            }
            Resolution::Relationship(hop) => self.compile_hop(key, hop, recognized, scope).await,
            Resolution::Unresolvable => {
                debug!(path = key, query_target = %scope.arena.target(), "Unresolvable field path; skipping");
                Ok(Compiled::Skip)
            }
        }
    }

    /// One operator on a resolved path; any-locale variants are OR-ed.
    fn compile_field(&self, key: &str, resolved: &ResolvedPath, op: Operator, operand: &Value) -> Option<Fragment> {
        let variants: Option<Vec<Fragment>> = resolved
            .paths
            .iter()
            .map(|path| {
                self.operators
                    .compile(&resolved.leaf, path.leaf(), op, operand)
                    .map(|fragment| path.wrap(fragment))
            })
            .collect();

        let Some(variants) = variants else {
            debug!(path = key, operator = %op, "Dropping condition the field cannot satisfy");
            return None;
        };
        let fragment = any_of(variants);
        trace!(path = key, operator = %op, fragment = ?fragment, "Compiled condition");
        fragment
    }

    /// Compile the rest of the path against the related collection and
    /// match the relationship against the ids found there.
    async fn compile_hop<'a>(
        &'a self,
        key: &'a str,
        hop: RelationshipHop,
        operators: Vec<(Operator, &'a Value)>,
        scope: Scope<'a>,
    ) -> QueryResult<Compiled> {
        let Some(lookup) = &self.lookup else {
            warn!(path = key, collection = %hop.collection, "No relation lookup configured; dropping relationship condition");
            return Ok(Compiled::Skip);
        };

        let target = QueryTarget::collection(hop.collection.clone());
        let fetched;
        let arena: &FieldArena = if scope.arena.target() == &target {
            scope.arena
        } else {
            fetched = self.schemas.fields(&target).await?;
            &*fetched
        };

        let ops: Map<String, Value> = operators
            .into_iter()
            .map(|(op, value)| (op.as_str().to_string(), value.clone()))
            .collect();
        let mut sub = Map::new();
        sub.insert(hop.rest.clone(), Value::Object(ops));
        let sub = Value::Object(sub);

        let filter = self.compile_node(&sub, scope.nested().with_arena(arena)).await?;
        if filter.is_empty() {
            debug!(path = key, collection = %hop.collection, "Related condition compiled to nothing; skipping");
            return Ok(Compiled::Skip);
        }

        let ids = lookup.find_ids(&hop.collection, filter).await?;
        trace!(path = key, collection = %hop.collection, ids = ids.len(), "Resolved related ids");

        let variants = hop
            .paths
            .iter()
            .map(|path| path.wrap(Fragment::path(path.leaf(), doc! { "$in": ids.clone() })))
            .collect();
        Ok(Compiled::Leaf {
            fragments: any_of(variants).into_iter().collect(),
            multi: false,
        })
    }
}

/// Combine per-locale variants of one condition.
fn any_of(mut variants: Vec<Fragment>) -> Option<Fragment> {
    match variants.len() {
        0 => None,
        1 => variants.pop(),
        _ => {
            let alternatives: Vec<Bson> = variants
                .into_iter()
                .map(|variant| Bson::Document(variant.into_document()))
                .collect();
            Some(Fragment::Merge(doc! { "$and": [ { "$or": alternatives } ] }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::oid::ObjectId;
    use ferrule_query::ErrorCode;
    use ferrule_schema::{CollectionSchema, FieldDef, StaticSchemaProvider};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const OID: &str = "507f1f77bcf86cd799439011";

    fn oid() -> ObjectId {
        ObjectId::parse_str(OID).unwrap()
    }

    fn provider() -> StaticSchemaProvider {
        let posts = CollectionSchema::collection("posts").fields(vec![
            FieldDef::text("title"),
            FieldDef::number("views"),
            FieldDef::select("tags").has_many(),
            FieldDef::text("summary").localized(),
            FieldDef::relationship("author", "users"),
            FieldDef::relationship("parent", "posts"),
            FieldDef::polymorphic("owner", ["users", "teams"]),
            FieldDef::array("items", vec![FieldDef::text("label"), FieldDef::number("qty")]),
            FieldDef::point("location"),
            FieldDef::group("meta", vec![FieldDef::text("slug")]),
        ]);
        let users = CollectionSchema::collection("users").fields(vec![FieldDef::text("name")]);
        StaticSchemaProvider::from_schemas([&posts, &users]).unwrap()
    }

    fn compiler_with(config: &FerruleConfig) -> WhereCompiler {
        WhereCompiler::new(Arc::new(provider()), config)
    }

    fn compiler() -> WhereCompiler {
        compiler_with(&FerruleConfig::default())
    }

    fn localized() -> WhereCompiler {
        let config = FerruleConfig {
            localization: LocalizationConfig::new(["en", "es"]),
            ..Default::default()
        };
        compiler_with(&config)
    }

    async fn compile(compiler: &WhereCompiler, clause: Value) -> Document {
        compiler
            .compile(&clause, &QueryTarget::collection("posts"), None)
            .await
            .unwrap()
    }

    #[derive(Default)]
    struct RecordingLookup {
        ids: Vec<Bson>,
        calls: Mutex<Vec<(String, Document)>>,
    }

    #[async_trait]
    impl RelationLookup for RecordingLookup {
        async fn find_ids(&self, collection: &str, filter: Document) -> QueryResult<Vec<Bson>> {
            self.calls.lock().push((collection.to_string(), filter));
            Ok(self.ids.clone())
        }
    }

    #[tokio::test]
    async fn test_single_equals() {
        let filter = compile(&compiler(), json!({ "title": { "equals": "test" } })).await;
        assert_eq!(filter, doc! { "title": "test" });
    }

    #[tokio::test]
    async fn test_and_group() {
        let filter = compile(
            &compiler(),
            json!({ "and": [
                { "title": { "like": "test" } },
                { "title": { "not_equals": "tester" } },
            ] }),
        )
        .await;

        assert_eq!(
            filter,
            doc! { "$and": [
                { "title": { "$regex": "test", "$options": "i" } },
                { "title": { "$ne": "tester" } },
            ] }
        );
    }

    #[tokio::test]
    async fn test_two_operators_on_one_path() {
        let filter = compile(&compiler(), json!({ "title": { "like": "test", "not_equals": "tester" } })).await;
        assert_eq!(
            filter,
            doc! { "$and": [
                { "title": { "$regex": "test", "$options": "i" } },
                { "title": { "$ne": "tester" } },
            ] }
        );

        let filter = compile(&compiler(), json!({ "views": { "greater_than": 10, "less_than": 20 } })).await;
        assert_eq!(
            filter,
            doc! { "$and": [ { "views": { "$gt": 10_i64 } }, { "views": { "$lt": 20_i64 } } ] }
        );
    }

    #[tokio::test]
    async fn test_empty_membership_is_dropped() {
        let filter = compile(&compiler(), json!({ "title": { "in": [] } })).await;
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_empty_groups_are_elided() {
        let filter = compile(
            &compiler(),
            json!({ "and": [], "or": [], "title": { "equals": "x" } }),
        )
        .await;
        assert_eq!(filter, doc! { "title": "x" });

        let filter = compile(&compiler(), json!({ "or": [ { "missing": { "equals": 1 } }, {} ] })).await;
        assert!(filter.is_empty());

        let filter = compile(&compiler(), json!({ "and": { "title": { "equals": "x" } } })).await;
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_relational_keys_are_case_insensitive() {
        let filter = compile(
            &compiler(),
            json!({
                "or": [ { "title": { "equals": "a" } } ],
                "OR": [ { "title": { "equals": "b" } } ],
            }),
        )
        .await;

        assert_eq!(
            filter,
            doc! {
                "$or": [ { "title": "a" } ],
                "$and": [ { "$or": [ { "title": "b" } ] } ],
            }
        );
    }

    #[tokio::test]
    async fn test_partial_multi_operator_leaf() {
        // `like` does not apply to numbers and `bogus` is not an operator; `greater_than` survives.
        let filter = compile(
            &compiler(),
            json!({ "views": { "greater_than": 10, "like": "x", "bogus": 1 } }),
        )
        .await;
        assert_eq!(filter, doc! { "$and": [ { "views": { "$gt": 10_i64 } } ] });

        let filter = compile(&compiler(), json!({ "title": { "bogus": 1 } })).await;
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_key_collisions_never_overwrite() {
        let filter = compile(
            &compiler(),
            json!({
                "title": { "equals": "a" },
                "and": [ { "title": { "equals": "b" } } ],
            }),
        )
        .await;
        assert_eq!(filter, doc! { "title": "a", "$and": [ { "title": "b" } ] });
    }

    #[tokio::test]
    async fn test_compilation_is_deterministic() {
        let clause = json!({
            "or": [
                { "views": { "greater_than_equal": 3 } },
                { "tags": { "contains": "rust" } },
            ],
            "summary": { "like": "hello world" },
            "items.label": { "in": "a,b" },
        });
        let compiler = localized();
        let first = compile(&compiler, clause.clone()).await;
        let second = compile(&compiler, clause).await;

        assert_eq!(first, second);
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["$or", "$and", "items"]);
    }

    #[tokio::test]
    async fn test_localized_paths() {
        let compiler = localized();
        let filter = compile(&compiler, json!({ "summary": { "equals": "hi" } })).await;
        assert_eq!(
            filter,
            doc! { "$and": [ { "$or": [ { "summary.en": "hi" }, { "summary.es": "hi" } ] } ] }
        );

        let filter = compiler
            .compile(
                &json!({ "summary": { "equals": "hi" } }),
                &QueryTarget::collection("posts"),
                Some("es"),
            )
            .await
            .unwrap();
        assert_eq!(filter, doc! { "summary.es": "hi" });
    }

    #[tokio::test]
    async fn test_array_conditions_use_elem_match() {
        let filter = compile(
            &compiler(),
            json!({
                "items.label": { "equals": "a" },
                "items.qty": { "greater_than": 1 },
            }),
        )
        .await;

        assert_eq!(
            filter,
            doc! {
                "items": { "$elemMatch": { "label": "a" } },
                "$and": [ { "items": { "$elemMatch": { "qty": { "$gt": 1_i64 } } } } ],
            }
        );

        let filter = compile(&compiler(), json!({ "items": { "exists": false } })).await;
        assert_eq!(filter, doc! { "items": { "$in": [Bson::Null, []] } });
    }

    #[tokio::test]
    async fn test_ids_and_groups() {
        let filter = compile(&compiler(), json!({ "id": { "equals": OID }, "meta.slug": { "exists": true } })).await;
        assert_eq!(filter, doc! { "_id": oid(), "meta.slug": { "$exists": true } });
    }

    #[tokio::test]
    async fn test_polymorphic_relationship() {
        let filter = compile(
            &compiler(),
            json!({ "owner": { "equals": { "relationTo": "users", "value": OID } } }),
        )
        .await;
        assert_eq!(
            filter,
            doc! { "$and": [ { "owner.relationTo": "users" }, { "owner.value": oid() } ] }
        );
    }

    #[tokio::test]
    async fn test_geo_operator_beside_group_on_same_path() {
        let filter = compile(
            &compiler(),
            json!({
                "location": { "near": "1,2" },
                "and": [ { "location": { "exists": true } } ],
            }),
        )
        .await;

        assert_eq!(
            filter,
            doc! {
                "location": { "$near": { "$geometry": { "type": "Point", "coordinates": [1.0, 2.0] } } },
                "$and": [ { "location": { "$exists": true } } ],
            }
        );
    }

    #[tokio::test]
    async fn test_geo_operators_on_one_leaf_go_to_and() {
        let filter = compile(
            &compiler(),
            json!({
                "location": {
                    "near": [1, 2],
                    "within": { "type": "Polygon", "coordinates": [[[0, 0], [0, 5], [5, 5], [0, 0]]] },
                },
            }),
        )
        .await;

        assert_eq!(
            filter,
            doc! { "$and": [
                { "location": { "$near": { "$geometry": { "type": "Point", "coordinates": [1.0, 2.0] } } } },
                { "location": { "$geoWithin": { "$geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0_i64, 0_i64], [0_i64, 5_i64], [5_i64, 5_i64], [0_i64, 0_i64]]],
                } } } },
            ] }
        );
    }

    #[tokio::test]
    async fn test_sibling_leaves_share_a_physical_path() {
        // `author` and `author.id` address the same stored key.
        let filter = compile(
            &compiler(),
            json!({
                "author": { "exists": true },
                "author.id": { "not_in": [OID] },
            }),
        )
        .await;

        assert_eq!(filter, doc! { "author": { "$exists": true, "$nin": [oid()] } });
    }

    #[tokio::test]
    async fn test_relationship_traversal() {
        let lookup = Arc::new(RecordingLookup {
            ids: vec![Bson::ObjectId(oid())],
            ..Default::default()
        });
        let compiler = compiler().with_relation_lookup(lookup.clone());

        let filter = compile(&compiler, json!({ "author.name": { "equals": "Ada" } })).await;
        assert_eq!(filter, doc! { "author": { "$in": [oid()] } });

        let calls = lookup.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("users".to_string(), doc! { "name": "Ada" }));
    }

    #[tokio::test]
    async fn test_self_relationship_traversal() {
        let lookup = Arc::new(RecordingLookup::default());
        let compiler = compiler().with_relation_lookup(lookup.clone());

        let filter = compile(&compiler, json!({ "parent.views": { "less_than": 5 } })).await;
        assert_eq!(filter, doc! { "parent": { "$in": [] } });
        assert_eq!(lookup.calls.lock()[0].0, "posts");
    }

    #[tokio::test]
    async fn test_relationship_traversal_without_lookup() {
        let filter = compile(&compiler(), json!({ "author.name": { "equals": "Ada" } })).await;
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_related_path_skips_lookup() {
        let lookup = Arc::new(RecordingLookup::default());
        let compiler = compiler().with_relation_lookup(lookup.clone());

        let filter = compile(&compiler, json!({ "author.missing": { "equals": 1 } })).await;
        assert!(filter.is_empty());
        assert!(lookup.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let mut config = FerruleConfig::default();
        config.query.max_depth = 1;
        let compiler = compiler_with(&config);

        let filter = compile(&compiler, json!({ "and": [ { "title": { "equals": "x" } } ] })).await;
        assert_eq!(filter, doc! { "$and": [ { "title": "x" } ] });

        let filter = compile(
            &compiler,
            json!({ "and": [ { "and": [ { "title": { "equals": "x" } } ] } ] }),
        )
        .await;
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_clause() {
        let compiler = compiler();
        for clause in [json!(null), json!([1]), json!("title")] {
            let filter = compiler
                .compile(&clause, &QueryTarget::collection("nope"), None)
                .await
                .unwrap();
            assert!(filter.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let err = compiler()
            .compile(
                &json!({ "title": { "equals": "x" } }),
                &QueryTarget::collection("nope"),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTarget);
    }

    #[tokio::test]
    async fn test_compile_where() {
        let clause = Where::builder()
            .condition("views", Operator::In, json!(["1", "2"]))
            .build();
        let filter = compiler()
            .compile_where(&clause, &QueryTarget::collection("posts"), None)
            .await
            .unwrap();
        assert_eq!(filter, doc! { "views": { "$in": [1_i64, 2_i64] } });
    }
}
