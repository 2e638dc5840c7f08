//! Logical field paths to physical storage paths.
//!
//! A logical path is what the caller writes (`meta.title`, `items.label`).
//! Storage differs in three ways:
//!
//! - presentational containers (rows, collapsibles, unnamed groups and tabs)
//!   do not exist in storage;
//! - localized fields store one value per locale under `<field>.<locale>`;
//! - array and blocks elements must be matched one element at a time, so
//!   every array level becomes an `$elemMatch` scope.
//!
//! [`PathResolver`] walks the field arena segment by segment and produces a
//! [`Resolution`] describing the physical paths and the kind of value found.

use std::fmt;

use bson::{Bson, Document};
use ferrule_query::{Leaf, OperandKind};
use ferrule_schema::{ALL_LOCALES, FieldArena, FieldId, FieldKind, LocalizationConfig, ScalarKind};
use smol_str::SmolStr;

use crate::operator::Fragment;

/// A physical path split at array boundaries.
///
/// `items.label` inside an array `items` is stored as the scopes
/// `["items", "label"]`; the last scope is relative to the innermost element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalPath {
    scopes: Vec<String>,
}

impl PhysicalPath {
    /// A path with no array scopes.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            scopes: vec![path.into()],
        }
    }

    /// A path nested inside array elements; `scopes` must not be empty.
    pub fn scoped(scopes: Vec<String>) -> Self {
        debug_assert!(!scopes.is_empty());
        Self { scopes }
    }

    /// Path relative to the innermost array element (or the document root).
    pub fn leaf(&self) -> &str {
        self.scopes.last().map_or("", String::as_str)
    }

    /// Paths of the enclosing arrays, outermost first.
    pub fn element_scopes(&self) -> &[String] {
        &self.scopes[..self.scopes.len().saturating_sub(1)]
    }

    /// Wrap a fragment compiled against [`leaf`](Self::leaf) in one
    /// `$elemMatch` per enclosing array.
    pub fn wrap(&self, fragment: Fragment) -> Fragment {
        let Some((outermost, inner_scopes)) = self.element_scopes().split_first() else {
            return fragment;
        };

        let mut inner = fragment.into_document();
        for scope in inner_scopes.iter().rev() {
            let mut wrapped = Document::new();
            wrapped.insert(scope.clone(), elem_match(inner));
            inner = wrapped;
        }

        Fragment::Path {
            path: outermost.clone(),
            value: elem_match(inner),
        }
    }
}

fn elem_match(inner: Document) -> Bson {
    let mut doc = Document::new();
    doc.insert("$elemMatch", inner);
    Bson::Document(doc)
}

impl fmt::Display for PhysicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join("."))
    }
}

/// A path that ends on a queryable value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// One entry, or one per locale when matching any locale.
    pub paths: Vec<PhysicalPath>,
    /// What is stored at the path.
    pub leaf: Leaf,
}

impl ResolvedPath {
    /// Whether the condition has to hold in any one of several locales.
    pub fn is_fanned_out(&self) -> bool {
        self.paths.len() > 1
    }
}

/// A path that continues into the documents a relationship points at.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipHop {
    /// Where the relationship ids are stored.
    pub paths: Vec<PhysicalPath>,
    /// Collection the relationship points at.
    pub collection: SmolStr,
    /// Remaining logical path inside that collection.
    pub rest: String,
}

/// Outcome of resolving a logical path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A queryable value.
    Field(ResolvedPath),
    /// A condition on related documents.
    Relationship(RelationshipHop),
    /// Unknown or structural-only path; the condition is dropped.
    Unresolvable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Segment(String),
    Locale,
    Element,
}

/// Resolves logical paths against one field arena.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    arena: &'a FieldArena,
    localization: &'a LocalizationConfig,
    locale: Option<&'a str>,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver for one compilation.
    pub fn new(arena: &'a FieldArena, localization: &'a LocalizationConfig, locale: Option<&'a str>) -> Self {
        Self {
            arena,
            localization,
            locale,
        }
    }

    /// Resolve a dot-delimited logical path.
    pub fn resolve(&self, logical: &str) -> Resolution {
        let segments: Vec<&str> = logical.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Resolution::Unresolvable;
        }
        if let ["id" | "_id"] = segments.as_slice() {
            return Resolution::Field(ResolvedPath {
                paths: vec![PhysicalPath::new("_id")],
                leaf: Leaf::single(OperandKind::Id(self.arena.id_type())),
            });
        }

        let mut parts = Vec::with_capacity(segments.len() + 1);
        let mut parent: Option<FieldId> = None;
        let mut localized = false;

        for (i, segment) in segments.iter().enumerate() {
            let rest = &segments[i + 1..];
            let Some(id) = self.arena.child_named(parent, segment) else {
                return self.implicit_field(parent, segment, rest, parts);
            };
            let field = self.arena.field(id);

            parts.push(Part::Segment(segment.to_string()));
            if field.localized && self.localization.is_enabled() && !localized {
                parts.push(Part::Locale);
                localized = true;
            }

            match &field.kind {
                FieldKind::Scalar(ScalarKind::Json) => {
                    parts.extend(rest.iter().map(|s| Part::Segment(s.to_string())));
                    return self.field(&parts, Leaf::new(OperandKind::Scalar(ScalarKind::Json), field.has_many));
                }
                FieldKind::Scalar(kind) => {
                    return match rest {
                        [] => self.field(&parts, Leaf::new(OperandKind::Scalar(*kind), field.has_many)),
                        _ => Resolution::Unresolvable,
                    };
                }
                FieldKind::Relationship { relation_to } => {
                    return match rest {
                        [] | ["id"] => self.field(&parts, Leaf::new(OperandKind::Relationship, field.has_many)),
                        _ => Resolution::Relationship(RelationshipHop {
                            paths: self.materialize(&parts),
                            collection: relation_to.clone(),
                            rest: rest.join("."),
                        }),
                    };
                }
                FieldKind::PolymorphicRelationship { .. } => {
                    let (suffix, operand) = match rest {
                        [] => (None, OperandKind::PolymorphicRelationship),
                        ["relationTo"] => (Some("relationTo"), OperandKind::Scalar(ScalarKind::Text)),
                        ["value"] => (Some("value"), OperandKind::Relationship),
                        _ => return Resolution::Unresolvable,
                    };
                    parts.extend(suffix.map(|s| Part::Segment(s.to_string())));
                    return self.field(&parts, Leaf::new(operand, field.has_many));
                }
                FieldKind::Array | FieldKind::Blocks => {
                    if rest.is_empty() {
                        return self.field(&parts, Leaf::new(OperandKind::Array, true));
                    }
                    parts.push(Part::Element);
                    parent = Some(id);
                }
                FieldKind::Group | FieldKind::Tab => {
                    if rest.is_empty() {
                        return Resolution::Unresolvable;
                    }
                    parent = Some(id);
                }
                FieldKind::Block { .. } | FieldKind::Collapsible | FieldKind::Row => {
                    return Resolution::Unresolvable;
                }
            }
        }

        Resolution::Unresolvable
    }

    /// Names that exist in storage without a field definition: the element
    /// `id` of arrays and blocks, and `blockType`.
    fn implicit_field(&self, parent: Option<FieldId>, segment: &str, rest: &[&str], mut parts: Vec<Part>) -> Resolution {
        let Some(parent) = parent else {
            return Resolution::Unresolvable;
        };
        if !rest.is_empty() {
            return Resolution::Unresolvable;
        }
        let implicit = match (segment, &self.arena.field(parent).kind) {
            ("id", FieldKind::Array | FieldKind::Blocks) => true,
            ("blockType", FieldKind::Blocks) => true,
            _ => false,
        };
        if !implicit {
            return Resolution::Unresolvable;
        }
        parts.push(Part::Segment(segment.to_string()));
        self.field(&parts, Leaf::single(OperandKind::Scalar(ScalarKind::Text)))
    }

    fn field(&self, parts: &[Part], leaf: Leaf) -> Resolution {
        Resolution::Field(ResolvedPath {
            paths: self.materialize(parts),
            leaf,
        })
    }

    /// Expand the locale placeholder into one path per applicable locale.
    fn materialize(&self, parts: &[Part]) -> Vec<PhysicalPath> {
        if !parts.contains(&Part::Locale) {
            return vec![build(parts, None)];
        }
        match self.locale {
            Some(locale) if locale != ALL_LOCALES => vec![build(parts, Some(locale))],
            _ => self
                .localization
                .locales
                .iter()
                .map(|locale| build(parts, Some(locale)))
                .collect(),
        }
    }
}

fn build(parts: &[Part], locale: Option<&str>) -> PhysicalPath {
    let mut scopes = vec![String::new()];
    for part in parts {
        let segment = match part {
            Part::Segment(s) => s.as_str(),
            Part::Locale => match locale {
                Some(locale) => locale,
                None => continue,
            },
            Part::Element => {
                scopes.push(String::new());
                continue;
            }
        };
        if let Some(current) = scopes.last_mut() {
            if !current.is_empty() {
                current.push('.');
            }
            current.push_str(segment);
        }
    }
    PhysicalPath::scoped(scopes)
}
