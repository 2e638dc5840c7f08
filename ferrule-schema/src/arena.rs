//! Flattened field arena.
//!
//! A [`CollectionSchema`] is a tree of [`FieldDef`]s owned by the application.
//! Flattening it produces a [`FieldArena`]: every field becomes a
//! [`FieldDescriptor`] stored in a single vector and addressed by [`FieldId`].
//! Parents and children refer to each other by id, so the arena has no
//! ownership cycles and can be shared read-only across compilations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDef, FieldKind, IdType};
use crate::provider::QueryTarget;

/// Index of a descriptor inside a [`FieldArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u32);

impl FieldId {
    /// Get the raw index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read-only metadata for one schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name; `None` for presentational containers and blocks.
    pub name: Option<SmolStr>,
    /// Field kind.
    pub kind: FieldKind,
    /// Stored once per locale.
    pub localized: bool,
    /// Stores a list of values.
    pub has_many: bool,
    /// Stable path key, e.g. `meta.title` or `layout.hero.heading`.
    pub path: SmolStr,
    /// Enclosing descriptor.
    pub parent: Option<FieldId>,
    /// Direct children in declaration order.
    pub children: Vec<FieldId>,
}

impl FieldDescriptor {
    /// Whether lookups pass through this container without consuming a segment.
    pub fn is_transparent(&self) -> bool {
        self.name.is_none() && matches!(self.kind, FieldKind::Group | FieldKind::Tab | FieldKind::Collapsible | FieldKind::Row)
    }
}

/// A collection or global definition.
///
/// # Example
///
/// ```rust
/// use ferrule_schema::{CollectionSchema, FieldDef};
///
/// let arena = CollectionSchema::collection("posts")
///     .timestamps()
///     .fields(vec![
///         FieldDef::text("title").localized(),
///         FieldDef::group("meta", vec![FieldDef::text("description")]),
///     ])
///     .flatten()
///     .unwrap();
///
/// assert!(arena.get("meta.description").is_some());
/// assert!(arena.get("createdAt").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection or global this schema belongs to.
    pub target: QueryTarget,
    /// Top-level fields.
    pub fields: Vec<FieldDef>,
    /// Adds `createdAt` and `updatedAt` date fields.
    #[serde(default)]
    pub timestamps: bool,
    /// Identifier storage.
    #[serde(default)]
    pub id_type: IdType,
}

impl CollectionSchema {
    /// Start a collection schema.
    pub fn collection(slug: impl Into<SmolStr>) -> Self {
        Self::new(QueryTarget::Collection(slug.into()))
    }

    /// Start a global schema.
    pub fn global(slug: impl Into<SmolStr>) -> Self {
        Self::new(QueryTarget::Global(slug.into()))
    }

    fn new(target: QueryTarget) -> Self {
        Self {
            target,
            fields: Vec::new(),
            timestamps: false,
            id_type: IdType::default(),
        }
    }

    /// Set the top-level fields.
    pub fn fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    /// Add the timestamp fields.
    pub fn timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Set how identifiers are stored.
    pub fn id_type(mut self, id_type: IdType) -> Self {
        self.id_type = id_type;
        self
    }

    /// Flatten into an arena, validating names and paths.
    pub fn flatten(&self) -> SchemaResult<FieldArena> {
        FieldArena::build(self)
    }
}

/// Flattened, read-only field table for one collection or global.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArena {
    target: QueryTarget,
    id_type: IdType,
    fields: Vec<FieldDescriptor>,
    roots: Vec<FieldId>,
    by_path: IndexMap<SmolStr, FieldId>,
}

impl FieldArena {
    /// Build an arena from a schema definition.
    pub fn build(schema: &CollectionSchema) -> SchemaResult<Self> {
        let mut arena = Self {
            target: schema.target.clone(),
            id_type: schema.id_type,
            fields: Vec::new(),
            roots: Vec::new(),
            by_path: IndexMap::new(),
        };

        let mut top: Vec<FieldDef> = schema.fields.clone();
        if schema.timestamps {
            top.push(FieldDef::date("createdAt"));
            top.push(FieldDef::date("updatedAt"));
        }

        for def in &top {
            let id = arena.insert(def, None, "")?;
            arena.roots.push(id);
        }

        debug!(
            target = %arena.target,
            fields = arena.fields.len(),
            "Flattened schema"
        );

        Ok(arena)
    }

    fn insert(&mut self, def: &FieldDef, parent: Option<FieldId>, prefix: &str) -> SchemaResult<FieldId> {
        let slug = self.target.slug().to_string();

        if def.kind.requires_name() && def.name.is_none() {
            return Err(SchemaError::unnamed(slug, def.kind.name()));
        }
        if !def.kind.has_children() && !def.fields.is_empty() {
            return Err(SchemaError::invalid_field(
                slug,
                def.name().unwrap_or(def.kind.name()),
                "scalar and relationship fields cannot contain sub-fields",
            ));
        }
        if let Some(name) = def.name() {
            if name.is_empty() || name.contains('.') {
                return Err(SchemaError::invalid_field(slug, name, "field names must be non-empty and contain no dots"));
            }
        }

        let parent_kind = parent.map(|p| &self.fields[p.index()].kind);
        match (&def.kind, parent_kind) {
            (FieldKind::Block { .. }, Some(FieldKind::Blocks)) => {}
            (FieldKind::Block { slug: block }, _) => {
                return Err(SchemaError::invalid_field(slug, block.as_str(), "blocks can only appear inside a blocks field"));
            }
            (_, Some(FieldKind::Blocks)) => {
                return Err(SchemaError::invalid_field(
                    slug,
                    def.name().unwrap_or(def.kind.name()),
                    "a blocks field may only contain block definitions",
                ));
            }
            _ => {}
        }

        let segment: Option<&str> = match &def.kind {
            FieldKind::Block { slug } => Some(slug.as_str()),
            _ => def.name(),
        };
        let path: SmolStr = match (prefix.is_empty(), segment) {
            (_, None) => SmolStr::new(prefix),
            (true, Some(seg)) => SmolStr::new(seg),
            (false, Some(seg)) => SmolStr::new(format!("{prefix}.{seg}")),
        };

        let id = FieldId(self.fields.len() as u32);
        self.fields.push(FieldDescriptor {
            name: def.name.clone(),
            kind: def.kind.clone(),
            localized: def.localized,
            has_many: def.has_many,
            path: path.clone(),
            parent,
            children: Vec::new(),
        });

        if segment.is_some() && self.by_path.insert(path.clone(), id).is_some() {
            return Err(SchemaError::duplicate(slug, path.as_str()));
        }

        for child in &def.fields {
            let child_id = self.insert(child, Some(id), &path)?;
            self.fields[id.index()].children.push(child_id);
        }

        Ok(id)
    }

    /// Get the collection or global this arena describes.
    pub fn target(&self) -> &QueryTarget {
        &self.target
    }

    /// Get the identifier storage type.
    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    /// Get a descriptor by id.
    pub fn field(&self, id: FieldId) -> &FieldDescriptor {
        &self.fields[id.index()]
    }

    /// Get a descriptor by its stable path key.
    pub fn get(&self, path: &str) -> Option<&FieldDescriptor> {
        self.by_path.get(path).map(|id| self.field(*id))
    }

    /// Get the id registered for a stable path key.
    pub fn id_of(&self, path: &str) -> Option<FieldId> {
        self.by_path.get(path).copied()
    }

    /// Top-level field ids.
    pub fn roots(&self) -> &[FieldId] {
        &self.roots
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the arena has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldDescriptor)> {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i as u32), f))
    }

    /// Find a named field among `parent`'s children (or the roots), looking
    /// through transparent containers.
    ///
    /// For a blocks field the search covers the fields of every block; the
    /// first block declaring the name wins.
    pub fn child_named(&self, parent: Option<FieldId>, name: &str) -> Option<FieldId> {
        let scope: &[FieldId] = match parent {
            Some(id) => &self.field(id).children,
            None => &self.roots,
        };
        self.find_in(scope, name)
    }

    fn find_in(&self, scope: &[FieldId], name: &str) -> Option<FieldId> {
        for &id in scope {
            let field = self.field(id);
            if field.name.as_deref() == Some(name) {
                return Some(id);
            }
            let descend = field.is_transparent() || matches!(field.kind, FieldKind::Block { .. });
            if descend {
                if let Some(found) = self.find_in(&field.children, name) {
                    return Some(found);
                }
            }
        }
        None
    }
}
