//! Field kinds and the builder used to declare collection fields.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Scalar field types that store a single comparable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Email address.
    Email,
    /// Source code.
    Code,
    /// Rich text stored as a JSON tree.
    RichText,
    /// One of a fixed set of options.
    Select,
    /// Radio group, stored like a select.
    Radio,
    /// Numeric value.
    Number,
    /// Boolean value.
    Checkbox,
    /// Date and time.
    Date,
    /// GeoJSON point (`[longitude, latitude]`).
    Point,
    /// Arbitrary JSON.
    Json,
}

impl ScalarKind {
    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Code => "code",
            Self::RichText => "richText",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Point => "point",
            Self::Json => "json",
        }
    }

    /// Whether values of this kind are stored as strings.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::Email | Self::Code | Self::Select | Self::Radio
        )
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of field kinds a schema can contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A leaf holding a scalar value.
    Scalar(ScalarKind),
    /// Reference to documents of a single collection.
    Relationship {
        /// Target collection slug.
        relation_to: SmolStr,
    },
    /// Reference stored as `{ relationTo, value }` to one of several collections.
    PolymorphicRelationship {
        /// Allowed target collection slugs.
        relation_to: Vec<SmolStr>,
    },
    /// Repeating rows of sub-fields.
    Array,
    /// Container for a list of heterogeneous blocks.
    Blocks,
    /// One block type inside a blocks field.
    Block {
        /// Stored as `blockType` on each element.
        slug: SmolStr,
    },
    /// Nested object; transparent when unnamed.
    Group,
    /// Tab; adds a path segment only when named.
    Tab,
    /// Presentational container.
    Collapsible,
    /// Presentational container.
    Row,
}

impl FieldKind {
    /// Get a short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.as_str(),
            Self::Relationship { .. } => "relationship",
            Self::PolymorphicRelationship { .. } => "polymorphic relationship",
            Self::Array => "array",
            Self::Blocks => "blocks",
            Self::Block { .. } => "block",
            Self::Group => "group",
            Self::Tab => "tab",
            Self::Collapsible => "collapsible",
            Self::Row => "row",
        }
    }

    /// Whether a field of this kind must carry a name.
    pub fn requires_name(&self) -> bool {
        !matches!(
            self,
            Self::Group | Self::Tab | Self::Collapsible | Self::Row | Self::Block { .. }
        )
    }

    /// Whether this kind can hold sub-fields.
    pub fn has_children(&self) -> bool {
        matches!(
            self,
            Self::Array
                | Self::Blocks
                | Self::Block { .. }
                | Self::Group
                | Self::Tab
                | Self::Collapsible
                | Self::Row
        )
    }
}

/// How a collection stores its document identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// BSON ObjectId (the default).
    #[default]
    ObjectId,
    /// Custom string ids.
    Text,
    /// Custom numeric ids.
    Number,
}

/// A field definition as written by the application, before flattening.
///
/// # Example
///
/// ```rust
/// use ferrule_schema::FieldDef;
///
/// let fields = vec![
///     FieldDef::text("title").localized(),
///     FieldDef::relationship("author", "users"),
///     FieldDef::array("items", vec![FieldDef::text("label"), FieldDef::number("qty")]),
/// ];
/// assert_eq!(fields[2].fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, absent for presentational containers.
    pub name: Option<SmolStr>,
    /// Field kind.
    pub kind: FieldKind,
    /// Stored once per locale.
    #[serde(default)]
    pub localized: bool,
    /// Stores a list of values.
    #[serde(default)]
    pub has_many: bool,
    /// Sub-fields for container kinds.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl FieldDef {
    /// Create a field of any kind.
    pub fn new(name: Option<SmolStr>, kind: FieldKind, fields: Vec<FieldDef>) -> Self {
        Self {
            name,
            kind,
            localized: false,
            has_many: false,
            fields,
        }
    }

    fn scalar(name: impl Into<SmolStr>, kind: ScalarKind) -> Self {
        Self::new(Some(name.into()), FieldKind::Scalar(kind), Vec::new())
    }

    /// Text field.
    pub fn text(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Text)
    }

    /// Textarea field.
    pub fn textarea(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Textarea)
    }

    /// Email field.
    pub fn email(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Email)
    }

    /// Code field.
    pub fn code(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Code)
    }

    /// Rich text field.
    pub fn rich_text(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::RichText)
    }

    /// Select field.
    pub fn select(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Select)
    }

    /// Radio field.
    pub fn radio(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Radio)
    }

    /// Number field.
    pub fn number(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Number)
    }

    /// Checkbox field.
    pub fn checkbox(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Checkbox)
    }

    /// Date field.
    pub fn date(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Date)
    }

    /// Point field.
    pub fn point(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Point)
    }

    /// JSON field.
    pub fn json(name: impl Into<SmolStr>) -> Self {
        Self::scalar(name, ScalarKind::Json)
    }

    /// Relationship to a single collection.
    pub fn relationship(name: impl Into<SmolStr>, relation_to: impl Into<SmolStr>) -> Self {
        Self::new(
            Some(name.into()),
            FieldKind::Relationship {
                relation_to: relation_to.into(),
            },
            Vec::new(),
        )
    }

    /// Upload field; stored like a relationship to the upload collection.
    pub fn upload(name: impl Into<SmolStr>, relation_to: impl Into<SmolStr>) -> Self {
        Self::relationship(name, relation_to)
    }

    /// Relationship to one of several collections.
    pub fn polymorphic<I, S>(name: impl Into<SmolStr>, relation_to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self::new(
            Some(name.into()),
            FieldKind::PolymorphicRelationship {
                relation_to: relation_to.into_iter().map(Into::into).collect(),
            },
            Vec::new(),
        )
    }

    /// Array field.
    pub fn array(name: impl Into<SmolStr>, fields: Vec<FieldDef>) -> Self {
        Self::new(Some(name.into()), FieldKind::Array, fields)
    }

    /// Blocks field; `blocks` should be built with [`FieldDef::block`].
    pub fn blocks(name: impl Into<SmolStr>, blocks: Vec<FieldDef>) -> Self {
        Self::new(Some(name.into()), FieldKind::Blocks, blocks)
    }

    /// A block definition inside a blocks field.
    pub fn block(slug: impl Into<SmolStr>, fields: Vec<FieldDef>) -> Self {
        Self::new(None, FieldKind::Block { slug: slug.into() }, fields)
    }

    /// Named group.
    pub fn group(name: impl Into<SmolStr>, fields: Vec<FieldDef>) -> Self {
        Self::new(Some(name.into()), FieldKind::Group, fields)
    }

    /// Unnamed group; its fields live at the parent level.
    pub fn unnamed_group(fields: Vec<FieldDef>) -> Self {
        Self::new(None, FieldKind::Group, fields)
    }

    /// Named tab.
    pub fn tab(name: impl Into<SmolStr>, fields: Vec<FieldDef>) -> Self {
        Self::new(Some(name.into()), FieldKind::Tab, fields)
    }

    /// Unnamed tab.
    pub fn unnamed_tab(fields: Vec<FieldDef>) -> Self {
        Self::new(None, FieldKind::Tab, fields)
    }

    /// Collapsible container.
    pub fn collapsible(fields: Vec<FieldDef>) -> Self {
        Self::new(None, FieldKind::Collapsible, fields)
    }

    /// Row container.
    pub fn row(fields: Vec<FieldDef>) -> Self {
        Self::new(None, FieldKind::Row, fields)
    }

    /// Mark the field as localized.
    pub fn localized(mut self) -> Self {
        self.localized = true;
        self
    }

    /// Mark the field as storing many values.
    pub fn has_many(mut self) -> Self {
        self.has_many = true;
        self
    }

    /// Get the field name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the sub-fields.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}
