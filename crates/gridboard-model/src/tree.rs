//! The recursive layout tree: rows, columns, and modules.
//!
//! Non-structural data (styling, module settings) is carried in opaque
//! string bags; this crate only ever inspects a module's type name and,
//! for container variants, its child collections. The whole tree derives
//! `Clone` + `PartialEq` + serde, which is what makes snapshots, atomic
//! swaps, and structural-equality checks cheap to express.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Opaque key/value bag for module settings and forward-compatible
/// extension data. Never interpreted by this crate.
pub type SettingsBag = BTreeMap<String, String>;

/// Key of one section inside a sectioned container (e.g. a tab id).
///
/// Section keys are owned by the module type, not by the structural ID
/// space: duplicating a subtree regenerates node IDs but keeps section
/// keys intact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionKey(String);

impl SectionKey {
    /// Build a key from any string-like value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// One ordered child collection of a sectioned container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub key: SectionKey,
    #[serde(default)]
    pub children: Vec<Module>,
}

impl Section {
    /// Empty section with the given key.
    #[must_use]
    pub fn new(key: impl Into<SectionKey>) -> Self {
        Self {
            key: key.into(),
            children: Vec::new(),
        }
    }
}

impl From<&str> for Section {
    fn from(key: &str) -> Self {
        Self::new(SectionKey::new(key))
    }
}

/// Structural payload of a module.
///
/// This is the single recursive sum type the whole move machinery is
/// parameterized over: everything else only asks "is this a container,
/// and which child collection does this step select".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleBody {
    /// Content-only module; settings are opaque to this crate.
    Leaf,
    /// Container with one ordered child collection.
    Container { children: Vec<Module> },
    /// Container with multiple keyed, ordered child collections.
    Sectioned { sections: Vec<Section> },
}

/// A content module, possibly a container holding further modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: NodeId,
    /// Registry type tag, e.g. `"text"` or `"tabs"`. Never interpreted
    /// beyond equality by this crate.
    pub type_name: String,
    #[serde(default)]
    pub settings: SettingsBag,
    #[serde(flatten)]
    pub body: ModuleBody,
}

impl Module {
    /// Build a leaf module with empty settings.
    #[must_use]
    pub fn leaf(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            settings: SettingsBag::new(),
            body: ModuleBody::Leaf,
        }
    }

    /// Build an empty plain container.
    #[must_use]
    pub fn container(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            settings: SettingsBag::new(),
            body: ModuleBody::Container {
                children: Vec::new(),
            },
        }
    }

    /// Build a sectioned container with the given (empty) sections.
    #[must_use]
    pub fn sectioned(
        id: NodeId,
        type_name: impl Into<String>,
        sections: impl IntoIterator<Item = Section>,
    ) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            settings: SettingsBag::new(),
            body: ModuleBody::Sectioned {
                sections: sections.into_iter().collect(),
            },
        }
    }

    /// Set one settings entry (builder style).
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Whether this module can hold child modules at all.
    #[must_use]
    pub fn is_container(&self) -> bool {
        !matches!(self.body, ModuleBody::Leaf)
    }

    /// Child collection of a plain container.
    #[must_use]
    pub fn children(&self) -> Option<&Vec<Module>> {
        match &self.body {
            ModuleBody::Container { children } => Some(children),
            _ => None,
        }
    }

    /// Mutable child collection of a plain container.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Module>> {
        match &mut self.body {
            ModuleBody::Container { children } => Some(children),
            _ => None,
        }
    }

    /// Section of a sectioned container by key.
    #[must_use]
    pub fn section(&self, key: &SectionKey) -> Option<&Section> {
        match &self.body {
            ModuleBody::Sectioned { sections } => sections.iter().find(|s| s.key == *key),
            _ => None,
        }
    }

    /// Mutable section of a sectioned container by key.
    pub fn section_mut(&mut self, key: &SectionKey) -> Option<&mut Section> {
        match &mut self.body {
            ModuleBody::Sectioned { sections } => sections.iter_mut().find(|s| s.key == *key),
            _ => None,
        }
    }

    /// All child modules, across every collection, in order.
    pub fn child_modules(&self) -> impl Iterator<Item = &Module> {
        let slices: Vec<&[Module]> = match &self.body {
            ModuleBody::Leaf => Vec::new(),
            ModuleBody::Container { children } => vec![children.as_slice()],
            ModuleBody::Sectioned { sections } => {
                sections.iter().map(|s| s.children.as_slice()).collect()
            }
        };
        slices.into_iter().flatten()
    }
}

/// A column holding an ordered sequence of modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: NodeId,
    #[serde(default)]
    pub modules: Vec<Module>,
    /// Non-structural data (styling etc.), opaque to this crate.
    #[serde(default)]
    pub extensions: SettingsBag,
}

impl Column {
    /// Empty column.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            modules: Vec::new(),
            extensions: SettingsBag::new(),
        }
    }
}

/// A row holding an ordered sequence of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: NodeId,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Non-structural data (styling etc.), opaque to this crate.
    #[serde(default)]
    pub extensions: SettingsBag,
}

impl Row {
    /// Empty row.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            columns: Vec::new(),
            extensions: SettingsBag::new(),
        }
    }
}

/// The whole layout document: an ordered sequence of rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutTree {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl LayoutTree {
    /// Empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Whether the tree has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every ID in the tree, at every depth.
    #[must_use]
    pub fn all_ids(&self) -> FxHashSet<NodeId> {
        let mut ids = FxHashSet::default();
        for row in &self.rows {
            ids.insert(row.id);
            for column in &row.columns {
                ids.insert(column.id);
                for module in &column.modules {
                    collect_module_ids(module, &mut ids);
                }
            }
        }
        ids
    }

    /// Highest ID present in the tree, if any.
    #[must_use]
    pub fn max_id(&self) -> Option<NodeId> {
        self.all_ids().into_iter().max()
    }
}

fn collect_module_ids(module: &Module, ids: &mut FxHashSet<NodeId>) {
    ids.insert(module.id);
    for child in module.child_modules() {
        collect_module_ids(child, ids);
    }
}

/// Which kind of tree node an address or detached value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Row,
    Column,
    Module,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => f.write_str("row"),
            Self::Column => f.write_str("column"),
            Self::Module => f.write_str("module"),
        }
    }
}

/// A node detached from a tree by [`crate::ops::remove`], ready to be
/// re-inserted (move), pasted (after ID regeneration), or dropped
/// (delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum DetachedNode {
    Row(Row),
    Column(Column),
    Module(Module),
}

impl DetachedNode {
    /// ID of the detached node itself.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Row(row) => row.id,
            Self::Column(column) => column.id,
            Self::Module(module) => module.id,
        }
    }

    /// Node kind of the detached value.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Row(_) => NodeKind::Row,
            Self::Column(_) => NodeKind::Column,
            Self::Module(_) => NodeKind::Module,
        }
    }
}
