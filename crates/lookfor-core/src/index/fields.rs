/// Field registry — which columns exist and how each cell value is extracted.
///
/// Built once and injected into [`super::FileSystemModel`]. The standard
/// registry has six columns (name, size, created, modified, owner,
/// permissions) and two column-0 facets (check state and icon kind).
use super::Role;
use crate::model::{CheckState, FileNode};
use chrono::{DateTime, Local};
use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

pub const NAME_COLUMN: usize = 0;
pub const SIZE_COLUMN: usize = 1;
pub const CREATED_COLUMN: usize = 2;
pub const MODIFIED_COLUMN: usize = 3;
pub const OWNER_COLUMN: usize = 4;
pub const PERMISSIONS_COLUMN: usize = 5;

/// Icon shown next to the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconKind {
    Root,
    Directory,
    File,
}

impl IconKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Directory => "dir",
            Self::File => "file",
        }
    }
}

/// A cell value. Absence ("no value") is expressed as `None` by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(CompactString),
    Bytes(u64),
    Time(SystemTime),
    Check(CheckState),
    Icon(IconKind),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_check(&self) -> Option<CheckState> {
        match self {
            Self::Check(state) => Some(*state),
            _ => None,
        }
    }

    pub fn as_icon(&self) -> Option<IconKind> {
        match self {
            Self::Icon(icon) => Some(*icon),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => write!(f, "{bytes}"),
            Self::Time(time) => {
                let local: DateTime<Local> = (*time).into();
                write!(f, "{}", local.format("%Y-%m-%d %H:%M:%S"))
            }
            Self::Check(state) => write!(f, "[{}]", state.marker()),
            Self::Icon(icon) => f.write_str(icon.label()),
        }
    }
}

/// Extracts one value from a node. `None` means the cell has no value.
pub type Extractor = Arc<dyn Fn(&FileNode) -> Option<FieldValue> + Send + Sync>;

#[derive(Clone)]
struct Column {
    label: CompactString,
    extract: Extractor,
}

#[derive(Clone, Default)]
pub struct FieldRegistry {
    columns: Vec<Column>,
    facets: HashMap<Role, Extractor>,
}

impl FieldRegistry {
    /// A registry with no columns and no facets.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Name, size, created, modified, owner, permissions; check and icon facets.
    pub fn standard() -> Self {
        Self::empty()
            .with_column("Name", |node| Some(FieldValue::Text(node.info.name.clone())))
            .with_column("Size", |node| {
                (!node.is_dir()).then_some(FieldValue::Bytes(node.info.size))
            })
            .with_column("Created", |node| node.info.created.map(FieldValue::Time))
            .with_column("Modified", |node| node.info.modified.map(FieldValue::Time))
            .with_column("Owner", |node| node.info.owner.clone().map(FieldValue::Text))
            .with_column("Permissions", |node| {
                node.info.permissions.clone().map(FieldValue::Text)
            })
            .with_facet(Role::CheckState, |node| Some(FieldValue::Check(node.check)))
            .with_facet(Role::Decoration, |node| {
                let icon = if node.is_root() {
                    IconKind::Root
                } else if node.is_dir() {
                    IconKind::Directory
                } else {
                    IconKind::File
                };
                Some(FieldValue::Icon(icon))
            })
    }

    /// Append a column.
    pub fn with_column<F>(mut self, label: &str, extract: F) -> Self
    where
        F: Fn(&FileNode) -> Option<FieldValue> + Send + Sync + 'static,
    {
        self.columns.push(Column {
            label: CompactString::new(label),
            extract: Arc::new(extract),
        });
        self
    }

    /// Register (or replace) the extractor for a column-0 facet.
    ///
    /// Registering [`Role::Display`] is ignored; display values come from columns.
    pub fn with_facet<F>(mut self, role: Role, extract: F) -> Self
    where
        F: Fn(&FileNode) -> Option<FieldValue> + Send + Sync + 'static,
    {
        if role != Role::Display {
            self.facets.insert(role, Arc::new(extract));
        }
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn label(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(|c| c.label.as_str())
    }

    /// Value of `node` at `column` for `role`.
    pub fn value(&self, node: &FileNode, column: usize, role: Role) -> Option<FieldValue> {
        match role {
            Role::Display => (self.columns.get(column)?.extract)(node),
            facet if column == 0 => (self.facets.get(&facet)?)(node),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.columns.iter().map(|c| c.label.as_str()).collect();
        let mut facets: Vec<Role> = self.facets.keys().copied().collect();
        facets.sort_by_key(|role| format!("{role:?}"));
        f.debug_struct("FieldRegistry")
            .field("columns", &labels)
            .field("facets", &facets)
            .finish()
    }
}
