/// Selection export (CSV) and whole-tree snapshots (JSON).
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use lookfor_core::model::{EntryKind, ScanStatus};
use lookfor_core::{CheckState, FileSystemModel, NodeId};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct SelectionRecord<'a> {
    path: String,
    kind: &'a str,
    size: Option<u64>,
}

/// Write the topmost checked entries as `path,kind,size` rows.
///
/// Directories leave `size` empty.
pub fn write_selection_csv<W: Write>(model: &FileSystemModel, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for index in model.checked_indexes() {
        let node = model.tree().node(index.node_id());
        let Some(path) = model.file_path(&index) else {
            continue;
        };
        out.serialize(SelectionRecord {
            path: path.display().to_string(),
            kind: node.info.kind.label(),
            size: (!node.is_dir()).then_some(node.info.size),
        })
        .context("failed to write selection row")?;
    }
    out.flush().context("failed to flush selection CSV")?;
    Ok(())
}

/// Create `path` and write the selection CSV into it.
pub fn export_selection_csv(model: &FileSystemModel, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_selection_csv(model, file)
}

/// Nested, serializable view of everything discovered so far.
#[derive(Debug, Serialize)]
pub struct TreeSnapshot {
    pub name: CompactString,
    pub kind: EntryKind,
    pub check: CheckState,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSnapshot>,
}

impl TreeSnapshot {
    /// Snapshot the model's tree; `None` when no root is set.
    pub fn capture(model: &FileSystemModel) -> Option<Self> {
        let root = model.tree().root()?;
        Some(Self::of_node(model, root))
    }

    fn of_node(model: &FileSystemModel, id: NodeId) -> Self {
        let tree = model.tree();
        let node = tree.node(id);
        Self {
            name: node.info.name.clone(),
            kind: node.info.kind,
            check: node.check,
            status: node.status,
            size: (!node.is_dir()).then_some(node.info.size),
            modified: node.info.modified.map(DateTime::<Utc>::from),
            children: tree
                .children(id)
                .iter()
                .map(|&child| Self::of_node(model, child))
                .collect(),
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("failed to write tree snapshot")
    }
}
