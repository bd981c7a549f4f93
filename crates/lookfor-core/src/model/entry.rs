/// Entry descriptors — the immutable values scan workers hand to the control thread.
///
/// Built entirely off the control thread from a path and its metadata. A
/// descriptor whose metadata could not be read still carries its name and kind,
/// with every metadata field left empty.
use crate::platform;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{DirEntry, Metadata};
use std::path::Path;
use std::time::SystemTime;

/// File or directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[inline]
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }
}

/// Path-derived metadata for a single filesystem entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    /// Display name (NOT the full path). Lossy for names that are not UTF-8.
    pub name: CompactString,
    /// Exact on-disk name; paths are rebuilt from this, never from `name`.
    pub file_name: OsString,
    pub kind: EntryKind,
    /// Size in bytes as reported by the filesystem. Meaningless for directories;
    /// the size column hides it.
    pub size: u64,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    /// Owning user name, or the numeric id when the name cannot be resolved.
    pub owner: Option<CompactString>,
    /// `rwxr-xr-x`-style permission string.
    pub permissions: Option<CompactString>,
}

impl EntryInfo {
    /// A descriptor with a name and kind but no metadata.
    pub fn bare(name: impl Into<CompactString>, kind: EntryKind) -> Self {
        let name = name.into();
        Self {
            file_name: OsString::from(name.as_str()),
            name,
            kind,
            size: 0,
            created: None,
            modified: None,
            owner: None,
            permissions: None,
        }
    }

    /// Describe a listed directory entry.
    ///
    /// `follow_symlinks` controls whether a symlink is described by its target.
    /// A dangling link falls back to describing the link itself.
    pub fn from_dir_entry(entry: &DirEntry, follow_symlinks: bool) -> Self {
        let file_name = entry.file_name();
        let name = CompactString::new(file_name.to_string_lossy());
        let path = entry.path();

        let metadata = if follow_symlinks {
            std::fs::metadata(&path).or_else(|_| entry.metadata())
        } else {
            entry.metadata()
        };

        let mut info = match metadata {
            Ok(meta) => Self::from_metadata(name, &meta),
            Err(_) => {
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                let kind = if is_dir {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };
                Self::bare(name, kind)
            }
        };
        info.file_name = file_name;
        info
    }

    /// Describe the entry at `path`, displayed as `name`.
    ///
    /// Returns `None` when the path does not exist.
    pub fn read(path: &Path, name: impl Into<CompactString>) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        let mut info = Self::from_metadata(name.into(), &meta);
        if let Some(file_name) = path.file_name() {
            info.file_name = file_name.to_os_string();
        }
        Some(info)
    }

    fn from_metadata(name: CompactString, meta: &Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Self {
            file_name: OsString::from(name.as_str()),
            name,
            kind,
            size: meta.len(),
            created: meta.created().ok(),
            modified: meta.modified().ok(),
            owner: platform::owner_name(meta),
            permissions: Some(platform::permission_string(meta)),
        }
    }

    /// `true` for dot-prefixed names.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}
