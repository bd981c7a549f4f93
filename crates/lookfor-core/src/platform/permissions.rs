/// Permission strings for the permissions column.
use compact_str::CompactString;
use std::fs::Metadata;

/// Render the permission bits of `meta`.
///
/// Unix: the classic nine-character `rwxr-xr-x` form.
/// Elsewhere: `r--` for read-only entries, `rw-` otherwise.
#[cfg(unix)]
pub fn permission_string(meta: &Metadata) -> CompactString {
    use std::os::unix::fs::PermissionsExt;
    mode_string(meta.permissions().mode())
}

#[cfg(not(unix))]
pub fn permission_string(meta: &Metadata) -> CompactString {
    if meta.permissions().readonly() {
        CompactString::const_new("r--")
    } else {
        CompactString::const_new("rw-")
    }
}

/// Render the low nine mode bits.
pub fn mode_string(mode: u32) -> CompactString {
    const FLAGS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    FLAGS
        .iter()
        .map(|&(bit, ch)| if mode & bit != 0 { ch } else { '-' })
        .collect()
}
