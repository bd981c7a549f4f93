/// Owner lookup for the owner column.
///
/// Unix resolves uids with `getpwuid_r`. Results are cached process-wide
/// because every entry of a directory usually shares one owner, and scan
/// workers would otherwise hit the password database once per entry.
use compact_str::CompactString;
use std::fs::Metadata;

#[cfg(unix)]
pub fn owner_name(meta: &Metadata) -> Option<CompactString> {
    use std::os::unix::fs::MetadataExt;
    Some(cached_user_name(meta.uid()))
}

#[cfg(not(unix))]
pub fn owner_name(_meta: &Metadata) -> Option<CompactString> {
    None
}

#[cfg(unix)]
fn cached_user_name(uid: u32) -> CompactString {
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::OnceLock;

    static NAMES: OnceLock<Mutex<HashMap<u32, CompactString>>> = OnceLock::new();
    let names = NAMES.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(name) = names.lock().get(&uid) {
        return name.clone();
    }
    // Resolved outside the lock; two workers racing on one uid both insert the same name.
    let name = lookup_user_name(uid).unwrap_or_else(|| CompactString::new(uid.to_string()));
    names.lock().insert(uid, name.clone());
    name
}

/// Upper bound for the `getpwuid_r` scratch buffer.
#[cfg(unix)]
const MAX_PASSWD_BUFFER: usize = 64 * 1024;

#[cfg(unix)]
fn lookup_user_name(uid: u32) -> Option<CompactString> {
    let mut buf_len = 1024usize;
    loop {
        let mut buf: Vec<libc::c_char> = vec![0; buf_len];
        // SAFETY: `passwd` is plain old data; getpwuid_r fills it in and points
        // its string fields into `buf`, which outlives every read below.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(
                uid as libc::uid_t,
                &mut pwd,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf_len < MAX_PASSWD_BUFFER {
            buf_len *= 2;
            continue;
        }
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            return None;
        }
        // SAFETY: pw_name is a NUL-terminated string inside `buf`.
        let name = unsafe { std::ffi::CStr::from_ptr(pwd.pw_name) };
        return Some(CompactString::new(name.to_string_lossy()));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_owner_of_fresh_file_is_resolved() {
        let tmp = tempfile::TempDir::new().unwrap();
        let meta = std::fs::metadata(tmp.path()).unwrap();
        let owner = owner_name(&meta).unwrap();
        assert!(!owner.is_empty());
    }

    #[test]
    fn test_unknown_uid_falls_back_to_number() {
        // Extremely unlikely to exist in any password database.
        let uid = 4_000_000_123;
        assert_eq!(cached_user_name(uid), "4000000123");
    }
}
