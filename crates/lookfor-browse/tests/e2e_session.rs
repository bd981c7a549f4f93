/// End-to-end tests for `BrowseSession` — the headless tree-view state.
///
/// These exercise the real expansion, selection and export paths against a
/// real temporary directory, pumping scan results the way a view would each
/// frame. No window or terminal is involved.
use lookfor_browse::{render_to_string, write_selection_csv, BrowseSession, TreeSnapshot};
use lookfor_core::{CheckState, ModelConfig};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// ```text
/// root/
///   a.txt     (100 bytes)
///   b.bin     (200 bytes)
///   sub/
///     c.rs    (300 bytes)
///     deeper/
///       d.md  (400 bytes)
/// ```
fn make_temp_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("a.txt"), 100);
    write_bytes(&tmp.path().join("b.bin"), 200);
    let deeper = tmp.path().join("sub").join("deeper");
    fs::create_dir_all(&deeper).unwrap();
    write_bytes(&tmp.path().join("sub").join("c.rs"), 300);
    write_bytes(&deeper.join("d.md"), 400);
    tmp
}

fn new_session() -> BrowseSession {
    let config = ModelConfig {
        worker_threads: 2,
        ..ModelConfig::default()
    };
    BrowseSession::new(config).unwrap()
}

/// Pump `pump()` until no scan is in flight or the deadline expires.
fn pump_until_done(session: &mut BrowseSession) {
    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    while session.model().is_scanning() {
        assert!(
            std::time::Instant::now() < deadline,
            "scan did not complete within 30 seconds"
        );
        session.pump();
        std::thread::sleep(Duration::from_millis(5));
    }
    session.pump();
}

fn row_of(session: &BrowseSession, name: &str) -> usize {
    session
        .rows()
        .iter()
        .position(|row| session.model().tree().node(row.index.node_id()).info.name.as_str() == name)
        .unwrap_or_else(|| panic!("{name} is not visible"))
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Opening a root shows it expanded with its direct children once pumped.
#[test]
fn open_lists_direct_children() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    pump_until_done(&mut session);

    // root + a.txt + b.bin + sub
    assert_eq!(session.rows().len(), 4);
    assert_eq!(session.rows()[0].depth, 0);
    assert!(session.rows()[0].expanded);
    assert!(session.rows()[1..].iter().all(|row| row.depth == 1));
}

/// Re-opening discards rows, expansion and selection of the previous tree.
#[test]
fn reopen_resets_rows() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    pump_until_done(&mut session);
    let sub = row_of(&session, "sub");
    session.expand(sub);
    pump_until_done(&mut session);
    assert!(session.rows().len() > 4);

    session.open(tmp.path().join("sub"));
    pump_until_done(&mut session);
    // sub + c.rs + deeper
    assert_eq!(session.rows().len(), 3);
    assert!(session.model().checked_paths().is_empty());
}

/// Opening a missing root leaves the session empty.
#[test]
fn open_missing_root_is_empty() {
    let tmp = TempDir::new().unwrap();
    let mut session = new_session();
    session.open(tmp.path().join("missing"));
    pump_until_done(&mut session);
    assert!(session.rows().is_empty());
}

// ── Expansion ─────────────────────────────────────────────────────────────────

/// Expanding an unscanned directory triggers its listing; the rows arrive on
/// later pumps and are nested under it.
#[test]
fn expand_triggers_lazy_listing() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    pump_until_done(&mut session);
    assert_eq!(session.model().scan_stats().jobs_started, 1);

    let sub = row_of(&session, "sub");
    assert!(session.expand(sub));
    assert_eq!(session.model().scan_stats().jobs_started, 2);
    pump_until_done(&mut session);

    let sub = row_of(&session, "sub");
    assert!(session.rows()[sub].expanded);
    let c = row_of(&session, "c.rs");
    assert_eq!(session.rows()[c].depth, 2);
    assert!(c > sub);

    // Collapse and re-expand: no second listing.
    assert!(session.collapse(sub));
    assert!(session.expand(sub));
    assert_eq!(session.model().scan_stats().jobs_started, 2);
    assert_eq!(session.rows().len(), 6);
}

/// `expand_to_depth` opens every level up to the requested depth.
#[test]
fn expand_to_depth_opens_levels() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    assert!(session.expand_to_depth(3, Duration::from_secs(30)));

    // root, a.txt, b.bin, sub, c.rs, deeper, d.md
    assert_eq!(session.rows().len(), 7);
    let d = row_of(&session, "d.md");
    assert_eq!(session.rows()[d].depth, 3);
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Checking by path propagates to the subtree and partially to the root.
#[test]
fn set_checked_by_path() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    assert!(session.expand_to_depth(2, Duration::from_secs(30)));

    let sub = tmp.path().join("sub");
    assert!(session.set_checked(&sub, CheckState::Checked).unwrap());
    let c = session.find(sub.join("c.rs")).unwrap();
    assert_eq!(session.model().check_state(&c), Some(CheckState::Checked));
    let root = session.model().root_index().unwrap();
    assert_eq!(
        session.model().check_state(&root),
        Some(CheckState::PartiallyChecked)
    );

    // Unknown paths are reported, not fatal.
    assert!(!session
        .set_checked(tmp.path().join("nope"), CheckState::Checked)
        .unwrap());
    assert!(!session
        .set_checked("/definitely/elsewhere", CheckState::Checked)
        .unwrap());

    assert_eq!(session.model().checked_paths(), vec![sub]);
}

/// Toggling a visible row's checkbox flips it between checked and unchecked.
#[test]
fn toggle_checked_row() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    pump_until_done(&mut session);

    let a = row_of(&session, "a.txt");
    session.toggle_checked(a).unwrap();
    let index = session.rows()[a].index;
    assert_eq!(session.model().check_state(&index), Some(CheckState::Checked));
    session.toggle_checked(a).unwrap();
    assert_eq!(
        session.model().check_state(&index),
        Some(CheckState::Unchecked)
    );
    assert!(session.toggle_checked(999).is_err());
}

/// A directory checked before it is listed hands its state to what it finds.
#[test]
fn checked_directory_children_inherit_on_expand() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    pump_until_done(&mut session);

    let sub_path = tmp.path().join("sub");
    assert!(session.set_checked(&sub_path, CheckState::Checked).unwrap());
    let sub = row_of(&session, "sub");
    session.expand(sub);
    pump_until_done(&mut session);

    let deeper = session.find(sub_path.join("deeper")).unwrap();
    assert_eq!(
        session.model().check_state(&deeper),
        Some(CheckState::Checked)
    );
}

// ── Output ────────────────────────────────────────────────────────────────────

/// The rendered table has a header plus one line per visible row.
#[test]
fn render_matches_visible_rows() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    assert!(session.expand_to_depth(2, Duration::from_secs(30)));

    let text = render_to_string(&session);
    assert_eq!(text.lines().count(), session.rows().len() + 1);
    assert!(text.contains("100 B"));
}

/// The CSV export lists only the topmost checked entries.
#[test]
fn csv_export_lists_selection() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    assert!(session.expand_to_depth(2, Duration::from_secs(30)));

    session
        .set_checked(tmp.path().join("sub"), CheckState::Checked)
        .unwrap();
    session
        .set_checked(tmp.path().join("b.bin"), CheckState::Checked)
        .unwrap();

    let mut out = Vec::new();
    write_selection_csv(session.model(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut rows: Vec<&str> = text.lines().skip(1).collect();
    rows.sort();

    let mut expected = vec![
        format!("{},file,200", tmp.path().join("b.bin").display()),
        format!("{},dir,", tmp.path().join("sub").display()),
    ];
    expected.sort();
    assert_eq!(rows, expected);
}

/// The JSON snapshot mirrors everything discovered so far.
#[test]
fn snapshot_covers_discovered_tree() {
    let tmp = make_temp_tree();
    let mut session = new_session();
    session.open(tmp.path());
    assert!(session.expand_to_depth(3, Duration::from_secs(30)));

    let snapshot = TreeSnapshot::capture(session.model()).unwrap();
    fn count(node: &TreeSnapshot) -> usize {
        1 + node.children.iter().map(count).sum::<usize>()
    }
    assert_eq!(count(&snapshot), 7);
}
