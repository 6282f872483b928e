use super::*;

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[test]
fn dir_workspace_stages_and_releases() {
    let root = tempfile::tempdir().unwrap();
    let provider = DirWorkspaces::new(root.path().join("staging"));

    let mut ws = provider.acquire("user1").unwrap();
    ws.write("user1.png", b"abc").unwrap();
    assert_eq!(ws.read("user1.png").unwrap(), b"abc");
    assert_eq!(entries(provider.root()), 1);

    ws.release().unwrap();
    assert_eq!(entries(provider.root()), 0);
}

#[test]
fn dir_workspace_is_removed_on_drop() {
    let root = tempfile::tempdir().unwrap();
    let provider = DirWorkspaces::new(root.path());
    {
        let mut ws = provider.acquire("user2").unwrap();
        ws.write("a.png", b"x").unwrap();
        assert_eq!(entries(root.path()), 1);
    }
    assert_eq!(entries(root.path()), 0);
}

#[test]
fn same_key_gets_distinct_directories() {
    let root = tempfile::tempdir().unwrap();
    let provider = DirWorkspaces::new(root.path());
    let a = provider.acquire("same").unwrap();
    let b = provider.acquire("same").unwrap();
    assert_eq!(entries(root.path()), 2);
    drop(a);
    drop(b);
    assert_eq!(entries(root.path()), 0);
}

#[test]
fn staged_names_cannot_escape() {
    let root = tempfile::tempdir().unwrap();
    let provider = DirWorkspaces::new(root.path());
    let mut ws = provider.acquire("k").unwrap();
    assert!(ws.write("../escape.png", b"x").is_err());
    assert!(ws.write("", b"x").is_err());
    assert!(ws.read("a/b").is_err());
}

#[test]
fn memory_workspace_tracks_live_count() {
    let provider = MemoryWorkspaces::new();
    let mut ws = provider.acquire("k").unwrap();
    assert_eq!(provider.live_count(), 1);
    ws.write("x.png", b"1").unwrap();
    assert_eq!(ws.read("x.png").unwrap(), b"1");
    assert!(ws.read("missing.png").is_err());
    ws.release().unwrap();
    assert_eq!(provider.live_count(), 0);

    let ws = provider.acquire("k").unwrap();
    drop(ws);
    assert_eq!(provider.live_count(), 0);
}
