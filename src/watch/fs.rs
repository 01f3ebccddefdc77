//! Filesystem change subscription.
//!
//! Each watched file is observed through its parent directory, so editors
//! that save by writing a temporary file and renaming it over the original
//! keep triggering events. Paths are canonicalized up front and an event is
//! forwarded only when both its directory and file name match a watched file,
//! so a same-named file in another watched directory is ignored.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;

use crate::error_handling::WatchError;

/// A watched file was written, created, or renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
}

/// Returns `true` for the event kinds that count as a change to a file.
pub fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any | ModifyKind::Other
            )
    )
}

/// Subscribes to changes of `paths`, forwarding them on `tx`.
///
/// The returned watcher must be kept alive for as long as events are wanted.
///
/// # Errors
///
/// Returns `WatchError::Subscribe` when a path does not exist or its
/// directory cannot be watched, and `WatchError::Watcher` when the platform
/// watcher cannot be created.
pub fn subscribe(
    paths: &[PathBuf],
    tx: UnboundedSender<FileChange>,
) -> Result<RecommendedWatcher, WatchError> {
    let mut targets: Vec<(PathBuf, OsString)> = Vec::with_capacity(paths.len());
    for path in paths {
        let not_found = || WatchError::Subscribe {
            path: path.clone(),
            source: notify::Error::path_not_found().add_path(path.clone()),
        };
        let canonical = fs::canonicalize(path).map_err(|_| not_found())?;
        if !canonical.is_file() {
            return Err(not_found());
        }
        let name = canonical.file_name().map(OsString::from).ok_or_else(not_found)?;
        targets.push((parent_dir(&canonical).to_path_buf(), name));
    }
    let matcher = targets.clone();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if !is_change(&event.kind) {
                return;
            }
            for path in event.paths {
                if is_watched(&matcher, &path) {
                    debug!("Change detected: {:?} {}", event.kind, path.display());
                    // The receiver is gone once the watch loop has quit
                    let _ = tx.send(FileChange { path });
                }
            }
        }
        Err(e) => warn!("Watcher error: {e}"),
    })
    .map_err(WatchError::Watcher)?;

    let mut dirs: Vec<(&Path, &PathBuf)> = Vec::new();
    for ((dir, _), path) in targets.iter().zip(paths) {
        if !dirs.iter().any(|(seen, _)| *seen == dir.as_path()) {
            dirs.push((dir.as_path(), path));
        }
    }
    for (dir, path) in dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Subscribe {
                path: path.clone(),
                source,
            })?;
        debug!("Watching {} for changes to {}", dir.display(), path.display());
    }

    Ok(watcher)
}

fn is_watched(targets: &[(PathBuf, OsString)], path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let dir = parent_dir(path);
    targets
        .iter()
        .any(|(watched_dir, watched_name)| watched_dir == dir && watched_name == name)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_is_change() {
        assert!(is_change(&EventKind::Create(CreateKind::File)));
        assert!(is_change(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(is_change(&EventKind::Modify(ModifyKind::Name(RenameMode::To))));
        assert!(!is_change(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))));
        assert!(!is_change(&EventKind::Access(AccessKind::Read)));
        assert!(!is_change(&EventKind::Remove(RemoveKind::File)));
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("links.testing")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/etc/.htaccess")), Path::new("/etc"));
    }

    #[test]
    fn test_is_watched_needs_directory_and_name() {
        let targets = vec![(PathBuf::from("/site"), OsString::from(".htaccess"))];
        assert!(is_watched(&targets, Path::new("/site/.htaccess")));
        assert!(!is_watched(&targets, Path::new("/site/tests/.htaccess")));
        assert!(!is_watched(&targets, Path::new("/site/links.testing")));
    }

    #[test]
    fn test_subscribe_missing_file_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = subscribe(&[PathBuf::from("/nonexistent/.htaccess")], tx);
        assert!(matches!(result, Err(WatchError::Subscribe { .. })));
    }

    #[tokio::test]
    async fn test_subscribe_forwards_writes_to_watched_file_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let watched = dir.path().join(".htaccess");
        let other = dir.path().join("unrelated.txt");
        std::fs::write(&watched, "RewriteEngine On\n").expect("write");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watcher = subscribe(&[watched.clone()], tx).expect("subscribe");

        std::fs::write(&other, "noise").expect("write other");
        std::fs::write(&watched, "RewriteEngine Off\n").expect("rewrite");

        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("change event within timeout")
            .expect("channel open");
        assert_eq!(change.path.file_name(), watched.file_name());
    }

    #[tokio::test]
    async fn test_same_name_in_other_watched_directory_ignored() {
        let root = tempfile::tempdir().expect("tempdir");
        let sub = root.path().join("tests");
        std::fs::create_dir(&sub).expect("mkdir");
        let rules = root.path().join(".htaccess");
        let links = sub.join("links.testing");
        std::fs::write(&rules, "RewriteEngine On\n").expect("write rules");
        std::fs::write(&links, "Agent,Country\n").expect("write links");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _watcher = subscribe(&[rules.clone(), links], tx).expect("subscribe");

        // Same file name as the rules file, but next to the test file
        std::fs::write(sub.join(".htaccess"), "decoy").expect("write decoy");
        let early = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(early.is_err(), "unexpected change: {early:?}");

        std::fs::write(&rules, "RewriteEngine Off\n").expect("rewrite");
        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("change event within timeout")
            .expect("channel open");
        assert_eq!(change.path, std::fs::canonicalize(&rules).expect("canonicalize"));
    }
}
