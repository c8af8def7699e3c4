//! The storage node (`spec.md` §4.2): owns a directory on the local
//! filesystem and exposes it over two RPC interfaces, a data interface
//! (`size`/`read`/`write`) and a control interface (`create`/`delete`).
//!
//! The filesystem is authoritative; no in-memory index is kept (`spec.md`
//! §3). All five operations serialize on a single coarse lock, matching the
//! "a single mutex per node is sufficient" note in §4.2.

mod dispatch;
pub mod error;
mod proxy;
mod service;

use std::io;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use tokio::fs as tfs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

pub use dispatch::{ControlDispatch, DataDispatch};
pub use error::Error;
pub use proxy::{ControlProxy, DataProxy};
pub use service::{ServiceError, StorageService};

use crate::path::Path;

/// A storage node's in-process state: the root directory plus the coarse
/// lock serializing `size`/`read`/`write`/`create`/`delete`.
pub struct StorageNode {
    root: PathBuf,
    lock: Mutex<()>,
}

impl StorageNode {
    /// Verifies `root` exists and is a directory (`spec.md` §4.2 startup
    /// step 1), then wraps it.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Arc<StorageNode>> {
        let root = root.into();
        let meta = std::fs::metadata(&root)?;
        if !meta.is_dir() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "storage root is not a directory"));
        }
        Ok(Arc::new(StorageNode { root, lock: Mutex::new(()) }))
    }

    pub fn root(&self) -> &FsPath {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path.to_relative_path())
    }

    pub async fn size(&self, path: &Path) -> Result<u64, Error> {
        let _guard = self.lock.lock().await;
        let full = self.resolve(path);
        let meta = tfs::metadata(&full).await.map_err(not_found_on_missing)?;
        if !meta.is_file() {
            return Err(Error::NotFound);
        }
        Ok(meta.len())
    }

    pub async fn read(&self, path: &Path, offset: i64, length: i64) -> Result<Vec<u8>, Error> {
        let _guard = self.lock.lock().await;
        if offset < 0 || length < 0 {
            return Err(Error::Bounds);
        }
        let full = self.resolve(path);
        let meta = tfs::metadata(&full).await.map_err(not_found_on_missing)?;
        if !meta.is_file() {
            return Err(Error::NotFound);
        }
        let end = offset.checked_add(length).ok_or(Error::Bounds)?;
        if end as u64 > meta.len() {
            return Err(Error::Bounds);
        }

        let mut file = tfs::File::open(&full).await?;
        file.seek(io::SeekFrom::Start(offset as u64)).await?;
        let mut buf = vec![0u8; length as usize];
        file.read_exact(&mut buf).await.map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::Bounds,
            _ => Error::Io(e),
        })?;
        Ok(buf)
    }

    pub async fn write(&self, path: &Path, offset: i64, data: &[u8]) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        if offset < 0 {
            return Err(Error::Bounds);
        }
        if data.is_empty() {
            // Still validate that the target is a writable file, not a no-op
            // regardless of whether `p` exists (`spec.md` §4.2 boundary
            // behavior table, §8: "write(p, offset, []) -> no-op").
            let full = self.resolve(path);
            let meta = tfs::metadata(&full).await.map_err(not_found_on_missing)?;
            if !meta.is_file() {
                return Err(Error::NotFound);
            }
            return Ok(());
        }

        let full = self.resolve(path);
        let meta = tfs::metadata(&full).await.map_err(not_found_on_missing)?;
        if !meta.is_file() {
            return Err(Error::NotFound);
        }

        let mut file = tfs::OpenOptions::new().write(true).open(&full).await?;
        file.seek(io::SeekFrom::Start(offset as u64)).await?;
        file.write_all(data).await?;
        Ok(())
    }

    /// Creates an empty regular file at `path`, creating missing parent
    /// directories (`spec.md` §4.2 control interface). `false` covers every
    /// expected refusal (root, already exists, parent cannot be built); only
    /// a genuine I/O failure is an [`Error`].
    pub async fn create(&self, path: &Path) -> Result<bool, Error> {
        let _guard = self.lock.lock().await;
        if path.is_root() {
            return Ok(false);
        }
        let full = self.resolve(path);
        if full.exists() {
            return Ok(false);
        }

        if let Some(parent) = full.parent() {
            clear_blocking_file(parent).await?;
            if let Err(e) = tfs::create_dir_all(parent).await {
                if e.kind() != io::ErrorKind::AlreadyExists {
                    return Ok(false);
                }
            }
        }

        match tfs::File::create(&full).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Removes `path`: one `unlink` for a file, a post-order recursive
    /// removal for a directory. Root is never deletable.
    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        let _guard = self.lock.lock().await;
        if path.is_root() {
            return Ok(false);
        }
        let full = self.resolve(path);
        let meta = match tfs::metadata(&full).await {
            Ok(m) => m,
            Err(_) => return Ok(false),
        };

        if meta.is_dir() {
            Ok(tfs::remove_dir_all(&full).await.is_ok())
        } else {
            Ok(tfs::remove_file(&full).await.is_ok())
        }
    }

    /// Every file path under the root, relative to it, directories omitted
    /// (`spec.md` §4.2 startup step 3). Blocking, run once at startup before
    /// either listener is serving traffic.
    pub fn list_files(&self) -> io::Result<Vec<Path>> {
        let mut out = Vec::new();
        walk_files(&self.root, &self.root, &mut out)?;
        Ok(out)
    }

    /// Recursively removes any directory under the root that is now empty,
    /// post-order (`spec.md` §4.2 startup step 6), in the same
    /// "collect victims, then remove" shape the `demos/shadow_fs` state
    /// table uses for its own prefix cleanup.
    pub fn prune_empty_dirs(&self) -> io::Result<()> {
        prune_empty(&self.root)?;
        Ok(())
    }
}

async fn clear_blocking_file(parent: &FsPath) -> io::Result<()> {
    // Walk up from the deepest missing component, deleting any regular file
    // that blocks the parent chain (`spec.md` §4.2: "If some component on
    // `p`'s parent path exists as a regular file rather than a directory,
    // that blocking file is deleted before parents are created").
    let mut to_check = Vec::new();
    let mut cur = parent;
    loop {
        to_check.push(cur.to_path_buf());
        match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => cur = p,
            _ => break,
        }
    }
    for candidate in to_check.into_iter().rev() {
        if let Ok(meta) = tfs::metadata(&candidate).await {
            if meta.is_file() {
                tfs::remove_file(&candidate).await?;
            }
        }
    }
    Ok(())
}

fn not_found_on_missing(_: io::Error) -> Error {
    Error::NotFound
}

fn walk_files(root: &FsPath, dir: &FsPath, out: &mut Vec<Path>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let full = entry.path();
        if file_type.is_dir() {
            walk_files(root, &full, out)?;
        } else if file_type.is_file() {
            let rel = full.strip_prefix(root).expect("walked path is under root");
            if let Some(p) = relative_to_path(rel) {
                out.push(p);
            }
        }
    }
    Ok(())
}

fn relative_to_path(rel: &FsPath) -> Option<Path> {
    let mut p = Path::root();
    for component in rel.components() {
        let name = component.as_os_str().to_str()?;
        p = p.join(name).ok()?;
    }
    Some(p)
}

fn prune_empty(dir: &FsPath) -> io::Result<bool> {
    let mut is_empty = true;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let full = entry.path();
        if file_type.is_dir() {
            if prune_empty(&full)? {
                std::fs::remove_dir(&full)?;
            } else {
                is_empty = false;
            }
        } else {
            is_empty = false;
        }
    }
    Ok(is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(dir: &tempfile::TempDir) -> Arc<StorageNode> {
        StorageNode::new(dir.path()).unwrap()
    }

    #[tokio::test]
    async fn create_then_size_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let p: Path = "/hello.txt".parse().unwrap();
        assert!(n.create(&p).await.unwrap());
        assert_eq!(n.size(&p).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_is_rejected_for_root_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        assert!(!n.create(&Path::root()).await.unwrap());
        let p: Path = "/a".parse().unwrap();
        assert!(n.create(&p).await.unwrap());
        assert!(!n.create(&p).await.unwrap());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let p: Path = "/hello.txt".parse().unwrap();
        n.create(&p).await.unwrap();
        n.write(&p, 0, &[0x48, 0x69]).await.unwrap();
        assert_eq!(n.read(&p, 0, 2).await.unwrap(), vec![0x48, 0x69]);
        assert_eq!(n.size(&p).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn read_at_eof_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let p: Path = "/hello.txt".parse().unwrap();
        n.create(&p).await.unwrap();
        n.write(&p, 0, b"hi").await.unwrap();
        assert_eq!(n.read(&p, 2, 0).await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn read_past_end_is_bounds_error() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let p: Path = "/hello.txt".parse().unwrap();
        n.create(&p).await.unwrap();
        n.write(&p, 0, b"hi").await.unwrap();
        assert!(matches!(n.read(&p, 0, 3).await, Err(Error::Bounds)));
    }

    #[tokio::test]
    async fn write_empty_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let p: Path = "/hello.txt".parse().unwrap();
        n.create(&p).await.unwrap();
        n.write(&p, 0, b"hi").await.unwrap();
        n.write(&p, 0, &[]).await.unwrap();
        assert_eq!(n.size(&p).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        assert!(!n.delete(&Path::root()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_file_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let p: Path = "/a".parse().unwrap();
        n.create(&p).await.unwrap();
        assert!(n.delete(&p).await.unwrap());
        assert!(matches!(n.size(&p).await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn create_clears_a_blocking_file() {
        let dir = tempfile::tempdir().unwrap();
        let n = node(&dir);
        let blocker: Path = "/a".parse().unwrap();
        n.create(&blocker).await.unwrap();
        let nested: Path = "/a/b/c".parse().unwrap();
        assert!(n.create(&nested).await.unwrap());
        assert_eq!(n.size(&nested).await.unwrap(), 0);
    }

    #[test]
    fn list_files_omits_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("f"), b"x").unwrap();
        std::fs::write(dir.path().join("top"), b"y").unwrap();
        let n = StorageNode::new(dir.path()).unwrap();
        let mut files: Vec<String> = n.list_files().unwrap().iter().map(|p| p.to_string()).collect();
        files.sort();
        assert_eq!(files, vec!["/sub/f".to_string(), "/top".to_string()]);
    }

    #[test]
    fn prune_removes_now_empty_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let n = StorageNode::new(dir.path()).unwrap();
        n.prune_empty_dirs().unwrap();
        assert!(!dir.path().join("a").exists());
    }
}
