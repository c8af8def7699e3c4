//! The naming node (`spec.md` §4.3): the single process that owns the
//! directory tree, accepts storage registrations, and routes client
//! metadata operations to the storage node that holds each file.
//!
//! Mutations that cross multiple structures (`createFile`, `delete`,
//! `register`) are atomic with respect to any other namespace-observing
//! operation by holding [`Namespace`] behind one coarse
//! [`tokio::sync::Mutex`] for the whole call (`spec.md` §4.3
//! "Concurrency", §9 "Global mutable state of the naming node").

mod dispatch;
pub mod error;
mod proxy;
mod service;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::Mutex;

pub use dispatch::{ClientDispatch, RegistrationDispatch};
pub use error::Error;
pub use proxy::{ClientProxy, RegistrationProxy};
pub use service::NamingService;

use crate::path::Path;
use crate::storage::{ControlProxy, DataProxy};

/// The namespace invariants of `spec.md` §3, held at all times outside a
/// single atomic mutation.
struct Namespace {
    files: HashSet<Path>,
    directories: HashSet<Path>,
    primary: HashMap<Path, DataProxy>,
    replicas: HashMap<Path, HashSet<DataProxy>>,
    storage_command: HashMap<DataProxy, ControlProxy>,
}

impl Namespace {
    fn new() -> Namespace {
        let mut directories = HashSet::new();
        directories.insert(Path::root());
        Namespace {
            files: HashSet::new(),
            directories,
            primary: HashMap::new(),
            replicas: HashMap::new(),
            storage_command: HashMap::new(),
        }
    }
}

/// The naming node's namespace, guarded by a single coarse mutex.
pub struct NamingNode {
    namespace: Mutex<Namespace>,
}

impl Default for NamingNode {
    fn default() -> NamingNode {
        NamingNode::new()
    }
}

impl NamingNode {
    pub fn new() -> NamingNode {
        NamingNode { namespace: Mutex::new(Namespace::new()) }
    }

    pub async fn is_directory(&self, path: &Path) -> Result<bool, Error> {
        let ns = self.namespace.lock().await;
        if ns.directories.contains(path) {
            Ok(true)
        } else if ns.files.contains(path) {
            Ok(false)
        } else {
            Err(Error::NotFound)
        }
    }

    /// Immediate children of `path`, any order, no duplicates (`spec.md`
    /// §4.3 "list algorithm": scan `files ∪ directories` for an immediate
    /// child per [`Path::is_immediate_parent_of`]).
    pub async fn list(&self, path: &Path) -> Result<Vec<String>, Error> {
        let ns = self.namespace.lock().await;
        if !ns.directories.contains(path) {
            return Err(Error::NotFound);
        }
        let mut names: Vec<String> = ns
            .files
            .iter()
            .chain(ns.directories.iter())
            .filter(|candidate| path.is_immediate_parent_of(candidate))
            .map(|candidate| candidate.last_component().expect("non-root child has a last component").to_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Picks one registered storage reference at random and creates `path`
    /// on it (`spec.md` §4.3 "createFile algorithm"; §9 note 1 resolves the
    /// source's ambiguous loop as "pick one and only one server").
    pub async fn create_file(&self, path: &Path) -> Result<bool, Error> {
        let mut ns = self.namespace.lock().await;
        if path.is_root() || ns.files.contains(path) || ns.directories.contains(path) {
            return Ok(false);
        }
        let parent = path.parent().expect("non-root path has a parent");
        if !ns.directories.contains(&parent) {
            return Err(Error::NotFound);
        }

        let candidates: Vec<DataProxy> = ns.storage_command.keys().copied().collect();
        let Some(chosen) = candidates.choose(&mut rand::thread_rng()).copied() else {
            // No storage node has ever registered; there is nowhere to
            // place the file. Not part of spec.md's taxonomy (every
            // end-to-end scenario registers a storage node first) — treated
            // as "could not be created", the same bucket as an
            // already-existing path, rather than invented as a new error
            // kind.
            return Ok(false);
        };
        let control = *ns.storage_command.get(&chosen).expect("every candidate has a control proxy");

        let created = control.create(path).await.map_err(Error::from)?;
        if !created {
            return Ok(false);
        }

        ns.files.insert(path.clone());
        ns.primary.insert(path.clone(), chosen);
        ns.replicas.insert(path.clone(), HashSet::from([chosen]));
        Ok(true)
    }

    pub async fn create_directory(&self, path: &Path) -> Result<bool, Error> {
        let mut ns = self.namespace.lock().await;
        if path.is_root() || ns.files.contains(path) || ns.directories.contains(path) {
            return Ok(false);
        }
        let parent = path.parent().expect("non-root path has a parent");
        if !ns.directories.contains(&parent) {
            return Err(Error::NotFound);
        }
        ns.directories.insert(path.clone());
        Ok(true)
    }

    /// For a file: every replica must confirm removal. For a directory:
    /// every storage node owning a file strictly under it must confirm,
    /// then every descendant file *and directory* entry is purged
    /// (`spec.md` §4.3 "delete algorithm"; §9 note 3 corrects the source's
    /// omission of descendant-directory cleanup).
    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        if path.is_root() {
            return Ok(false);
        }
        let mut ns = self.namespace.lock().await;
        if ns.files.contains(path) {
            return delete_file(&mut ns, path).await;
        }
        if ns.directories.contains(path) {
            return delete_directory(&mut ns, path).await;
        }
        Err(Error::NotFound)
    }

    pub async fn get_storage(&self, path: &Path) -> Result<DataProxy, Error> {
        let ns = self.namespace.lock().await;
        ns.primary.get(path).copied().ok_or(Error::NotFound)
    }

    /// `register(data, control, paths)` (`spec.md` §4.3 "Registration
    /// interface"). Initializes `replicas[p] = {data}` for every newly
    /// registered file (§9 note 4 corrects the source's omission).
    pub async fn register(
        &self,
        data: DataProxy,
        control: ControlProxy,
        paths: Vec<Path>,
    ) -> Result<Vec<Path>, Error> {
        let mut ns = self.namespace.lock().await;
        if ns.storage_command.contains_key(&data) {
            return Err(Error::AlreadyRegistered);
        }

        let mut duplicates = Vec::new();
        for path in paths {
            if path.is_root() || ns.files.contains(&path) || ns.directories.contains(&path) {
                duplicates.push(path);
                continue;
            }
            for prefix in path.proper_prefixes() {
                ns.directories.insert(prefix);
            }
            ns.files.insert(path.clone());
            ns.primary.insert(path.clone(), data);
            ns.replicas.insert(path, HashSet::from([data]));
        }

        ns.storage_command.insert(data, control);
        Ok(duplicates)
    }
}

async fn delete_file(ns: &mut Namespace, path: &Path) -> Result<bool, Error> {
    let replicas = ns.replicas.get(path).cloned().unwrap_or_default();
    let mut all_ok = true;
    for replica in &replicas {
        let control = ns.storage_command.get(replica).copied();
        let ok = match control {
            Some(control) => match control.delete(path).await {
                Ok(true) => true,
                Ok(false) => false,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path, "replica delete failed during file delete");
                    false
                }
            },
            None => false,
        };
        all_ok &= ok;
    }
    if all_ok {
        ns.files.remove(path);
        ns.primary.remove(path);
        ns.replicas.remove(path);
    }
    Ok(all_ok)
}

async fn delete_directory(ns: &mut Namespace, path: &Path) -> Result<bool, Error> {
    let owners: HashSet<DataProxy> = ns
        .files
        .iter()
        .filter(|f| path.is_strict_prefix_of(f))
        .flat_map(|f| ns.replicas.get(f).cloned().unwrap_or_default())
        .collect();

    let mut all_ok = true;
    for owner in &owners {
        let control = ns.storage_command.get(owner).copied();
        let ok = match control {
            Some(control) => match control.delete(path).await {
                Ok(ok) => ok,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path, "replica delete failed during directory delete");
                    false
                }
            },
            None => false,
        };
        all_ok &= ok;
    }

    if all_ok {
        let doomed_files: Vec<Path> =
            ns.files.iter().filter(|f| path.is_strict_prefix_of(f)).cloned().collect();
        for f in doomed_files {
            ns.files.remove(&f);
            ns.primary.remove(&f);
            ns.replicas.remove(&f);
        }
        let doomed_dirs: Vec<Path> =
            ns.directories.iter().filter(|d| path.is_strict_prefix_of(d)).cloned().collect();
        for d in doomed_dirs {
            ns.directories.remove(&d);
        }
        ns.directories.remove(path);
    }
    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> std::net::SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[tokio::test]
    async fn list_root_is_empty_initially() {
        let node = NamingNode::new();
        assert_eq!(node.list(&Path::root()).await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn is_directory_not_found_for_unknown_path() {
        let node = NamingNode::new();
        let p: Path = "/nope".parse().unwrap();
        assert!(matches!(node.is_directory(&p).await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn create_directory_then_list() {
        let node = NamingNode::new();
        let d: Path = "/d".parse().unwrap();
        assert!(node.create_directory(&d).await.unwrap());
        assert!(!node.create_directory(&d).await.unwrap());
        let nested: Path = "/d/e/f".parse().unwrap();
        assert!(matches!(node.create_directory(&nested).await, Err(Error::NotFound)));
        let e: Path = "/d/e".parse().unwrap();
        assert!(node.create_directory(&e).await.unwrap());
        assert_eq!(node.list(&d).await.unwrap(), vec!["e".to_string()]);
    }

    #[tokio::test]
    async fn register_walks_prefixes_and_populates_replicas() {
        let node = NamingNode::new();
        let data = DataProxy::new(addr(40001));
        let control = ControlProxy::new(addr(40002));
        let a: Path = "/a/b".parse().unwrap();
        let dups = node.register(data, control, vec![a.clone()]).await.unwrap();
        assert!(dups.is_empty());
        assert!(node.is_directory(&"/a".parse().unwrap()).await.unwrap());
        assert!(!node.is_directory(&a).await.unwrap());
        assert_eq!(node.get_storage(&a).await.unwrap(), data);
    }

    #[tokio::test]
    async fn register_twice_from_same_proxy_is_already_registered() {
        let node = NamingNode::new();
        let data = DataProxy::new(addr(40003));
        let control = ControlProxy::new(addr(40004));
        node.register(data, control, vec![]).await.unwrap();
        assert!(matches!(node.register(data, control, vec![]).await, Err(Error::AlreadyRegistered)));
    }

    #[tokio::test]
    async fn register_reports_duplicates() {
        let node = NamingNode::new();
        let data1 = DataProxy::new(addr(40005));
        let control1 = ControlProxy::new(addr(40006));
        node.register(data1, control1, vec!["/a".parse().unwrap()]).await.unwrap();

        let data2 = DataProxy::new(addr(40007));
        let control2 = ControlProxy::new(addr(40008));
        let dups = node.register(data2, control2, vec!["/a".parse().unwrap(), "/c".parse().unwrap()]).await.unwrap();
        assert_eq!(dups, vec!["/a".parse::<Path>().unwrap()]);
    }
}
