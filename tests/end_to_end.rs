//! The six literal end-to-end scenarios from `spec.md` §8, driven over real
//! TCP connections between a naming node and one or two storage nodes.

use std::net::SocketAddr;

use filestack::naming::{ClientProxy, NamingService};
use filestack::path::Path;
use filestack::storage::StorageService;

async fn start_naming() -> NamingService {
    NamingService::start(loopback(), loopback()).await.expect("naming node failed to start")
}

async fn start_storage(root: &std::path::Path, naming_registration_addr: SocketAddr) -> StorageService {
    StorageService::start(root, loopback(), loopback(), naming_registration_addr)
        .await
        .expect("storage node failed to start and register")
}

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

fn path(s: &str) -> Path {
    s.parse().unwrap()
}

#[tokio::test]
async fn scenario_1_bootstrap_and_create() {
    let naming = start_naming().await;
    let s1_root = tempfile::tempdir().unwrap();
    let _s1 = start_storage(s1_root.path(), naming.registration_addr()).await;

    let client = ClientProxy::new(naming.client_addr());
    assert!(client.create_file(&path("/hello.txt")).await.unwrap());
    assert!(!client.is_directory(&path("/hello.txt")).await.unwrap());
    assert_eq!(client.list(&Path::root()).await.unwrap(), vec!["hello.txt".to_string()]);
}

#[tokio::test]
async fn scenario_2_register_with_duplicate() {
    let naming = start_naming().await;

    let s1_root = tempfile::tempdir().unwrap();
    std::fs::write(s1_root.path().join("a"), b"").unwrap();
    std::fs::write(s1_root.path().join("b"), b"").unwrap();
    let _s1 = start_storage(s1_root.path(), naming.registration_addr()).await;

    let s2_root = tempfile::tempdir().unwrap();
    std::fs::write(s2_root.path().join("a"), b"").unwrap();
    std::fs::write(s2_root.path().join("c"), b"").unwrap();
    let _s2 = start_storage(s2_root.path(), naming.registration_addr()).await;

    // S2's local copy of "/a" was a duplicate and should have been deleted
    // locally after registration (`spec.md` §2).
    assert!(!s2_root.path().join("a").exists());

    let client = ClientProxy::new(naming.client_addr());
    let mut children = client.list(&Path::root()).await.unwrap();
    children.sort();
    assert_eq!(children, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn scenario_3_read_modify_read() {
    let naming = start_naming().await;
    let s1_root = tempfile::tempdir().unwrap();
    let _s1 = start_storage(s1_root.path(), naming.registration_addr()).await;

    let client = ClientProxy::new(naming.client_addr());
    let hello = path("/hello.txt");
    assert!(client.create_file(&hello).await.unwrap());

    let data_proxy = client.get_storage(&hello).await.unwrap();
    data_proxy.write(&hello, 0, &[0x48, 0x69]).await.unwrap();
    assert_eq!(data_proxy.read(&hello, 0, 2).await.unwrap(), vec![0x48, 0x69]);
    assert_eq!(data_proxy.size(&hello).await.unwrap(), 2);
}

#[tokio::test]
async fn scenario_4_delete_propagation() {
    let naming = start_naming().await;
    let s1_root = tempfile::tempdir().unwrap();
    let _s1 = start_storage(s1_root.path(), naming.registration_addr()).await;

    let client = ClientProxy::new(naming.client_addr());
    let hello = path("/hello.txt");
    assert!(client.create_file(&hello).await.unwrap());

    assert!(client.delete(&hello).await.unwrap());
    assert!(client.is_directory(&hello).await.is_err());
    assert!(!s1_root.path().join("hello.txt").exists());
}

#[tokio::test]
async fn scenario_5_directory_create_and_list() {
    let naming = start_naming().await;
    let client = ClientProxy::new(naming.client_addr());

    let d = path("/d");
    assert!(client.create_directory(&d).await.unwrap());
    assert!(!client.create_directory(&d).await.unwrap());
    assert!(client.create_directory(&path("/d/e/f")).await.is_err());
    assert!(client.create_directory(&path("/d/e")).await.unwrap());
    assert_eq!(client.list(&d).await.unwrap(), vec!["e".to_string()]);
}

#[test]
fn scenario_6_parameter_validation() {
    assert!("foo".parse::<Path>().is_err());
    assert!("/a:b".parse::<Path>().is_err());
    assert_eq!("/".parse::<Path>().unwrap(), Path::root());
    assert!(Path::root().parent().is_err());
}

#[tokio::test]
async fn create_file_requires_existing_parent() {
    let naming = start_naming().await;
    let s1_root = tempfile::tempdir().unwrap();
    let _s1 = start_storage(s1_root.path(), naming.registration_addr()).await;

    let client = ClientProxy::new(naming.client_addr());
    assert!(client.create_file(&path("/a/b/c")).await.is_err());
}

#[tokio::test]
async fn delete_root_is_rejected_by_naming_and_storage() {
    let naming = start_naming().await;
    let s1_root = tempfile::tempdir().unwrap();
    let storage = start_storage(s1_root.path(), naming.registration_addr()).await;

    let client = ClientProxy::new(naming.client_addr());
    assert!(!client.delete(&Path::root()).await.unwrap());

    let node = storage.node().clone();
    assert!(!node.delete(&Path::root()).await.unwrap());
}

#[tokio::test]
async fn directory_delete_purges_descendants() {
    let naming = start_naming().await;
    let s1_root = tempfile::tempdir().unwrap();
    let _s1 = start_storage(s1_root.path(), naming.registration_addr()).await;

    let client = ClientProxy::new(naming.client_addr());
    assert!(client.create_directory(&path("/d")).await.unwrap());
    assert!(client.create_directory(&path("/d/e")).await.unwrap());
    assert!(client.create_file(&path("/d/e/f")).await.unwrap());

    assert!(client.delete(&path("/d")).await.unwrap());
    assert!(client.is_directory(&path("/d")).await.is_err());
    assert!(client.is_directory(&path("/d/e")).await.is_err());
    assert!(client.is_directory(&path("/d/e/f")).await.is_err());
}
