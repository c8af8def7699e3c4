//! Runnable walkthrough of scenario 1 from `spec.md` §8: a naming node and
//! one storage node, bootstrapped in a single process, serving a
//! `createFile` / `write` / `read` round trip.

use filestack::naming::{ClientProxy, NamingService};
use filestack::path::Path;
use filestack::storage::StorageService;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let naming = NamingService::start("127.0.0.1:0".parse().unwrap(), "127.0.0.1:0".parse().unwrap())
        .await
        .expect("naming node failed to start");
    println!("naming node: client={} registration={}", naming.client_addr(), naming.registration_addr());

    let root = tempfile::tempdir().expect("failed to create scratch storage root");
    let storage = StorageService::start(
        root.path(),
        "127.0.0.1:0".parse().unwrap(),
        "127.0.0.1:0".parse().unwrap(),
        naming.registration_addr(),
    )
    .await
    .expect("storage node failed to start and register");
    println!("storage node: root={} data={}", root.path().display(), storage.data_addr());

    let client = ClientProxy::new(naming.client_addr());

    let hello: Path = "/hello.txt".parse().unwrap();
    let created = client.create_file(&hello).await.expect("createFile failed");
    println!("createFile(/hello.txt) -> {created}");

    let is_dir = client.is_directory(&hello).await.expect("isDirectory failed");
    println!("isDirectory(/hello.txt) -> {is_dir}");

    let children = client.list(&Path::root()).await.expect("list failed");
    println!("list(/) -> {children:?}");

    let data_proxy = client.get_storage(&hello).await.expect("getStorage failed");
    data_proxy.write(&hello, 0, b"Hi").await.expect("write failed");
    let bytes = data_proxy.read(&hello, 0, 2).await.expect("read failed");
    println!("read(/hello.txt, 0, 2) -> {bytes:?}");

    let deleted = client.delete(&hello).await.expect("delete failed");
    println!("delete(/hello.txt) -> {deleted}");

    storage.stop().await;
    naming.stop().await;
}
