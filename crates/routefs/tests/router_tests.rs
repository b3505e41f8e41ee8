//! Integration tests for routing through the facade.
//!
//! These tests drive `RouterFs` end to end over in-memory backends and
//! verify that every operation lands on the backend its path resolves to,
//! with paths rewritten on the way in and translated back on the way out.

use std::sync::Arc;

use routefs::{
    BackendRegistry, Filesystem, MemoryFs, RouterConfig, RouterError, RouterFs, WriteMode,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Router with one rewrite rule and a default backend:
///
/// - `s3a://bucket/dir/` → `lakefs://router/main/` on backend "lakefs"
/// - anything else under `s3a://` → backend "s3a", path unchanged
///
/// Returns handles to both backends so tests can inspect physical state.
fn make_router() -> (RouterFs, MemoryFs, MemoryFs) {
    let lakefs = MemoryFs::new();
    let s3 = MemoryFs::new();

    let mut registry = BackendRegistry::new();
    registry.register("lakefs", lakefs.clone()).unwrap();
    registry.register("s3a", s3.clone()).unwrap();

    let config = RouterConfig::builder()
        .rule("s3a://bucket/dir/", "lakefs://router/main/", "lakefs")
        .default_fs("s3a", "s3a")
        .build()
        .unwrap();

    let router = RouterFs::new(config, registry).unwrap();
    (router, lakefs, s3)
}

async fn write_through(router: &RouterFs, path: &str, data: &[u8]) {
    let mut writer = router.open_write(path, WriteMode::Overwrite).await.unwrap();
    writer.write_all(data).await.unwrap();
    writer.shutdown().await.unwrap();
}

async fn read_through(router: &RouterFs, path: &str) -> Vec<u8> {
    let mut reader = router.open_read(path).await.unwrap();
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await.unwrap();
    data
}

// ============================================================================
// Resolution through the facade
// ============================================================================

#[tokio::test]
async fn resolves_mapped_and_default_paths() {
    let (router, _, _) = make_router();

    let mapped = router.resolve("s3a://bucket/dir/out").unwrap();
    assert_eq!(mapped.physical_path, "lakefs://router/main/out");
    assert_eq!(mapped.backend_id, "lakefs");

    let fallback = router.resolve("s3a://otherbucket/x").unwrap();
    assert_eq!(fallback.physical_path, "s3a://otherbucket/x");
    assert_eq!(fallback.backend_id, "s3a");
}

#[tokio::test]
async fn first_registered_rule_wins() {
    let mut registry = BackendRegistry::new();
    registry.register("specific", MemoryFs::new()).unwrap();
    registry.register("general", MemoryFs::new()).unwrap();

    // More specific prefix registered first, as callers must.
    let config = RouterConfig::builder()
        .rule("s3a://a/b/", "mem://specific/", "specific")
        .rule("s3a://a/", "mem://general/", "general")
        .build()
        .unwrap();
    let router = RouterFs::new(config, registry).unwrap();

    let loc = router.resolve("s3a://a/b/c").unwrap();
    assert_eq!(loc.backend_id, "specific");
    assert_eq!(loc.physical_path, "mem://specific/c");
}

#[tokio::test]
async fn malformed_path_never_reaches_a_backend() {
    let (router, _, _) = make_router();
    let err = router.open_read("no-scheme/path").await.err().unwrap();
    assert!(matches!(err, RouterError::MalformedPath(_)));
}

#[tokio::test]
async fn unknown_scheme_without_default_is_unroutable() {
    let (router, _, _) = make_router();
    let err = router.exists("wasb://container/x").await.unwrap_err();
    assert!(matches!(err, RouterError::Unroutable(_)));
}

// ============================================================================
// I/O dispatch
// ============================================================================

#[tokio::test]
async fn write_lands_on_the_mapped_backend() {
    let (router, lakefs, s3) = make_router();

    write_through(&router, "s3a://bucket/dir/out", b"routed").await;

    // Physically stored under the rewritten prefix on the mapped backend.
    assert_eq!(lakefs.contents("lakefs://router/main/out").unwrap(), b"routed");
    assert!(!s3.exists("s3a://bucket/dir/out").await);

    // And readable back through the logical path.
    assert_eq!(read_through(&router, "s3a://bucket/dir/out").await, b"routed");
}

#[tokio::test]
async fn unmatched_write_lands_on_the_default_backend() {
    let (router, lakefs, s3) = make_router();

    write_through(&router, "s3a://otherbucket/x", b"fallback").await;

    assert_eq!(s3.contents("s3a://otherbucket/x").unwrap(), b"fallback");
    assert!(!lakefs.exists("s3a://otherbucket/x").await);
}

#[tokio::test]
async fn exists_delete_and_stat_route_consistently() {
    let (router, _, _) = make_router();

    write_through(&router, "s3a://bucket/dir/data.parquet", b"pq").await;

    assert!(router.exists("s3a://bucket/dir/data.parquet").await.unwrap());
    let meta = router.stat("s3a://bucket/dir/data.parquet").await.unwrap();
    assert!(meta.is_file);
    assert_eq!(meta.size, 2);

    assert!(router.delete("s3a://bucket/dir/data.parquet", false).await.unwrap());
    assert!(!router.exists("s3a://bucket/dir/data.parquet").await.unwrap());
    // Hadoop-style boolean: deleting a missing path is not an error.
    assert!(!router.delete("s3a://bucket/dir/data.parquet", false).await.unwrap());
}

#[tokio::test]
async fn mkdir_routes_to_the_mapped_backend() {
    let (router, lakefs, _) = make_router();

    router.mkdir("s3a://bucket/dir/new").await.unwrap();
    assert!(lakefs.exists("lakefs://router/main/new").await);
}

#[tokio::test]
async fn backend_error_carries_backend_and_physical_path() {
    let (router, _, _) = make_router();

    let err = router.open_read("s3a://bucket/dir/missing").await.err().unwrap();
    match err {
        RouterError::Backend { backend, path, .. } => {
            assert_eq!(backend, "lakefs");
            assert_eq!(path, "lakefs://router/main/missing");
        }
        other => panic!("expected tagged backend error, got {:?}", other),
    }
}

// ============================================================================
// Listing translates paths back to logical form
// ============================================================================

#[tokio::test]
async fn list_returns_logical_paths() {
    let (router, _, _) = make_router();

    write_through(&router, "s3a://bucket/dir/out/part-0000", b"a").await;
    write_through(&router, "s3a://bucket/dir/out/part-0001", b"b").await;

    let entries = router.list("s3a://bucket/dir/out").await.unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "s3a://bucket/dir/out/part-0000",
            "s3a://bucket/dir/out/part-0001",
        ]
    );
}

#[tokio::test]
async fn list_on_default_backend_is_identity_translated() {
    let (router, _, s3) = make_router();

    s3.put("s3a://otherbucket/a.txt", b"a").unwrap();
    s3.put("s3a://otherbucket/b.txt", b"b").unwrap();

    let entries = router.list("s3a://otherbucket").await.unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["s3a://otherbucket/a.txt", "s3a://otherbucket/b.txt"]);
}

// ============================================================================
// Rename
// ============================================================================

#[tokio::test]
async fn rename_within_one_backend_succeeds() {
    let (router, lakefs, _) = make_router();

    write_through(&router, "s3a://bucket/dir/old", b"data").await;
    assert!(router.rename("s3a://bucket/dir/old", "s3a://bucket/dir/new").await.unwrap());

    assert!(!lakefs.exists("lakefs://router/main/old").await);
    assert_eq!(lakefs.contents("lakefs://router/main/new").unwrap(), b"data");
}

#[tokio::test]
async fn rename_across_backends_is_refused_without_io() {
    let (router, lakefs, s3) = make_router();

    write_through(&router, "s3a://bucket/dir/src", b"data").await;

    let renamed = router
        .rename("s3a://bucket/dir/src", "s3a://otherbucket/dst")
        .await
        .unwrap();
    assert!(!renamed);

    // Nothing moved on either backend.
    assert!(lakefs.exists("lakefs://router/main/src").await);
    assert!(!s3.exists("s3a://otherbucket/dst").await);
}

// ============================================================================
// The router is itself a Filesystem
// ============================================================================

#[tokio::test]
async fn router_stacks_behind_the_filesystem_trait() {
    let (router, _, _) = make_router();
    let fs: Arc<dyn Filesystem> = Arc::new(router);

    let mut writer = fs
        .open_write("s3a://bucket/dir/nested.txt", WriteMode::Overwrite)
        .await
        .unwrap();
    writer.write_all(b"through the trait").await.unwrap();
    writer.shutdown().await.unwrap();

    assert!(fs.exists("s3a://bucket/dir/nested.txt").await);
    // Typed errors degrade to io::Error through the trait surface.
    let err = fs.open_read("no-scheme").await.err().unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[tokio::test]
async fn a_router_can_be_a_backend_of_another_router() {
    let (inner, lakefs, _) = make_router();

    let mut registry = BackendRegistry::new();
    registry.register("inner", inner).unwrap();
    let config = RouterConfig::builder()
        .rule("warehouse://", "s3a://bucket/dir/", "inner")
        .build()
        .unwrap();
    let outer = RouterFs::new(config, registry).unwrap();

    let mut writer = outer
        .open_write("warehouse://report.csv", WriteMode::Overwrite)
        .await
        .unwrap();
    writer.write_all(b"two hops").await.unwrap();
    writer.shutdown().await.unwrap();

    // warehouse:// → s3a://bucket/dir/ → lakefs://router/main/
    assert_eq!(lakefs.contents("lakefs://router/main/report.csv").unwrap(), b"two hops");
}
