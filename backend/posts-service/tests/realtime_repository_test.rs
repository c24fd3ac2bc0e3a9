//! Redis hierarchical store adapter against a real server.
//!
//! Run with `cargo test -p posts-service -- --ignored` (Docker required).

mod common;

use posts_service::config::StorageBackend;
use posts_service::models::PostDraft;
use posts_service::repository::push_id::PUSH_ID_LEN;
use posts_service::repository::RealtimePostRepository;
use posts_service::PostRepository;
use redis_utils::RedisPool;

async fn repository(
    root: &str,
) -> (
    testcontainers::ContainerAsync<testcontainers::GenericImage>,
    RedisPool,
    RealtimePostRepository,
) {
    let (container, url) = common::start_redis().await;
    let pool = RedisPool::connect(&url).await.expect("connect redis");
    let repo = RealtimePostRepository::new(pool.manager(), root).expect("valid root");
    (container, pool, repo)
}

#[tokio::test]
#[ignore = "Requires Redis server"]
async fn crud_round_trip() {
    let (_redis, _pool, repo) = repository("posts").await;
    assert_eq!(repo.backend(), StorageBackend::Realtime);
    repo.health_check().await.expect("health");
    common::exercise_crud(&repo).await;
}

#[tokio::test]
#[ignore = "Requires Redis server"]
async fn foreign_ids_are_not_found() {
    let (_redis, _pool, repo) = repository("posts").await;
    common::exercise_foreign_ids(&repo).await;
}

#[tokio::test]
#[ignore = "Requires Redis server"]
async fn children_list_in_creation_order() {
    let (_redis, _pool, repo) = repository("blog/posts").await;
    common::exercise_paging(&repo).await;

    let all = repo.list().await.unwrap();
    assert_eq!(all[0].title, "Post 01");
    assert_eq!(all[11].title, "Post 12");
    assert!(all.iter().all(|p| p.id.as_str().len() == PUSH_ID_LEN));
}

#[tokio::test]
#[ignore = "Requires Redis server"]
async fn nodes_are_stored_under_the_root_path() {
    let (_redis, pool, repo) = repository("blog/posts").await;
    let created = repo.create(PostDraft::new("Hello", "World")).await.unwrap();

    let manager = pool.manager();
    let mut conn = manager.lock().await;
    let raw: Option<String> = redis::cmd("HGET")
        .arg("blog/posts")
        .arg(created.id.as_str())
        .query_async(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    let node: serde_json::Value = serde_json::from_str(&raw.expect("child node")).unwrap();
    assert_eq!(node["title"], "Hello");
    assert_eq!(node["body"], "World");
}

#[tokio::test]
#[ignore = "Requires Redis server"]
async fn malformed_children_are_skipped_when_listing() {
    let (_redis, pool, repo) = repository("posts").await;
    repo.create(PostDraft::new("Good", "node")).await.unwrap();

    let manager = pool.manager();
    let mut conn = manager.lock().await;
    let _: () = redis::cmd("HSET")
        .arg("posts")
        .arg("-Broken")
        .arg("{not json")
        .query_async(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    let all = repo.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Good");
}
