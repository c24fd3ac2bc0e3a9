//! PostgreSQL adapter against a real database.
//!
//! Run with `cargo test -p posts-service -- --ignored` (Docker required).

mod common;

use posts_service::config::StorageBackend;
use posts_service::repository::PostgresPostRepository;
use posts_service::PostRepository;

async fn repository() -> (testcontainers::ContainerAsync<testcontainers::GenericImage>, PostgresPostRepository) {
    let (container, url) = common::start_postgres().await;
    let pool = common::connect_postgres(&url).await;
    let repo = PostgresPostRepository::new(pool);
    repo.migrate().await.expect("run migrations");
    (container, repo)
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn crud_round_trip() {
    let (_pg, repo) = repository().await;
    assert_eq!(repo.backend(), StorageBackend::Relational);
    repo.health_check().await.expect("health");
    common::exercise_crud(&repo).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn foreign_ids_are_not_found() {
    let (_pg, repo) = repository().await;
    common::exercise_foreign_ids(&repo).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn pages_are_newest_first() {
    let (_pg, repo) = repository().await;
    common::exercise_paging(&repo).await;

    let page = repo
        .list_page(posts_service::models::PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(page.items[0].title, "Post 12");
    assert_eq!(page.items[9].title, "Post 03");
}
