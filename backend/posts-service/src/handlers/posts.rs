/// Post handlers - the HTML controller for list/create/read/update/delete
use crate::error::Result;
use crate::flash::{self, Flash};
use crate::models::{FieldErrors, PageRequest, PostForm, PostId};
use crate::repository::PostRepository;
use crate::views;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Dependencies shared by every post handler
#[derive(Clone)]
pub struct PostsState {
    pub repository: Arc<dyn PostRepository>,
    pub page_size: u64,
}

impl PostsState {
    pub fn new(repository: Arc<dyn PostRepository>, page_size: u64) -> Self {
        Self {
            repository,
            page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub page: Option<String>,
}

impl IndexQuery {
    /// Requested page; missing or unparsable values mean the first page
    fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(1)
    }
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect_to_index(flash: Flash) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/posts"))
        .cookie(flash.cookie())
        .finish()
}

/// List posts, newest page first, showing any pending flash message
pub async fn index(
    state: web::Data<PostsState>,
    query: web::Query<IndexQuery>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let request = PageRequest::new(query.page(), state.page_size);
    let page = state.repository.list_page(request).await?;
    let flash = Flash::from_request(&req);

    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    // Clear unknown codes too so a stale cookie does not linger.
    if req.cookie(flash::FLASH_COOKIE).is_some() {
        response.cookie(flash::clear_cookie());
    }
    Ok(response.body(views::index(&page, flash.map(|f| f.message()))))
}

/// Empty creation form
pub async fn create_form() -> HttpResponse {
    html(
        StatusCode::OK,
        views::create_form("", "", &FieldErrors::new()),
    )
}

/// Validate and persist a new post
pub async fn store(
    state: web::Data<PostsState>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner().normalized();

    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Rejected post creation");
            return Ok(html(
                StatusCode::UNPROCESSABLE_ENTITY,
                views::create_form(&form.title, &form.body, &errors),
            ));
        }
    };

    let post = state.repository.create(draft).await?;
    info!(post_id = %post.id, "Post created");

    Ok(redirect_to_index(Flash::Created))
}

pub async fn show(state: web::Data<PostsState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = PostId::from(path.into_inner());
    let post = state.repository.read(&id).await?;

    Ok(html(StatusCode::OK, views::show(&post)))
}

/// Edit form prefilled with the stored post
pub async fn edit_form(
    state: web::Data<PostsState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = PostId::from(path.into_inner());
    let post = state.repository.read(&id).await?;

    Ok(html(
        StatusCode::OK,
        views::edit_form(&post.id, &post.title, &post.body, &FieldErrors::new()),
    ))
}

pub async fn update(
    state: web::Data<PostsState>,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    update_post(&state, PostId::from(path.into_inner()), form.into_inner()).await
}

pub async fn destroy(state: web::Data<PostsState>, path: web::Path<String>) -> Result<HttpResponse> {
    destroy_post(&state, PostId::from(path.into_inner())).await
}

/// HTML forms can only POST; dispatch on the `_method` field instead.
pub async fn spoofed(
    state: web::Data<PostsState>,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let id = PostId::from(path.into_inner());
    let form = form.into_inner();
    let method = form
        .method
        .as_deref()
        .map(|m| m.trim().to_ascii_uppercase())
        .unwrap_or_default();

    match method.as_str() {
        "PUT" | "PATCH" => update_post(&state, id, form).await,
        "DELETE" => destroy_post(&state, id).await,
        _ => Ok(HttpResponse::MethodNotAllowed()
            .insert_header((header::ALLOW, "GET, PUT, PATCH, DELETE"))
            .content_type("text/html; charset=utf-8")
            .body(views::error_page(
                405,
                "Method Not Allowed",
                "Use PUT or DELETE to change a post.",
            ))),
    }
}

async fn update_post(state: &PostsState, id: PostId, form: PostForm) -> Result<HttpResponse> {
    let form = form.normalized();

    // Validation runs before the lookup, so invalid input never touches storage.
    let draft = match form.clone().into_draft() {
        Ok(draft) => draft,
        Err(errors) => {
            debug!(post_id = %id, fields = ?errors.keys().collect::<Vec<_>>(), "Rejected post update");
            return Ok(html(
                StatusCode::UNPROCESSABLE_ENTITY,
                views::edit_form(&id, &form.title, &form.body, &errors),
            ));
        }
    };

    let post = state.repository.update(&id, draft).await?;
    info!(post_id = %post.id, "Post updated");

    Ok(redirect_to_index(Flash::Updated))
}

async fn destroy_post(state: &PostsState, id: PostId) -> Result<HttpResponse> {
    state.repository.delete(&id).await?;
    info!(post_id = %id, "Post deleted");

    Ok(redirect_to_index(Flash::Deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use crate::models::Post;
    use crate::repository::{MockPostRepository, RepositoryError};
    use actix_web::{test, App};
    use chrono::Utc;

    fn state(mock: MockPostRepository) -> web::Data<PostsState> {
        web::Data::new(PostsState::new(Arc::new(mock), 10))
    }

    fn sample(id: &str) -> Post {
        let now = Utc::now();
        Post {
            id: PostId::from(id),
            title: "Hello".to_string(),
            body: "World".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_web::test]
    async fn invalid_store_never_writes() {
        let mut mock = MockPostRepository::new();
        mock.expect_create().never();

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_form([("title", "  "), ("body", "kept body")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("The title field is required."));
        assert!(body.contains("kept body"));
    }

    #[actix_web::test]
    async fn invalid_update_never_touches_storage() {
        let mut mock = MockPostRepository::new();
        mock.expect_update().never();
        mock.expect_read().never();

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/posts/5")
            .set_form([("title", "Hi")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn missing_post_is_404_on_every_route() {
        let mut mock = MockPostRepository::new();
        mock.expect_read()
            .returning(|id| Err(RepositoryError::NotFound(id.clone())));
        mock.expect_update()
            .returning(|id, _| Err(RepositoryError::NotFound(id.clone())));
        mock.expect_delete()
            .returning(|id| Err(RepositoryError::NotFound(id.clone())));

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let requests = vec![
            test::TestRequest::get().uri("/posts/404").to_request(),
            test::TestRequest::get().uri("/posts/404/edit").to_request(),
            test::TestRequest::put()
                .uri("/posts/404")
                .set_form([("title", "t"), ("body", "b")])
                .to_request(),
            test::TestRequest::delete().uri("/posts/404").to_request(),
        ];
        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn backend_failure_is_500() {
        let mut mock = MockPostRepository::new();
        mock.expect_list_page().returning(|_| {
            Err(RepositoryError::unavailable(
                StorageBackend::Realtime,
                "connection refused",
            ))
        });

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/posts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = test::read_body(resp).await;
        assert!(!String::from_utf8_lossy(&body).contains("connection refused"));
    }

    #[actix_web::test]
    async fn spoofed_delete_dispatches_to_destroy() {
        let mut mock = MockPostRepository::new();
        mock.expect_delete()
            .withf(|id| id.as_str() == "abc")
            .times(1)
            .returning(|_| Ok(()));

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/posts/abc")
            .set_form([("_method", "delete")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/posts");
    }

    #[actix_web::test]
    async fn post_without_override_is_405() {
        let mut mock = MockPostRepository::new();
        mock.expect_update().never();
        mock.expect_delete().never();

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/posts/abc")
            .set_form([("title", "t"), ("body", "b")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn show_renders_post() {
        let mut mock = MockPostRepository::new();
        mock.expect_read()
            .returning(|id| Ok(sample(id.as_str())));

        let app = test::init_service(
            App::new()
                .app_data(state(mock))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/posts/-Nabc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<h1>Hello</h1>"));
        assert!(body.contains(r#"action="/posts/-Nabc""#));
    }
}
