//! Admin back office: login, dashboard and the JSON API behind the editor

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::cookies::{cookie, set_cookie, SESSION_COOKIE};
use super::{ApiError, ApiResult, AppState};
use crate::auth::{AuthError, Session};
use crate::content::{Category, Draft, DraftPatch, NewCategory, Post, Settings, SettingsPatch};
use crate::editor::Editor;
use crate::helpers::{html_escape, link_to, page};

/// Lets a request through only with a live admin session.
///
/// API calls get a bare 401; page requests are sent to the login form.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = cookie(request.headers(), SESSION_COOKIE)
        .and_then(|token| state.auth.session(&token));

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None if request.uri().path().starts_with("/admin/api") => {
            ApiError::Unauthorized.into_response()
        }
        None => Redirect::to("/admin/login").into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    let error = match query.error.as_deref() {
        Some("invalid") => r#"<p class="error">邮箱或密码错误</p>"#,
        Some("unconfigured") => r#"<p class="error">未配置管理员账号</p>"#,
        _ => "",
    };
    let body = format!(
        r#"<h1>登录</h1>
{}
<form method="post" action="/admin/login">
<label>邮箱 <input type="email" name="email" required></label>
<label>密码 <input type="password" name="password" required></label>
<button type="submit">登录</button>
</form>"#,
        error
    );
    Html(page(&state.config, "登录", &body))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    match state.auth.sign_in(&form.email, &form.password) {
        Ok(session) => {
            let cookie = set_cookie(SESSION_COOKIE, &session.token, None, true);
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            Ok(Redirect::to("/admin/login?error=invalid").into_response())
        }
        Err(AuthError::NotConfigured) => {
            Ok(Redirect::to("/admin/login?error=unconfigured").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie(&headers, SESSION_COOKIE) {
        state.auth.sign_out(&token);
    }
    let cleared = set_cookie(SESSION_COOKIE, "", Some(0), true);
    ([(header::SET_COOKIE, cleared)], Redirect::to("/admin/login")).into_response()
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> ApiResult<Html<String>> {
    let posts = state.posts.count()?;
    let categories = state.categories.count()?;

    let body = format!(
        r#"<h1>仪表盘</h1>
<p>{}</p>
<ul>
<li>文章: {}</li>
<li>分类: {}</li>
</ul>
<form method="post" action="/admin/logout"><button type="submit">退出</button></form>
<p>{}</p>"#,
        html_escape(&session.email),
        posts,
        categories,
        link_to(&state.config, "/", "返回首页"),
    );
    Ok(Html(page(&state.config, "仪表盘", &body)))
}

/// A post row in the admin list
#[derive(Debug, Serialize)]
pub struct PostRow {
    #[serde(flatten)]
    post: Post,
    category: Option<String>,
}

pub async fn list_posts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<PostRow>>> {
    let categories = state.categories.list()?;
    let rows = state
        .posts
        .list()?
        .into_iter()
        .map(|post| {
            let category = post.category_id.as_ref().and_then(|id| {
                categories
                    .iter()
                    .find(|c| &c.id == id)
                    .map(|c| c.name.clone())
            });
            PostRow { post, category }
        })
        .collect();
    Ok(Json(rows))
}

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Post>> {
    state.posts.get(&id)?.map(Json).ok_or(ApiError::NotFound)
}

/// Draft as sent by the editor. A missing read time keeps whatever the
/// editing session already has.
#[derive(Debug, Deserialize)]
pub struct DraftForm {
    #[serde(default)]
    read_time: Option<u32>,
    #[serde(flatten)]
    draft: Draft,
}

impl DraftForm {
    fn into_draft(self, fallback_read_time: u32) -> Draft {
        Draft {
            read_time: self.read_time.unwrap_or(fallback_read_time),
            ..self.draft
        }
    }
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DraftForm>,
) -> ApiResult<impl IntoResponse> {
    let mut editor = Editor::new(
        state.posts.as_ref(),
        state.categories.as_ref(),
        state.config.editor.default_read_time,
    );
    editor.draft = form.into_draft(editor.draft.read_time);
    let id = editor.save()?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<DraftForm>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut editor = Editor::open(state.posts.as_ref(), state.categories.as_ref(), &id)?
        .ok_or(ApiError::NotFound)?;
    editor.draft = form.into_draft(editor.draft.read_time);
    let id = editor.save()?;
    Ok(Json(json!({ "id": id })))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .posts
        .delete(&id)
        .map_err(|e| ApiError::store("删除失败", e))?;
    tracing::info!("Deleted post {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    text: String,
    #[serde(default)]
    draft: Option<DraftForm>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    patch: DraftPatch,
    draft: Draft,
}

/// Merge an uploaded markdown file onto the editor's current draft
pub async fn import(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let mut editor = Editor::new(
        state.posts.as_ref(),
        state.categories.as_ref(),
        state.config.editor.default_read_time,
    );
    if let Some(form) = request.draft {
        editor.draft = form.into_draft(editor.draft.read_time);
    }
    let patch = editor.import_file(&request.text)?;
    Ok(Json(ImportResponse {
        patch,
        draft: editor.draft,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    content: String,
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> ApiResult<Html<String>> {
    Ok(Html(state.renderer.render_preview(&request.content)?))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.list()?))
}

/// Add a category; an empty slug is derived from the name
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(mut category): Json<NewCategory>,
) -> ApiResult<impl IntoResponse> {
    category.name = category.name.trim().to_string();
    if category.name.is_empty() {
        return Err(ApiError::BadRequest("添加失败: 分类名称不能为空".to_string()));
    }
    if category.slug.trim().is_empty() {
        category.slug = slug::slugify(&category.name);
    }

    let id = state
        .categories
        .create(category)
        .map_err(|e| ApiError::store("添加失败", e))?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .categories
        .delete(&id)
        .map_err(|e| ApiError::store("删除失败", e))?;
    tracing::info!("Deleted category {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Settings>> {
    Ok(Json(state.settings.read()?))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<Settings>> {
    state
        .settings
        .update(patch)
        .map_err(|e| ApiError::store("保存失败", e))?;
    Ok(Json(state.settings.read()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::{body_json, body_text, send, test_app, test_app_with, test_config};
    use crate::store::{CategoryStore, PostStore};
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::Router;

    async fn sign_in(app: &Router) -> String {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=admin%40example.com&password=hunter2"))
            .unwrap();
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin");

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn authed(method: &str, uri: &str, cookie: &str, body: Option<serde_json::Value>) -> HttpRequest<Body> {
        let builder = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_requests() {
        let (app, _) = test_app();

        let response = send(&app, HttpRequest::builder().uri("/admin").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/login");

        let response = send(
            &app,
            HttpRequest::builder().uri("/admin/api/posts").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_redirects_with_error() {
        let (app, _) = test_app();
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=admin%40example.com&password=nope"))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/login?error=invalid");

        let response = send(
            &app,
            HttpRequest::builder()
                .uri("/admin/login?error=invalid")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert!(body_text(response).await.contains("邮箱或密码错误"));
    }

    #[tokio::test]
    async fn test_dashboard_and_logout() {
        let (app, _) = test_app();
        let cookie = sign_in(&app).await;

        let response = send(&app, authed("GET", "/admin", &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("admin@example.com"));
        assert!(html.contains("文章: 0"));

        let response = send(&app, authed("POST", "/admin/logout", &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = send(&app, authed("GET", "/admin/api/posts", &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_import_then_create_post() {
        let (app, backend) = test_app();
        let tech = CategoryStore::create(
            backend.as_ref(),
            NewCategory {
                name: "Tech".to_string(),
                slug: "tech".to_string(),
            },
        )
        .unwrap();
        let cookie = sign_in(&app).await;

        let text = "---\ntitle: Hello\nslug: hello\ncategory: tech\ntags: a, b\n---\nBody text";
        let response = send(
            &app,
            authed(
                "POST",
                "/admin/api/import",
                &cookie,
                Some(json!({ "text": text, "draft": { "excerpt": "kept", "read_time": 9 } })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["patch"]["title"], "Hello");
        assert_eq!(body["draft"]["excerpt"], "kept");
        assert_eq!(body["draft"]["read_time"], 9);
        assert_eq!(body["draft"]["category_id"], tech.as_str());
        assert_eq!(body["draft"]["content"], "Body text");

        let response = send(
            &app,
            authed("POST", "/admin/api/posts", &cookie, Some(body["draft"].clone())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let post = PostStore::get(backend.as_ref(), &id).unwrap().unwrap();
        assert_eq!(post.slug, "hello");
        assert_eq!(post.tags, Some(vec!["a".to_string(), "b".to_string()]));

        let rows = body_json(send(&app, authed("GET", "/admin/api/posts", &cookie, None)).await).await;
        assert_eq!(rows[0]["category"], "Tech");
    }

    #[tokio::test]
    async fn test_missing_read_time_uses_configured_default() {
        let mut config = test_config();
        config.editor.default_read_time = 8;
        let (app, backend) = test_app_with(config);
        let cookie = sign_in(&app).await;

        let response = send(
            &app,
            authed(
                "POST",
                "/admin/api/import",
                &cookie,
                Some(json!({ "text": "plain body", "draft": { "slug": "a" } })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["draft"]["slug"], "a");
        assert_eq!(body["draft"]["read_time"], 8);

        let response = send(
            &app,
            authed(
                "POST",
                "/admin/api/posts",
                &cookie,
                Some(json!({ "title": "T", "slug": "t" })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();
        assert_eq!(PostStore::get(backend.as_ref(), &id).unwrap().unwrap().read_time, 8);

        // An update without a read time keeps the stored one
        let response = send(
            &app,
            authed(
                "PUT",
                &format!("/admin/api/posts/{}", id),
                &cookie,
                Some(json!({ "title": "T2", "slug": "t", "read_time": 3 })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(
            &app,
            authed(
                "PUT",
                &format!("/admin/api/posts/{}", id),
                &cookie,
                Some(json!({ "title": "T3", "slug": "t" })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let post = PostStore::get(backend.as_ref(), &id).unwrap().unwrap();
        assert_eq!(post.title, "T3");
        assert_eq!(post.read_time, 3);
    }

    #[tokio::test]
    async fn test_save_without_title_is_rejected() {
        let (app, _) = test_app();
        let cookie = sign_in(&app).await;
        let response = send(
            &app,
            authed("POST", "/admin/api/posts", &cookie, Some(json!({ "slug": "x" }))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("保存失败"));
    }

    #[tokio::test]
    async fn test_update_and_delete_post() {
        let (app, backend) = test_app();
        let cookie = sign_in(&app).await;
        let response = send(
            &app,
            authed(
                "POST",
                "/admin/api/posts",
                &cookie,
                Some(json!({ "title": "First", "slug": "first" })),
            ),
        )
        .await;
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let uri = format!("/admin/api/posts/{}", id);
        let response = send(
            &app,
            authed(
                "PUT",
                &uri,
                &cookie,
                Some(json!({ "title": "Renamed", "slug": "first", "published": true })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let post = PostStore::get(backend.as_ref(), &id).unwrap().unwrap();
        assert_eq!(post.title, "Renamed");
        assert!(post.published_at.is_some());

        let response = send(&app, authed("DELETE", &uri, &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, authed("GET", &uri, &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_category_create_conflict_and_delete() {
        let (app, _) = test_app();
        let cookie = sign_in(&app).await;

        let response = send(
            &app,
            authed("POST", "/admin/api/categories", &cookie, Some(json!({ "name": "Daily Life", "slug": "" }))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            authed("POST", "/admin/api/categories", &cookie, Some(json!({ "name": "Other", "slug": "daily-life" }))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("添加失败"));

        let uri = format!("/admin/api/categories/{}", id);
        let response = send(&app, authed("DELETE", &uri, &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, authed("DELETE", &uri, &cookie, None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_and_settings() {
        let (app, _) = test_app();
        let cookie = sign_in(&app).await;

        let response = send(
            &app,
            authed("POST", "/admin/api/preview", &cookie, Some(json!({ "content": "" }))),
        )
        .await;
        assert_eq!(body_text(response).await.trim(), "<p><em>空内容</em></p>");

        let response = send(
            &app,
            authed("PUT", "/admin/api/settings", &cookie, Some(json!({ "footer_text": "bye" }))),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["footer_text"], "bye");
        assert_eq!(body["blog_name"], "Mark的博客");
    }
}
