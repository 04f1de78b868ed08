//! Blog HTTP server: public reading API, live search and the admin back office

mod admin;
mod cookies;
mod error;
mod public;

pub use cookies::SESSION_COOKIE;
pub use error::{ApiError, ApiResult};

use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::{Authenticator, LocalAuthenticator};
use crate::config::SiteConfig;
use crate::content::MarkdownRenderer;
use crate::gate::{CategoryGate, MemoryStorage};
use crate::reader::Reader;
use crate::search::Searcher;
use crate::store::{CategoryStore, LocalBackend, PostStore, SettingsStore};
use crate::Blog;

/// Shared handler state
pub struct AppState {
    pub config: SiteConfig,
    pub posts: Arc<dyn PostStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub auth: Arc<dyn Authenticator>,
    pub renderer: MarkdownRenderer,
}

impl AppState {
    /// State backed by a single local backend and the configured admin login
    pub fn new(config: SiteConfig, backend: Arc<LocalBackend>) -> Self {
        let auth = Arc::new(LocalAuthenticator::new(&config.admin));
        let renderer = MarkdownRenderer::with_theme(&config.editor.highlight_theme);
        Self {
            posts: backend.clone(),
            categories: backend.clone(),
            settings: backend,
            auth,
            renderer,
            config,
        }
    }

    pub fn reader(&self) -> Reader<'_> {
        Reader::new(&self.config, self.posts.as_ref(), self.categories.as_ref())
    }

    pub fn searcher(&self) -> Searcher<'_> {
        Searcher::new(&self.config, self.posts.as_ref(), self.categories.as_ref())
    }

    /// Gate for the protected category over the reader's stored flags
    pub fn gate<'a>(&'a self, storage: &'a MemoryStorage) -> CategoryGate<'a, MemoryStorage> {
        let gate = &self.config.gate;
        CategoryGate::new(&gate.protected_category, &gate.password, storage)
            .with_denied_message(&gate.denied_message)
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/api/posts", get(admin::list_posts).post(admin::create_post))
        .route(
            "/admin/api/posts/:id",
            get(admin::get_post)
                .put(admin::update_post)
                .delete(admin::delete_post),
        )
        .route("/admin/api/import", post(admin::import))
        .route("/admin/api/preview", post(admin::preview))
        .route(
            "/admin/api/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/admin/api/categories/:id", delete(admin::delete_category))
        .route(
            "/admin/api/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_session,
        ));

    Router::new()
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .merge(admin)
        .route("/api/home", get(public::home))
        .route("/api/category/:slug", get(public::category))
        .route("/api/category/:slug/unlock", post(public::unlock))
        .route("/api/posts/:slug", get(public::post))
        .route("/api/search", get(public::search))
        .route("/api/search/live", get(public::live_search))
        .route("/api/settings", get(public::settings))
        .nest_service(
            "/static",
            ServeDir::new(static_dir).append_index_html_on_directories(true),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let backend = Arc::new(blog.open_backend()?);
    let state = Arc::new(AppState::new(blog.config.clone(), backend));
    let app = router(state, &blog.static_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Admin at http://{}:{}/admin", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
