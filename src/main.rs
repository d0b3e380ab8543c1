use axum::{
    Router,
    extract::Extension,
    response::{IntoResponse, Redirect},
    routing::{get, get_service, post},
};
use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool},
};
use std::sync::Arc;
use tera::{Context, Tera};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

mod auth;
mod cards;
mod daily;
mod dashboard;
mod generator;
mod holiday;
mod login;
mod model;
mod register;
mod scheduler;
mod schema;
mod store;
mod upload;
mod utils;

type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[tokio::main]
async fn main() {
    // Database configuration
    dotenv::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://flashbox.db".into());

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .expect("Failed to create DB pool");

    // Flashcard generation client (no API key means no generation)
    let generator = generator::GeneratorClient::from_env();

    // Templates configuration
    let templates = match Tera::new("templates/**/*.html") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    let templates = Arc::new(templates);

    // Sessions configuration
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_secure(false);

    // Review API router (only needs pool)
    let review_api_router = Router::new()
        .route("/cards", get(cards::list_cards))
        .route("/review", post(cards::submit_review))
        .route("/daily", get(daily::get_daily))
        .route("/history", get(dashboard::get_history))
        .route("/dashboard", get(dashboard::get_dashboard))
        .with_state(pool.clone());

    // Holiday API router
    let holiday_api_router = Router::new()
        .route("/", post(holiday::create_holiday))
        .route("/status", get(holiday::holiday_status))
        .route("/extend", post(holiday::extend_holiday))
        .route("/skip", post(holiday::set_skip_catchup))
        .with_state(pool.clone());

    // Upload router (needs both pool and the generation client)
    let upload_api_router = Router::new()
        .route("/", post(upload::upload_file))
        .with_state((pool.clone(), generator));

    // Combined API router
    let api_router = Router::new()
        .merge(review_api_router)
        .nest("/holiday", holiday_api_router)
        .nest("/upload", upload_api_router);

    // Auth router
    let auth_router = Router::new()
        .merge(login::auth_router(pool.clone(), templates.clone()))
        .merge(register::auth_router(pool.clone(), templates.clone()))
        .route("/logout", get(handle_logout));

    // Main application router
    let app = Router::new()
        // Static pages
        .route("/", get(home))
        .route("/dashboard", get(dashboard_page))
        .route("/daily", get(daily_page))
        // Readiness check
        .route("/health", get(health))
        // Auth routes
        .nest("/auth", auth_router)
        // API routes
        .nest("/api", api_router)
        // Static files
        .nest_service("/static", get_service(ServeDir::new("static")))
        // Shared state and layers
        .layer(Extension(templates))
        .layer(session_layer);

    // Start server
    let listener = match TcpListener::bind("127.0.0.1:5000").await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to address: {}", e);
            std::process::exit(1);
        }
    };

    println!("Server running on http://localhost:5000");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

// Handlers for static pages
async fn home(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "index.html", Context::new())
}

async fn dashboard_page(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "dashboard.html", Context::new())
}

async fn daily_page(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    utils::render_template(&templates, "daily.html", Context::new())
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// Auth handlers
async fn handle_logout(session: tower_sessions::Session) -> Result<Redirect, auth::LoginError> {
    session.delete().await.map_err(|e| {
        log::error!("Failed to delete session: {}", e);
        auth::LoginError::SessionError("Failed to logout".into())
    })?;
    Ok(Redirect::to("/"))
}
