use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod filter;
mod handlers;
mod models;
mod repository;
mod services;
mod visibility;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting TechKit API in {:?} mode", config.environment);

    let app = app();

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("TechKit API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::public::health))
        .merge(public_routes())
        .merge(kit_routes())
        .merge(donor_routes())
        .merge(volunteer_routes())
        .merge(organisation_routes())
        .merge(email_template_routes())
        .merge(content_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    use axum::routing::post;
    use handlers::public;

    Router::new()
        .route("/donate", post(public::donate))
        .route("/volunteers/apply", post(public::apply))
        .route("/locations", get(public::locations))
}

fn kit_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::kits;

    Router::new()
        .route("/api/kits/search", post(kits::search))
        .route("/api/kits/query", post(kits::query))
        .route("/api/kits/one", post(kits::one))
        .route("/api/kits/stats/status", get(kits::status_stats))
        .route("/api/kits/stats/type", get(kits::type_stats))
        .route("/api/kits", post(kits::create).put(kits::update))
        .route("/api/kits/:id", delete(kits::delete))
}

fn donor_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::donors;

    Router::new()
        .route("/api/donors/search", post(donors::search))
        .route("/api/donors/query", post(donors::query))
        .route("/api/donors/one", post(donors::one))
        .route("/api/donors", post(donors::create).put(donors::update))
        .route("/api/donors/:id", delete(donors::delete))
}

fn volunteer_routes() -> Router {
    use axum::routing::{delete, post, put};
    use handlers::volunteers;

    Router::new()
        .route("/api/volunteers/search", post(volunteers::search))
        .route("/api/volunteers/query", post(volunteers::query))
        .route("/api/volunteers/one", post(volunteers::one))
        .route("/api/volunteers", put(volunteers::update))
        .route("/api/volunteers/:id", delete(volunteers::delete))
}

fn organisation_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::organisations;

    Router::new()
        .route("/api/organisations/search", post(organisations::search))
        .route("/api/organisations/query", post(organisations::query))
        .route("/api/organisations/one", post(organisations::one))
        .route("/api/organisations/stats/requests", get(organisations::request_stats))
        .route("/api/organisations", post(organisations::create).put(organisations::update))
        .route("/api/organisations/:id", delete(organisations::delete))
}

fn email_template_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::email_templates;

    Router::new()
        .route("/api/emails/search", post(email_templates::search))
        .route("/api/emails/query", post(email_templates::query))
        .route("/api/emails/one", post(email_templates::one))
        .route("/api/emails", post(email_templates::create).put(email_templates::update))
        .route("/api/emails/:id", delete(email_templates::delete))
}

fn content_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::content;

    Router::new()
        .route("/api/posts/search", post(content::search_posts))
        .route("/api/posts/query", post(content::query_posts))
        .route("/api/posts/one", get(content::one_post))
        .route("/api/posts", post(content::create_post).put(content::update_post))
        .route("/api/posts/:id", delete(content::delete_post))
        .route("/api/faqs/search", post(content::search_faqs))
        .route("/api/faqs/query", post(content::query_faqs))
        .route("/api/faqs", post(content::create_faq).put(content::update_faq))
        .route("/api/faqs/:id", delete(content::delete_faq))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "TechKit API",
        "version": version,
        "description": "Coordination backend for donated-device refurbishment",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "donate": "/donate (public)",
            "volunteers_apply": "/volunteers/apply (public)",
            "locations": "/locations?address= (public)",
            "kits": "/api/kits/* (protected)",
            "donors": "/api/donors/* (protected)",
            "volunteers": "/api/volunteers/* (protected)",
            "organisations": "/api/organisations/* (protected)",
            "emails": "/api/emails/* (protected)",
            "content": "/api/posts/*, /api/faqs/* (public reads)",
        }
    }))
}
