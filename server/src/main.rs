use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;

use portal_server::config::Config;
use portal_server::routes::create_routes;
use portal_server::services::LocalMediaStorage;
use portal_server::store::{MemoryStore, PgStore};
use portal_server::utils::logging::init_tracing;
use portal_server::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env();

    let media = Arc::new(
        LocalMediaStorage::new(config.storage_root.clone())
            .await
            .expect("Failed to prepare media storage"),
    );

    let state = match config.database_url.clone() {
        Some(database_url) => {
            let store = PgStore::connect(&database_url, config.database_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(store.pool())
                .await
                .expect("Failed to run migrations");
            tracing::info!("Migrations run successfully");

            AppState::new(config, Arc::new(store), media)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, records are kept in memory only");
            AppState::new(config, Arc::new(MemoryStore::new()), media)
        }
    };

    let addr = state.config.bind_addr();
    let app = create_routes(state);
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
