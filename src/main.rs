use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use wavehub::infra::config;
use wavehub::storage::document::DocumentStore;
use wavehub::transport;
use wavehub::PostgresStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    log::info!("connecting to Postgres...");
    let postgres = PostgresStore::connect().await?;
    postgres.ensure_schema().await?;
    let store: Arc<dyn DocumentStore> = Arc::new(postgres);

    let app_state = transport::http::AppState::new(store);

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on http://{}", addr);
    log::info!("swagger ui at http://{}/swagger-ui", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("shutdown signal received");
        }
    }

    Ok(())
}
