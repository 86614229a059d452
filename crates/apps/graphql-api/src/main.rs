use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use domain::{PgTodoRepository, PgUserRepository};
use graphql_api::{AppConfig, AppSchema, build_schema};
use sqlx::postgres::PgPoolOptions;
use todo_feature::TodoService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_feature::UserService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub schema: AppSchema,
}

/// GraphQL handler
async fn graphql_handler(
    State(state): State<AppState>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

/// GraphQL Playground handler
async fn graphql_playground() -> impl axum::response::IntoResponse {
    axum::response::Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}

/// Health check handler
async fn health() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "graphql_api=debug,user_feature=debug,todo_feature=debug,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../migrations").run(&pool).await?;

    info!("Migrations complete");

    // Wire services over the Postgres repositories
    let users = UserService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        config.user_service_config(),
    );
    let todos = TodoService::new(
        Arc::new(PgTodoRepository::new(pool)),
        config.todo_service_config(),
    );

    let state = AppState {
        schema: build_schema(users, todos),
    };

    // Build router
    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .route("/health", get(health))
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    info!("GraphQL Playground: http://{}/playground", config.listen_addr);
    info!("GraphQL endpoint: http://{}/graphql", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
