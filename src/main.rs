use std::{net::SocketAddr, sync::Arc};

use config::Config;
use handlers::auth::configure_cors;
use repositories::PostgresRepo;
use routes::create_router;
use services::{auth::AuthService, posts::PostsService};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub posts_service: PostsService,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Connection to the database is successful!");
            pool
        }
        Err(err) => {
            error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!().run(&pool).await {
        error!("Failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let repo = Arc::new(PostgresRepo::new(pool));

    let app_state = AppState {
        config: config.clone(),
        auth_service: AuthService::new(repo.clone(), config.jwt_secret.clone(), config.jwt_maxage),
        posts_service: PostsService::new(repo.clone(), repo.clone(), repo),
    };

    let app = create_router(Arc::new(app_state)).layer(configure_cors());

    let listener = tokio::net::TcpListener::bind(format!("[::]:{}", config.port))
        .await
        .unwrap();
    info!("Server listening on port {}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
