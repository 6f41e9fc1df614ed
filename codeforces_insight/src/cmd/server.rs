use crate::cmd::{api_url_from_env, env_u64};
use crate::modules::handlers::{compare, health, team, user};
use crate::modules::migration::MIGRATOR;
use crate::modules::teams::store::PgTeamStore;
use anyhow::{Context, Result};
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use codeforces_insight_libs::codeforces::client::CodeforcesClient;
use sqlx::postgres::PgPoolOptions;
use std::{env, net::SocketAddr, sync::Arc, time::Duration};
use tower_http::cors::CorsLayer;

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let api_url = api_url_from_env();
    let database_url = env::var("DATABASE_URL").with_context(|| {
        let message = "DATABASE_URL environment variable must be set";
        tracing::error!(message);
        format!("{}", message)
    })?;
    let min_call_interval = Duration::from_millis(env_u64("MIN_CALL_INTERVAL_MS", 2000));
    let cache_ttl = Duration::from_secs(env_u64("CACHE_TTL_SECONDS", 600));

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .with_context(|| {
            let message = "failed to create database connection pool";
            tracing::error!(message);
            format!("{}", message)
        })?;
    MIGRATOR.run(&pool).await?;

    let client = CodeforcesClient::new(&api_url, min_call_interval, cache_ttl).with_context(
        || {
            let message = "couldn't create codeforces client. check the value of CODEFORCES_API_URL environment variable.";
            tracing::error!(message);
            format!("{}", message)
        },
    )?;
    let store = PgTeamStore::new(pool);

    let app = create_router(client, store);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            env_u64("PORT", 8000) as u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to bind server.");

    Ok(())
}

fn create_router(client: CodeforcesClient, store: PgTeamStore) -> Router {
    Router::new()
        .route("/health", routing::get(health))
        .route("/api/user/:username", routing::get(user::get_user_profile))
        .route("/api/user/:username/info", routing::get(user::get_user_info))
        .route(
            "/api/user/:username/solved",
            routing::get(user::get_solved_problems),
        )
        .route("/api/compare", routing::post(compare::compare_users))
        .route(
            "/api/teams",
            routing::post(team::create_team).get(team::list_teams),
        )
        .route(
            "/api/teams/:id",
            routing::get(team::get_team).delete(team::delete_team),
        )
        .route(
            "/api/teams/:id/leaderboard",
            routing::get(team::get_leaderboard),
        )
        .layer(Extension(Arc::new(client)))
        .layer(Extension(Arc::new(store)))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("SIGINT signal received, starting graceful shutdown.");
}
