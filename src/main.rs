use actix_web::{web, App, HttpServer, middleware};
use actix_cors::Cors;
use anyhow::Context;
use dotenv::dotenv;
use log::info;

mod config;
mod error;
mod models;
mod handlers;
mod services;
mod utils;

use config::Config;
use handlers::api::{configure_routes, AppState};
use services::github::GitHubClient;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let github_client = GitHubClient::new(
        &config.github_api_url,
        config.github_token.clone(),
        config.page_size,
    )
    .context("Failed to create GitHub client")?;

    info!(
        "Using GitHub API at {} (page size {}, default token {})",
        config.github_api_url,
        github_client.page_size(),
        if config.github_token.is_some() { "set" } else { "not set" }
    );

    let app_state = web::Data::new(AppState::new(github_client));

    let bind_addr = config.bind_addr();
    info!("Starting server on {}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("Server terminated with an error")?;

    Ok(())
}
