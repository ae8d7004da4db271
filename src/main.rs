use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;

use config::Config;
use db::init_db;
use service::checkin::CheckInService;
use store::{CheckInStore, mysql::MySqlCheckInStore};

use crate::auth::jwt::generate_access_token;
use crate::docs::ApiDoc;
use crate::model::role::Role;
use anyhow::Context;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

/// `issue-token <user_id> <name> <employee|manager> [ttl_secs]` prints a bearer token.
fn issue_token(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let [user_id, name, role, rest @ ..] = args else {
        anyhow::bail!("usage: issue-token <user_id> <name> <employee|manager> [ttl_secs]");
    };
    let user_id: u64 = user_id.parse().context("user_id must be a number")?;
    let role: Role = role.parse().context("role must be employee or manager")?;
    let ttl: usize = match rest.first() {
        Some(ttl) => ttl.parse().context("ttl_secs must be a number")?,
        None => 8 * 60 * 60,
    };

    let token = generate_access_token(user_id, name.clone(), role, &config.jwt_secret, ttl)?;
    println!("{token}");
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("issue-token") {
        return issue_token(&config, &args[1..]);
    }

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    let store: Arc<dyn CheckInStore> = Arc::new(MySqlCheckInStore::new(pool));
    let service = Data::new(CheckInService::new(store, config.distance_warning_km));

    let server_addr = config.server_addr.clone();
    info!(%server_addr, api_prefix = %config.api_prefix, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(service.clone())
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
