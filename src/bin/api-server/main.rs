use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use meal_finder::{api, config::Config, data, db};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(true)
        .with_file(false)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("fail to setup logging")?;

    let config = Config::from_env()?;

    // the pool is ready before the server accepts anything
    let db_pool = db::connect(&config.database_url).await?;
    db::ensure_tables(&db_pool, data::TABLES).await?;
    let state = web::Data::new(api::ApiState::new(db_pool));

    tracing::info!("listening at http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(state.clone())
            .configure(api::routes)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("fail to bind {}:{}", config.host, config.port))?
    .run()
    .await?;
    Ok(())
}
