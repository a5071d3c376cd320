mod api_doc;
mod auth;
mod error;
mod handlers;
mod middleware;
mod services;
mod setup;
mod state;
mod telemetry;
mod utils;

use orgkit_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = crate::setup::initialize_app(config.clone()).await?;

    crate::setup::server::start_server(&config, router).await?;

    Ok(())
}
