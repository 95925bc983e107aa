use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kennel::{App, Config, Server};

#[tokio::main]
async fn main() -> Result<(), kennel::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "kennel=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let app = App::new(config.seed());

    Server::bind(&config.addr())
        .await?
        .with_body_limit(config.body_limit)
        .serve(app.router())
        .await
}
