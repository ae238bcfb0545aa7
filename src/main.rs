//! Serves the item API.

use items_api::{
    infra::{config, database::Database, logging},
    server,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let config = config::load_config()?;
    let _guard = logging::init_logging(&config.logging);

    let db = Database::new(&config.database);
    db.bootstrap().await?;

    let listener = TcpListener::bind(config.server.socket_addr()).await?;
    server::run_app(listener, db).await?;

    Ok(())
}
