//! Disklet server - Entry Point
//!
//! Serves a scoped file store over a JSON-lines TCP protocol.

use log::{error, info};
use std::process;

use disklet::ServerError;
use disklet::server::{Server, ServerConfig, open_store};
use disklet::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("disklet: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    setup_logging(&config.log_level);

    info!("Launching disklet server...");

    let disklet = open_store(&config)?;
    let server = Server::bind(config, disklet).await?;
    server.run().await;
    Ok(())
}
