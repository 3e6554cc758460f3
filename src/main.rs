use std::error::Error;

use bookshelf_web::{start_server, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let (_, server) = start_server(config).await?;

    server.await?;

    Ok(())
}
